pub mod api;
pub mod cache;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod graph;
pub mod matcher;
pub mod output;
pub mod planner;
pub mod services;
pub mod skill;
