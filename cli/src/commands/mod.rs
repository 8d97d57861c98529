pub mod cache;
pub mod cli;
pub mod input;
pub mod plan;
