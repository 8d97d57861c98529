pub mod decompose;
pub mod embedding;
pub mod factory;
pub mod http;
pub mod rerank;
