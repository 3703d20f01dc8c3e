pub mod cache;
pub mod chunk;
pub mod error;
pub mod graph;
pub mod text;
