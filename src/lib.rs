pub mod calculator;
pub mod core;
pub mod documents;
pub mod fallback;
pub mod llm;
pub mod pipeline;
pub mod rag;
pub mod search;
pub mod server;
pub mod state;
