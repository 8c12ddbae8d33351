//! Batched résumé screening: one prompt for every candidate, one backend
//! call, then tolerant per-record validation and a deterministic ranking.

pub mod backend;
pub mod export;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompt_builder;
pub mod prompts;
pub mod ranking;
pub mod store;
pub mod validator;
