//! F1GPT backend: retrieval-augmented Formula 1 question answering.

pub mod core;
pub mod demo;
pub mod diagnostics;
pub mod ingest;
pub mod rag;
pub mod server;
pub mod state;
pub mod vector_math;
