//! # Document Interpreter Core
//!
//! Pure logic shared by the Document Interpreter application: data models,
//! chunking, vector utilities, immutable index snapshots, and retrieval
//! scoring.
//!
//! This crate performs no filesystem, network, or async I/O. Everything
//! that talks to the outside world (document loading, embedding backends,
//! persistence) lives in the `doc-interpreter` app crate.

pub mod chunk;
pub mod embedding;
pub mod models;
pub mod search;
pub mod snapshot;
