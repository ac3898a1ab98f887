//! Quill: Resumable SEO Article Generation
//!
//! Turns a list of (keyword, category) pairs into SEO articles using a text
//! completion service and an image search service. Every outcome is recorded in
//! a durable store, so failed or interrupted batches can be resumed without
//! redoing finished work.

pub mod artifacts;
pub mod assets;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod generator;
pub mod inputs;
pub mod logging;
pub mod prompts;
pub mod provider;
pub mod store;
pub mod types;
