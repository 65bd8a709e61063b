//! Product photo studio backend - AI image generation and editing
//!
//! Turns text prompts into product images (and edits existing ones) through an
//! OpenRouter image model, keeps the results in Supabase Storage and records
//! per-user history alongside a curated library of prompt templates.

pub mod ai;
pub mod db;
pub mod error;
pub mod ids;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod storage;
pub mod validation;

pub use error::{Error, Result};
