//! Integration Tests
//!
//! Cross-crate tests organized by test dimensions:
//! - Sink: in-memory vs directory-backed
//! - Lifecycle: rotation, flush, close, truncate
//! - Scale: many segments, many writers

#[path = "../common/mod.rs"]
mod common;

mod lifecycle;
mod modes;
mod scale;
