//! Core types and trait definitions for the Sweeft project store.
//!
//! This crate is deliberately free of HTTP and filesystem dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod delivery;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod project;
pub mod purchase;
pub mod store;
pub mod verify;

pub use error::{Error, Result};
