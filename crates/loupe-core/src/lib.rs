//! Core types for the Loupe catalog activity viewer.
//!
//! Holds the activity data model, the event-type dispatcher, the activity
//! renderer and the description editor state machine. This crate is free of
//! HTTP and terminal dependencies; `loupe-cli` supplies both.

// Native `async fn` in traits; the `Catalog` trait spells out `Send` bounds
// on its returned futures itself.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod catalog;
pub mod diff;
pub mod dispatch;
pub mod editor;
pub mod entity;
pub mod error;
pub mod query;
pub mod render;

pub use error::{Error, Result, SaveFailure};

#[cfg(test)]
mod tests;
