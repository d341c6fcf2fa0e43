//! Monitor client: lists, creates and deletes page monitors for an
//! anonymous per-browser user key.
//!
//! SYSTEM CONTEXT
//! ==============
//! The REST API owns monitor storage and change detection. This crate keeps a
//! local projection of the caller's monitors in sync with that API and renders
//! it through a [`view::ViewSink`]. The same core drives the `monitor` CLI
//! (terminal adapters) and the browser build (`hydrate` feature, DOM adapters).
//!
//! DESIGN
//! ======
//! - [`client::MonitorClient`] is an explicitly constructed context: identity,
//!   API handle, view sink and interaction capability are passed in, so every
//!   operation can run against test doubles.
//! - Rendering is a pure `ListState -> ListView` mapping plus a diff; adapters
//!   only apply patches.

pub mod api;
pub mod client;
pub mod config;
pub mod identity;
pub mod prompt;
pub mod storage;
pub mod view;

#[cfg(not(target_arch = "wasm32"))]
pub mod terminal;

#[cfg(feature = "hydrate")]
pub mod web;
