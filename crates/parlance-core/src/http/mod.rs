//! HTTP transport — the resolver's only collaborator surface.
//!
//! The server exposes a JSON API over TCP. The single load-bearing route
//! is `GET /execute?q=…`, which hands the query string to the resolver
//! and serializes the resulting call descriptor; the rest is
//! introspection and lifecycle plumbing.
//!
//! ```text
//! ┌──────────┐        HTTP/JSON          ┌──────────────┐
//! │ browser  │──────────────────────────▶│   Router     │
//! │ CLI      │  GET /execute?q=…         │   (axum)     │
//! └──────────┘                           └──────┬───────┘
//!                                               │
//!                                        ┌──────▼───────┐
//!                                        │   Resolver   │
//!                                        │  (catalog)   │
//!                                        └──────────────┘
//! ```
//!
//! The transport maps `unrecognized_input` to a client-error status and
//! keeps it distinguishable from the `configuration_error` class, which
//! only ever occurs at startup.

pub mod client;
pub mod server;
pub mod types;

pub use client::ApiClient;
pub use server::{AppState, ShutdownSignal};
pub use types::*;
