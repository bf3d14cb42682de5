//! # Brigid Architecture
//!
//! Brigid is a client library for the Brigid software and release catalog, with a CLI
//! on top. The library never touches the terminal; the binary in `cli/` is one client
//! of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders tables/JSON/templates          │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Parses raw identifiers (ids or natural names)            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Identifier resolution, validation, result messages       │
//! │  - Driven by an EndpointDescriptor per resource             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client Layer (client/)                                     │
//! │  - Abstract ApiClient trait                                 │
//! │  - HttpClient (production), InMemoryClient (testing)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identifiers
//!
//! Every single-object operation accepts either a numeric id, used as-is with no
//! lookup, or a natural name (`machine_name` for software, `machine_name:version`
//! for releases) that is resolved with one filtered list call. See
//! [`commands::resolve`].
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: unit tests against `InMemoryClient`, which also records calls so
//!    tests can assert that nothing touched the server.
//! 2. **Client**: response translation is tested on raw status/body pairs.
//! 3. **CLI**: argument parsing and rendering in `cli/`, plus end-to-end tests in
//!    `tests/` against a loopback stub server.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: One module per operation
//! - [`client`]: Transport trait and implementations
//! - [`resources`]: Endpoint descriptors for Software and Release
//! - [`model`]: Records, field paths, identifiers
//! - [`config`]: Settings from file, `.env` and environment
//! - [`error`]: Error types

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod resources;
