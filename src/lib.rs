//! scoutboard: polling dashboard for the search workflow backend.
//!
//! ARCHITECTURE
//! ============
//! `api` speaks the backend's HTTP contract, `sync` mirrors each backend
//! resource into a local snapshot, and `routes` + `render` expose those
//! snapshots as a server-rendered web page. The binary in `main.rs` wires
//! them together and adds one-shot CLI commands.

pub mod api;
pub mod config;
pub mod render;
pub mod routes;
pub mod state;
pub mod sync;
