//! The `todohive` library crate.
//!
//! Contains the domain models, authentication layer (password hashing, token
//! lifecycle, access-guard middleware), owner-scoped persistence, routing
//! configuration, and error handling for the Todohive API. The binary in
//! `main.rs` wires these into a running server.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
