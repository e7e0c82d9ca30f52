//! The `todovault` library crate.
//!
//! Contains the domain models, authentication subsystem (password hashing,
//! token issue/verify, session middleware), routing configuration, and error
//! handling. The main binary (`main.rs`) uses it to construct and run the
//! server.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
