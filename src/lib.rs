//! Pokedex Backend Library
//!
//! Exposes core modules for use by binaries and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod pokedex;
