//! Pokedex Module
//! Mission: Read-mostly mirror of the Pokemon catalog

pub mod api;
pub mod models;
pub mod store;

pub use store::PokedexStore;
