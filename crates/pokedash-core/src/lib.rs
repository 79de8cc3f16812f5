//! pokedash-core — Pure dashboard logic, no UI.
//!
//! Connects to a Pokémon evaluator backend, decodes its pushes into
//! `DashboardEvent`s, and folds them into a single state store. Frontends
//! read `Snapshot`s from a `tokio::sync::watch` channel.

pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod format;
pub mod store;
pub mod types;
