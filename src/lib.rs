//! Habit Tree: a habit tracker where completing habits waters a virtual tree.
//!
//! The crate is organised around the state model:
//!
//! - [`growth`]: pure mapping from accumulated water to a growth stage.
//! - [`db`]: the SQLite-backed stores for trees, habits and the garden, plus
//!   the completion coordinator and the day boundary reset.
//! - [`api`]: the thin axum layer exposing the stores over JSON.

pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod growth;
pub mod models;

pub use error::{Result, TrackerError};
