//! # Workflows Module
//!
//! High-level entry points that tie the core data model and the engine together.
//!
//! - [`evaluate`] - Grid preparation and one-call energy evaluation of a configuration

pub mod evaluate;
