//! Core data types of the reaction network.
//!
//! - [`types`], [`atom`], [`structure`] – the molecular graph every input is
//!   converted into.
//! - [`ids`] – typed 128-bit identifiers.
//! - [`provenance`] – immutable derivation records.
//! - [`state`], [`pathway`], [`reaction`], [`ensemble`] – network objects.
//! - [`thermo`] – optional thermochemistry and reaction energetics.

pub mod atom;
pub mod ensemble;
pub mod ids;
pub mod pathway;
pub mod provenance;
pub mod reaction;
pub mod state;
pub mod structure;
pub mod thermo;
pub mod types;
