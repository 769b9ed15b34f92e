//! Core types for the Skirmish combat simulator.
//!
//! This crate is the leaf of the dependency graph. It defines the planar
//! [`Transform`] math shared by module composition and physics, the
//! strongly-typed identifiers used across crates, and the engine-free
//! [`RenderData`] description that drawable entities produce.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod render;
pub mod transform;

pub use id::{BodyIndex, EntityId, ModuleId};
pub use render::{Color, Line, Particle, RenderData, Sprite, Text};
pub use transform::{Transform, Vec2};
