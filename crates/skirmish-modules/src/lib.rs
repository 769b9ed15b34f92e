//! Ship composition for Skirmish.
//!
//! A ship is a tree of [`Module`]s joined through [`ModuleLink`]s. The
//! [`ModuleGraph`] owns every module in an arena keyed by [`ModuleId`];
//! links refer to each other by `(module, link index)` pairs, so the graph
//! has no reference cycles. Module behaviour is a closed [`ModuleKind`]
//! enum with a per-kind capability table instead of a class hierarchy.
//!
//! Ships round-trip through the versioned JSON tree in [`schema`].
//!
//! [`ModuleId`]: skirmish_core::ModuleId

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod error;
pub mod graph;
pub mod kind;
pub mod link;
pub mod module;
pub mod presets;
pub mod schema;

pub use action::{Action, ActionEffect, ActionRef};
pub use error::{CompositionError, SerializationError};
pub use graph::ModuleGraph;
pub use kind::{Capabilities, GunState, LaserSensorState, ModuleKind, ModuleType, ThrusterState};
pub use link::{LinkRef, ModuleLink};
pub use module::Module;
pub use schema::{LinkNode, ModuleNode, ShipDescription, SCHEMA_VERSION};
