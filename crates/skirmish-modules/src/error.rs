//! Error types for composition and serialization.

use skirmish_core::ModuleId;
use thiserror::Error;

/// A composition-graph operation was rejected.
///
/// Every variant is a precondition failure: the graph is left exactly as
/// it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// No module with this id exists in the graph.
    #[error("unknown module {0}")]
    UnknownModule(ModuleId),
    /// The link index is out of range for the module's kind.
    #[error("module {module} has no link {link} (it has {count})")]
    NoSuchLink {
        /// The module that was addressed.
        module: ModuleId,
        /// The requested link index.
        link: usize,
        /// Number of links the module has.
        count: usize,
    },
    /// The link is already paired with another link.
    #[error("link {link} of module {module} is already linked")]
    AlreadyLinked {
        /// The module owning the link.
        module: ModuleId,
        /// The link index.
        link: usize,
    },
    /// The module being attached already hangs off a parent.
    #[error("module {0} is already attached to a parent")]
    AlreadyAttached(ModuleId),
    /// Linking would close a loop in the tree.
    #[error("linking module {child} under {parent} would create a cycle")]
    Cycle {
        /// The module that would become the parent.
        parent: ModuleId,
        /// The module that would become the child.
        child: ModuleId,
    },
    /// A module cannot be linked to itself.
    #[error("module {0} cannot be linked to itself")]
    SelfLink(ModuleId),
    /// Only leaf modules can be unlinked or removed.
    #[error("module {0} has children attached")]
    HasChildren(ModuleId),
    /// The module has no parent link to undo.
    #[error("module {0} has no parent link")]
    NotLinked(ModuleId),
}

/// A ship description could not be read or written.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// The `schema` field did not match the supported version.
    #[error("invalid ship schema version {found:?}, expected {expected:?}")]
    SchemaMismatch {
        /// The version found in the document.
        found: String,
        /// The version this build reads.
        expected: &'static str,
    },
    /// A required field was absent or null.
    #[error("malformed ship description: missing {0}")]
    MissingField(&'static str),
    /// The document is structurally invalid.
    #[error("malformed ship description: {reason}")]
    Malformed {
        /// What was wrong.
        reason: String,
    },
    /// The text is not valid JSON.
    #[error("ship description is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    /// The described tree violates a composition rule.
    #[error("ship description has an invalid link: {0}")]
    Composition(#[from] CompositionError),
}
