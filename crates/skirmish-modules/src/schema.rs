//! Versioned JSON ship descriptions.
//!
//! ```json
//! {
//!   "schema": "v1alpha4",
//!   "name": "scout",
//!   "base_module": {
//!     "type": "base",
//!     "links": [{"child_link_index": 1, "child": {"type": "gun", "links": [null, null, null]}},
//!               null, null, null]
//!   }
//! }
//! ```
//!
//! The schema string is checked verbatim before any structural parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use skirmish_core::ModuleId;

use crate::error::SerializationError;
use crate::graph::ModuleGraph;
use crate::kind::{ModuleKind, ModuleType, MAX_LASER_COUNT};

/// The only schema version this build reads and writes.
pub const SCHEMA_VERSION: &str = "v1alpha4";

/// A whole ship.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShipDescription {
    /// Schema version; always [`SCHEMA_VERSION`] when written.
    pub schema: String,
    /// Display name.
    pub name: String,
    /// The root module, or `null` for an empty ship.
    pub base_module: Option<ModuleNode>,
    /// Observation length. Written for information, ignored on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_observations: Option<usize>,
    /// Action length. Written for information, ignored on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_actions: Option<usize>,
}

/// One module and its children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleNode {
    /// Kind tag.
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    /// One entry per link of the kind: a child, or `null`.
    pub links: Vec<Option<LinkNode>>,
    /// Ray count for laser sensors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laser_count: Option<u32>,
}

/// A child hanging off one link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkNode {
    /// Which of the child's links joins the parent.
    #[serde(alias = "child_link")]
    pub child_link_index: usize,
    /// The child subtree.
    pub child: Box<ModuleNode>,
}

impl ModuleNode {
    /// Give every laser sensor in the subtree that has no `laser_count` the
    /// value `count`.
    pub fn fill_laser_count(&mut self, count: u32) {
        if self.module_type == ModuleType::LaserSensor && self.laser_count.is_none() {
            self.laser_count = Some(count);
        }
        for link in self.links.iter_mut().flatten() {
            link.child.fill_laser_count(count);
        }
    }
}

impl ShipDescription {
    /// Parse from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, SerializationError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parse from an already-decoded JSON value.
    ///
    /// Checks, in order: `schema` present and equal to [`SCHEMA_VERSION`],
    /// `name` present, then the full structure.
    pub fn from_value(value: Value) -> Result<Self, SerializationError> {
        let schema = value
            .get("schema")
            .filter(|v| !v.is_null())
            .ok_or(SerializationError::MissingField("schema"))?;
        let schema = schema.as_str().ok_or_else(|| SerializationError::Malformed {
            reason: "schema is not a string".into(),
        })?;
        if schema != SCHEMA_VERSION {
            tracing::warn!(found = schema, expected = SCHEMA_VERSION, "ship schema mismatch");
            return Err(SerializationError::SchemaMismatch {
                found: schema.to_owned(),
                expected: SCHEMA_VERSION,
            });
        }
        if value.get("name").map_or(true, Value::is_null) {
            return Err(SerializationError::MissingField("name"));
        }
        serde_json::from_value(value).map_err(|e| SerializationError::Malformed {
            reason: e.to_string(),
        })
    }

    /// Render as pretty JSON.
    pub fn to_json_string(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ModuleGraph {
    /// Describe the tree rooted at [`root()`](ModuleGraph::root).
    ///
    /// Modules not connected to the root are not part of the ship and are
    /// left out.
    pub fn to_node(&self) -> Option<ModuleNode> {
        self.root().and_then(|root| self.node_for(root))
    }

    fn node_for(&self, id: ModuleId) -> Option<ModuleNode> {
        let module = self.get(id)?;
        let links = module
            .links()
            .iter()
            .map(|link| {
                let pair = link.pair().filter(|_| link.is_parent())?;
                Some(LinkNode {
                    child_link_index: pair.link,
                    child: Box::new(self.node_for(pair.module)?),
                })
            })
            .collect();
        let laser_count = match module.kind() {
            ModuleKind::LaserSensor(s) => Some(s.laser_count),
            _ => None,
        };
        Some(ModuleNode {
            module_type: module.module_type(),
            links,
            laser_count,
        })
    }

    /// Build a graph from a description tree.
    ///
    /// Modules are inserted depth-first, parents before children.
    pub fn from_node(node: &ModuleNode) -> Result<ModuleGraph, SerializationError> {
        let mut graph = ModuleGraph::new();
        graph.build_node(node, None)?;
        Ok(graph)
    }

    fn build_node(
        &mut self,
        node: &ModuleNode,
        parent: Option<(ModuleId, usize, usize)>,
    ) -> Result<ModuleId, SerializationError> {
        if let Some(count) = node.laser_count {
            if node.module_type == ModuleType::LaserSensor && !(1..=MAX_LASER_COUNT).contains(&count)
            {
                return Err(SerializationError::Malformed {
                    reason: format!("laser_count {count} outside 1..={MAX_LASER_COUNT}"),
                });
            }
        }
        let link_count = node.module_type.link_points().len();
        if node.links.len() > link_count {
            return Err(SerializationError::Malformed {
                reason: format!(
                    "{} has {} links, description lists {}",
                    node.module_type.as_str(),
                    link_count,
                    node.links.len()
                ),
            });
        }

        let id = self.add(ModuleKind::from_type(node.module_type, node.laser_count));
        if let Some((parent_id, parent_link, child_link)) = parent {
            self.link(parent_id, parent_link, id, child_link)?;
        }
        for (index, link) in node.links.iter().enumerate() {
            if let Some(link) = link {
                self.build_node(&link.child, Some((id, index, link.child_link_index)))?;
            }
        }
        Ok(id)
    }
}
