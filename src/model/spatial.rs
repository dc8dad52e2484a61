use crate::schema::TypeCode;
use serde::{Deserialize, Serialize};

/// Node of the engine's spatial structure (site, building, storey, element).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialNode {
    #[serde(rename = "expressID")]
    pub id: u32,
    #[serde(rename = "type")]
    pub type_code: TypeCode,
    /// Entity name, present when the tree was requested with properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub children: Vec<SpatialNode>,
}

impl SpatialNode {
    #[must_use]
    pub fn new(id: u32, type_code: TypeCode) -> Self {
        Self {
            id,
            type_code,
            name: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<SpatialNode>) -> Self {
        self.children = children;
        self
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SpatialNode::node_count).sum::<usize>()
    }

    /// Depth-first `(depth, node)` listing, used by the tree view.
    #[must_use]
    pub fn flatten(&self) -> Vec<(usize, &SpatialNode)> {
        let mut out = Vec::new();
        self.flatten_into(0, &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a SpatialNode)>) {
        out.push((depth, self));
        for child in &self.children {
            child.flatten_into(depth + 1, out);
        }
    }
}
