//! Candidate selection over the spatial tree.

use crate::config::ElementFilter;
use crate::model::SpatialNode;
use crate::schema::{TypeCode, TypeSchema};

/// An element picked for normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: u32,
    pub type_code: TypeCode,
}

impl From<&SpatialNode> for Candidate {
    fn from(node: &SpatialNode) -> Self {
        Self {
            id: node.id,
            type_code: node.type_code.clone(),
        }
    }
}

/// Pre-order traversal: a node is visited before its children, children in
/// engine order. A node is kept when `include_all` is set or `accept` says so.
pub fn walk<'a, F>(root: &'a SpatialNode, include_all: bool, mut accept: F) -> Vec<&'a SpatialNode>
where
    F: FnMut(&SpatialNode) -> bool,
{
    let mut out = Vec::new();
    visit(root, include_all, &mut accept, &mut out);
    out
}

fn visit<'a, F>(node: &'a SpatialNode, include_all: bool, accept: &mut F, out: &mut Vec<&'a SpatialNode>)
where
    F: FnMut(&SpatialNode) -> bool,
{
    if include_all || accept(node) {
        out.push(node);
    }
    for child in &node.children {
        visit(child, include_all, accept, out);
    }
}

/// Walks the tree, filtering on schema-resolved type names.
#[must_use]
pub fn tree_candidates(
    root: &SpatialNode,
    schema: &TypeSchema,
    filter: &ElementFilter,
    include_all: bool,
) -> Vec<Candidate> {
    walk(root, include_all, |node| {
        filter.accepts(&schema.resolve(&node.type_code))
    })
    .into_iter()
    .map(Candidate::from)
    .collect()
}

/// Fallback over a flat entity listing, for models without a usable tree.
pub fn flat_candidates<I>(
    entities: I,
    schema: &TypeSchema,
    filter: &ElementFilter,
    include_all: bool,
) -> Vec<Candidate>
where
    I: IntoIterator<Item = (u32, TypeCode)>,
{
    entities
        .into_iter()
        .filter(|(_, code)| include_all || filter.accepts(&schema.resolve(code)))
        .map(|(id, type_code)| Candidate { id, type_code })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(type_name: &str) -> TypeCode {
        TypeCode::Name(type_name.to_string())
    }

    fn sample_tree() -> SpatialNode {
        SpatialNode::new(1, name("IFCPROJECT")).with_children(vec![SpatialNode::new(
            2,
            name("IFCSITE"),
        )
        .with_children(vec![
            SpatialNode::new(3, name("IFCBUILDINGSTOREY")).with_children(vec![
                SpatialNode::new(4, name("IFCWALL")),
                SpatialNode::new(5, name("IFCSPACE"))
                    .with_children(vec![SpatialNode::new(6, name("IFCFURNISHINGELEMENT"))]),
            ]),
            SpatialNode::new(7, name("IFCBUILDINGSTOREY"))
                .with_children(vec![SpatialNode::new(8, name("IFCSLAB"))]),
        ])])
    }

    #[test]
    fn visits_every_node_once_in_pre_order() {
        let tree = sample_tree();
        let ids: Vec<u32> = walk(&tree, true, |_| false).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(ids.len(), tree.node_count());
    }

    #[test]
    fn filter_keeps_order_of_accepted_nodes() {
        let tree = sample_tree();
        let schema = TypeSchema::default();
        let ids: Vec<u32> = tree_candidates(&tree, &schema, &ElementFilter::physical(), false)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![4, 6, 8]);
    }

    #[test]
    fn numeric_codes_resolve_through_schema() {
        let schema = TypeSchema::parse("export const IFCWALL = 100;\nexport const IFCSPACE = 200;")
            .unwrap();
        let tree = SpatialNode::new(1, TypeCode::Numeric(200))
            .with_children(vec![SpatialNode::new(2, TypeCode::Numeric(100))]);
        let found = tree_candidates(&tree, &schema, &ElementFilter::physical(), false);
        assert_eq!(
            found,
            vec![Candidate {
                id: 2,
                type_code: TypeCode::Numeric(100),
            }]
        );
    }

    #[test]
    fn flat_listing_fallback_filters_the_same_way() {
        let schema = TypeSchema::default();
        let entities = vec![(10, name("IFCWALL")), (11, name("IFCSPACE"))];
        assert_eq!(
            flat_candidates(entities.clone(), &schema, &ElementFilter::physical(), false).len(),
            1
        );
        assert_eq!(
            flat_candidates(entities, &schema, &ElementFilter::physical(), true).len(),
            2
        );
    }
}
