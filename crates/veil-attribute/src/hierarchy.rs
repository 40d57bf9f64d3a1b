//! Hierarchical (tree-valued) enumeration attribute.
//!
//! The value domain is a tree of named nodes; a value is one node, and a
//! generalized value is an ancestor standing in for its whole subtree.
//! The tree is stored as an arena with parent/child indices.

use std::collections::HashMap;

use crate::error::AttributeError;
use crate::partition::Partition;
use crate::value::AttributeValue;

/// Index of a node within its [`Hierarchy`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct HierarchyNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An owned tree of named nodes; node 0 is the root.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
}

impl Hierarchy {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![HierarchyNode {
                name: root_name.into(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn add_child(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(HierarchyNode {
            name: name.into(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Finds a node by name, first match in declaration (preorder) order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.preorder(self.root()).find(|&id| self.nodes[id.0].name == name)
    }

    /// Path from the root down to `id`, inclusive on both ends.
    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// True iff `node` lies in the subtree rooted at `ancestor`.
    pub fn is_in_subtree(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Lowest common ancestor of two nodes.
    pub fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let pa = self.path_from_root(a);
        let pb = self.path_from_root(b);
        let mut lca = self.root();
        for (x, y) in pa.iter().zip(pb.iter()) {
            if x == y {
                lca = *x;
            } else {
                break;
            }
        }
        lca
    }

    fn preorder(&self, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![from];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            for &child in self.nodes[next.0].children.iter().rev() {
                stack.push(child);
            }
            Some(next)
        })
    }
}

/// A hierarchical enum value: one node of the attribute's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HierarchyValue {
    pub node: NodeId,
}

/// Quasi-identifier type for hierarchical enumerations.
#[derive(Debug, Clone)]
pub struct HierarchicAttribute {
    name: String,
    tree: Hierarchy,
}

impl HierarchicAttribute {
    pub fn new(name: impl Into<String>, tree: Hierarchy) -> Self {
        Self {
            name: name.into(),
            tree,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tree(&self) -> &Hierarchy {
        &self.tree
    }

    /// Accepts a bare node name or a dotted root path (last segment wins).
    pub fn parse(&self, text: &str) -> Result<HierarchyValue, AttributeError> {
        let cleaned = text.trim();
        let leaf = cleaned.rsplit('.').next().unwrap_or(cleaned).trim();
        self.tree
            .find(leaf)
            .map(|node| HierarchyValue { node })
            .ok_or_else(|| AttributeError::NotInHierarchy {
                name: self.name.clone(),
                text: cleaned.to_string(),
            })
    }

    /// Dotted path from the root, e.g. `illness.cardiovascular.embolism`.
    pub fn show(&self, value: &HierarchyValue) -> String {
        self.tree
            .path_from_root(value.node)
            .into_iter()
            .map(|id| self.tree.name(id))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn subset_of(&self, parent: &HierarchyValue, child: &HierarchyValue) -> bool {
        self.tree.is_in_subtree(parent.node, child.node)
    }

    /// Lowest common ancestor of all members; the root for an empty set.
    pub fn smallest_generalization(&self, values: &[HierarchyValue]) -> HierarchyValue {
        let node = values
            .iter()
            .map(|v| v.node)
            .reduce(|a, b| self.tree.lowest_common_ancestor(a, b))
            .unwrap_or_else(|| self.tree.root());
        HierarchyValue { node }
    }

    /// Occurrence-weighted depth-ratio cost.
    ///
    /// Each member contributes `1 - 1/w` where `w` is the product of the
    /// branching factors along the path from the aggregate node down to
    /// the member's node (`w = 1` when the member sits at the aggregate
    /// itself). Zero for a singleton partition, larger the further the
    /// aggregate had to climb.
    pub fn error_cost(&self, partition: &Partition) -> f64 {
        let AttributeValue::Hierarchy(aggregate) = &partition.aggregate else {
            return 0.0;
        };

        let mut total = 0.0;
        let mut n = 0usize;
        for v in &partition.values {
            let AttributeValue::Hierarchy(hv) = v else {
                continue;
            };
            let path = self.tree.path_from_root(hv.node);
            let mut width = 1.0;
            let mut below = false;
            for id in &path {
                if below {
                    let parent = self.tree.nodes[id.0].parent.unwrap_or_else(|| self.tree.root());
                    width *= self.tree.children(parent).len().max(1) as f64;
                }
                if *id == aggregate.node {
                    below = true;
                }
            }
            total += 1.0 - 1.0 / width;
            n += 1;
        }
        if n == 0 { 0.0 } else { total / n as f64 }
    }

    /// Shallowest cut: the deepest node whose subtree occurrence count is
    /// still >= `k` while every deeper candidate falls short; fails unless
    /// both the in-subtree and out-of-subtree groups reach `k`.
    pub fn try_split(
        &self,
        partition: &Partition,
        k: usize,
    ) -> Option<(Vec<usize>, Vec<usize>)> {
        if partition.values.len() < 2 * k {
            return None;
        }

        let nodes: Vec<NodeId> = partition
            .values
            .iter()
            .filter_map(|v| match v {
                AttributeValue::Hierarchy(hv) => Some(hv.node),
                _ => None,
            })
            .collect();
        if nodes.len() != partition.values.len() {
            return None;
        }

        // Occurrence count per node, then summed over each subtree.
        let mut occurrences: HashMap<NodeId, usize> = HashMap::new();
        for &node in &nodes {
            *occurrences.entry(node).or_insert(0) += 1;
        }
        let mut subtree_counts: HashMap<NodeId, usize> = HashMap::new();
        self.sum_subtree(self.tree.root(), &occurrences, &mut subtree_counts);

        let cut = self.find_valid_cut(self.tree.root(), k, &subtree_counts)?;

        let (selected, remaining): (Vec<usize>, Vec<usize>) =
            (0..nodes.len()).partition(|&i| self.tree.is_in_subtree(cut, nodes[i]));

        if selected.len() >= k && remaining.len() >= k {
            Some((selected, remaining))
        } else {
            None
        }
    }

    fn sum_subtree(
        &self,
        node: NodeId,
        occurrences: &HashMap<NodeId, usize>,
        out: &mut HashMap<NodeId, usize>,
    ) -> usize {
        let mut total = occurrences.get(&node).copied().unwrap_or(0);
        for &child in self.tree.children(node) {
            total += self.sum_subtree(child, occurrences, out);
        }
        out.insert(node, total);
        total
    }

    fn find_valid_cut(
        &self,
        node: NodeId,
        k: usize,
        counts: &HashMap<NodeId, usize>,
    ) -> Option<NodeId> {
        if counts.get(&node).copied().unwrap_or(0) < k {
            return None;
        }
        self.tree
            .children(node)
            .iter()
            .filter_map(|&child| self.find_valid_cut(child, k, counts))
            .min_by_key(|id| counts.get(id).copied().unwrap_or(0))
            .or(Some(node))
    }
}
