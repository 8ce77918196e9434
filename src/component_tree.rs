//! Rooted tree over the genes and fusion points of one component
//!
//! Nodes are stored in an arena and referenced by [NodeIndex]. Removed nodes leave a tombstone
//! so that the index of every other node, including indices recorded in fusion points, stays
//! stable for the lifetime of the tree.
//!

use std::collections::{BTreeMap, BTreeSet};

use simple_error::{SimpleResult, bail};

use crate::fusion::PointRef;
use crate::gene::{GeneId, GeneSet};

/// Index of a node in a component tree (arena)
pub type NodeIndex = usize;

pub type NodeSet = BTreeSet<NodeIndex>;

/// Annotation attached to a tree node
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NodePayload {
    #[default]
    Empty,
    Gene(GeneId),
    Point(PointRef),
}

/// Directed tree edge, the parent is the "left" endpoint
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Edge {
    pub parent: NodeIndex,
    pub child: NodeIndex,
}

#[derive(Clone, Debug, Default)]
struct TreeNode {
    payload: NodePayload,
    parent: Option<NodeIndex>,
    children: NodeSet,
}

#[derive(Clone, Debug, Default)]
pub struct ComponentTree {
    nodes: Vec<Option<TreeNode>>,
}

impl ComponentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a payload for each node and a list of (parent, child) index pairs
    ///
    /// The result is validated before it is returned.
    ///
    pub fn from_edges(
        payloads: &[NodePayload],
        edges: &[(NodeIndex, NodeIndex)],
    ) -> SimpleResult<Self> {
        let mut tree = Self::new();
        for &payload in payloads {
            tree.add_node(payload);
        }
        for &(parent, child) in edges {
            tree.add_edge(parent, child)?;
        }
        tree.validate()?;
        Ok(tree)
    }

    fn node(&self, node: NodeIndex) -> SimpleResult<&TreeNode> {
        match self.nodes.get(node) {
            Some(Some(x)) => Ok(x),
            _ => bail!("Tree node {} does not exist", node),
        }
    }

    fn node_mut(&mut self, node: NodeIndex) -> SimpleResult<&mut TreeNode> {
        match self.nodes.get_mut(node) {
            Some(Some(x)) => Ok(x),
            _ => bail!("Tree node {} does not exist", node),
        }
    }

    /// Iterate over all live nodes in index order
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, x)| x.as_ref().map(|_| index))
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// All edges, sorted by parent then child index
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(child, x)| {
                let parent = x.as_ref()?.parent?;
                Some(Edge { parent, child })
            })
            .collect::<Vec<_>>();
        edges.sort();
        edges
    }

    pub fn add_node(&mut self, payload: NodePayload) -> NodeIndex {
        self.nodes.push(Some(TreeNode {
            payload,
            ..Default::default()
        }));
        self.nodes.len() - 1
    }

    pub fn payload(&self, node: NodeIndex) -> SimpleResult<NodePayload> {
        Ok(self.node(node)?.payload)
    }

    pub fn set_payload(&mut self, node: NodeIndex, payload: NodePayload) -> SimpleResult<()> {
        self.node_mut(node)?.payload = payload;
        Ok(())
    }

    /// The single node without a parent
    ///
    /// Returns None for an empty tree or a tree which currently has more than one root.
    ///
    pub fn root(&self) -> Option<NodeIndex> {
        let mut roots = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, x)| matches!(x, Some(n) if n.parent.is_none()))
            .map(|(index, _)| index);
        let root = roots.next()?;
        if roots.next().is_some() {
            return None;
        }
        Some(root)
    }

    /// Add an edge from parent to child
    ///
    /// The child must not already have a parent, and the edge must not create a cycle.
    ///
    pub fn add_edge(&mut self, parent: NodeIndex, child: NodeIndex) -> SimpleResult<Edge> {
        if parent == child {
            bail!("Can't add self-edge on tree node {}", parent);
        }
        self.node(parent)?;
        if let Some(existing) = self.node(child)?.parent {
            bail!(
                "Can't add edge {}->{}, node {} already has parent {}",
                parent,
                child,
                child,
                existing
            );
        }

        // Walk up from the parent to make sure the child is not one of its ancestors:
        let mut ancestor = Some(parent);
        while let Some(x) = ancestor {
            if x == child {
                bail!("Can't add edge {}->{}, it would create a cycle", parent, child);
            }
            ancestor = self.node(x)?.parent;
        }

        self.node_mut(parent)?.children.insert(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(Edge { parent, child })
    }

    pub fn remove_edge(&mut self, edge: Edge) -> SimpleResult<()> {
        if self.node(edge.child)?.parent != Some(edge.parent) {
            bail!("Can't remove edge {}->{}, it does not exist", edge.parent, edge.child);
        }
        self.node_mut(edge.parent)?.children.remove(&edge.child);
        self.node_mut(edge.child)?.parent = None;
        Ok(())
    }

    /// Find the edge between two nodes in either direction
    pub fn find_edge(&self, a: NodeIndex, b: NodeIndex) -> Option<Edge> {
        if self.node(b).ok()?.parent == Some(a) {
            Some(Edge {
                parent: a,
                child: b,
            })
        } else if self.node(a).ok()?.parent == Some(b) {
            Some(Edge {
                parent: b,
                child: a,
            })
        } else {
            None
        }
    }

    /// All nodes in the subtree rooted at `node`, including `node`
    pub fn subtree_nodes(&self, node: NodeIndex) -> SimpleResult<NodeSet> {
        let mut subtree = NodeSet::new();
        let mut stack = vec![node];
        while let Some(x) = stack.pop() {
            if subtree.insert(x) {
                stack.extend(self.node(x)?.children.iter().copied());
            }
        }
        Ok(subtree)
    }

    /// Partition the tree into the node sets on either side of `edge`
    ///
    /// Returns (parent side, child side).
    ///
    pub fn cut_nodes(&self, edge: Edge) -> SimpleResult<(NodeSet, NodeSet)> {
        if self.find_edge(edge.parent, edge.child) != Some(edge) {
            bail!("Can't cut edge {}->{}, it does not exist", edge.parent, edge.child);
        }
        let child_side = self.subtree_nodes(edge.child)?;
        let parent_side = self
            .nodes()
            .filter(|x| !child_side.contains(x))
            .collect::<NodeSet>();
        Ok((parent_side, child_side))
    }

    /// Map from each gene in the tree to the node carrying it
    pub fn gene_node_map(&self) -> BTreeMap<GeneId, NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, x)| match x.as_ref()?.payload {
                NodePayload::Gene(gene) => Some((gene, index)),
                _ => None,
            })
            .collect()
    }

    pub fn leaf_genes(&self) -> GeneSet {
        self.gene_node_map().into_keys().collect()
    }

    /// Nodes carrying the given genes, genes absent from this tree are skipped
    pub fn gene_nodes(&self, genes: &GeneSet) -> NodeSet {
        self.gene_node_map()
            .into_iter()
            .filter(|(gene, _)| genes.contains(gene))
            .map(|(_, node)| node)
            .collect()
    }

    /// Genes carried by any of the given nodes
    pub fn genes_of(&self, nodes: &NodeSet) -> GeneSet {
        nodes
            .iter()
            .filter_map(|&x| match self.node(x).ok()?.payload {
                NodePayload::Gene(gene) => Some(gene),
                _ => None,
            })
            .collect()
    }

    /// Add a new root node above the current root, carrying `payload`
    pub fn insert_root_above(&mut self, payload: NodePayload) -> SimpleResult<NodeIndex> {
        let Some(old_root) = self.root() else {
            bail!("Can't insert new root, tree does not have a single root");
        };
        let new_root = self.add_node(payload);
        self.add_edge(new_root, old_root)?;
        Ok(new_root)
    }

    /// Replace `edge` with a new node carrying `payload` between its two endpoints
    pub fn splice_edge(&mut self, edge: Edge, payload: NodePayload) -> SimpleResult<NodeIndex> {
        self.remove_edge(edge)?;
        let new_node = self.add_node(payload);
        self.add_edge(edge.parent, new_node)?;
        self.add_edge(new_node, edge.child)?;
        Ok(new_node)
    }

    /// Remove a node, reattaching any children to its parent
    ///
    /// This reverses [Self::splice_edge] and [Self::insert_root_above]. A root node can only be
    /// removed if it has at most one child, so that the tree keeps a single root.
    ///
    pub fn remove_node(&mut self, node: NodeIndex) -> SimpleResult<()> {
        let TreeNode {
            parent, children, ..
        } = self.node(node)?.clone();

        if parent.is_none() && children.len() > 1 {
            bail!(
                "Can't remove root node {} with {} children",
                node,
                children.len()
            );
        }

        for &child in children.iter() {
            self.remove_edge(Edge {
                parent: node,
                child,
            })?;
        }
        if let Some(parent) = parent {
            self.remove_edge(Edge {
                parent,
                child: node,
            })?;
            for &child in children.iter() {
                self.add_edge(parent, child)?;
            }
        }
        self.nodes[node] = None;
        Ok(())
    }

    /// Check that the tree is non-empty, connected, has exactly one root, and carries no gene
    /// more than once
    pub fn validate(&self) -> SimpleResult<()> {
        let node_count = self.node_count();
        if node_count == 0 {
            bail!("Tree is empty");
        }
        let root_count = self
            .nodes
            .iter()
            .flatten()
            .filter(|x| x.parent.is_none())
            .count();
        if root_count != 1 {
            bail!("Tree has {} roots, expected exactly one", root_count);
        }
        if let Some(root) = self.root() {
            let reachable_count = self.subtree_nodes(root)?.len();
            if reachable_count != node_count {
                bail!(
                    "Tree is disconnected, only {} of {} nodes are reachable from the root",
                    reachable_count,
                    node_count
                );
            }
        }

        let mut genes = GeneSet::new();
        for x in self.nodes.iter().flatten() {
            if let NodePayload::Gene(gene) = x.payload
                && !genes.insert(gene)
            {
                bail!("Tree contains gene #{} more than once", gene);
            }
        }
        Ok(())
    }
}
