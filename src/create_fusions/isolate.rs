//! Find the tree edges which best separate a requested inside node set from an outside node set
//!

use simple_error::{SimpleError, SimpleResult, bail};

use crate::component_tree::{ComponentTree, Edge, NodeSet};

/// One oriented tree edge, and how well cutting it separates the requested node sets
#[derive(Clone, Debug)]
pub struct IsolationPoint {
    pub edge: Edge,

    /// True if the internal side of the cut is the child side of the edge
    pub is_child_internal: bool,

    pub internal_nodes: NodeSet,
    pub external_nodes: NodeSet,

    /// Requested inside nodes found on the external side
    pub inside_incorrect: NodeSet,

    /// Requested outside nodes found on the internal side
    pub outside_incorrect: NodeSet,
}

impl IsolationPoint {
    fn new(
        edge: Edge,
        is_child_internal: bool,
        internal_nodes: NodeSet,
        external_nodes: NodeSet,
        inside_request: &NodeSet,
        outside_request: &NodeSet,
    ) -> Self {
        let inside_incorrect = inside_request
            .intersection(&external_nodes)
            .copied()
            .collect();
        let outside_incorrect = outside_request
            .intersection(&internal_nodes)
            .copied()
            .collect();
        Self {
            edge,
            is_child_internal,
            internal_nodes,
            external_nodes,
            inside_incorrect,
            outside_incorrect,
        }
    }
}

/// Evaluate both orientations of every edge in the tree against the request
fn get_isolation_candidates(
    tree: &ComponentTree,
    inside_request: &NodeSet,
    outside_request: &NodeSet,
) -> SimpleResult<Vec<IsolationPoint>> {
    let mut candidates = Vec::new();
    for edge in tree.edges() {
        let (parent_side, child_side) = tree.cut_nodes(edge)?;
        candidates.push(IsolationPoint::new(
            edge,
            true,
            child_side.clone(),
            parent_side.clone(),
            inside_request,
            outside_request,
        ));
        candidates.push(IsolationPoint::new(
            edge,
            false,
            parent_side,
            child_side,
            inside_request,
            outside_request,
        ));
    }
    Ok(candidates)
}

/// Select the oriented edge which fully contains the inside request and encloses the fewest
/// outside nodes, breaking ties by the smallest internal side
///
/// Among equal candidates the first in edge order is selected.
///
fn find_best_isolation(
    tree: &ComponentTree,
    inside_request: &NodeSet,
    outside_request: &NodeSet,
) -> SimpleResult<IsolationPoint> {
    let candidates = get_isolation_candidates(tree, inside_request, outside_request)?;
    let best = candidates
        .into_iter()
        .filter(|x| x.inside_incorrect.is_empty())
        .min_by_key(|x| (x.outside_incorrect.len(), x.internal_nodes.len()));
    match best {
        Some(x) => Ok(x),
        None => bail!(
            "Unsatisfiable isolation request, no tree edge separates inside nodes {:?} from outside nodes {:?}",
            inside_request,
            outside_request
        ),
    }
}

/// Lazy sequence of isolation points produced by [isolate]
///
/// The first point is the best edge for the initial request. Each following point is the best
/// edge for the outside nodes left on the internal side of the previous point. The sequence
/// stops after the first error.
///
pub struct Isolation<'a> {
    tree: &'a ComponentTree,
    inside_request: NodeSet,

    /// Outside request for the next step, None once the sequence is complete
    outside_request: Option<NodeSet>,
}

impl Iterator for Isolation<'_> {
    type Item = SimpleResult<IsolationPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        let outside_request = self.outside_request.take()?;
        let point = match find_best_isolation(self.tree, &self.inside_request, &outside_request) {
            Ok(x) => x,
            Err(e) => return Some(Err(e)),
        };

        if !point.outside_incorrect.is_empty() {
            // Every step must narrow the outside request for the sequence to terminate:
            if point.outside_incorrect.len() >= outside_request.len() {
                return Some(Err(SimpleError::new(format!(
                    "Isolation of inside nodes {:?} made no progress on outside nodes {:?}",
                    self.inside_request, outside_request
                ))));
            }
            self.outside_request = Some(point.outside_incorrect.clone());
        }
        Some(Ok(point))
    }
}

/// Find the sequence of tree edges which together separate `inside_request` from
/// `outside_request`
///
/// The inside request must be non-empty and disjoint from the outside request.
///
pub fn isolate(
    tree: &ComponentTree,
    inside_request: NodeSet,
    outside_request: NodeSet,
) -> SimpleResult<Isolation<'_>> {
    if inside_request.is_empty() {
        bail!("Isolation request has no inside nodes");
    }
    if !inside_request.is_disjoint(&outside_request) {
        bail!(
            "Unsatisfiable isolation request, inside nodes {:?} overlap outside nodes {:?}",
            inside_request,
            outside_request
        );
    }
    Ok(Isolation {
        tree,
        inside_request,
        outside_request: Some(outside_request),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_tree::test_utils::*;

    #[test]
    fn test_isolate_clade() {
        // ((a,b),(c,d)) with a=3, b=4, c=5, d=6
        let tree = build_tree(
            &[None, None, None, Some(0), Some(1), Some(2), Some(3)],
            &[(0, 1), (0, 2), (1, 3), (1, 4), (2, 5), (2, 6)],
        );

        let points = isolate(&tree, NodeSet::from([3, 4]), NodeSet::from([5, 6]))
            .unwrap()
            .collect::<SimpleResult<Vec<_>>>()
            .unwrap();

        assert_eq!(points.len(), 1);
        let point = &points[0];
        assert_eq!(
            point.edge,
            Edge {
                parent: 0,
                child: 1
            }
        );
        assert!(point.is_child_internal);
        assert_eq!(point.internal_nodes, NodeSet::from([1, 3, 4]));
        assert!(point.outside_incorrect.is_empty());
    }

    #[test]
    fn test_isolate_with_overshoot() {
        // (((a,c),b),d) with a=3, c=4, b=5, d=6
        let tree = build_tree(
            &[None, None, None, Some(0), Some(2), Some(1), Some(3)],
            &[(0, 1), (0, 6), (1, 2), (1, 5), (2, 3), (2, 4)],
        );

        let points = isolate(&tree, NodeSet::from([3, 5]), NodeSet::from([4, 6]))
            .unwrap()
            .collect::<SimpleResult<Vec<_>>>()
            .unwrap();

        assert_eq!(points.len(), 2);

        // The tightest clade holding a and b also holds c:
        assert_eq!(
            points[0].edge,
            Edge {
                parent: 0,
                child: 1
            }
        );
        assert_eq!(points[0].outside_incorrect, NodeSet::from([4]));

        // ...so c is cut away in a second step:
        assert_eq!(
            points[1].edge,
            Edge {
                parent: 2,
                child: 4
            }
        );
        assert!(!points[1].is_child_internal);
        assert!(points[1].outside_incorrect.is_empty());
    }

    #[test]
    fn test_isolate_with_empty_outside() {
        let tree = build_star_tree(&[0, 1, 2]);
        let points = isolate(&tree, NodeSet::from([2]), NodeSet::new())
            .unwrap()
            .collect::<SimpleResult<Vec<_>>>()
            .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].internal_nodes, NodeSet::from([2]));
    }

    #[test]
    fn test_unsatisfiable_isolation() {
        // No edge of a star tree has all three leaves on one side:
        let tree = build_star_tree(&[0, 1, 2]);
        let mut isolation = isolate(&tree, NodeSet::from([1, 2, 3]), NodeSet::new()).unwrap();
        assert!(isolation.next().unwrap().is_err());
        assert!(isolation.next().is_none());

        // Single node tree has no edges
        let tree = build_tree(&[Some(0)], &[]);
        let mut isolation = isolate(&tree, NodeSet::from([0]), NodeSet::new()).unwrap();
        assert!(isolation.next().unwrap().is_err());

        assert!(isolate(&tree, NodeSet::new(), NodeSet::new()).is_err());
        assert!(isolate(&tree, NodeSet::from([0]), NodeSet::from([0])).is_err());
    }

    #[test]
    fn test_isolation_properties_over_all_requests() {
        // Caterpillar tree (((((a,b),c),d),e) with leaves at nodes 5-9
        let tree = build_tree(
            &[None, None, None, None, None, Some(0), Some(1), Some(2), Some(3), Some(4)],
            &[
                (0, 1),
                (0, 9),
                (1, 2),
                (1, 8),
                (2, 3),
                (2, 7),
                (3, 5),
                (3, 6),
            ],
        );
        let leaves = [5, 6, 7, 8, 9];
        let edge_count = tree.edges().len();

        let mut checked_count = 0;
        for inside_mask in 1..(1u32 << leaves.len()) {
            for outside_mask in 0..(1u32 << leaves.len()) {
                if inside_mask & outside_mask != 0 {
                    continue;
                }
                let select = |mask: u32| {
                    leaves
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| mask & (1 << i) != 0)
                        .map(|(_, &x)| x)
                        .collect::<NodeSet>()
                };
                let inside = select(inside_mask);
                let outside = select(outside_mask);
                let Ok(points) = isolate(&tree, inside.clone(), outside.clone())
                    .unwrap()
                    .collect::<SimpleResult<Vec<_>>>()
                else {
                    continue;
                };

                assert!(points.len() <= edge_count);
                for point in points.iter() {
                    assert!(point.inside_incorrect.is_empty());
                    assert!(inside.is_subset(&point.internal_nodes));
                }

                // Every outside node is cut away by at least one point:
                for x in outside.iter() {
                    assert!(points.iter().any(|p| p.external_nodes.contains(x)));
                }
                checked_count += 1;
            }
        }
        assert!(checked_count > 0);
    }
}
