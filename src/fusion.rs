//! Fusion event records
//!
//! A fusion owns its formations, and each formation owns its points. Tree nodes refer back into
//! this structure with a [PointRef] address instead of a pointer.
//!

use crate::component_tree::NodeIndex;
use crate::gene::GeneSet;

/// Address of a single fusion point within the model's fusion list
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PointRef {
    pub fusion: usize,
    pub formation: usize,
    pub point: usize,
}

/// One fusion point node within one component's tree
#[derive(Clone, Debug)]
pub struct Point {
    pub index: usize,

    /// Index of the component whose tree holds this point
    pub component: usize,

    /// Tree node carrying this point
    pub node: NodeIndex,

    /// Leaf genes on the outside of the isolated subtree
    pub outer_genes: GeneSet,
}

/// Fusion points sharing the same pertinent inner gene set within one fusion event
#[derive(Clone, Debug)]
pub struct Formation {
    pub index: usize,
    pub pertinent_inner: GeneSet,
    pub points: Vec<Point>,
}

/// Components a and b fuse to form component c
#[derive(Clone, Debug)]
pub struct Fusion {
    pub index: usize,
    pub component_a: usize,
    pub component_b: usize,
    pub component_c: usize,
    pub formations: Vec<Formation>,
}

impl Fusion {
    pub fn new(index: usize, component_a: usize, component_b: usize, component_c: usize) -> Self {
        assert!(
            component_a != component_b && component_a != component_c && component_b != component_c,
            "Fusion components must be distinct"
        );
        Self {
            index,
            component_a,
            component_b,
            component_c,
            formations: Vec::new(),
        }
    }

    /// Get the index of the formation matching `pertinent_inner`, creating it if needed
    pub fn get_or_create_formation(&mut self, pertinent_inner: &GeneSet) -> usize {
        if let Some(formation) = self
            .formations
            .iter()
            .find(|x| &x.pertinent_inner == pertinent_inner)
        {
            return formation.index;
        }
        let index = self.formations.len();
        self.formations.push(Formation {
            index,
            pertinent_inner: pertinent_inner.clone(),
            points: Vec::new(),
        });
        index
    }

    /// Record a new fusion point, deduplicating its formation by pertinent inner gene set
    pub fn add_point(
        &mut self,
        pertinent_inner: &GeneSet,
        component: usize,
        node: NodeIndex,
        outer_genes: GeneSet,
    ) -> PointRef {
        let formation_index = self.get_or_create_formation(pertinent_inner);
        let formation = &mut self.formations[formation_index];
        let point_index = formation.points.len();
        formation.points.push(Point {
            index: point_index,
            component,
            node,
            outer_genes,
        });
        PointRef {
            fusion: self.index,
            formation: formation_index,
            point: point_index,
        }
    }

    pub fn point_count(&self) -> usize {
        self.formations.iter().map(|x| x.points.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_point_dedups_formations() {
        let mut fusion = Fusion::new(3, 0, 1, 2);
        let p1 = fusion.add_point(&GeneSet::from([1, 2]), 0, 10, GeneSet::from([5]));
        let p2 = fusion.add_point(&GeneSet::from([1, 2]), 1, 11, GeneSet::new());
        let p3 = fusion.add_point(&GeneSet::from([1]), 1, 12, GeneSet::new());

        assert_eq!(fusion.formations.len(), 2);
        assert_eq!(fusion.point_count(), 3);
        assert_eq!(
            p1,
            PointRef {
                fusion: 3,
                formation: 0,
                point: 0
            }
        );
        assert_eq!(p2.formation, 0);
        assert_eq!(p2.point, 1);
        assert_eq!(p3.formation, 1);
        assert_eq!(p3.point, 0);
    }

    #[test]
    #[should_panic]
    fn test_fusion_components_distinct() {
        Fusion::new(0, 1, 1, 2);
    }
}
