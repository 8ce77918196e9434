use std::collections::BTreeSet;

use crate::component_tree::ComponentTree;
use crate::gene::GeneSet;

/// A connected group of genes sharing similarity evidence, together with its tree
#[derive(Clone, Debug)]
pub struct Component {
    pub index: usize,

    /// Genes defining this component
    pub major_genes: GeneSet,

    /// Genes belonging to this component only through a domain overlapping another component
    pub minor_genes: GeneSet,

    pub tree: ComponentTree,
}

impl Component {
    /// Create a component, deriving minor genes from the tree when they are not given
    ///
    /// Derived minor genes are the tree's leaf genes which are not major genes of this component.
    ///
    pub fn new(
        index: usize,
        major_genes: GeneSet,
        minor_genes: Option<GeneSet>,
        tree: ComponentTree,
    ) -> Self {
        let minor_genes = minor_genes.unwrap_or_else(|| {
            tree.leaf_genes()
                .difference(&major_genes)
                .copied()
                .collect()
        });
        Self {
            index,
            major_genes,
            minor_genes,
            tree,
        }
    }

    /// Components implicitly formed from this component's minor genes
    ///
    /// These are all other components with a major gene in this component's minor gene set.
    ///
    pub fn outgoing_components(&self, all_components: &[Component]) -> BTreeSet<usize> {
        all_components
            .iter()
            .filter(|x| x.index != self.index && !x.major_genes.is_disjoint(&self.minor_genes))
            .map(|x| x.index)
            .collect()
    }
}
