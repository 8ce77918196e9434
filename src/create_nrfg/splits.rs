use std::collections::BTreeSet;
use std::sync::mpsc::channel;

use simple_error::SimpleResult;

use crate::component::Component;
use crate::gene::GeneSet;
use crate::utils::build_worker_pool;

/// One side of a bipartition of a component's leaf genes
pub type Split = GeneSet;

/// All splits induced by the edges of one component's tree
pub struct ComponentSplits {
    pub component: usize,

    /// All leaf genes of the component tree
    pub genes: GeneSet,

    /// Both sides of the bipartition induced by each tree edge
    pub splits: BTreeSet<Split>,
}

/// Get the bipartition of the component tree's leaf genes induced by each edge
///
/// The parent side of each edge is found by following the tree from the parent endpoint, and the
/// child side is its complement within the component's leaf genes.
///
pub fn get_component_splits(component: &Component) -> SimpleResult<ComponentSplits> {
    let tree = &component.tree;
    let genes = tree.leaf_genes();
    let mut splits = BTreeSet::new();
    for edge in tree.edges() {
        let (parent_side, _) = tree.cut_nodes(edge)?;
        let left = tree.genes_of(&parent_side);
        let right = genes.difference(&left).copied().collect::<Split>();
        splits.insert(left);
        splits.insert(right);
    }
    Ok(ComponentSplits {
        component: component.index,
        genes,
        splits,
    })
}

/// Get the splits of every component, and the union of all splits as the candidate split set
///
/// Component splits are returned in component index order.
///
pub fn get_all_splits(
    thread_count: usize,
    components: &[Component],
) -> SimpleResult<(BTreeSet<Split>, Vec<ComponentSplits>)> {
    let worker_pool = build_worker_pool(thread_count)?;

    let (tx, rx) = channel();
    worker_pool.scope(move |scope| {
        for component in components.iter() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                tx.send(get_component_splits(component)).unwrap();
            });
        }
    });

    let mut all_component_splits = rx.into_iter().collect::<SimpleResult<Vec<_>>>()?;
    all_component_splits.sort_by_key(|x| x.component);

    let candidate_splits = all_component_splits
        .iter()
        .flat_map(|x| x.splits.iter().cloned())
        .collect();

    Ok((candidate_splits, all_component_splits))
}
