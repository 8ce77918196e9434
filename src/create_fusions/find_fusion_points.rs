use simple_error::{SimpleResult, bail, try_with};

use super::isolate::isolate;
use crate::component::Component;
use crate::component_tree::{NodeIndex, NodePayload};
use crate::fusion::Fusion;
use crate::gene::GeneSet;
use crate::log_utils::debug_msg;

/// Fusion point node added to one component tree, before it is registered with its fusion
#[derive(Debug)]
pub struct NewFusionPoint {
    pub fusion_index: usize,
    pub node: NodeIndex,

    /// Major genes of the fused component which this point represents
    pub pertinent_inner: GeneSet,

    /// Leaf genes on the outside of the isolated subtree
    pub outer_genes: GeneSet,
}

/// Locate the points at which one fusion event occurs within one component's tree
///
/// The component tree is updated in place with one new node for each fusion point found. The
/// new nodes are left with an empty payload, and are described in the returned list so that the
/// caller can register them with the fusion.
///
/// All isolation points are found before the tree is changed, so the tree is left unmodified if
/// this returns an error.
///
/// # Arguments
/// * `all_major_genes` - major gene set of every component, in component index order
///
pub fn find_fusion_points(
    fusion: &Fusion,
    all_major_genes: &[GeneSet],
    component: &mut Component,
    debug: bool,
) -> SimpleResult<Vec<NewFusionPoint>> {
    let tree = &mut component.tree;
    let c_major_genes = &all_major_genes[fusion.component_c];

    if component.index == fusion.component_c {
        // The whole tree is the composite side of the fusion:
        let pertinent_inner = tree
            .leaf_genes()
            .intersection(c_major_genes)
            .copied()
            .collect();
        let node = tree.insert_root_above(NodePayload::Empty)?;
        debug_msg!(
            debug,
            "Fusion {}: added root fusion point {node} to component {}",
            fusion.index,
            component.index
        );
        return Ok(vec![NewFusionPoint {
            fusion_index: fusion.index,
            node,
            pertinent_inner,
            outer_genes: GeneSet::new(),
        }]);
    }

    let minor_genes = &component.minor_genes;
    let inside_a = minor_genes
        .intersection(&all_major_genes[fusion.component_a])
        .copied()
        .collect::<GeneSet>();
    let inside_b = minor_genes
        .intersection(&all_major_genes[fusion.component_b])
        .copied()
        .collect::<GeneSet>();

    let inside = match (inside_a.is_empty(), inside_b.is_empty()) {
        (true, true) => return Ok(Vec::new()),
        (false, false) => bail!(
            "Component {} minor genes fall on both sides of fusion {} ({} + {} -> {})",
            component.index,
            fusion.index,
            fusion.component_a,
            fusion.component_b,
            fusion.component_c
        ),
        (false, true) => inside_a,
        (true, false) => inside_b,
    };

    // Fused component majors may repeat source majors, these stay inside:
    let outside = minor_genes
        .intersection(c_major_genes)
        .filter(|x| !inside.contains(x))
        .copied()
        .collect::<GeneSet>();

    if debug {
        let ignored_count = minor_genes.len()
            - minor_genes
                .iter()
                .filter(|x| inside.contains(x) || outside.contains(x))
                .count();
        debug_msg!(
            debug,
            "Fusion {}: component {} has {} inside, {} outside and {ignored_count} ignored minor genes",
            fusion.index,
            component.index,
            inside.len(),
            outside.len()
        );
    }

    let inside_nodes = tree.gene_nodes(&inside);
    if inside_nodes.is_empty() {
        debug_msg!(
            debug,
            "Fusion {}: no inside genes found in the tree of component {}",
            fusion.index,
            component.index
        );
        return Ok(Vec::new());
    }
    let outside_nodes = tree.gene_nodes(&outside);

    let isolation_points = try_with!(
        isolate(tree, inside_nodes, outside_nodes)
            .and_then(|x| x.collect::<SimpleResult<Vec<_>>>()),
        "Failed to isolate fusion {} in component {}",
        fusion.index,
        component.index
    );

    let mut new_points = Vec::new();
    for isolation_point in isolation_points {
        let outer_genes = tree.genes_of(&isolation_point.external_nodes);
        let pertinent_inner = outer_genes.intersection(c_major_genes).copied().collect();
        let node = tree.splice_edge(isolation_point.edge, NodePayload::Empty)?;
        debug_msg!(
            debug,
            "Fusion {}: added fusion point {node} to component {} on edge {:?}, inside on {} side",
            fusion.index,
            component.index,
            isolation_point.edge,
            if isolation_point.is_child_internal {
                "child"
            } else {
                "parent"
            }
        );
        new_points.push(NewFusionPoint {
            fusion_index: fusion.index,
            node,
            pertinent_inner,
            outer_genes,
        });
    }
    Ok(new_points)
}

/// Find fusion points for every fusion event within one component's tree
///
/// Fusions are processed in index order, so repeated runs over the same input give the same
/// tree.
///
pub fn find_component_fusion_points(
    fusions: &[Fusion],
    all_major_genes: &[GeneSet],
    component: &mut Component,
    debug: bool,
) -> SimpleResult<Vec<NewFusionPoint>> {
    let mut new_points = Vec::new();
    for fusion in fusions.iter() {
        new_points.extend(find_fusion_points(
            fusion,
            all_major_genes,
            component,
            debug,
        )?);
    }
    Ok(new_points)
}
