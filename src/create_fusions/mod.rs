mod find_fusion_events;
mod find_fusion_points;
mod isolate;

use std::sync::mpsc::channel;
use std::time::Instant;

use log::info;
use simple_error::SimpleResult;

use self::find_fusion_events::find_fusion_events;
use self::find_fusion_points::{NewFusionPoint, find_component_fusion_points};
use crate::cli::{CreateFusionsSettings, SharedSettings, write_create_fusions_settings};
use crate::component::Component;
use crate::component_tree::NodePayload;
use crate::fusion::Fusion;
use crate::fusion_output::{log_fusion_summary, write_fusion_json, write_fusion_table};
use crate::model_input::read_model;
use crate::run_stats::{FusionRunStats, RunStep, write_run_stats};
use crate::utils::build_worker_pool;

/// Find all fusion events between components, and annotate every component tree with the points
/// at which each fusion occurs
///
/// Each component tree is processed on its own worker, handling all fusion events in index
/// order. The new points are then registered with their fusions serially in component order, so
/// the result does not depend on thread count.
///
pub fn create_fusions(
    thread_count: usize,
    components: &mut [Component],
    debug: bool,
) -> SimpleResult<Vec<Fusion>> {
    info!("Finding fusion events");
    let mut fusions = find_fusion_events(components)?;
    info!("Found {} fusion events", fusions.len());

    if fusions.is_empty() {
        return Ok(fusions);
    }

    info!("Finding fusion points");
    let all_major_genes = components
        .iter()
        .map(|x| x.major_genes.clone())
        .collect::<Vec<_>>();

    let worker_pool = build_worker_pool(thread_count)?;

    let (tx, rx) = channel();
    {
        let fusions = &fusions;
        let all_major_genes = &all_major_genes;
        let worker_components = &mut *components;
        worker_pool.scope(move |scope| {
            for component in worker_components.iter_mut() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let result =
                        find_component_fusion_points(fusions, all_major_genes, component, debug);
                    tx.send((component.index, result)).unwrap();
                });
            }
        });
    }

    let mut component_results = rx.into_iter().collect::<Vec<_>>();
    component_results.sort_by_key(|(component_index, _)| *component_index);

    let mut component_points: Vec<(usize, Vec<NewFusionPoint>)> = Vec::new();
    for (component_index, result) in component_results {
        component_points.push((component_index, result?));
    }

    for (component_index, new_points) in component_points {
        for new_point in new_points {
            let point_ref = fusions[new_point.fusion_index].add_point(
                &new_point.pertinent_inner,
                component_index,
                new_point.node,
                new_point.outer_genes,
            );
            components[component_index]
                .tree
                .set_payload(new_point.node, NodePayload::Point(point_ref))?;
        }
    }

    info!(
        "Added {} fusion points",
        fusions.iter().map(|x| x.point_count()).sum::<usize>()
    );

    Ok(fusions)
}

pub fn run_create_fusions(
    shared_settings: &SharedSettings,
    settings: &CreateFusionsSettings,
) -> SimpleResult<()> {
    let start = Instant::now();

    write_create_fusions_settings(&settings.output_dir, settings)?;

    let mut model = read_model(&settings.model_filename)?;

    model.create_fusions(shared_settings.thread_count, shared_settings.debug)?;

    log_fusion_summary(&model);
    write_fusion_table(&settings.output_dir, &model)?;
    write_fusion_json(&settings.output_dir, &model)?;

    let run_stats = FusionRunStats {
        run_step: RunStep::new("create-fusions", start),
        gene_count: model.genes.len(),
        component_count: model.components.len(),
        fusion_count: model.fusions.len(),
        formation_count: model.fusions.iter().map(|x| x.formations.len()).sum(),
        point_count: model.fusions.iter().map(|x| x.point_count()).sum(),
    };
    write_run_stats(&settings.output_dir, &run_stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_tree::test_utils::*;
    use crate::gene::GeneSet;

    /// a={g0,g1} and b={g2} fuse to form c={g3}, where c's tree also holds a and b domains
    fn get_test_components() -> Vec<Component> {
        vec![
            // a: ((g0,g1),g3)
            Component::new(
                0,
                GeneSet::from([0, 1]),
                None,
                build_tree(
                    &[None, None, Some(0), Some(1), Some(3)],
                    &[(0, 1), (1, 2), (1, 3), (0, 4)],
                ),
            ),
            // b: (g2,g3)
            Component::new(1, GeneSet::from([2]), None, build_star_tree(&[2, 3])),
            // c: (g3,(g0,g2))
            Component::new(
                2,
                GeneSet::from([3]),
                None,
                build_tree(
                    &[None, Some(3), None, Some(0), Some(2)],
                    &[(0, 1), (0, 2), (2, 3), (2, 4)],
                ),
            ),
        ]
    }

    #[test]
    fn test_create_fusions() {
        let mut components = get_test_components();

        // c's tree holds minor genes from both a and b, which is only valid for the fused
        // component itself:
        let fusions = create_fusions(2, &mut components, false).unwrap();
        assert_eq!(fusions.len(), 1);
        let fusion = &fusions[0];
        assert_eq!(
            (fusion.component_a, fusion.component_b, fusion.component_c),
            (0, 1, 2)
        );

        // Only the fused component gets a point, as a and b have no minor genes from each other
        assert_eq!(fusion.point_count(), 1);
        assert_eq!(fusion.formations.len(), 1);
        assert_eq!(fusion.formations[0].pertinent_inner, GeneSet::from([3]));

        let point = &fusion.formations[0].points[0];
        assert_eq!(point.component, 2);
        let tree = &components[2].tree;
        assert_eq!(tree.root(), Some(point.node));
        assert!(matches!(
            tree.payload(point.node).unwrap(),
            NodePayload::Point(x) if x.fusion == 0 && x.formation == 0 && x.point == 0
        ));
    }

    #[test]
    fn test_create_fusions_thread_count_independent() {
        // Add a fourth component holding minor genes from b and c, so that several fusions
        // splice points into the same trees:
        let get_components = || {
            let mut components = get_test_components();
            components.push(Component::new(
                3,
                GeneSet::from([4]),
                None,
                build_tree(
                    &[None, None, Some(2), Some(4), Some(3)],
                    &[(0, 1), (1, 2), (1, 3), (0, 4)],
                ),
            ));
            components
        };
        let mut components1 = get_components();
        let mut components2 = get_components();
        let fusions1 = create_fusions(1, &mut components1, false).unwrap();
        let fusions2 = create_fusions(4, &mut components2, false).unwrap();

        assert!(fusions1.len() > 1);
        assert_eq!(fusions1.len(), fusions2.len());
        for (f1, f2) in fusions1.iter().zip(fusions2.iter()) {
            assert_eq!(f1.component_c, f2.component_c);
            assert_eq!(f1.point_count(), f2.point_count());
        }
        for (c1, c2) in components1.iter().zip(components2.iter()) {
            assert_eq!(c1.tree.edges(), c2.tree.edges());
            assert!(c1.tree.validate().is_ok());
        }
        assert!(components1[3].tree.node_count() > 5);
    }
}
