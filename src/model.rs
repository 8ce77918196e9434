use log::info;
use simple_error::{SimpleResult, bail};

use crate::component::Component;
use crate::component_tree::NodePayload;
use crate::create_fusions::create_fusions;
use crate::create_nrfg::{Nrfg, create_nrfg};
use crate::fusion::{Fusion, Point, PointRef};
use crate::gene::{Gene, GeneSet, gene_set_label};

/// All genes and components under analysis, together with any fusions found between them
pub struct Model {
    pub genes: Vec<Gene>,
    pub components: Vec<Component>,
    pub fusions: Vec<Fusion>,
}

impl Model {
    /// Components must be in index order, and only refer to genes in the gene list
    pub fn new(genes: Vec<Gene>, components: Vec<Component>) -> SimpleResult<Self> {
        for (gene_index, gene) in genes.iter().enumerate() {
            if gene.index != gene_index {
                bail!(
                    "Gene '{}' has index {}, expected {}",
                    gene.accession,
                    gene.index,
                    gene_index
                );
            }
        }
        for (component_index, component) in components.iter().enumerate() {
            if component.index != component_index {
                bail!(
                    "Component has index {}, expected {}",
                    component.index,
                    component_index
                );
            }
            let all_genes = component
                .major_genes
                .iter()
                .chain(component.minor_genes.iter())
                .chain(component.tree.leaf_genes().iter())
                .copied()
                .collect::<GeneSet>();
            if all_genes.iter().any(|&x| x >= genes.len()) {
                bail!(
                    "Component {} refers to unknown genes: {}",
                    component_index,
                    gene_set_label(&genes, &all_genes)
                );
            }
        }
        Ok(Self {
            genes,
            components,
            fusions: Vec::new(),
        })
    }

    pub fn get_point(&self, point_ref: PointRef) -> Option<&Point> {
        self.fusions
            .get(point_ref.fusion)?
            .formations
            .get(point_ref.formation)?
            .points
            .get(point_ref.point)
    }

    /// Find fusion events and annotate all component trees with fusion points
    ///
    /// Trees are only updated if the whole operation succeeds.
    ///
    pub fn create_fusions(&mut self, thread_count: usize, debug: bool) -> SimpleResult<()> {
        if !self.fusions.is_empty() {
            bail!(
                "Model already has {} fusions, these must be dropped before fusions are created again",
                self.fusions.len()
            );
        }
        let mut components = self.components.clone();
        let fusions = create_fusions(thread_count, &mut components, debug)?;
        self.components = components;
        self.fusions = fusions;
        Ok(())
    }

    /// Remove all fusions, and every fusion point node they added to the component trees
    ///
    /// Returns the number of fusion points removed. Trees are only updated if the whole operation
    /// succeeds.
    ///
    #[allow(dead_code)]
    pub fn drop_fusions(&mut self) -> SimpleResult<usize> {
        let mut components = self.components.clone();
        let mut point_count = 0;
        for point in self
            .fusions
            .iter()
            .flat_map(|x| x.formations.iter())
            .flat_map(|x| x.points.iter())
        {
            let tree = &mut components[point.component].tree;
            let is_point_node = match tree.payload(point.node)? {
                NodePayload::Point(x) => self
                    .get_point(x)
                    .is_some_and(|x| x.component == point.component && x.node == point.node),
                _ => false,
            };
            if !is_point_node {
                bail!(
                    "Fusion point node {} in component {} has lost its fusion point",
                    point.node,
                    point.component
                );
            }
            tree.remove_node(point.node)?;
            point_count += 1;
        }
        self.components = components;
        self.fusions.clear();
        info!("Dropped {point_count} fusion points");
        Ok(point_count)
    }

    /// Build the NRFG skeleton from the splits of every component tree
    pub fn create_nrfg(&self, cutoff: f64, thread_count: usize) -> SimpleResult<Nrfg> {
        create_nrfg(thread_count, cutoff, &self.genes, &self.components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component_tree::test_utils::*;

    fn get_test_model() -> Model {
        let genes = (0..5)
            .map(|x| Gene::new(x, &format!("g{x}"), 100))
            .collect::<Vec<_>>();
        let components = vec![
            Component::new(0, GeneSet::from([0, 1]), None, build_star_tree(&[0, 1, 3])),
            Component::new(1, GeneSet::from([2]), None, build_star_tree(&[2, 3])),
            Component::new(2, GeneSet::from([3]), None, build_star_tree(&[0, 2, 3])),
            // Component with b-side and fused minor genes, which gets a spliced point
            Component::new(
                3,
                GeneSet::from([4]),
                None,
                build_tree(
                    &[None, None, Some(2), Some(4), Some(3)],
                    &[(0, 1), (1, 2), (1, 3), (0, 4)],
                ),
            ),
        ];
        Model::new(genes, components).unwrap()
    }

    #[test]
    fn test_model_rejects_unknown_gene() {
        let genes = vec![Gene::new(0, "g0", 0)];
        let components = vec![Component::new(
            0,
            GeneSet::from([0]),
            None,
            build_star_tree(&[0, 1]),
        )];
        assert!(Model::new(genes, components).is_err());
    }

    #[test]
    fn test_create_fusions_with_shared_fused_majors() {
        // Fused component 2 has majors g0,g1,g2, repeating the majors of components 0 and 1
        let genes = (0..3)
            .map(|x| Gene::new(x, &format!("g{x}"), 100))
            .collect::<Vec<_>>();
        let components = vec![
            Component::new(0, GeneSet::from([0, 1]), None, build_star_tree(&[0, 1, 2])),
            Component::new(1, GeneSet::from([2]), None, build_star_tree(&[0, 1, 2])),
            Component::new(2, GeneSet::from([0, 1, 2]), None, build_star_tree(&[0, 1, 2])),
        ];
        let mut model = Model::new(genes, components).unwrap();
        model.create_fusions(2, false).unwrap();

        assert_eq!(model.fusions.len(), 1);
        let fusion = &model.fusions[0];
        assert_eq!(
            (fusion.component_a, fusion.component_b, fusion.component_c),
            (0, 1, 2)
        );

        // One point per component, each in its own formation:
        assert_eq!(fusion.point_count(), 3);
        assert_eq!(fusion.formations.len(), 3);
        for component in model.components.iter() {
            assert!(component.tree.validate().is_ok());
        }
    }

    #[test]
    fn test_create_and_drop_fusions() {
        let mut model = get_test_model();
        let edges_before = model
            .components
            .iter()
            .map(|x| x.tree.edges())
            .collect::<Vec<_>>();

        model.create_fusions(2, false).unwrap();
        assert!(!model.fusions.is_empty());

        // Every point is reachable from its node payload:
        for fusion in model.fusions.iter() {
            for formation in fusion.formations.iter() {
                for point in formation.points.iter() {
                    let payload = model.components[point.component]
                        .tree
                        .payload(point.node)
                        .unwrap();
                    let NodePayload::Point(point_ref) = payload else {
                        panic!("Fusion point node is missing its payload");
                    };
                    assert_eq!(model.get_point(point_ref).unwrap().node, point.node);
                }
            }
        }

        // Fusions can't be created twice:
        assert!(model.create_fusions(1, false).is_err());

        let point_count = model.fusions.iter().map(|x| x.point_count()).sum::<usize>();
        assert_eq!(model.drop_fusions().unwrap(), point_count);
        assert!(model.fusions.is_empty());

        let edges_after = model
            .components
            .iter()
            .map(|x| x.tree.edges())
            .collect::<Vec<_>>();
        assert_eq!(edges_before, edges_after);

        // ...and can be created again after dropping
        assert!(model.create_fusions(1, false).is_ok());
    }
}
