//! Read the model under analysis from a JSON file
//!
//! The input describes each component as its major gene accessions, optional minor gene
//! accessions, and a tree given as a node list plus (parent, child) edge list over node indices.
//!

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

use camino::Utf8Path;
use log::info;
use serde::Deserialize;
use simple_error::{SimpleResult, bail, try_with};

use crate::component::Component;
use crate::component_tree::{ComponentTree, NodeIndex, NodePayload};
use crate::gene::{Gene, GeneId, GeneSet};
use crate::model::Model;

#[derive(Deserialize)]
pub struct GeneInput {
    pub accession: String,

    #[serde(default)]
    pub length: usize,
}

#[derive(Default, Deserialize)]
pub struct TreeNodeInput {
    /// Accession of the gene carried by this node, if any
    #[serde(default)]
    pub gene: Option<String>,
}

#[derive(Deserialize)]
pub struct TreeInput {
    pub nodes: Vec<TreeNodeInput>,
    pub edges: Vec<(NodeIndex, NodeIndex)>,
}

#[derive(Deserialize)]
pub struct ComponentInput {
    pub major_genes: Vec<String>,

    /// Derived from the tree when not given
    #[serde(default)]
    pub minor_genes: Option<Vec<String>>,

    pub tree: TreeInput,
}

#[derive(Deserialize)]
pub struct ModelInput {
    pub genes: Vec<GeneInput>,
    pub components: Vec<ComponentInput>,
}

struct GeneRegistry {
    genes: Vec<Gene>,
    accession_map: HashMap<String, GeneId>,
}

impl GeneRegistry {
    /// Repeated accessions refer to the same gene, extending its length as needed
    fn from_input(gene_inputs: &[GeneInput]) -> SimpleResult<Self> {
        let mut registry = Self {
            genes: Vec::new(),
            accession_map: HashMap::new(),
        };
        for gene_input in gene_inputs.iter() {
            if gene_input.accession.is_empty() {
                bail!("Gene accession is empty");
            }
            match registry.accession_map.get(&gene_input.accession) {
                Some(&index) => registry.genes[index].extend_length(gene_input.length),
                None => {
                    let index = registry.genes.len();
                    registry
                        .genes
                        .push(Gene::new(index, &gene_input.accession, gene_input.length));
                    registry
                        .accession_map
                        .insert(gene_input.accession.clone(), index);
                }
            }
        }
        Ok(registry)
    }

    fn get(&self, accession: &str) -> SimpleResult<GeneId> {
        match self.accession_map.get(accession) {
            Some(&x) => Ok(x),
            None => bail!("Unknown gene accession: '{}'", accession),
        }
    }

    fn get_set(&self, accessions: &[String]) -> SimpleResult<GeneSet> {
        accessions.iter().map(|x| self.get(x)).collect()
    }
}

fn get_component_tree(
    registry: &GeneRegistry,
    tree_input: &TreeInput,
) -> SimpleResult<ComponentTree> {
    let payloads = tree_input
        .nodes
        .iter()
        .map(|x| match &x.gene {
            Some(accession) => Ok(NodePayload::Gene(registry.get(accession)?)),
            None => Ok(NodePayload::Empty),
        })
        .collect::<SimpleResult<Vec<_>>>()?;
    ComponentTree::from_edges(&payloads, &tree_input.edges)
}

impl Model {
    pub fn from_input(model_input: &ModelInput) -> SimpleResult<Self> {
        let registry = GeneRegistry::from_input(&model_input.genes)?;

        let mut components = Vec::new();
        for (component_index, component_input) in model_input.components.iter().enumerate() {
            let major_genes = try_with!(
                registry.get_set(&component_input.major_genes),
                "Invalid major genes for component {}",
                component_index
            );
            if major_genes.is_empty() {
                bail!("Component {} has no major genes", component_index);
            }
            let minor_genes = match &component_input.minor_genes {
                Some(x) => Some(try_with!(
                    registry.get_set(x),
                    "Invalid minor genes for component {}",
                    component_index
                )),
                None => None,
            };
            let tree = try_with!(
                get_component_tree(&registry, &component_input.tree),
                "Invalid tree for component {}",
                component_index
            );
            components.push(Component::new(
                component_index,
                major_genes,
                minor_genes,
                tree,
            ));
        }

        Self::new(registry.genes, components)
    }
}

/// Read and validate the model JSON file
pub fn read_model(filename: &Utf8Path) -> SimpleResult<Model> {
    info!("Reading model from file: '{filename}'");

    let file = try_with!(
        File::open(filename),
        "Unable to open model json file: '{}'",
        filename
    );
    let reader = BufReader::new(file);
    let model_input: ModelInput = try_with!(
        serde_json::from_reader(reader),
        "Unable to parse model from json file: '{}'",
        filename
    );
    let model = try_with!(
        Model::from_input(&model_input),
        "Invalid model in json file: '{}'",
        filename
    );

    info!(
        "Read {} genes in {} components",
        model.genes.len(),
        model.components.len()
    );
    Ok(model)
}
