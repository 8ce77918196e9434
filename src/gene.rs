use std::collections::BTreeSet;

use itertools::Itertools;

/// Index of a gene in the model's gene list
pub type GeneId = usize;

/// Frozen gene set used for component majors/minors, splits and fusion point annotations
///
/// An ordered set is used throughout so that all iteration over gene sets is deterministic.
pub type GeneSet = BTreeSet<GeneId>;

/// A sequence entity with stable accession/index identity
#[derive(Clone, Debug)]
pub struct Gene {
    pub index: GeneId,
    pub accession: String,

    /// Sequence length, this is only ever extended after the gene is created
    pub length: usize,
}

impl Gene {
    pub fn new(index: GeneId, accession: &str, length: usize) -> Self {
        Self {
            index,
            accession: accession.to_string(),
            length,
        }
    }

    /// Extend gene length to at least `length`
    pub fn extend_length(&mut self, length: usize) {
        self.length = std::cmp::max(self.length, length);
    }
}

/// Get the accession of each gene in a gene set
///
/// Gene ids outside of the gene list are rendered as their raw index, so this can be used in
/// error messages describing malformed input.
///
pub fn gene_set_accessions(genes: &[Gene], gene_set: &GeneSet) -> Vec<String> {
    gene_set
        .iter()
        .map(|&x| match genes.get(x) {
            Some(gene) => gene.accession.clone(),
            None => format!("#{x}"),
        })
        .collect()
}

/// Render a gene set as a comma-delimited list of accessions
pub fn gene_set_label(genes: &[Gene], gene_set: &GeneSet) -> String {
    gene_set_accessions(genes, gene_set).iter().join(",")
}
