use std::fmt;

use itertools::Itertools;
use serde_json::Value;
use simple_error::{SimpleResult, bail};

use super::splits::Split;
use crate::gene::{Gene, GeneId, GeneSet, gene_set_label};

/// Node of the nested grouping built from accepted splits
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum JoinToken {
    Gene(GeneId),
    Group(Vec<JoinToken>),
}

impl JoinToken {
    /// All genes under this token
    pub fn genes(&self) -> GeneSet {
        let mut genes = GeneSet::new();
        self.add_genes(&mut genes);
        genes
    }

    fn add_genes(&self, genes: &mut GeneSet) {
        match self {
            JoinToken::Gene(x) => {
                genes.insert(*x);
            }
            JoinToken::Group(x) => {
                for token in x.iter() {
                    token.add_genes(genes);
                }
            }
        }
    }

    /// Render as a Newick-like nested group of gene accessions, without the terminating ';'
    pub fn to_newick(&self, genes: &[Gene]) -> String {
        match self {
            JoinToken::Gene(x) => genes[*x].accession.clone(),
            JoinToken::Group(x) => format!("({})", x.iter().map(|t| t.to_newick(genes)).join(",")),
        }
    }

    /// Render as nested json arrays of gene accessions
    pub fn to_json(&self, genes: &[Gene]) -> Value {
        match self {
            JoinToken::Gene(x) => Value::String(genes[*x].accession.clone()),
            JoinToken::Group(x) => Value::Array(x.iter().map(|t| t.to_json(genes)).collect()),
        }
    }
}

impl fmt::Display for JoinToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JoinToken::Gene(x) => write!(f, "#{x}"),
            JoinToken::Group(x) => write!(f, "({})", x.iter().join(",")),
        }
    }
}

/// Sort splits by increasing gene count, then by gene content
pub fn sort_splits_for_recombination(splits: &mut [Split]) {
    splits.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
}

/// Combine accepted splits into a nested grouping, processing splits from smallest to largest
///
/// Each split gathers all existing top-level groups with genes contained in it into a new group.
/// A split containing no existing group is only valid if it is a single gene.
///
/// Returns the top-level forest of the grouping.
///
pub fn recombine(genes: &[Gene], accepted_splits: &[Split]) -> SimpleResult<Vec<JoinToken>> {
    let mut splits = accepted_splits.to_vec();
    sort_splits_for_recombination(&mut splits);

    // Each top-level token is stored with its flattened gene set:
    let mut joins: Vec<(GeneSet, JoinToken)> = Vec::new();
    for split in splits {
        let (matched, remaining): (Vec<_>, Vec<_>) = joins
            .into_iter()
            .partition(|(token_genes, _)| token_genes.is_subset(&split));
        joins = remaining;

        let token = if !matched.is_empty() {
            JoinToken::Group(matched.into_iter().map(|(_, x)| x).collect())
        } else if let (1, Some(&gene)) = (split.len(), split.first()) {
            JoinToken::Gene(gene)
        } else {
            bail!(
                "Unable to recombine split [{}], it contains no existing group. Current groups: {}",
                gene_set_label(genes, &split),
                joins.iter().map(|(_, x)| x.to_newick(genes)).join(" ")
            );
        };
        joins.push((token.genes(), token));
    }

    Ok(joins.into_iter().map(|(_, x)| x).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_genes(count: usize) -> Vec<Gene> {
        (0..count)
            .map(|x| Gene::new(x, &format!("g{x}"), 0))
            .collect()
    }

    fn to_splits(splits: &[&[usize]]) -> Vec<Split> {
        splits
            .iter()
            .map(|x| x.iter().copied().collect::<Split>())
            .collect()
    }

    #[test]
    fn test_recombine_nested_hierarchy() {
        let genes = get_genes(4);
        let splits = to_splits(&[&[0, 1, 2], &[3], &[0, 1], &[2], &[1], &[0]]);
        let joins = recombine(&genes, &splits).unwrap();

        assert_eq!(joins.len(), 2);
        assert_eq!(joins[0], JoinToken::Gene(3));
        assert_eq!(joins[1].to_newick(&genes), "(g2,(g0,g1))");
        assert_eq!(joins[1].genes(), GeneSet::from([0, 1, 2]));
    }

    /// After each split, every top-level token is either inside the split or disjoint from it
    #[test]
    fn test_recombine_keeps_hierarchy() {
        let genes = get_genes(6);
        let mut splits = to_splits(&[
            &[0],
            &[1],
            &[2],
            &[3],
            &[4],
            &[5],
            &[0, 1],
            &[3, 4],
            &[0, 1, 2],
            &[3, 4, 5],
        ]);
        sort_splits_for_recombination(&mut splits);

        for end in 1..=splits.len() {
            let joins = recombine(&genes, &splits[..end]).unwrap();
            let split = &splits[end - 1];
            for token in joins.iter() {
                let token_genes = token.genes();
                assert!(token_genes.is_subset(split) || token_genes.is_disjoint(split));
            }
        }
    }

    #[test]
    fn test_recombine_fails_without_match() {
        let genes = get_genes(3);
        let splits = to_splits(&[&[0], &[1, 2]]);
        let err = recombine(&genes, &splits).unwrap_err();
        assert!(err.to_string().contains("g1,g2"), "{err}");
    }

    #[test]
    fn test_display() {
        let token = JoinToken::Group(vec![
            JoinToken::Gene(2),
            JoinToken::Group(vec![JoinToken::Gene(0)]),
        ]);
        assert_eq!(token.to_string(), "(#2,(#0))");
    }
}
