use std::collections::BTreeSet;
use std::sync::mpsc::channel;

use simple_error::SimpleResult;
use strum::EnumCount;

use super::splits::{ComponentSplits, Split};
use crate::utils::build_worker_pool;

/// How one component's tree relates to a candidate split
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::EnumCount)]
pub enum EvidenceClass {
    /// The split is a non-trivial subset of the component genes, and one of its splits
    For,

    /// The split is a non-trivial subset of the component genes, but the tree contradicts it
    Against,

    /// The split can't be compared to the component
    Unused,
}

pub fn classify_evidence(split: &Split, component_splits: &ComponentSplits) -> EvidenceClass {
    let genes = &component_splits.genes;
    if split.is_empty() || split.len() >= genes.len() || !split.is_subset(genes) {
        EvidenceClass::Unused
    } else if component_splits.splits.contains(split) {
        EvidenceClass::For
    } else {
        EvidenceClass::Against
    }
}

/// Support for one candidate split across all components
#[derive(Clone, Debug)]
pub struct SplitEvidence {
    pub split: Split,

    /// Indices of the components in each evidence class
    pub components: [Vec<usize>; EvidenceClass::COUNT],
}

impl SplitEvidence {
    pub fn new(split: Split) -> Self {
        Self {
            split,
            components: Default::default(),
        }
    }

    pub fn count(&self, evidence_class: EvidenceClass) -> usize {
        self.components[evidence_class as usize].len()
    }

    /// Fraction of comparable components supporting the split
    ///
    /// Returns None if no component is comparable to the split.
    ///
    pub fn frequency(&self) -> Option<f64> {
        let for_count = self.count(EvidenceClass::For);
        let total = for_count + self.count(EvidenceClass::Against);
        if total == 0 {
            None
        } else {
            Some(for_count as f64 / total as f64)
        }
    }

    /// A split is accepted when its frequency is strictly above the cutoff, splits without any
    /// comparable evidence are always rejected
    pub fn is_accepted(&self, cutoff: f64) -> bool {
        matches!(self.frequency(), Some(x) if x > cutoff)
    }
}

pub fn get_split_evidence(
    split: &Split,
    all_component_splits: &[ComponentSplits],
) -> SplitEvidence {
    let mut evidence = SplitEvidence::new(split.clone());
    for component_splits in all_component_splits.iter() {
        let evidence_class = classify_evidence(split, component_splits);
        evidence.components[evidence_class as usize].push(component_splits.component);
    }
    evidence
}

/// Get the evidence for every candidate split, returned in candidate split order
pub fn get_all_split_evidence(
    thread_count: usize,
    candidate_splits: &BTreeSet<Split>,
    all_component_splits: &[ComponentSplits],
) -> SimpleResult<Vec<SplitEvidence>> {
    let worker_pool = build_worker_pool(thread_count)?;

    let (tx, rx) = channel();
    worker_pool.scope(move |scope| {
        for (split_index, split) in candidate_splits.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let evidence = get_split_evidence(split, all_component_splits);
                tx.send((split_index, evidence)).unwrap();
            });
        }
    });

    let mut all_evidence = rx.into_iter().collect::<Vec<_>>();
    all_evidence.sort_by_key(|(split_index, _)| *split_index);
    Ok(all_evidence.into_iter().map(|(_, x)| x).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::GeneSet;

    fn get_component_splits(
        component: usize,
        genes: &[usize],
        splits: &[&[usize]],
    ) -> ComponentSplits {
        ComponentSplits {
            component,
            genes: genes.iter().copied().collect(),
            splits: splits
                .iter()
                .map(|x| x.iter().copied().collect::<GeneSet>())
                .collect(),
        }
    }

    #[test]
    fn test_classify_evidence() {
        let component_splits = get_component_splits(0, &[0, 1, 2, 3], &[&[0, 1], &[2, 3]]);

        use EvidenceClass::*;
        assert_eq!(classify_evidence(&GeneSet::from([0, 1]), &component_splits), For);
        assert_eq!(classify_evidence(&GeneSet::from([0, 2]), &component_splits), Against);
        assert_eq!(classify_evidence(&GeneSet::from([0, 4]), &component_splits), Unused);
        assert_eq!(classify_evidence(&GeneSet::from([0, 1, 2, 3]), &component_splits), Unused);
        assert_eq!(classify_evidence(&GeneSet::new(), &component_splits), Unused);
    }

    #[test]
    fn test_evidence_classes_are_exhaustive() {
        let all_component_splits = vec![
            get_component_splits(0, &[0, 1, 2, 3], &[&[0, 1], &[2, 3]]),
            get_component_splits(1, &[0, 1, 2], &[&[0], &[1, 2]]),
            get_component_splits(2, &[5, 6], &[&[5], &[6]]),
        ];
        for split in [
            GeneSet::from([0, 1]),
            GeneSet::from([1, 2]),
            GeneSet::from([5]),
            GeneSet::new(),
        ] {
            let evidence = get_split_evidence(&split, &all_component_splits);
            let mut seen = evidence
                .components
                .iter()
                .flatten()
                .copied()
                .collect::<Vec<_>>();
            seen.sort();
            assert_eq!(seen, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_frequency() {
        let all_component_splits = vec![
            get_component_splits(0, &[0, 1, 2, 3], &[&[0, 1], &[2, 3]]),
            get_component_splits(1, &[0, 1, 2], &[&[0], &[1, 2]]),
            get_component_splits(2, &[0, 1, 4], &[&[0, 1], &[4]]),
        ];

        let evidence = get_split_evidence(&GeneSet::from([0, 1]), &all_component_splits);
        assert_eq!(evidence.count(EvidenceClass::For), 2);
        assert_eq!(evidence.count(EvidenceClass::Against), 1);
        approx::assert_ulps_eq!(evidence.frequency().unwrap(), 2.0 / 3.0, max_ulps = 4);
        assert!(evidence.is_accepted(0.5));
        assert!(!evidence.is_accepted(0.7));

        // Exactly at the cutoff is rejected
        let evidence = get_split_evidence(&GeneSet::from([2, 3]), &all_component_splits);
        assert_eq!(evidence.frequency(), Some(1.0));
        assert!(!evidence.is_accepted(1.0));

        // No comparable component
        let evidence = get_split_evidence(&GeneSet::from([7]), &all_component_splits);
        assert_eq!(evidence.frequency(), None);
        assert!(!evidence.is_accepted(0.0));
    }

    #[test]
    fn test_all_split_evidence_order() {
        let all_component_splits = vec![get_component_splits(0, &[0, 1, 2], &[&[0], &[1, 2]])];
        let candidate_splits = BTreeSet::from([
            GeneSet::from([0]),
            GeneSet::from([1, 2]),
            GeneSet::from([2]),
        ]);
        let all_evidence =
            get_all_split_evidence(3, &candidate_splits, &all_component_splits).unwrap();
        let splits = all_evidence.iter().map(|x| x.split.clone()).collect::<Vec<_>>();
        assert_eq!(splits, candidate_splits.into_iter().collect::<Vec<_>>());
        assert_eq!(all_evidence[2].count(EvidenceClass::Against), 1);
    }
}
