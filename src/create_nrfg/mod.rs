mod evidence;
mod recombine;
mod splits;

use std::time::Instant;

use log::info;
use simple_error::{SimpleResult, bail};

pub use self::evidence::{EvidenceClass, SplitEvidence};
use self::evidence::get_all_split_evidence;
pub use self::recombine::JoinToken;
use self::recombine::recombine;
pub use self::splits::Split;
use self::splits::get_all_splits;
use crate::cli::{CreateNrfgSettings, SharedSettings, write_create_nrfg_settings};
use crate::component::Component;
use crate::gene::Gene;
use crate::model_input::read_model;
use crate::nrfg_output::{write_nrfg_json, write_nrfg_newick, write_split_table};
use crate::run_stats::{NrfgRunStats, RunStep, write_run_stats};

/// Consensus grouping of all genes built from the component tree splits
pub struct Nrfg {
    /// Evidence for every candidate split, in candidate split order
    pub split_evidence: Vec<SplitEvidence>,

    pub accepted_splits: Vec<Split>,

    /// Top-level forest of the recombined grouping
    pub joins: Vec<JoinToken>,
}

impl Nrfg {
    /// Single root token for the grouping, wrapping the top-level forest when it has more than
    /// one token
    pub fn root(&self) -> Option<JoinToken> {
        match self.joins.len() {
            0 => None,
            1 => Some(self.joins[0].clone()),
            _ => Some(JoinToken::Group(self.joins.clone())),
        }
    }

    /// Count of candidate splits without any comparable component
    pub fn no_evidence_split_count(&self) -> usize {
        self.split_evidence
            .iter()
            .filter(|x| x.frequency().is_none())
            .count()
    }
}

/// Build the consensus grouping from all component trees
///
/// Every tree edge contributes a candidate split. Splits supported by a frequency of
/// components above `cutoff` are accepted, then combined from smallest to largest into a
/// nested grouping.
///
pub fn create_nrfg(
    thread_count: usize,
    cutoff: f64,
    genes: &[Gene],
    components: &[Component],
) -> SimpleResult<Nrfg> {
    if !(0.0..1.0).contains(&cutoff) {
        bail!("Split frequency cutoff must be in [0,1), found {}", cutoff);
    }

    info!("Finding component tree splits");
    let (candidate_splits, all_component_splits) = get_all_splits(thread_count, components)?;
    info!("Found {} candidate splits", candidate_splits.len());

    info!("Finding split evidence");
    let split_evidence =
        get_all_split_evidence(thread_count, &candidate_splits, &all_component_splits)?;

    let accepted_splits = split_evidence
        .iter()
        .filter(|x| x.is_accepted(cutoff))
        .map(|x| x.split.clone())
        .collect::<Vec<_>>();
    info!(
        "Accepted {} of {} candidate splits with frequency above {cutoff}",
        accepted_splits.len(),
        candidate_splits.len()
    );

    info!("Recombining accepted splits");
    let joins = recombine(genes, &accepted_splits)?;
    info!("Recombined splits into {} top-level groups", joins.len());

    Ok(Nrfg {
        split_evidence,
        accepted_splits,
        joins,
    })
}

pub fn run_create_nrfg(
    shared_settings: &SharedSettings,
    settings: &CreateNrfgSettings,
) -> SimpleResult<()> {
    let start = Instant::now();

    write_create_nrfg_settings(&settings.output_dir, settings)?;

    let model = read_model(&settings.model_filename)?;

    let nrfg = model.create_nrfg(settings.cutoff, shared_settings.thread_count)?;

    write_split_table(&settings.output_dir, &model.genes, &nrfg)?;
    write_nrfg_json(&settings.output_dir, &model.genes, &nrfg)?;
    write_nrfg_newick(&settings.output_dir, &model.genes, &nrfg)?;

    let run_stats = NrfgRunStats {
        run_step: RunStep::new("create-nrfg", start),
        gene_count: model.genes.len(),
        component_count: model.components.len(),
        candidate_split_count: nrfg.split_evidence.len(),
        accepted_split_count: nrfg.accepted_splits.len(),
        no_evidence_split_count: nrfg.no_evidence_split_count(),
        top_level_group_count: nrfg.joins.len(),
    };
    write_run_stats(&settings.output_dir, &run_stats)
}
