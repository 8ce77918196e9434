//! Track stats for each groot run step
//!

use std::fs::File;
use std::time::Instant;

use camino::Utf8Path;
use log::info;
use serde::Serialize;
use simple_error::{SimpleResult, try_with};

use crate::filenames::RUN_STATS_FILENAME;
use crate::globals::PROGRAM_VERSION;

#[derive(Serialize)]
pub struct RunStep {
    pub name: String,
    pub version: String,
    pub total_runtime_secs: f64,
}

impl RunStep {
    /// Describe a run step started at `start`, which is complete at the time this is called
    pub fn new(name: &str, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            version: PROGRAM_VERSION.to_string(),
            total_runtime_secs: start.elapsed().as_secs_f64(),
        }
    }
}

#[derive(Serialize)]
pub struct FusionRunStats {
    pub run_step: RunStep,
    pub gene_count: usize,
    pub component_count: usize,
    pub fusion_count: usize,
    pub formation_count: usize,
    pub point_count: usize,
}

#[derive(Serialize)]
pub struct NrfgRunStats {
    pub run_step: RunStep,
    pub gene_count: usize,
    pub component_count: usize,
    pub candidate_split_count: usize,
    pub accepted_split_count: usize,

    /// Candidate splits which no component could be compared to
    pub no_evidence_split_count: usize,

    /// Number of groups in the top-level forest of the recombined splits
    pub top_level_group_count: usize,
}

/// Write run_stats structure out in json format
pub fn write_run_stats<T: Serialize>(output_dir: &Utf8Path, run_stats: &T) -> SimpleResult<()> {
    let filename = output_dir.join(RUN_STATS_FILENAME);

    info!("Writing run statistics to file: '{filename}'");

    let f = try_with!(
        File::create(&filename),
        "Unable to create run statistics json file: '{}'",
        filename
    );

    try_with!(
        serde_json::to_writer_pretty(&f, &run_stats),
        "Unable to write run statistics json file: '{}'",
        filename
    );
    Ok(())
}
