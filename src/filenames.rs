//! Names of all files written to the output directory
//!

pub const CREATE_FUSIONS_SETTINGS_FILENAME: &str = "create_fusions.settings.json";
pub const CREATE_NRFG_SETTINGS_FILENAME: &str = "create_nrfg.settings.json";

pub const RUN_STATS_FILENAME: &str = "run.stats.json";

pub const FUSION_JSON_FILENAME: &str = "fusions.json";
pub const FUSION_TABLE_FILENAME: &str = "fusions.tsv";

pub const NRFG_JSON_FILENAME: &str = "nrfg.json";
pub const NRFG_NEWICK_FILENAME: &str = "nrfg.nwk";
pub const SPLIT_TABLE_FILENAME: &str = "splits.tsv";
