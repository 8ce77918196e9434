use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use const_format::concatcp;
use log::info;
use serde::Serialize;
use simple_error::{SimpleResult, bail, try_with};

use super::utils::check_required_filename;
use crate::filenames::CREATE_NRFG_SETTINGS_FILENAME;

#[derive(Args, Serialize)]
pub struct CreateNrfgSettings {
    /// Directory for all create-nrfg command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_create_nrfg_output"))]
    pub output_dir: Utf8PathBuf,

    /// Model file in json format, listing all genes and the tree of each component
    #[arg(long = "model", value_name = "FILE")]
    pub model_filename: Utf8PathBuf,

    /// Split frequency cutoff
    ///
    /// A candidate split is accepted when the fraction of comparable components supporting it is
    /// strictly greater than this value. Must be in [0,1).
    ///
    #[arg(long, default_value_t = 0.5)]
    pub cutoff: f64,
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_create_nrfg_settings(
    mut settings: CreateNrfgSettings,
) -> SimpleResult<CreateNrfgSettings> {
    check_required_filename(&settings.model_filename, "model")?;

    if !(0.0..1.0).contains(&settings.cutoff) {
        bail!("--cutoff argument must be in [0,1)");
    }

    settings.model_filename = try_with!(
        settings.model_filename.canonicalize_utf8(),
        "Unable to canonicalize model file path: '{}'",
        settings.model_filename
    );

    Ok(settings)
}

/// Write create-nrfg settings out in json format
pub fn write_create_nrfg_settings(
    output_dir: &Utf8Path,
    settings: &CreateNrfgSettings,
) -> SimpleResult<()> {
    let filename = output_dir.join(CREATE_NRFG_SETTINGS_FILENAME);

    info!("Writing create-nrfg settings to file: '{filename}'");

    let f = try_with!(
        std::fs::File::create(&filename),
        "Unable to create create-nrfg settings json file: '{}'",
        filename
    );
    try_with!(
        serde_json::to_writer_pretty(&f, &settings),
        "Unable to write create-nrfg settings json file: '{}'",
        filename
    );
    Ok(())
}
