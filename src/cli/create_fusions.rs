use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use const_format::concatcp;
use log::info;
use serde::Serialize;
use simple_error::{SimpleResult, try_with};

use super::utils::check_required_filename;
use crate::filenames::CREATE_FUSIONS_SETTINGS_FILENAME;

#[derive(Args, Serialize)]
pub struct CreateFusionsSettings {
    /// Directory for all create-fusions command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_create_fusions_output"))]
    pub output_dir: Utf8PathBuf,

    /// Model file in json format, listing all genes and the tree of each component
    #[arg(long = "model", value_name = "FILE")]
    pub model_filename: Utf8PathBuf,
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_create_fusions_settings(
    mut settings: CreateFusionsSettings,
) -> SimpleResult<CreateFusionsSettings> {
    check_required_filename(&settings.model_filename, "model")?;

    settings.model_filename = try_with!(
        settings.model_filename.canonicalize_utf8(),
        "Unable to canonicalize model file path: '{}'",
        settings.model_filename
    );

    Ok(settings)
}

/// Write create-fusions settings out in json format
pub fn write_create_fusions_settings(
    output_dir: &Utf8Path,
    settings: &CreateFusionsSettings,
) -> SimpleResult<()> {
    let filename = output_dir.join(CREATE_FUSIONS_SETTINGS_FILENAME);

    info!("Writing create-fusions settings to file: '{filename}'");

    let f = try_with!(
        std::fs::File::create(&filename),
        "Unable to create create-fusions settings json file: '{}'",
        filename
    );
    try_with!(
        serde_json::to_writer_pretty(&f, &settings),
        "Unable to write create-fusions settings json file: '{}'",
        filename
    );
    Ok(())
}
