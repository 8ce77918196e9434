mod create_fusions;
mod create_nrfg;
mod shared;
mod utils;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use simple_error::{SimpleResult, bail};

use self::create_fusions::validate_and_fix_create_fusions_settings;
pub use self::create_fusions::{CreateFusionsSettings, write_create_fusions_settings};
use self::create_nrfg::validate_and_fix_create_nrfg_settings;
pub use self::create_nrfg::{CreateNrfgSettings, write_create_nrfg_settings};
use self::shared::validate_and_fix_shared_settings;
pub use self::shared::SharedSettings;

#[derive(Subcommand)]
pub enum Commands {
    /// Find fusion events between components and annotate every component tree with fusion points
    CreateFusions(CreateFusionsSettings),

    /// Build the n-rooted fusion graph skeleton from the consensus of all component tree splits
    CreateNrfg(CreateNrfgSettings),
}

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
#[clap(propagate_version = true, rename_all = "kebab_case")]
pub struct Settings {
    #[command(flatten)]
    pub shared: SharedSettings,

    #[command(subcommand)]
    pub command: Commands,
}

impl Settings {
    pub fn get_output_dir(&self) -> &Utf8Path {
        match &self.command {
            Commands::CreateFusions(x) => &x.output_dir,
            Commands::CreateNrfg(x) => &x.output_dir,
        }
    }
}

/// Checks if a directory does not exist
///
pub fn check_novel_dirname(dirname: &Utf8Path, label: &str) -> SimpleResult<()> {
    if dirname.exists() {
        bail!("{} already exists: \"{}\"", label, dirname);
    }
    Ok(())
}

/// Validate settings and update parameters that can't be processed by clap
///
pub fn validate_and_fix_settings_impl(mut settings: Settings) -> SimpleResult<Settings> {
    settings.shared = validate_and_fix_shared_settings(settings.shared)?;

    settings.command = match settings.command {
        Commands::CreateFusions(x) => {
            let x = validate_and_fix_create_fusions_settings(x)?;
            Commands::CreateFusions(x)
        }
        Commands::CreateNrfg(x) => {
            let x = validate_and_fix_create_nrfg_settings(x)?;
            Commands::CreateNrfg(x)
        }
    };

    Ok(settings)
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_settings(settings: Settings) -> Settings {
    match validate_and_fix_settings_impl(settings) {
        Ok(x) => x,
        Err(msg) => {
            eprintln!("Invalid command-line setting: {}", msg);
            std::process::exit(exitcode::USAGE);
        }
    }
}

pub fn parse_settings() -> Settings {
    Settings::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_nrfg() {
        let settings = Settings::try_parse_from([
            "groot",
            "create-nrfg",
            "--model",
            concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"),
            "--cutoff",
            "0.7",
            "--threads",
            "2",
        ])
        .unwrap();
        let settings = validate_and_fix_settings_impl(settings).unwrap();
        assert_eq!(settings.shared.thread_count, 2);
        let Commands::CreateNrfg(x) = &settings.command else {
            panic!("Wrong subcommand");
        };
        approx::assert_ulps_eq!(x.cutoff, 0.7, max_ulps = 4);
        assert_eq!(settings.get_output_dir().as_str(), "groot_create_nrfg_output");
    }

    #[test]
    fn test_invalid_threads() {
        let settings = Settings::try_parse_from([
            "groot",
            "create-fusions",
            "--model",
            "model.json",
            "--threads",
            "0",
        ])
        .unwrap();
        assert!(validate_and_fix_settings_impl(settings).is_err());
    }
}
