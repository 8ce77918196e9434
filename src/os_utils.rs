//! Utilities pertaining to filesystem and other os-level settings
//!

use camino::Utf8Path;
use simple_error::{SimpleResult, try_with};

/// Create a novel directory path if it does not exist already
///
/// If the directory already exists no operations are performed
///
/// * `label` - used to describe the error directory in an error message
///
pub fn create_dir_all(dir: &Utf8Path, label: &str) -> SimpleResult<()> {
    if !dir.is_dir() {
        try_with!(
            std::fs::create_dir_all(dir),
            "Can't create new {} directory at '{}'",
            label,
            dir
        );
    }
    Ok(())
}
