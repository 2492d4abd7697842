//! Host platform utility functions

use std::path::PathBuf;

/// The environment variable which points at the root of the software
/// checkout. Parameter files are found in `$DRIVE_SW_ROOT/params` and
/// sessions are created underneath it.
pub const SW_ROOT_ENV_VAR: &str = "DRIVE_SW_ROOT";

/// Get the root directory of the software.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
