//! Absolute base directory for scratch workspaces, so they are never created under the
//! current working directory (e.g. when TMPDIR=tmp or TMPDIR=./tmp).

use std::env;
use std::path::PathBuf;

/// Returns the directory scratch workspaces are created in.
///
/// A relative `TMPDIR` would place the scratch project inside the monorepo being packed,
/// where the package manager would pick up the monorepo's own workspace configuration.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        return t;
    }

    #[cfg(windows)]
    {
        ["TEMP", "TMP"]
            .iter()
            .filter_map(|var| env::var_os(var).map(PathBuf::from))
            .find(|p| p.is_absolute())
            .unwrap_or_else(|| PathBuf::from("C:\\Windows\\Temp"))
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/tmp")
    }
}
