use crate::error::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Default log file under the user's cache directory
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("heart-particles").join("heart-particles.log"))
}

/// Route `tracing` events to a log file (stdout belongs to the TUI).
/// `RUST_LOG` overrides the default `info` filter. Returns the file in use.
pub fn init(log_file: Option<&Path>) -> Result<Option<PathBuf>> {
    let Some(path) = log_file.map(Path::to_path_buf).or_else(default_log_path) else {
        return Ok(None);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A subscriber may already be installed (tests, repeated init)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("run.log");

        let used = init(Some(&path)).unwrap();
        assert_eq!(used.as_deref(), Some(path.as_path()));
        assert!(path.exists());
    }
}
