use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to `log_file`.
///
/// `RUST_LOG` wins over `level`. When the log file cannot be created the
/// subscriber writes to stderr instead.
pub fn init(log_file: &Path, level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false);

    let installed = match open_log_file(log_file) {
        Ok(file) => builder.with_writer(Mutex::new(file)).try_init(),
        Err(e) => {
            let installed = builder.with_writer(std::io::stderr).try_init();
            warn!(path = %log_file.display(), "log file unavailable, logging to stderr: {}", e);
            installed
        }
    };

    if let Err(e) = installed {
        debug!("global subscriber already installed, keeping it: {}", e);
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}
