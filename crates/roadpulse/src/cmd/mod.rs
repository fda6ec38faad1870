//! Command implementations for the roadpulse CLI

pub mod publish;
pub mod serve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use roadpulse_config::Config;

/// Load the configuration
///
/// An explicit path must exist. Without one, `configs/config.toml` and then
/// `config.toml` are tried before falling back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Config::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()));
    }

    let default_paths = [
        PathBuf::from("configs/config.toml"),
        PathBuf::from("config.toml"),
    ];
    for path in &default_paths {
        if path.exists() {
            return Config::from_file(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()));
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_explicit_missing_path_fails() {
        let err = load_config(Some(Path::new("/nonexistent/roadpulse.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_explicit_path_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nobserver_queue = 4").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server.observer_queue, 4);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nobserver_queue = 0").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("observer_queue"));
    }
}
