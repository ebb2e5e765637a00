use std::path::PathBuf;

/// Environment variable that overrides the data file location.
pub const DB_ENV: &str = "CAREHOUSE_DB";
/// Environment variable holding a log filter directive (e.g. `debug`).
pub const LOG_ENV: &str = "CAREHOUSE_LOG";

const DATA_DIR: &str = "carehouse";
const DATA_FILE: &str = "carehouse.json";

/// Runtime settings resolved from flags and the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Resolves settings; explicit arguments win over the environment.
    ///
    /// The data file is looked up in this order:
    /// 1. `db` argument.
    /// 2. `CAREHOUSE_DB` environment variable.
    /// 3. `~/.local/share/carehouse/carehouse.json` (on Linux).
    /// 4. `./carehouse.json` (fallback).
    pub fn resolve(db: Option<PathBuf>, verbose: bool) -> Config {
        let db_path = db
            .or_else(|| std::env::var(DB_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(default_db_path);
        let log_filter = std::env::var(LOG_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| if verbose { "debug" } else { "warn" }.to_string());
        Config { db_path, log_filter }
    }
}

fn default_db_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(mut p) => {
            p.push(DATA_DIR);
            p.push(DATA_FILE);
            p
        }
        None => PathBuf::from(DATA_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let cfg = Config::resolve(Some(PathBuf::from("/tmp/x.json")), false);
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn default_path_ends_with_data_file() {
        assert!(default_db_path().ends_with(DATA_FILE));
    }
}
