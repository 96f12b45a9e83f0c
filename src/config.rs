use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "MATCHUP_DATA_DIR";

pub const PLAYER_STATS_FILE: &str = "player_stats_latest.json";
pub const MATCHES_FILE: &str = "all_matches_latest.json";
pub const SUMMARY_FILE: &str = "combined/player_summary.json";

/// Where league data is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Dir(PathBuf),
    /// The league compiled into the binary.
    Demo,
}

impl DataSource {
    /// `--data` flag first, then `MATCHUP_DATA_DIR`, then the demo league.
    pub fn resolve(flag: Option<PathBuf>) -> DataSource {
        Self::resolve_with(flag, std::env::var_os(DATA_DIR_ENV))
    }

    fn resolve_with(flag: Option<PathBuf>, env: Option<OsString>) -> DataSource {
        if let Some(dir) = flag {
            return DataSource::Dir(dir);
        }
        match env {
            Some(dir) if !dir.is_empty() => DataSource::Dir(PathBuf::from(dir)),
            _ => DataSource::Demo,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Dir(dir) => write!(f, "{}", dir.display()),
            DataSource::Demo => write!(f, "built-in demo league"),
        }
    }
}
