// ==========================================
// BOM Navigator - store configuration
// ==========================================
// Explicit, passed-in configuration: callers construct a StoreConfig
// and hand it to BomStore::open. No ambient global state.
// ==========================================

use std::path::PathBuf;

/// Environment variable overriding the database location
/// (debugging / tests / CI).
pub const DB_PATH_ENV: &str = "BOM_NAVIGATOR_DB_PATH";

/// Location of the index database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path of the SQLite index database file.
    pub db_path: String,
}

impl StoreConfig {
    /// Config pointing at an explicit database file.
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Resolve the default database path.
///
/// # Returns
/// - dev builds: user data dir / bom-navigator-dev / bom_navigator.db
/// - release builds: user data dir / bom-navigator / bom_navigator.db
/// - fallback: ./bom_navigator.db when no user data dir is available
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./bom_navigator.db");

    if let Some(data_dir) = dirs::data_dir() {
        // Dev builds get their own directory so they never touch the
        // production index.
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("bom-navigator-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("bom-navigator");
        }

        std::fs::create_dir_all(&path).ok();
        path = path.join("bom_navigator.db");
    }

    path.to_string_lossy().to_string()
}
