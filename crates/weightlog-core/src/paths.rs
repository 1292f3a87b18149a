// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use crate::{DATABASE_FILE_NAME, ENV_WEIGHTLOG_DATA_DIR, ENV_WEIGHTLOG_DB_PATH};

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[must_use]
pub fn resolve_weightlog_data_dir() -> PathBuf {
    if let Some(explicit) = non_empty_env(ENV_WEIGHTLOG_DATA_DIR) {
        return PathBuf::from(explicit);
    }
    if let Some(xdg_data_home) = non_empty_env("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data_home).join("weightlog");
    }
    if let Some(home) = non_empty_env("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("weightlog");
    }
    PathBuf::from(".weightlog")
}

/// Database location: `WEIGHTLOG_DB_PATH` wins, otherwise a file in the data dir.
#[must_use]
pub fn default_database_path() -> PathBuf {
    if let Some(explicit) = non_empty_env(ENV_WEIGHTLOG_DB_PATH) {
        return PathBuf::from(explicit);
    }
    resolve_weightlog_data_dir().join(DATABASE_FILE_NAME)
}
