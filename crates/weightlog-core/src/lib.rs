// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod canonical;
mod errors;
mod paths;

pub use errors::{ErrorContext, ExitCode, MachineError, ResultExt};
pub use paths::{default_database_path, resolve_weightlog_data_dir};

pub const CRATE_NAME: &str = "weightlog-core";

pub const ENV_WEIGHTLOG_DATA_DIR: &str = "WEIGHTLOG_DATA_DIR";
pub const ENV_WEIGHTLOG_DB_PATH: &str = "WEIGHTLOG_DB_PATH";
pub const DATABASE_FILE_NAME: &str = "weightlog.sqlite";
