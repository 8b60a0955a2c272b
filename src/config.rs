use crate::error::AppError;
use crate::task_store::DEFAULT_STORAGE_KEY;
use crate::theme::ThemeName;
use clap::Parser;
use std::path::PathBuf;

const APP_DIR: &str = "taskboard";
const LOG_FILE: &str = "taskboard.log";

#[derive(Debug, Parser)]
#[command(name = "taskboard", version, about = "Terminal Kanban board")]
pub struct Cli {
    /// Directory holding the board data (defaults to the platform data dir)
    #[arg(long, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Name of the record the task list is stored under
    #[arg(long, value_name = "KEY", default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    #[arg(long, value_enum, default_value_t = ThemeName::Light)]
    pub theme: ThemeName,

    /// Where to write diagnostics (defaults to <data-dir>/taskboard.log)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Keep tasks in memory only; nothing is written to disk
    #[arg(long)]
    pub ephemeral: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub theme: ThemeName,
    pub log_file: PathBuf,
    pub ephemeral: bool,
}

impl Cli {
    pub fn resolve(self) -> Result<Config, AppError> {
        let data_dir = match self.data_dir {
            Some(dir) => dir,
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(AppError::NoDataDir)?,
        };
        let log_file = self.log_file.unwrap_or_else(|| data_dir.join(LOG_FILE));
        Ok(Config {
            data_dir,
            storage_key: self.storage_key,
            theme: self.theme,
            log_file,
            ephemeral: self.ephemeral,
        })
    }
}
