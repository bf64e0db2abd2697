use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{find_dir_containing, Config, CONFIG_FN, DEFAULT_ISSUE_DIR, PLUGINS_FN};

#[derive(Parser, Debug)]
#[command(
    name = "ditzui",
    about = "Desktop front-end for browsing and editing ditz issues",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Issue database dir
    #[arg(long, global = true)]
    pub issue_dir: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

    /// Plugins file
    #[arg(long, global = true)]
    pub plugins_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// List all hooks and descriptions, and quit
    #[arg(short = 'l', long)]
    pub list_hooks: bool,

    /// Show closed issues as well as open ones
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new issue database
    Init(InitArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name (defaults to the current directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Component names; the project name is used when none are given
    #[arg(long = "component")]
    pub components: Vec<String>,
}

impl Cli {
    /// `--config-file`, else the nearest `.ditz-config` above `cwd`, else `./.ditz-config`.
    pub fn config_path(&self, cwd: &Path) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| nearest(cwd, CONFIG_FN))
    }

    pub fn plugins_path(&self, cwd: &Path) -> PathBuf {
        self.plugins_file
            .clone()
            .unwrap_or_else(|| nearest(cwd, PLUGINS_FN))
    }

    /// `--issue-dir`, else the config's `issue_dir`, else `.ditz`.
    pub fn issue_dir(&self, config: &Config) -> PathBuf {
        self.issue_dir
            .clone()
            .or_else(|| config.issue_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ISSUE_DIR))
    }
}

fn nearest(cwd: &Path, file_name: &str) -> PathBuf {
    find_dir_containing(cwd, file_name)
        .unwrap_or_else(|| cwd.to_path_buf())
        .join(file_name)
}
