use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "depot")]
#[command(about = "Build artifact repository server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir, if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Artifact store directory (overrides config and DEPOT_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Print stored revisions, newest first
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the link to the newest artifact for a platform
    Latest {
        /// Platform token, e.g. linux
        platform: String,
    },

    /// Print the build status of the newest revision for a platform
    Status {
        /// Platform token, e.g. linux
        platform: String,
    },
}
