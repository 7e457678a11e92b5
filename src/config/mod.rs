pub mod toml_config;

pub use toml_config::LocationsConfig;

#[cfg(feature = "cli")]
pub mod cli {
    use crate::domain::model::StorageLocationType;
    use clap::{Parser, Subcommand};

    #[derive(Debug, Clone, Parser)]
    #[command(name = "storage-locations")]
    #[command(about = "Inspect and validate configured storage locations")]
    pub struct CliConfig {
        /// Path to TOML configuration file
        #[arg(short, long, default_value = "storage-locations.toml")]
        pub config: String,

        /// Enable verbose output
        #[arg(short, long)]
        pub verbose: bool,

        /// Emit logs as JSON lines
        #[arg(long)]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Check that storage locations are reachable
        Validate {
            /// Only validate this location
            #[arg(long, conflicts_with = "location_type")]
            id: Option<String>,

            /// Only validate locations of this type (e.g. backup, station_media)
            #[arg(long = "type")]
            location_type: Option<StorageLocationType>,
        },
        /// Print the URI of a storage location
        Uri {
            #[arg(long)]
            id: String,

            /// Path appended to the location path
            #[arg(long)]
            suffix: Option<String>,
        },
        /// List files in a storage location
        List {
            #[arg(long)]
            id: String,

            /// Directory relative to the location root
            #[arg(default_value = "")]
            path: String,

            /// Recurse into subdirectories
            #[arg(long)]
            deep: bool,
        },
    }
}

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
