//! Zenodo CLI Library
//!
//! Client for publishing model archives to Zenodo and bringing them back.
//!
//! # Overview
//!
//! - **Archiving**: zip a training output folder (`zenodo zip`), unpack
//!   downloaded archives (`zenodo extract`)
//! - **Depositing**: create a deposition, upload an archive, attach metadata
//!   and publish (`zenodo upload`, `zenodo publish`)
//! - **Fetching**: download every model archive in the account and extract
//!   the `.pt` weights (`zenodo download`)
//!
//! All HTTP traffic goes through [`api::ZenodoClient`], which carries the
//! access token. The library only emits `tracing` events; the binary
//! installs the subscriber.

pub mod api;
pub mod archive;
pub mod commands;
pub mod config;
pub mod deposit;
pub mod error;
pub mod fetch;
pub mod progress;

// Re-export commonly used types
pub use api::{AuthScheme, ZenodoClient};
pub use config::Config;
pub use error::{Result, ZenodoError};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Zenodo - publish and fetch model archives
#[derive(Parser, Debug)]
#[command(name = "zenodo")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Zenodo instance URL
    #[arg(long, env = "ZENODO_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Use the Zenodo sandbox instead of production
    #[arg(long, global = true, conflicts_with = "base_url")]
    pub sandbox: bool,

    /// Personal access token
    #[arg(long, env = "ZENODO_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// How the token is sent: bearer or query
    #[arg(long, env = "ZENODO_AUTH", global = true)]
    pub auth: Option<AuthScheme>,
}

impl Cli {
    /// Environment configuration with command-line overrides applied
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::from_env()?;

        if self.sandbox {
            config.set_base_url(config::SANDBOX_BASE_URL);
        } else if let Some(ref url) = self.base_url {
            config.set_base_url(url.clone());
        }

        if let Some(ref token) = self.token {
            config.set_token(token.clone());
        }

        if let Some(auth) = self.auth {
            config.auth_scheme = auth;
        }

        Ok(config)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Zip a folder into a sibling .zip archive
    Zip {
        /// Folder to archive
        folder: PathBuf,
    },

    /// Extract a .zip, .tar.gz/.tgz or .tar archive
    Extract {
        /// Archive to extract
        archive: PathBuf,

        /// Destination directory (defaults to the archive's directory)
        #[arg(short, long)]
        dest: Option<PathBuf>,
    },

    /// Upload a file (or zipped folder) as a new deposition
    Upload {
        /// File, or folder to zip first
        path: PathBuf,

        #[command(flatten)]
        metadata: MetadataArgs,
    },

    /// Attach metadata to a deposition and publish it
    Publish {
        /// Deposition id
        deposition_id: u64,

        #[command(flatten)]
        metadata: MetadataArgs,
    },

    /// Download and extract every model archive in the account
    Download {
        /// Directory to extract models into
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

/// Deposition metadata flags
#[derive(clap::Args, Debug, Clone, Default)]
pub struct MetadataArgs {
    /// Deposition title; required to publish
    #[arg(short, long)]
    pub title: Option<String>,

    /// Deposition description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Creator as "Name=Affiliation" (repeatable, order is kept)
    #[arg(short, long = "creator", value_parser = parse_creator)]
    pub creators: Vec<(String, String)>,
}

impl MetadataArgs {
    /// Metadata document, or `None` when no title was given
    pub fn to_metadata(&self) -> Option<api::DepositionMetadata> {
        let title = self.title.as_ref()?;
        Some(api::DepositionMetadata::new(
            title.clone(),
            self.description.clone(),
            api::creators_from_mapping(self.creators.iter().cloned()),
        ))
    }
}

fn parse_creator(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, affiliation) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected \"Name=Affiliation\", got '{raw}'"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err("creator name must not be empty".to_string());
    }
    Ok((name.to_string(), affiliation.trim().to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_creator() {
        assert_eq!(
            parse_creator("Jane Doe = University of Gothenburg").unwrap(),
            ("Jane Doe".to_string(), "University of Gothenburg".to_string())
        );
        assert!(parse_creator("Jane Doe").is_err());
        assert!(parse_creator("=SLU").is_err());
    }

    #[test]
    fn test_metadata_args_without_title() {
        let args = MetadataArgs::default();
        assert!(args.to_metadata().is_none());
    }

    #[test]
    fn test_cli_parses_upload() {
        let cli = Cli::try_parse_from([
            "zenodo",
            "upload",
            "runs/ref_yolo",
            "--title",
            "Koster model",
            "--creator",
            "Jane Doe=GU",
            "--creator",
            "John Roe=SLU",
        ])
        .unwrap();

        let Commands::Upload { path, metadata } = cli.command else {
            panic!("expected upload command");
        };
        assert_eq!(path, PathBuf::from("runs/ref_yolo"));
        let metadata = metadata.to_metadata().unwrap();
        assert_eq!(metadata.title, "Koster model");
        assert_eq!(metadata.creators.len(), 2);
        assert_eq!(metadata.creators[1].name, "John Roe");
    }

    #[test]
    fn test_sandbox_conflicts_with_base_url() {
        let result = Cli::try_parse_from([
            "zenodo",
            "--sandbox",
            "--base-url",
            "https://zenodo.org",
            "download",
        ]);
        assert!(result.is_err());
    }
}
