//! Command-line interface.
//!
//! Parses arguments, loads settings and dispatches to the command modules.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings, LoadOptions};

#[derive(Parser)]
#[command(name = "polyclinic")]
#[command(about = "Prescription intake service: OCR, patient name extraction and storage")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Bind address: PORT, HOST or HOST:PORT (defaults from config, then 0.0.0.0:8080)
        bind: Option<String>,
    },

    /// Run OCR on an image and extract the patient name
    Extract {
        /// Image file
        image: PathBuf,
        /// Print the raw OCR text instead of the extraction result
        #[arg(long)]
        text: bool,
    },

    /// Report which OCR backends are available
    OcrCheck,

    /// Print the SHA-256 hash of a password for the users list in config
    HashPassword {
        password: String,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let settings = load_settings(&options).await?;

    match cli.command {
        Commands::Serve { bind } => commands::serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Extract { image, text } => {
            commands::extract::cmd_extract(&settings, &image, text).await
        }
        Commands::OcrCheck => commands::ocr_check::cmd_ocr_check(&settings),
        Commands::HashPassword { password } => {
            commands::password::cmd_hash_password(&password);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["polyclinic", "-v", "serve", "9000"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Serve { bind: Some(ref b) } if b == "9000"));

        let cli = Cli::try_parse_from(["polyclinic", "extract", "rx.jpg", "--text"]).unwrap();
        assert!(matches!(cli.command, Commands::Extract { text: true, .. }));

        let cli = Cli::try_parse_from(["polyclinic", "--config", "p.toml", "ocr-check"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("p.toml")));
        assert!(matches!(cli.command, Commands::OcrCheck));

        assert!(Cli::try_parse_from(["polyclinic", "hash-password"]).is_err());
    }
}
