use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slidecast")]
#[command(author, version, about = "Turns slide decks into narrated talking-head videos")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Turn one presentation into a video without the server
    Run {
        /// Presentation to process (.pptx or .pdf)
        #[arg(required = true)]
        deck: PathBuf,

        /// Face image to animate
        #[arg(long, required = true)]
        face: PathBuf,

        /// Synthesis voice (see `GET /api/voices`)
        #[arg(long)]
        voice: Option<String>,

        /// Regenerate artifacts even when they already exist
        #[arg(long)]
        no_skip: bool,
    },

    /// Delete uploads and every generated artifact
    Clean,

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
