//! Configuration and CLI argument handling

use clap::Parser;
use std::path::PathBuf;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "pizza-coach")]
#[command(about = "A cooking timer daemon with rotation alerts and settings sync")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Path to the settings store file
    #[arg(long, default_value = "pizza-coach.json")]
    pub settings_file: PathBuf,

    /// Override the first-rotation threshold in seconds
    #[arg(long)]
    pub first_rotation: Option<u32>,

    /// Override the repeat interval in seconds
    #[arg(long)]
    pub repeat_interval: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
