use crate::client::{ClientConfig, DEFAULT_BASE_URL};
use crate::form::FormInput;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "storycraft", version, about = "Request story concepts and render them as cards")]
pub struct Cli {
    /// Base URL of the story API; requests go to `<base>/api/story`.
    #[arg(long, env = "STORYCRAFT_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub api_url: String,

    /// Where diagnostics are written. Interactive mode defaults to a file in
    /// the temp dir, other commands to stderr.
    #[arg(long, env = "STORYCRAFT_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive form in the terminal (default)
    Tui,
    /// Submit once and print the result
    Generate(GenerateArgs),
    /// Print the JSON schema of the expected response
    Schema,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[arg(long, default_value = "")]
    pub experience_level: String,
    #[arg(long, default_value = "")]
    pub genre: String,
    #[arg(long, default_value = "")]
    pub characters: String,
    #[arg(long, default_value = "")]
    pub interests: String,
    #[arg(long = "brainstorm", default_value = "")]
    pub user_brainstorm: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Html,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.clone(),
        }
    }
}

impl GenerateArgs {
    pub fn to_input(&self) -> FormInput {
        FormInput {
            experience_level: self.experience_level.clone(),
            genre: self.genre.clone(),
            characters: self.characters.clone(),
            interests: self.interests.clone(),
            user_brainstorm: self.user_brainstorm.clone(),
        }
    }
}

pub fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("storycraft.log")
}
