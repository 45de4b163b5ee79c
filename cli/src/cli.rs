use std::path::PathBuf;

use engine::Config;

/// Batch-generate illustrations for a list of items
#[derive(Debug, clap::Parser)]
#[command(version)]
pub struct Cli {
    /// RON config file. Defaults to the per-user config if it exists
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Item list, one `name` or `name,label` per line
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Reference image the style is taken from
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Token lifetime in seconds
    #[arg(long)]
    pub ttl: Option<u64>,

    /// Skip the reference image and use the prompt template
    #[arg(long)]
    pub no_style: bool,

    /// Log the prompts instead of generating images
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(input) = &self.input {
            config.input_path = input.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(reference) = &self.reference {
            config.reference_image = reference.clone();
        }
        if let Some(ttl) = self.ttl {
            config.token_ttl_secs = ttl;
        }
        config
    }
}
