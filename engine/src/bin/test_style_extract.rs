use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use engine::{Config, credential::Credential, style::StyleExtractor};

#[derive(clap::Parser)]
struct Arg {
    image: PathBuf,
    #[arg(long, default_value = "image/png")]
    mime: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();
    let Arg { image, mime } = Arg::parse();

    let config = Config::load(None)?;
    let token = Credential::from_env(&config.credential_env)?.sign(config.token_ttl())?;
    let bytes = std::fs::read(&image)?;

    let style = StyleExtractor::new(token, &config)
        .describe(&bytes, &mime)
        .await?;
    println!("{style}");

    Ok(())
}
