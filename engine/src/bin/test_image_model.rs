use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use engine::{
    Config,
    credential::Credential,
    download::{Downloader, HttpDownloader},
    image_model::{CogView, ImageModel},
};

#[derive(clap::Parser)]
struct Arg {
    prompt: String,
    #[arg(short, long, default_value = "output.png")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    pretty_env_logger::init();
    let Arg { prompt, out } = Arg::parse();

    let config = Config::load(None)?;
    let token = Credential::from_env(&config.credential_env)?.sign(config.token_ttl())?;
    let model = CogView::new(token, &config);

    let url = model.generate(&prompt).await?;
    println!("Image URL: {url}");
    let bytes = HttpDownloader::new().download(&url, &out).await?;
    println!("Saved image, {bytes} bytes");

    Ok(())
}
