use clap::Parser;
use color_eyre::Result;
use engine::{
    Config, batch,
    credential::Credential,
    download::HttpDownloader,
    image_model::CogView,
    items::load_items,
    style::StyleExtractor,
};
use log::{LevelFilter, info};

mod cli;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Cli::parse();
    let config = args.apply(Config::load(args.config.as_deref())?);

    let token = Credential::from_env(&config.credential_env)?.sign(config.token_ttl())?;
    let items = load_items(&config.input_path)?;
    info!(
        "Loaded {} items from {}",
        items.len(),
        config.input_path.display()
    );

    let style = if args.no_style {
        None
    } else {
        StyleExtractor::new(token.clone(), &config)
            .extract(&config.reference_image)
            .await
    };

    if args.dry_run {
        for (item, prompt) in items
            .iter()
            .zip(batch::preview_prompts(&items, style.as_deref(), &config))
        {
            info!("{item}: {prompt}");
        }
        return Ok(());
    }

    let model = CogView::new(token, &config);
    let report = batch::run_batch(
        &items,
        style.as_deref(),
        &config,
        &model,
        &HttpDownloader::new(),
    )
    .await?;

    if !report.failed.is_empty() {
        info!("No image for: {}", report.failed.join(", "));
    }
    Ok(())
}
