use std::path::Path;

use color_eyre::{Result, eyre::WrapErr};
use log::{error, info};

use crate::{
    ApiError, config::Config, download::Downloader, image_model::ImageModel, items::Item,
    prompt::build_prompt,
};

/// Outcome of a run. Failed items are listed by name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: Vec<String>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }
}

/// Generates and downloads an image for every item, one after another.
///
/// Only failing to create the output directory aborts the run. Any error for
/// a single item is logged and the next item is started.
pub async fn run_batch(
    items: &[Item],
    style: Option<&str>,
    config: &Config,
    model: &dyn ImageModel,
    downloader: &dyn Downloader,
) -> Result<BatchReport> {
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .wrap_err_with(|| {
            format!(
                "Couldn't create output directory {}",
                config.output_dir.display()
            )
        })?;

    let total = items.len();
    info!(
        "Generating {total} images with {} into {}",
        model.model_name(),
        config.output_dir.display()
    );

    let mut report = BatchReport::default();
    for (i, item) in items.iter().enumerate() {
        let n = i + 1;
        info!("[{n}/{total}] {item}");

        let prompt = build_prompt(&item.name, style, &config.prompt_template);
        let dest = config.output_dir.join(item.file_name());
        match generate_item(&prompt, &dest, model, downloader).await {
            Ok(bytes) => {
                info!("[{n}/{total}] Saved {} ({bytes} bytes)", dest.display());
                report.succeeded += 1;
            }
            Err(e) => {
                error!("[{n}/{total}] {} failed: {e:#}", item.name);
                if let Some(body) = ApiError::body_in(&e) {
                    error!("Response body: {body}");
                }
                report.failed.push(item.name.clone());
            }
        }
    }

    info!(
        "Done: {} succeeded, {} failed",
        report.succeeded,
        report.failed.len()
    );
    Ok(report)
}

async fn generate_item(
    prompt: &str,
    dest: &Path,
    model: &dyn ImageModel,
    downloader: &dyn Downloader,
) -> Result<u64> {
    let url = model
        .generate(prompt)
        .await
        .wrap_err("Image generation failed")?;
    downloader
        .download(&url, dest)
        .await
        .wrap_err_with(|| format!("Download of {url} failed"))
}

/// The prompts a run would send, without touching the network.
pub fn preview_prompts(items: &[Item], style: Option<&str>, config: &Config) -> Vec<String> {
    items
        .iter()
        .map(|item| build_prompt(&item.name, style, &config.prompt_template))
        .collect()
}
