use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use color_eyre::{
    Result,
    eyre::{WrapErr, ensure},
};
use log::{debug, info, warn};

use crate::{ApiError, config::Config, credential::AccessToken};

pub mod vision_api;

const STYLE_LABEL: &str = "style description:";

/// Derives a reusable style descriptor from a reference image.
#[derive(Clone)]
pub struct StyleExtractor {
    token: AccessToken,
    url: String,
    model: String,
    instruction: String,
    client: reqwest::Client,
}

impl StyleExtractor {
    pub fn new(token: AccessToken, config: &Config) -> Self {
        Self {
            token,
            url: config.chat_completions_url(),
            model: config.vision_model.clone(),
            instruction: config.style_instruction.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Never fails: a missing image or any error along the way means the run
    /// goes on without a style.
    pub async fn extract(&self, reference: &Path) -> Option<String> {
        if !reference.exists() {
            info!(
                "No reference image at {}, using the default prompt template",
                reference.display()
            );
            return None;
        }

        info!("Analyzing reference image {}", reference.display());
        match self.extract_from_file(reference).await {
            Ok(style) => {
                info!("Extracted style: {style}");
                Some(style)
            }
            Err(e) => {
                warn!("Style extraction failed, using the default prompt template: {e:#}");
                if let Some(body) = ApiError::body_in(&e) {
                    warn!("Response body: {body}");
                }
                None
            }
        }
    }

    async fn extract_from_file(&self, reference: &Path) -> Result<String> {
        let image = tokio::fs::read(reference)
            .await
            .wrap_err_with(|| format!("Couldn't read {}", reference.display()))?;
        self.describe(&image, mime_type(reference)).await
    }

    pub async fn describe(&self, image: &[u8], mime: &str) -> Result<String> {
        let data_uri = format!("data:{mime};base64,{}", STANDARD.encode(image));
        let request = vision_api::ChatRequest::vision(&self.model, &self.instruction, data_uri);

        let reply = vision_api::complete(&request, &self.url, &self.token, &self.client)
            .await?
            .into_text()?;
        debug!("Vision reply: {reply}");

        let style = strip_style_label(&reply);
        ensure!(!style.is_empty(), "Vision model returned an empty style");
        Ok(style)
    }
}

/// Removes a leading `Style description:` label, ignoring case.
pub fn strip_style_label(reply: &str) -> String {
    let reply = reply.trim();
    let rest = match reply.get(..STYLE_LABEL.len()) {
        Some(head) if head.eq_ignore_ascii_case(STYLE_LABEL) => &reply[STYLE_LABEL.len()..],
        _ => reply,
    };
    rest.trim().into()
}

fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "image/png",
    }
}
