use color_eyre::{Result, eyre::eyre};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{api_error, credential::AccessToken};

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatRequest {
    /// A single user turn carrying an instruction and one image.
    pub fn vision(model: &str, instruction: &str, image_url: String) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: instruction.into(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: image_url },
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatResponse {
    pub fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(eyre!("Chat response contained no text"))
    }
}

pub async fn complete(
    request: &ChatRequest,
    url: &str,
    token: &AccessToken,
    client: &Client,
) -> Result<ChatResponse> {
    let resp = client
        .post(url)
        .bearer_auth(token.as_str())
        .json(request)
        .send()
        .await?;

    api_error::read_json(resp).await
}
