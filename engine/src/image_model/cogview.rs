use std::pin::Pin;

use color_eyre::Result;
use log::debug;

use crate::{config::Config, credential::AccessToken, image_model::ImageModel};

pub mod cogview_api;

#[derive(Clone)]
pub struct CogView {
    token: AccessToken,
    url: String,
    model: String,
    size: String,
    user_id: String,
    client: reqwest::Client,
}

impl CogView {
    pub fn new(token: AccessToken, config: &Config) -> Self {
        Self {
            token,
            url: config.image_generations_url(),
            model: config.image_model.clone(),
            size: config.image_size.clone(),
            user_id: config.user_id.clone(),
            client: reqwest::Client::new(),
        }
    }
}

impl ImageModel for CogView {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        let request = cogview_api::GenerationRequest {
            model: &self.model,
            prompt,
            size: &self.size,
            user_id: &self.user_id,
        };

        Box::pin(async move {
            let response =
                cogview_api::query(&request, &self.url, &self.token, &self.client).await?;
            debug!("Generation response: {response:#?}");
            response.into_first_url()
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
