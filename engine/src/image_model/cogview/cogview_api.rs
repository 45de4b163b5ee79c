use color_eyre::{Result, eyre::eyre};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{api_error, credential::AccessToken};

#[derive(Debug, Serialize)]
pub struct GenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub size: &'a str,
    pub user_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub created: Option<u64>,
    #[serde(default)]
    pub data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
}

impl GenerationResponse {
    pub fn into_first_url(self) -> Result<String> {
        self.data
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or(eyre!("Generation response contained no images"))
    }
}

/// Sends one generation request. Non-success answers come back as
/// [`crate::ApiError`].
pub async fn query(
    request: &GenerationRequest<'_>,
    url: &str,
    token: &AccessToken,
    client: &Client,
) -> Result<GenerationResponse> {
    let resp = client
        .post(url)
        .bearer_auth(token.as_str())
        .json(request)
        .send()
        .await?;

    api_error::read_json(resp).await
}

#[cfg(test)]
mod test {
    use expect_test::expect;

    use super::*;

    #[test]
    fn request_serialization() {
        let request = GenerationRequest {
            model: "cogview-3-flash",
            prompt: "Apple, watercolor",
            size: "1024x1024",
            user_id: "someone",
        };

        let expect = expect![[r#"{"model":"cogview-3-flash","prompt":"Apple, watercolor","size":"1024x1024","user_id":"someone"}"#]];
        expect.assert_eq(&serde_json::to_string(&request).unwrap());
    }

    #[test]
    fn first_url_is_used() {
        let response: GenerationResponse = serde_json::from_str(
            r#"{"created":1700000000,"data":[{"url":"https://a/1.png"},{"url":"https://a/2.png"}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_first_url().unwrap(), "https://a/1.png");
    }

    #[test]
    fn empty_result_is_an_error() {
        let response: GenerationResponse = serde_json::from_str(r#"{"created":1}"#).unwrap();
        assert!(response.into_first_url().is_err());
    }
}
