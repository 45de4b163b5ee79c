use std::pin::Pin;

use color_eyre::Result;

pub mod cogview;
pub use cogview::CogView;

/// A text-to-image backend. Generation yields a URL the image can be fetched
/// from; downloading it is left to a [`crate::download::Downloader`].
pub trait ImageModel {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    fn model_name(&self) -> &str;
}
