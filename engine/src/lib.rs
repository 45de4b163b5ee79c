pub mod batch;
pub mod config;
pub mod credential;
pub mod download;
pub mod image_model;
pub mod items;
pub mod prompt;
pub mod style;

mod api_error;
pub use api_error::ApiError;
pub use config::Config;
