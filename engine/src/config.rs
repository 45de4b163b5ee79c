use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use color_eyre::{Result, eyre::WrapErr};
use indoc::indoc;
use log::debug;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub const CONFIG_FILE_NAME: &str = "illustrate.ron";

pub const DEFAULT_PROMPT_TEMPLATE: &str = "A flat-style illustration of a single {ingredient}, \
centered in the frame on a pure white background, clean vector shapes, soft even lighting, \
gentle colors, no text, no border";

pub const DEFAULT_STYLE_INSTRUCTION: &str = indoc! {r#"
    Analyze only the visual style of this image. Do not name or describe the subject that
    is depicted. Reply with a short comma-separated list of style keywords covering medium,
    line work, color palette, lighting, texture, composition and background, in the form
    "Style description: <keywords>".
"#};

/// Everything a run needs besides the credential itself.
///
/// Loaded from a RON file; every field falls back to its default, so a config
/// file only has to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub vision_model: String,
    pub image_model: String,
    pub image_size: String,
    /// Opaque end-user id the generation endpoint requires.
    pub user_id: String,
    pub token_ttl_secs: u64,
    /// Name of the environment variable holding the `id.secret` pair.
    pub credential_env: String,
    pub input_path: PathBuf,
    pub reference_image: PathBuf,
    pub output_dir: PathBuf,
    /// Used when no style was extracted. `{ingredient}` is replaced by the item name.
    pub prompt_template: String,
    pub style_instruction: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://open.bigmodel.cn/api/paas/v4".into(),
            vision_model: "glm-4v-flash".into(),
            image_model: "cogview-3-flash".into(),
            image_size: "1024x1024".into(),
            user_id: "illustrate-batch".into(),
            token_ttl_secs: 3600,
            credential_env: "ZHIPUAI_API_KEY".into(),
            input_path: "ingredients.txt".into(),
            reference_image: "reference.png".into(),
            output_dir: "output".into(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.into(),
            style_instruction: DEFAULT_STYLE_INSTRUCTION.trim().into(),
        }
    }
}

impl Config {
    /// An explicitly given file must exist. Without one, the per-user config
    /// file is used if present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return load_ron_file(path)
                .wrap_err_with(|| format!("Couldn't load config from {}", path.display()));
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Using config file {}", path.display());
                load_ron_file(&path)
                    .wrap_err_with(|| format!("Couldn't load config from {}", path.display()))
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    pub fn image_generations_url(&self) -> String {
        format!("{}/images/generations", self.api_base.trim_end_matches('/'))
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_local_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let src = fs::read_to_string(path)?;
    Ok(ron::from_str(&src)?)
}
