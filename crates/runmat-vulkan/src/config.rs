use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Whether image-eligible kernels may bind their image/sampler slots as images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageDispatchPolicy {
    /// Use images when the device supports image-backed dispatch.
    Auto,
    Disabled,
}

impl Default for ImageDispatchPolicy {
    fn default() -> Self {
        Self::Auto
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShaderCacheOptions {
    #[serde(default)]
    pub image_dispatch: ImageDispatchPolicy,
    /// Log the chosen work-group shape for every request.
    #[serde(default)]
    pub trace_geometry: bool,
}

static ENV_OPTIONS: Lazy<ShaderCacheOptions> = Lazy::new(ShaderCacheOptions::from_env);

impl ShaderCacheOptions {
    /// Reads `RUNMAT_VK_IMAGE_DISPATCH` and `RUNMAT_VK_TRACE_GEOMETRY`.
    pub fn from_env() -> Self {
        let image_dispatch = match env_flag("RUNMAT_VK_IMAGE_DISPATCH") {
            Some(false) => ImageDispatchPolicy::Disabled,
            _ => ImageDispatchPolicy::Auto,
        };
        Self {
            image_dispatch,
            trace_geometry: env_flag("RUNMAT_VK_TRACE_GEOMETRY").unwrap_or(false),
        }
    }

    /// Options read from the environment once per process.
    pub fn global() -> &'static ShaderCacheOptions {
        &ENV_OPTIONS
    }
}

fn env_flag(var: &str) -> Option<bool> {
    let value = std::env::var(var).ok()?;
    parse_flag(&value)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "auto" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}
