use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info};

/// Prefix of environment overrides, e.g. `RLIST__REGISTRY__CAPACITY=10`.
pub const ENV_PREFIX: &str = "RLIST";
const ENV_SEPARATOR: &str = "__";

/// Custom error type for config loading.
#[rlist_derive::rlist_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration value by layering environment overrides on top of an optional file.
///
/// 1. **Base File**: when `path` is given and the file exists, it is parsed according to its
///    extension (`.toml`, `.json`, `.yaml`, ...). A missing file is not an error; the
///    target's `Default` values fill the gaps instead.
/// 2. **Environment Overrides**: variables prefixed with `RLIST__`, nested keys separated by
///    double underscores (`RLIST__STORAGE__SNAPSHOT` maps to `storage.snapshot`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is malformed, an override cannot be parsed,
/// or the merged values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use rlist_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// #[serde(default)]
/// struct CliConfig {
///     verbose: bool,
/// }
///
/// let cfg: CliConfig = load_config(None::<&str>).unwrap_or_default();
/// assert!(!cfg.verbose);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();
    let path: Option<&Path> = path.as_ref().map(|p| p.as_ref());

    match path {
        Some(file) if file.exists() => {
            info!(path = %file.display(), "Loading config file");
            builder = builder.add_source(File::from(file).required(true));
        },
        Some(file) => {
            debug!(path = %file.display(), "Config file not found, using defaults");
        },
        None => {},
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
