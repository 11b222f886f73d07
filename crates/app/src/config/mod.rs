use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/finnance.toml";
const ENV_PREFIX: &str = "FINNANCE";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub username: String,
    /// Only read from the file or `FINNANCE_PASSWORD`, never from flags.
    pub password: Option<String>,
    /// Log level for the `finnance` and `engine` targets.
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            username: String::new(),
            password: None,
            level: "info".to_string(),
        }
    }
}

/// Command-line values that win over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<String>,
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub level: Option<String>,
}

pub fn load(overrides: Overrides) -> Result<AppConfig> {
    load_with(overrides, Some(config::Environment::with_prefix(ENV_PREFIX)))
}

fn load_with(overrides: Overrides, env: Option<config::Environment>) -> Result<AppConfig> {
    let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder
        .add_source(config::File::new(config_path, config::FileFormat::Toml).required(false));
    if let Some(env) = env {
        builder = builder.add_source(env);
    }
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = overrides.base_url {
        settings.base_url = base_url;
    }
    if let Some(username) = overrides.username {
        settings.username = username;
    }
    if let Some(level) = overrides.level {
        settings.level = level;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let overrides = Overrides {
            config: Some("does/not/exist.toml".to_string()),
            ..Overrides::default()
        };
        let settings = load_with(overrides, None).unwrap();
        assert_eq!(settings.base_url, "http://127.0.0.1:5000");
        assert_eq!(settings.level, "info");
        assert!(settings.password.is_none());
    }

    #[test]
    fn file_values_are_read() {
        let file = config_file("base_url = \"http://finnance.local\"\nusername = \"ann\"\n");
        let overrides = Overrides {
            config: Some(file.path().display().to_string()),
            ..Overrides::default()
        };
        let settings = load_with(overrides, None).unwrap();
        assert_eq!(settings.base_url, "http://finnance.local");
        assert_eq!(settings.username, "ann");
        assert_eq!(settings.level, "info");
    }

    #[test]
    fn flags_override_file() {
        let file = config_file("username = \"ann\"\nlevel = \"warn\"\n");
        let overrides = Overrides {
            config: Some(file.path().display().to_string()),
            username: Some("bob".to_string()),
            level: Some("debug".to_string()),
            ..Overrides::default()
        };
        let settings = load_with(overrides, None).unwrap();
        assert_eq!(settings.username, "bob");
        assert_eq!(settings.level, "debug");
    }

    fn environment(vars: &[(&str, &str)]) -> config::Environment {
        let source = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<config::Map<String, String>>();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn environment_beats_file_and_flags_beat_environment() {
        let file = config_file(
            "base_url = \"http://file.local\"\nusername = \"ann\"\nlevel = \"warn\"\n",
        );
        let env = environment(&[
            ("FINNANCE_USERNAME", "carl"),
            ("FINNANCE_LEVEL", "error"),
            ("FINNANCE_PASSWORD", "secret"),
        ]);
        let overrides = Overrides {
            config: Some(file.path().display().to_string()),
            username: Some("bob".to_string()),
            ..Overrides::default()
        };

        let settings = load_with(overrides, Some(env)).unwrap();
        assert_eq!(settings.base_url, "http://file.local");
        assert_eq!(settings.level, "error");
        assert_eq!(settings.username, "bob");
        assert_eq!(settings.password.as_deref(), Some("secret"));
    }
}
