use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use shared::domain::RenamePolicy;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub seed_path: Option<String>,
    pub rename_policy: RenamePolicy,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:4567".into(),
            seed_path: None,
            rename_policy: RenamePolicy::MoveToEnd,
            log_filter: "info".into(),
        }
    }
}

/// Returns the settings plus any problems met while reading them. Settings
/// are read before logging is up, so callers log the warnings afterwards.
pub fn load_settings() -> (Settings, Vec<String>) {
    load_settings_from(Path::new("server.toml"), |key| std::env::var(key).ok())
}

/// Defaults, then the flat `key = "value"` TOML file, then environment.
pub fn load_settings_from(
    file_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> (Settings, Vec<String>) {
    let mut settings = Settings::default();
    let mut warnings = Vec::new();

    if let Ok(raw) = fs::read_to_string(file_path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("bind_addr") {
                    settings.server_bind = v.clone();
                }
                if let Some(v) = file_cfg.get("seed_path") {
                    settings.seed_path = Some(v.clone());
                }
                if let Some(v) = file_cfg.get("rename_policy") {
                    apply_rename_policy(&mut settings, v, &mut warnings);
                }
                if let Some(v) = file_cfg.get("log_filter") {
                    settings.log_filter = v.clone();
                }
            }
            Err(error) => warnings.push(format!(
                "ignoring unreadable config file '{}': {error}",
                file_path.display()
            )),
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__SEED_PATH") {
        settings.seed_path = Some(v).filter(|path| !path.trim().is_empty());
    }

    if let Some(v) = env("APP__RENAME_POLICY") {
        apply_rename_policy(&mut settings, &v, &mut warnings);
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    (settings, warnings)
}

fn apply_rename_policy(settings: &mut Settings, raw: &str, warnings: &mut Vec<String>) {
    match raw.parse::<RenamePolicy>() {
        Ok(policy) => settings.rename_policy = policy,
        Err(error) => warnings.push(format!(
            "{error}; keeping rename policy {:?}",
            settings.rename_policy
        )),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
