use std::path::Path;

use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.general.port == 0 {
        errors.push("general.port must be > 0".to_string());
    }

    if let Some(dir) = cfg.general.static_dir.as_deref() {
        if !Path::new(dir).is_dir() {
            errors.push(format!("general.static_dir ({dir}) is not a directory"));
        }
    }

    if cfg.logging.rust_log.trim().is_empty() {
        errors.push("logging.rust_log must not be empty".to_string());
    }

    if cfg
        .cors
        .allowed_origins
        .iter()
        .any(|origin| origin.trim().is_empty())
    {
        errors.push("cors.allowed_origins must not contain blank entries".to_string());
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
