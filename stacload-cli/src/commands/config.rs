use crate::formatter;
use anyhow::{anyhow, Context, Result};
use stacload_config::{ConfigLoader, StacLoadConfig};
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Handle configuration validation
pub fn handle_config_validate(config_file: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow!("Configuration file not found: {:?}", config_file));
    }

    match ConfigLoader::new().from_file(config_file) {
        Ok(config) => {
            formatter::print_success("Configuration file is valid");
            formatter::print_info(&format!(
                "Target {} with {} users",
                config.target.effective_base_url(),
                config.run.users
            ));
            Ok(())
        }
        Err(e) => {
            formatter::print_error(&format!("Configuration validation failed: {}", e));
            error!("Configuration validation failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handle configuration generation
pub fn handle_config_generate(output: &Path, force: bool) -> Result<()> {
    info!("Generating configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    fs::write(output, StacLoadConfig::generate_sample())
        .context("Failed to write configuration file")?;

    formatter::print_success(&format!("Configuration generated at: {:?}", output));
    formatter::print_info(&format!(
        "Validate with: stacload config validate --config-file {:?}",
        output
    ));
    Ok(())
}

/// Handle configuration display
pub fn handle_config_show(config: &StacLoadConfig, format: &str) -> Result<()> {
    match format.to_lowercase().as_str() {
        "yaml" | "yml" => {
            let yaml = serde_yaml::to_string(config).context("Failed to serialize to YAML")?;
            println!("{}", yaml);
        }
        "json" => {
            let json =
                serde_json::to_string_pretty(config).context("Failed to serialize to JSON")?;
            println!("{}", json);
        }
        _ => {
            return Err(anyhow!(
                "Unknown output format: {}. Valid formats: yaml, json",
                format
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stacload.yaml");

        handle_config_generate(&path, false).unwrap();
        handle_config_validate(&path).unwrap();

        // refuses to overwrite without --force
        assert!(handle_config_generate(&path, false).is_err());
        handle_config_generate(&path, true).unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "run:\n  users: 0\n").unwrap();

        assert!(handle_config_validate(&path).is_err());
        assert!(handle_config_validate(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_show_rejects_unknown_format() {
        assert!(handle_config_show(&StacLoadConfig::default(), "toml").is_err());
        assert!(handle_config_show(&StacLoadConfig::default(), "json").is_ok());
    }
}
