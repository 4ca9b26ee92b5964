//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigShowArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Paths => handle_config_paths(output),
    }
}

/// Serialize the effective configuration
pub(crate) fn render_config(config: &Config, format: ConfigFormat) -> Result<String> {
    Ok(match format {
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = render_config(config, args.format)?;
    output.writeln(content.trim_end())
}

fn handle_config_paths(output: &mut OutputWriter) -> Result<()> {
    let paths: Vec<String> = Config::default_config_paths()
        .iter()
        .map(|path| path.display().to_string())
        .collect();

    if !output.is_human() {
        return output.data(&paths);
    }
    for path in paths {
        output.writeln(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_config_formats() {
        let config = Config::default();

        let toml = render_config(&config, ConfigFormat::Toml).unwrap();
        assert!(toml.contains("[engine.synthesis]"));
        assert!(toml.contains("closure_name = \"broaching_closure\""));

        let json = render_config(&config, ConfigFormat::Json).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        let yaml = render_config(&config, ConfigFormat::Yaml).unwrap();
        assert!(yaml.contains("max_depth: 64"));
    }
}
