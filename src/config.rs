use std::path::Path;

use serde::Deserialize;

use crate::cli::Cli;
use crate::color::ColorChoice;
use crate::error::{Error, Result};
use crate::render::ReportSpec;

pub const DEFAULT_CONFIG_FILE: &str = ".ci-status.toml";
pub const MAX_RETRIES: u32 = 10;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub format: Option<String>,
    pub color: Option<ColorChoice>,
    pub verbose: Option<bool>,
    pub gh_binary: Option<String>,
    pub retries: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub reference: Option<String>,
    pub verbose: bool,
    pub format: Option<String>,
    pub color: ColorChoice,
    pub gh_binary: String,
    pub retries: u32,
    pub noop: bool,
}

impl Config {
    /// Load the config file (explicit `--config`, or the default file when it
    /// exists) and apply CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match cli.config {
            Some(ref path) => {
                let config_path = Path::new(path);
                if !config_path.exists() {
                    return Err(Error::ConfigNotFound(config_path.to_path_buf()));
                }
                parse_config(&std::fs::read_to_string(config_path)?)?
            }
            None => {
                let config_path = Path::new(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    parse_config(&std::fs::read_to_string(config_path)?)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        Ok(merge(file_config, cli))
    }

    pub fn report_spec(&self, colorize: bool) -> ReportSpec {
        ReportSpec {
            verbose: self.verbose,
            format: self.format.clone(),
            colorize,
        }
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if let Some(ref format) = config.format
        && format.is_empty()
    {
        return Err(Error::ConfigValidation(
            "format must not be empty".to_string(),
        ));
    }
    if let Some(ref binary) = config.gh_binary
        && binary.trim().is_empty()
    {
        return Err(Error::ConfigValidation(
            "gh_binary must not be empty".to_string(),
        ));
    }
    if let Some(retries) = config.retries
        && !(1..=MAX_RETRIES).contains(&retries)
    {
        return Err(Error::ConfigValidation(format!(
            "retries must be between 1 and {MAX_RETRIES}"
        )));
    }
    Ok(())
}

/// Combine file values with CLI flags. CLI wins; `--format` implies verbose,
/// a format from the file only applies once verbose output is requested.
pub fn merge(file: ConfigFile, cli: &Cli) -> Config {
    Config {
        reference: cli.reference.clone(),
        verbose: cli.verbose || cli.format.is_some() || file.verbose.unwrap_or(false),
        format: cli.format.clone().or(file.format),
        color: cli.color.or(file.color).unwrap_or_default(),
        gh_binary: file.gh_binary.unwrap_or_else(|| "gh".to_string()),
        retries: file.retries.unwrap_or(3),
        noop: cli.noop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_parse_valid_config() {
        let toml = r#"
format = "%t %S%n"
color = "never"
verbose = true
gh_binary = "/usr/local/bin/gh"
retries = 5
"#;
        let config = parse_config(toml).unwrap();
        assert_eq!(config.format.as_deref(), Some("%t %S%n"));
        assert_eq!(config.color, Some(ColorChoice::Never));
        assert_eq!(config.verbose, Some(true));
        assert_eq!(config.retries, Some(5));
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_parse_invalid_color() {
        let err = parse_config(r#"color = "sometimes""#).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_parse_empty_format() {
        let err = parse_config(r#"format = """#).unwrap_err();
        assert!(err.to_string().contains("format must not be empty"));
    }

    #[test]
    fn test_parse_blank_gh_binary() {
        let err = parse_config(r#"gh_binary = "  ""#).unwrap_err();
        assert!(err.to_string().contains("gh_binary must not be empty"));
    }

    #[test]
    fn test_parse_zero_retries() {
        let err = parse_config("retries = 0").unwrap_err();
        assert!(err.to_string().contains("retries must be between 1 and 10"));
    }

    #[test]
    fn test_parse_excessive_retries() {
        let err = parse_config("retries = 64").unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));
        assert_eq!(parse_config("retries = 10").unwrap().retries, Some(10));
    }

    #[test]
    fn test_parse_unknown_field() {
        let err = parse_config(r#"bogus = "value""#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn test_defaults_applied() {
        let cli = Cli::parse_from(["ci-status"]);
        let config = merge(ConfigFile::default(), &cli);
        assert_eq!(config.reference, None);
        assert!(!config.verbose);
        assert_eq!(config.format, None);
        assert_eq!(config.color, ColorChoice::Auto);
        assert_eq!(config.gh_binary, "gh");
        assert_eq!(config.retries, 3);
    }

    #[test]
    fn test_cli_overrides_config() {
        let file = ConfigFile {
            format: Some("%t".to_string()),
            color: Some(ColorChoice::Never),
            ..Default::default()
        };
        let cli = Cli::parse_from(["ci-status", "--color=always", "--format", "%S"]);
        let config = merge(file, &cli);
        assert_eq!(config.color, ColorChoice::Always);
        assert_eq!(config.format.as_deref(), Some("%S"));
    }

    #[test]
    fn test_cli_format_implies_verbose() {
        let cli = Cli::parse_from(["ci-status", "--format", "%t"]);
        let config = merge(ConfigFile::default(), &cli);
        assert!(config.verbose);
    }

    #[test]
    fn test_file_format_alone_stays_terse() {
        let file = ConfigFile {
            format: Some("%t".to_string()),
            ..Default::default()
        };
        let cli = Cli::parse_from(["ci-status"]);
        let config = merge(file, &cli);
        assert!(!config.verbose);
        assert_eq!(config.format.as_deref(), Some("%t"));
    }

    #[test]
    fn test_report_spec() {
        let cli = Cli::parse_from(["ci-status", "-v"]);
        let spec = merge(ConfigFile::default(), &cli).report_spec(true);
        assert_eq!(
            spec,
            ReportSpec {
                verbose: true,
                format: None,
                colorize: true,
            }
        );
    }

    #[test]
    fn test_load_missing_explicit_config() {
        let cli = Cli::parse_from(["ci-status", "--config", "/nonexistent/ci-status.toml"]);
        let err = Config::load(&cli).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn test_load_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "verbose = true\nretries = 1\n").unwrap();
        let cli = Cli::parse_from(["ci-status", "--config", path.to_str().unwrap()]);
        let config = Config::load(&cli).unwrap();
        assert!(config.verbose);
        assert_eq!(config.retries, 1);
    }

    #[test]
    #[serial]
    fn test_load_default_file_from_working_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "color = \"never\"\n").unwrap();
        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let result = Config::load(&Cli::parse_from(["ci-status"]));
        std::env::set_current_dir(previous).unwrap();
        assert_eq!(result.unwrap().color, ColorChoice::Never);
    }

    #[test]
    #[serial]
    fn test_load_without_default_file() {
        let dir = TempDir::new().unwrap();
        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let result = Config::load(&Cli::parse_from(["ci-status"]));
        std::env::set_current_dir(previous).unwrap();
        assert_eq!(result.unwrap().color, ColorChoice::Auto);
    }
}
