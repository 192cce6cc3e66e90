//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, SiteConfig, TrellisConfig};

const MIN_GMT_OFFSET: f64 = -12.0;
const MAX_GMT_OFFSET: f64 = 14.0;

/// Validates the entire configuration.
pub fn validate_config(config: &TrellisConfig) -> ConfigResult<()> {
    validate_site_config(&config.site)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_site_config(site: &SiteConfig) -> ConfigResult<()> {
    if !(MIN_GMT_OFFSET..=MAX_GMT_OFFSET).contains(&site.gmt_offset) {
        return Err(ConfigError::invalid(
            "site.gmt_offset",
            format!(
                "must be between {MIN_GMT_OFFSET} and {MAX_GMT_OFFSET} hours, got {}",
                site.gmt_offset
            ),
        ));
    }

    if site.template_suffix.is_empty() {
        return Err(ConfigError::invalid("site.template_suffix", "must not be empty"));
    }
    if site.template_suffix.starts_with('.') {
        return Err(ConfigError::invalid(
            "site.template_suffix",
            "must not start with '.'",
        ));
    }

    if site.rewrite_root.starts_with('/') {
        return Err(ConfigError::invalid(
            "site.rewrite_root",
            "must not start with '/'",
        ));
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::invalid(
            "logging.file_path",
            "is required for file output",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&TrellisConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_offset_range() {
        let mut config = TrellisConfig::default();

        config.site.gmt_offset = 14.0;
        assert!(validate_config(&config).is_ok());

        config.site.gmt_offset = -12.5;
        assert!(validate_config(&config).is_err());

        config.site.gmt_offset = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_template_suffix() {
        let mut config = TrellisConfig::default();

        config.site.template_suffix = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid {
                field: "site.template_suffix",
                ..
            })
        ));

        config.site.template_suffix = ".php".into();
        let err = validate_config(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid `site.template_suffix`: must not start with '.'"
        );
    }

    #[test]
    fn test_validate_rewrite_root() {
        let mut config = TrellisConfig::default();

        config.site.rewrite_root = "blog/".into();
        assert!(validate_config(&config).is_ok());

        config.site.rewrite_root = "/blog/".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = TrellisConfig::default();
        config.logging.output = LogOutput::File;

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Invalid {
                field: "logging.file_path",
                ..
            })
        ));
    }
}
