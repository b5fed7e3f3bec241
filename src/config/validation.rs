use crate::config::types::{Config, ExtractorConfig, OutputConfig, ServerConfig, SiteConfig};
use crate::ConfigError;
use scraper::Selector;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_extractor_config(&config.extractor)?;
    validate_output_config(&config.output)?;
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates the remote catalog configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must not contain a fragment",
            config.base_url
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every selector parses and every attribute name is usable
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.item_selector,
        &config.payload_selector,
        &config.image_selector,
        &config.next_page_selector,
    ] {
        parse_selector(selector)?;
    }

    if config.payload_attribute.trim().is_empty() {
        return Err(ConfigError::Validation(
            "payload-attribute cannot be empty".to_string(),
        ));
    }

    if config.image_attributes.is_empty()
        || config.image_attributes.iter().any(|a| a.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "image-attributes must list at least one non-empty attribute".to_string(),
        ));
    }

    Ok(())
}

/// Validates export configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.export_dir.is_empty() {
        return Err(ConfigError::Validation(
            "export-dir cannot be empty".to_string(),
        ));
    }

    if config.export_file.is_empty() || config.export_file.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "export-file must be a plain file name, got '{}'",
            config.export_file
        )));
    }

    Ok(())
}

/// Validates HTTP surface configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind_address.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!(
            "bind-address '{}' is not a socket address: {}",
            config.bind_address, e
        ))
    })?;

    if config.poll_interval_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "poll-interval-ms must be >= 100ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    Ok(())
}

/// Parses a CSS selector, mapping failures into a configuration error
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
