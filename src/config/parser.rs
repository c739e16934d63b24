use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates a harvester configuration file
///
/// Missing `[harvest]` and `[selectors]` entries take their defaults before
/// validation runs, so selector overrides are compiled here too.
///
/// # Returns
///
/// * `Ok(Config)` - A configuration ready to build a harvest from
/// * `Err(ConfigError)` - Unreadable file, bad TOML, or a failed check
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use listing_scout::config::load_config;
///
/// let config = load_config(Path::new("scout.toml")).unwrap();
/// println!("Concurrency: {}", config.harvest.max_concurrent_pages_open);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Computes the SHA-256 of a configuration file
///
/// Logged at startup so a results file can be traced back to the exact
/// search URL and selectors that produced it.
///
/// # Returns
///
/// * `Ok(String)` - Lowercase hex digest of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

/// Loads a configuration together with the hash of the exact text parsed
///
/// The file is read once, so the hash always describes the configuration
/// that was returned.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
