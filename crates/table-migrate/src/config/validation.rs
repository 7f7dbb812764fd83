//! Configuration validation.

use std::collections::HashSet;

use super::{Config, EndpointConfig};
use crate::endpoint::Endpoint;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    validate_endpoint(Endpoint::Source, &config.source)?;
    validate_endpoint(Endpoint::Target, &config.target)?;
    Ok(())
}

fn validate_endpoint(endpoint: Endpoint, config: &EndpointConfig) -> Result<()> {
    let mut seen = HashSet::new();
    for table in &config.tables {
        if table.name.trim().is_empty() {
            return Err(MigrateError::Config(format!(
                "{}.tables contains a table with an empty name",
                endpoint
            )));
        }
        if !seen.insert(table.name.as_str()) {
            return Err(MigrateError::Config(format!(
                "{}.tables lists '{}' more than once",
                endpoint, table.name
            )));
        }
    }
    Ok(())
}
