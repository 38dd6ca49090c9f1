//! Dotted version comparison for the client version gate.

use crate::error::ConfigurationError;

fn parse_parts(version: &str) -> Result<Vec<u64>, ConfigurationError> {
    version
        .trim()
        .split('.')
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| ConfigurationError::InvalidVersion(version.to_string()))
        })
        .collect()
}

/// Returns true when `version` sorts lower than `minimum`, comparing the
/// dot-separated integer parts left to right.
pub fn is_older(version: &str, minimum: &str) -> Result<bool, ConfigurationError> {
    Ok(parse_parts(version)? < parse_parts(minimum)?)
}

/// Fails with [`ConfigurationError::UnsupportedVersion`] when `installed` is below `minimum`.
pub fn ensure_supported(installed: &str, minimum: &str) -> Result<(), ConfigurationError> {
    if is_older(installed, minimum)? {
        return Err(ConfigurationError::UnsupportedVersion {
            installed: installed.to_string(),
            minimum: minimum.to_string(),
        });
    }
    Ok(())
}
