use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{CorrelatorError, Result};

/// Parses the first whitespace-separated token of `text` as the center
/// frequency. Scientific notation such as `1420.405751e6` is accepted.
pub fn parse_center_frequency(text: &str) -> std::result::Result<f64, String> {
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| "file contains no value".to_string())?;
    let value = token
        .parse::<f64>()
        .map_err(|e| format!("'{token}' is not a number ({e})"))?;
    if !value.is_finite() {
        return Err(format!("'{token}' is not a finite frequency"));
    }
    Ok(value)
}

/// Reads the center frequency side file written next to each capture.
pub fn read_center_frequency(path: &Path) -> Result<f64> {
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::InvalidData {
            CorrelatorError::CenterFrequency {
                path: path.to_path_buf(),
                reason: "file is not valid text".into(),
            }
        } else {
            CorrelatorError::Open {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    parse_center_frequency(&text).map_err(|reason| CorrelatorError::CenterFrequency {
        path: path.to_path_buf(),
        reason,
    })
}
