pub mod serde_helpers;

use crate::error::{AppError, Result};
use chrono::NaiveDateTime;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a `yyyy-MM-dd HH:mm:ss` date-time coming from a query string.
pub fn parse_date_param(name: &str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        AppError::validation(&format!(
            "Parameter '{}' must match pattern yyyy-MM-dd HH:mm:ss, got '{}'",
            name, value
        ))
    })
}

/// Parses a comma-separated list of numeric ids from a query string.
pub fn parse_id_list(name: &str, value: &str) -> Result<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                AppError::validation(&format!("Parameter '{}' contains invalid id '{}'", name, s))
            })
        })
        .collect()
}

/// Splits a comma-separated list of strings, dropping empty entries.
pub fn parse_string_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_date() {
        let parsed = parse_date_param("start", "2025-01-06 11:30:38").unwrap();
        assert_eq!(parsed.format(DATE_FORMAT).to_string(), "2025-01-06 11:30:38");
    }

    #[test]
    fn rejects_iso_date_with_t_separator() {
        assert!(parse_date_param("start", "2025-01-06T11:30:38").is_err());
    }

    #[test]
    fn parses_id_list_with_spaces() {
        assert_eq!(parse_id_list("ids", "1, 2,3").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn rejects_non_numeric_id() {
        assert!(parse_id_list("ids", "1,abc").is_err());
    }

    #[test]
    fn string_list_drops_empty_entries() {
        assert_eq!(parse_string_list("/events/1,,/events/2"), vec!["/events/1", "/events/2"]);
    }
}
