//! Common validation utilities.
//!
//! Each validator returns a `validator::ValidationError` so it can be used
//! from `#[validate(custom(function = ...))]` attributes.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Highest AQI value covered by the scale.
pub const MAX_AQI: i32 = 500;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.]{3,50}$").unwrap();
    static ref REFRESH_INTERVAL_RE: Regex = Regex::new(r"^[1-9][0-9]{0,3}[smh]$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Usernames are 3-50 characters of letters, digits, `_` and `.`.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(error(
            "username_format",
            "Username must be 3-50 characters of letters, digits, '_' or '.'",
        ))
    }
}

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        Err(error("latitude_range", "Latitude must be between -90 and 90"))
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(error(
            "longitude_range",
            "Longitude must be between -180 and 180",
        ))
    }
}

/// Alert thresholds live on the AQI scale (0 to 500).
pub fn validate_aqi_threshold(threshold: i32) -> Result<(), ValidationError> {
    if (0..=MAX_AQI).contains(&threshold) {
        Ok(())
    } else {
        Err(error(
            "threshold_range",
            "Alert threshold must be between 0 and 500",
        ))
    }
}

/// Health log severity is rated 1 (mild) to 5 (severe).
pub fn validate_severity(severity: i16) -> Result<(), ValidationError> {
    if (1..=5).contains(&severity) {
        Ok(())
    } else {
        Err(error("severity_range", "Severity must be between 1 and 5"))
    }
}

/// Supported interface locales.
pub fn validate_locale(locale: &str) -> Result<(), ValidationError> {
    match locale {
        "vi" | "en" => Ok(()),
        _ => Err(error("locale", "Locale must be 'vi' or 'en'")),
    }
}

/// Supported temperature units.
pub fn validate_temperature_unit(unit: &str) -> Result<(), ValidationError> {
    match unit {
        "celsius" | "fahrenheit" => Ok(()),
        _ => Err(error(
            "temperature_unit",
            "Temperature unit must be 'celsius' or 'fahrenheit'",
        )),
    }
}

/// Dashboard refresh intervals look like `30s`, `5m` or `1h`.
pub fn validate_refresh_interval(interval: &str) -> Result<(), ValidationError> {
    if REFRESH_INTERVAL_RE.is_match(interval) {
        Ok(())
    } else {
        Err(error(
            "refresh_interval",
            "Refresh interval must look like 30s, 5m or 1h",
        ))
    }
}

/// Phone numbers: optional leading `+`, then 8-15 digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(error("phone_format", "Phone number must contain 8-15 digits"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("nguyen.van_a").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_latitude() {
        assert!(validate_latitude(21.0285).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(-90.1).is_err());
    }

    #[test]
    fn test_validate_longitude() {
        assert!(validate_longitude(105.8542).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.1).is_err());
    }

    #[test]
    fn test_validate_aqi_threshold() {
        assert!(validate_aqi_threshold(0).is_ok());
        assert!(validate_aqi_threshold(150).is_ok());
        assert!(validate_aqi_threshold(500).is_ok());
        assert!(validate_aqi_threshold(501).is_err());
        assert!(validate_aqi_threshold(-1).is_err());
    }

    #[test]
    fn test_validate_severity() {
        assert!(validate_severity(1).is_ok());
        assert!(validate_severity(5).is_ok());
        assert!(validate_severity(0).is_err());
        assert!(validate_severity(6).is_err());
    }

    #[test]
    fn test_validate_locale_and_unit() {
        assert!(validate_locale("vi").is_ok());
        assert!(validate_locale("fr").is_err());
        assert!(validate_temperature_unit("fahrenheit").is_ok());
        assert!(validate_temperature_unit("kelvin").is_err());
    }

    #[test]
    fn test_validate_refresh_interval() {
        assert!(validate_refresh_interval("30s").is_ok());
        assert!(validate_refresh_interval("5m").is_ok());
        assert!(validate_refresh_interval("1h").is_ok());
        assert!(validate_refresh_interval("0m").is_err());
        assert!(validate_refresh_interval("5 minutes").is_err());
        assert!(validate_refresh_interval("").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+84912345678").is_ok());
        assert!(validate_phone("0912345678").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("09123abc78").is_err());
    }

    #[test]
    fn test_error_message() {
        let err = validate_severity(9).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Severity must be between 1 and 5"
        );
    }
}
