use crate::utils::error::{FunnelError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(FunnelError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(FunnelError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(FunnelError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(FunnelError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 字串長度檢查,min 為 0 時允許空字串
pub fn validate_string_length(
    field_name: &str,
    value: &str,
    min_len: usize,
    max_len: usize,
) -> Result<()> {
    let len = value.chars().count();
    if len < min_len || len > max_len {
        return Err(FunnelError::ValidationError {
            field: field_name.to_string(),
            reason: format!(
                "Length must be between {} and {} characters (got {})",
                min_len, max_len, len
            ),
        });
    }
    Ok(())
}

pub fn validate_finite_positive(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FunnelError::ValidationError {
            field: field_name.to_string(),
            reason: "Value must be a positive finite number".to_string(),
        });
    }
    Ok(())
}

fn email_pattern() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
    })
}

pub fn validate_email(field_name: &str, value: &str) -> Result<()> {
    if !email_pattern().is_match(value) {
        return Err(FunnelError::ValidationError {
            field: field_name.to_string(),
            reason: format!("'{}' is not a valid email address", value),
        });
    }
    Ok(())
}
