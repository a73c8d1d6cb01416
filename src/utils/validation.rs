use crate::utils::error::{DcfError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DcfError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DcfError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DcfError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DcfError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DcfError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(DcfError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| DcfError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DcfError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN fails both comparisons, so check containment rather than exclusion
    if !(value >= min && value <= max) {
        return Err(DcfError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Normalises a ticker symbol to upper case and rejects characters no exchange symbol uses.
pub fn validate_ticker(ticker: &str) -> Result<String> {
    let trimmed = ticker.trim();
    let invalid = |reason: &str| DcfError::InvalidTicker {
        ticker: ticker.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid("ticker cannot be empty"));
    }
    if trimmed.len() > 15 {
        return Err(invalid("ticker is too long"));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(invalid("ticker contains invalid characters"));
    }

    Ok(trimmed.to_ascii_uppercase())
}

/// Longest projection horizon accepted. Compounding past this overflows to infinity for
/// ordinary growth multipliers.
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// Projection horizon must parse as a positive integer.
pub fn parse_years(input: &str) -> Result<u32> {
    let years: i64 = input
        .trim()
        .parse()
        .map_err(|_| DcfError::invalid_input("years", "must be a positive integer"))?;
    validate_years(years)
}

pub fn validate_years(years: i64) -> Result<u32> {
    if years <= 0 {
        return Err(DcfError::invalid_input("years", "must be a positive integer"));
    }
    if years > i64::from(MAX_PROJECTION_YEARS) {
        return Err(DcfError::invalid_input(
            "years",
            format!("must not exceed {}", MAX_PROJECTION_YEARS),
        ));
    }
    u32::try_from(years).map_err(|_| DcfError::invalid_input("years", "is too large"))
}
