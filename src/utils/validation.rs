use crate::utils::error::{Result, ValidationError};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub type FieldResult<T> = std::result::Result<T, ValidationError>;

/// 必填欄位：去除空白後不可為空
pub fn validate_required_field<'a>(field_name: &str, value: &'a str) -> FieldResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing(field_name));
    }
    Ok(trimmed)
}

/// 選填欄位：空字串視為未提供
pub fn optional_field(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub fn validate_positive_number(field_name: &str, value: u32, condition: &str) -> FieldResult<()> {
    if value == 0 {
        return Err(ValidationError::new(
            field_name,
            format!("must be greater than 0 {}", condition),
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> FieldResult<()> {
    if value < min || value > max {
        return Err(ValidationError::new(
            field_name,
            format!("value {} must be between {} and {}", value, min, max),
        ));
    }
    Ok(())
}
