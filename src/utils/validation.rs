use crate::utils::error::{Result, StorageError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    const OP: &str = "validation.url";

    if url_str.is_empty() {
        return Err(StorageError::invalid(
            OP,
            format!("{field_name:?}: URL cannot be empty"),
        ));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(StorageError::invalid(
                OP,
                format!("{field_name:?}: unsupported URL scheme: {scheme}"),
            )),
        },
        Err(e) => Err(StorageError::invalid(
            OP,
            format!("{field_name:?}: invalid URL format {url_str:?}: {e}"),
        )),
    }
}

pub fn validate_required_option<'a>(
    op: &'static str,
    field_name: &str,
    value: Option<&'a String>,
) -> Result<&'a str> {
    value
        .map(String::as_str)
        .ok_or_else(|| StorageError::invalid(op, format!("{field_name:?} option is required")))
}

pub fn validate_non_empty_string(op: &'static str, field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StorageError::invalid(
            op,
            format!("{field_name:?} cannot be empty or whitespace-only"),
        ));
    }
    Ok(())
}

pub fn validate_region(op: &'static str, field_name: &str, region: &str) -> Result<()> {
    validate_non_empty_string(op, field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(StorageError::invalid(
            op,
            format!(
                "{field_name:?} value {region:?} can only contain lowercase letters, numbers, and hyphens"
            ),
        ));
    }

    Ok(())
}

pub fn validate_bucket_name(op: &'static str, field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(StorageError::invalid(
            op,
            format!("{field_name:?} value {bucket_name:?} must be between 3 and 63 characters"),
        ));
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(StorageError::invalid(
            op,
            format!(
                "{field_name:?} value {bucket_name:?} can only contain lowercase letters, numbers, hyphens, and dots"
            ),
        ));
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(StorageError::invalid(
            op,
            format!("{field_name:?} value {bucket_name:?} cannot start or end with a hyphen"),
        ));
    }

    Ok(())
}

pub fn validate_root(op: &'static str, field_name: &str, root: &str) -> Result<()> {
    if root.starts_with('/') {
        return Err(StorageError::invalid(
            op,
            format!("{field_name:?} option shouldn't start with slash"),
        ));
    }

    if root.contains('\0') {
        return Err(StorageError::invalid(
            op,
            format!("{field_name:?} option contains null bytes"),
        ));
    }

    // 不做路徑正規化：`a/../b` 與 `b` 會產生不同的 key 與 link base
    let trimmed = root.trim_end_matches('/');
    if !trimmed.is_empty()
        && trimmed
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::invalid(
            op,
            format!("{field_name:?} option must not contain empty, '.' or '..' segments"),
        ));
    }

    Ok(())
}
