use anyhow::{Result, anyhow};
use std::net::Ipv4Addr;

/// S3 bucket names are 3 to 63 characters long
pub const MIN_BUCKET_NAME_LEN: usize = 3;
pub const MAX_BUCKET_NAME_LEN: usize = 63;

/// S3 object keys are at most 1024 bytes of UTF-8
pub const MAX_OBJECT_KEY_LEN: usize = 1024;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates a bucket name against the S3 naming rules
pub fn validate_bucket_name(name: &str) -> Result<()> {
    let len = name.len();
    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(anyhow!(ValidationError {
            code: "INVALID_BUCKET_LENGTH",
            message: format!(
                "Bucket name '{}' must be between {} and {} characters, got {}",
                name, MIN_BUCKET_NAME_LEN, MAX_BUCKET_NAME_LEN, len
            ),
        }));
    }

    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.'))
    {
        return Err(anyhow!(ValidationError {
            code: "INVALID_BUCKET_CHARACTER",
            message: format!(
                "Bucket name '{}' contains '{}'; only lowercase letters, digits, '-' and '.' are allowed",
                name, c
            ),
        }));
    }

    let alnum = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if !alnum(name.chars().next()) || !alnum(name.chars().last()) {
        return Err(anyhow!(ValidationError {
            code: "INVALID_BUCKET_BOUNDARY",
            message: format!(
                "Bucket name '{}' must start and end with a letter or digit",
                name
            ),
        }));
    }

    if name.contains("..") {
        return Err(anyhow!(ValidationError {
            code: "INVALID_BUCKET_DOTS",
            message: format!("Bucket name '{}' contains adjacent periods", name),
        }));
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(anyhow!(ValidationError {
            code: "INVALID_BUCKET_IP",
            message: format!("Bucket name '{}' is formatted as an IP address", name),
        }));
    }

    Ok(())
}

/// Validates an object key derived from an extracted path
pub fn validate_object_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(anyhow!(ValidationError {
            code: "EMPTY_KEY",
            message: "Object key cannot be empty".to_string(),
        }));
    }

    if key.len() > MAX_OBJECT_KEY_LEN {
        return Err(anyhow!(ValidationError {
            code: "KEY_TOO_LONG",
            message: format!(
                "Object key is {} bytes, maximum is {}",
                key.len(),
                MAX_OBJECT_KEY_LEN
            ),
        }));
    }

    Ok(())
}
