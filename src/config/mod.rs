use std::env;
use std::path::PathBuf;

/// Runtime configuration resolved from the environment.
///
/// Credentials and region are resolved here once and consumed by the storage
/// setup, independently of argument parsing.
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    /// Static access key id (`AWS_ACCESS_KEY_ID`). Ambient discovery is used when unset.
    pub access_key_id: Option<String>,

    /// Static secret key (`AWS_SECRET_ACCESS_KEY`).
    pub secret_access_key: Option<String>,

    /// Region override (`AWS_REGION`). Falls back to the session/profile region.
    pub region: Option<String>,

    /// S3-compatible endpoint, e.g. MinIO (`S3_ENDPOINT_URL`)
    pub endpoint_url: Option<String>,

    /// Use path-style addressing (default: true when an endpoint is set)
    pub force_path_style: bool,

    /// Prefix for generated bucket names (default: "s3-zip-uploader")
    pub bucket_prefix: String,

    /// Archive download timeout in seconds (default: 300)
    pub fetch_timeout_secs: u64,

    /// Base directory for scratch files (default: platform temp dir)
    pub scratch_dir: PathBuf,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            region: None,
            endpoint_url: None,
            force_path_style: false,
            bucket_prefix: "s3-zip-uploader".to_string(),
            fetch_timeout_secs: 300,
            scratch_dir: env::temp_dir(),
        }
    }
}

impl UploaderConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`UploaderConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let endpoint_url = non_empty("S3_ENDPOINT_URL");

        Self {
            access_key_id: non_empty("AWS_ACCESS_KEY_ID"),
            secret_access_key: non_empty("AWS_SECRET_ACCESS_KEY"),
            region: non_empty("AWS_REGION").or_else(|| non_empty("AWS_DEFAULT_REGION")),

            force_path_style: non_empty("S3_FORCE_PATH_STYLE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(endpoint_url.is_some()),
            endpoint_url,

            bucket_prefix: non_empty("BUCKET_PREFIX").unwrap_or(default.bucket_prefix),

            fetch_timeout_secs: non_empty("FETCH_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.fetch_timeout_secs),

            scratch_dir: non_empty("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.scratch_dir),
        }
    }

    /// Static credentials, only when both halves are present.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = UploaderConfig::default();
        assert_eq!(config.bucket_prefix, "s3-zip-uploader");
        assert_eq!(config.fetch_timeout_secs, 300);
        assert!(config.static_credentials().is_none());
        assert!(!config.force_path_style);
    }

    #[test]
    fn test_from_lookup_reads_credentials_and_endpoint() {
        let config = UploaderConfig::from_lookup(lookup_from(&[
            ("AWS_ACCESS_KEY_ID", "minioadmin"),
            ("AWS_SECRET_ACCESS_KEY", "minioadmin"),
            ("AWS_REGION", "eu-west-1"),
            ("S3_ENDPOINT_URL", "http://127.0.0.1:9000"),
            ("FETCH_TIMEOUT_SECS", "30"),
        ]));

        assert_eq!(
            config.static_credentials(),
            Some(("minioadmin", "minioadmin"))
        );
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.endpoint_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert!(config.force_path_style);
        assert_eq!(config.fetch_timeout_secs, 30);
    }

    #[test]
    fn test_partial_credentials_are_ignored() {
        let config =
            UploaderConfig::from_lookup(lookup_from(&[("AWS_ACCESS_KEY_ID", "only-the-id")]));
        assert!(config.static_credentials().is_none());
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = UploaderConfig::from_lookup(lookup_from(&[
            ("FETCH_TIMEOUT_SECS", "soon"),
            ("S3_FORCE_PATH_STYLE", "false"),
            ("AWS_DEFAULT_REGION", "us-west-2"),
        ]));
        assert_eq!(config.fetch_timeout_secs, 300);
        assert!(!config.force_path_style);
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
    }
}
