use crate::config::UploaderConfig;
use crate::services::storage::S3StorageService;
use aws_sdk_s3::config::{Credentials, Region};
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &UploaderConfig) -> Arc<S3StorageService> {
    let mut loader = aws_config::from_env();

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(endpoint_url) = &config.endpoint_url {
        info!("☁️  S3 endpoint: {}", endpoint_url);
        loader = loader.endpoint_url(endpoint_url);
    }

    if let Some((access_key, secret_key)) = config.static_credentials() {
        loader = loader.credentials_provider(Credentials::new(
            access_key, secret_key, None, None, "static",
        ));
    } else {
        info!("🔑 No static credentials set, using the default credential chain");
    }

    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.force_path_style)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);
    info!(
        "☁️  S3 client ready (region: {})",
        s3_client
            .config()
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unset".to_string())
    );

    Arc::new(S3StorageService::new(s3_client))
}
