#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, http::StatusCode, routing::get};
use s3_zip_uploader::services::storage::{BucketCreation, StorageService};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// In-memory object store keyed by (bucket, key).
#[derive(Default)]
pub struct InMemoryStorage {
    pub buckets: Mutex<HashSet<String>>,
    pub objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    pub content_types: Mutex<BTreeMap<String, String>>,
    pub fail_keys: HashSet<String>,
    pub bucket_checks: AtomicUsize,
    pub put_calls: AtomicUsize,
}

impl InMemoryStorage {
    pub fn failing_on(keys: &[&str]) -> Self {
        Self {
            fail_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn keys_in(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl StorageService for InMemoryStorage {
    fn region(&self) -> Option<String> {
        Some("us-east-1".to_string())
    }

    async fn bucket_exists(&self, bucket: &str) -> anyhow::Result<bool> {
        self.bucket_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.buckets.lock().unwrap().contains(bucket))
    }

    async fn create_bucket(&self, bucket: &str) -> anyhow::Result<BucketCreation> {
        if self.buckets.lock().unwrap().insert(bucket.to_string()) {
            Ok(BucketCreation::Created)
        } else {
            Ok(BucketCreation::AlreadyOwned)
        }
    }

    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> anyhow::Result<u64> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if !self.buckets.lock().unwrap().contains(bucket) {
            anyhow::bail!("NoSuchBucket: {}", bucket);
        }
        if self.fail_keys.contains(key) {
            anyhow::bail!("InternalError: injected failure for {}", key);
        }

        let data = tokio::fs::read(path).await?;
        let len = data.len() as u64;
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data);
        self.content_types
            .lock()
            .unwrap()
            .insert(key.to_string(), content_type.to_string());
        Ok(len)
    }
}

/// Builds a ZIP archive in memory. Names ending in `/` become directories.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, zip::write::FileOptions::default())
                .unwrap();
        } else {
            writer
                .start_file(*name, zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Serves `archive` at `/archive.zip`, a 404 at `/missing.zip` and a response
/// that never arrives at `/stalled.zip`.
pub async fn serve_archive(archive: Vec<u8>) -> Url {
    let app = Router::new()
        .route(
            "/archive.zip",
            get(move || {
                let archive = archive.clone();
                async move { archive }
            }),
        )
        .route(
            "/missing.zip",
            get(|| async { (StatusCode::NOT_FOUND, "no such archive") }),
        )
        .route(
            "/stalled.zip",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                "too late"
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{}/", addr)).unwrap()
}
