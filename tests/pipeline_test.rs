mod common;

use common::{InMemoryStorage, zip_bytes};
use s3_zip_uploader::services::enumerator::FileEnumerator;
use s3_zip_uploader::services::extractor::ArchiveExtractor;
use s3_zip_uploader::services::provisioner::BucketProvisioner;
use s3_zip_uploader::{FileEntry, UploadPipeline};
use std::sync::Arc;

#[tokio::test]
async fn test_extracted_tree_uploads_every_file() {
    let scratch = tempfile::tempdir().unwrap();
    let archive = scratch.path().join("archive.zip");
    std::fs::write(
        &archive,
        zip_bytes(&[
            ("readme.txt", "hello"),
            ("assets/", ""),
            ("assets/style.css", "body {}"),
            ("assets/deep/nested/data.bin", "xyz"),
        ]),
    )
    .unwrap();

    let extracted = ArchiveExtractor::new(scratch.path())
        .extract(&archive)
        .await
        .unwrap();
    let files = FileEnumerator::enumerate(&extracted).await.unwrap();
    let keys: Vec<_> = files.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["assets/deep/nested/data.bin", "assets/style.css", "readme.txt"]
    );

    let storage = Arc::new(InMemoryStorage::default());
    let bucket = BucketProvisioner::new(storage.clone(), "test")
        .provision(Some("assets-bucket"))
        .await
        .unwrap();
    let outcome = UploadPipeline::new(storage.clone(), 2)
        .upload(files, &bucket)
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.completed(), 3);

    let types = storage.content_types.lock().unwrap().clone();
    assert_eq!(types["readme.txt"], "application/octet-stream");
    assert_eq!(types["assets/deep/nested/data.bin"], "application/octet-stream");
    assert_eq!(storage.object("assets-bucket", "assets/style.css").unwrap(), b"body {}");
}

#[tokio::test]
async fn test_png_signature_is_detected() {
    let scratch = tempfile::tempdir().unwrap();
    let png = scratch.path().join("logo.png");
    std::fs::write(&png, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0]).unwrap();

    let storage = Arc::new(InMemoryStorage::default());
    let bucket = BucketProvisioner::new(storage.clone(), "test")
        .provision(Some("images"))
        .await
        .unwrap();
    let outcome = UploadPipeline::new(storage.clone(), 1)
        .upload(vec![FileEntry::new(&png, "logo.png")], &bucket)
        .await;

    assert!(outcome.is_success());
    assert_eq!(
        storage.content_types.lock().unwrap()["logo.png"],
        "image/png"
    );
}

#[tokio::test]
async fn test_upload_into_missing_bucket_fails_every_file() {
    let storage = Arc::new(InMemoryStorage::default());
    let scratch = tempfile::tempdir().unwrap();
    let files: Vec<_> = (0..4)
        .map(|i| {
            let path = scratch.path().join(format!("f{}.txt", i));
            std::fs::write(&path, "x").unwrap();
            FileEntry::new(path, format!("f{}.txt", i))
        })
        .collect();
    let bucket = s3_zip_uploader::BucketHandle {
        name: "never-created".to_string(),
        region: None,
        created: false,
    };

    let outcome = UploadPipeline::new(storage, 3).upload(files, &bucket).await;

    assert_eq!(outcome.completed(), 4);
    assert_eq!(outcome.failures.len(), 4);
    assert!(outcome.failures.iter().all(|f| f.reason.contains("NoSuchBucket")));
}
