pub mod cleanup;
pub mod enumerator;
pub mod extractor;
pub mod fetcher;
pub mod metadata;
pub mod provisioner;
pub mod runner;
pub mod storage;
pub mod upload_pipeline;
