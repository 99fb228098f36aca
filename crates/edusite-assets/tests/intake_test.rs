//! Integration tests for the asset intake pipeline.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use edusite_assets::AssetStore;
use edusite_core::{AssetCategory, Config};
use tempfile::tempdir;

fn test_config(root: &Path) -> Config {
    Config {
        storage_root: root.to_path_buf(),
        public_base_url: "http://localhost:5000".to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn concurrent_uploads_with_identical_names_never_collide() {
    let dir = tempdir().unwrap();
    let store = Arc::new(AssetStore::new(&test_config(dir.path())).await.unwrap());

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..100 {
        let store = store.clone();
        tasks.spawn(async move {
            store
                .accept_upload("report.pdf", "application/pdf", vec![0xAB; 256])
                .await
                .unwrap()
        });
    }

    let mut names = HashSet::new();
    let mut paths = HashSet::new();
    while let Some(res) = tasks.join_next().await {
        let asset = res.unwrap();
        names.insert(asset.stored_name.clone());
        paths.insert(asset.storage_path.clone());
    }

    assert_eq!(names.len(), 100, "stored names must be distinct");
    assert_eq!(paths.len(), 100, "storage paths must be distinct");

    let on_disk = std::fs::read_dir(dir.path().join("documents"))
        .unwrap()
        .count();
    assert_eq!(on_disk, 100, "100 distinct files must exist on disk");
}

#[tokio::test]
async fn concurrent_category_directory_creation_is_safe() {
    let dir = tempdir().unwrap();
    let store = Arc::new(AssetStore::new(&test_config(dir.path())).await.unwrap());

    // First writes to a fresh category race on create_dir_all.
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..16 {
        let store = store.clone();
        tasks.spawn(async move {
            store
                .accept_upload(&format!("clip{}.mp4", i), "video/mp4", vec![0; 64])
                .await
        });
    }
    while let Some(res) = tasks.join_next().await {
        assert!(res.unwrap().is_ok());
    }
}

#[tokio::test]
async fn end_to_end_jpeg_upload() {
    let dir = tempdir().unwrap();
    let store = AssetStore::new(&test_config(dir.path())).await.unwrap();

    let payload = vec![0xD8; 50 * 1024];
    let asset = store
        .accept_upload("photo.jpg", "image/jpeg", payload)
        .await
        .unwrap();

    assert_eq!(asset.category, AssetCategory::Image);
    assert!(asset.stored_name.starts_with("photo-"));
    assert!(asset.stored_name.ends_with(".jpg"));
    assert!(asset
        .storage_path
        .starts_with(dir.path().join("images")));

    let url = store.resolve_url(asset.category, &asset.stored_name);
    assert!(url.starts_with("http://localhost:5000/uploads/images/photo-"));
    assert!(url.ends_with(".jpg"));
    assert_eq!(asset.url("http://localhost:5000"), url);
    assert_eq!(asset.url("http://localhost:5000/"), url);

    assert!(store.exists(&asset.storage_path).await.unwrap());
    let outcome = store.delete_asset(&asset.storage_path).await.unwrap();
    assert!(outcome.deleted);
    assert!(!store.exists(&asset.storage_path).await.unwrap());
}

#[tokio::test]
async fn sanitized_stem_shape_is_exact() {
    let dir = tempdir().unwrap();
    let store = AssetStore::new(&test_config(dir.path())).await.unwrap();

    let asset = store
        .accept_upload("My Report!!.pdf", "application/pdf", vec![1; 32])
        .await
        .unwrap();

    assert!(asset.stored_name.ends_with(".pdf"));
    let stem = asset.stored_name.trim_end_matches(".pdf");
    // ^My_Report__-\d+-\d+$
    let mut parts = stem.splitn(2, "-");
    assert_eq!(parts.next(), Some("My_Report__"));
    let suffix = parts.next().unwrap();
    let nums: Vec<&str> = suffix.split('-').collect();
    assert_eq!(nums.len(), 2);
    assert!(nums.iter().all(|n| n.chars().all(|c| c.is_ascii_digit())));
}
