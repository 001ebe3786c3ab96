//! Integration tests for on-demand facet generation on a tokio runtime

use folio_core::{
    Database, FacetArchive, FacetService, FacetType, LocalFsal, ProcessorRegistry, TokioScheduler,
};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn create_library() -> TempDir {
    let dir = TempDir::new().unwrap();
    let site = dir.path().join("site");
    fs::create_dir_all(&site).unwrap();
    fs::write(site.join("main.html"), "<title>Main page</title>").unwrap();
    fs::write(site.join("about.html"), "<title>About</title>").unwrap();
    fs::write(site.join("clip.mp4"), "0000").unwrap();
    dir
}

#[tokio::test]
async fn test_scheduled_generation_persists_facets() {
    let dir = create_library();
    let archive = Arc::new(
        FacetArchive::new(
            Database::open_in_memory().unwrap(),
            Arc::new(ProcessorRegistry::with_defaults()),
            Arc::new(LocalFsal::new(dir.path())),
        )
        .unwrap(),
    );
    let scheduler = Arc::new(TokioScheduler::new().unwrap());
    let service = FacetService::new(archive.clone(), scheduler.clone(), Duration::ZERO);

    let first = service
        .get_facets(&["site/about.html", "site/clip.mp4"], true, None)
        .unwrap();
    let about = first[0].as_ref().unwrap();
    assert!(about.partial);
    assert_eq!(about.data["html"], json!({"index": "about.html"}));

    scheduler.wait().await;

    let second = service
        .get_facets(&["site/about.html", "site/clip.mp4"], true, None)
        .unwrap();
    let about = second[0].as_ref().unwrap();
    assert!(!about.partial);
    assert_eq!(
        about.data["html"],
        json!({"index": "main.html", "title": "Main page"})
    );
    assert_eq!(about.data["path"], json!("site"));
    assert_eq!(about.data["file"], json!("about.html"));

    let clip = second[1].as_ref().unwrap();
    assert_eq!(clip.data["video"]["files"], json!(["clip.mp4"]));
}

#[tokio::test]
async fn test_facet_type_filter() {
    let dir = create_library();
    let archive = Arc::new(
        FacetArchive::new(
            Database::open_in_memory().unwrap(),
            Arc::new(ProcessorRegistry::with_defaults()),
            Arc::new(LocalFsal::new(dir.path())),
        )
        .unwrap(),
    );
    archive.update_facets("site/clip.mp4").unwrap();

    let scheduler = Arc::new(TokioScheduler::new().unwrap());
    let service = FacetService::new(archive.clone(), scheduler.clone(), Duration::ZERO);

    let video = service
        .get_facets(&["site/clip.mp4"], false, Some(FacetType::Video))
        .unwrap();
    assert!(video[0].is_some());

    // stored facets lack the html bit, so the lookup misses
    let html = service
        .get_facets(&["site/clip.mp4"], false, Some(FacetType::Html))
        .unwrap();
    assert!(html[0].is_none());

    // the scheduled job finds facets already stored and leaves them alone
    scheduler.wait().await;
    let stored = archive.get_facets("site/clip.mp4", None).unwrap().unwrap();
    assert_eq!(stored["facet_types"], json!(1 | FacetType::Video.bit()));
}
