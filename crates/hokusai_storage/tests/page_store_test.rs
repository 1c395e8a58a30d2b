use hokusai_core::{Page, RenderTarget};
use hokusai_storage::{DataLayout, PageStore, write_atomic};
use serde_json::json;

fn sample_page(number: u32) -> Page {
    Page::from_value(json!({
        "page_number": number,
        "panels": [{
            "panel_number": 1,
            "description": "a lighthouse at dawn",
            "background": "coastline",
            "camera_angle": "wide",
            "characters": [],
            "dialogues": []
        }]
    }))
    .unwrap()
}

#[tokio::test]
async fn save_and_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = PageStore::new(DataLayout::new(dir.path()));

    let page = sample_page(3);
    store.save(&page).await.unwrap();

    let loaded = store.load(3).await.unwrap();
    assert_eq!(page, loaded);
    assert!(dir.path().join("pages/page_003.json").exists());
}

#[tokio::test]
async fn load_missing_page_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = PageStore::new(DataLayout::new(dir.path()));
    let err = store.load(42).await.unwrap_err();
    assert!(err.to_string().contains("Not found"));
}

#[tokio::test]
async fn list_returns_sorted_page_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let store = PageStore::new(DataLayout::new(dir.path()));

    for n in [5, 1, 12] {
        store.save(&sample_page(n)).await.unwrap();
    }
    assert_eq!(store.list().await.unwrap(), vec![1, 5, 12]);
}

#[tokio::test]
async fn set_rendered_marks_page_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = PageStore::new(DataLayout::new(dir.path()));

    store.save(&sample_page(1)).await.unwrap();
    let location = store
        .set_rendered(RenderTarget::page(1), b"jpeg-bytes")
        .await
        .unwrap();
    assert!(location.ends_with("page_001.jpg"));

    let page = store.load(1).await.unwrap();
    assert!(page.is_rendered());
    assert_eq!(page.rendered_artifact_location.as_deref(), Some(location.as_str()));
}

#[tokio::test]
async fn sibling_targets_get_distinct_temp_files() {
    let dir = tempfile::tempdir().unwrap();

    // A stem-only temp file must not be touched by writes to page_001.json
    // or page_001.jpg; each target stages under its own full-name temp.
    let unrelated = dir.path().join("page_001.tmp");
    tokio::fs::write(&unrelated, b"unrelated").await.unwrap();

    write_atomic(&dir.path().join("page_001.json"), b"{\"page_number\":1}")
        .await
        .unwrap();
    write_atomic(&dir.path().join("page_001.jpg"), b"jpeg-bytes")
        .await
        .unwrap();

    assert_eq!(
        tokio::fs::read(&unrelated).await.unwrap(),
        b"unrelated".to_vec()
    );
    assert_eq!(
        tokio::fs::read(dir.path().join("page_001.json")).await.unwrap(),
        b"{\"page_number\":1}".to_vec()
    );
    assert_eq!(
        tokio::fs::read(dir.path().join("page_001.jpg")).await.unwrap(),
        b"jpeg-bytes".to_vec()
    );
}

#[tokio::test]
async fn panel_artifact_does_not_mark_page() {
    let dir = tempfile::tempdir().unwrap();
    let store = PageStore::new(DataLayout::new(dir.path()));

    store.save(&sample_page(2)).await.unwrap();
    let location = store
        .set_rendered(RenderTarget::panel(2, 1), b"jpeg-bytes")
        .await
        .unwrap();
    assert!(location.ends_with("page_002_panel_01.jpg"));

    let page = store.load(2).await.unwrap();
    assert!(!page.is_rendered());
}
