use async_trait::async_trait;
use hokusai_core::{AspectRatio, ImageSize, Page, RenderRequest, RenderTarget};
use hokusai_error::HokusaiResult;
use hokusai_interface::RenderDriver;
use hokusai_registry::ReferenceRegistry;
use hokusai_render::{BatchOrchestrator, CancelFlag, RequestBuilder};
use hokusai_storage::{DataLayout, PageStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Tracks how many renders are in flight and the maximum ever observed.
/// Instructions containing "fail" error out; "slow" sleeps past any short
/// test timeout.
struct ObservingDriver {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    cancel_on_first_call: Option<CancelFlag>,
}

impl ObservingDriver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            cancel_on_first_call: None,
        })
    }

    fn cancelling(flag: CancelFlag) -> Arc<Self> {
        Arc::new(Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            cancel_on_first_call: Some(flag),
        })
    }
}

#[async_trait]
impl RenderDriver for ObservingDriver {
    async fn render(
        &self,
        instruction: &str,
        _reference_artifacts: &[String],
        _size_hint: ImageSize,
        _aspect_ratio: AspectRatio,
    ) -> HokusaiResult<Vec<u8>> {
        if let Some(flag) = &self.cancel_on_first_call {
            flag.cancel();
        }
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let outcome = if instruction.contains("slow") {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(b"too late".to_vec())
        } else if instruction.contains("fail") {
            Err(hokusai_error::RenderError::new(hokusai_error::RenderErrorKind::NoImage(
                "injected failure".to_string(),
            ))
            .into())
        } else {
            tokio::time::sleep(Duration::from_millis(25)).await;
            Ok(format!("render of: {instruction}").into_bytes())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    fn provider_name(&self) -> &'static str {
        "observer"
    }

    fn model_name(&self) -> &str {
        "observer-model"
    }
}

fn page_with_panels(page_number: u32, character_id: Option<&str>) -> Page {
    let characters = match character_id {
        Some(id) => serde_json::json!([{
            "character_id": id,
            "character_name": "Aya",
            "position": {"x": 0.5, "y": 0.5, "scale": 1.0},
            "action": "running"
        }]),
        None => serde_json::json!([]),
    };
    Page::from_value(serde_json::json!({
        "page_number": page_number,
        "panels": [
            {
                "panel_number": 1,
                "characters": characters,
                "background": "rooftop",
                "camera_angle": "wide",
                "description": "Aya runs across the rooftop"
            }
        ]
    }))
    .unwrap()
}

fn page_request(page_number: u32, instruction: &str) -> RenderRequest {
    RenderRequest {
        target: RenderTarget::page(page_number),
        instruction: instruction.to_string(),
        character_artifacts: Vec::new(),
        scene_artifacts: Vec::new(),
        size_hint: ImageSize::K2,
        aspect_ratio: AspectRatio::Portrait,
    }
}

async fn store_with_pages(dir: &std::path::Path, numbers: &[u32]) -> Arc<PageStore> {
    let store = Arc::new(PageStore::new(DataLayout::new(dir)));
    for &n in numbers {
        store.save(&page_with_panels(n, None)).await.unwrap();
    }
    store
}

#[tokio::test]
async fn builder_resolves_and_counts_usage() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(
        ReferenceRegistry::open(DataLayout::new(dir.path()), ObservingDriver::new())
            .await
            .unwrap(),
    );
    registry
        .create_or_update_character("Aya", "a courier", BTreeMap::new(), "manga")
        .await
        .unwrap();
    let builder = RequestBuilder::new(registry.clone());

    let ids = vec!["char_aya".to_string()];
    for panel in 1..=3 {
        let request = builder
            .build_panel_request(
                1,
                panel,
                "Aya mid-leap",
                &ids,
                &[],
                ImageSize::K2,
                AspectRatio::Portrait,
            )
            .unwrap();
        assert_eq!(request.character_artifacts.len(), 1);
        assert_eq!(request.target, RenderTarget::panel(1, panel));
    }

    assert_eq!(registry.get("char_aya").unwrap().usage_count(), 3);
}

#[tokio::test]
async fn builder_fails_hard_on_unknown_id() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(
        ReferenceRegistry::open(DataLayout::new(dir.path()), ObservingDriver::new())
            .await
            .unwrap(),
    );
    let builder = RequestBuilder::new(registry);

    let err = builder
        .build_panel_request(
            1,
            1,
            "anything",
            &["char_ghost".to_string()],
            &[],
            ImageSize::K2,
            AspectRatio::Portrait,
        )
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn failed_build_leaves_usage_counts_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(
        ReferenceRegistry::open(DataLayout::new(dir.path()), ObservingDriver::new())
            .await
            .unwrap(),
    );
    registry
        .create_or_update_character("Aya", "a courier", BTreeMap::new(), "manga")
        .await
        .unwrap();
    let builder = RequestBuilder::new(registry.clone());

    // A resolvable character alongside an unknown scene: the build must fail
    // without counting the character occurrence.
    let err = builder
        .build_panel_request(
            1,
            1,
            "Aya at the harbor",
            &["char_aya".to_string()],
            &["scene_ghost".to_string()],
            ImageSize::K2,
            AspectRatio::Portrait,
        )
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert_eq!(registry.get("char_aya").unwrap().usage_count(), 0);

    // Same guarantee for whole-page composition
    let mut page = page_with_panels(4, Some("char_aya"));
    page.panels[0].background_ref = Some("scene_ghost".to_string());
    assert!(
        builder
            .build_page_request(&page, "manga", ImageSize::K2, AspectRatio::Portrait)
            .is_err()
    );
    assert_eq!(registry.get("char_aya").unwrap().usage_count(), 0);
}

#[tokio::test]
async fn page_request_dedupes_artifacts_but_counts_each_occurrence() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(
        ReferenceRegistry::open(DataLayout::new(dir.path()), ObservingDriver::new())
            .await
            .unwrap(),
    );
    registry
        .create_or_update_character("Aya", "a courier", BTreeMap::new(), "manga")
        .await
        .unwrap();
    let builder = RequestBuilder::new(registry.clone());

    let mut page = page_with_panels(7, Some("char_aya"));
    let mut second = page.panels[0].clone();
    second.panel_number = 2;
    page.panels.push(second);

    let request = builder
        .build_page_request(&page, "manga", ImageSize::K2, AspectRatio::Portrait)
        .unwrap();
    assert_eq!(request.character_artifacts.len(), 1);
    assert_eq!(request.target, RenderTarget::page(7));
    assert_eq!(registry.get("char_aya").unwrap().usage_count(), 2);
}

#[tokio::test]
async fn batch_bounds_concurrency_and_covers_all_requests() {
    let dir = tempfile::tempdir().unwrap();
    let pages = [1, 2, 3, 4, 5];
    let store = store_with_pages(dir.path(), &pages).await;
    let driver = ObservingDriver::new();
    let orchestrator =
        BatchOrchestrator::new(driver.clone(), store.clone(), Duration::from_secs(10));

    let requests: Vec<RenderRequest> = pages
        .iter()
        .map(|&n| page_request(n, "a calm street scene"))
        .collect();
    let result = orchestrator.run(requests, 2).await.unwrap();

    assert_eq!(result.total_attempted, 5);
    assert!(result.failed.is_empty());
    let reported: Vec<u32> = result
        .succeeded
        .iter()
        .map(|(target, _)| target.page_number)
        .collect();
    assert_eq!(reported, pages);
    assert!(driver.max_in_flight.load(Ordering::SeqCst) <= 2);

    // Successful page renders are committed before being reported
    for &n in &pages {
        assert!(store.load(n).await.unwrap().is_rendered());
    }
}

#[tokio::test]
async fn one_failure_does_not_block_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with_pages(dir.path(), &[1, 2, 3]).await;
    let orchestrator =
        BatchOrchestrator::new(ObservingDriver::new(), store, Duration::from_secs(10));

    let requests = vec![
        page_request(1, "a quiet alley"),
        page_request(2, "this one will fail"),
        page_request(3, "a crowded market"),
    ];
    let result = orchestrator.run(requests, 2).await.unwrap();

    assert_eq!(result.total_attempted, 3);
    assert_eq!(result.succeeded.len(), 2);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].0, RenderTarget::page(2));
}

#[tokio::test]
async fn timeout_is_a_per_item_failure() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with_pages(dir.path(), &[1, 2]).await;
    let orchestrator =
        BatchOrchestrator::new(ObservingDriver::new(), store, Duration::from_millis(100));

    let requests = vec![
        page_request(1, "slow render that never returns"),
        page_request(2, "a fast render"),
    ];
    let result = orchestrator.run(requests, 2).await.unwrap();

    assert_eq!(result.succeeded.len(), 1);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].0, RenderTarget::page(1));
    assert!(result.failed[0].1.contains("timed out"));
}

#[tokio::test]
async fn zero_limit_is_rejected_before_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with_pages(dir.path(), &[1]).await;
    let orchestrator =
        BatchOrchestrator::new(ObservingDriver::new(), store, Duration::from_secs(10));

    let err = orchestrator
        .run(vec![page_request(1, "anything")], 0)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("concurrency"));
}

#[tokio::test]
async fn cancellation_stops_new_dispatches_but_keeps_completed_results() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_with_pages(dir.path(), &[1, 2, 3]).await;
    let flag = CancelFlag::new();
    let driver = ObservingDriver::cancelling(flag.clone());
    let orchestrator = BatchOrchestrator::new(driver, store, Duration::from_secs(10));

    let requests = vec![
        page_request(1, "dispatched before the flag flips"),
        page_request(2, "never dispatched"),
        page_request(3, "never dispatched"),
    ];
    let result = orchestrator
        .run_with_cancel(requests, 1, flag)
        .await
        .unwrap();

    assert_eq!(result.total_attempted, 1);
    assert_eq!(result.succeeded.len(), 1);
    assert_eq!(result.succeeded[0].0, RenderTarget::page(1));
    assert_eq!(result.failed.len(), 2);
    assert!(result.failed.iter().all(|(_, reason)| reason.contains("cancelled")));
}
