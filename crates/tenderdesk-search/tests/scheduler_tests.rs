//! Debounce, staleness and teardown behaviour of the search scheduler
//!
//! All tests run on a paused clock; `sleep` advances virtual time.

mod support;

use std::sync::Arc;
use std::time::Duration;
use support::MockTenderApi;
use tenderdesk_search::{
    FilterController, FilterField, FilterValue, SchedulerConfig, SearchEvent, SearchPhase,
    SearchScheduler,
};
use tokio::time::sleep;

fn scheduler(api: &Arc<MockTenderApi>) -> SearchScheduler {
    SearchScheduler::new(api.clone(), SchedulerConfig::default())
}

fn region(controller: &mut FilterController, name: &str) {
    controller.set_field(FilterField::Region, FilterValue::value(name));
}

#[tokio::test(start_paused = true)]
async fn test_rapid_changes_coalesce_into_one_search() {
    let api = Arc::new(MockTenderApi::new());
    let scheduler = scheduler(&api);
    let mut controller = FilterController::new();

    for name in ["Tokyo", "Osaka", "Kyoto"] {
        region(&mut controller, name);
        scheduler.notify_change(controller.state());
        sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(api.call_count(), 0);
    assert_eq!(scheduler.phase(), SearchPhase::Pending);

    sleep(Duration::from_millis(600)).await;

    assert_eq!(api.call_count(), 1);
    assert_eq!(api.requests()[0].prefecture.as_deref(), Some("Kyoto"));

    let view = scheduler.snapshot();
    assert_eq!(view.records.len(), 1);
    assert_eq!(view.records[0].prefecture, "Kyoto");
    assert_eq!(view.phase, SearchPhase::Idle);
    assert!(!view.loading);
}

#[tokio::test(start_paused = true)]
async fn test_generation_increases_with_every_change() {
    let api = Arc::new(MockTenderApi::new());
    let scheduler = scheduler(&api);
    let controller = FilterController::new();

    assert_eq!(scheduler.generation(), 0);
    scheduler.notify_change(controller.state());
    scheduler.notify_change(controller.state());
    scheduler.notify_change(controller.state());
    assert_eq!(scheduler.generation(), 3);

    scheduler.force_search_now().await;
    assert_eq!(scheduler.generation(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_never_overwrites_newer_one() {
    let api = Arc::new(
        MockTenderApi::new()
            .with_region_latency("Slow", Duration::from_millis(1_000))
            .with_region_latency("Fast", Duration::from_millis(10)),
    );
    let scheduler = scheduler(&api);
    let mut events = scheduler.subscribe();
    let mut controller = FilterController::new();

    region(&mut controller, "Slow");
    scheduler.notify_change(controller.state());
    sleep(Duration::from_millis(600)).await;
    assert_eq!(api.call_count(), 1);
    assert_eq!(scheduler.phase(), SearchPhase::InFlight);

    region(&mut controller, "Fast");
    scheduler.notify_change(controller.state());
    sleep(Duration::from_millis(2_000)).await;

    // Both calls ran to completion; only the newer one was applied
    assert_eq!(api.completed_count(), 2);
    let view = scheduler.snapshot();
    assert_eq!(view.records[0].prefecture, "Fast");
    assert!(view.error.is_none());

    let mut applied = Vec::new();
    let mut discarded = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            SearchEvent::Applied { generation, .. } => applied.push(generation),
            SearchEvent::Discarded { generation, latest } => discarded.push((generation, latest)),
            _ => {}
        }
    }
    assert_eq!(applied, vec![2]);
    assert_eq!(discarded, vec![(1, 2)]);
}

#[tokio::test(start_paused = true)]
async fn test_failure_sets_message_and_clears_records() {
    let api = Arc::new(MockTenderApi::new().failing_search());
    let scheduler = scheduler(&api);
    let controller = FilterController::new();

    scheduler.notify_change(controller.state());
    sleep(Duration::from_millis(600)).await;

    let view = scheduler.snapshot();
    assert!(view.records.is_empty());
    assert_eq!(
        view.error.as_deref(),
        Some("検索に失敗しました。しばらくしてから再度お試しください。")
    );
    assert_eq!(view.generation, 1);
    assert_eq!(api.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_force_search_cancels_pending_timer_and_resets_page() {
    let api = Arc::new(MockTenderApi::new());
    let scheduler = scheduler(&api);
    let mut controller = FilterController::new();

    scheduler.set_page(3);
    region(&mut controller, "Tokyo");
    scheduler.notify_change(controller.state());
    scheduler.force_search_now().await;

    assert_eq!(api.call_count(), 1);
    assert_eq!(scheduler.snapshot().page.page_index(), 0);

    sleep(Duration::from_millis(1_000)).await;
    assert_eq!(api.call_count(), 1);
    assert_eq!(api.requests()[0].prefecture.as_deref(), Some("Tokyo"));
}

#[tokio::test(start_paused = true)]
async fn test_teardown_before_fire_sends_nothing() {
    let api = Arc::new(MockTenderApi::new());
    let scheduler = scheduler(&api);
    let controller = FilterController::new();

    scheduler.notify_change(controller.state());
    scheduler.teardown();
    sleep(Duration::from_millis(1_000)).await;

    assert_eq!(api.call_count(), 0);
    assert_eq!(scheduler.phase(), SearchPhase::TornDown);

    // Further changes are ignored
    scheduler.notify_change(controller.state());
    sleep(Duration::from_millis(1_000)).await;
    assert_eq!(api.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_response_after_teardown_is_discarded() {
    let api = Arc::new(MockTenderApi::new().with_latency(Duration::from_millis(1_000)));
    let scheduler = scheduler(&api);
    let controller = FilterController::new();

    scheduler.notify_change(controller.state());
    sleep(Duration::from_millis(600)).await;
    assert_eq!(api.call_count(), 1);

    scheduler.teardown();
    sleep(Duration::from_millis(2_000)).await;

    assert_eq!(api.completed_count(), 1);
    assert!(scheduler.snapshot().records.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_applied_response_resets_page() {
    let api = Arc::new(MockTenderApi::new().with_latency(Duration::from_millis(100)));
    let scheduler = scheduler(&api);
    let controller = FilterController::new();

    scheduler.notify_change(controller.state());
    sleep(Duration::from_millis(550)).await;
    scheduler.set_page(2);
    sleep(Duration::from_millis(200)).await;

    assert_eq!(scheduler.snapshot().page.page_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_failure_is_discarded_after_newer_success() {
    let api = Arc::new(
        MockTenderApi::new()
            .with_region_latency("Slow", Duration::from_millis(1_000))
            .with_region_latency("Fast", Duration::from_millis(10))
            .failing_region("Slow"),
    );
    let scheduler = scheduler(&api);
    let mut events = scheduler.subscribe();
    let mut controller = FilterController::new();

    region(&mut controller, "Slow");
    scheduler.notify_change(controller.state());
    sleep(Duration::from_millis(600)).await;
    assert_eq!(api.call_count(), 1);

    region(&mut controller, "Fast");
    scheduler.notify_change(controller.state());
    sleep(Duration::from_millis(520)).await;

    // Fast was applied before the slow failure came back
    assert_eq!(scheduler.snapshot().records[0].prefecture, "Fast");
    sleep(Duration::from_millis(2_000)).await;
    assert_eq!(api.completed_count(), 2);

    let view = scheduler.snapshot();
    assert_eq!(view.records.len(), 1);
    assert_eq!(view.records[0].prefecture, "Fast");
    assert!(view.error.is_none());
    assert!(!view.loading);

    let mut failed = 0;
    let mut discarded = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            SearchEvent::Failed { .. } => failed += 1,
            SearchEvent::Discarded { generation, latest } => discarded.push((generation, latest)),
            _ => {}
        }
    }
    assert_eq!(failed, 0);
    assert_eq!(discarded, vec![(1, 2)]);
}

#[tokio::test(start_paused = true)]
async fn test_retry_clears_previous_error_while_in_flight() {
    let api = Arc::new(
        MockTenderApi::new()
            .failing_region("Broken")
            .with_region_latency("Slow", Duration::from_millis(1_000)),
    );
    let scheduler = scheduler(&api);
    let mut controller = FilterController::new();

    region(&mut controller, "Broken");
    scheduler.notify_change(controller.state());
    sleep(Duration::from_millis(600)).await;
    assert!(scheduler.snapshot().error.is_some());

    region(&mut controller, "Slow");
    scheduler.notify_change(controller.state());
    sleep(Duration::from_millis(600)).await;

    let view = scheduler.snapshot();
    assert_eq!(view.phase, SearchPhase::InFlight);
    assert!(view.loading);
    assert!(view.error.is_none());

    sleep(Duration::from_millis(1_000)).await;
    assert_eq!(scheduler.snapshot().records[0].prefecture, "Slow");
}

#[tokio::test(start_paused = true)]
async fn test_dropping_scheduler_cancels_pending_search() {
    let api = Arc::new(MockTenderApi::new());
    let controller = FilterController::new();

    let scheduler = scheduler(&api);
    let clone = scheduler.clone();
    scheduler.notify_change(controller.state());
    drop(scheduler);
    drop(clone);

    sleep(Duration::from_millis(1_000)).await;
    assert_eq!(api.call_count(), 0);
}
