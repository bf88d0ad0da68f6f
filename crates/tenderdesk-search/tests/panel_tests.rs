//! Search panel lifecycle: mount, edits, teardown

mod support;

use std::sync::Arc;
use std::time::Duration;
use support::MockTenderApi;
use tenderdesk_core::FilterOptions;
use tenderdesk_search::{FilterField, FilterValue, SchedulerConfig, SearchEvent, SearchPanel};
use tokio::time::sleep;

fn options() -> FilterOptions {
    let mut options = FilterOptions {
        prefectures: vec!["東京都".into(), "大阪府".into()],
        municipalities: vec!["新宿区".into(), "大阪市".into()],
        ..Default::default()
    };
    options
        .prefecture_municipalities
        .insert("東京都".into(), vec!["新宿区".into()]);
    options
        .prefecture_municipalities
        .insert("大阪府".into(), vec!["大阪市".into()]);
    options
}

#[tokio::test(start_paused = true)]
async fn test_mount_loads_options_and_searches_immediately() {
    let api = Arc::new(MockTenderApi::new().with_options(options()));
    let mut panel = SearchPanel::new(api.clone(), SchedulerConfig::default());

    panel.mount().await;

    assert_eq!(api.call_count(), 1);
    assert!(api.requests()[0].is_empty());
    assert!(panel.options_error().is_none());
    assert_eq!(panel.filters().sub_region_choices().len(), 2);
    assert_eq!(panel.view().records.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_mount_degrades_when_options_fail() {
    let api = Arc::new(MockTenderApi::new().failing_options());
    let mut panel = SearchPanel::new(api.clone(), SchedulerConfig::default());
    let mut events = panel.scheduler().subscribe();

    panel.mount().await;

    assert_eq!(panel.options_error(), Some("フィルターオプションの取得に失敗しました"));
    assert_eq!(api.call_count(), 1);
    assert!(panel.view().error.is_none());
    assert!(matches!(
        events.try_recv(),
        Ok(SearchEvent::OptionsUnavailable { .. })
    ));

    // Without options the sub-region is never narrowed
    panel.set_field(FilterField::SubRegion, FilterValue::value("新宿区"));
    let state = panel.set_field(FilterField::Region, FilterValue::value("大阪府"));
    assert_eq!(state.get(FilterField::SubRegion), &FilterValue::value("新宿区"));
}

#[tokio::test(start_paused = true)]
async fn test_edits_cascade_then_debounce() {
    let api = Arc::new(MockTenderApi::new().with_options(options()));
    let mut panel = SearchPanel::new(api.clone(), SchedulerConfig::default());
    panel.mount().await;

    panel.set_field(FilterField::Region, FilterValue::value("東京都"));
    panel.set_field(FilterField::SubRegion, FilterValue::value("新宿区"));
    let state = panel.set_field(FilterField::Region, FilterValue::value("大阪府"));
    assert!(state.get(FilterField::SubRegion).is_any());

    sleep(Duration::from_millis(600)).await;

    let requests = api.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].prefecture.as_deref(), Some("大阪府"));
    assert_eq!(requests[1].municipality, None);
}

#[tokio::test(start_paused = true)]
async fn test_drop_tears_down_pending_search() {
    let api = Arc::new(MockTenderApi::new());
    {
        let mut panel = SearchPanel::new(api.clone(), SchedulerConfig::default());
        panel.set_field(FilterField::UseType, FilterValue::value("学校"));
    }

    sleep(Duration::from_millis(1_000)).await;
    assert_eq!(api.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reset_schedules_unfiltered_search() {
    let api = Arc::new(MockTenderApi::new());
    let mut panel = SearchPanel::new(api.clone(), SchedulerConfig::default());

    panel.set_field(FilterField::MinPrice, FilterValue::value("1,000,000"));
    assert!(panel.reset().is_unconstrained());

    sleep(Duration::from_millis(600)).await;
    assert_eq!(api.call_count(), 1);
    assert!(api.requests()[0].is_empty());
}
