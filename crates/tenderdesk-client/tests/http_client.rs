//! HTTP client tests against an in-process backend

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tenderdesk_client::{ApiConfig, HttpTenderApi};
use tenderdesk_core::{
    BulkBid, BulkPredictionRequest, Error, SearchRequest, SessionState, TenderApi,
};

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Default)]
struct Backend {
    hits: AtomicUsize,
}

fn authorized(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer tok-valid") => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Could not validate credentials"})),
        )),
    }
}

async fn login(Json(body): Json<Value>) -> Reply {
    let token = match (body["email"].as_str(), body["password"].as_str()) {
        (Some("expired@example.com"), Some("secret")) => "tok-expired",
        (Some(_), Some("secret")) => "tok-valid",
        _ => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Invalid credentials"})),
            ))
        }
    };
    Ok(Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "company_id": 3,
        "company_name": "星田建設株式会社",
        "email": body["email"],
    })))
}

async fn search(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Query(params): Query<BTreeMap<String, String>>,
) -> Reply {
    backend.hits.fetch_add(1, Ordering::SeqCst);
    authorized(&headers)?;

    // Echo the received query keys through the title
    let keys: Vec<&str> = params.keys().map(String::as_str).collect();
    Ok(Json(json!([{
        "tender_id": "T1",
        "title": keys.join(","),
        "prefecture": params.get("prefecture").cloned().unwrap_or_default(),
        "estimated_price": 300000000u64,
    }])))
}

async fn options() -> Json<Value> {
    Json(json!({"prefectures": ["東京都"], "prefecture_municipalities": {"東京都": ["新宿区"]}}))
}

async fn predict(headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    authorized(&headers)?;
    Ok(Json(json!({
        "tender_id": body["tender_id"],
        "rank": "B",
        "win_probability": 0.62,
        "confidence": "high",
        "recommendation": format!("bid {}", body["bid_amount"]),
    })))
}

async fn predict_bulk(headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    authorized(&headers)?;
    Ok(Json(json!({
        "total": 2,
        "predictions": [
            {"tender_id": "T1", "rank": "A", "win_probability": 0.8,
             "recommendation": body.to_string()},
            {"tender_id": "T2", "rank": "D", "win_probability": 0.2},
        ],
    })))
}

async fn broken() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"detail": "database unavailable"})),
    )
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({}))
}

async fn spawn_backend(options_route: bool) -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let mut app = Router::new()
        .route("/auth/login", post(login))
        .route("/tenders/search", get(search))
        .route("/predict", post(predict))
        .route("/predict-bulk", post(predict_bulk));
    app = if options_route {
        app.route("/filters/options", get(options))
    } else {
        app.route("/filters/options", get(broken))
    };
    let app = app.with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), backend)
}

fn client(base_url: &str) -> HttpTenderApi {
    HttpTenderApi::new(&ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_login_and_search_strips_unset_filters() {
    let (url, _) = spawn_backend(true).await;
    let api = client(&url);

    let session = api.login("sales@hoshida.example", "secret").await.unwrap();
    assert_eq!(session.company_id(), 3);
    assert_eq!(session.company_name(), "星田建設株式会社");
    let api = api.with_session(session);

    let request = SearchRequest {
        prefecture: Some("東京都".to_string()),
        min_price: Some(100_000_000),
        ..Default::default()
    };
    let tenders = api.search_tenders(&request).await.unwrap();

    assert_eq!(tenders.len(), 1);
    assert_eq!(tenders[0].title, "min_price,prefecture");
    assert_eq!(tenders[0].prefecture, "東京都");
    assert_eq!(tenders[0].estimated_price, Some(300_000_000));
}

#[tokio::test]
async fn test_login_rejected() {
    let (url, _) = spawn_backend(true).await;
    let api = client(&url);

    match api.login("sales@hoshida.example", "wrong").await {
        Err(Error::Validation(message)) => assert_eq!(message, "Invalid credentials"),
        other => panic!("unexpected result: {:?}", other.map(|s| s.company_id())),
    }
    assert!(matches!(api.login("", "secret").await, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_unauthorized_invalidates_session() {
    let (url, backend) = spawn_backend(true).await;
    let api = client(&url);
    let session = api.login("expired@example.com", "secret").await.unwrap();
    let api = api.with_session(session.clone());

    let result = api.search_tenders(&SearchRequest::default()).await;
    assert!(matches!(result, Err(Error::Unauthorized)));
    assert_eq!(session.state(), SessionState::Invalidated);
    assert_eq!(backend.hits.load(Ordering::SeqCst), 1);

    // Invalidated sessions fail fast without contacting the backend
    let result = api.search_tenders(&SearchRequest::default()).await;
    assert!(matches!(result, Err(Error::Unauthorized)));
    assert_eq!(backend.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_filter_options_default_missing_fields() {
    let (url, _) = spawn_backend(true).await;
    let options = client(&url).filter_options().await.unwrap();

    assert_eq!(options.prefectures, vec!["東京都".to_string()]);
    assert!(options.use_types.is_empty());
    assert_eq!(options.sub_regions_of("東京都").map(|s| s.len()), Some(1));
}

#[tokio::test]
async fn test_remote_error_carries_detail() {
    let (url, _) = spawn_backend(false).await;

    match client(&url).filter_options().await {
        Err(Error::Remote { status, detail }) => {
            assert_eq!(status, 500);
            assert_eq!(detail, "database unavailable");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_predictions() {
    let (url, _) = spawn_backend(true).await;
    let api = client(&url);
    let session = api.login("sales@hoshida.example", "secret").await.unwrap();
    let api = api.with_session(session);

    let record = api
        .predict_single("T9", 250_000_000, "星田建設株式会社")
        .await
        .unwrap();
    assert_eq!(record.tender_id, "T9");
    assert_eq!(record.recommendation, "bid 250000000");

    let request = BulkPredictionRequest {
        filters: SearchRequest {
            use_type: Some("学校".to_string()),
            ..Default::default()
        },
        bid: BulkBid::Ratio(90),
        company_name: "星田建設株式会社".to_string(),
        price_range: Some((100_000_000, 2_000_000_000)),
    };
    let records = api.predict_bulk(&request).await.unwrap();
    assert_eq!(records.len(), 2);

    let sent: Value = serde_json::from_str(&records[0].recommendation).unwrap();
    assert_eq!(sent["use_type"], "学校");
    assert_eq!(sent["bid_amount"], 90);
    assert_eq!(sent["use_ratio"], true);
    assert_eq!(sent["max_price"], 2_000_000_000u64);
    assert!(sent.get("prefecture").is_none());
}

#[tokio::test]
async fn test_timeout() {
    let backend = Router::new().route("/filters/options", get(slow));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend).await.unwrap();
    });

    let api = HttpTenderApi::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: 1,
    })
    .unwrap();

    assert!(matches!(api.filter_options().await, Err(Error::Timeout)));
}
