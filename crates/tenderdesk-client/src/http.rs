//! reqwest implementation of the backend API

use crate::config::ApiConfig;
use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tenderdesk_core::{
    BulkPredictionRequest, Error, FilterOptions, PredictionRecord, Result, SearchRequest,
    SessionContext, TenderApi, TenderSummary,
};
use tracing::{debug, info, warn};

const LOGIN_FAILED_MESSAGE: &str = "ログインに失敗しました";
const MISSING_CREDENTIALS_MESSAGE: &str = "メールアドレスとパスワードを入力してください";

/// HTTP client for the tender/prediction backend
///
/// Requests carry `Authorization: Bearer <token>` while the attached session
/// is active. Any 401 invalidates the session; after that every call fails
/// with [`Error::Unauthorized`] until a new session is attached.
#[derive(Clone)]
pub struct HttpTenderApi {
    client: Client,
    base_url: String,
    session: Option<Arc<SessionContext>>,
}

impl HttpTenderApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    pub fn with_session(mut self, session: Arc<SessionContext>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Arc<SessionContext>> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticate and create a session context
    pub async fn login(&self, email: &str, password: &str) -> Result<Arc<SessionContext>> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(Error::validation(MISSING_CREDENTIALS_MESSAGE));
        }

        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            warn!(status = status.as_u16(), %detail, "login rejected");
            return Err(if status.is_client_error() {
                Error::validation(if detail.is_empty() {
                    LOGIN_FAILED_MESSAGE.to_string()
                } else {
                    detail
                })
            } else {
                Error::Remote {
                    status: status.as_u16(),
                    detail,
                }
            });
        }

        let body = response.text().await.map_err(map_transport_error)?;
        let login: LoginResponse = serde_json::from_str(&body)?;
        info!(company_id = login.company_id, company = %login.company_name, "logged in");

        let email = if login.email.is_empty() {
            email.to_string()
        } else {
            login.email
        };
        Ok(Arc::new(SessionContext::new(
            login.company_id,
            login.company_name,
            email,
            login.token,
        )))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match &self.session {
            None => Ok(request),
            Some(session) => match session.bearer_token() {
                Some(token) => Ok(request.bearer_auth(token)),
                None => Err(Error::Unauthorized),
            },
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, endpoint: &str) -> Result<T> {
        let request = self.authorize(request)?;
        counter!("tenderdesk_api_requests_total", "endpoint" => endpoint.to_string()).increment(1);

        let response = request.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "request failed");
            map_transport_error(e)
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(endpoint, "backend rejected credentials, invalidating session");
            if let Some(session) = &self.session {
                session.invalidate();
            }
            return Err(Error::Unauthorized);
        }
        if !status.is_success() {
            let detail = error_detail(response).await;
            warn!(endpoint, status = status.as_u16(), %detail, "backend returned an error");
            return Err(Error::Remote {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await.map_err(map_transport_error)?;
        debug!(endpoint, bytes = body.len(), "response received");
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TenderApi for HttpTenderApi {
    async fn search_tenders(&self, request: &SearchRequest) -> Result<Vec<TenderSummary>> {
        let builder = self.client.get(self.url("/tenders/search")).query(request);
        self.execute(builder, "search").await
    }

    async fn filter_options(&self) -> Result<FilterOptions> {
        let builder = self.client.get(self.url("/filters/options"));
        self.execute(builder, "filter_options").await
    }

    async fn predict_single(
        &self,
        tender_id: &str,
        bid_amount: u64,
        company_name: &str,
    ) -> Result<PredictionRecord> {
        let payload = PredictPayload {
            tender_id,
            bid_amount,
            company_name,
        };
        let builder = self.client.post(self.url("/predict")).json(&payload);
        self.execute(builder, "predict").await
    }

    async fn predict_bulk(&self, request: &BulkPredictionRequest) -> Result<Vec<PredictionRecord>> {
        let payload = BulkPayload::from(request);
        let builder = self.client.post(self.url("/predict-bulk")).json(&payload);
        let response: BulkResponse = self.execute(builder, "predict_bulk").await?;
        Ok(response.into_records())
    }
}

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else {
        Error::transport(err.to_string())
    }
}

/// Backend error text: the JSON `detail` field when present, else the body
async fn error_detail(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.detail)
        .unwrap_or(body)
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(alias = "access_token")]
    token: String,
    company_id: i64,
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    email: String,
}

#[derive(Serialize)]
struct PredictPayload<'a> {
    tender_id: &'a str,
    bid_amount: u64,
    company_name: &'a str,
}

/// Body of `POST /predict-bulk`
#[derive(Debug, Serialize)]
struct BulkPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    prefecture: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    municipality: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_type: Option<&'a str>,
    bid_amount: u64,
    company_name: &'a str,
    use_ratio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_price: Option<u64>,
}

impl<'a> From<&'a BulkPredictionRequest> for BulkPayload<'a> {
    fn from(request: &'a BulkPredictionRequest) -> Self {
        Self {
            prefecture: request.filters.prefecture.as_deref(),
            municipality: request.filters.municipality.as_deref(),
            use_type: request.filters.use_type.as_deref(),
            bid_amount: request.bid.value(),
            company_name: &request.company_name,
            use_ratio: request.bid.is_ratio(),
            min_price: request.price_range.map(|(low, _)| low),
            max_price: request.price_range.map(|(_, high)| high),
        }
    }
}

/// The bulk endpoint answers with either a bare list or `{predictions: [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum BulkResponse {
    List(Vec<PredictionRecord>),
    Wrapped {
        #[serde(default)]
        predictions: Vec<PredictionRecord>,
    },
}

impl BulkResponse {
    fn into_records(self) -> Vec<PredictionRecord> {
        match self {
            Self::List(records) | Self::Wrapped { predictions: records } => records,
        }
    }
}
