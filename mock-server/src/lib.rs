use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub mod tls;

pub const PULL_FUNDS_PATH: &str = "/visadirect/fundstransfer/v1/pullfundstransactions/";

/// Response header carrying the gateway's own id for the call.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

pub const DEFAULT_USER_ID: &str = "user_id";
pub const DEFAULT_PASSWORD: &str = "user_password";

/// `transactionIdentifier` handed out for the first accepted request; later
/// ones count up from here.
pub const FIRST_TRANSACTION_IDENTIFIER: u64 = 123456789012345;

/// The subset of the pull-funds request the mock inspects. Unknown fields are
/// accepted and ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullFundsRequest {
    pub systems_trace_audit_number: u32,
    pub retrieval_reference_number: String,
    pub sender_primary_account_number: String,
    pub sender_currency_code: String,
    #[serde(default)]
    pub amount: Option<f64>,
    pub business_application_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullFundsResponse {
    pub status_identifier: String,
    pub transaction_identifier: u64,
    pub action_code: String,
    pub response_code: String,
    pub transmission_date_time: String,
}

#[derive(Clone, Debug)]
pub struct ReceivedTransaction {
    pub transaction_id: String,
    pub request: PullFundsRequest,
}

pub type Ledger = Arc<RwLock<Vec<ReceivedTransaction>>>;

#[derive(Clone)]
pub struct MockState {
    authorization: String,
    pub ledger: Ledger,
}

impl MockState {
    pub fn new(user_id: &str, password: &str) -> Self {
        Self {
            authorization: format!("Basic {}", STANDARD.encode(format!("{user_id}:{password}"))),
            ledger: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn received(&self) -> Vec<ReceivedTransaction> {
        self.ledger.read().await.clone()
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new(DEFAULT_USER_ID, DEFAULT_PASSWORD)
    }
}

pub fn app() -> Router {
    router(MockState::default())
}

pub fn router(state: MockState) -> Router {
    Router::new()
        .route(PULL_FUNDS_PATH, post(pull_funds))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

type ErrorReply = (StatusCode, Json<Value>);

fn error_reply(status: StatusCode, code: &str, message: &str) -> ErrorReply {
    (
        status,
        Json(json!({
            "responseStatus": {
                "status": status.as_u16(),
                "code": code,
                "severity": "ERROR",
                "message": message,
            }
        })),
    )
}

async fn pull_funds(
    State(state): State<MockState>,
    headers: HeaderMap,
    payload: Result<Json<PullFundsRequest>, JsonRejection>,
) -> Result<([(&'static str, String); 1], Json<PullFundsResponse>), ErrorReply> {
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == state.authorization);
    if !authorized {
        tracing::warn!("rejected pull funds request with bad credentials");
        return Err(error_reply(
            StatusCode::UNAUTHORIZED,
            "9124",
            "Expected input credential was not present",
        ));
    }

    let transaction_id = headers
        .get("x-client-transaction-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| error_reply(StatusCode::BAD_REQUEST, "9125", "X-Client-Transaction-ID is required"))?
        .to_string();

    let Json(request) = payload.map_err(|rejection| {
        error_reply(rejection.status(), "9034", &rejection.body_text())
    })?;

    let mut ledger = state.ledger.write().await;
    ledger.push(ReceivedTransaction {
        transaction_id: transaction_id.clone(),
        request,
    });
    let transaction_identifier = FIRST_TRANSACTION_IDENTIFIER + ledger.len() as u64 - 1;
    tracing::info!(%transaction_id, transaction_identifier, "accepted pull funds transaction");

    let correlation_id = format!("{}_{transaction_identifier}", chrono::Utc::now().timestamp_millis());
    Ok((
        [(CORRELATION_ID_HEADER, correlation_id)],
        Json(PullFundsResponse {
            status_identifier: String::new(),
            transaction_identifier,
            action_code: "00".to_string(),
            response_code: "0".to_string(),
            transmission_date_time: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        }),
    ))
}
