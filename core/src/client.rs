//! Stateless HTTP request builder and response parser for the pull-funds
//! endpoint.
//!
//! # Design
//! `VisaDirectClient` holds only the base URL and the precomputed
//! `Authorization` value. Building an `HttpRequest` and parsing an
//! `HttpResponse` are separate steps so the marshalling stays free of I/O;
//! a `Transport` executes the round-trip in between.

use uuid::Uuid;

use crate::config::Credentials;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{PullFundsTransactionRequest, PullFundsTransactionResponse};

pub const PULL_FUNDS_TRANSACTIONS_PATH: &str = "/visadirect/fundstransfer/v1/pullfundstransactions/";

pub const TRANSACTION_ID_HEADER: &str = "X-Client-Transaction-ID";

/// Random correlation id for `X-Client-Transaction-ID`.
pub fn new_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone)]
pub struct VisaDirectClient {
    base_url: String,
    authorization: String,
}

impl std::fmt::Debug for VisaDirectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisaDirectClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl VisaDirectClient {
    pub fn new(base_url: &str, credentials: &Credentials) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: credentials.basic_auth_header(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_pull_funds_transaction(
        &self,
        request: &PullFundsTransactionRequest,
        transaction_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(request).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}{PULL_FUNDS_TRANSACTIONS_PATH}", self.base_url),
            headers: vec![
                (TRANSACTION_ID_HEADER.to_string(), transaction_id.to_string()),
                ("Authorization".to_string(), self.authorization.clone()),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            body: Some(body),
        })
    }

    pub fn parse_pull_funds_transaction(
        &self,
        response: HttpResponse,
    ) -> Result<PullFundsTransactionResponse, ApiError> {
        check_status(&response)?;
        serde_json::from_slice(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

/// Anything but 200 is a failure; the body is kept for diagnostics.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status == 200 {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body_text(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CardAcceptor, CardAcceptorAddress};

    fn client() -> VisaDirectClient {
        VisaDirectClient::new("https://sandbox.api.visa.com", &Credentials::new("user_id", "user_password"))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn request() -> PullFundsTransactionRequest {
        PullFundsTransactionRequest {
            systems_trace_audit_number: 123456,
            retrieval_reference_number: "407509300259".to_string(),
            sender_primary_account_number: "4957030100009952".to_string(),
            sender_currency_code: "USD".to_string(),
            amount: Some(110.0),
            business_application_id: "AA".to_string(),
            card_acceptor: CardAcceptor {
                name: "Saranya".to_string(),
                address: CardAcceptorAddress {
                    country: "USA".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn build_pull_funds_transaction_produces_correct_request() {
        let req = client()
            .build_pull_funds_transaction(&request(), "4f0b2f8e-0000-4000-8000-000000000001")
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.url,
            "https://sandbox.api.visa.com/visadirect/fundstransfer/v1/pullfundstransactions/"
        );
        assert_eq!(
            req.headers,
            vec![
                ("X-Client-Transaction-ID".to_string(), "4f0b2f8e-0000-4000-8000-000000000001".to_string()),
                ("Authorization".to_string(), "Basic dXNlcl9pZDp1c2VyX3Bhc3N3b3Jk".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["systemsTraceAuditNumber"], 123456);
        assert_eq!(body["amount"], 110.0);
        assert!(body.get("surcharge").is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = VisaDirectClient::new("http://localhost:3000/", &Credentials::new("a", "b"));
        let req = client.build_pull_funds_transaction(&request(), "id").unwrap();
        assert_eq!(req.url, "http://localhost:3000/visadirect/fundstransfer/v1/pullfundstransactions/");
    }

    #[test]
    fn parse_pull_funds_transaction_success() {
        let parsed = client()
            .parse_pull_funds_transaction(response(
                200,
                r#"{"statusIdentifier":"","transactionIdentifier":123456789012345,"actionCode":"00","responseCode":"0"}"#,
            ))
            .unwrap();
        assert_eq!(parsed.transaction_identifier, Some(123456789012345));
        assert_eq!(parsed.action_code, "00");
        assert_eq!(parsed.response_code, "0");
        assert!(parsed.approval_code.is_none());
        assert!(parsed.error_message.is_none());
    }

    #[test]
    fn parse_non_200_surfaces_status_and_body() {
        let err = client()
            .parse_pull_funds_transaction(response(400, r#"{"message":"Invalid input"}"#))
            .unwrap_err();
        match err {
            ApiError::HttpError { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, r#"{"message":"Invalid input"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_other_success_codes_are_still_errors() {
        let err = client().parse_pull_funds_transaction(response(202, "{}")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 202, .. }));
    }

    #[test]
    fn parse_bad_json() {
        let err = client().parse_pull_funds_transaction(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn transaction_ids_are_unique_uuids() {
        let a = new_transaction_id();
        let b = new_transaction_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn debug_does_not_leak_authorization() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("dXNlcl9pZDp1c2VyX3Bhc3N3b3Jk"));
    }
}
