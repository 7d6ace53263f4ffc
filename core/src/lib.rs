//! Client for the Visa Direct pull-funds (AFT) endpoint over mutual TLS.
//!
//! # Overview
//! `VisaDirectClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network. `MutualTlsTransport` executes them
//! with a client certificate and a pinned CA bundle. `FundsTransferApi`
//! composes the two into a single `pull_funds_transactions_post` call.
//!
//! # Design
//! - Credentials, certificate paths and the target environment live in an
//!   explicit `ClientConfig`; nothing is process-global.
//! - TLS material is loaded when the transport is built, so bad files fail
//!   before any request goes out.
//! - Server certificates are always verified against the configured CA
//!   bundle unless the test-only override is switched on.
//! - DTOs mirror the external JSON schema field for field; optional and
//!   conditional fields are `Option`s and skipped when unset.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use api::{FundsTransferApi, CORRELATION_ID_HEADER};
pub use client::{new_transaction_id, VisaDirectClient};
pub use config::{CertificatePaths, ClientConfig, Credentials, Environment};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{MutualTlsTransport, Transport};
pub use types::{
    local_transaction_date_time, CardAcceptor, CardAcceptorAddress, MagneticStripeData, PinData,
    PointOfServiceCapability, PointOfServiceData, PullFundsTransactionRequest, PullFundsTransactionResponse,
    SecurityRelatedControlInfo,
};
