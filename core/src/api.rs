//! Pull-funds round-trip: serialize, send, decode.

use crate::client::VisaDirectClient;
use crate::config::{ClientConfig, Credentials};
use crate::error::ApiError;
use crate::transport::{MutualTlsTransport, Transport};
use crate::types::{PullFundsTransactionRequest, PullFundsTransactionResponse};

/// Response header Visa uses to correlate a call in its own logs.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

#[derive(Debug)]
pub struct FundsTransferApi<T = MutualTlsTransport> {
    client: VisaDirectClient,
    transport: T,
}

impl FundsTransferApi<MutualTlsTransport> {
    /// Load the TLS material named by `config` and prepare a client for its
    /// environment. Fails without touching the network if any file is bad.
    pub fn connect(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = MutualTlsTransport::new(config)?;
        Ok(Self {
            client: VisaDirectClient::new(config.environment.base_url(), &config.credentials),
            transport,
        })
    }
}

impl<T: Transport> FundsTransferApi<T> {
    pub fn with_transport(base_url: &str, credentials: &Credentials, transport: T) -> Self {
        Self {
            client: VisaDirectClient::new(base_url, credentials),
            transport,
        }
    }

    pub fn client(&self) -> &VisaDirectClient {
        &self.client
    }

    /// Debit (pull) funds from the sender's account by submitting an AFT.
    ///
    /// `transaction_id` is sent as `X-Client-Transaction-ID`; see
    /// [`crate::client::new_transaction_id`].
    pub fn pull_funds_transactions_post(
        &self,
        request: &PullFundsTransactionRequest,
        transaction_id: &str,
    ) -> Result<PullFundsTransactionResponse, ApiError> {
        let http_request = self.client.build_pull_funds_transaction(request, transaction_id)?;
        let http_response = self.transport.execute(&http_request)?;
        let status = http_response.status;
        let correlation_id = http_response.header(CORRELATION_ID_HEADER).map(str::to_string);
        let response = self.client.parse_pull_funds_transaction(http_response)?;
        tracing::debug!(
            transaction_id,
            status,
            correlation_id,
            action_code = %response.action_code,
            "pull funds transaction completed"
        );
        Ok(response)
    }
}
