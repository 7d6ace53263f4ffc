//! Send the sample pull-funds request to the environment named by `VISA_*`
//! variables and print the decoded response.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use visa_direct_core::{
    local_transaction_date_time, new_transaction_id, ApiError, CardAcceptor, CardAcceptorAddress, ClientConfig,
    FundsTransferApi, PullFundsTransactionRequest, PullFundsTransactionResponse,
};

fn sample_request() -> PullFundsTransactionRequest {
    PullFundsTransactionRequest {
        systems_trace_audit_number: 123456,
        retrieval_reference_number: "407509300259".to_string(),
        local_transaction_date_time: local_transaction_date_time(chrono::Local::now().naive_local()),
        acquiring_bin: 409999,
        acquirer_country_code: 101,
        sender_primary_account_number: "4957030100009952".to_string(),
        sender_card_expiry_date: "2020-03".to_string(),
        sender_currency_code: "USD".to_string(),
        amount: Some(110.0),
        surcharge: Some(2.0),
        cavv: "0000010926000071934977253000000000000000".to_string(),
        foreign_exchange_fee_transaction: Some(10.0),
        business_application_id: "AA".to_string(),
        merchant_category_code: Some(6012),
        card_acceptor: CardAcceptor {
            name: "Saranya".to_string(),
            terminal_id: "365539".to_string(),
            id_code: "VMT200911026070".to_string(),
            address: CardAcceptorAddress {
                state: Some("CA".to_string()),
                county: Some("081".to_string()),
                country: "USA".to_string(),
                zip_code: Some("94404".to_string()),
            },
        },
        fee_program_indicator: Some("123".to_string()),
        ..Default::default()
    }
}

fn run() -> Result<PullFundsTransactionResponse, ApiError> {
    let config = ClientConfig::from_env()?;
    let api = FundsTransferApi::connect(&config)?;
    let transaction_id = new_transaction_id();
    tracing::info!(%transaction_id, base_url = api.client().base_url(), "submitting pull funds transaction");
    api.pull_funds_transactions_post(&sample_request(), &transaction_id)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(response) => {
            tracing::info!(approved = response.is_approved(), "pull funds transaction finished");
            println!("{response:#?}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "pull funds transaction failed");
            ExitCode::FAILURE
        }
    }
}
