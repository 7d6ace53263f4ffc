//! Wire DTOs for the Visa Direct pull-funds operation.
//!
//! # Design
//! Field names and presence mirror the external API exactly. Fields the API
//! marks optional or conditional are `Option`s and disappear from the JSON when
//! unset; everything else is always emitted, even when empty. No value is
//! validated locally: the remote service rejects malformed input.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Wire format of `localTransactionDateTime`.
pub const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Format a timestamp as `YYYY-MM-DDThh:mm:ss` for `localTransactionDateTime`.
pub fn local_transaction_date_time(at: NaiveDateTime) -> String {
    at.format(LOCAL_DATE_TIME_FORMAT).to_string()
}

/// Instruction to debit (pull) funds from a sender's card account, submitted
/// as an Account Funding Transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullFundsTransactionRequest {
    /// STAN, six digits.
    pub systems_trace_audit_number: u32,
    /// `ydddhhnnnnnn`, numeric, twelve characters.
    pub retrieval_reference_number: String,
    pub local_transaction_date_time: String,
    pub acquiring_bin: u64,
    pub acquirer_country_code: u16,
    /// PAN of the sender, 13 to 19 digits.
    pub sender_primary_account_number: String,
    /// `YYYY-MM`.
    pub sender_card_expiry_date: String,
    /// ISO 4217 alpha code.
    pub sender_currency_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<f64>,
    /// CAVV, forty characters.
    pub cavv: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_exchange_fee_transaction: Option<f64>,
    pub business_application_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_category_code: Option<u16>,
    pub card_acceptor: CardAcceptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnetic_stripe_data: Option<MagneticStripeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_of_service_data: Option<PointOfServiceData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_of_service_capability: Option<PointOfServiceCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_data: Option<PinData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_program_indicator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAcceptor {
    pub name: String,
    pub terminal_id: String,
    pub id_code: String,
    pub address: CardAcceptorAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAcceptorAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagneticStripeData {
    #[serde(rename = "track1Data", default, skip_serializing_if = "Option::is_none")]
    pub track1_data: Option<String>,
    /// Hex binary sent as a string.
    #[serde(rename = "track2Data", default, skip_serializing_if = "Option::is_none")]
    pub track2_data: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfServiceData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_entry_mode: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_condition_code: Option<u8>,
    #[serde(rename = "motoECIIndicator", default, skip_serializing_if = "Option::is_none")]
    pub moto_eci_indicator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfServiceCapability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_terminal_type: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_terminal_entry_capability: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinData {
    /// Sixteen hex characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_data_block: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_related_control_info: Option<SecurityRelatedControlInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRelatedControlInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_block_format_code: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_key_index: Option<u8>,
}

/// Reply to a pull-funds request. Every field may be absent on the wire:
/// `statusIdentifier` only appears when the call timed out upstream and
/// `transactionIdentifier` only when it did not.
///
/// Retain the whole response; a later reversal needs several of its values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullFundsTransactionResponse {
    #[serde(default)]
    pub status_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_identifier: Option<u64>,
    #[serde(default)]
    pub action_code: String,
    #[serde(rename = "ApprovalCode", default, skip_serializing_if = "Option::is_none")]
    pub approval_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cavv_result_code: Option<String>,
    #[serde(default)]
    pub response_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_program_indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PullFundsTransactionResponse {
    /// Action code `00` means the issuer approved the debit.
    pub fn is_approved(&self) -> bool {
        self.action_code == "00"
    }
}
