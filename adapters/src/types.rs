//! Shared types: rails, caller-facing requests and partner wire shapes

use crate::Error;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Interbank rail used for a disbursement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rail {
    /// Real-time low-value transfers
    Instapay,
    /// Batch high-value transfers
    Pesonet,
}

impl Rail {
    /// Wire name, as used in routes and the status path template
    pub fn as_str(&self) -> &'static str {
        match self {
            Rail::Instapay => "instapay",
            Rail::Pesonet => "pesonet",
        }
    }
}

impl std::fmt::Display for Rail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rail {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instapay" => Ok(Rail::Instapay),
            "pesonet" => Ok(Rail::Pesonet),
            other => Err(Error::UnsupportedRail(other.to_string())),
        }
    }
}

/// Postal address (six free-text fields)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Address line 1
    pub line1: String,
    /// Address line 2
    pub line2: String,
    /// City
    pub city: String,
    /// Province
    pub province: String,
    /// Postal code
    #[serde(alias = "zip_code", alias = "zipcode")]
    pub zip_code: String,
    /// Country
    pub country: String,
}

/// Caller-facing disbursement request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DisbursementRequest {
    /// Who receives the funds
    #[validate(nested)]
    pub receiver: Receiver,
    /// What is sent
    #[serde(rename = "transfer_details")]
    #[validate(nested)]
    pub details: TransferDetails,
}

/// Receiving account holder
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Receiver {
    /// Account number at the receiving bank
    #[validate(length(min = 1, message = "account number is required"))]
    pub account_number: String,
    /// Account holder name
    #[validate(length(min = 1, message = "receiver name is required"))]
    pub name: String,
    /// Postal address
    #[serde(default)]
    pub address: Address,
}

/// Transfer details supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferDetails {
    /// Amount as a decimal string, e.g. "100.00"
    #[validate(custom(function = "validate_amount"))]
    pub amount: String,
    /// ISO 4217 currency code
    #[validate(custom(function = "validate_currency"))]
    pub currency: String,
    /// Receiving bank code
    #[validate(length(min = 1, message = "receiving bank is required"))]
    pub receiving_bank: String,
    /// Caller purpose text (replaced by the configured default on the wire)
    #[serde(default)]
    pub purpose: String,
    /// Caller instructions (replaced by the configured default on the wire)
    #[serde(default)]
    pub instructions: String,
}

lazy_static! {
    /// Plain digits with up to two fraction digits, exactly as the partner expects
    static ref AMOUNT_FORMAT: Regex = Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").unwrap();
}

fn validate_amount(amount: &str) -> Result<(), ValidationError> {
    // Checked on the raw string since it is forwarded unchanged
    if !AMOUNT_FORMAT.is_match(amount) {
        return Err(ValidationError::new("amount_format"));
    }

    let value =
        Decimal::from_str(amount).map_err(|_| ValidationError::new("amount_not_decimal"))?;
    if value <= Decimal::ZERO {
        return Err(ValidationError::new("amount_not_positive"));
    }
    Ok(())
}

fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("currency_not_iso4217"))
    }
}

/// Operating entity sending the funds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Legal name
    pub name: String,
    /// Registered address
    pub address: Address,
}

/// Beneficiary block of a partner transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    /// Account number
    pub account_number: String,
    /// Account holder name
    pub name: String,
    /// Postal address
    pub address: Address,
}

impl From<&Receiver> for Beneficiary {
    fn from(receiver: &Receiver) -> Self {
        Self {
            account_number: receiver.account_number.clone(),
            name: receiver.name.clone(),
            address: Address {
                line1: receiver.address.line1.clone(),
                line2: receiver.address.line2.clone(),
                city: receiver.address.city.clone(),
                province: receiver.address.province.clone(),
                zip_code: receiver.address.zip_code.clone(),
                country: receiver.address.country.clone(),
            },
        }
    }
}

/// Remittance block of a partner transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remittance {
    /// Amount as a decimal string
    pub amount: String,
    /// Currency code
    pub currency: String,
    /// Receiving bank code
    pub receiving_bank: String,
    /// Purpose code
    pub purpose: String,
    /// Free-text instructions
    pub instructions: String,
}

/// Transfer request in the partner's shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerTransferRequest {
    /// 8-digit correlation id
    pub sender_ref_id: String,
    /// Local timestamp, millisecond precision, at most 23 chars
    pub tran_request_date: String,
    /// Operating entity
    pub sender: Sender,
    /// Receiving account holder
    pub beneficiary: Beneficiary,
    /// Amount and routing
    pub remittance: Remittance,
}

/// Instapay transfer acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstapayReceipt {
    /// Partner transaction id
    pub tran_id: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Partner state text
    pub state: String,
    /// Echoed sender reference id
    #[serde(default)]
    pub sender_ref_id: String,
}

/// Pesonet transfer acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PesonetReceipt {
    /// Partner transaction id
    pub ubp_tran_id: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Partner state text
    pub state: String,
    /// Echoed sender reference id
    #[serde(default)]
    pub sender_ref_id: String,
}

/// Transfer acknowledgement, one variant per rail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TransferReceipt {
    /// Instapay (`tranId`)
    Instapay(InstapayReceipt),
    /// Pesonet (`ubpTranId`)
    Pesonet(PesonetReceipt),
}

impl TransferReceipt {
    /// Rail the receipt came from
    pub fn rail(&self) -> Rail {
        match self {
            TransferReceipt::Instapay(_) => Rail::Instapay,
            TransferReceipt::Pesonet(_) => Rail::Pesonet,
        }
    }

    /// Partner transaction id, whichever key the rail uses
    pub fn transaction_id(&self) -> &str {
        match self {
            TransferReceipt::Instapay(r) => &r.tran_id,
            TransferReceipt::Pesonet(r) => &r.ubp_tran_id,
        }
    }

    /// Partner state text
    pub fn state(&self) -> &str {
        match self {
            TransferReceipt::Instapay(r) => &r.state,
            TransferReceipt::Pesonet(r) => &r.state,
        }
    }

    /// Echoed sender reference id
    pub fn sender_ref_id(&self) -> &str {
        match self {
            TransferReceipt::Instapay(r) => &r.sender_ref_id,
            TransferReceipt::Pesonet(r) => &r.sender_ref_id,
        }
    }
}

/// Paged record list returned by the partner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Records<T> {
    /// Entries
    pub records: Vec<T>,
    /// Total entries on the partner side
    #[serde(default)]
    pub total_records: u32,
}

/// Receiving bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    /// Bank code used as `receivingBank`
    pub code: String,
    /// Display name
    pub bank: String,
}

/// Instapay status entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstapayTransaction {
    /// Partner transaction id
    pub ubp_tran_id: String,
    /// Transaction type
    #[serde(rename = "type", default)]
    pub tran_type: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Partner state text
    pub state: String,
    /// Sender reference id
    #[serde(default)]
    pub sender_ref_id: String,
}

/// Pesonet status entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PesonetTransaction {
    /// Partner transaction id
    pub ubp_tran_id: String,
    /// Transaction type
    #[serde(rename = "type", default)]
    pub tran_type: String,
    /// Amount as a decimal string
    #[serde(default)]
    pub amount: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp
    #[serde(default)]
    pub updated_at: String,
    /// Partner state text
    pub state: String,
    /// Sender reference id
    #[serde(default)]
    pub sender_ref_id: String,
}

/// Transfer status, one variant per rail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TransferStatusReport {
    /// Instapay records
    Instapay(Records<InstapayTransaction>),
    /// Pesonet records
    Pesonet(Records<PesonetTransaction>),
}

impl TransferStatusReport {
    /// Total records reported by the partner
    pub fn total_records(&self) -> u32 {
        match self {
            TransferStatusReport::Instapay(r) => r.total_records,
            TransferStatusReport::Pesonet(r) => r.total_records,
        }
    }
}
