//! # Disbursement Adapters
//!
//! Partner bank connectivity for single fund disbursements over the
//! Instapay and Pesonet rails:
//! - OAuth2 password-grant authentication with optional token cache
//! - Transfer submission with fresh 8-digit sender reference ids
//! - Receiving bank lists and transfer status lookups
//! - Uniform error surface for partner rejections, transport and decode failures
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │   HTTP layer (disbursement-gateway)          │
//! └──────────────────────┬───────────────────────┘
//!                        │
//! ┌──────────────────────▼───────────────────────┐
//! │   DisbursementService                        │
//! │   (rail parsing, request mapping, ref ids)   │
//! └──────────────────────┬───────────────────────┘
//!                        │ PartnerConnector
//! ┌──────────────────────▼───────────────────────┐
//! │   PartnerClient                              │
//! │   (auth, headers, send, decode, token cache) │
//! └──────────────────────┬───────────────────────┘
//!                        │ HTTPS
//!                  partner bank API
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod metrics;
pub mod reference;
pub mod service;
pub mod token;
pub mod types;

pub use client::PartnerClient;
pub use config::{PartnerConfig, PartnerCredentials, PartnerPaths, RemittanceDefaults, SenderProfile};
pub use connector::PartnerConnector;
pub use error::{Error, Result};
pub use service::{cancellable, DisbursementService};
pub use token::AccessToken;
pub use types::*;

/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Default connect timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 10;
