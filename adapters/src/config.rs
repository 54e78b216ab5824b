//! Partner configuration: credentials, endpoint paths and injected sender identity

use crate::{types::Address, types::Sender, Error, Rail, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

/// Placeholder for the rail in the status path template
pub const METHOD_PLACEHOLDER: &str = "{method}";

/// Placeholder for the reference id in the status path template
pub const REFERENCE_ID_PLACEHOLDER: &str = "{referenceId}";

/// Bytes escaped when a value fills a single path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Partner API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct PartnerConfig {
    /// Base URL, e.g. `https://api-uat.unionbankph.com`
    pub base_url: String,
    /// Per-operation path templates
    #[serde(default)]
    pub paths: PartnerPaths,
    /// Client credentials
    pub credentials: PartnerCredentials,
    /// Whole-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connect timeout
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Reuse access tokens until shortly before they expire
    #[serde(default)]
    pub cache_tokens: bool,
}

fn default_timeout_secs() -> u64 {
    crate::DEFAULT_REQUEST_TIMEOUT_SECONDS
}

fn default_connect_timeout_secs() -> u64 {
    crate::DEFAULT_CONNECT_TIMEOUT_SECONDS
}

/// Endpoint paths, appended to the base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerPaths {
    /// OAuth2 password grant
    pub auth: String,
    /// Instapay single transfer
    pub instapay_transfer: String,
    /// Pesonet single transfer
    pub pesonet_transfer: String,
    /// Instapay receiving banks
    pub instapay_banks: String,
    /// Pesonet receiving banks
    pub pesonet_banks: String,
    /// Status lookup, with `{method}` and `{referenceId}` placeholders
    pub transfer_status: String,
}

impl Default for PartnerPaths {
    fn default() -> Self {
        Self {
            auth: "/partners/v1/oauth2/token".to_string(),
            instapay_transfer: "/partners/v3/instapay/transfers/single".to_string(),
            pesonet_transfer: "/partners/v3/pesonet/transfers/single".to_string(),
            instapay_banks: "/partners/v3/instapay/banks".to_string(),
            pesonet_banks: "/partners/v3/pesonet/banks".to_string(),
            transfer_status: "/partners/v3/{method}/transfers/single/{referenceId}".to_string(),
        }
    }
}

impl PartnerPaths {
    /// Transfer path for a rail
    pub fn transfer(&self, rail: Rail) -> &str {
        match rail {
            Rail::Instapay => &self.instapay_transfer,
            Rail::Pesonet => &self.pesonet_transfer,
        }
    }

    /// Bank list path for a rail
    pub fn banks(&self, rail: Rail) -> &str {
        match rail {
            Rail::Instapay => &self.instapay_banks,
            Rail::Pesonet => &self.pesonet_banks,
        }
    }

    /// Status path with both placeholders filled in
    ///
    /// The reference id is percent-encoded as one path segment, so it can
    /// never add segments, a query or a fragment. Dot segments are refused.
    pub fn status(&self, rail: Rail, reference_id: &str) -> Result<String> {
        if matches!(reference_id, "" | "." | "..") {
            return Err(Error::InvalidRequest(format!(
                "reference id {:?} is not a valid path segment",
                reference_id
            )));
        }
        let segment = utf8_percent_encode(reference_id, PATH_SEGMENT).to_string();
        Ok(render_status_path(&self.transfer_status, rail.as_str(), &segment))
    }
}

/// Fill `{method}` and `{referenceId}` in a single left-to-right pass.
///
/// Substituted values are never scanned again, so a reference id that
/// itself contains `{method}` is inserted literally.
pub fn render_status_path(template: &str, method: &str, reference_id: &str) -> String {
    let mut out = String::with_capacity(template.len() + method.len() + reference_id.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        if let Some(after) = tail.strip_prefix(METHOD_PLACEHOLDER) {
            out.push_str(method);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(REFERENCE_ID_PLACEHOLDER) {
            out.push_str(reference_id);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Partner credentials, sent as headers and in the auth form
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct PartnerCredentials {
    /// `x-ibm-client-id` / `x-client-id` / `client_id`
    pub client_id: String,
    /// `x-ibm-client-secret` / `x-client-secret`
    pub client_secret: String,
    /// `x-partner-id`
    pub partner_id: String,
    /// Password grant username
    pub username: String,
    /// Password grant password
    pub password: String,
    /// Requested scope
    pub scope: String,
}

impl std::fmt::Debug for PartnerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("partner_id", &self.partner_id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

impl std::fmt::Debug for PartnerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerConfig")
            .field("base_url", &self.base_url)
            .field("paths", &self.paths)
            .field("credentials", &self.credentials)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("cache_tokens", &self.cache_tokens)
            .finish()
    }
}

impl PartnerConfig {
    /// Config with default paths and timeouts
    pub fn new(base_url: impl Into<String>, credentials: PartnerCredentials) -> Self {
        Self {
            base_url: base_url.into(),
            paths: PartnerPaths::default(),
            credentials,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            cache_tokens: false,
        }
    }

    /// Reject configurations the client cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("partner base_url is required".to_string()));
        }

        let paths = [
            ("auth", &self.paths.auth),
            ("instapay_transfer", &self.paths.instapay_transfer),
            ("pesonet_transfer", &self.paths.pesonet_transfer),
            ("instapay_banks", &self.paths.instapay_banks),
            ("pesonet_banks", &self.paths.pesonet_banks),
            ("transfer_status", &self.paths.transfer_status),
        ];
        for (name, value) in paths {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("partner path {} is required", name)));
            }
        }

        for placeholder in [METHOD_PLACEHOLDER, REFERENCE_ID_PLACEHOLDER] {
            if !self.paths.transfer_status.contains(placeholder) {
                return Err(Error::Config(format!(
                    "transfer_status path must contain {}",
                    placeholder
                )));
            }
        }

        let creds = &self.credentials;
        let fields = [
            ("client_id", &creds.client_id),
            ("client_secret", &creds.client_secret),
            ("partner_id", &creds.partner_id),
            ("username", &creds.username),
            ("password", &creds.password),
            ("scope", &creds.scope),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                return Err(Error::Config(format!("partner credential {} is required", name)));
            }
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".to_string()));
        }

        Ok(())
    }
}

/// Operating entity identity placed in every transfer's `sender` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderProfile {
    /// Legal name
    pub name: String,
    /// Registered address
    #[serde(default)]
    pub address: Address,
}

impl SenderProfile {
    /// Wire representation
    pub fn to_sender(&self) -> Sender {
        Sender {
            name: self.name.clone(),
            address: self.address.clone(),
        }
    }
}

/// Purpose and instructions forced onto every remittance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemittanceDefaults {
    /// Purpose code
    pub purpose: String,
    /// Instructions text
    pub instructions: String,
}

impl Default for RemittanceDefaults {
    fn default() -> Self {
        Self {
            purpose: "1001".to_string(),
            instructions: "Fund Transfer via Instapay".to_string(),
        }
    }
}
