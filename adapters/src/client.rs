//! Partner bank REST client
//!
//! Every call carries the five partner-identifying headers. Only 200 and 201
//! count as success; any other status surfaces as [`Error::PartnerRejected`]
//! with the body preserved. Successful bodies are decoded straight into the
//! typed shape the caller asks for.

use crate::{
    config::PartnerConfig, connector::PartnerConnector, metrics, token::AccessToken,
    token::TokenCache, types::*, Error, Result,
};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Request body of an [`ApiCall`]
#[derive(Debug, Clone)]
pub enum CallBody {
    /// No body
    Empty,
    /// `application/x-www-form-urlencoded`
    Form(Vec<(&'static str, String)>),
    /// `application/json`
    Json(serde_json::Value),
}

/// One outbound partner request
#[derive(Debug, Clone)]
pub struct ApiCall {
    /// Operation label for logs and metrics
    pub operation: &'static str,
    /// HTTP method
    pub method: Method,
    /// Path appended to the base URL
    pub path: String,
    /// Body
    pub body: CallBody,
    /// Headers on top of the partner-identifying ones
    pub headers: Vec<(&'static str, String)>,
}

impl ApiCall {
    /// GET with JSON content negotiation headers
    pub fn get(operation: &'static str, path: impl Into<String>) -> Self {
        Self {
            operation,
            method: Method::GET,
            path: path.into(),
            body: CallBody::Empty,
            headers: Vec::new(),
        }
        .json_headers()
    }

    /// POST without a body yet
    pub fn post(operation: &'static str, path: impl Into<String>) -> Self {
        Self {
            operation,
            method: Method::POST,
            path: path.into(),
            body: CallBody::Empty,
            headers: Vec::new(),
        }
    }

    /// Add a header
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Form-encoded body
    pub fn form(self, fields: Vec<(&'static str, String)>) -> Self {
        let mut call = self.header("Content-Type", FORM_CONTENT_TYPE);
        call.body = CallBody::Form(fields);
        call
    }

    /// JSON body
    pub fn json(self, body: serde_json::Value) -> Self {
        let mut call = self.json_headers();
        call.body = CallBody::Json(body);
        call
    }

    /// `Authorization: Bearer <token>`
    pub fn bearer(self, token: &AccessToken) -> Self {
        self.header("Authorization", token.bearer())
    }

    fn json_headers(self) -> Self {
        self.header_if_missing("Content-Type", JSON_CONTENT_TYPE)
            .header_if_missing("Accept", JSON_CONTENT_TYPE)
    }

    fn header_if_missing(self, name: &'static str, value: &str) -> Self {
        if self
            .headers
            .iter()
            .any(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            self
        } else {
            self.header(name, value)
        }
    }
}

/// Client for the partner bank API
pub struct PartnerClient {
    config: PartnerConfig,
    http: Client,
    tokens: Option<TokenCache>,
}

impl PartnerClient {
    /// Build a client with bounded request and connect timeouts
    pub fn new(config: PartnerConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let tokens = config.cache_tokens.then(TokenCache::new);

        Ok(Self {
            config,
            http,
            tokens,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &PartnerConfig {
        &self.config
    }

    /// Password-grant authentication. Always calls the partner; use
    /// [`PartnerConnector::access_token`] to go through the cache.
    pub async fn authenticate(&self) -> Result<AccessToken> {
        let creds = &self.config.credentials;
        let call = ApiCall::post("authenticate", self.config.paths.auth.clone()).form(vec![
            ("grant_type", "password".to_string()),
            ("client_id", creds.client_id.clone()),
            ("username", creds.username.clone()),
            ("password", creds.password.clone()),
            ("scope", creds.scope.clone()),
        ]);

        let token: AccessToken = self.send(call).await.map_err(|e| {
            warn!("Partner authentication failed: {}", e);
            Error::AuthenticationFailed(Box::new(e))
        })?;

        if token.access_token.is_empty() {
            return Err(Error::AuthenticationFailed(Box::new(Error::Decode {
                reason: "access_token is empty".to_string(),
                body: String::new(),
            })));
        }

        debug!(
            "Obtained partner token (type {}, expires in {}s)",
            token.token_type, token.expires_in
        );
        Ok(token)
    }

    /// Execute a call and decode a 200/201 body into `T`
    pub async fn send<T: DeserializeOwned>(&self, call: ApiCall) -> Result<T> {
        let url = self.endpoint(&call.path)?;
        let started = Instant::now();

        let mut builder = self.http.request(call.method.clone(), url.clone());
        for (name, value) in &call.headers {
            builder = builder.header(*name, value);
        }
        builder = self.partner_headers(builder);
        builder = match &call.body {
            CallBody::Empty => builder,
            CallBody::Form(fields) => builder.form(fields),
            CallBody::Json(value) => builder.body(value.to_string()),
        };

        let response = builder.send().await.map_err(|e| {
            metrics::observe(call.operation, "transport_error", started.elapsed().as_secs_f64());
            self.transport_error(&call, e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            metrics::observe(call.operation, "transport_error", started.elapsed().as_secs_f64());
            self.transport_error(&call, e)
        })?;
        let elapsed = started.elapsed();

        info!(
            "Partner {} {} {} -> {} in {}ms",
            call.operation,
            call.method,
            url.path(),
            status.as_u16(),
            elapsed.as_millis()
        );

        if !matches!(status, StatusCode::OK | StatusCode::CREATED) {
            warn!(
                operation = call.operation,
                http_status = status.as_u16(),
                response = %truncate(&body, 200),
                "Partner rejected request"
            );
            metrics::observe(call.operation, "rejected", elapsed.as_secs_f64());
            return Err(Error::PartnerRejected {
                status_code: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<T>(&body) {
            Ok(decoded) => {
                metrics::observe(call.operation, "success", elapsed.as_secs_f64());
                Ok(decoded)
            }
            Err(e) => {
                error!(
                    operation = call.operation,
                    error = %e,
                    response = %truncate(&body, 200),
                    "Invalid JSON from partner"
                );
                metrics::observe(call.operation, "decode_error", elapsed.as_secs_f64());
                Err(Error::Decode {
                    reason: e.to_string(),
                    body,
                })
            }
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| Error::Config(format!("invalid partner URL {}: {}", raw, e)))
    }

    fn partner_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let creds = &self.config.credentials;
        builder
            .header("x-ibm-client-id", &creds.client_id)
            .header("x-ibm-client-secret", &creds.client_secret)
            .header("x-partner-id", &creds.partner_id)
            .header("x-client-id", &creds.client_id)
            .header("x-client-secret", &creds.client_secret)
    }

    fn transport_error(&self, call: &ApiCall, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            error!("Partner {} timed out after {}s", call.operation, self.config.timeout_secs);
            Error::Timeout {
                seconds: self.config.timeout_secs,
                operation: format!("{} {}", call.method, call.path),
            }
        } else {
            error!("Partner {} transport error: {}", call.operation, e);
            Error::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl PartnerConnector for PartnerClient {
    async fn access_token(&self) -> Result<AccessToken> {
        match &self.tokens {
            Some(cache) => cache.get_or_refresh(|| self.authenticate()).await,
            None => self.authenticate().await,
        }
    }

    async fn submit_transfer(
        &self,
        rail: Rail,
        token: &AccessToken,
        request: &PartnerTransferRequest,
    ) -> Result<TransferReceipt> {
        let body = serde_json::to_value(request)
            .map_err(|e| Error::InvalidRequest(format!("unserializable transfer: {}", e)))?;
        let call = ApiCall::post("transfer", self.config.paths.transfer(rail))
            .json(body)
            .bearer(token);

        info!(
            "Submitting {} transfer {} to bank {}",
            rail, request.sender_ref_id, request.remittance.receiving_bank
        );

        let result = match rail {
            Rail::Instapay => self
                .send::<InstapayReceipt>(call)
                .await
                .map(TransferReceipt::Instapay),
            Rail::Pesonet => self
                .send::<PesonetReceipt>(call)
                .await
                .map(TransferReceipt::Pesonet),
        };

        if let (Err(Error::PartnerRejected { status_code: 401, .. }), Some(cache)) =
            (&result, &self.tokens)
        {
            cache.invalidate().await;
        }
        result
    }

    async fn list_banks(&self, rail: Rail) -> Result<Records<Bank>> {
        self.send(ApiCall::get("list_banks", self.config.paths.banks(rail)))
            .await
    }

    async fn transfer_status(&self, rail: Rail, reference_id: &str) -> Result<TransferStatusReport> {
        let call = ApiCall::get("transfer_status", self.config.paths.status(rail, reference_id)?);
        match rail {
            Rail::Instapay => self
                .send::<Records<InstapayTransaction>>(call)
                .await
                .map(TransferStatusReport::Instapay),
            Rail::Pesonet => self
                .send::<Records<PesonetTransaction>>(call)
                .await
                .map(TransferStatusReport::Pesonet),
        }
    }

    fn name(&self) -> &str {
        "unionbank-partner"
    }
}

fn truncate(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
