// Shared fixtures for partner adapter integration tests

#![allow(dead_code)]

use disbursement_adapters::{
    Address, DisbursementRequest, PartnerConfig, PartnerCredentials, PartnerPaths, Receiver,
    SenderProfile, TransferDetails,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "test-token";

pub fn credentials() -> PartnerCredentials {
    PartnerCredentials {
        client_id: "client-id".into(),
        client_secret: "client-secret".into(),
        partner_id: "partner-id".into(),
        username: "partner-user".into(),
        password: "partner-pass".into(),
        scope: "instapay".into(),
    }
}

pub fn partner_config(base_url: &str) -> PartnerConfig {
    PartnerConfig::new(base_url, credentials())
}

pub fn paths() -> PartnerPaths {
    PartnerPaths::default()
}

pub fn sender() -> SenderProfile {
    SenderProfile {
        name: "Palngipang Corp.".into(),
        address: Address {
            line1: "Palngipang Tower".into(),
            line2: "Fort Bonifacio".into(),
            city: "Taguig".into(),
            province: "Metro Manila".into(),
            zip_code: "2634".into(),
            country: "Philippines".into(),
        },
    }
}

pub fn disbursement_request() -> DisbursementRequest {
    DisbursementRequest {
        receiver: Receiver {
            account_number: "100076532781".into(),
            name: "Juan Dela Cruz".into(),
            address: Address {
                line1: "Unit 11C15 Fort Victoria".into(),
                line2: "23rd street Fort Bonifacio".into(),
                city: "Taguig".into(),
                province: "Metro Manila".into(),
                zip_code: "1630".into(),
                country: "Philippines".into(),
            },
        },
        details: TransferDetails {
            amount: "100.00".into(),
            currency: "PHP".into(),
            receiving_bank: "161312".into(),
            purpose: "Fund Transfer".into(),
            instructions: "Test Instruction".into(),
        },
    }
}

pub fn token_body() -> serde_json::Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "bearer",
        "expires_in": 3600,
        "scope": "instapay",
        "refresh_token": "refresh-token",
        "metadata": "a:b"
    })
}

/// Mount the auth endpoint, expecting exactly `times` calls
pub async fn mount_auth(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path(paths().auth))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(times)
        .mount(server)
        .await;
}
