//! Disbursement service (orchestrates partner calls per public operation)

use crate::{
    config::{RemittanceDefaults, SenderProfile},
    connector::PartnerConnector,
    reference::ReferenceIdGenerator,
    types::*,
    Error, Result,
};
use chrono::{DateTime, Local};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use validator::Validate;

/// Maximum length of `tranRequestDate`
pub const REQUEST_DATE_MAX_LEN: usize = 23;

/// Disbursement service
pub struct DisbursementService {
    partner: Arc<dyn PartnerConnector>,
    sender: SenderProfile,
    remittance: RemittanceDefaults,
    references: ReferenceIdGenerator,
}

impl DisbursementService {
    /// Create new service
    pub fn new(
        partner: Arc<dyn PartnerConnector>,
        sender: SenderProfile,
        remittance: RemittanceDefaults,
    ) -> Self {
        Self {
            partner,
            sender,
            remittance,
            references: ReferenceIdGenerator::new(),
        }
    }

    /// Authenticate, then submit a single transfer on `rail`
    pub async fn transfer_funds(
        &self,
        rail: &str,
        request: &DisbursementRequest,
    ) -> Result<TransferReceipt> {
        let rail: Rail = rail.parse()?;
        request.validate()?;

        let token = self.partner.access_token().await?;
        let partner_request = self.build_partner_request(request);

        let receipt = self
            .partner
            .submit_transfer(rail, &token, &partner_request)
            .await
            .map_err(|e| {
                warn!(
                    "{} transfer {} via {} failed: {}",
                    rail,
                    partner_request.sender_ref_id,
                    self.partner.name(),
                    e
                );
                e
            })?;

        info!(
            "{} transfer {} accepted: {} ({})",
            rail,
            partner_request.sender_ref_id,
            receipt.transaction_id(),
            receipt.state()
        );
        Ok(receipt)
    }

    /// Receiving banks for `rail`. No bearer token is needed.
    pub async fn list_banks(&self, rail: &str) -> Result<Records<Bank>> {
        let rail: Rail = rail.parse()?;
        self.partner.list_banks(rail).await
    }

    /// Transfer status by sender reference id
    pub async fn get_status(&self, rail: &str, reference_id: &str) -> Result<TransferStatusReport> {
        let rail: Rail = rail.parse()?;
        let reference_id = reference_id.trim();
        if reference_id.is_empty() {
            return Err(Error::InvalidRequest("reference id is required".to_string()));
        }
        self.partner.transfer_status(rail, reference_id).await
    }

    /// Map a caller request onto the partner's transfer shape with a fresh
    /// reference id. Purpose and instructions come from configuration.
    pub fn build_partner_request(&self, request: &DisbursementRequest) -> PartnerTransferRequest {
        PartnerTransferRequest {
            sender_ref_id: self.references.next_id(),
            tran_request_date: request_date(Local::now()),
            sender: self.sender.to_sender(),
            beneficiary: Beneficiary::from(&request.receiver),
            remittance: Remittance {
                amount: request.details.amount.clone(),
                currency: request.details.currency.clone(),
                receiving_bank: request.details.receiving_bank.clone(),
                purpose: self.remittance.purpose.clone(),
                instructions: self.remittance.instructions.clone(),
            },
        }
    }
}

/// `2006-01-02T15:04:05.000` style local timestamp, capped at 23 chars
pub fn request_date(now: DateTime<Local>) -> String {
    let mut formatted = now.format("%Y-%m-%dT%H:%M:%S%.3f").to_string();
    formatted.truncate(REQUEST_DATE_MAX_LEN);
    formatted
}

/// Run `operation` unless `cancel` fires first
pub async fn cancellable<T, F>(cancel: &CancellationToken, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = operation => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::AccessToken;
    use async_trait::async_trait;
    use chrono::{NaiveDateTime, TimeZone};
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakePartner {
        fail_auth: bool,
        calls: Mutex<Vec<String>>,
        submitted: Mutex<Vec<PartnerTransferRequest>>,
    }

    impl FakePartner {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PartnerConnector for FakePartner {
        async fn access_token(&self) -> Result<AccessToken> {
            self.calls.lock().unwrap().push("auth".into());
            if self.fail_auth {
                return Err(Error::AuthenticationFailed(Box::new(Error::PartnerRejected {
                    status_code: 401,
                    body: "bad credentials".into(),
                })));
            }
            Ok(AccessToken {
                access_token: "token".into(),
                token_type: "bearer".into(),
                scope: "instapay".into(),
                expires_in: 3600,
                refresh_token: String::new(),
                metadata: None,
            })
        }

        async fn submit_transfer(
            &self,
            rail: Rail,
            token: &AccessToken,
            request: &PartnerTransferRequest,
        ) -> Result<TransferReceipt> {
            assert_eq!(token.access_token, "token");
            self.calls.lock().unwrap().push(format!("transfer:{}", rail));
            self.submitted.lock().unwrap().push(request.clone());
            Ok(TransferReceipt::Instapay(InstapayReceipt {
                tran_id: "UB1".into(),
                created_at: String::new(),
                state: "Credited Beneficiary Account".into(),
                sender_ref_id: request.sender_ref_id.clone(),
            }))
        }

        async fn list_banks(&self, rail: Rail) -> Result<Records<Bank>> {
            self.calls.lock().unwrap().push(format!("banks:{}", rail));
            Err(Error::PartnerRejected {
                status_code: 503,
                body: "maintenance".into(),
            })
        }

        async fn transfer_status(&self, rail: Rail, reference_id: &str) -> Result<TransferStatusReport> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("status:{}:{}", rail, reference_id));
            Ok(TransferStatusReport::Pesonet(Records {
                records: Vec::new(),
                total_records: 0,
            }))
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn sender() -> SenderProfile {
        SenderProfile {
            name: "Palngipang Corp.".into(),
            address: Address {
                line1: "Some Tower".into(),
                line2: "Some Barangay".into(),
                city: "Some City".into(),
                province: "Metro Manila".into(),
                zip_code: "4024".into(),
                country: "Philippines".into(),
            },
        }
    }

    fn service(partner: Arc<FakePartner>) -> DisbursementService {
        DisbursementService::new(partner, sender(), RemittanceDefaults::default())
    }

    fn request() -> DisbursementRequest {
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

    #[tokio::test]
    async fn test_transfer_authenticates_first() {
        let partner = Arc::new(FakePartner::default());
        let svc = service(partner.clone());

        let receipt = svc.transfer_funds("instapay", &request()).await.unwrap();
        assert_eq!(receipt.transaction_id(), "UB1");
        assert_eq!(partner.calls(), vec!["auth", "transfer:instapay"]);
    }

    #[tokio::test]
    async fn test_auth_failure_stops_transfer() {
        let partner = Arc::new(FakePartner {
            fail_auth: true,
            ..Default::default()
        });
        let svc = service(partner.clone());

        let err = svc.transfer_funds("pesonet", &request()).await.unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed(_)));
        assert_eq!(partner.calls(), vec!["auth"]);
    }

    #[tokio::test]
    async fn test_unsupported_rail_makes_no_calls() {
        let partner = Arc::new(FakePartner::default());
        let svc = service(partner.clone());

        for rail in ["ubptoubp", "ubp", "swift"] {
            assert!(matches!(
                svc.transfer_funds(rail, &request()).await,
                Err(Error::UnsupportedRail(_))
            ));
            assert!(matches!(svc.list_banks(rail).await, Err(Error::UnsupportedRail(_))));
            assert!(matches!(
                svc.get_status(rail, "12345678").await,
                Err(Error::UnsupportedRail(_))
            ));
        }
        assert!(partner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_before_auth() {
        let partner = Arc::new(FakePartner::default());
        let svc = service(partner.clone());

        let mut bad = request();
        bad.details.amount = "one hundred".into();
        assert!(matches!(
            svc.transfer_funds("instapay", &bad).await,
            Err(Error::InvalidRequest(_))
        ));
        assert!(partner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reference_ids_are_fresh_per_transfer() {
        let partner = Arc::new(FakePartner::default());
        let svc = service(partner.clone());

        for _ in 0..50 {
            svc.transfer_funds("instapay", &request()).await.unwrap();
        }

        let submitted = partner.submitted.lock().unwrap();
        let ids: HashSet<_> = submitted.iter().map(|r| r.sender_ref_id.clone()).collect();
        assert_eq!(ids.len(), 50);
        assert!(ids.iter().all(|id| id.len() == 8));
    }

    #[test]
    fn test_partner_request_mapping() {
        let svc = service(Arc::new(FakePartner::default()));
        let req = request();
        let mapped = svc.build_partner_request(&req);

        assert_eq!(mapped.sender, sender().to_sender());
        assert_eq!(mapped.beneficiary.account_number, req.receiver.account_number);
        assert_eq!(mapped.beneficiary.name, req.receiver.name);
        assert_eq!(mapped.beneficiary.address, req.receiver.address);
        assert_eq!(mapped.remittance.amount, "100.00");
        assert_eq!(mapped.remittance.currency, "PHP");
        assert_eq!(mapped.remittance.receiving_bank, "161312");
        assert_eq!(mapped.remittance.purpose, "1001");
        assert_eq!(mapped.remittance.instructions, "Fund Transfer via Instapay");
        assert_eq!(mapped.tran_request_date.len(), REQUEST_DATE_MAX_LEN);
    }

    #[test]
    fn test_request_date_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).unwrap();
        let formatted = request_date(at);
        assert_eq!(formatted, "2024-03-09T07:05:03.000");
        assert!(NaiveDateTime::parse_from_str(&formatted, "%Y-%m-%dT%H:%M:%S%.3f").is_ok());
    }

    #[tokio::test]
    async fn test_status_and_bank_errors_propagate() {
        let partner = Arc::new(FakePartner::default());
        let svc = service(partner.clone());

        svc.get_status("pesonet", "87654321").await.unwrap();
        assert!(matches!(
            svc.list_banks("instapay").await,
            Err(Error::PartnerRejected { status_code: 503, .. })
        ));
        assert!(matches!(
            svc.get_status("instapay", " ").await,
            Err(Error::InvalidRequest(_))
        ));
        assert_eq!(partner.calls(), vec!["status:pesonet:87654321", "banks:instapay"]);
    }

    #[tokio::test]
    async fn test_status_reference_id_is_trimmed_once() {
        let partner = Arc::new(FakePartner::default());
        let svc = service(partner.clone());

        svc.get_status("instapay", " 12345678\n").await.unwrap();
        assert_eq!(partner.calls(), vec!["status:instapay:12345678"]);
    }

    #[tokio::test]
    async fn test_cancellable() {
        let cancel = CancellationToken::new();
        let ok = cancellable(&cancel, async { Ok::<_, Error>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        cancel.cancel();
        let cancelled = cancellable(&cancel, std::future::pending::<Result<()>>()).await;
        assert!(matches!(cancelled, Err(Error::Cancelled)));
    }
}
