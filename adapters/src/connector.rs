//! Partner connector interface

use crate::{token::AccessToken, types::*, Result};
use async_trait::async_trait;

/// Operations the disbursement service needs from a partner bank
#[async_trait]
pub trait PartnerConnector: Send + Sync {
    /// Token for the next authenticated call (fresh or cached)
    async fn access_token(&self) -> Result<AccessToken>;

    /// Submit a single transfer on `rail`
    async fn submit_transfer(
        &self,
        rail: Rail,
        token: &AccessToken,
        request: &PartnerTransferRequest,
    ) -> Result<TransferReceipt>;

    /// Receiving banks reachable on `rail`
    async fn list_banks(&self, rail: Rail) -> Result<Records<Bank>>;

    /// Status of a transfer by sender reference id
    async fn transfer_status(&self, rail: Rail, reference_id: &str) -> Result<TransferStatusReport>;

    /// Connector name, for logs
    fn name(&self) -> &str;
}
