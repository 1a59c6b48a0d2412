// service/payout_provider.rs
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{config::Config, models::refundmodel::BankAccount};

#[derive(Error, Debug)]
pub enum PayoutError {
    #[error("payout request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("payout rejected by provider: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub external_ref: String,
    pub transfer_code: String,
    pub status: String,
}

/// Transfer reference for a refund, stable across processing attempts.
/// A refund is one logical payment, so a reopen-and-retry after a timed-out
/// attempt re-sends the same reference and the rail deduplicates instead of
/// paying twice.
pub fn generate_payout_reference(refund_id: Uuid) -> String {
    format!("rv-{}", refund_id)
}

#[async_trait]
pub trait PayoutRail: Send + Sync {
    async fn initiate_transfer(
        &self,
        account: &BankAccount,
        amount_kobo: i64,
        reference: &str,
        narration: &str,
    ) -> Result<TransferReceipt, PayoutError>;
}

pub struct PaystackRail {
    secret_key: String,
    base_url: String,
    client: reqwest::Client,
}

// Callers hold a refund row lock across the rail call; the client timeout
// bounds how long that lock can be pinned.
const RAIL_TIMEOUT: Duration = Duration::from_secs(30);

impl PaystackRail {
    pub fn new(config: &Config) -> Self {
        Self {
            secret_key: config.paystack_secret_key.clone(),
            base_url: config.payout_base_url.clone(),
            client: reqwest::Client::builder()
                .timeout(RAIL_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    async fn create_recipient(&self, account: &BankAccount) -> Result<String, PayoutError> {
        let payload = serde_json::json!({
            "type": "nuban",
            "name": account.account_name,
            "account_number": account.account_number,
            "bank_code": account.bank_code,
            "currency": "NGN",
        });

        let response = self
            .client
            .post(format!("{}/transferrecipient", self.base_url))
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let body: serde_json::Value = response.json().await?;

        if body["status"].as_bool().unwrap_or(false) {
            Ok(body["data"]["recipient_code"]
                .as_str()
                .unwrap_or_default()
                .to_string())
        } else {
            Err(PayoutError::Rejected(
                body["message"]
                    .as_str()
                    .unwrap_or("Recipient creation failed")
                    .to_string(),
            ))
        }
    }
}

#[async_trait]
impl PayoutRail for PaystackRail {
    async fn initiate_transfer(
        &self,
        account: &BankAccount,
        amount_kobo: i64,
        reference: &str,
        narration: &str,
    ) -> Result<TransferReceipt, PayoutError> {
        let recipient_code = self.create_recipient(account).await?;

        let payload = serde_json::json!({
            "source": "balance",
            "amount": amount_kobo,
            "recipient": recipient_code,
            "reference": reference,
            "reason": narration,
        });

        let response = self
            .client
            .post(format!("{}/transfer", self.base_url))
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let body: serde_json::Value = response.json().await?;

        if body["status"].as_bool().unwrap_or(false) {
            let data = &body["data"];
            Ok(TransferReceipt {
                external_ref: data["reference"]
                    .as_str()
                    .unwrap_or(reference)
                    .to_string(),
                transfer_code: data["transfer_code"].as_str().unwrap_or_default().to_string(),
                status: data["status"].as_str().unwrap_or("pending").to_string(),
            })
        } else {
            Err(PayoutError::Rejected(
                body["message"]
                    .as_str()
                    .unwrap_or("Transfer initiation failed")
                    .to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_reference_carries_refund_id() {
        let refund_id = Uuid::new_v4();
        assert_eq!(generate_payout_reference(refund_id), format!("rv-{}", refund_id));
    }

    #[test]
    fn test_payout_reference_stable_across_attempts() {
        // A reopened refund must retry with the same reference so the rail
        // can deduplicate a transfer that succeeded but timed out on reply
        let refund_id = Uuid::new_v4();
        assert_eq!(
            generate_payout_reference(refund_id),
            generate_payout_reference(refund_id)
        );
    }

    #[test]
    fn test_payout_references_differ_per_refund() {
        assert_ne!(
            generate_payout_reference(Uuid::new_v4()),
            generate_payout_reference(Uuid::new_v4())
        );
    }
}
