//! Purchase records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CourseId, Price, TransactionId, UserId};

/// Payment processor that settled the purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
}

/// Enrollment saga state recorded on the transaction.
///
/// A transaction is written `Pending` before any follow-up write and flipped
/// to `Complete` only once progress and enrollment exist. This flip is the
/// only mutation a transaction ever receives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Complete,
}

/// A completed payment for one course by one learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub amount: Price,
    pub payment_provider: PaymentProvider,
    pub date_time: DateTime<Utc>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Whether the supplied purchase facts describe this record.
    ///
    /// Timestamps and saga state are ignored; only the caller-supplied
    /// purchase facts are compared.
    pub fn matches_purchase(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        amount: Price,
        payment_provider: PaymentProvider,
    ) -> bool {
        &self.user_id == user_id
            && &self.course_id == course_id
            && self.amount == amount
            && self.payment_provider == payment_provider
    }

    pub fn is_complete(&self) -> bool {
        self.status == TransactionStatus::Complete
    }
}
