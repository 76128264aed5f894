//! Driving port for turning a completed payment into an enrollment.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    CourseId, Error, PaymentProvider, Price, Transaction, TransactionId, UserCourseProgress,
    UserId,
};

/// Purchase facts reported by the client after payment confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollRequest {
    pub user_id: UserId,
    pub course_id: CourseId,
    /// Idempotency key for the whole enrollment.
    pub transaction_id: TransactionId,
    pub amount: Price,
    pub payment_provider: PaymentProvider,
}

/// Records produced by a successful enrollment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentOutcome {
    pub transaction: Transaction,
    pub course_progress: UserCourseProgress,
}

/// A pending transaction that reconciliation could not finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationFailure {
    pub transaction_id: TransactionId,
    pub reason: String,
}

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub repaired: Vec<TransactionId>,
    pub failed: Vec<ReconciliationFailure>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentCommand: Send + Sync {
    /// Record the purchase, create progress, and join the enrollment set.
    ///
    /// Safe to retry with the same `transaction_id`: completed steps are
    /// detected and skipped, missing ones are repaired.
    ///
    /// # Errors
    ///
    /// - `not_found` when the course does not exist.
    /// - `conflict` when `transaction_id` was recorded for a different purchase.
    /// - `consistency_gap` when the transaction is recorded but a follow-up
    ///   write failed; retry with the same `transaction_id`.
    async fn enroll(&self, request: EnrollRequest) -> Result<EnrollmentOutcome, Error>;

    /// Finish every transaction still marked pending.
    async fn reconcile_pending(&self) -> Result<ReconciliationReport, Error>;
}
