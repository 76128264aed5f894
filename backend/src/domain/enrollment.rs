//! Enrollment saga turning a completed payment into course access.
//!
//! A purchase touches three documents that the store cannot commit together:
//! the transaction, the learner's progress document, and the course's
//! enrollment set. The coordinator writes them in a fixed order and makes
//! every step idempotent under the `transactionId`:
//!
//! 1. read the course (`not_found` if absent);
//! 2. record the transaction as `pending`, or re-read and verify an existing
//!    record with the same id;
//! 3. create the progress document unless one exists;
//! 4. add `{userId}` to the course's enrollment set;
//! 5. flip the transaction to `complete`.
//!
//! A failure after step 2 leaves a pending transaction, never an enrollment
//! without a payment record. Re-invoking [`EnrollmentCommand::enroll`] with
//! the same id, or running [`EnrollmentCommand::reconcile_pending`], finishes
//! the remaining steps.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::documents::{FieldPatch, decode, encode, map_store_error};
use crate::domain::ports::{
    Collection, DocumentKey, DocumentStore, DocumentStoreError, EnrollRequest,
    EnrollmentCommand, EnrollmentOutcome, ReconciliationFailure, ReconciliationReport,
    WriteCondition,
};
use crate::domain::{
    Course, CourseId, Enrollment, Error, Transaction, TransactionId, TransactionStatus,
    UserCourseProgress,
};

/// Saga step that failed after the transaction was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentStep {
    CreateProgress,
    AddEnrollment,
    MarkComplete,
}

impl EnrollmentStep {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateProgress => "create_progress",
            Self::AddEnrollment => "add_enrollment",
            Self::MarkComplete => "mark_complete",
        }
    }
}

/// Implements [`EnrollmentCommand`] over a [`DocumentStore`].
#[derive(Clone)]
pub struct EnrollmentCoordinator<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> EnrollmentCoordinator<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

fn consistency_gap(transaction: &Transaction, step: EnrollmentStep, cause: &Error) -> Error {
    error!(
        transaction_id = %transaction.transaction_id,
        user_id = %transaction.user_id,
        course_id = %transaction.course_id,
        failed_step = step.as_str(),
        error = %cause,
        "payment recorded but enrollment incomplete"
    );
    Error::consistency_gap(
        "payment recorded but enrollment is incomplete; retry with the same transactionId",
    )
    .with_details(json!({
        "transactionId": transaction.transaction_id,
        "failedStep": step.as_str(),
        "retryable": true,
    }))
}

impl<S> EnrollmentCoordinator<S>
where
    S: DocumentStore,
{
    async fn load_course(&self, course_id: &CourseId) -> Result<Course, Error> {
        let document = self
            .store
            .get(Collection::Courses, &DocumentKey::course(course_id))
            .await
            .map_err(|err| map_store_error(Collection::Courses, err))?
            .ok_or_else(|| Error::not_found(format!("course {course_id} not found")))?;
        decode(Collection::Courses, document)
    }

    async fn load_transaction(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Transaction>, Error> {
        self.store
            .get(
                Collection::Transactions,
                &DocumentKey::transaction(transaction_id),
            )
            .await
            .map_err(|err| map_store_error(Collection::Transactions, err))?
            .map(|document| decode(Collection::Transactions, document))
            .transpose()
    }

    fn verify_replay(existing: Transaction, request: &EnrollRequest) -> Result<Transaction, Error> {
        if existing.matches_purchase(
            &request.user_id,
            &request.course_id,
            request.amount,
            request.payment_provider,
        ) {
            return Ok(existing);
        }
        Err(
            Error::conflict("transactionId already recorded for a different purchase")
                .with_details(json!({
                    "transactionId": request.transaction_id,
                    "code": "transaction_mismatch",
                })),
        )
    }

    /// Step 2: record the transaction once, or verify the recorded one.
    async fn record_transaction(&self, request: &EnrollRequest) -> Result<Transaction, Error> {
        if let Some(existing) = self.load_transaction(&request.transaction_id).await? {
            warn!(
                transaction_id = %request.transaction_id,
                status = ?existing.status,
                "enrollment retried for recorded transaction"
            );
            return Self::verify_replay(existing, request);
        }

        let transaction = Transaction {
            transaction_id: request.transaction_id.clone(),
            user_id: request.user_id.clone(),
            course_id: request.course_id.clone(),
            amount: request.amount,
            payment_provider: request.payment_provider,
            date_time: self.clock.utc(),
            status: TransactionStatus::Pending,
            completed_at: None,
        };
        let written = self
            .store
            .put(
                Collection::Transactions,
                &DocumentKey::transaction(&transaction.transaction_id),
                encode(Collection::Transactions, &transaction)?,
                WriteCondition::IfAbsent,
            )
            .await;
        match written {
            Ok(()) => Ok(transaction),
            Err(DocumentStoreError::AlreadyExists { .. }) => {
                // Lost a race with a concurrent retry of the same purchase.
                let existing = self
                    .load_transaction(&request.transaction_id)
                    .await?
                    .ok_or_else(|| {
                        Error::internal("transaction disappeared during race resolution")
                    })?;
                Self::verify_replay(existing, request)
            }
            Err(err) => Err(map_store_error(Collection::Transactions, err)),
        }
    }

    /// Step 3: create the initial progress document, keeping any existing one.
    async fn ensure_progress(
        &self,
        transaction: &Transaction,
        course: &Course,
    ) -> Result<UserCourseProgress, Error> {
        let key = DocumentKey::progress(&transaction.user_id, &course.course_id);
        let progress =
            UserCourseProgress::for_enrollment(transaction.user_id.clone(), course, self.clock.utc());
        let written = self
            .store
            .put(
                Collection::CourseProgress,
                &key,
                encode(Collection::CourseProgress, &progress)?,
                WriteCondition::IfAbsent,
            )
            .await;
        match written {
            Ok(()) => Ok(progress),
            Err(DocumentStoreError::AlreadyExists { .. }) => {
                let document = self
                    .store
                    .get(Collection::CourseProgress, &key)
                    .await
                    .map_err(|err| map_store_error(Collection::CourseProgress, err))?
                    .ok_or_else(|| Error::internal("progress disappeared during race resolution"))?;
                decode(Collection::CourseProgress, document)
            }
            Err(err) => Err(map_store_error(Collection::CourseProgress, err)),
        }
    }

    /// Step 4: join the enrollment set with a set-union write.
    async fn add_enrollment(&self, transaction: &Transaction) -> Result<bool, Error> {
        let entry = Enrollment {
            user_id: transaction.user_id.clone(),
        };
        self.store
            .add_to_set(
                Collection::Courses,
                &DocumentKey::course(&transaction.course_id),
                "enrollments",
                encode(Collection::Courses, &entry)?,
            )
            .await
            .map_err(|err| map_store_error(Collection::Courses, err))
    }

    /// Step 5: flip the saga state.
    async fn mark_complete(&self, transaction: &mut Transaction) -> Result<(), Error> {
        if transaction.is_complete() {
            return Ok(());
        }
        let completed_at = self.clock.utc();
        let patch = FieldPatch::new(Collection::Transactions)
            .set("status", &TransactionStatus::Complete)?
            .set("completedAt", &completed_at)?;
        self.store
            .update_fields(
                Collection::Transactions,
                &DocumentKey::transaction(&transaction.transaction_id),
                patch.into_fields(),
            )
            .await
            .map_err(|err| map_store_error(Collection::Transactions, err))?;
        transaction.status = TransactionStatus::Complete;
        transaction.completed_at = Some(completed_at);
        Ok(())
    }

    /// Steps 3 to 5; every failure here is a consistency gap.
    async fn finish(
        &self,
        mut transaction: Transaction,
        course: &Course,
    ) -> Result<EnrollmentOutcome, Error> {
        let progress = self
            .ensure_progress(&transaction, course)
            .await
            .map_err(|err| consistency_gap(&transaction, EnrollmentStep::CreateProgress, &err))?;
        let joined = self
            .add_enrollment(&transaction)
            .await
            .map_err(|err| consistency_gap(&transaction, EnrollmentStep::AddEnrollment, &err))?;
        if let Err(err) = self.mark_complete(&mut transaction).await {
            return Err(consistency_gap(&transaction, EnrollmentStep::MarkComplete, &err));
        }

        info!(
            transaction_id = %transaction.transaction_id,
            user_id = %transaction.user_id,
            course_id = %transaction.course_id,
            newly_enrolled = joined,
            "enrollment complete"
        );
        Ok(EnrollmentOutcome {
            transaction,
            course_progress: progress,
        })
    }

    async fn reconcile_one(&self, transaction: Transaction) -> Result<(), Error> {
        let course = self.load_course(&transaction.course_id).await?;
        self.finish(transaction, &course).await.map(|_| ())
    }
}

#[async_trait]
impl<S> EnrollmentCommand for EnrollmentCoordinator<S>
where
    S: DocumentStore,
{
    async fn enroll(&self, request: EnrollRequest) -> Result<EnrollmentOutcome, Error> {
        let course = self.load_course(&request.course_id).await?;
        let transaction = self.record_transaction(&request).await?;
        self.finish(transaction, &course).await
    }

    async fn reconcile_pending(&self) -> Result<ReconciliationReport, Error> {
        let pending = self
            .store
            .query_by_attribute(Collection::Transactions, "status", "pending")
            .await
            .map_err(|err| map_store_error(Collection::Transactions, err))?;

        let mut report = ReconciliationReport::default();
        for document in pending {
            let transaction: Transaction = match decode(Collection::Transactions, document) {
                Ok(transaction) => transaction,
                Err(err) => {
                    error!(error = %err, "skipping undecodable pending transaction");
                    continue;
                }
            };
            let transaction_id = transaction.transaction_id.clone();
            match self.reconcile_one(transaction).await {
                Ok(()) => {
                    warn!(transaction_id = %transaction_id, "pending enrollment repaired");
                    report.repaired.push(transaction_id);
                }
                Err(err) => report.failed.push(ReconciliationFailure {
                    transaction_id,
                    reason: err.message().to_owned(),
                }),
            }
        }
        info!(
            repaired = report.repaired.len(),
            failed = report.failed.len(),
            "reconciliation pass finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests;
