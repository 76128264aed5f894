//! Tests for the enrollment saga, including partial-failure recovery.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};

use super::*;
use crate::domain::ports::DeleteCondition;
use crate::domain::test_fixtures::{fixture_clock, two_by_two_course, user};
use crate::domain::{ErrorCode, PaymentProvider, Price, UserId};
use crate::outbound::document_store::InMemoryDocumentStore;

/// Store operations that [`FlakyStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    PutProgress,
    AddToSet,
    UpdateFields,
}

/// In-memory store that fails selected operations with a connection error.
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryDocumentStore,
    failing: Mutex<HashSet<Op>>,
}

impl FlakyStore {
    fn fail(&self, op: Op) {
        self.failing.lock().expect("lock").insert(op);
    }

    fn heal(&self) {
        self.failing.lock().expect("lock").clear();
    }

    fn check(&self, op: Op) -> Result<(), DocumentStoreError> {
        if self.failing.lock().expect("lock").contains(&op) {
            return Err(DocumentStoreError::connection("injected outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(
        &self,
        collection: Collection,
        key: &DocumentKey,
    ) -> Result<Option<Value>, DocumentStoreError> {
        self.inner.get(collection, key).await
    }

    async fn put(
        &self,
        collection: Collection,
        key: &DocumentKey,
        document: Value,
        condition: WriteCondition,
    ) -> Result<(), DocumentStoreError> {
        if collection == Collection::CourseProgress {
            self.check(Op::PutProgress)?;
        }
        self.inner.put(collection, key, document, condition).await
    }

    async fn update_fields(
        &self,
        collection: Collection,
        key: &DocumentKey,
        fields: Map<String, Value>,
    ) -> Result<(), DocumentStoreError> {
        self.check(Op::UpdateFields)?;
        self.inner.update_fields(collection, key, fields).await
    }

    async fn add_to_set(
        &self,
        collection: Collection,
        key: &DocumentKey,
        attribute: &str,
        element: Value,
    ) -> Result<bool, DocumentStoreError> {
        self.check(Op::AddToSet)?;
        self.inner.add_to_set(collection, key, attribute, element).await
    }

    async fn query_by_attribute(
        &self,
        collection: Collection,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<Value>, DocumentStoreError> {
        self.inner.query_by_attribute(collection, attribute, value).await
    }

    async fn scan(&self, collection: Collection) -> Result<Vec<Value>, DocumentStoreError> {
        self.inner.scan(collection).await
    }

    async fn delete(
        &self,
        collection: Collection,
        key: &DocumentKey,
        condition: DeleteCondition,
    ) -> Result<(), DocumentStoreError> {
        self.inner.delete(collection, key, condition).await
    }
}

struct Harness {
    store: Arc<FlakyStore>,
    coordinator: EnrollmentCoordinator<FlakyStore>,
}

impl Harness {
    async fn course(&self) -> Course {
        let document = self
            .store
            .get(Collection::Courses, &DocumentKey::course(&two_by_two_course().course_id))
            .await
            .expect("read course")
            .expect("course present");
        decode(Collection::Courses, document).expect("decode course")
    }

    async fn transaction(&self, raw: &str) -> Option<Transaction> {
        let id = TransactionId::new(raw).expect("valid id");
        self.store
            .get(Collection::Transactions, &DocumentKey::transaction(&id))
            .await
            .expect("read transaction")
            .map(|document| decode(Collection::Transactions, document).expect("decode"))
    }

    async fn progress(&self, learner: &UserId) -> Option<UserCourseProgress> {
        let key = DocumentKey::progress(learner, &two_by_two_course().course_id);
        self.store
            .get(Collection::CourseProgress, &key)
            .await
            .expect("read progress")
            .map(|document| decode(Collection::CourseProgress, document).expect("decode"))
    }
}

#[fixture]
async fn harness() -> Harness {
    let store = Arc::new(FlakyStore::default());
    let course = two_by_two_course();
    store
        .put(
            Collection::Courses,
            &DocumentKey::course(&course.course_id),
            encode(Collection::Courses, &course).expect("encode"),
            WriteCondition::Always,
        )
        .await
        .expect("seed course");
    Harness {
        coordinator: EnrollmentCoordinator::new(Arc::clone(&store), fixture_clock()),
        store,
    }
}

fn purchase(transaction: &str, learner: &str) -> EnrollRequest {
    EnrollRequest {
        user_id: user(learner),
        course_id: two_by_two_course().course_id,
        transaction_id: TransactionId::new(transaction).expect("valid id"),
        amount: Price::from_minor_units(4999),
        payment_provider: PaymentProvider::Stripe,
    }
}

#[rstest]
#[tokio::test]
async fn enroll_writes_transaction_progress_and_enrollment(#[future] harness: Harness) {
    let harness = harness.await;
    let outcome = harness
        .coordinator
        .enroll(purchase("tx-1", "learner"))
        .await
        .expect("enrollment succeeds");

    assert!(outcome.transaction.is_complete());
    assert_eq!(outcome.course_progress.chapter_count(), 4);
    assert_eq!(outcome.course_progress.completed_count(), 0);
    assert_eq!(outcome.course_progress.overall_progress(), 0.0);
    assert!(harness.course().await.is_enrolled(&user("learner")));
    let stored = harness.transaction("tx-1").await.expect("recorded");
    assert_eq!(stored, outcome.transaction);
}

#[rstest]
#[tokio::test]
async fn unknown_course_writes_nothing(#[future] harness: Harness) {
    let harness = harness.await;
    let mut request = purchase("tx-1", "learner");
    request.course_id = CourseId::new("missing").expect("valid id");

    let err = harness
        .coordinator
        .enroll(request)
        .await
        .expect_err("course absent");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert!(harness.transaction("tx-1").await.is_none());
}

#[rstest]
#[tokio::test]
async fn replaying_a_completed_purchase_is_a_no_op(#[future] harness: Harness) {
    let harness = harness.await;
    let first = harness
        .coordinator
        .enroll(purchase("tx-1", "learner"))
        .await
        .expect("first attempt");
    let second = harness
        .coordinator
        .enroll(purchase("tx-1", "learner"))
        .await
        .expect("replay");

    assert_eq!(first, second);
    assert_eq!(harness.course().await.enrollments.len(), 1);
}

#[rstest]
#[tokio::test]
async fn reused_transaction_id_for_other_purchase_conflicts(#[future] harness: Harness) {
    let harness = harness.await;
    harness
        .coordinator
        .enroll(purchase("tx-1", "learner"))
        .await
        .expect("first attempt");

    let err = harness
        .coordinator
        .enroll(purchase("tx-1", "someone-else"))
        .await
        .expect_err("mismatched replay");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert!(harness.progress(&user("someone-else")).await.is_none());
    assert!(!harness.course().await.is_enrolled(&user("someone-else")));
}

#[rstest]
#[case(Op::PutProgress, "create_progress")]
#[case(Op::AddToSet, "add_enrollment")]
#[case(Op::UpdateFields, "mark_complete")]
#[tokio::test]
async fn follow_up_failure_reports_a_retryable_gap(
    #[future] harness: Harness,
    #[case] op: Op,
    #[case] step: &str,
) {
    let harness = harness.await;
    harness.store.fail(op);

    let err = harness
        .coordinator
        .enroll(purchase("tx-1", "learner"))
        .await
        .expect_err("injected failure");

    assert_eq!(err.code(), ErrorCode::ConsistencyGap);
    assert_eq!(
        err.details(),
        Some(&json!({
            "transactionId": "tx-1",
            "failedStep": step,
            "retryable": true,
        }))
    );
    let pending = harness.transaction("tx-1").await.expect("payment recorded");
    assert_eq!(pending.status, TransactionStatus::Pending);
}

#[rstest]
#[case(Op::PutProgress)]
#[case(Op::AddToSet)]
#[case(Op::UpdateFields)]
#[tokio::test]
async fn retry_after_gap_completes_enrollment(#[future] harness: Harness, #[case] op: Op) {
    let harness = harness.await;
    harness.store.fail(op);
    harness
        .coordinator
        .enroll(purchase("tx-1", "learner"))
        .await
        .expect_err("injected failure");
    harness.store.heal();

    let outcome = harness
        .coordinator
        .enroll(purchase("tx-1", "learner"))
        .await
        .expect("retry succeeds");

    assert!(outcome.transaction.is_complete());
    assert!(harness.progress(&user("learner")).await.is_some());
    assert_eq!(harness.course().await.enrollments.len(), 1);
}

#[rstest]
#[tokio::test]
async fn retry_keeps_existing_progress(#[future] harness: Harness) {
    let harness = harness.await;
    harness.store.fail(Op::AddToSet);
    harness
        .coordinator
        .enroll(purchase("tx-1", "learner"))
        .await
        .expect_err("injected failure");
    harness.store.heal();

    let mut progress = harness.progress(&user("learner")).await.expect("created");
    progress.set_completed(
        &crate::domain::test_fixtures::section_id("s1"),
        &crate::domain::test_fixtures::chapter_id("c1a"),
        true,
    );
    harness
        .store
        .put(
            Collection::CourseProgress,
            &DocumentKey::progress(&user("learner"), &two_by_two_course().course_id),
            encode(Collection::CourseProgress, &progress).expect("encode"),
            WriteCondition::Always,
        )
        .await
        .expect("learner progressed");

    let outcome = harness
        .coordinator
        .enroll(purchase("tx-1", "learner"))
        .await
        .expect("retry succeeds");

    assert_eq!(outcome.course_progress.completed_count(), 1);
}

#[rstest]
#[tokio::test]
async fn reconcile_finishes_pending_transactions(#[future] harness: Harness) {
    let harness = harness.await;
    harness.store.fail(Op::AddToSet);
    for (tx, learner) in [("tx-1", "learner"), ("tx-2", "other")] {
        harness
            .coordinator
            .enroll(purchase(tx, learner))
            .await
            .expect_err("injected failure");
    }
    harness.store.heal();

    let report = harness
        .coordinator
        .reconcile_pending()
        .await
        .expect("reconciliation runs");

    assert_eq!(report.repaired.len(), 2);
    assert!(report.failed.is_empty());
    let course = harness.course().await;
    assert!(course.is_enrolled(&user("learner")));
    assert!(course.is_enrolled(&user("other")));
    assert!(harness.transaction("tx-2").await.expect("recorded").is_complete());

    let second = harness
        .coordinator
        .reconcile_pending()
        .await
        .expect("nothing left");
    assert_eq!(second, ReconciliationReport::default());
}

#[rstest]
#[tokio::test]
async fn reconcile_reports_steps_that_still_fail(#[future] harness: Harness) {
    let harness = harness.await;
    harness.store.fail(Op::AddToSet);
    harness
        .coordinator
        .enroll(purchase("tx-1", "learner"))
        .await
        .expect_err("injected failure");

    let report = harness
        .coordinator
        .reconcile_pending()
        .await
        .expect("reconciliation runs");

    assert!(report.repaired.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].transaction_id.as_str(), "tx-1");
}

#[rstest]
#[tokio::test]
async fn concurrent_enrollments_keep_every_learner(#[future] harness: Harness) {
    let harness = harness.await;
    let coordinator = Arc::new(harness.coordinator);
    let tasks = (0..8).map(|n| {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            coordinator
                .enroll(purchase(&format!("tx-{n}"), &format!("learner-{n}")))
                .await
        })
    });

    for joined in futures::future::join_all(tasks).await {
        joined.expect("task joins").expect("enrollment succeeds");
    }

    let document = harness
        .store
        .get(Collection::Courses, &DocumentKey::course(&two_by_two_course().course_id))
        .await
        .expect("read")
        .expect("present");
    let course: Course = decode(Collection::Courses, document).expect("decode");
    assert_eq!(course.enrollments.len(), 8);
}
