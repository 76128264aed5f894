//! Tests for purchase HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::MockPaymentIntentCommand;
use crate::domain::test_fixtures::two_by_two_course;
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::test_utils::{bearer, seed_course, state_over, test_app};
use crate::outbound::document_store::InMemoryDocumentStore;

async fn seeded_store() -> Arc<InMemoryDocumentStore> {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed_course(&store, &two_by_two_course()).await;
    store
}

fn purchase(transaction_id: &str, user_id: &str) -> Value {
    json!({
        "userId": user_id,
        "courseId": "c1",
        "transactionId": transaction_id,
        "amount": 4999,
        "paymentProvider": "stripe",
    })
}

#[rstest]
fn body_rejects_malformed_identifiers() {
    let body: CreateTransactionBody =
        serde_json::from_value(purchase("bad id", "learner")).expect("shape parses");
    let err = body.into_request().expect_err("space in transactionId");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().expect("details")["field"], "transactionId");
}

#[actix_web::test]
async fn purchase_returns_transaction_and_progress() {
    let app = actix_test::init_service(test_app(state_over(seeded_store().await))).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/transactions")
            .insert_header(bearer("learner"))
            .set_json(purchase("tx-1", "learner"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["transaction"]["status"], "complete");
    assert_eq!(body["courseProgress"]["overallProgress"], 0.0);
    assert_eq!(
        body["courseProgress"]["sections"][1]["chapters"][1]["completed"],
        false
    );
}

#[actix_web::test]
async fn purchase_for_another_user_is_forbidden() {
    let app = actix_test::init_service(test_app(state_over(seeded_store().await))).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/transactions")
            .insert_header(bearer("mallory"))
            .set_json(purchase("tx-1", "learner"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn purchase_of_unknown_course_is_404() {
    let app = actix_test::init_service(test_app(state_over(seeded_store().await))).await;
    let mut body = purchase("tx-1", "learner");
    body["courseId"] = json!("missing");
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/transactions")
            .insert_header(bearer("learner"))
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn reused_transaction_id_conflicts() {
    let app = actix_test::init_service(test_app(state_over(seeded_store().await))).await;
    let post = |body: Value| {
        actix_test::TestRequest::post()
            .uri("/transactions")
            .insert_header(bearer("learner"))
            .set_json(body)
            .to_request()
    };
    let first = actix_test::call_service(&app, post(purchase("tx-1", "learner"))).await;
    assert_eq!(first.status(), StatusCode::OK);

    let mut different = purchase("tx-1", "learner");
    different["amount"] = json!(1);
    let res = actix_test::call_service(&app, post(different)).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn listing_is_scoped_to_the_caller_unless_teacher() {
    let app = actix_test::init_service(test_app(state_over(seeded_store().await))).await;
    actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/transactions")
            .insert_header(bearer("learner"))
            .set_json(purchase("tx-1", "learner"))
            .to_request(),
    )
    .await;

    let own = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/transactions?userId=learner")
            .insert_header(bearer("learner"))
            .to_request(),
    )
    .await;
    assert_eq!(own.status(), StatusCode::OK);
    let own: Vec<Value> = actix_test::read_body_json(own).await;
    assert_eq!(own.len(), 1);

    let everyone = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/transactions")
            .insert_header(bearer("learner"))
            .to_request(),
    )
    .await;
    assert_eq!(everyone.status(), StatusCode::FORBIDDEN);

    let as_teacher = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/transactions")
            .insert_header(bearer("teacher-ada"))
            .to_request(),
    )
    .await;
    assert_eq!(as_teacher.status(), StatusCode::OK);
}

#[actix_web::test]
async fn payment_intent_defaults_to_placeholder_amount() {
    let app = actix_test::init_service(test_app(state_over(seeded_store().await))).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/transactions/payment-intent")
            .insert_header(bearer("learner"))
            .set_json(json!({"amount": 0}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: PaymentIntentResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.client_secret, "pi_fixture_5000_secret_usd");
}

#[rstest]
#[case::numeric_string(json!({"amount": "49.99"}), "pi_fixture_4999_secret_usd")]
#[case::padded_string(json!({"amount": " 12.5 "}), "pi_fixture_1250_secret_usd")]
#[case::zero_string(json!({"amount": "0"}), "pi_fixture_5000_secret_usd")]
#[actix_web::test]
async fn payment_intent_accepts_string_amounts(#[case] payload: Value, #[case] secret: &str) {
    let app = actix_test::init_service(test_app(state_over(seeded_store().await))).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/transactions/payment-intent")
            .insert_header(bearer("learner"))
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: PaymentIntentResponse = actix_test::read_body_json(res).await;
    assert_eq!(body.client_secret, secret);
}

#[actix_web::test]
async fn non_numeric_amount_names_the_field() {
    let app = actix_test::init_service(test_app(state_over(seeded_store().await))).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/transactions/payment-intent")
            .insert_header(bearer("learner"))
            .set_json(json!({"amount": "lots"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "amount");
    assert_eq!(body["details"]["code"], "invalid_number");
}

#[actix_web::test]
async fn payment_intent_below_minimum_is_400() {
    let app = actix_test::init_service(test_app(state_over(seeded_store().await))).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/transactions/payment-intent")
            .insert_header(bearer("learner"))
            .set_json(json!({"amount": 0.10}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["message"], "Amount must be at least $0.50");
}

#[actix_web::test]
async fn gateway_failure_is_502() {
    let mut payments = MockPaymentIntentCommand::new();
    payments
        .expect_create_payment_intent()
        .returning(|_| Err(Error::external_service("Error creating payment intent")));
    let mut state = state_over(seeded_store().await);
    state.payments = Arc::new(payments);
    let app = actix_test::init_service(test_app(state)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/transactions/payment-intent")
            .insert_header(bearer("learner"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}
