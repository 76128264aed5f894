//! Purchase HTTP handlers.
//!
//! ```text
//! POST /transactions
//! GET /transactions?userId=
//! POST /transactions/payment-intent
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{EnrollRequest, EnrollmentOutcome};
use crate::domain::{PaymentProvider, Price, Transaction};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedPrincipal;
use crate::inbound::http::cache_control::private_revalidate;
use crate::inbound::http::schemas::{EnrollmentOutcomeSchema, ErrorSchema, TransactionSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, PriceInput, parse_course_id, parse_transaction_id, parse_user_id,
};

const USER_ID: FieldName = FieldName::new("userId");
const COURSE_ID: FieldName = FieldName::new("courseId");
const TRANSACTION_ID: FieldName = FieldName::new("transactionId");
const AMOUNT: FieldName = FieldName::new("amount");

/// Body for `POST /transactions`, sent once the client has confirmed payment.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionBody {
    #[schema(example = "user_2f8a")]
    pub user_id: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub course_id: String,
    /// Idempotency key; retry with the same value after a failure.
    #[schema(example = "pi_3Mtw")]
    pub transaction_id: String,
    /// Amount paid in minor currency units.
    #[schema(example = 4999)]
    pub amount: u64,
    #[schema(value_type = String, example = "stripe")]
    pub payment_provider: PaymentProvider,
}

impl CreateTransactionBody {
    fn into_request(self) -> ApiResult<EnrollRequest> {
        Ok(EnrollRequest {
            user_id: parse_user_id(&self.user_id, USER_ID)?,
            course_id: parse_course_id(&self.course_id, COURSE_ID)?,
            transaction_id: parse_transaction_id(&self.transaction_id, TRANSACTION_ID)?,
            amount: Price::from_minor_units(self.amount),
            payment_provider: self.payment_provider,
        })
    }
}

/// Query for `GET /transactions`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TransactionsQuery {
    /// Restrict to one purchaser; omitted means every transaction.
    pub user_id: Option<String>,
}

/// Body for `POST /transactions/payment-intent`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentBody {
    /// Major currency units as a number or numeric string; omitted or zero
    /// charges the placeholder amount.
    #[schema(value_type = Option<f64>, example = 49.99)]
    pub amount: Option<PriceInput>,
}

/// Client secret used to confirm the payment in the browser.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Record a purchase and enroll the purchaser.
#[utoipa::path(
    post,
    path = "/transactions",
    request_body = CreateTransactionBody,
    responses(
        (status = 200, description = "Enrollment complete", body = EnrollmentOutcomeSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "userId is not the caller", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 409, description = "transactionId reused for another purchase", body = ErrorSchema),
        (status = 503, description = "Payment recorded but enrollment incomplete; retry", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["transactions"],
    operation_id = "createTransaction"
)]
#[post("/transactions")]
pub async fn create_transaction(
    state: web::Data<HttpState>,
    principal: AuthenticatedPrincipal,
    payload: web::Json<CreateTransactionBody>,
) -> ApiResult<web::Json<EnrollmentOutcome>> {
    let request = payload.into_inner().into_request()?;
    principal.require_user(&request.user_id)?;
    Ok(web::Json(state.enrollments.enroll(request).await?))
}

/// List purchases, oldest first.
#[utoipa::path(
    get,
    path = "/transactions",
    params(TransactionsQuery),
    responses(
        (status = 200, description = "Transactions", body = [TransactionSchema]),
        (status = 400, description = "Invalid userId", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Listing others requires the teacher role", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["transactions"],
    operation_id = "listTransactions"
)]
#[get("/transactions")]
pub async fn list_transactions(
    state: web::Data<HttpState>,
    principal: AuthenticatedPrincipal,
    query: web::Query<TransactionsQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = query
        .into_inner()
        .user_id
        .map(|raw| parse_user_id(&raw, USER_ID))
        .transpose()?;
    match &user_id {
        Some(id) if *id == principal.user_id => {}
        _ => principal.require_teacher()?,
    }
    let transactions: Vec<Transaction> = state.transactions.list_transactions(user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_revalidate())
        .json(transactions))
}

/// Start a checkout.
#[utoipa::path(
    post,
    path = "/transactions/payment-intent",
    request_body = PaymentIntentBody,
    responses(
        (status = 200, description = "Intent created", body = PaymentIntentResponse),
        (status = 400, description = "Amount below the minimum charge", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 502, description = "Payment gateway failed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["transactions"],
    operation_id = "createPaymentIntent"
)]
#[post("/transactions/payment-intent")]
pub async fn create_payment_intent(
    state: web::Data<HttpState>,
    _principal: AuthenticatedPrincipal,
    payload: Option<web::Json<PaymentIntentBody>>,
) -> ApiResult<web::Json<PaymentIntentResponse>> {
    let body = payload.map(web::Json::into_inner).unwrap_or_default();
    let amount = body
        .amount
        .map(|amount| amount.into_major_units(AMOUNT))
        .transpose()?;
    let intent = state.payments.create_payment_intent(amount).await?;
    Ok(web::Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

#[cfg(test)]
#[path = "transactions_tests.rs"]
mod tests;
