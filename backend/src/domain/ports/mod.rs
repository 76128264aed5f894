//! Domain ports for the hexagonal boundary.
//!
//! Driven ports ([`DocumentStore`], [`IdentityProvider`], [`PaymentGateway`])
//! are implemented by outbound adapters. Driving ports are implemented by
//! domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod course_command;
mod course_progress;
mod course_query;
mod document_store;
mod enrollment_command;
mod identity_provider;
mod payment_gateway;
mod payment_intent_command;
mod transaction_query;

pub use course_command::{CourseCommand, CreateCourseRequest, UpdateCourseRequest};
#[cfg(test)]
pub use course_command::MockCourseCommand;
pub use course_progress::{ApplyProgressRequest, CourseProgressCommand, CourseProgressQuery};
#[cfg(test)]
pub use course_progress::{MockCourseProgressCommand, MockCourseProgressQuery};
pub use course_query::CourseQuery;
#[cfg(test)]
pub use course_query::MockCourseQuery;
pub use document_store::{
    Collection, DeleteCondition, DocumentKey, DocumentStore, DocumentStoreError, WriteCondition,
};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use enrollment_command::{
    EnrollRequest, EnrollmentCommand, EnrollmentOutcome, ReconciliationFailure,
    ReconciliationReport,
};
#[cfg(test)]
pub use enrollment_command::MockEnrollmentCommand;
pub use identity_provider::{FixtureIdentityProvider, IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use payment_gateway::{
    FixturePaymentGateway, PaymentGateway, PaymentGatewayError, PaymentIntent,
    PaymentIntentRequest,
};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_intent_command::PaymentIntentCommand;
#[cfg(test)]
pub use payment_intent_command::MockPaymentIntentCommand;
pub use transaction_query::TransactionQuery;
#[cfg(test)]
pub use transaction_query::MockTransactionQuery;
