//! Port for keyed JSON document persistence.
//!
//! The store offers single-item atomicity only: every call succeeds or fails
//! as a whole for the one document it touches, and nothing spans documents.
//! Services compose multi-document flows out of these primitives and make
//! each step idempotent instead of relying on a transaction.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{CourseId, TransactionId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "document store connection failed: {message}",
        /// The store rejected or failed to execute the operation.
        Query { message: String } =>
            "document store query failed: {message}",
        /// A stored document could not be encoded or decoded.
        Serialization { message: String } =>
            "document store serialization failed: {message}",
        /// A conditional create found an existing document.
        AlreadyExists { key: String } =>
            "document already exists: {key}",
        /// A partial update targeted a missing document.
        NotFound { key: String } =>
            "document not found: {key}",
        /// A conditional delete found its precondition unmet.
        ConditionFailed { key: String } =>
            "document precondition failed: {key}",
    }
}

/// Logical document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Courses,
    Transactions,
    CourseProgress,
}

impl Collection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Courses => "courses",
            Self::Transactions => "transactions",
            Self::CourseProgress => "course_progress",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary key of a document within its collection.
///
/// Progress documents use the composite `userId#courseId`; identifiers never
/// contain `#`, so the encoding is unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn course(course_id: &CourseId) -> Self {
        Self(course_id.as_str().to_owned())
    }

    pub fn transaction(transaction_id: &TransactionId) -> Self {
        Self(transaction_id.as_str().to_owned())
    }

    pub fn progress(user_id: &UserId, course_id: &CourseId) -> Self {
        Self(format!("{user_id}#{course_id}"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precondition for [`DocumentStore::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteCondition {
    /// Create or replace.
    Always,
    /// Create only; fail with [`DocumentStoreError::AlreadyExists`] otherwise.
    IfAbsent,
}

/// Precondition for [`DocumentStore::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteCondition {
    Always,
    /// Delete only while the array at this attribute is absent or empty.
    SetEmpty(&'static str),
}

/// Narrow document store contract used by every service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by key.
    async fn get(
        &self,
        collection: Collection,
        key: &DocumentKey,
    ) -> Result<Option<Value>, DocumentStoreError>;

    /// Write a whole document subject to `condition`.
    async fn put(
        &self,
        collection: Collection,
        key: &DocumentKey,
        document: Value,
        condition: WriteCondition,
    ) -> Result<(), DocumentStoreError>;

    /// Shallow-merge top-level `fields` into an existing document.
    ///
    /// Fails with [`DocumentStoreError::NotFound`] when the document is absent.
    async fn update_fields(
        &self,
        collection: Collection,
        key: &DocumentKey,
        fields: Map<String, Value>,
    ) -> Result<(), DocumentStoreError>;

    /// Append `element` to the array at `attribute` unless an equal element
    /// is already present.
    ///
    /// Returns `true` when the set changed. Concurrent additions of distinct
    /// elements never lose each other.
    async fn add_to_set(
        &self,
        collection: Collection,
        key: &DocumentKey,
        attribute: &str,
        element: Value,
    ) -> Result<bool, DocumentStoreError>;

    /// Documents whose top-level string `attribute` equals `value`.
    async fn query_by_attribute(
        &self,
        collection: Collection,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<Value>, DocumentStoreError>;

    /// Every document in `collection`.
    async fn scan(&self, collection: Collection) -> Result<Vec<Value>, DocumentStoreError>;

    /// Remove a document subject to `condition`, checked in the same atomic
    /// step as the removal.
    ///
    /// Fails with [`DocumentStoreError::NotFound`] when the document is absent
    /// and [`DocumentStoreError::ConditionFailed`] when `condition` is unmet.
    async fn delete(
        &self,
        collection: Collection,
        key: &DocumentKey,
        condition: DeleteCondition,
    ) -> Result<(), DocumentStoreError>;
}
