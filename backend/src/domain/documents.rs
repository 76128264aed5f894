//! Conversions between domain records and store documents.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::Error;
use super::ports::{Collection, DocumentStoreError};

/// Translate a store failure for `collection` into a domain error.
pub(crate) fn map_store_error(collection: Collection, error: DocumentStoreError) -> Error {
    match error {
        DocumentStoreError::Connection { message } => {
            Error::service_unavailable(format!("{collection} store unavailable: {message}"))
        }
        DocumentStoreError::Query { message } => {
            Error::internal(format!("{collection} store error: {message}"))
        }
        DocumentStoreError::Serialization { message } => {
            Error::internal(format!("{collection} document invalid: {message}"))
        }
        DocumentStoreError::AlreadyExists { key } => {
            Error::conflict(format!("{collection} document already exists: {key}"))
        }
        DocumentStoreError::NotFound { key } => {
            Error::not_found(format!("{collection} document not found: {key}"))
        }
        DocumentStoreError::ConditionFailed { key } => {
            Error::conflict(format!("{collection} document precondition failed: {key}"))
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(collection: Collection, document: Value) -> Result<T, Error> {
    serde_json::from_value(document)
        .map_err(|err| Error::internal(format!("failed to decode {collection} document: {err}")))
}

pub(crate) fn encode<T: Serialize>(collection: Collection, record: &T) -> Result<Value, Error> {
    serde_json::to_value(record)
        .map_err(|err| Error::internal(format!("failed to encode {collection} document: {err}")))
}

/// Builder for the field map passed to `update_fields`.
#[derive(Debug)]
pub(crate) struct FieldPatch {
    collection: Collection,
    fields: Map<String, Value>,
}

impl FieldPatch {
    pub(crate) fn new(collection: Collection) -> Self {
        Self {
            collection,
            fields: Map::new(),
        }
    }

    /// Set `name` to the serialised `value`.
    pub(crate) fn set<T: Serialize>(mut self, name: &str, value: &T) -> Result<Self, Error> {
        self.fields
            .insert(name.to_owned(), encode(self.collection, value)?);
        Ok(self)
    }

    /// Set `name` only when `value` is present.
    pub(crate) fn set_opt<T: Serialize>(self, name: &str, value: Option<&T>) -> Result<Self, Error> {
        match value {
            Some(inner) => self.set(name, inner),
            None => Ok(self),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}
