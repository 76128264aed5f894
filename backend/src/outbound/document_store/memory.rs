//! In-process document store.
//!
//! Used when no database URL is configured and as the default test double.
//! Every operation takes the single lock once, so each call is atomic for
//! the document it touches, matching the port contract.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::ports::{
    Collection, DeleteCondition, DocumentKey, DocumentStore, DocumentStoreError, WriteCondition,
};

type Documents = BTreeMap<(Collection, String), Value>;

/// Thread-safe map of JSON documents keyed by collection and primary key.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Documents>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> DocumentStoreError {
    DocumentStoreError::query("in-memory store lock poisoned")
}

fn slot(collection: Collection, key: &DocumentKey) -> (Collection, String) {
    (collection, key.as_str().to_owned())
}

fn as_object<'a>(
    document: &'a mut Value,
    key: &DocumentKey,
) -> Result<&'a mut Map<String, Value>, DocumentStoreError> {
    document
        .as_object_mut()
        .ok_or_else(|| DocumentStoreError::serialization(format!("document {key} is not an object")))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(
        &self,
        collection: Collection,
        key: &DocumentKey,
    ) -> Result<Option<Value>, DocumentStoreError> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.get(&slot(collection, key)).cloned())
    }

    async fn put(
        &self,
        collection: Collection,
        key: &DocumentKey,
        document: Value,
        condition: WriteCondition,
    ) -> Result<(), DocumentStoreError> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        let slot = slot(collection, key);
        if condition == WriteCondition::IfAbsent && documents.contains_key(&slot) {
            return Err(DocumentStoreError::already_exists(key.as_str()));
        }
        documents.insert(slot, document);
        Ok(())
    }

    async fn update_fields(
        &self,
        collection: Collection,
        key: &DocumentKey,
        fields: Map<String, Value>,
    ) -> Result<(), DocumentStoreError> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        let document = documents
            .get_mut(&slot(collection, key))
            .ok_or_else(|| DocumentStoreError::not_found(key.as_str()))?;
        as_object(document, key)?.extend(fields);
        Ok(())
    }

    async fn add_to_set(
        &self,
        collection: Collection,
        key: &DocumentKey,
        attribute: &str,
        element: Value,
    ) -> Result<bool, DocumentStoreError> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        let document = documents
            .get_mut(&slot(collection, key))
            .ok_or_else(|| DocumentStoreError::not_found(key.as_str()))?;
        let entry = as_object(document, key)?
            .entry(attribute.to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Some(items) = entry.as_array_mut() else {
            return Err(DocumentStoreError::serialization(format!(
                "attribute {attribute} of {key} is not an array"
            )));
        };
        if items.contains(&element) {
            return Ok(false);
        }
        items.push(element);
        Ok(true)
    }

    async fn query_by_attribute(
        &self,
        collection: Collection,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<Value>, DocumentStoreError> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents
            .iter()
            .filter(|((owner, _), document)| {
                *owner == collection
                    && document.get(attribute).and_then(Value::as_str) == Some(value)
            })
            .map(|(_, document)| document.clone())
            .collect())
    }

    async fn scan(&self, collection: Collection) -> Result<Vec<Value>, DocumentStoreError> {
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents
            .iter()
            .filter(|((owner, _), _)| *owner == collection)
            .map(|(_, document)| document.clone())
            .collect())
    }

    async fn delete(
        &self,
        collection: Collection,
        key: &DocumentKey,
        condition: DeleteCondition,
    ) -> Result<(), DocumentStoreError> {
        let mut documents = self.documents.write().map_err(poisoned)?;
        let slot = slot(collection, key);
        let document = documents
            .get(&slot)
            .ok_or_else(|| DocumentStoreError::not_found(key.as_str()))?;
        if let DeleteCondition::SetEmpty(attribute) = condition {
            let occupied = document
                .get(attribute)
                .and_then(Value::as_array)
                .is_some_and(|items| !items.is_empty());
            if occupied {
                return Err(DocumentStoreError::condition_failed(key.as_str()));
            }
        }
        documents.remove(&slot);
        Ok(())
    }
}
