//! Purchase history reads.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::documents::{decode, map_store_error};
use crate::domain::ports::{Collection, DocumentStore, TransactionQuery};
use crate::domain::{Error, Transaction, UserId};

const TRANSACTIONS: Collection = Collection::Transactions;

#[derive(Clone)]
pub struct TransactionService<S> {
    store: Arc<S>,
}

impl<S> TransactionService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> TransactionQuery for TransactionService<S>
where
    S: DocumentStore,
{
    /// Oldest purchase first.
    async fn list_transactions(&self, user_id: Option<UserId>) -> Result<Vec<Transaction>, Error> {
        let documents = match user_id {
            Some(user_id) => {
                self.store
                    .query_by_attribute(TRANSACTIONS, "userId", user_id.as_str())
                    .await
            }
            None => self.store.scan(TRANSACTIONS).await,
        }
        .map_err(|err| map_store_error(TRANSACTIONS, err))?;

        let mut transactions = documents
            .into_iter()
            .map(|document| decode::<Transaction>(TRANSACTIONS, document))
            .collect::<Result<Vec<_>, _>>()?;
        transactions.sort_by(|a, b| {
            a.date_time
                .cmp(&b.date_time)
                .then_with(|| a.transaction_id.as_str().cmp(b.transaction_id.as_str()))
        });
        Ok(transactions)
    }
}
