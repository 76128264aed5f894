//! Driving port for purchase history reads.

use async_trait::async_trait;

use crate::domain::{Error, Transaction, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionQuery: Send + Sync {
    /// Transactions for `user_id`, or every transaction when `None`.
    async fn list_transactions(&self, user_id: Option<UserId>) -> Result<Vec<Transaction>, Error>;
}
