// Copyright 2024. The Tari Project
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Contracts for the collaborators the incoming preparation pipeline calls out to. The pipeline only orchestrates;
//! talking to the wallet, deciding which outputs are returnable, grouping partial payments and building the
//! anonymized breakdown are all done behind these traits.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    amount::Navtoshi,
    error::CollaboratorError,
    types::{Flattened, PendingGroup, PendingTransaction, UnspentOutput},
};

#[async_trait::async_trait]
pub trait WalletClient: Send + Sync {
    /// List the wallet's spendable outputs
    async fn list_unspent(&self) -> Result<Vec<UnspentOutput>, CollaboratorError>;
}

#[async_trait::async_trait]
pub trait UnspentFilter: Send + Sync {
    /// Reduce `unspent` to the received payments in `account_name` that are waiting to be returned
    async fn filter_unspent<W: WalletClient + ?Sized>(
        &self,
        unspent: Vec<UnspentOutput>,
        wallet: &W,
        account_name: &str,
    ) -> Result<Vec<PendingTransaction>, CollaboratorError>;
}

/// Output of a successful grouping call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedPartials {
    /// Groups whose partial outputs have all arrived. `None` means the grouper could not determine a ready set.
    pub ready_to_process: Option<Vec<PendingGroup>>,
    /// Pending transactions that should be returned without going through flattening
    pub transactions_to_return: Option<Vec<PendingTransaction>>,
}

/// A failed grouping call. It may still know which transactions should be returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct GroupPartialsFailure {
    pub reason: String,
    pub transactions_to_return: Option<Vec<PendingTransaction>>,
}

impl GroupPartialsFailure {
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            reason: reason.into(),
            transactions_to_return: None,
        }
    }

    pub fn with_transactions_to_return(mut self, transactions: Vec<PendingTransaction>) -> Self {
        self.transactions_to_return = Some(transactions);
        self
    }
}

#[async_trait::async_trait]
pub trait PartialsGrouper: Send + Sync {
    /// Assemble partial outputs into logical payments and report which are ready to process
    async fn group_partials<W: WalletClient + ?Sized>(
        &self,
        current_pending: Vec<PendingTransaction>,
        wallet: &W,
    ) -> Result<GroupedPartials, GroupPartialsFailure>;
}

#[async_trait::async_trait]
pub trait IncomingFlattener: Send + Sync {
    /// Break `amount_to_flatten` into anonymized sub-payments. `anon_fee_percent` is only supplied on the first
    /// flatten request of a run.
    async fn flatten_incoming(
        &self,
        amount_to_flatten: Navtoshi,
        anon_fee_percent: Option<f64>,
    ) -> Result<Flattened, CollaboratorError>;
}

#[async_trait::async_trait]
impl<T: WalletClient + ?Sized> WalletClient for Arc<T> {
    async fn list_unspent(&self) -> Result<Vec<UnspentOutput>, CollaboratorError> {
        (**self).list_unspent().await
    }
}

#[async_trait::async_trait]
impl<T: UnspentFilter> UnspentFilter for Arc<T> {
    async fn filter_unspent<W: WalletClient + ?Sized>(
        &self,
        unspent: Vec<UnspentOutput>,
        wallet: &W,
        account_name: &str,
    ) -> Result<Vec<PendingTransaction>, CollaboratorError> {
        (**self).filter_unspent(unspent, wallet, account_name).await
    }
}

#[async_trait::async_trait]
impl<T: PartialsGrouper> PartialsGrouper for Arc<T> {
    async fn group_partials<W: WalletClient + ?Sized>(
        &self,
        current_pending: Vec<PendingTransaction>,
        wallet: &W,
    ) -> Result<GroupedPartials, GroupPartialsFailure> {
        (**self).group_partials(current_pending, wallet).await
    }
}

#[async_trait::async_trait]
impl<T: IncomingFlattener + ?Sized> IncomingFlattener for Arc<T> {
    async fn flatten_incoming(
        &self,
        amount_to_flatten: Navtoshi,
        anon_fee_percent: Option<f64>,
    ) -> Result<Flattened, CollaboratorError> {
        (**self).flatten_incoming(amount_to_flatten, anon_fee_percent).await
    }
}
