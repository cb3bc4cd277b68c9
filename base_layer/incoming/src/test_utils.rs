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

//! Mock collaborators for exercising the preparation pipeline without a wallet.
//!
//! Every mock is cheap to clone; clones share state, so a test can keep a handle to inspect the recorded calls after
//! handing the mock to the pipeline.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use crate::{
    amount::Navtoshi,
    error::CollaboratorError,
    interface::{
        GroupPartialsFailure,
        GroupedPartials,
        IncomingFlattener,
        PartialsGrouper,
        UnspentFilter,
        WalletClient,
    },
    types::{Flattened, PendingGroup, PendingTransaction, UnspentOutput},
};

macro_rules! acquire_lock {
    ($e:expr) => {
        match $e.lock() {
            Ok(lock) => lock,
            Err(poisoned) => {
                log::warn!(
                    target: "rts::incoming::test_utils",
                    "Lock has been POISONED and will be silently recovered"
                );
                poisoned.into_inner()
            },
        }
    };
}

pub fn make_unspent(txid: &str, amount: u64, account: &str) -> UnspentOutput {
    UnspentOutput {
        txid: txid.to_string(),
        vout: 0,
        address: format!("addr-{}", txid),
        account: Some(account.to_string()),
        amount: Navtoshi(amount),
        confirmations: 6,
    }
}

pub fn make_pending(txid: &str, amount: u64) -> PendingTransaction {
    PendingTransaction {
        unspent: make_unspent(txid, amount, "INCOMING"),
        sender_address: Some(format!("sender-{}", txid)),
    }
}

pub fn make_group(unique: &str, amount: u64) -> PendingGroup {
    PendingGroup {
        unique: unique.to_string(),
        amount: Navtoshi(amount),
        transactions: vec![make_pending(unique, amount)],
    }
}

#[derive(Clone)]
pub struct MockWalletClient {
    response: Arc<Mutex<Result<Vec<UnspentOutput>, CollaboratorError>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockWalletClient {
    pub fn new(unspent: Vec<UnspentOutput>) -> Self {
        Self {
            response: Arc::new(Mutex::new(Ok(unspent))),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn set_response(&self, response: Result<Vec<UnspentOutput>, CollaboratorError>) {
        *acquire_lock!(self.response) = response;
    }

    pub fn list_unspent_calls(&self) -> usize {
        *acquire_lock!(self.calls)
    }
}

#[async_trait::async_trait]
impl WalletClient for MockWalletClient {
    async fn list_unspent(&self) -> Result<Vec<UnspentOutput>, CollaboratorError> {
        *acquire_lock!(self.calls) += 1;
        acquire_lock!(self.response).clone()
    }
}

#[derive(Clone)]
pub struct MockUnspentFilter {
    response: Arc<Mutex<Result<Vec<PendingTransaction>, CollaboratorError>>>,
    calls: Arc<Mutex<Vec<(usize, String)>>>,
}

impl MockUnspentFilter {
    pub fn new(current_pending: Vec<PendingTransaction>) -> Self {
        Self {
            response: Arc::new(Mutex::new(Ok(current_pending))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_response(&self, response: Result<Vec<PendingTransaction>, CollaboratorError>) {
        *acquire_lock!(self.response) = response;
    }

    /// The number of unspent outputs and the account name of each call
    pub fn take_calls(&self) -> Vec<(usize, String)> {
        acquire_lock!(self.calls).drain(..).collect()
    }
}

#[async_trait::async_trait]
impl UnspentFilter for MockUnspentFilter {
    async fn filter_unspent<W: WalletClient + ?Sized>(
        &self,
        unspent: Vec<UnspentOutput>,
        _wallet: &W,
        account_name: &str,
    ) -> Result<Vec<PendingTransaction>, CollaboratorError> {
        acquire_lock!(self.calls).push((unspent.len(), account_name.to_string()));
        acquire_lock!(self.response).clone()
    }
}

#[derive(Clone)]
pub struct MockPartialsGrouper {
    response: Arc<Mutex<Result<GroupedPartials, GroupPartialsFailure>>>,
    calls: Arc<Mutex<Vec<Vec<PendingTransaction>>>>,
}

impl MockPartialsGrouper {
    pub fn new(ready_to_process: Vec<PendingGroup>) -> Self {
        Self {
            response: Arc::new(Mutex::new(Ok(GroupedPartials {
                ready_to_process: Some(ready_to_process),
                transactions_to_return: None,
            }))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_response(&self, response: Result<GroupedPartials, GroupPartialsFailure>) {
        *acquire_lock!(self.response) = response;
    }

    pub fn take_calls(&self) -> Vec<Vec<PendingTransaction>> {
        acquire_lock!(self.calls).drain(..).collect()
    }
}

#[async_trait::async_trait]
impl PartialsGrouper for MockPartialsGrouper {
    async fn group_partials<W: WalletClient + ?Sized>(
        &self,
        current_pending: Vec<PendingTransaction>,
        _wallet: &W,
    ) -> Result<GroupedPartials, GroupPartialsFailure> {
        acquire_lock!(self.calls).push(current_pending);
        acquire_lock!(self.response).clone()
    }
}

/// Replays queued responses in order, then falls back to the default response
#[derive(Clone)]
pub struct MockFlattener {
    responses: Arc<Mutex<VecDeque<Result<Flattened, CollaboratorError>>>>,
    default_response: Arc<Mutex<Result<Flattened, CollaboratorError>>>,
    calls: Arc<Mutex<Vec<(Navtoshi, Option<f64>)>>>,
}

impl MockFlattener {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            default_response: Arc::new(Mutex::new(Err(CollaboratorError::Rejected(
                "no response queued".to_string(),
            )))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push_response(&self, response: Result<Flattened, CollaboratorError>) {
        acquire_lock!(self.responses).push_back(response);
    }

    pub fn set_default_response(&self, response: Result<Flattened, CollaboratorError>) {
        *acquire_lock!(self.default_response) = response;
    }

    /// The amount and fee percentage of each flatten request
    pub fn take_calls(&self) -> Vec<(Navtoshi, Option<f64>)> {
        acquire_lock!(self.calls).drain(..).collect()
    }
}

impl Default for MockFlattener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IncomingFlattener for MockFlattener {
    async fn flatten_incoming(
        &self,
        amount_to_flatten: Navtoshi,
        anon_fee_percent: Option<f64>,
    ) -> Result<Flattened, CollaboratorError> {
        acquire_lock!(self.calls).push((amount_to_flatten, anon_fee_percent));
        let queued = acquire_lock!(self.responses).pop_front();
        queued.unwrap_or_else(|| acquire_lock!(self.default_response).clone())
    }
}
