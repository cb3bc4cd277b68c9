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

use std::{
    collections::BTreeMap,
    fmt,
    fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};

use crate::amount::Navtoshi;

/// Sub-payment amounts produced by flattening a single pending group
pub type Flattened = Vec<Navtoshi>;

/// Accumulated flattening results keyed by [`PendingGroup::unique`]
pub type FlattenResult = BTreeMap<String, Flattened>;

/// A spendable output as reported by the wallet's `listunspent` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    pub txid: String,
    pub vout: u32,
    pub address: String,
    #[serde(default)]
    pub account: Option<String>,
    pub amount: Navtoshi,
    #[serde(default)]
    pub confirmations: u64,
}

impl Display for UnspentOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.txid, self.vout, self.amount)
    }
}

/// An unspent output that has been identified as a received payment waiting to be returned to its sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub unspent: UnspentOutput,
    #[serde(default)]
    pub sender_address: Option<String>,
}

impl PendingTransaction {
    pub fn amount(&self) -> Navtoshi {
        self.unspent.amount
    }
}

/// A logical incoming payment, possibly assembled from several partial outputs, that is ready to be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingGroup {
    /// Identifier used to key this group's flattening result
    pub unique: String,
    pub amount: Navtoshi,
    #[serde(default)]
    pub transactions: Vec<PendingTransaction>,
}

impl PendingGroup {
    pub fn new<S: Into<String>>(unique: S, amount: Navtoshi) -> Self {
        Self {
            unique: unique.into(),
            amount,
            transactions: Vec::new(),
        }
    }
}

impl Display for PendingGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} partial(s))",
            self.unique,
            self.amount,
            self.transactions.len()
        )
    }
}

/// A pending group admitted by the selector, along with the cumulative selected amount including this group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub group: PendingGroup,
    pub running_sum: Navtoshi,
}

/// The ordered subset of pending groups chosen for one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedBatch {
    pub entries: Vec<BatchEntry>,
    pub sum_selected: Navtoshi,
}

impl SelectedBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &PendingGroup> {
        self.entries.iter().map(|e| &e.group)
    }

    pub fn into_groups(self) -> Vec<PendingGroup> {
        self.entries.into_iter().map(|e| e.group).collect()
    }
}

/// The output of a completed preparation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedIncoming {
    /// Every group selected for this cycle, including any that were skipped or left unflattened
    pub current_batch: Vec<PendingGroup>,
    pub current_flattened: FlattenResult,
    pub num_flattened: usize,
    /// Pending transactions that could not be grouped and should be returned without anonymization
    pub pending_to_return: Option<Vec<PendingTransaction>>,
    /// True when flattening stopped because the address cap was reached
    pub capacity_exhausted: bool,
}

impl PreparedIncoming {
    /// Groups from the batch that have a flattening result
    pub fn flattened_groups(&self) -> impl Iterator<Item = &PendingGroup> {
        self.current_batch
            .iter()
            .filter(move |g| self.current_flattened.contains_key(&g.unique))
    }
}
