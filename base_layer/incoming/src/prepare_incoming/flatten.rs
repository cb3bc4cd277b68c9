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

use std::collections::VecDeque;

use log::*;

use crate::{
    diagnostics::{write_log, DiagnosticCode},
    interface::IncomingFlattener,
    types::{FlattenResult, PendingGroup},
};

const LOG_TARGET: &str = "rts::incoming::flatten";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenOutcome {
    pub current_flattened: FlattenResult,
    pub num_flattened: usize,
    /// Set when the driver stopped because no further addresses fit under the cap
    pub capacity_exhausted: bool,
}

/// Requests an anonymized breakdown for each group of a batch, one group at a time and in batch order.
///
/// A group whose breakdown fails is dropped for this cycle and the next group is tried. Breakdowns are accumulated
/// until the batch is exhausted or the next breakdown would take the address count over `max_addresses`.
pub struct FlattenDriver<'a, F: ?Sized> {
    flattener: &'a F,
    max_addresses: usize,
}

impl<'a, F> FlattenDriver<'a, F>
where F: IncomingFlattener + ?Sized
{
    pub fn new(flattener: &'a F, max_addresses: usize) -> Self {
        Self {
            flattener,
            max_addresses,
        }
    }

    /// `anon_fee_percent` is passed on the first flatten request only.
    pub async fn flatten_batch(&self, batch: &[PendingGroup], anon_fee_percent: f64) -> FlattenOutcome {
        let mut remaining = batch.iter().collect::<VecDeque<_>>();
        let mut anon_fee_percent = Some(anon_fee_percent);
        let mut outcome = FlattenOutcome::default();

        while let Some(&group) = remaining.front() {
            let result = self
                .flattener
                .flatten_incoming(group.amount, anon_fee_percent.take())
                .await;

            let flattened = match result {
                Ok(flattened) if !flattened.is_empty() => flattened,
                other => {
                    write_log(DiagnosticCode::FlattenFailed, "failed to flatten transactions", &(
                        &group.unique,
                        group.amount,
                        &other,
                        remaining.len() - 1,
                    ));
                    remaining.pop_front();
                    continue;
                },
            };

            let num_flattened = outcome.num_flattened + flattened.len();
            if num_flattened > self.max_addresses {
                info!(
                    target: LOG_TARGET,
                    "Address cap of {} reached, group {} needs {} more address(es); leaving {} group(s) unflattened",
                    self.max_addresses,
                    group.unique,
                    flattened.len(),
                    remaining.len()
                );
                outcome.capacity_exhausted = true;
                return outcome;
            }

            trace!(
                target: LOG_TARGET,
                "Flattened group {} into {} sub-payment(s)",
                group.unique,
                flattened.len()
            );
            outcome.num_flattened = num_flattened;
            outcome.current_flattened.insert(group.unique.clone(), flattened);
            remaining.pop_front();

            if outcome.num_flattened == self.max_addresses && !remaining.is_empty() {
                info!(
                    target: LOG_TARGET,
                    "Address cap of {} reached exactly, leaving {} group(s) unflattened",
                    self.max_addresses,
                    remaining.len()
                );
                outcome.capacity_exhausted = true;
                return outcome;
            }
        }

        debug!(
            target: LOG_TARGET,
            "Flattened {} of {} group(s) into {} sub-payment(s)",
            outcome.current_flattened.len(),
            batch.len(),
            outcome.num_flattened
        );
        outcome
    }
}
