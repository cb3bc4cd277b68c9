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

use std::sync::atomic::{AtomicU64, Ordering};

use log::*;

use crate::{
    amount::Navtoshi,
    config::{PrepareIncomingConfig, RunSettings},
    diagnostics::{write_log, DiagnosticCode},
    error::{PrepareIncomingError, PrepareIncomingFailure},
    interface::{GroupedPartials, IncomingFlattener, PartialsGrouper, UnspentFilter, WalletClient},
    prepare_incoming::{
        flatten::FlattenDriver,
        selection::BatchSelector,
        state::{PipelineState, RuntimeState},
    },
    types::PreparedIncoming,
};

const LOG_TARGET: &str = "rts::incoming::prepare_incoming";

/// Inputs to a single run. Every field is required; a run with a missing field fails before calling any collaborator.
pub struct PrepareIncomingOptions<W> {
    pub wallet_client: Option<W>,
    /// Ceiling on the summed amount of the selected batch
    pub outgoing_nav_balance: Option<Navtoshi>,
    /// Spendable sub-chain balance that pays for the batch's transactions
    pub sub_balance: Option<Navtoshi>,
    pub settings: Option<RunSettings>,
}

impl<W> PrepareIncomingOptions<W> {
    pub fn new(wallet_client: W, outgoing_nav_balance: Navtoshi, sub_balance: Navtoshi, settings: RunSettings) -> Self {
        Self {
            wallet_client: Some(wallet_client),
            outgoing_nav_balance: Some(outgoing_nav_balance),
            sub_balance: Some(sub_balance),
            settings: Some(settings),
        }
    }

    fn into_runtime_state(self, run_id: u64) -> Result<RuntimeState<W>, PrepareIncomingError> {
        match (
            self.wallet_client,
            self.outgoing_nav_balance,
            self.sub_balance,
            self.settings,
        ) {
            (Some(wallet_client), Some(outgoing_nav_balance), Some(sub_balance), Some(settings)) => {
                if !settings.anon_fee_percent.is_finite() || settings.anon_fee_percent < 0.0 {
                    return Err(PrepareIncomingError::InvalidAnonFeePercent(settings.anon_fee_percent));
                }
                Ok(RuntimeState::new(
                    run_id,
                    wallet_client,
                    outgoing_nav_balance,
                    sub_balance,
                    settings,
                ))
            },
            (wallet_client, outgoing_nav_balance, sub_balance, settings) => {
                let missing = [
                    ("wallet_client", wallet_client.is_none()),
                    ("outgoing_nav_balance", outgoing_nav_balance.is_none()),
                    ("sub_balance", sub_balance.is_none()),
                    ("settings", settings.is_none()),
                ]
                .iter()
                .filter(|(_, is_missing)| *is_missing)
                .map(|(name, _)| *name)
                .collect();
                Err(PrepareIncomingError::InvalidOptions { missing })
            },
        }
    }
}

/// What the completion callback of [`PrepareIncoming::run_with_callback`] receives
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareIncomingReport {
    /// Everything known when the run terminated, whether it succeeded or not
    pub prepared: PreparedIncoming,
    pub error: Option<PrepareIncomingError>,
}

/// Prepares the payments received by the wallet for anonymized return to their senders.
///
/// A run lists the wallet's unspent outputs, filters them down to payments pending return, groups partial payments,
/// selects the batch that fits this cycle's balances and finally flattens each selected group into anonymized
/// sub-payments. Steps run strictly in sequence and the first step without a usable result ends the run.
///
/// Runs are independent; one `PrepareIncoming` may drive several concurrently, each with its own state. Callers
/// should still serialize runs against the same wallet account, since balances are snapshots taken by the caller.
pub struct PrepareIncoming<TFilter, TGrouper, TFlattener> {
    config: PrepareIncomingConfig,
    filter: TFilter,
    grouper: TGrouper,
    flattener: TFlattener,
    next_run_id: AtomicU64,
}

impl<TFilter, TGrouper, TFlattener> PrepareIncoming<TFilter, TGrouper, TFlattener>
where
    TFilter: UnspentFilter,
    TGrouper: PartialsGrouper,
    TFlattener: IncomingFlattener,
{
    pub fn new(
        config: PrepareIncomingConfig,
        filter: TFilter,
        grouper: TGrouper,
        flattener: TFlattener,
    ) -> Result<Self, PrepareIncomingError> {
        config.validate()?;
        Ok(Self {
            config,
            filter,
            grouper,
            flattener,
            next_run_id: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &PrepareIncomingConfig {
        &self.config
    }

    /// Execute one run
    pub async fn run<W: WalletClient>(
        &self,
        options: PrepareIncomingOptions<W>,
    ) -> Result<PreparedIncoming, PrepareIncomingFailure> {
        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let mut state = match options.into_runtime_state(run_id) {
            Ok(state) => state,
            Err(e) => {
                write_log(DiagnosticCode::InvalidOptions, "invalid options", &(run_id, &e));
                return Err(PrepareIncomingFailure::new(e));
            },
        };

        debug!(
            target: LOG_TARGET,
            "Starting prepare incoming run {} (outgoing balance: {}, sub balance: {})",
            run_id,
            state.outgoing_nav_balance,
            state.sub_balance
        );
        match self.execute(&mut state).await {
            Ok(()) => Ok(state.finish()),
            Err(e) => Err(state.fail(e)),
        }
    }

    /// Execute one run and report the outcome to `callback`, which is called exactly once
    pub async fn run_with_callback<W, C>(&self, options: PrepareIncomingOptions<W>, callback: C)
    where
        W: WalletClient,
        C: FnOnce(bool, PrepareIncomingReport),
    {
        match self.run(options).await {
            Ok(prepared) => callback(true, PrepareIncomingReport { prepared, error: None }),
            Err(failure) => callback(false, PrepareIncomingReport {
                prepared: failure.partial,
                error: Some(failure.error),
            }),
        }
    }

    async fn execute<W: WalletClient>(&self, state: &mut RuntimeState<W>) -> Result<(), PrepareIncomingError> {
        let unspent = state
            .wallet_client
            .list_unspent()
            .await
            .map_err(PrepareIncomingError::ListUnspentFailed)?;
        if unspent.is_empty() {
            return Err(PrepareIncomingError::NoUnspentOutputs);
        }
        trace!(target: LOG_TARGET, "Run {}: {} unspent output(s)", state.run_id, unspent.len());

        state.transition(PipelineState::Filtering);
        let account_name = self.config.account_name()?;
        let current_pending = self
            .filter
            .filter_unspent(unspent, &state.wallet_client, account_name)
            .await
            .map_err(PrepareIncomingError::FilterUnspentFailed)?;
        if current_pending.is_empty() {
            return Err(PrepareIncomingError::NoCurrentPending);
        }
        trace!(
            target: LOG_TARGET,
            "Run {}: {} pending to return in account {}",
            state.run_id,
            current_pending.len(),
            account_name
        );

        state.transition(PipelineState::Grouping);
        let grouped = match self.grouper.group_partials(current_pending, &state.wallet_client).await {
            Ok(grouped) => grouped,
            Err(failure) => {
                state.transactions_to_return = failure.transactions_to_return;
                return Err(PrepareIncomingError::GroupPartialsFailed(failure.reason));
            },
        };
        let GroupedPartials {
            ready_to_process,
            transactions_to_return,
        } = grouped;
        state.transactions_to_return = transactions_to_return;
        let ready_to_process = match ready_to_process {
            Some(ready) if !ready.is_empty() => ready,
            _ => return Err(PrepareIncomingError::NothingReadyToProcess),
        };

        state.transition(PipelineState::Selecting);
        let batch = BatchSelector::new(self.config.per_tx_cost()).select(
            &ready_to_process,
            state.sub_balance,
            state.outgoing_nav_balance,
        )?;
        state.current_batch = batch.into_groups();

        state.transition(PipelineState::Flattening);
        let outcome = FlattenDriver::new(&self.flattener, self.config.max_addresses)
            .flatten_batch(&state.current_batch, state.settings.anon_fee_percent)
            .await;
        state.current_flattened = outcome.current_flattened;
        state.num_flattened = outcome.num_flattened;
        state.capacity_exhausted = outcome.capacity_exhausted;
        if state.current_flattened.is_empty() && !state.capacity_exhausted {
            return Err(PrepareIncomingError::NothingFlattened);
        }
        Ok(())
    }
}
