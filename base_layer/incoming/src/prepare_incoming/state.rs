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

use log::*;
use strum_macros::Display;

use crate::{
    amount::Navtoshi,
    config::RunSettings,
    diagnostics::write_log,
    error::{PrepareIncomingError, PrepareIncomingFailure},
    types::{FlattenResult, PendingGroup, PendingTransaction, PreparedIncoming},
};

const LOG_TARGET: &str = "rts::incoming::prepare_incoming::state";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PipelineState {
    FetchingUnspent,
    Filtering,
    Grouping,
    Selecting,
    Flattening,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

/// Everything one preparation run knows. Owned by the run and dropped when it completes.
pub struct RuntimeState<W> {
    pub run_id: u64,
    pub wallet_client: W,
    pub outgoing_nav_balance: Navtoshi,
    pub sub_balance: Navtoshi,
    pub settings: RunSettings,
    pub transactions_to_return: Option<Vec<PendingTransaction>>,
    pub current_batch: Vec<PendingGroup>,
    pub current_flattened: FlattenResult,
    pub num_flattened: usize,
    pub capacity_exhausted: bool,
    state: PipelineState,
}

impl<W> RuntimeState<W> {
    pub fn new(
        run_id: u64,
        wallet_client: W,
        outgoing_nav_balance: Navtoshi,
        sub_balance: Navtoshi,
        settings: RunSettings,
    ) -> Self {
        Self {
            run_id,
            wallet_client,
            outgoing_nav_balance,
            sub_balance,
            settings,
            transactions_to_return: None,
            current_batch: Vec::new(),
            current_flattened: FlattenResult::new(),
            num_flattened: 0,
            capacity_exhausted: false,
            state: PipelineState::FetchingUnspent,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn transition(&mut self, next: PipelineState) {
        debug!(
            target: LOG_TARGET,
            "Prepare incoming run {}: {} -> {}", self.run_id, self.state, next
        );
        self.state = next;
    }

    /// Complete the run successfully
    pub fn finish(mut self) -> PreparedIncoming {
        self.transition(PipelineState::Done);
        info!(
            target: LOG_TARGET,
            "Prepare incoming run {} done: {} group(s) in batch, {} flattened into {} address(es){}",
            self.run_id,
            self.current_batch.len(),
            self.current_flattened.len(),
            self.num_flattened,
            if self.capacity_exhausted { ", address cap reached" } else { "" }
        );
        self.into_prepared()
    }

    /// Complete the run with `error`, keeping whatever was computed so far
    pub fn fail(mut self, error: PrepareIncomingError) -> PrepareIncomingFailure {
        let failed_in = self.state;
        self.transition(PipelineState::Failed);
        write_log(error.diagnostic_code(), &error.to_string(), &(
            self.run_id,
            failed_in,
            self.outgoing_nav_balance,
            self.sub_balance,
            self.current_batch.len(),
            self.transactions_to_return.as_ref().map(Vec::len),
        ));
        PrepareIncomingFailure::with_partial(error, self.into_prepared())
    }

    fn into_prepared(self) -> PreparedIncoming {
        PreparedIncoming {
            current_batch: self.current_batch,
            current_flattened: self.current_flattened,
            num_flattened: self.num_flattened,
            pending_to_return: self.transactions_to_return,
            capacity_exhausted: self.capacity_exhausted,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{error::ErrorKind, test_utils::make_pending};

    fn state() -> RuntimeState<()> {
        RuntimeState::new(1, (), Navtoshi(10), Navtoshi(4), RunSettings::new(0.5))
    }

    #[test]
    fn it_starts_fetching_unspent() {
        let state = state();
        assert_eq!(state.state(), PipelineState::FetchingUnspent);
        assert!(!state.state().is_terminal());
        assert_eq!(PipelineState::Flattening.to_string(), "Flattening");
    }

    #[test]
    fn fail_keeps_partial_data() {
        let mut state = state();
        state.transition(PipelineState::Selecting);
        state.transactions_to_return = Some(vec![make_pending("tx1", 3)]);
        let failure = state.fail(PrepareIncomingError::NothingReadyToProcess);
        assert_eq!(failure.kind(), ErrorKind::UpstreamEmpty);
        assert_eq!(failure.pending_to_return().unwrap().len(), 1);
    }

    #[test]
    fn finish_reports_accumulated_results() {
        let mut state = state();
        state.num_flattened = 2;
        state.current_flattened.insert("g".into(), vec![Navtoshi(1), Navtoshi(2)]);
        let prepared = state.finish();
        assert_eq!(prepared.num_flattened, 2);
        assert!(prepared.pending_to_return.is_none());
    }
}
