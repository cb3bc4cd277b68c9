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

use crate::{
    amount::Navtoshi,
    error::SelectionError,
    types::{BatchEntry, PendingGroup, SelectedBatch},
};

const LOG_TARGET: &str = "rts::incoming::selection";

/// First-fit selection of pending groups under two simultaneous budgets:
///
/// - the sub-chain cost of the batch, `count * per_tx_cost`, must not exceed the spendable sub-balance
/// - the summed amount of the batch must stay strictly below the outgoing balance ceiling
///
/// Groups are considered once each, in the order supplied. A group that does not fit is skipped for the rest of the
/// pass, so an affordable combination further down the list may be missed.
#[derive(Debug, Clone, Copy)]
pub struct BatchSelector {
    per_tx_cost: Navtoshi,
}

impl BatchSelector {
    pub fn new(per_tx_cost: Navtoshi) -> Self {
        Self { per_tx_cost }
    }

    pub fn select(
        &self,
        ready_to_process: &[PendingGroup],
        sub_balance: Navtoshi,
        max_amount: Navtoshi,
    ) -> Result<SelectedBatch, SelectionError> {
        self.check_params(ready_to_process, sub_balance, max_amount)?;

        debug!(
            target: LOG_TARGET,
            "Selecting from {} ready group(s), sub balance: {}, max amount: {}, per tx cost: {}",
            ready_to_process.len(),
            sub_balance,
            max_amount,
            self.per_tx_cost
        );

        let mut batch = SelectedBatch::default();
        for group in ready_to_process {
            let fee_cost = self.per_tx_cost.checked_mul(batch.len() as u64 + 1);
            let within_fee_budget = fee_cost.map(|cost| cost <= sub_balance).unwrap_or(false);
            let running_sum = batch.sum_selected.checked_add(group.amount);
            let within_max_amount = running_sum.map(|sum| sum < max_amount).unwrap_or(false);

            match running_sum {
                Some(running_sum) if within_fee_budget && within_max_amount => {
                    trace!(target: LOG_TARGET, "Admitting group {}, running sum {}", group, running_sum);
                    batch.sum_selected = running_sum;
                    batch.entries.push(BatchEntry {
                        group: group.clone(),
                        running_sum,
                    });
                },
                _ => {
                    trace!(
                        target: LOG_TARGET,
                        "Skipping group {} (within fee budget: {}, within max amount: {})",
                        group,
                        within_fee_budget,
                        within_max_amount
                    );
                },
            }
        }

        if batch.is_empty() {
            return Err(SelectionError::NothingSelected);
        }
        debug!(
            target: LOG_TARGET,
            "Selected {} of {} group(s) totalling {}",
            batch.len(),
            ready_to_process.len(),
            batch.sum_selected
        );
        Ok(batch)
    }

    fn check_params(
        &self,
        ready_to_process: &[PendingGroup],
        sub_balance: Navtoshi,
        max_amount: Navtoshi,
    ) -> Result<(), SelectionError> {
        if ready_to_process.is_empty() {
            return Err(SelectionError::InvalidParams("ready_to_process is empty"));
        }
        if sub_balance.is_zero() {
            return Err(SelectionError::InvalidParams("sub_balance must be positive"));
        }
        if max_amount.is_zero() {
            return Err(SelectionError::InvalidParams("max_amount must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn groups(amounts: &[u64]) -> Vec<PendingGroup> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| PendingGroup::new(format!("group-{}", i), Navtoshi(*a)))
            .collect()
    }

    fn uniques(batch: &SelectedBatch) -> Vec<&str> {
        batch.groups().map(|g| g.unique.as_str()).collect()
    }

    #[test]
    fn it_admits_groups_in_order_within_both_budgets() {
        // per tx cost 1 + 1, sub balance covers exactly two transactions
        let selector = BatchSelector::new(Navtoshi(2));
        let batch = selector.select(&groups(&[5, 3, 4]), Navtoshi(4), Navtoshi(10)).unwrap();
        assert_eq!(uniques(&batch), vec!["group-0", "group-1"]);
        assert_eq!(batch.sum_selected, Navtoshi(8));
        assert_eq!(batch.entries[0].running_sum, Navtoshi(5));
        assert_eq!(batch.entries[1].running_sum, Navtoshi(8));
    }

    #[test]
    fn it_rejects_a_group_that_reaches_the_max_amount_exactly() {
        let selector = BatchSelector::new(Navtoshi(1));
        let batch = selector.select(&groups(&[6, 4, 3]), Navtoshi(100), Navtoshi(10)).unwrap();
        assert_eq!(uniques(&batch), vec!["group-0", "group-2"]);
        assert_eq!(batch.sum_selected, Navtoshi(9));
    }

    #[test]
    fn it_accepts_a_fee_cost_equal_to_the_sub_balance() {
        let selector = BatchSelector::new(Navtoshi(5));
        let batch = selector.select(&groups(&[1, 1, 1]), Navtoshi(10), Navtoshi(100)).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn it_does_not_reconsider_skipped_groups() {
        // group-0 is too big, group-1 fits, group-2 would fit alone but the pair overflows
        let selector = BatchSelector::new(Navtoshi(1));
        let batch = selector.select(&groups(&[20, 7, 3]), Navtoshi(100), Navtoshi(10)).unwrap();
        assert_eq!(uniques(&batch), vec!["group-1"]);
    }

    #[test]
    fn it_fails_with_zero_sub_balance() {
        let selector = BatchSelector::new(Navtoshi(1));
        let err = selector.select(&groups(&[1, 2]), Navtoshi(0), Navtoshi(10)).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidParams(_)));
    }

    #[test]
    fn it_fails_with_invalid_params() {
        let selector = BatchSelector::new(Navtoshi(1));
        assert!(matches!(
            selector.select(&[], Navtoshi(10), Navtoshi(10)),
            Err(SelectionError::InvalidParams(_))
        ));
        assert!(matches!(
            selector.select(&groups(&[1]), Navtoshi(10), Navtoshi(0)),
            Err(SelectionError::InvalidParams(_))
        ));
    }

    #[test]
    fn it_fails_when_nothing_fits() {
        let selector = BatchSelector::new(Navtoshi(10));
        assert_eq!(
            selector.select(&groups(&[1, 2]), Navtoshi(9), Navtoshi(100)),
            Err(SelectionError::NothingSelected)
        );
        let selector = BatchSelector::new(Navtoshi(1));
        assert_eq!(
            selector.select(&groups(&[10, 11]), Navtoshi(9), Navtoshi(10)),
            Err(SelectionError::NothingSelected)
        );
    }

    #[test]
    fn it_handles_amounts_near_overflow() {
        let selector = BatchSelector::new(Navtoshi(u64::MAX / 2 + 1));
        let batch = selector
            .select(&groups(&[u64::MAX - 1, 1, 1]), Navtoshi(u64::MAX), Navtoshi(u64::MAX))
            .unwrap();
        assert_eq!(uniques(&batch), vec!["group-0"]);
    }

    #[test]
    fn it_never_exceeds_either_budget_and_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let per_tx_cost = Navtoshi(rng.gen_range(1..50));
            let amounts = (0..rng.gen_range(1..20))
                .map(|_| rng.gen_range(1..1_000))
                .collect::<Vec<u64>>();
            let sub_balance = Navtoshi(rng.gen_range(1..500));
            let max_amount = Navtoshi(rng.gen_range(1..5_000));
            let ready = groups(&amounts);
            let selector = BatchSelector::new(per_tx_cost);

            let first = selector.select(&ready, sub_balance, max_amount);
            assert_eq!(first, selector.select(&ready, sub_balance, max_amount));
            if let Ok(batch) = first {
                assert!(per_tx_cost * batch.len() as u64 <= sub_balance);
                assert!(batch.sum_selected < max_amount);
                assert_eq!(batch.groups().map(|g| g.amount).sum::<Navtoshi>(), batch.sum_selected);
                // selection preserves input order
                let positions = batch
                    .groups()
                    .map(|g| ready.iter().position(|r| r.unique == g.unique).unwrap())
                    .collect::<Vec<_>>();
                assert!(positions.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
