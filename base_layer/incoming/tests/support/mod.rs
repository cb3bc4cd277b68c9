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

use rts_incoming::{
    amount::Navtoshi,
    test_utils::{
        make_group,
        make_pending,
        make_unspent,
        MockFlattener,
        MockPartialsGrouper,
        MockUnspentFilter,
        MockWalletClient,
    },
    PrepareIncoming,
    PrepareIncomingConfig,
    PrepareIncomingOptions,
    RunSettings,
};

pub type TestPrepareIncoming = PrepareIncoming<MockUnspentFilter, MockPartialsGrouper, MockFlattener>;

pub struct TestContext {
    pub service: TestPrepareIncoming,
    pub wallet: MockWalletClient,
    pub filter: MockUnspentFilter,
    pub grouper: MockPartialsGrouper,
    pub flattener: MockFlattener,
}

impl TestContext {
    pub fn options(&self, outgoing_nav_balance: u64, sub_balance: u64) -> PrepareIncomingOptions<MockWalletClient> {
        PrepareIncomingOptions::new(
            self.wallet.clone(),
            Navtoshi(outgoing_nav_balance),
            Navtoshi(sub_balance),
            RunSettings::new(0.5),
        )
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Per transaction cost of 2 and a cap of 10 addresses
pub fn test_config() -> PrepareIncomingConfig {
    PrepareIncomingConfig {
        sub_chain_tx_fee: Navtoshi(1),
        sub_coins_per_tx: Navtoshi(1),
        max_addresses: 10,
        ..Default::default()
    }
}

/// A context where the wallet reports one unspent output per group and every group is ready to process
pub fn setup(config: PrepareIncomingConfig, amounts: &[u64]) -> TestContext {
    init_logging();
    let names = (0..amounts.len()).map(|i| format!("tx{}", i)).collect::<Vec<_>>();
    let wallet = MockWalletClient::new(
        names
            .iter()
            .zip(amounts)
            .map(|(n, a)| make_unspent(n, *a, "INCOMING"))
            .collect(),
    );
    let filter = MockUnspentFilter::new(names.iter().zip(amounts).map(|(n, a)| make_pending(n, *a)).collect());
    let grouper = MockPartialsGrouper::new(names.iter().zip(amounts).map(|(n, a)| make_group(n, *a)).collect());
    let flattener = MockFlattener::new();
    let service = PrepareIncoming::new(config, filter.clone(), grouper.clone(), flattener.clone()).unwrap();
    TestContext {
        service,
        wallet,
        filter,
        grouper,
        flattener,
    }
}

pub fn split(n: u64) -> Vec<Navtoshi> {
    (0..n).map(|i| Navtoshi(i + 1)).collect()
}
