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
    io::Write,
    sync::atomic::{AtomicUsize, Ordering},
};

use rts_common::load_configuration;
use rts_incoming::{
    amount::Navtoshi,
    error::{CollaboratorError, ErrorKind, PrepareIncomingError, SelectionError},
    interface::{GroupPartialsFailure, GroupedPartials},
    test_utils::{make_group, make_pending},
    PrepareIncomingConfig,
    PrepareIncomingOptions,
    RunSettings,
};

mod support;
use support::{setup, split, test_config};

#[tokio::test]
async fn it_selects_and_flattens_the_affordable_groups() {
    let ctx = setup(test_config(), &[5, 3, 4]);
    ctx.flattener.set_default_response(Ok(split(2)));

    // sub balance 4 pays for two transactions at a cost of 2 each
    let prepared = ctx.service.run(ctx.options(10, 4)).await.unwrap();

    let batch = prepared.current_batch.iter().map(|g| g.unique.as_str()).collect::<Vec<_>>();
    assert_eq!(batch, vec!["tx0", "tx1"]);
    assert_eq!(prepared.current_flattened.len(), 2);
    assert_eq!(prepared.num_flattened, 4);
    assert!(!prepared.capacity_exhausted);
    assert!(prepared.pending_to_return.is_none());
    let amounts = ctx.flattener.take_calls().into_iter().map(|(a, _)| a).collect::<Vec<_>>();
    assert_eq!(amounts, vec![Navtoshi(5), Navtoshi(3)]);
}

#[tokio::test]
async fn it_passes_the_fee_percentage_on_the_first_flatten_only() {
    let ctx = setup(test_config(), &[1, 2, 3]);
    ctx.flattener.push_response(Err(CollaboratorError::Rejected("busy".into())));
    ctx.flattener.set_default_response(Ok(split(1)));

    ctx.service.run(ctx.options(100, 100)).await.unwrap();

    let fees = ctx.flattener.take_calls().into_iter().map(|(_, f)| f).collect::<Vec<_>>();
    assert_eq!(fees, vec![Some(0.5), None, None]);
}

#[tokio::test]
async fn it_short_circuits_on_an_empty_unspent_list() {
    let ctx = setup(test_config(), &[5]);
    ctx.wallet.set_response(Ok(Vec::new()));

    let failure = ctx.service.run(ctx.options(10, 4)).await.unwrap_err();

    assert_eq!(failure.error, PrepareIncomingError::NoUnspentOutputs);
    assert_eq!(failure.kind(), ErrorKind::UpstreamEmpty);
    assert!(ctx.filter.take_calls().is_empty());
    assert!(ctx.grouper.take_calls().is_empty());
    assert!(ctx.flattener.take_calls().is_empty());
}

#[tokio::test]
async fn it_fails_when_listing_unspent_errors() {
    let ctx = setup(test_config(), &[5]);
    ctx.wallet
        .set_response(Err(CollaboratorError::WalletRpc("connection refused".into())));

    let failure = ctx.service.run(ctx.options(10, 4)).await.unwrap_err();

    assert!(matches!(failure.error, PrepareIncomingError::ListUnspentFailed(_)));
    assert_eq!(failure.kind(), ErrorKind::UpstreamFailure);
    assert!(ctx.filter.take_calls().is_empty());
}

#[tokio::test]
async fn it_filters_with_the_configured_account() {
    let mut config = test_config();
    config.accounts.insert(rts_common::ServerType::Incoming, "RTS_IN".to_string());
    let ctx = setup(config, &[5, 3]);
    ctx.flattener.set_default_response(Ok(split(1)));

    ctx.service.run(ctx.options(10, 4)).await.unwrap();

    assert_eq!(ctx.filter.take_calls(), vec![(2, "RTS_IN".to_string())]);
    assert_eq!(ctx.grouper.take_calls()[0].len(), 2);
}

#[tokio::test]
async fn it_fails_when_nothing_is_pending() {
    let ctx = setup(test_config(), &[5]);
    ctx.filter.set_response(Ok(Vec::new()));

    let failure = ctx.service.run(ctx.options(10, 4)).await.unwrap_err();

    assert_eq!(failure.error, PrepareIncomingError::NoCurrentPending);
    assert!(ctx.grouper.take_calls().is_empty());

    ctx.filter.set_response(Err(CollaboratorError::MalformedResponse("bad".into())));
    let failure = ctx.service.run(ctx.options(10, 4)).await.unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::UpstreamFailure);
}

#[tokio::test]
async fn it_surfaces_transactions_to_return_when_grouping_fails() {
    let ctx = setup(test_config(), &[5]);
    let to_return = vec![make_pending("orphan", 7)];
    ctx.grouper.set_response(Err(
        GroupPartialsFailure::new("partial timed out").with_transactions_to_return(to_return.clone())
    ));

    let failure = ctx.service.run(ctx.options(10, 4)).await.unwrap_err();

    assert_eq!(
        failure.error,
        PrepareIncomingError::GroupPartialsFailed("partial timed out".to_string())
    );
    assert_eq!(failure.pending_to_return(), Some(&to_return));
    assert!(ctx.flattener.take_calls().is_empty());
}

#[tokio::test]
async fn it_surfaces_transactions_to_return_when_nothing_is_ready() {
    let ctx = setup(test_config(), &[5]);
    let to_return = vec![make_pending("orphan", 7)];
    ctx.grouper.set_response(Ok(GroupedPartials {
        ready_to_process: None,
        transactions_to_return: Some(to_return.clone()),
    }));

    let failure = ctx.service.run(ctx.options(10, 4)).await.unwrap_err();

    assert_eq!(failure.error, PrepareIncomingError::NothingReadyToProcess);
    assert_eq!(failure.partial.pending_to_return, Some(to_return));
}

#[tokio::test]
async fn it_keeps_transactions_to_return_when_nothing_is_selected() {
    let ctx = setup(test_config(), &[50, 60]);
    let to_return = vec![make_pending("orphan", 7)];
    ctx.grouper.set_response(Ok(GroupedPartials {
        ready_to_process: Some(vec![make_group("big", 50), make_group("bigger", 60)]),
        transactions_to_return: Some(to_return.clone()),
    }));

    let failure = ctx.service.run(ctx.options(10, 4)).await.unwrap_err();

    assert_eq!(
        failure.error,
        PrepareIncomingError::Selection(SelectionError::NothingSelected)
    );
    assert_eq!(failure.pending_to_return(), Some(&to_return));
    assert!(ctx.flattener.take_calls().is_empty());
}

#[tokio::test]
async fn it_rejects_a_zero_sub_balance() {
    let ctx = setup(test_config(), &[5]);

    let failure = ctx.service.run(ctx.options(10, 0)).await.unwrap_err();

    assert!(matches!(
        failure.error,
        PrepareIncomingError::Selection(SelectionError::InvalidParams(_))
    ));
    assert!(failure.partial.current_batch.is_empty());
}

#[tokio::test]
async fn it_stops_flattening_at_the_address_cap() {
    let config = PrepareIncomingConfig {
        max_addresses: 4,
        ..test_config()
    };
    let ctx = setup(config, &[2, 3]);
    ctx.flattener.push_response(Ok(split(4)));
    ctx.flattener.push_response(Ok(split(1)));

    let prepared = ctx.service.run(ctx.options(100, 100)).await.unwrap();

    assert!(prepared.capacity_exhausted);
    assert_eq!(prepared.num_flattened, 4);
    assert_eq!(prepared.current_batch.len(), 2);
    assert!(prepared.current_flattened.contains_key("tx0"));
    assert!(!prepared.current_flattened.contains_key("tx1"));
    assert_eq!(prepared.flattened_groups().count(), 1);
}

#[tokio::test]
async fn it_skips_a_group_that_fails_to_flatten() {
    let ctx = setup(test_config(), &[2, 3]);
    ctx.flattener.push_response(Err(CollaboratorError::Rejected("no".into())));
    ctx.flattener.push_response(Ok(split(3)));

    let prepared = ctx.service.run(ctx.options(100, 100)).await.unwrap();

    assert_eq!(prepared.current_flattened.keys().map(String::as_str).collect::<Vec<_>>(), vec!["tx1"]);
    assert_eq!(prepared.num_flattened, 3);
    // the skipped group is still part of the reported batch
    assert_eq!(prepared.current_batch.len(), 2);
}

#[tokio::test]
async fn it_fails_when_no_group_can_be_flattened() {
    let ctx = setup(test_config(), &[2, 3]);
    ctx.flattener
        .set_default_response(Err(CollaboratorError::Rejected("no".into())));

    let failure = ctx.service.run(ctx.options(100, 100)).await.unwrap_err();

    assert_eq!(failure.error, PrepareIncomingError::NothingFlattened);
    assert_eq!(failure.partial.current_batch.len(), 2);
    assert!(failure.partial.current_flattened.is_empty());
    assert_eq!(ctx.flattener.take_calls().len(), 2);
}

#[tokio::test]
async fn it_rejects_missing_options_before_calling_the_wallet() {
    let ctx = setup(test_config(), &[5]);
    let options = PrepareIncomingOptions {
        wallet_client: Some(ctx.wallet.clone()),
        outgoing_nav_balance: None,
        sub_balance: Some(Navtoshi(4)),
        settings: None,
    };

    let failure = ctx.service.run(options).await.unwrap_err();

    assert_eq!(failure.error, PrepareIncomingError::InvalidOptions {
        missing: vec!["outgoing_nav_balance", "settings"]
    });
    assert_eq!(ctx.wallet.list_unspent_calls(), 0);
}

#[tokio::test]
async fn it_calls_back_exactly_once() {
    let ctx = setup(test_config(), &[5, 3]);
    ctx.flattener.set_default_response(Ok(split(1)));
    let calls = AtomicUsize::new(0);

    ctx.service
        .run_with_callback(ctx.options(10, 4), |success, report| {
            calls.fetch_add(1, Ordering::SeqCst);
            assert!(success);
            assert!(report.error.is_none());
            assert_eq!(report.prepared.num_flattened, 2);
        })
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    ctx.wallet.set_response(Ok(Vec::new()));
    ctx.service
        .run_with_callback(ctx.options(10, 4), |success, report| {
            calls.fetch_add(1, Ordering::SeqCst);
            assert!(!success);
            assert_eq!(report.error, Some(PrepareIncomingError::NoUnspentOutputs));
        })
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_runs_keep_independent_state() {
    let ctx = setup(test_config(), &[5, 3]);
    ctx.flattener.set_default_response(Ok(split(1)));
    let other_wallet = rts_incoming::test_utils::MockWalletClient::new(Vec::new());
    let other_options = PrepareIncomingOptions::new(other_wallet, Navtoshi(10), Navtoshi(4), RunSettings::new(0.5));

    let (first, second) = tokio::join!(ctx.service.run(ctx.options(10, 4)), ctx.service.run(other_options));

    let first = first.unwrap();
    assert_eq!(first.current_flattened.len(), 2);
    assert_eq!(second.unwrap_err().error, PrepareIncomingError::NoUnspentOutputs);
}

#[tokio::test]
async fn it_runs_with_configuration_loaded_from_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[prepare_incoming]
sub_chain_tx_fee = 1
sub_coins_per_tx = 1
max_addresses = 3
server_type = "incoming"

[prepare_incoming.accounts]
incoming = "RTS_FILE"
"#
    )
    .unwrap();
    let config = PrepareIncomingConfig::load_from(&load_configuration(file.path()).unwrap()).unwrap();
    assert_eq!(config.max_addresses, 3);

    let ctx = setup(config, &[1, 1]);
    ctx.flattener.set_default_response(Ok(split(2)));
    let prepared = ctx.service.run(ctx.options(10, 4)).await.unwrap();

    assert_eq!(ctx.filter.take_calls()[0].1, "RTS_FILE");
    assert!(prepared.capacity_exhausted);
    assert_eq!(prepared.num_flattened, 2);
}
