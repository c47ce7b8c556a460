/// Integration tests for the mint transaction flow
mod common;

use std::sync::Arc;

use alloy_primitives::U256;
use tokio::sync::{mpsc, Notify};

use common::*;
use scatter_mint_sdk::protocols::evm::contracts::encode_approve;
use scatter_mint_sdk::{MintError, MintOptions, MintStage, MintTransactionBuilder};

fn builder(
    api: &Arc<FakeApi>,
    chain: &Arc<FakeChain>,
    wallet: &Arc<FakeWallet>,
) -> MintTransactionBuilder {
    MintTransactionBuilder::new(api.clone(), chain.clone(), wallet.clone())
}

fn drain(rx: &mut mpsc::UnboundedReceiver<MintStage>) -> Vec<MintStage> {
    let mut stages = Vec::new();
    while let Ok(stage) = rx.try_recv() {
        stages.push(stage);
    }
    stages
}

#[tokio::test]
async fn test_native_mint_skips_allowances() {
    let api = Arc::new(
        FakeApi::new(collection(0, 100), vec![]).with_template(Ok(template(&[], 1_000))),
    );
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(FakeWallet::connected(MOCK_MINTER, CHAIN_ID));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let outcome = builder(&api, &chain, &wallet)
        .mint(
            &collection(0, 100),
            "list-1",
            MintOptions::default().with_progress(tx),
        )
        .await
        .unwrap();

    assert!(outcome.approvals.is_empty());
    assert!(chain.allowance_reads().is_empty());

    let sent = wallet.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, Some(MOCK_COLLECTION));
    assert_eq!(sent[0].from, Some(MOCK_MINTER));
    assert_eq!(sent[0].value, U256::from(1_000));
    assert_eq!(sent[0].chain_id, CHAIN_ID);
    assert_eq!(sent[0].data, outcome.template.mint_transaction.data);

    let requests = api.mint_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].collection_address, MOCK_COLLECTION);
    assert_eq!(requests[0].minter_address, MOCK_MINTER);
    assert_eq!(requests[0].lists[0].id, "list-1");
    assert_eq!(requests[0].lists[0].quantity, 1);

    assert_eq!(
        drain(&mut rx),
        vec![
            MintStage::RequestingTemplate,
            MintStage::CheckingAllowances,
            MintStage::SubmittingMint,
            MintStage::Completed {
                tx_hash: outcome.tx_hash
            },
        ]
    );
}

#[tokio::test]
async fn test_only_insufficient_allowance_is_approved() {
    let api = Arc::new(
        FakeApi::new(collection(0, 100), vec![])
            .with_template(Ok(template(&[(MOCK_USDC, 500), (MOCK_WETH, 700)], 0))),
    );
    let chain = Arc::new(
        FakeChain::new()
            .with_allowance(MOCK_USDC, U256::from(500))
            .with_allowance(MOCK_WETH, U256::from(699)),
    );
    let wallet = Arc::new(FakeWallet::connected(MOCK_MINTER, CHAIN_ID));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let outcome = builder(&api, &chain, &wallet)
        .mint(
            &collection(0, 100),
            "list-1",
            MintOptions::default().with_progress(tx),
        )
        .await
        .unwrap();

    // Allowances are read in API order
    assert_eq!(chain.allowance_reads(), vec![MOCK_USDC, MOCK_WETH]);

    let sent = wallet.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, Some(MOCK_WETH));
    assert_eq!(sent[0].data, encode_approve(MOCK_COLLECTION, U256::MAX));
    assert_eq!(sent[1].to, Some(MOCK_COLLECTION));

    assert_eq!(outcome.approvals.len(), 1);
    assert_eq!(outcome.approvals[0].token, MOCK_WETH);
    assert_eq!(
        wallet.confirmations.lock().unwrap().clone(),
        vec![outcome.approvals[0].tx_hash]
    );

    let stages = drain(&mut rx);
    assert_eq!(
        stages[..4],
        [
            MintStage::RequestingTemplate,
            MintStage::CheckingAllowances,
            MintStage::ApprovingAllowance { token: MOCK_WETH },
            MintStage::SubmittingMint,
        ]
    );
}

#[tokio::test]
async fn test_template_failure_stops_before_chain() {
    let api = Arc::new(
        FakeApi::new(collection(0, 100), vec![]).with_template(Err(
            MintError::TemplateRequestFailed {
                status: Some(400),
                message: "list not eligible".to_string(),
            },
        )),
    );
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(FakeWallet::connected(MOCK_MINTER, CHAIN_ID));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let err = builder(&api, &chain, &wallet)
        .mint(
            &collection(0, 100),
            "list-1",
            MintOptions::default().with_progress(tx),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MintError::TemplateRequestFailed {
            status: Some(400),
            ..
        }
    ));
    assert!(chain.allowance_reads().is_empty());
    assert!(wallet.sent().is_empty());
    assert_eq!(
        drain(&mut rx).last(),
        Some(&MintStage::Failed(err.clone()))
    );
}

#[tokio::test]
async fn test_malformed_template_is_surfaced() {
    let api = Arc::new(
        FakeApi::new(collection(0, 100), vec![]).with_template(Err(
            MintError::TemplateMalformed("missing field `mintTransaction`".to_string()),
        )),
    );
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(FakeWallet::connected(MOCK_MINTER, CHAIN_ID));

    let err = builder(&api, &chain, &wallet)
        .mint(&collection(0, 100), "list-1", MintOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, MintError::TemplateMalformed(_)));
    assert!(wallet.sent().is_empty());
}

#[tokio::test]
async fn test_allowance_read_failure() {
    let api = Arc::new(
        FakeApi::new(collection(0, 100), vec![])
            .with_template(Ok(template(&[(MOCK_USDC, 1)], 0))),
    );
    let chain = Arc::new(FakeChain::new().with_failing_token(MOCK_USDC));
    let wallet = Arc::new(FakeWallet::connected(MOCK_MINTER, CHAIN_ID));

    let err = builder(&api, &chain, &wallet)
        .mint(&collection(0, 100), "list-1", MintOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, MintError::AllowanceReadFailed { token, .. } if token == MOCK_USDC));
    assert!(wallet.sent().is_empty());
}

#[tokio::test]
async fn test_approval_rejection_aborts_mint() {
    let api = Arc::new(
        FakeApi::new(collection(0, 100), vec![])
            .with_template(Ok(template(&[(MOCK_USDC, 10), (MOCK_WETH, 10)], 0))),
    );
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(
        FakeWallet::connected(MOCK_MINTER, CHAIN_ID).with_approval_response(WalletResponse::Reject),
    );

    let err = builder(&api, &chain, &wallet)
        .mint(&collection(0, 100), "list-1", MintOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, MintError::ApprovalRejected { token, .. } if token == MOCK_USDC));
    assert!(err.is_user_rejection());
    // The second token is never checked
    assert_eq!(chain.allowance_reads(), vec![MOCK_USDC]);
    assert!(wallet.sent().is_empty());
}

#[tokio::test]
async fn test_approval_failure_is_not_a_rejection() {
    let api = Arc::new(
        FakeApi::new(collection(0, 100), vec![])
            .with_template(Ok(template(&[(MOCK_USDC, 10)], 0))),
    );
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(
        FakeWallet::connected(MOCK_MINTER, CHAIN_ID).with_approval_response(WalletResponse::Fail),
    );

    let err = builder(&api, &chain, &wallet)
        .mint(&collection(0, 100), "list-1", MintOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, MintError::ApprovalFailed { .. }));
    assert!(!err.is_user_rejection());
}

#[tokio::test]
async fn test_mint_rejection_and_failure_are_distinct() {
    let api = Arc::new(FakeApi::new(collection(0, 100), vec![]));
    let chain = Arc::new(FakeChain::new());

    let rejecting = Arc::new(
        FakeWallet::connected(MOCK_MINTER, CHAIN_ID).with_mint_response(WalletResponse::Reject),
    );
    let err = builder(&api, &chain, &rejecting)
        .mint(&collection(0, 100), "list-1", MintOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MintError::MintRejected(_)));
    assert!(err.is_user_rejection());

    let failing = Arc::new(
        FakeWallet::connected(MOCK_MINTER, CHAIN_ID).with_mint_response(WalletResponse::Fail),
    );
    let err = builder(&api, &chain, &failing)
        .mint(&collection(0, 100), "list-1", MintOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MintError::MintFailed(_)));
    assert!(!err.is_user_rejection());
}

#[tokio::test]
async fn test_concurrent_attempt_on_same_list_is_refused() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(FakeApi::new(collection(0, 100), vec![]).with_template_gate(gate.clone()));
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(FakeWallet::connected(MOCK_MINTER, CHAIN_ID));
    let mint_builder = builder(&api, &chain, &wallet);

    let first = tokio::spawn({
        let mint_builder = mint_builder.clone();
        let target = collection(0, 100);
        async move {
            mint_builder
                .mint(&target, "list-1", MintOptions::default())
                .await
        }
    });
    api.template_requested.notified().await;
    assert!(mint_builder.guard().is_in_flight("list-1"));

    let second = mint_builder
        .mint(&collection(0, 100), "list-1", MintOptions::default())
        .await;
    assert_eq!(
        second.unwrap_err(),
        MintError::AttemptInProgress {
            list_id: "list-1".to_string()
        }
    );
    assert_eq!(api.mint_request_count(), 1);

    gate.notify_one();
    assert!(first.await.unwrap().is_ok());
    assert!(!mint_builder.guard().is_in_flight("list-1"));
    assert_eq!(wallet.sent().len(), 1);
}

#[tokio::test]
async fn test_guard_released_after_failure() {
    let api = Arc::new(FakeApi::new(collection(0, 100), vec![]));
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(
        FakeWallet::connected(MOCK_MINTER, CHAIN_ID).with_mint_response(WalletResponse::Fail),
    );
    let mint_builder = builder(&api, &chain, &wallet);

    for _ in 0..2 {
        let err = mint_builder
            .mint(&collection(0, 100), "list-1", MintOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MintError::MintFailed(_)));
    }
    // Each attempt starts again from the template request
    assert_eq!(api.mint_request_count(), 2);
}

#[tokio::test]
async fn test_disconnect_while_awaiting_approval() {
    let api = Arc::new(
        FakeApi::new(collection(0, 100), vec![])
            .with_template(Ok(template(&[(MOCK_USDC, 10)], 0))),
    );
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(
        FakeWallet::connected(MOCK_MINTER, CHAIN_ID).with_hanging_confirmations(),
    );
    let mint_builder = builder(&api, &chain, &wallet);

    let target = collection(0, 100);
    let attempt = tokio::spawn(async move {
        mint_builder
            .mint(&target, "list-1", MintOptions::default())
            .await
    });

    wallet.sent_notify.notified().await;
    wallet.disconnect();

    let err = attempt.await.unwrap().unwrap_err();
    assert!(matches!(err, MintError::ApprovalFailed { token, .. } if token == MOCK_USDC));
    // Only the approval went out
    assert_eq!(wallet.sent().len(), 1);
}

#[tokio::test]
async fn test_account_switch_while_awaiting_approval() {
    let api = Arc::new(
        FakeApi::new(collection(0, 100), vec![])
            .with_template(Ok(template(&[(MOCK_USDC, 10)], 0))),
    );
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(
        FakeWallet::connected(MOCK_MINTER, CHAIN_ID).with_hanging_confirmations(),
    );
    let mint_builder = builder(&api, &chain, &wallet);

    let target = collection(0, 100);
    let attempt = tokio::spawn(async move {
        mint_builder
            .mint(&target, "list-1", MintOptions::default())
            .await
    });

    wallet.sent_notify.notified().await;
    wallet.set_account(Some(MOCK_OTHER_ACCOUNT));

    let err = attempt.await.unwrap().unwrap_err();
    assert!(matches!(err, MintError::ApprovalFailed { .. }));
}

#[tokio::test]
async fn test_not_connected_is_a_precondition() {
    let api = Arc::new(FakeApi::new(collection(0, 100), vec![]));
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(FakeWallet::disconnected(CHAIN_ID));

    let err = builder(&api, &chain, &wallet)
        .mint(&collection(0, 100), "list-1", MintOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err, MintError::WalletNotConnected);
    assert!(err.is_precondition());
    assert_eq!(api.mint_request_count(), 0);
}

#[tokio::test]
async fn test_wallet_is_switched_to_collection_chain() {
    let api = Arc::new(FakeApi::new(collection(0, 100), vec![]));
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(FakeWallet::connected(MOCK_MINTER, 1));

    builder(&api, &chain, &wallet)
        .mint(&collection(0, 100), "list-1", MintOptions::default())
        .await
        .unwrap();

    assert_eq!(wallet.switches(), vec![CHAIN_ID]);
    assert_eq!(wallet.sent()[0].chain_id, CHAIN_ID);
}

#[tokio::test]
async fn test_failed_chain_switch_stops_attempt() {
    let api = Arc::new(FakeApi::new(collection(0, 100), vec![]));
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(FakeWallet::connected(MOCK_MINTER, 1).with_failing_switch());

    let err = builder(&api, &chain, &wallet)
        .mint(&collection(0, 100), "list-1", MintOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MintError::ChainSwitchFailed {
            chain_id: CHAIN_ID,
            ..
        }
    ));
    assert_eq!(api.mint_request_count(), 0);
    assert!(wallet.sent().is_empty());
}

#[tokio::test]
async fn test_quantity_option() {
    let api = Arc::new(FakeApi::new(collection(0, 100), vec![]));
    let chain = Arc::new(FakeChain::new());
    let wallet = Arc::new(FakeWallet::connected(MOCK_MINTER, CHAIN_ID));
    let mint_builder = builder(&api, &chain, &wallet);

    let err = mint_builder
        .mint(
            &collection(0, 100),
            "list-1",
            MintOptions::default().with_quantity(0),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MintError::InvalidOptions(_)));
    assert_eq!(api.mint_request_count(), 0);

    mint_builder
        .mint(
            &collection(0, 100),
            "list-1",
            MintOptions::default().with_quantity(3),
        )
        .await
        .unwrap();
    assert_eq!(api.mint_requests.lock().unwrap()[0].lists[0].quantity, 3);
}
