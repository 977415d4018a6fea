//! Utilities for sending transactions and decoding their receipts

use std::time::Duration;

use alloy::{
    network::Ethereum,
    providers::{DynProvider, Provider},
    rpc::types::TransactionReceipt,
};
use alloy_contract::{CallBuilder, CallDecoder};
use alloy_primitives::B256;
use deploy_scripts::solidity::{CryptoBooks, CryptoBooksContract};
use eyre::{bail, ensure, eyre, Result};

/// The call builder type for the tests
pub type TestCallBuilder<'a, C> = CallBuilder<&'a DynProvider, C, Ethereum>;

// ----------------
// | Transactions |
// ----------------

/// Wait for a transaction receipt and ensure it was successful
pub async fn wait_for_tx_success<C: CallDecoder>(
    tx: TestCallBuilder<'_, C>,
) -> Result<TransactionReceipt> {
    let receipt = send_tx(tx).await?;
    ensure!(
        receipt.status(),
        "transaction {:#x} reverted",
        receipt.transaction_hash,
    );
    Ok(receipt)
}

/// Send a transaction and wait for it to succeed or fail
pub async fn send_tx<C: CallDecoder>(tx: TestCallBuilder<'_, C>) -> Result<TransactionReceipt> {
    let pending_tx = tx.send().await.map_err(|e| eyre!("pending tx error: {e}"))?;
    let tx_hash = *pending_tx.tx_hash();

    // Poll for the receipt directly, watching the pending transaction can
    // miss blocks that the dev chain mines instantly
    let mut remaining_attempts = 10;
    let provider = tx.provider;
    while remaining_attempts > 0 {
        match provider.get_transaction_receipt(tx_hash).await? {
            Some(receipt) => return Ok(receipt),
            None => {
                tokio::time::sleep(Duration::from_millis(100)).await;
                remaining_attempts -= 1;
            }
        }
    }

    bail!("no receipt found for tx {tx_hash:#x} after retries");
}

/// Send a call and return the result
pub async fn call_helper<C: CallDecoder + Unpin>(
    call: TestCallBuilder<'_, C>,
) -> Result<C::CallOutput> {
    let res = call.call().await?;
    Ok(res)
}

// ------------
// | Requests |
// ------------

/// Submit a book request and return the request id it was assigned
pub async fn submit_request(
    books: &CryptoBooksContract,
    name: &str,
    author: &str,
) -> Result<B256> {
    let tx = books.requestNewRandomBook(name.to_string(), author.to_string());
    let receipt = wait_for_tx_success(tx).await?;
    request_id_from_receipt(&receipt)
}

/// Decode the request id from the `BookRequested` event in a receipt
///
/// The event is matched by signature, the LINK token and coordinator emit
/// their own logs in the same transaction so positions are unreliable
pub fn request_id_from_receipt(receipt: &TransactionReceipt) -> Result<B256> {
    for log in receipt.logs() {
        if let Ok(decoded) = log
            .log_decode::<CryptoBooks::BookRequested>()
            .map(|l| l.into_inner())
        {
            return Ok(decoded.requestId);
        }
    }

    bail!(
        "no BookRequested event in receipt for tx {:#x}",
        receipt.transaction_hash,
    );
}
