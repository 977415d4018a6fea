//! Tests for fulfilling requests through the mock coordinator

use alloy_primitives::U256;
use eyre::{ensure, Result};

use crate::{
    integration_test,
    test_args::TestArgs,
    util::{
        books::fund_one_fee,
        transactions::{call_helper, submit_request, wait_for_tx_success},
    },
};

/// Test that the mock coordinator can fulfill a pending request without
/// disturbing its mappings
async fn test_fulfillment_callback(args: TestArgs) -> Result<()> {
    fund_one_fee(&args).await?;

    let books = args.books()?;
    let request_id = submit_request(&books, "fulfilled-book", "fulfilled-author").await?;

    // Anyone may drive the mock; the live coordinator is permissioned
    let coordinator = args.coordinator()?;
    let callback =
        coordinator.callBackWithRandomness(request_id, U256::from(777), *books.address());
    wait_for_tx_success(callback).await?;

    let name = call_helper(books.requestToBookName(request_id)).await?;
    let sender = call_helper(books.requestToSender(request_id)).await?;
    ensure!(name == "fulfilled-book", "request mapped to book name {name}");
    ensure!(
        sender == args.wallet_addr(),
        "request mapped to sender {sender:#x}",
    );
    Ok(())
}
integration_test!(test_fulfillment_callback);
