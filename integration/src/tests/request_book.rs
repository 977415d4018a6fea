//! Tests for submitting book requests and reading back their mappings

use deploy_scripts::solidity::CryptoBooks;
use eyre::{ensure, Result};

use crate::{
    integration_test,
    test_args::TestArgs,
    util::{
        books::{fresh_funded_signer, fund_one_fee},
        transactions::{call_helper, submit_request},
    },
};

/// The book name used for requests in this module
const BOOK_NAME: &str = "fake-book-name";

/// The author name used for requests in this module
const AUTHOR_NAME: &str = "fake-author";

/// Test that a request records its name, author, and sender mappings
async fn test_request_mappings(args: TestArgs) -> Result<()> {
    fund_one_fee(&args).await?;

    let books = args.books()?;
    let request_id = submit_request(&books, BOOK_NAME, AUTHOR_NAME).await?;

    let name = call_helper(books.requestToBookName(request_id)).await?;
    let author = call_helper(books.requestToAuthorName(request_id)).await?;
    let sender = call_helper(books.requestToSender(request_id)).await?;

    ensure!(name == BOOK_NAME, "request mapped to book name {name}");
    ensure!(author == AUTHOR_NAME, "request mapped to author {author}");
    ensure!(
        sender == args.wallet_addr(),
        "request mapped to sender {sender:#x}",
    );
    Ok(())
}
integration_test!(test_request_mappings);

/// Test that the sender mapping tracks the requesting account
async fn test_request_from_second_signer(args: TestArgs) -> Result<()> {
    fund_one_fee(&args).await?;

    // Request from a fresh account rather than the fixture wallet
    let (signer, client) = fresh_funded_signer(&args).await?;
    let books = CryptoBooks::new(args.books_addr()?, client);
    let request_id = submit_request(&books, BOOK_NAME, AUTHOR_NAME).await?;

    let sender = call_helper(books.requestToSender(request_id)).await?;
    ensure!(
        sender == signer.address(),
        "request mapped to sender {sender:#x}",
    );
    ensure!(
        sender != args.wallet_addr(),
        "request attributed to the fixture wallet",
    );
    Ok(())
}
integration_test!(test_request_from_second_signer);

/// Test that two requests get distinct ids and independent mappings
async fn test_distinct_request_ids(args: TestArgs) -> Result<()> {
    let books = args.books()?;

    fund_one_fee(&args).await?;
    let first = submit_request(&books, "first-book", AUTHOR_NAME).await?;
    fund_one_fee(&args).await?;
    let second = submit_request(&books, "second-book", AUTHOR_NAME).await?;

    ensure!(first != second, "both requests share id {first:#x}");

    let first_name = call_helper(books.requestToBookName(first)).await?;
    let second_name = call_helper(books.requestToBookName(second)).await?;
    ensure!(
        first_name == "first-book",
        "first request mapped to {first_name}",
    );
    ensure!(
        second_name == "second-book",
        "second request mapped to {second_name}",
    );
    Ok(())
}
integration_test!(test_distinct_request_ids);
