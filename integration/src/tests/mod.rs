//! The registered integration test cases

pub mod fulfillment;
pub mod request_book;
