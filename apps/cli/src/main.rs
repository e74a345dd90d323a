//! # QuickCommerce Entry Point
//!
//! Thin wrapper over [`quickcommerce_cli::run`]; everything testable lives
//! in the library.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    quickcommerce_cli::run().await
}
