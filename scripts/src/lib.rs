//! Scripts for deploying and upgrading the aggregator smart contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod chain;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod proxy;
mod solidity;
pub mod types;
pub mod utils;
