#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::correctness)]
#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

pub mod cli;
pub mod config;
pub mod dedup;
pub mod emit;
pub mod fetch;
pub mod filter;
pub mod pipeline;
pub mod playlist;
pub mod rewrite;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
extern crate log;
