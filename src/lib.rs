//! flowtree: build component trees from nested declarations.
//!
//! A [`TreeBuilder`](domain::TreeBuilder) walks nested configuration blocks,
//! validates attributes against a per-kind capability table and attaches every
//! node to its lexical parent on a [`Host`](domain::Host).

#[macro_use]
pub mod macros;

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
