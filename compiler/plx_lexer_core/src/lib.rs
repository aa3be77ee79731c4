//! Quote-like operator and heredoc tracking for Perl cross-referencing.
//!
//! Perl's quoting grammar cannot be tokenized by a context-free pass: `/`
//! is division, a regex delimiter, or heredoc body text depending on what
//! came before; `q[a[b]c]` nests; `tr///` and `s{}{}` have two sections;
//! and several `<<EOF` declarations may share one line. This crate owns the
//! state that makes those decisions.
//!
//! # Architecture
//!
//! ```text
//! scanner ──(capture)──▶ QuoteEngine ──(emit / push / pop / pushback)──▶ QuoteHost
//! ```
//!
//! The driving scanner matches a grammar production, hands the matched
//! text to one [`QuoteEngine`] operation, and implements [`QuoteHost`] to
//! receive the engine's output and lexical-state instructions. The engine
//! never sees the source text beyond the captures it is given.
//!
//! # Crate Independence
//!
//! This crate has **no** `plx_*` dependencies. It can be embedded in any
//! scanner (logos, hand-written, or generated) that implements
//! [`QuoteHost`].

mod collateral;
mod engine;
mod heredoc;
mod host;
mod state;

pub use collateral::CollateralPattern;
pub use engine::QuoteEngine;
pub use heredoc::HeredocSpec;
pub use host::QuoteHost;
pub use state::{LexState, SpanStyle};
