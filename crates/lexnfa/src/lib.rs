//! # Lexnfa
//!
//! Lexical automaton core for scanner generators.
//!
//! ## Overview
//!
//! Lexnfa turns the token definitions of a grammar into the tables a
//! generated scanner dispatches on:
//!
//! - **Thompson construction**: every token pattern becomes a fragment of
//!   the owning lexical state's NFA
//! - **Epsilon closure**: states are closed over epsilon moves, keeping only
//!   states that consume input
//! - **Canonical composites**: closure sets are memoized so identical
//!   continuations share one dispatch routine
//! - **Ordering and naming**: reachable composites are indexed, initial
//!   first, and members get deterministic moves-array names
//!
//! ## Quick Start
//!
//! ```rust
//! use lexnfa::regexp::{CharacterList, Pattern, RegularExpression, TokenKind, TokenProduction};
//! use lexnfa::scan::NfaScanner;
//! use lexnfa::{LexerConfig, LexerData};
//!
//! let mut lexer = LexerData::new(LexerConfig::default());
//! let kw_if = lexer.add_regular_expression(RegularExpression::literal("if"));
//! let ident = lexer.add_regular_expression(
//!     RegularExpression::new(Pattern::one_or_more(Pattern::class(
//!         CharacterList::chars('a', 'z'),
//!     )))
//!     .with_label("IDENT"),
//! );
//! lexer.add_token_production(
//!     TokenProduction::new(TokenKind::Token).regexp(kw_if).regexp(ident),
//! )?;
//! lexer.build_data()?;
//!
//! let scanner = NfaScanner::new(lexer.default_lexical_state());
//! assert_eq!(scanner.longest_match("if (x)").map(|m| m.token), Some(kw_if));
//! assert_eq!(scanner.longest_match("iffy").map(|m| m.token), Some(ident));
//! # Ok::<(), lexnfa::NfaError>(())
//! ```
//!
//! ## Features
//!
//! - `serialize`: serde support for tables and token definitions, JSON export
//! - `parallel`: build lexical states on the rayon thread pool
//! - `diagnostics`: [`miette`] integration for errors and warnings

pub mod bitset;
pub mod charset;
pub mod config;
pub mod error;
pub mod lexer_data;
pub mod nfa;
pub mod regexp;
pub mod scan;
pub mod table;

// Re-export commonly used types
pub use config::LexerConfig;
pub use error::{LexerWarning, NfaError, Result, ScanError};
pub use lexer_data::LexerData;
pub use nfa::{CompositeStateSet, LexicalStateData, NfaState};
pub use regexp::{RegularExpression, TokenId, TokenKind};
pub use scan::NfaScanner;
pub use table::LexerTable;
