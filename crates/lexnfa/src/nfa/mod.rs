//! # Lexical Automata
//!
//! NFA construction and canonicalization for one lexical state.
//!
//! ## Pipeline
//!
//! 1. [`NfaBuilder`] applies Thompson's construction to each token pattern,
//!    wiring every fragment into the lexical state's shared initial state.
//! 2. The epsilon closure replaces each state's epsilon moves with the set
//!    of states reachable without consuming input, keeping only states that
//!    have character moves.
//! 3. Each closure set becomes a [`CompositeStateSet`], memoized by exact
//!    set equality. Structurally identical continuations share one composite.
//! 4. Composites unreachable from the initial composite are discarded.
//! 5. The survivors are ordered (initial first, then those with an accepting
//!    member) and indexed from 0.
//!
//! The result is the dispatch table a code generator walks: one routine per
//! composite, trying the members' move ranges in [`Composite::ordered_members`]
//! order.
//!
//! ## Example
//!
//! ```rust
//! use lexnfa::nfa::LexicalStateData;
//! use lexnfa::regexp::{RegularExpression, TokenKind, TokenProduction, TokenRegistry};
//! use lexnfa::LexerConfig;
//!
//! let mut registry = TokenRegistry::new();
//! let arrow = registry.register(RegularExpression::literal("->"));
//!
//! let mut state = LexicalStateData::new("DEFAULT", true);
//! state.add_token_production(TokenProduction::new(TokenKind::Token).regexp(arrow));
//! state.process(&registry, &LexerConfig::default())?;
//!
//! let initial = state.composite_at(0).expect("initial composite");
//! assert_eq!(initial.method_name().as_deref(), Some("NfaIndex0"));
//! # Ok::<(), lexnfa::NfaError>(())
//! ```

mod builder;
mod composite;
mod lexical_state;
mod state;

pub use builder::{Fragment, NfaBuilder};
pub use composite::{Composite, CompositeId, CompositeStateSet};
pub use lexical_state::LexicalStateData;
pub use state::{Nfa, NfaState, NfaStateId};
