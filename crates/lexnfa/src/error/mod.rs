//! # Errors and Warnings
//!
//! Faults in the token definitions handed to the automaton builder.
//!
//! Syntax errors in patterns are caught upstream; what remains are
//! cross-reference problems (undefined or recursive named patterns, unknown
//! lexical states) and inverted repetition bounds. Those are returned as
//! [`NfaError`]. Non-fatal conditions are collected as [`LexerWarning`]s.
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, both types integrate with
//! [`miette`] for rich error reporting.

use compact_str::CompactString;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Result alias used throughout the crate.
pub type Result<T, E = NfaError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum NfaError {
    #[error("Undefined regular expression reference: {name}")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(nfa::undefined_reference),
            help("declare a token or private token named `{name}`")
        )
    )]
    UndefinedReference { name: CompactString },

    #[error("Regular expression `{name}` refers to itself")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(nfa::recursive_reference)))]
    RecursiveReference { name: CompactString },

    #[error("Invalid repetition bounds {{{min},{max}}}: maximum is smaller than minimum")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(nfa::invalid_repetition)))]
    InvalidRepetition { min: u32, max: u32 },

    #[error("Unknown lexical state: {name}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(nfa::unknown_lexical_state)))]
    UnknownLexicalState { name: CompactString },

    #[error("Lexical state `{name}` is declared twice")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(nfa::duplicate_lexical_state)))]
    DuplicateLexicalState { name: CompactString },

    #[error("Unknown token ordinal: {ordinal}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(nfa::unknown_token)))]
    UnknownToken { ordinal: u32 },
}

impl NfaError {
    #[must_use]
    pub fn undefined_reference(name: &str) -> Self {
        Self::UndefinedReference {
            name: CompactString::new(name),
        }
    }

    #[must_use]
    pub fn recursive_reference(name: &str) -> Self {
        Self::RecursiveReference {
            name: CompactString::new(name),
        }
    }

    #[must_use]
    pub fn unknown_lexical_state(name: &str) -> Self {
        Self::UnknownLexicalState {
            name: CompactString::new(name),
        }
    }
}

/// Non-fatal findings reported while building lexical states.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum LexerWarning {
    #[error("Lexical state `{name}` has no tokens")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(code(nfa::empty_lexical_state), severity(Warning))
    )]
    EmptyLexicalState { name: CompactString },
}

/// Failure of the reference scanner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ScanError {
    #[error("No token matches at byte offset {offset} in lexical state `{lexical_state}`")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(scan::no_match)))]
    NoMatch {
        offset: usize,
        lexical_state: CompactString,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            NfaError::undefined_reference("DIGIT").to_string(),
            "Undefined regular expression reference: DIGIT"
        );
        assert_eq!(
            NfaError::InvalidRepetition { min: 3, max: 1 }.to_string(),
            "Invalid repetition bounds {3,1}: maximum is smaller than minimum"
        );
    }

    #[test]
    fn test_warning_message() {
        let warning = LexerWarning::EmptyLexicalState {
            name: CompactString::new("COMMENT"),
        };
        assert_eq!(warning.to_string(), "Lexical state `COMMENT` has no tokens");
    }
}
