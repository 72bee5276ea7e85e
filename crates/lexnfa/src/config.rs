use compact_str::CompactString;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Configuration options for building lexer automata.
///
/// # Example
///
/// ```rust
/// use lexnfa::LexerConfig;
///
/// // Use default configuration
/// let config = LexerConfig::default();
/// assert_eq!(config.default_lexical_state, "DEFAULT");
///
/// // Or make every token case-insensitive
/// let config = LexerConfig {
///     ignore_case: true,
///     ..LexerConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct LexerConfig {
    /// Global case insensitivity, applied to every token production
    pub ignore_case: bool,

    /// Name of the lexical state used when a production lists none
    pub default_lexical_state: CompactString,

    /// Names of token types with no regular expression (placed after the
    /// registered ones when resolving token names)
    pub extra_token_names: Vec<CompactString>,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            ignore_case: false,
            default_lexical_state: CompactString::const_new("DEFAULT"),
            extra_token_names: Vec::new(),
        }
    }
}
