use std::fmt::{self, Write};

use crate::charset::CharRange;
use crate::nfa::LexicalStateData;

/// Graphviz rendering of a processed lexical state: one node per used
/// composite, one edge per member move. Accepting edges are drawn bold.
pub struct DotGraph<'a> {
    lexical_state: &'a LexicalStateData,
}

impl<'a> DotGraph<'a> {
    #[must_use]
    pub const fn new(lexical_state: &'a LexicalStateData) -> Self {
        Self { lexical_state }
    }
}

/// Render a lexical state's composite graph in DOT format.
#[must_use]
pub fn to_dot(lexical_state: &LexicalStateData) -> String {
    DotGraph::new(lexical_state).to_string()
}

fn write_code_point(out: &mut impl Write, c: u32) -> fmt::Result {
    match char::from_u32(c) {
        Some(ch) if ch.is_ascii_graphic() && ch != '"' && ch != '\\' => out.write_char(ch),
        _ => write!(out, "\\\\u{{{c:x}}}"),
    }
}

fn write_ranges(out: &mut impl Write, ranges: &[CharRange]) -> fmt::Result {
    out.write_char('[')?;
    for range in ranges {
        write_code_point(out, range.lo)?;
        if range.hi != range.lo {
            out.write_char('-')?;
            write_code_point(out, range.hi)?;
        }
    }
    out.write_char(']')
}

impl fmt::Display for DotGraph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lexical_state;
        writeln!(f, "digraph \"{}\" {{", state.name())?;
        writeln!(f, "  rankdir=LR;")?;
        writeln!(f, "  node [shape=circle];")?;
        writeln!(f, "  accept [shape=doublecircle, label=\"\"];")?;

        for composite in state.composites() {
            let (Some(index), Some(name)) = (composite.index(), composite.method_name()) else {
                continue;
            };
            writeln!(f, "  c{index} [label=\"{name}\"];")?;
        }

        for composite in state.composites() {
            let Some(from) = composite.index() else {
                continue;
            };
            for member in composite.ordered_members() {
                let target = state
                    .next_state_index(member.id())
                    .map_or_else(|| "accept".to_owned(), |index| format!("c{index}"));
                write!(f, "  c{from} -> {target} [label=\"")?;
                write_ranges(f, member.move_ranges())?;
                if state.is_next_final(member.id())
                    && let Some(token) = member.token()
                {
                    write!(f, " {token}\", style=bold];")?;
                } else {
                    write!(f, "\"];")?;
                }
                writeln!(f)?;
            }
        }
        writeln!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LexerConfig;
    use crate::regexp::{
        CharacterList, Pattern, RegularExpression, TokenKind, TokenProduction, TokenRegistry,
    };

    #[test]
    fn test_dot_output() {
        let mut registry = TokenRegistry::new();
        let digits = registry.register(RegularExpression::new(Pattern::one_or_more(
            Pattern::class(CharacterList::chars('0', '9')),
        )));
        let mut state = LexicalStateData::new("DEFAULT", true);
        state.add_token_production(TokenProduction::new(TokenKind::Token).regexp(digits));
        state.process(&registry, &LexerConfig::default()).unwrap();

        let dot = to_dot(&state);
        assert!(dot.starts_with("digraph \"DEFAULT\" {"));
        assert!(dot.contains("c0 [label=\"NfaIndex0\"];"));
        // The loop body leads back into the initial closure.
        assert!(dot.contains("c0 -> c0 [label=\"[0-9] #1\", style=bold];"));
        assert!(!dot.contains("c1"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_escaped_chars() {
        let mut out = String::new();
        let ranges = [CharRange::single('"' as u32), CharRange::new(0xE9, 0xFF)];
        write_ranges(&mut out, &ranges).unwrap();
        assert_eq!(out, "[\\\\u{22}\\\\u{e9}-\\\\u{ff}]");
    }
}
