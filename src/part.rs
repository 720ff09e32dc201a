//! Template parts: literal runs and expansion expressions.

use std::fmt;

use crate::error::ParseErrorKind;
use crate::operator::Operator;
use crate::varspec::VarSpec;

/// One part of a parsed template.
///
/// A template is an ordered sequence of parts that partitions its source
/// text with no gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Raw text outside any `{...}` expression, already validated against
    /// the RFC literal character grammar.
    Literal(String),
    /// A `{...}` expansion expression.
    Expression {
        /// The expansion operator
        operator: Operator,
        /// Variable references in declaration order
        varspecs: Vec<VarSpec>,
    },
}

impl fmt::Display for TemplatePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "{text}"),
            Self::Expression { operator, varspecs } => {
                write!(f, "{{{operator}")?;
                for (i, spec) in varspecs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{spec}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// True for characters the RFC `literals` rule permits unescaped.
///
/// Excludes CTL, space, `"`, `'`, `%`, `<`, `>`, `\`, `^`, `` ` ``, `{`,
/// `|`, and `}`; includes `ucschar` and `iprivate` ranges.
pub(crate) const fn is_literal_char(c: char) -> bool {
    matches!(c,
        '\u{21}'
        | '\u{23}'..='\u{24}'
        | '\u{26}'
        | '\u{28}'..='\u{3B}'
        | '\u{3D}'
        | '\u{3F}'..='\u{5B}'
        | '\u{5D}'
        | '\u{5F}'
        | '\u{61}'..='\u{7A}'
        | '\u{7E}')
        || is_ucschar(c)
        || is_iprivate(c)
}

const fn is_ucschar(c: char) -> bool {
    matches!(c,
        '\u{A0}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFEF}'
        | '\u{10000}'..='\u{1FFFD}'
        | '\u{20000}'..='\u{2FFFD}'
        | '\u{30000}'..='\u{3FFFD}'
        | '\u{40000}'..='\u{4FFFD}'
        | '\u{50000}'..='\u{5FFFD}'
        | '\u{60000}'..='\u{6FFFD}'
        | '\u{70000}'..='\u{7FFFD}'
        | '\u{80000}'..='\u{8FFFD}'
        | '\u{90000}'..='\u{9FFFD}'
        | '\u{A0000}'..='\u{AFFFD}'
        | '\u{B0000}'..='\u{BFFFD}'
        | '\u{C0000}'..='\u{CFFFD}'
        | '\u{D0000}'..='\u{DFFFD}'
        | '\u{E1000}'..='\u{EFFFD}')
}

const fn is_iprivate(c: char) -> bool {
    matches!(c,
        '\u{E000}'..='\u{F8FF}'
        | '\u{F0000}'..='\u{FFFFD}'
        | '\u{100000}'..='\u{10FFFD}')
}

/// Validates a literal run at byte offset `offset` of the template source.
///
/// `%` must start a well-formed triplet; every other character must satisfy
/// the literal grammar.
pub(crate) fn validate_literal(text: &str, offset: usize) -> Result<(), ParseErrorKind> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < text.len() {
        if bytes[i] == b'%' {
            if !crate::encode::is_pct_triplet(bytes, i) {
                return Err(ParseErrorKind::IncompletePercentTriplet { position: offset + i });
            }
            i += 3;
            continue;
        }
        let c = match text[i..].chars().next() {
            Some(c) => c,
            None => break,
        };
        if !is_literal_char(c) {
            return Err(ParseErrorKind::InvalidLiteral { char: c, position: offset + i });
        }
        i += c.len_utf8();
    }
    Ok(())
}
