//! Error types for template parsing, expansion, and matching.

use std::fmt;

/// Errors that can occur when parsing a URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The template text that failed to parse
    pub input: String,
    /// The specific error that occurred
    pub kind: ParseErrorKind,
}

/// Specific template parsing error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A `{` without a matching `}`, a nested `{`, or a stray `}`
    UnbalancedBrace {
        /// Byte position of the offending brace
        position: usize,
    },
    /// An expression `{}` or `{op}` with no variable list
    EmptyExpression {
        /// Byte position of the opening brace
        position: usize,
    },
    /// Whitespace inside an expression
    Whitespace {
        /// The whitespace character
        char: char,
        /// Byte position in the input
        position: usize,
    },
    /// An operator the RFC reserves for future extension (`=`, `,`, `!`, `@`, `|`)
    ///
    /// Distinguished from the other kinds so callers can detect templates
    /// that are valid per the RFC grammar but not implementable here.
    UnsupportedOperator {
        /// The reserved operator character
        operator: char,
        /// Byte position in the input
        position: usize,
    },
    /// A varspec token inside an expression is invalid
    InvalidVarspec(VarSpecError),
    /// A character outside any expression violates the literal grammar
    InvalidLiteral {
        /// The invalid character
        char: char,
        /// Byte position in the input
        position: usize,
    },
    /// A `%` in literal text not followed by two hex digits
    IncompletePercentTriplet {
        /// Byte position of the `%`
        position: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse URI template '{}': ", self.input)?;
        match &self.kind {
            ParseErrorKind::UnbalancedBrace { position } => {
                write!(f, "unbalanced brace at position {position}")
            }
            ParseErrorKind::EmptyExpression { position } => {
                write!(f, "empty expression at position {position}")
            }
            ParseErrorKind::Whitespace { char, position } => {
                write!(
                    f,
                    "whitespace character {char:?} at position {position}; expressions may not contain whitespace"
                )
            }
            ParseErrorKind::UnsupportedOperator { operator, position } => {
                write!(
                    f,
                    "operator '{operator}' at position {position} is reserved for future RFC extension and not supported"
                )
            }
            ParseErrorKind::InvalidVarspec(e) => write!(f, "invalid varspec: {e}"),
            ParseErrorKind::InvalidLiteral { char, position } => {
                write!(f, "invalid literal character '{char}' at position {position}")
            }
            ParseErrorKind::IncompletePercentTriplet { position } => {
                write!(
                    f,
                    "'%' at position {position} is not followed by two hex digits"
                )
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors for varspec parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarSpecError {
    /// Varspec is empty
    Empty,
    /// Invalid character in the variable name
    InvalidChar {
        /// The invalid character
        char: char,
        /// Byte position within the varspec
        position: usize,
    },
    /// Leading, trailing, or doubled dot in the variable name
    MisplacedDot {
        /// Byte position within the varspec
        position: usize,
    },
    /// A `%` in the name not followed by two hex digits
    IncompletePercentTriplet {
        /// Byte position within the varspec
        position: usize,
    },
    /// The `:N` prefix length is not an integer in 1..=9999
    InvalidPrefixLength {
        /// The text after the colon
        value: String,
        /// Reason for invalidity
        reason: &'static str,
    },
    /// Both `:N` and `*` on the same varspec
    PrefixWithExplode,
}

impl fmt::Display for VarSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "varspec cannot be empty"),
            Self::InvalidChar { char, position } => {
                write!(
                    f,
                    "invalid character '{char}' at position {position}; names allow letters, digits, '_', '.', and pct-triplets"
                )
            }
            Self::MisplacedDot { position } => {
                write!(
                    f,
                    "misplaced '.' at position {position}; dots must singly separate name groups"
                )
            }
            Self::IncompletePercentTriplet { position } => {
                write!(f, "'%' at position {position} is not followed by two hex digits")
            }
            Self::InvalidPrefixLength { value, reason } => {
                write!(f, "invalid prefix length '{value}': {reason}")
            }
            Self::PrefixWithExplode => {
                write!(
                    f,
                    "a varspec cannot combine a ':N' prefix with the '*' explode modifier"
                )
            }
        }
    }
}

impl std::error::Error for VarSpecError {}

/// Errors that can occur during expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    /// A prefix-modified variable resolved to a list or map value
    PrefixOnComposite {
        /// The variable name
        name: String,
    },
    /// The base URI given to a resolving expansion is not absolute
    BaseNotAbsolute {
        /// The offending base URI
        base: String,
    },
}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrefixOnComposite { name } => {
                write!(
                    f,
                    "variable '{name}' has a ':N' prefix modifier but resolved to a list or map; prefix truncation is defined only for strings"
                )
            }
            Self::BaseNotAbsolute { base } => {
                write!(f, "base URI '{base}' is not absolute")
            }
        }
    }
}

impl std::error::Error for ExpandError {}

/// Errors that can occur during matching.
///
/// A candidate URI that simply does not match is **not** an error; the
/// matching entry points report that outcome as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// A composite hint on a prefix-modified variable, or a variable
    /// hinted as both list and map
    IncompatibleHint {
        /// The variable name
        name: String,
    },
    /// Different parts of the template bound the same variable to
    /// irreconcilable values
    InconsistentBinding {
        /// The variable name
        name: String,
    },
    /// A hint collection contained an empty variable name
    EmptyHintName,
    /// The base URI given to a relativizing match is not absolute
    BaseNotAbsolute {
        /// The offending base URI
        base: String,
    },
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleHint { name } => {
                write!(
                    f,
                    "variable '{name}' carries a ':N' prefix modifier and cannot be hinted as a list or map"
                )
            }
            Self::InconsistentBinding { name } => {
                write!(
                    f,
                    "variable '{name}' was bound to conflicting values by different parts of the template"
                )
            }
            Self::EmptyHintName => {
                write!(f, "hint collections may not contain empty variable names")
            }
            Self::BaseNotAbsolute { base } => {
                write!(f, "base URI '{base}' is not absolute")
            }
        }
    }
}

impl std::error::Error for MatchError {}
