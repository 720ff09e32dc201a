//! The eight RFC 6570 expansion operators.

use std::fmt;

/// Expansion operator of a template expression.
///
/// The RFC fixes exactly eight kinds; the enum is closed and every consumer
/// matches exhaustively, so adding a kind is a compile-visible change.
///
/// # Examples
///
/// ```
/// use uri_template::Operator;
///
/// assert_eq!(Operator::from_char('?'), Some(Operator::Query));
/// assert_eq!(Operator::Query.symbol(), Some('?'));
/// assert_eq!(Operator::from_char('x'), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `{var}` — simple string expansion
    Simple,
    /// `{+var}` — reserved-string expansion
    Reserved,
    /// `{#var}` — fragment expansion
    Fragment,
    /// `{.var}` — label expansion with dot prefix
    Label,
    /// `{/var}` — path segment expansion
    PathSegment,
    /// `{;var}` — path-style parameter expansion
    PathParameter,
    /// `{?var}` — form-style query expansion
    Query,
    /// `{&var}` — form-style query continuation
    Continuation,
}

impl Operator {
    /// Returns the operator for an expression's leading character, if that
    /// character is one of the seven operator symbols.
    ///
    /// `Simple` has no symbol and is never returned here.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Reserved),
            '#' => Some(Self::Fragment),
            '.' => Some(Self::Label),
            '/' => Some(Self::PathSegment),
            ';' => Some(Self::PathParameter),
            '?' => Some(Self::Query),
            '&' => Some(Self::Continuation),
            _ => None,
        }
    }

    /// Returns true for the operator characters the RFC reserves for
    /// future extension.
    #[must_use]
    pub const fn is_reserved_for_future(c: char) -> bool {
        matches!(c, '=' | ',' | '!' | '@' | '|')
    }

    /// Returns the operator's symbol as written in a template, or `None`
    /// for `Simple`.
    #[must_use]
    pub const fn symbol(self) -> Option<char> {
        match self {
            Self::Simple => None,
            Self::Reserved => Some('+'),
            Self::Fragment => Some('#'),
            Self::Label => Some('.'),
            Self::PathSegment => Some('/'),
            Self::PathParameter => Some(';'),
            Self::Query => Some('?'),
            Self::Continuation => Some('&'),
        }
    }

    /// The string emitted before the first contributing variable.
    #[must_use]
    pub(crate) const fn first(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved => "",
            Self::Fragment => "#",
            Self::Label => ".",
            Self::PathSegment => "/",
            Self::PathParameter => ";",
            Self::Query => "?",
            Self::Continuation => "&",
        }
    }

    /// The character separating subsequent contributing variables, and the
    /// items of an exploded composite value.
    #[must_use]
    pub(crate) const fn separator(self) -> char {
        match self {
            Self::Simple | Self::Reserved | Self::Fragment => ',',
            Self::Label => '.',
            Self::PathSegment => '/',
            Self::PathParameter => ';',
            Self::Query | Self::Continuation => '&',
        }
    }

    /// True for operators whose variables render as `name=value` pairs.
    #[must_use]
    pub(crate) const fn named(self) -> bool {
        matches!(self, Self::PathParameter | Self::Query | Self::Continuation)
    }

    /// What follows the name when a named variable's value is empty.
    #[must_use]
    pub(crate) const fn ifemp(self) -> &'static str {
        match self {
            Self::Query | Self::Continuation => "=",
            _ => "",
        }
    }

    /// True for operators whose values pass RFC 3986 reserved characters
    /// (and pre-existing pct-triplets) through unencoded.
    #[must_use]
    pub(crate) const fn allows_reserved(self) -> bool {
        matches!(self, Self::Reserved | Self::Fragment)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol() {
            Some(c) => write!(f, "{c}"),
            None => Ok(()),
        }
    }
}
