//! The parsed URI template and its expansion and matching entry points.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{ExpandError, MatchError, ParseError, ParseErrorKind};
use crate::expand::expand_parts;
use crate::matcher::execute;
use crate::matching::{interpret, MatchHints, MatchResult};
use crate::operator::Operator;
use crate::part::{validate_literal, TemplatePart};
use crate::pattern::build_program;
use crate::resolve::{is_absolute, make_relative, resolve};
use crate::value::Values;
use crate::varspec::VarSpec;

/// A parsed RFC 6570 URI template.
///
/// A template expands to a URI reference given a set of variable values,
/// and can run in reverse: matching a candidate URI back into the
/// variable values that would have produced it.
///
/// ```
/// use uri_template::{UriTemplate, Values};
///
/// let template = UriTemplate::parse("/users/{id}{?verbose}")?;
/// let uri = template.expand(&Values::new().set("id", "alice"))?;
/// assert_eq!(uri, "/users/alice");
///
/// let matched = template.matches("/users/alice?verbose=true")?.unwrap();
/// assert_eq!(matched.get("id").unwrap().as_text(), Some("alice"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    text: String,
    parts: Vec<TemplatePart>,
}

impl UriTemplate {
    /// Parses a template, validating the literal and expression grammar.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for unbalanced or nested braces, empty
    /// expressions, whitespace inside an expression, operators the RFC
    /// reserves for future use, invalid varspecs, and literal text
    /// outside the RFC literal character set.
    pub fn parse(input: impl Into<String>) -> Result<Self, ParseError> {
        let text = input.into();
        match parse_parts(&text) {
            Ok(parts) => Ok(Self { text, parts }),
            Err(kind) => Err(ParseError { input: text, kind }),
        }
    }

    /// The original template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The literal and expression parts, in template order.
    #[must_use]
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// Variable names in order of first appearance, without duplicates.
    #[must_use]
    pub fn var_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for part in &self.parts {
            if let TemplatePart::Expression { varspecs, .. } = part {
                for spec in varspecs {
                    if !names.contains(&spec.name()) {
                        names.push(spec.name());
                    }
                }
            }
        }
        names
    }

    /// Expands the template with `values`.
    ///
    /// Absent variables and empty composites contribute nothing; an
    /// expression none of whose variables contribute produces no text at
    /// all, not even its introducer.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::PrefixOnComposite`] when a prefix modifier
    /// is applied to a list or associative-array value.
    pub fn expand(&self, values: &Values) -> Result<String, ExpandError> {
        expand_parts(&self.parts, values)
    }

    /// Expands the template and resolves the result against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::BaseNotAbsolute`] when `base` carries no
    /// scheme, or any error [`expand`](Self::expand) can return.
    pub fn expand_with_base(&self, base: &str, values: &Values) -> Result<String, ExpandError> {
        if !is_absolute(base) {
            return Err(ExpandError::BaseNotAbsolute { base: base.to_owned() });
        }
        let expanded = self.expand(values)?;
        Ok(resolve(base, &expanded))
    }

    /// Matches `candidate` against the template without hints.
    ///
    /// `Ok(None)` means the candidate cannot be an expansion of this
    /// template; `Ok(Some(_))` carries one binding per variable present.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InconsistentBinding`] when a variable bound
    /// in several expressions takes conflicting values.
    pub fn matches(&self, candidate: &str) -> Result<Option<MatchResult>, MatchError> {
        self.matches_with(candidate, &MatchHints::new())
    }

    /// Matches `candidate` with shape and presence hints.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EmptyHintName`] for a hint with an empty
    /// name, [`MatchError::IncompatibleHint`] for a composite hint on a
    /// prefixed variable or a variable hinted as both list and
    /// associative array, and [`MatchError::InconsistentBinding`] for
    /// conflicting bindings.
    pub fn matches_with(
        &self,
        candidate: &str,
        hints: &MatchHints,
    ) -> Result<Option<MatchResult>, MatchError> {
        hints.validate()?;
        self.check_hints(hints)?;
        let program = build_program(&self.parts, hints);
        match execute(&program, candidate) {
            None => Ok(None),
            Some(caps) => interpret(&self.parts, &program.vars, &caps, candidate, hints),
        }
    }

    /// Matches `candidate` after making it relative to the absolute URI
    /// `base`.
    ///
    /// The candidate is tried with the base prefix stripped, then in
    /// the fully relativized form, and only then as-is; the first form
    /// the template matches wins, so a template that could match both
    /// binds the relative text.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::BaseNotAbsolute`] when `base` carries no
    /// scheme, or any error [`matches_with`](Self::matches_with) can
    /// return.
    pub fn matches_with_base(
        &self,
        base: &str,
        candidate: &str,
        hints: &MatchHints,
    ) -> Result<Option<MatchResult>, MatchError> {
        if !is_absolute(base) {
            return Err(MatchError::BaseNotAbsolute { base: base.to_owned() });
        }
        let mut attempts: Vec<Cow<'_, str>> = Vec::new();
        let trimmed = base.trim_end_matches('/');
        if let Some(rest) = candidate.strip_prefix(trimmed) {
            if rest.is_empty() || rest.starts_with(['/', '?', '#']) {
                attempts.push(Cow::Borrowed(rest));
            }
        }
        attempts.push(Cow::Owned(make_relative(base, candidate)));
        attempts.push(Cow::Borrowed(candidate));
        for attempt in attempts {
            if let Some(result) = self.matches_with(&attempt, hints)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    fn check_hints(&self, hints: &MatchHints) -> Result<(), MatchError> {
        for part in &self.parts {
            let TemplatePart::Expression { varspecs, .. } = part else {
                continue;
            };
            for spec in varspecs {
                let name = spec.name();
                let composite_hint = hints.is_list(name) || hints.is_assoc(name);
                if (hints.is_list(name) && hints.is_assoc(name))
                    || (spec.prefix_len().is_some() && composite_hint)
                {
                    return Err(MatchError::IncompatibleHint { name: name.to_owned() });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for UriTemplate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for UriTemplate {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for UriTemplate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for UriTemplate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}

fn parse_parts(input: &str) -> Result<Vec<TemplatePart>, ParseErrorKind> {
    let mut parts = Vec::new();
    let mut pos = 0;
    while pos < input.len() {
        let Some(rel) = input[pos..].find(['{', '}']) else {
            validate_literal(&input[pos..], pos)?;
            parts.push(TemplatePart::Literal(input[pos..].to_owned()));
            break;
        };
        let brace = pos + rel;
        if brace > pos {
            validate_literal(&input[pos..brace], pos)?;
            parts.push(TemplatePart::Literal(input[pos..brace].to_owned()));
        }
        if input.as_bytes()[brace] == b'}' {
            return Err(ParseErrorKind::UnbalancedBrace { position: brace });
        }
        let Some(close_rel) = input[brace + 1..].find(['{', '}']) else {
            return Err(ParseErrorKind::UnbalancedBrace { position: brace });
        };
        let close = brace + 1 + close_rel;
        if input.as_bytes()[close] == b'{' {
            return Err(ParseErrorKind::UnbalancedBrace { position: close });
        }
        parts.push(parse_expression(&input[brace + 1..close], brace)?);
        pos = close + 1;
    }
    Ok(parts)
}

fn parse_expression(body: &str, open: usize) -> Result<TemplatePart, ParseErrorKind> {
    if let Some((i, c)) = body.char_indices().find(|(_, c)| c.is_whitespace()) {
        return Err(ParseErrorKind::Whitespace { char: c, position: open + 1 + i });
    }
    let Some(head) = body.chars().next() else {
        return Err(ParseErrorKind::EmptyExpression { position: open });
    };
    let (operator, rest) = if let Some(op) = Operator::from_char(head) {
        (op, &body[head.len_utf8()..])
    } else if Operator::is_reserved_for_future(head) {
        return Err(ParseErrorKind::UnsupportedOperator { operator: head, position: open + 1 });
    } else {
        (Operator::Simple, body)
    };
    if rest.is_empty() {
        return Err(ParseErrorKind::EmptyExpression { position: open });
    }
    let varspecs = rest
        .split(',')
        .map(|token| VarSpec::parse(token).map_err(ParseErrorKind::InvalidVarspec))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TemplatePart::Expression { operator, varspecs })
}
