//! Variable references inside template expressions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::VarSpecError;

/// Largest prefix length the RFC grammar permits.
pub const MAX_PREFIX_LENGTH: u16 = 9999;

/// Modifier carried by a varspec.
///
/// `Prefix` and `Explode` are mutually exclusive; parsing rejects a varspec
/// that combines them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modifier {
    /// No modifier
    #[default]
    None,
    /// `:N` — expand only the first N code points of a string value
    Prefix(u16),
    /// `*` — expand list/map contents as separate items
    Explode,
}

/// A parsed variable reference from a template expression.
///
/// # Examples
///
/// ```
/// use uri_template::{Modifier, VarSpec};
///
/// let spec = VarSpec::parse("name:3").unwrap();
/// assert_eq!(spec.name(), "name");
/// assert_eq!(spec.modifier(), Modifier::Prefix(3));
/// assert_eq!(spec.to_string(), "name:3");
///
/// let spec = VarSpec::parse("list*").unwrap();
/// assert!(spec.is_explode());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarSpec {
    name: String,
    modifier: Modifier,
}

impl VarSpec {
    /// Parses a varspec token (the text between commas in an expression).
    ///
    /// # Errors
    ///
    /// Returns `VarSpecError` if the token is empty, the name violates the
    /// `varname` grammar, the prefix length is not an integer in 1..=9999,
    /// or the token combines `:N` with `*`.
    pub fn parse(input: &str) -> Result<Self, VarSpecError> {
        if input.is_empty() {
            return Err(VarSpecError::Empty);
        }

        let (name, modifier) = if let Some(stripped) = input.strip_suffix('*') {
            if stripped.contains(':') {
                return Err(VarSpecError::PrefixWithExplode);
            }
            (stripped, Modifier::Explode)
        } else if let Some(colon) = input.find(':') {
            let name = &input[..colon];
            if name.contains('*') {
                return Err(VarSpecError::PrefixWithExplode);
            }
            let digits = &input[colon + 1..];
            (name, Modifier::Prefix(Self::parse_prefix(digits)?))
        } else {
            (input, Modifier::None)
        };

        Self::validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            modifier,
        })
    }

    fn parse_prefix(digits: &str) -> Result<u16, VarSpecError> {
        let invalid = |reason| VarSpecError::InvalidPrefixLength {
            value: digits.to_string(),
            reason,
        };
        if digits.is_empty() {
            return Err(invalid("length is missing"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("length must be an integer"));
        }
        if digits.starts_with('0') {
            return Err(invalid("length must not be zero or zero-padded"));
        }
        if digits.len() > 4 {
            return Err(invalid("length exceeds 9999"));
        }
        let n: u16 = digits
            .parse()
            .map_err(|_| invalid("length exceeds 9999"))?;
        debug_assert!(n >= 1 && n <= MAX_PREFIX_LENGTH);
        Ok(n)
    }

    /// Validates a variable name against the `varname` grammar: `varchar`
    /// groups (ALPHA / DIGIT / `_` / pct-triplet) singly separated by dots.
    fn validate_name(name: &str) -> Result<(), VarSpecError> {
        if name.is_empty() {
            return Err(VarSpecError::Empty);
        }
        let bytes = name.as_bytes();
        let mut i = 0;
        let mut prev_was_dot = true; // a dot at position 0 is misplaced
        while i < name.len() {
            match bytes[i] {
                b'.' => {
                    if prev_was_dot {
                        return Err(VarSpecError::MisplacedDot { position: i });
                    }
                    prev_was_dot = true;
                    i += 1;
                }
                b'%' => {
                    if i + 2 >= name.len()
                        || !bytes[i + 1].is_ascii_hexdigit()
                        || !bytes[i + 2].is_ascii_hexdigit()
                    {
                        return Err(VarSpecError::IncompletePercentTriplet { position: i });
                    }
                    prev_was_dot = false;
                    i += 3;
                }
                b if b.is_ascii_alphanumeric() || b == b'_' => {
                    prev_was_dot = false;
                    i += 1;
                }
                _ => {
                    // Report the full character, not the leading byte.
                    let c = name[i..].chars().next().unwrap_or('\u{FFFD}');
                    return Err(VarSpecError::InvalidChar { char: c, position: i });
                }
            }
        }
        if prev_was_dot {
            return Err(VarSpecError::MisplacedDot { position: name.len() - 1 });
        }
        Ok(())
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the modifier.
    #[must_use]
    pub const fn modifier(&self) -> Modifier {
        self.modifier
    }

    /// Returns the prefix length, if the varspec carries a `:N` modifier.
    #[must_use]
    pub const fn prefix_len(&self) -> Option<u16> {
        match self.modifier {
            Modifier::Prefix(n) => Some(n),
            _ => None,
        }
    }

    /// Returns true if the varspec carries the `*` explode modifier.
    #[must_use]
    pub const fn is_explode(&self) -> bool {
        matches!(self.modifier, Modifier::Explode)
    }
}

impl fmt::Display for VarSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match self.modifier {
            Modifier::None => Ok(()),
            Modifier::Prefix(n) => write!(f, ":{n}"),
            Modifier::Explode => write!(f, "*"),
        }
    }
}

impl FromStr for VarSpec {
    type Err = VarSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for VarSpec {
    type Error = VarSpecError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl PartialOrd for VarSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VarSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for VarSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for VarSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_name() {
        let spec = VarSpec::parse("var").unwrap();
        assert_eq!(spec.name(), "var");
        assert_eq!(spec.modifier(), Modifier::None);
    }

    #[test]
    fn parse_prefix() {
        let spec = VarSpec::parse("var:30").unwrap();
        assert_eq!(spec.prefix_len(), Some(30));
        assert_eq!(spec.to_string(), "var:30");
    }

    #[test]
    fn parse_explode() {
        let spec = VarSpec::parse("list*").unwrap();
        assert!(spec.is_explode());
        assert_eq!(spec.to_string(), "list*");
    }

    #[test]
    fn parse_dotted_name() {
        let spec = VarSpec::parse("a.b.c").unwrap();
        assert_eq!(spec.name(), "a.b.c");
    }

    #[test]
    fn parse_pct_encoded_name() {
        let spec = VarSpec::parse("%41%42").unwrap();
        assert_eq!(spec.name(), "%41%42");
    }

    #[test]
    fn parse_underscore_and_digits() {
        let spec = VarSpec::parse("var_1").unwrap();
        assert_eq!(spec.name(), "var_1");
    }

    #[test]
    fn parse_empty_fails() {
        assert!(matches!(VarSpec::parse(""), Err(VarSpecError::Empty)));
    }

    #[test]
    fn parse_hyphen_fails() {
        // Common pitfall: hyphens are not varname characters.
        assert!(matches!(
            VarSpec::parse("var-name"),
            Err(VarSpecError::InvalidChar { char: '-', position: 3 })
        ));
    }

    #[test]
    fn parse_leading_dot_fails() {
        assert!(matches!(
            VarSpec::parse(".var"),
            Err(VarSpecError::MisplacedDot { position: 0 })
        ));
    }

    #[test]
    fn parse_trailing_dot_fails() {
        assert!(matches!(
            VarSpec::parse("var."),
            Err(VarSpecError::MisplacedDot { .. })
        ));
    }

    #[test]
    fn parse_doubled_dot_fails() {
        assert!(matches!(
            VarSpec::parse("a..b"),
            Err(VarSpecError::MisplacedDot { position: 2 })
        ));
    }

    #[test]
    fn parse_zero_prefix_fails() {
        assert!(matches!(
            VarSpec::parse("var:0"),
            Err(VarSpecError::InvalidPrefixLength { .. })
        ));
    }

    #[test]
    fn parse_huge_prefix_fails() {
        assert!(matches!(
            VarSpec::parse("var:10000"),
            Err(VarSpecError::InvalidPrefixLength { .. })
        ));
    }

    #[test]
    fn parse_non_integer_prefix_fails() {
        assert!(matches!(
            VarSpec::parse("var:1x"),
            Err(VarSpecError::InvalidPrefixLength { .. })
        ));
    }

    #[test]
    fn parse_prefix_with_explode_fails() {
        assert!(matches!(
            VarSpec::parse("var:1*"),
            Err(VarSpecError::PrefixWithExplode)
        ));
        assert!(matches!(
            VarSpec::parse("var*:1"),
            Err(VarSpecError::PrefixWithExplode)
        ));
    }

    #[test]
    fn parse_incomplete_pct_fails() {
        assert!(matches!(
            VarSpec::parse("%4"),
            Err(VarSpecError::IncompletePercentTriplet { position: 0 })
        ));
        assert!(matches!(
            VarSpec::parse("a%GG"),
            Err(VarSpecError::IncompletePercentTriplet { position: 1 })
        ));
    }

    #[test]
    fn max_prefix_accepted() {
        let spec = VarSpec::parse("v:9999").unwrap();
        assert_eq!(spec.prefix_len(), Some(9999));
    }
}
