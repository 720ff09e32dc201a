//! Render-time variable values and the environment map.

use std::collections::BTreeMap;
use std::fmt;

/// A value bound to a variable at expansion time, or recovered by matching.
///
/// Absence is not a `Value` shape: an unbound variable is simply not
/// present in the [`Values`] environment or the match bindings.
///
/// # Examples
///
/// ```
/// use uri_template::Value;
///
/// let s = Value::text("hello");
/// let l = Value::list(["red", "green", "blue"]);
/// let m = Value::assoc([("semi", ";"), ("dot", ".")]);
/// assert_eq!(s.as_text(), Some("hello"));
/// assert_eq!(l.as_list().map(<[String]>::len), Some(3));
/// assert!(m.as_assoc().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A single string
    Text(String),
    /// An ordered list of strings
    List(Vec<String>),
    /// An ordered association of string keys to string values
    Assoc(Vec<(String, String)>),
}

impl Value {
    /// Creates a string value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Creates a list value from any iterator of strings.
    #[must_use]
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Creates a map value from any iterator of key/value pairs; pair order
    /// is preserved.
    #[must_use]
    pub fn assoc<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Assoc(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Returns the string content, if this is a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items, if this is a `List` value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the pairs, if this is an `Assoc` value.
    #[must_use]
    pub fn as_assoc(&self) -> Option<&[(String, String)]> {
        match self {
            Self::Assoc(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// True for an empty list or empty map.
    ///
    /// An empty `Text` is not an empty composite; it still contributes to
    /// an expansion.
    #[must_use]
    pub fn is_empty_composite(&self) -> bool {
        match self {
            Self::Text(_) => false,
            Self::List(items) => items.is_empty(),
            Self::Assoc(pairs) => pairs.is_empty(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Self::list(items)
    }
}

impl From<Vec<(String, String)>> for Value {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::Assoc(pairs)
    }
}

impl From<Vec<(&str, &str)>> for Value {
    fn from(pairs: Vec<(&str, &str)>) -> Self {
        Self::assoc(pairs)
    }
}

// Display is only a debugging convenience; expansion applies its own
// per-operator encoding.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::List(items) => write!(f, "{}", items.join(",")),
            Self::Assoc(pairs) => {
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                Ok(())
            }
        }
    }
}

/// The variable environment supplied to an expansion.
///
/// Maps variable names to [`Value`]s. Construction is chainable:
///
/// ```
/// use uri_template::{UriTemplate, Values};
///
/// let template = UriTemplate::parse("/repos/{owner}/{repo}{?tags*}").unwrap();
/// let values = Values::new()
///     .set("owner", "octocat")
///     .set("repo", "hello-world")
///     .set("tags", vec!["a", "b"]);
/// assert_eq!(
///     template.expand(&values).unwrap(),
///     "/repos/octocat/hello-world?tags=a&tags=b"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Values {
    map: BTreeMap<String, Value>,
}

impl Values {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, replacing any previous binding.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.map.insert(name.into(), value.into());
        self
    }

    /// Removes the binding for `name`, if any.
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.map.remove(name)
    }

    /// Returns the value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name)
    }

    /// Returns true if no variables are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Iterates over bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let values = Values::new().set("a", "1").set("b", vec!["x", "y"]);
        assert_eq!(values.get("a"), Some(&Value::text("1")));
        assert_eq!(values.get("b"), Some(&Value::list(["x", "y"])));
        assert_eq!(values.get("c"), None);
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn set_replaces() {
        let values = Values::new().set("a", "1").set("a", "2");
        assert_eq!(values.get("a"), Some(&Value::text("2")));
    }

    #[test]
    fn assoc_preserves_order() {
        let value = Value::assoc([("z", "1"), ("a", "2")]);
        assert_eq!(
            value.as_assoc().unwrap(),
            &[("z".to_string(), "1".to_string()), ("a".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn empty_composites() {
        assert!(Value::list([] as [&str; 0]).is_empty_composite());
        assert!(Value::assoc([] as [(&str, &str); 0]).is_empty_composite());
        assert!(!Value::text("").is_empty_composite());
    }

    #[test]
    fn from_iterator() {
        let values: Values = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(values.len(), 2);
    }
}
