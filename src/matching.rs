//! Match hints, capture interpretation, and binding reconciliation.
//!
//! The engine reports raw capture spans; this module turns them into
//! decoded [`Value`]s, applies the caller's hints, and reconciles the
//! bindings of a variable that appears in several expressions of the same
//! template.

use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt;

use crate::encode::decode;
use crate::error::MatchError;
use crate::matcher::{Captures, VarSlots};
use crate::part::TemplatePart;
use crate::value::{Value, Values};
use crate::varspec::VarSpec;

/// Caller knowledge that narrows how a candidate URI is read back.
///
/// Matching without hints accepts any shape a variable could have
/// produced; hints pin a variable to one shape (`list`, `assoc`) or
/// make its presence mandatory (`require`).
///
/// ```
/// use uri_template::MatchHints;
///
/// let hints = MatchHints::new().require("id").list("tags");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchHints {
    required: BTreeSet<String>,
    lists: BTreeSet<String>,
    assocs: BTreeSet<String>,
}

impl MatchHints {
    /// Creates an empty hint set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as required: a match without a non-empty binding for
    /// it is rejected.
    #[must_use]
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.insert(name.into());
        self
    }

    /// Pins `name` to the list shape.
    #[must_use]
    pub fn list(mut self, name: impl Into<String>) -> Self {
        self.lists.insert(name.into());
        self
    }

    /// Pins `name` to the associative-array shape.
    #[must_use]
    pub fn assoc(mut self, name: impl Into<String>) -> Self {
        self.assocs.insert(name.into());
        self
    }

    /// Marks every name in `names` as required.
    #[must_use]
    pub fn require_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Pins every name in `names` to the list shape.
    #[must_use]
    pub fn list_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lists.extend(names.into_iter().map(Into::into));
        self
    }

    /// Pins every name in `names` to the associative-array shape.
    #[must_use]
    pub fn assoc_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assocs.extend(names.into_iter().map(Into::into));
        self
    }

    /// Returns `true` when no hint has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.lists.is_empty() && self.assocs.is_empty()
    }

    pub(crate) fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    pub(crate) fn is_list(&self, name: &str) -> bool {
        self.lists.contains(name)
    }

    pub(crate) fn is_assoc(&self, name: &str) -> bool {
        self.assocs.contains(name)
    }

    pub(crate) fn required_names(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    pub(crate) fn validate(&self) -> Result<(), MatchError> {
        let all = self
            .required
            .iter()
            .chain(&self.lists)
            .chain(&self.assocs);
        for name in all {
            if name.is_empty() {
                return Err(MatchError::EmptyHintName);
            }
        }
        Ok(())
    }
}

/// One matched variable: the varspec occurrence the value was read
/// through, and the decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Binding {
    varspec: VarSpec,
    value: Value,
}

impl Binding {
    /// The varspec this binding was read through. For a variable bound in
    /// several expressions this is the occurrence with the longest
    /// effective length.
    #[must_use]
    pub fn varspec(&self) -> &VarSpec {
        &self.varspec
    }

    /// The decoded value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A successful match: one reconciled binding per variable that was
/// present in the candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MatchResult {
    bindings: BTreeMap<String, Binding>,
}

impl MatchResult {
    /// Looks up the value bound to `name`, if the variable was present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).map(Binding::value)
    }

    /// Looks up the full binding for `name`.
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Looks up the varspec that captured `name`, with its operator-level
    /// modifier intact.
    #[must_use]
    pub fn varspec(&self, name: &str) -> Option<&VarSpec> {
        self.bindings.get(name).map(Binding::varspec)
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` when no variable was bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates over bindings in variable-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(name, b)| (name.as_str(), b))
    }

    /// Converts the bindings into a [`Values`] map, suitable for
    /// re-expansion through the same template.
    #[must_use]
    pub fn to_values(&self) -> Values {
        self.bindings
            .iter()
            .map(|(name, b)| (name.clone(), b.value.clone()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a MatchResult {
    type Item = (&'a String, &'a Binding);
    type IntoIter = btree_map::Iter<'a, String, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, binding) in &self.bindings {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{name}={}", binding.value)?;
        }
        Ok(())
    }
}

/// Turns raw capture spans into a [`MatchResult`].
///
/// Returns `Ok(None)` when a captured span does not decode to valid
/// UTF-8 or a required variable is absent; those candidates simply do
/// not match. Conflicting bindings of one variable are an error.
pub(crate) fn interpret(
    parts: &[TemplatePart],
    vars: &[VarSlots],
    caps: &Captures,
    input: &str,
    hints: &MatchHints,
) -> Result<Option<MatchResult>, MatchError> {
    let mut groups: BTreeMap<&str, Vec<(VarSpec, Value)>> = BTreeMap::new();
    for vs in vars {
        let TemplatePart::Expression { varspecs, .. } = &parts[vs.part] else {
            continue;
        };
        let spec = &varspecs[vs.var];
        let keys = &caps.spans[vs.key];
        let items = &caps.spans[vs.item];

        let value = if keys.is_empty() {
            if items.is_empty() {
                // Variable skipped in this expression.
                continue;
            }
            let mut decoded = Vec::with_capacity(items.len());
            for &(start, end) in items {
                let Some(text) = decode(&input[start..end]) else {
                    return Ok(None);
                };
                decoded.push(text);
            }
            if decoded.len() > 1 || hints.is_list(spec.name()) {
                Value::List(decoded)
            } else {
                Value::Text(decoded.pop().unwrap_or_default())
            }
        } else {
            let entries = &caps.spans[vs.entry];
            let mut pairs = Vec::with_capacity(keys.len());
            for (key_span, entry_span) in keys.iter().zip(entries) {
                let Some(key) = decode(&input[key_span.0..key_span.1]) else {
                    return Ok(None);
                };
                let Some(entry) = decode(&input[entry_span.0..entry_span.1]) else {
                    return Ok(None);
                };
                pairs.push((key, entry));
            }
            Value::Assoc(pairs)
        };
        groups.entry(spec.name()).or_default().push((spec.clone(), value));
    }

    let mut bindings = BTreeMap::new();
    for (name, instances) in groups {
        let binding = reconcile(name, instances)?;
        bindings.insert(name.to_owned(), binding);
    }

    for name in hints.required_names() {
        match bindings.get(name) {
            None => return Ok(None),
            Some(b) if b.value.is_empty_composite() => return Ok(None),
            Some(_) => {}
        }
    }

    Ok(Some(MatchResult { bindings }))
}

/// Effective visible length of a binding through `spec`: the prefix
/// length if one applies, unlimited otherwise.
fn effective_len(spec: &VarSpec) -> usize {
    spec.prefix_len().map_or(usize::MAX, usize::from)
}

/// Two composite values agree when equal; map order is not significant.
fn composites_agree(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Assoc(x), Value::Assoc(y)) => {
            let mut x = x.clone();
            let mut y = y.clone();
            x.sort();
            y.sort();
            x == y
        }
        _ => a == b,
    }
}

/// Folds the per-occurrence bindings of one variable into a single one.
///
/// Text values seen through different prefix lengths only show prefixes
/// of the underlying value, so the shorter must be a prefix of the
/// longer, and the longer wins. Everything else must agree exactly.
fn reconcile(name: &str, mut instances: Vec<(VarSpec, Value)>) -> Result<Binding, MatchError> {
    let (mut spec, mut value) = instances.remove(0);
    for (next_spec, next_value) in instances {
        match (&value, &next_value) {
            (Value::Text(a), Value::Text(b)) => {
                let cur = effective_len(&spec);
                let next = effective_len(&next_spec);
                let consistent = if cur == next {
                    a == b
                } else if cur < next {
                    b.starts_with(a.as_str())
                } else {
                    a.starts_with(b.as_str())
                };
                if !consistent {
                    return Err(MatchError::InconsistentBinding { name: name.to_owned() });
                }
                if next > cur {
                    spec = next_spec;
                    value = next_value;
                }
            }
            _ => {
                if !composites_agree(&value, &next_value) {
                    return Err(MatchError::InconsistentBinding { name: name.to_owned() });
                }
            }
        }
    }
    Ok(Binding { varspec: spec, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(s: &str) -> VarSpec {
        s.parse().unwrap()
    }

    #[test]
    fn hints_validate_rejects_empty_name() {
        assert!(MatchHints::new().require("x").validate().is_ok());
        assert_eq!(
            MatchHints::new().list("").validate(),
            Err(MatchError::EmptyHintName)
        );
    }

    #[test]
    fn reconcile_single_instance() {
        let binding = reconcile("x", vec![(spec("x"), Value::text("abc"))]).unwrap();
        assert_eq!(binding.value(), &Value::text("abc"));
    }

    #[test]
    fn reconcile_prefix_keeps_longer() {
        let binding = reconcile(
            "x",
            vec![
                (spec("x:3"), Value::text("val")),
                (spec("x"), Value::text("value")),
            ],
        )
        .unwrap();
        assert_eq!(binding.value(), &Value::text("value"));
        assert!(binding.varspec().prefix_len().is_none());
    }

    #[test]
    fn reconcile_prefix_mismatch_is_error() {
        let err = reconcile(
            "x",
            vec![
                (spec("x:3"), Value::text("abc")),
                (spec("x"), Value::text("xyzzy")),
            ],
        )
        .unwrap_err();
        assert_eq!(err, MatchError::InconsistentBinding { name: "x".into() });
    }

    #[test]
    fn reconcile_equal_lengths_must_be_equal() {
        assert!(reconcile(
            "x",
            vec![(spec("x"), Value::text("a")), (spec("x"), Value::text("a"))],
        )
        .is_ok());
        assert!(reconcile(
            "x",
            vec![(spec("x"), Value::text("a")), (spec("x"), Value::text("b"))],
        )
        .is_err());
    }

    #[test]
    fn reconcile_assoc_ignores_order() {
        let first = Value::assoc(vec![("a", "1"), ("b", "2")]);
        let second = Value::assoc(vec![("b", "2"), ("a", "1")]);
        assert!(reconcile("m", vec![(spec("m*"), first), (spec("m*"), second)]).is_ok());
    }

    #[test]
    fn reconcile_text_against_composite_is_error() {
        let err = reconcile(
            "x",
            vec![
                (spec("x"), Value::text("a")),
                (spec("x*"), Value::list(vec!["a", "b"])),
            ],
        )
        .unwrap_err();
        assert_eq!(err, MatchError::InconsistentBinding { name: "x".into() });
    }
}
