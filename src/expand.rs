//! Expansion of parsed template parts against a variable environment.

use crate::encode::encode_into;
use crate::error::ExpandError;
use crate::operator::Operator;
use crate::part::TemplatePart;
use crate::value::{Value, Values};
use crate::varspec::VarSpec;

/// Renders `parts` using `values` into URI text.
pub(crate) fn expand_parts(parts: &[TemplatePart], values: &Values) -> Result<String, ExpandError> {
    let mut out = String::new();
    for part in parts {
        match part {
            TemplatePart::Literal(text) => out.push_str(text),
            TemplatePart::Expression { operator, varspecs } => {
                expand_expression(*operator, varspecs, values, &mut out)?;
            }
        }
    }
    Ok(out)
}

fn expand_expression(
    op: Operator,
    varspecs: &[VarSpec],
    values: &Values,
    out: &mut String,
) -> Result<(), ExpandError> {
    let mut first = true;
    for spec in varspecs {
        let Some(value) = values.get(spec.name()) else {
            continue;
        };
        if value.is_empty_composite() {
            continue;
        }
        // The first variable that contributes emits the operator's
        // introducer; the rest emit its separator.
        if first {
            out.push_str(op.first());
            first = false;
        } else {
            out.push(op.separator());
        }
        render_value(op, spec, value, out)?;
    }
    Ok(())
}

fn render_value(
    op: Operator,
    spec: &VarSpec,
    value: &Value,
    out: &mut String,
) -> Result<(), ExpandError> {
    match value {
        Value::Text(text) => {
            let truncated;
            let text = match spec.prefix_len() {
                Some(n) => {
                    truncated = truncate(text, usize::from(n));
                    truncated
                }
                None => text.as_str(),
            };
            if op.named() {
                render_named_item(op, spec.name(), text, out);
            } else {
                encode_into(text, op.allows_reserved(), out);
            }
        }
        Value::List(items) => {
            if spec.prefix_len().is_some() {
                return Err(ExpandError::PrefixOnComposite {
                    name: spec.name().to_string(),
                });
            }
            if spec.is_explode() {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(op.separator());
                    }
                    if op.named() {
                        render_named_item(op, spec.name(), item, out);
                    } else {
                        encode_into(item, op.allows_reserved(), out);
                    }
                }
            } else {
                let mut joined = String::new();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        joined.push(',');
                    }
                    encode_into(item, op.allows_reserved(), &mut joined);
                }
                render_joined(op, spec.name(), &joined, out);
            }
        }
        Value::Assoc(pairs) => {
            if spec.prefix_len().is_some() {
                return Err(ExpandError::PrefixOnComposite {
                    name: spec.name().to_string(),
                });
            }
            if spec.is_explode() {
                for (i, (key, entry)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push(op.separator());
                    }
                    encode_into(key, op.allows_reserved(), out);
                    if op.named() && entry.is_empty() {
                        out.push_str(op.ifemp());
                    } else {
                        out.push('=');
                        encode_into(entry, op.allows_reserved(), out);
                    }
                }
            } else {
                let mut joined = String::new();
                for (i, (key, entry)) in pairs.iter().enumerate() {
                    if i > 0 {
                        joined.push(',');
                    }
                    encode_into(key, op.allows_reserved(), &mut joined);
                    joined.push(',');
                    encode_into(entry, op.allows_reserved(), &mut joined);
                }
                render_joined(op, spec.name(), &joined, out);
            }
        }
    }
    Ok(())
}

/// Renders one `name=value` item of a named operator, applying the
/// operator's empty-value rule.
fn render_named_item(op: Operator, name: &str, raw: &str, out: &mut String) {
    out.push_str(name);
    if raw.is_empty() {
        out.push_str(op.ifemp());
    } else {
        out.push('=');
        encode_into(raw, op.allows_reserved(), out);
    }
}

/// Renders an already-encoded comma-joined composite, with the single
/// `name=` prefix for named operators.
fn render_joined(op: Operator, name: &str, joined: &str, out: &mut String) {
    if op.named() {
        out.push_str(name);
        if joined.is_empty() {
            out.push_str(op.ifemp());
        } else {
            out.push('=');
            out.push_str(joined);
        }
    } else {
        out.push_str(joined);
    }
}

/// First `n` code points of `text`.
fn truncate(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::UriTemplate;

    fn expand(template: &str, values: &Values) -> String {
        UriTemplate::parse(template).unwrap().expand(values).unwrap()
    }

    #[test]
    fn simple_escapes_reserved() {
        let values = Values::new().set("x", "A :B");
        assert_eq!(expand("{x}", &values), "A%20%3AB");
    }

    #[test]
    fn reserved_passes_reserved() {
        let values = Values::new().set("x", "A :B");
        assert_eq!(expand("{+x}", &values), "A%20:B");
    }

    #[test]
    fn fragment_introducer() {
        let values = Values::new().set("x", "A :B");
        assert_eq!(expand("{#x}", &values), "#A%20:B");
    }

    #[test]
    fn label_and_path() {
        let values = Values::new().set("x", "A :B");
        assert_eq!(expand("{.x}", &values), ".A%20%3AB");
        assert_eq!(expand("{/x}", &values), "/A%20%3AB");
    }

    #[test]
    fn named_operators() {
        let values = Values::new().set("x", "A :B");
        assert_eq!(expand("{;x}", &values), ";x=A%20%3AB");
        assert_eq!(expand("{?x}", &values), "?x=A%20%3AB");
        assert_eq!(expand("{&x}", &values), "&x=A%20%3AB");
    }

    #[test]
    fn empty_value_named_rules() {
        let values = Values::new().set("y", "");
        assert_eq!(expand("x{?y}", &values), "x?y=");
        assert_eq!(expand("x{;y}", &values), "x;y");
        assert_eq!(expand("x{&y}", &values), "x&y=");
    }

    #[test]
    fn absent_variable_contributes_nothing() {
        let values = Values::new();
        assert_eq!(expand("x{?y}z", &values), "xz");
        assert_eq!(expand("x{+y}z", &values), "xz");
    }

    #[test]
    fn absent_skips_separator_too() {
        let values = Values::new().set("a", "A").set("c", "C");
        assert_eq!(expand("{?a,b,c}", &values), "?a=A&c=C");
    }

    #[test]
    fn introducer_from_first_contributor() {
        let values = Values::new().set("c", "C");
        assert_eq!(expand("{?a,b,c}", &values), "?c=C");
    }

    #[test]
    fn prefix_truncates_before_encoding() {
        let values = Values::new().set("var", "value");
        assert_eq!(expand("{var:3}", &values), "val");
        let values = Values::new().set("semi", ";");
        assert_eq!(expand("{semi:2}", &values), "%3B");
    }

    #[test]
    fn prefix_counts_code_points() {
        let values = Values::new().set("v", "\u{fc}\u{fc}\u{fc}");
        assert_eq!(expand("{v:2}", &values), "%C3%BC%C3%BC");
    }

    #[test]
    fn prefix_on_list_fails() {
        let template = UriTemplate::parse("{x:2}").unwrap();
        let values = Values::new().set("x", vec!["a", "b"]);
        assert!(matches!(
            template.expand(&values),
            Err(ExpandError::PrefixOnComposite { .. })
        ));
    }

    #[test]
    fn prefix_on_assoc_fails() {
        let template = UriTemplate::parse("{x:2}").unwrap();
        let values = Values::new().set("x", vec![("a", "b")]);
        assert!(matches!(
            template.expand(&values),
            Err(ExpandError::PrefixOnComposite { .. })
        ));
    }

    #[test]
    fn list_explode_unnamed() {
        let values = Values::new().set("y", vec!["A", "", "B"]);
        assert_eq!(expand("x{/y*}", &values), "x/A//B");
        let values = Values::new().set("list", vec!["red", "green", "blue"]);
        assert_eq!(expand("{/list*}", &values), "/red/green/blue");
    }

    #[test]
    fn list_explode_named() {
        let values = Values::new().set("y", vec!["A", "", "B"]);
        assert_eq!(expand("x{;y*}", &values), "x;y=A;y;y=B");
        assert_eq!(expand("x{?y*}", &values), "x?y=A&y=&y=B");
    }

    #[test]
    fn list_joined() {
        let values = Values::new().set("y", vec!["A", "", "B"]);
        assert_eq!(expand("x{+y}z", &values), "xA,,Bz");
        assert_eq!(expand("x{?y}", &values), "x?y=A,,B");
        assert_eq!(expand("{.y}", &values), ".A,,B");
    }

    #[test]
    fn assoc_explode_unnamed() {
        let values = Values::new().set("y", vec![("a", "A"), ("b", ""), ("c", "C")]);
        assert_eq!(expand("x{/y*}", &values), "x/a=A/b=/c=C");
    }

    #[test]
    fn assoc_explode_named() {
        let values = Values::new().set("y", vec![("a", "A"), ("b", ""), ("c", "C")]);
        assert_eq!(expand("x{;y*}", &values), "x;a=A;b;c=C");
        assert_eq!(expand("x{?y*}", &values), "x?a=A&b=&c=C");
    }

    #[test]
    fn assoc_joined() {
        let values = Values::new().set("y", vec![("a", "A"), ("b", ""), ("c", "C")]);
        assert_eq!(expand("x{+y}z", &values), "xa,A,b,,c,Cz");
        assert_eq!(expand("x{?y}", &values), "x?y=a,A,b,,c,C");
    }

    #[test]
    fn assoc_joined_encodes_values() {
        let values = Values::new().set("keys", vec![("dot", "."), ("semi", ";")]);
        assert_eq!(expand("{?keys}", &values), "?keys=dot,.,semi,%3B");
    }

    #[test]
    fn empty_composites_skipped() {
        let values = Values::new()
            .set("l", Value::list([] as [&str; 0]))
            .set("m", Value::assoc([] as [(&str, &str); 0]));
        assert_eq!(expand("x{?l,m}", &values), "x");
        assert_eq!(expand("x{/l*}", &values), "x");
    }

    #[test]
    fn multiple_variables_share_introducer() {
        let values = Values::new().set("x", "1024").set("y", "768");
        assert_eq!(expand("{x,y}", &values), "1024,768");
        assert_eq!(expand("{?x,y}", &values), "?x=1024&y=768");
        assert_eq!(expand("{/x,y}", &values), "/1024/768");
        assert_eq!(expand("{.x,y}", &values), ".1024.768");
    }

    #[test]
    fn literal_passthrough() {
        let values = Values::new().set("x", "X");
        assert_eq!(expand("a/b?c=d{&x}", &values), "a/b?c=d&x=X");
    }
}
