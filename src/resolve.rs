//! RFC 3986 reference resolution and relativization.
//!
//! Expansion and matching against a base URI need plain reference
//! resolution (section 5.2) and its inverse. Both work on a lightweight
//! component split; no URI validation happens here, the template layer
//! already constrains what can reach these functions.

/// Component view over a URI reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Components<'a> {
    scheme: Option<&'a str>,
    authority: Option<&'a str>,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

fn valid_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn split(uri: &str) -> Components<'_> {
    let (rest, fragment) = match uri.split_once('#') {
        Some((r, f)) => (r, Some(f)),
        None => (uri, None),
    };
    let (rest, query) = match rest.split_once('?') {
        Some((r, q)) => (r, Some(q)),
        None => (rest, None),
    };
    let (scheme, rest) = match rest.split_once(':') {
        Some((s, r)) if valid_scheme(s) => (Some(s), r),
        _ => (None, rest),
    };
    let (authority, path) = match rest.strip_prefix("//") {
        Some(after) => {
            let end = after.find('/').unwrap_or(after.len());
            (Some(&after[..end]), &after[end..])
        }
        None => (None, rest),
    };
    Components { scheme, authority, path, query, fragment }
}

fn recompose(c: &Components<'_>) -> String {
    let mut out = String::new();
    if let Some(scheme) = c.scheme {
        out.push_str(scheme);
        out.push(':');
    }
    if let Some(authority) = c.authority {
        out.push_str("//");
        out.push_str(authority);
    }
    out.push_str(c.path);
    if let Some(query) = c.query {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = c.fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Whether `uri` is an absolute URI reference (carries a scheme).
pub(crate) fn is_absolute(uri: &str) -> bool {
    split(uri).scheme.is_some()
}

fn pop_segment(out: &mut String) {
    let cut = out.rfind('/').unwrap_or(0);
    out.truncate(cut);
}

/// RFC 3986 section 5.2.4.
fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut out = String::new();
    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            pop_segment(&mut out);
        } else if input == "/.." {
            input = "/";
            pop_segment(&mut out);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            // Move the first segment, with its leading slash if any.
            let skip = usize::from(input.starts_with('/'));
            let end = input[skip..].find('/').map_or(input.len(), |i| i + skip);
            out.push_str(&input[..end]);
            input = &input[end..];
        }
    }
    out
}

/// RFC 3986 section 5.2.3.
fn merge_paths(base: &Components<'_>, reference: &str) -> String {
    if base.authority.is_some() && base.path.is_empty() {
        return format!("/{reference}");
    }
    match base.path.rfind('/') {
        Some(cut) => format!("{}{reference}", &base.path[..=cut]),
        None => reference.to_owned(),
    }
}

/// Resolves `reference` against the absolute URI `base`
/// (RFC 3986 section 5.2.2).
pub(crate) fn resolve(base: &str, reference: &str) -> String {
    let base = split(base);
    let r = split(reference);

    if r.scheme.is_some() {
        let path = remove_dot_segments(r.path);
        return recompose(&Components {
            scheme: r.scheme,
            authority: r.authority,
            path: &path,
            query: r.query,
            fragment: r.fragment,
        });
    }
    if r.authority.is_some() {
        let path = remove_dot_segments(r.path);
        return recompose(&Components {
            scheme: base.scheme,
            authority: r.authority,
            path: &path,
            query: r.query,
            fragment: r.fragment,
        });
    }
    if r.path.is_empty() {
        return recompose(&Components {
            scheme: base.scheme,
            authority: base.authority,
            path: base.path,
            query: r.query.or(base.query),
            fragment: r.fragment,
        });
    }
    let path = if r.path.starts_with('/') {
        remove_dot_segments(r.path)
    } else {
        remove_dot_segments(&merge_paths(&base, r.path))
    };
    recompose(&Components {
        scheme: base.scheme,
        authority: base.authority,
        path: &path,
        query: r.query,
        fragment: r.fragment,
    })
}

/// Rewrites the absolute URI `target` as a reference relative to the
/// absolute URI `base`. Falls back to `target` itself when the two do
/// not share a scheme and authority.
pub(crate) fn make_relative(base: &str, target: &str) -> String {
    let b = split(base);
    let t = split(target);
    if b.scheme != t.scheme || b.authority != t.authority {
        return target.to_owned();
    }

    let mut out = String::new();
    if b.path != t.path {
        let base_segs: Vec<&str> = b.path.split('/').collect();
        let tgt_segs: Vec<&str> = t.path.split('/').collect();
        let base_dir = &base_segs[..base_segs.len().saturating_sub(1)];
        let tgt_dir = &tgt_segs[..tgt_segs.len().saturating_sub(1)];
        let common = base_dir
            .iter()
            .zip(tgt_dir)
            .take_while(|(a, b)| a == b)
            .count();
        for _ in common..base_dir.len() {
            out.push_str("../");
        }
        for seg in &tgt_dir[common..] {
            out.push_str(seg);
            out.push('/');
        }
        if let Some(file) = tgt_segs.last() {
            out.push_str(file);
        }
        if !out.is_empty() && split(&out).scheme.is_some() {
            // A colon in the first segment would read as a scheme.
            out.insert_str(0, "./");
        }
    }
    if out.is_empty() && t.query.is_none() {
        // An empty path reference would inherit the base query, so name
        // the target's own last segment instead.
        match t.path.rsplit('/').next() {
            Some(file) if !file.is_empty() => out.push_str(file),
            _ => out.push_str("./"),
        }
    }
    if let Some(query) = t.query {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = t.fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://a/b/c/d;p?q";

    #[test]
    fn splits_full_uri() {
        let c = split("http://example.com/a/b?x=1#top");
        assert_eq!(c.scheme, Some("http"));
        assert_eq!(c.authority, Some("example.com"));
        assert_eq!(c.path, "/a/b");
        assert_eq!(c.query, Some("x=1"));
        assert_eq!(c.fragment, Some("top"));
    }

    #[test]
    fn relative_reference_has_no_scheme() {
        assert!(!is_absolute("/a/b"));
        assert!(!is_absolute("./g:h"));
        assert!(is_absolute("urn:example:animal"));
    }

    #[test]
    fn normal_resolution_examples() {
        // RFC 3986 section 5.4.1
        for (reference, expected) in [
            ("g", "http://a/b/c/g"),
            ("./g", "http://a/b/c/g"),
            ("g/", "http://a/b/c/g/"),
            ("/g", "http://a/g"),
            ("//g", "http://g"),
            ("?y", "http://a/b/c/d;p?y"),
            ("g?y", "http://a/b/c/g?y"),
            ("#s", "http://a/b/c/d;p?q#s"),
            ("g#s", "http://a/b/c/g#s"),
            ("", "http://a/b/c/d;p?q"),
            (".", "http://a/b/c/"),
            ("./", "http://a/b/c/"),
            ("..", "http://a/b/"),
            ("../", "http://a/b/"),
            ("../g", "http://a/b/g"),
            ("../..", "http://a/"),
            ("../../g", "http://a/g"),
        ] {
            assert_eq!(resolve(BASE, reference), expected, "resolving {reference:?}");
        }
    }

    #[test]
    fn abnormal_resolution_examples() {
        // RFC 3986 section 5.4.2
        for (reference, expected) in [
            ("../../../g", "http://a/g"),
            ("../../../../g", "http://a/g"),
            ("/./g", "http://a/g"),
            ("/../g", "http://a/g"),
            ("g.", "http://a/b/c/g."),
            (".g", "http://a/b/c/.g"),
            ("g..", "http://a/b/c/g.."),
            ("..g", "http://a/b/c/..g"),
        ] {
            assert_eq!(resolve(BASE, reference), expected, "resolving {reference:?}");
        }
    }

    #[test]
    fn absolute_reference_wins() {
        assert_eq!(resolve(BASE, "https://x/y"), "https://x/y");
    }

    #[test]
    fn relativize_sibling() {
        assert_eq!(make_relative("http://a/b/c/d", "http://a/b/c/g"), "g");
    }

    #[test]
    fn relativize_descends_and_climbs() {
        assert_eq!(make_relative("http://a/b/c/d", "http://a/b/x/y"), "../x/y");
        assert_eq!(make_relative("http://a/b/c/d", "http://a/b/c/g/h"), "g/h");
    }

    #[test]
    fn relativize_same_uri_names_last_segment() {
        assert_eq!(make_relative("http://a/b/c", "http://a/b/c"), "c");
        assert_eq!(make_relative("http://a/b/", "http://a/b/"), "./");
    }

    #[test]
    fn relativize_keeps_query_and_fragment() {
        assert_eq!(
            make_relative("http://a/b/c", "http://a/b/g?x=1#top"),
            "g?x=1#top"
        );
    }

    #[test]
    fn relativize_cross_authority_stays_absolute() {
        assert_eq!(make_relative("http://a/b", "http://z/b"), "http://z/b");
    }

    #[test]
    fn relativize_round_trips_through_resolve() {
        let base = "http://a/b/c/d?q";
        for target in [
            "http://a/b/c/g",
            "http://a/x",
            "http://a/b/c/d?other",
            "http://a/b/c/d?q#frag",
        ] {
            let relative = make_relative(base, target);
            assert_eq!(resolve(base, &relative), target, "via {relative:?}");
        }
    }
}
