//! Parser, expander, and matcher for RFC 6570 URI Templates.
//!
//! This crate implements all four levels of the URI Template
//! specification: template parsing, expansion of variables into a URI
//! reference, and the reverse operation of matching a candidate URI back
//! into the variable values that would have produced it.
//!
//! # Overview
//!
//! A URI template mixes literal text with expressions in braces:
//!
//! ```text
//! /repos/{owner}/{repo}/issues{?state,labels*}
//! ```
//!
//! Each expression names an operator (here none, and `?` for query
//! parameters) and a list of variables, optionally carrying a prefix
//! modifier (`{name:3}`) or an explode modifier (`{labels*}`).
//!
//! # Quick Start
//!
//! ```rust
//! use uri_template::{UriTemplate, Values, Value};
//!
//! let template = UriTemplate::parse("/repos/{owner}/{repo}{?tags*}").unwrap();
//!
//! // Expand values into a URI
//! let uri = template
//!     .expand(
//!         &Values::new()
//!             .set("owner", "rust-lang")
//!             .set("repo", "rust")
//!             .set("tags", vec!["a", "b"]),
//!     )
//!     .unwrap();
//! assert_eq!(uri, "/repos/rust-lang/rust?tags=a&tags=b");
//!
//! // Match a URI back into values
//! let matched = template.matches("/repos/serde-rs/serde").unwrap().unwrap();
//! assert_eq!(matched.get("owner").unwrap(), &Value::text("serde-rs"));
//! assert_eq!(matched.get("repo").unwrap(), &Value::text("serde"));
//! ```
//!
//! # Matching and Hints
//!
//! Matching is lossy in the ways expansion is: several value shapes can
//! produce the same text. [`MatchHints`] lets a caller pin a variable to
//! a shape or require its presence:
//!
//! ```rust
//! use uri_template::{MatchHints, UriTemplate, Value};
//!
//! let template = UriTemplate::parse("{?pairs*}").unwrap();
//! let hints = MatchHints::new().assoc("pairs");
//! let matched = template.matches_with("?a=1&b=2", &hints).unwrap().unwrap();
//! assert_eq!(
//!     matched.get("pairs").unwrap(),
//!     &Value::assoc(vec![("a", "1"), ("b", "2")])
//! );
//! ```
//!
//! # Base URIs
//!
//! [`UriTemplate::expand_with_base`] resolves the expansion against an
//! absolute base URI per RFC 3986, and
//! [`UriTemplate::matches_with_base`] makes an absolute candidate
//! relative to the base before matching.
//!
//! # Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for templates, varspecs, and
//!   values; match results serialize their bindings.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod encode;
mod error;
mod expand;
mod matcher;
mod matching;
mod operator;
mod part;
mod pattern;
pub mod prelude;
mod resolve;
mod template;
mod value;
mod varspec;

pub use error::{ExpandError, MatchError, ParseError, ParseErrorKind, VarSpecError};
pub use matching::{Binding, MatchHints, MatchResult};
pub use operator::Operator;
pub use part::TemplatePart;
pub use template::UriTemplate;
pub use value::{Value, Values};
pub use varspec::{Modifier, VarSpec, MAX_PREFIX_LENGTH};
