//! Convenient re-exports for glob imports.
//!
//! This module provides a single import for all common types, making it
//! easy to get started with the crate:
//!
//! ```rust
//! use uri_template::prelude::*;
//!
//! let template = UriTemplate::parse("/users/{id}").unwrap();
//! let uri = template.expand(&Values::new().set("id", "alice")).unwrap();
//! assert_eq!(uri, "/users/alice");
//! ```

pub use crate::{
    // Core types
    MatchHints, MatchResult, Modifier, Operator, TemplatePart, UriTemplate, Value, Values, VarSpec,
    // Errors
    ExpandError, MatchError, ParseError, ParseErrorKind, VarSpecError,
    // Constants
    MAX_PREFIX_LENGTH,
};
