//! Placeholder substitution for the API URL
//!
//! Templates contain `{name}` tokens. [`resolve`] replaces each token whose
//! name is known with its value in a single left-to-right pass, so a value
//! that itself looks like a placeholder is never expanded again. Unknown
//! tokens and stray braces are copied through unchanged. Values are inserted
//! verbatim; callers supply URL-safe strings.

use crate::error::{Error, Result};
use url::Url;

/// Substitute every known `{name}` token in `template`
pub fn resolve(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            // no closing brace anywhere, the remainder is literal
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                // keep the brace and rescan from the next character, so
                // "{{name}" still resolves the inner token
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Resolve the template and check the result is an absolute URL
///
/// # Errors
/// Returns [`Error::Config`] keyed on `API_URL` when the resolved string does
/// not parse.
pub fn resolve_url(template: &str, params: &[(&str, &str)]) -> Result<Url> {
    let resolved = resolve(template, params);
    Url::parse(&resolved).map_err(|e| {
        Error::config(
            crate::config::keys::API_URL,
            format!("resolved URL '{resolved}' is invalid: {e}"),
        )
    })
}
