//! The self-describing ciphertext string format: `$<tag>$<params>$<payload>`.
//!
//! The literal `$<tag>$` prefix is the discriminant the manager dispatches
//! on; nothing else about a stored value identifies its scheme.

use crate::error::{DecryptError, DecryptResult};

/// A parsed ciphertext token. Segments borrow from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub tag: &'a str,
    pub params: &'a str,
    pub payload: &'a str,
}

/// Render a token from its segments.
pub fn format_token(tag: &str, params: &str, payload: &str) -> String {
    format!("${tag}${params}${payload}")
}

/// The `$<tag>$` prefix for a scheme tag.
pub fn prefix_for(tag: &str) -> String {
    format!("${tag}$")
}

/// Parse a token into its three segments.
pub fn parse_token(input: &str) -> DecryptResult<Token<'_>> {
    let rest = input
        .strip_prefix('$')
        .ok_or_else(|| DecryptError::MalformedToken("missing leading '$'".to_string()))?;
    let mut segments = rest.splitn(3, '$');
    let tag = segments
        .next()
        .filter(|tag| !tag.is_empty())
        .ok_or_else(|| DecryptError::MalformedToken("empty scheme tag".to_string()))?;
    let params = segments
        .next()
        .ok_or_else(|| DecryptError::MalformedToken("missing parameter segment".to_string()))?;
    let payload = segments
        .next()
        .ok_or_else(|| DecryptError::MalformedToken("missing ciphertext segment".to_string()))?;
    Ok(Token {
        tag,
        params,
        payload,
    })
}
