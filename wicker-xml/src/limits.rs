use serde::{Deserialize, Serialize};

const DEFAULT_MAX_DEPTH: usize = 64;
const DEFAULT_MAX_ARGS: usize = 512;

/// Resource bounds applied to untrusted documents.
///
/// Both limits guard against resource-exhaustion inputs: deeply nested
/// element chains and elements with enormous argument lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Maximum element nesting depth (the root element does not count).
    pub max_depth: usize,
    /// Maximum number of argument values a single element may accumulate.
    pub max_args: usize,
}

impl DecodeLimits {
    pub fn new(max_depth: usize, max_args: usize) -> Self {
        Self {
            max_depth,
            max_args,
        }
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_args: DEFAULT_MAX_ARGS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded() {
        let limits = DecodeLimits::default();
        assert!(limits.max_depth > 0);
        assert!(limits.max_args > 0);
    }

    #[test]
    fn round_trips_through_json() {
        let limits = DecodeLimits::new(16, 32);
        let json = serde_json::to_string(&limits).unwrap();
        assert_eq!(serde_json::from_str::<DecodeLimits>(&json).unwrap(), limits);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let limits: DecodeLimits = serde_json::from_str(r#"{"max_depth":8}"#).unwrap();
        assert_eq!(limits.max_depth, 8);
        assert_eq!(limits.max_args, DEFAULT_MAX_ARGS);
    }
}
