use std::collections::BTreeMap;

/// Result of a structural verification pass. Never an error: callers
/// inspect `passed` plus the details map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub passed: bool,
    pub details: BTreeMap<String, String>,
}

impl VerificationResult {
    #[inline]
    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            passed: true,
            details: BTreeMap::from([("reason".to_string(), reason.into())]),
        }
    }

    #[inline]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            passed: false,
            details: BTreeMap::from([("error".to_string(), error.into())]),
        }
    }
}

/// Pluggable output verification stage.
pub trait Verifier {
    fn verify(&self, llm_output: &str) -> VerificationResult;
}

/// Checks that the generated output decodes as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonVerifier;

impl Verifier for JsonVerifier {
    #[inline]
    fn verify(&self, llm_output: &str) -> VerificationResult {
        match serde_json::from_str::<serde_json::Value>(llm_output) {
            Ok(_) => VerificationResult::pass("Valid JSON"),
            Err(e) => VerificationResult::fail(e.to_string()),
        }
    }
}
