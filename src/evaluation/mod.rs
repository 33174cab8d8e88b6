//! Static checks over generated test cases: structural validity and
//! acceptance-criteria coverage.


use std::collections::BTreeSet;

use serde::Deserialize;

/// Outcome of comparing generated cases against required criteria ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageResult {
    pub missing_criteria: Vec<String>,
    pub extra_cases: Vec<String>,
}

impl CoverageResult {
    #[inline]
    pub fn passed(&self) -> bool {
        self.missing_criteria.is_empty() && self.extra_cases.is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneratedCase {
    #[serde(default)]
    pub id: Option<String>,
}

/// True when the output decodes as JSON.
#[inline]
pub fn validate_json_output(output: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(output).is_ok()
}

/// Compare generated case ids against the required acceptance-criteria ids.
/// Criteria with no matching case are missing; cases whose id matches no
/// criterion are extras. Cases without an id are ignored.
#[inline]
pub fn check_criteria_coverage(
    acceptance_criteria: &[String],
    generated_cases: &[GeneratedCase],
) -> CoverageResult {
    let case_ids: BTreeSet<&str> = generated_cases
        .iter()
        .filter_map(|case| case.id.as_deref())
        .collect();
    let criteria: BTreeSet<&str> = acceptance_criteria.iter().map(String::as_str).collect();

    let missing_criteria = criteria
        .difference(&case_ids)
        .map(|id| (*id).to_string())
        .collect();
    let extra_cases = case_ids
        .difference(&criteria)
        .map(|id| (*id).to_string())
        .collect();

    CoverageResult {
        missing_criteria,
        extra_cases,
    }
}
