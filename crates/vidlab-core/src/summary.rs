//! Verdict coercion and summary-field derivation from a raw report payload.
//!
//! The model's payload is an opaque nested mapping; the pipeline persists it
//! verbatim but also lifts a handful of summary columns out of it. Everything
//! here is best-effort: missing fields stay `None`, and a verdict that is not
//! one of the four allowed labels is coerced to [`Verdict::Fail`].

use serde_json::{Map, Value};

/// The coerced pass/fail summary judgment for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    NotAssigned,
    Pending,
}

impl Verdict {
    /// The label stored in the `reports.verdict` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::NotAssigned => "not assigned",
            Verdict::Pending => "pending",
        }
    }

    /// Parses a payload label, case-insensitively. Returns `None` for labels
    /// outside the allowed set; the caller decides how to coerce.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "pass" | "passed" => Some(Verdict::Pass),
            "fail" | "failed" => Some(Verdict::Fail),
            "not assigned" | "not_assigned" => Some(Verdict::NotAssigned),
            "pending" => Some(Verdict::Pending),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary columns derived from one report payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub product_category: Option<String>,
    pub company: Option<String>,
    pub verdict: Verdict,
}

/// Derives the summary fields from a raw report payload.
///
/// Verdict resolution order:
/// 1. An explicit `product_info.verdict` label; an unknown label is coerced
///    to [`Verdict::Fail`].
/// 2. Otherwise the `basic_tests` sub-results: every sub-test whose `result`
///    reads pass/passed yields [`Verdict::Pass`]; any deviation yields
///    [`Verdict::Fail`].
/// 3. No verdict material at all yields [`Verdict::NotAssigned`].
#[must_use]
pub fn summarize_report(payload: &Map<String, Value>) -> ReportSummary {
    let product_info = payload.get("product_info").and_then(Value::as_object);

    let field = |key: &str| -> Option<String> {
        product_info
            .and_then(|info| info.get(key))
            .or_else(|| payload.get(key))
            .and_then(Value::as_str)
            .map(str::to_owned)
    };

    ReportSummary {
        product_id: payload
            .get("product_id")
            .and_then(Value::as_str)
            .map(str::to_owned),
        product_name: field("product_name"),
        product_category: field("product_category"),
        company: field("company"),
        verdict: derive_verdict(payload, product_info),
    }
}

fn derive_verdict(
    payload: &Map<String, Value>,
    product_info: Option<&Map<String, Value>>,
) -> Verdict {
    if let Some(label) = product_info
        .and_then(|info| info.get("verdict"))
        .and_then(Value::as_str)
    {
        return Verdict::from_label(label).unwrap_or(Verdict::Fail);
    }

    if let Some(basic) = payload.get("basic_tests").and_then(Value::as_object) {
        return verdict_from_sub_tests(basic);
    }

    Verdict::NotAssigned
}

/// Computes a verdict from the `basic_tests` block: each nested sub-test
/// object carries its own `result` label, and a single non-passing sub-test
/// fails the product.
fn verdict_from_sub_tests(basic: &Map<String, Value>) -> Verdict {
    let mut saw_sub_test = false;
    for sub in basic.values().filter_map(Value::as_object) {
        saw_sub_test = true;
        let passed = sub
            .get("result")
            .and_then(Value::as_str)
            .is_some_and(|label| matches!(Verdict::from_label(label), Some(Verdict::Pass)));
        if !passed {
            return Verdict::Fail;
        }
    }
    if saw_sub_test {
        Verdict::Pass
    } else {
        Verdict::NotAssigned
    }
}
