use tracing::warn;

use crate::process::kpi::{Benchmarks, KpiKind, KpiMeans};

const ROAS_WARNING: &str =
    "ROAS is below the industry average. Review targeting and strengthen the ad messaging.";
const ROAS_POSITIVE: &str =
    "ROAS is at or above the industry average. Consider maintaining and scaling the current campaigns.";
const CPA_WARNING: &str =
    "CPA is running high. Improving creatives and landing pages is recommended.";
const CPA_POSITIVE: &str =
    "CPA is at or below the industry average. Keep the current setup and keep tuning for efficiency.";
const LTV_WARNING: &str =
    "LTV is on the low side. Strengthen repeat-purchase and cross-sell initiatives.";
const LTV_POSITIVE: &str = "LTV is healthy. Continue the current retention measures.";
const ROI_WARNING: &str =
    "ROI is low and the spend is not paying back. A fundamental review of the campaigns is recommended.";
const ROI_POSITIVE: &str =
    "ROI is above the industry average. The current campaigns can be scaled up.";

/// The two fixed lines for a KPI: (warning, positive).
fn messages(kind: KpiKind) -> (&'static str, &'static str) {
    match kind {
        KpiKind::Roas => (ROAS_WARNING, ROAS_POSITIVE),
        KpiKind::Cpa => (CPA_WARNING, CPA_POSITIVE),
        KpiKind::Ltv => (LTV_WARNING, LTV_POSITIVE),
        KpiKind::Roi => (ROI_WARNING, ROI_POSITIVE),
    }
}

/// One commentary line per KPI, in the fixed ROAS, CPA, LTV, ROI order.
/// Each line is one of that KPI's two fixed strings, nothing interpolated.
/// A KPI whose mean is undefined (no row carried a value) gets the positive
/// line; the missing data is logged rather than surfaced as a fifth message.
pub fn build_commentary(means: &KpiMeans, benchmarks: &Benchmarks) -> Vec<String> {
    KpiKind::ALL
        .iter()
        .map(|&kind| {
            let (warning, positive) = messages(kind);
            let line = match means.get(kind) {
                Some(mean) if !benchmarks.meets(kind, mean) => warning,
                Some(_) => positive,
                None => {
                    warn!(kpi = kind.header(), "no rows with a value, keeping the positive comment");
                    positive
                }
            };
            line.to_string()
        })
        .collect()
}
