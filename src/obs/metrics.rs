// self
use crate::obs::DecisionLabel;

/// Records a decision via the global metrics recorder (when enabled).
pub fn record_decision(label: DecisionLabel) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("delegated_auth_decision_total", "decision" => label.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = label;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_decision_noop_without_recorder() {
		record_decision(DecisionLabel::CacheHit);
	}
}
