// self
use crate::obs::{StageKind, StageOutcome};

/// Resolution paths a coordinated refresh request can take.
///
/// Published next to the always-on [`RefreshMetrics`](crate::intercept::RefreshMetrics)
/// counters, so dashboards can split refresh traffic by path without scraping the
/// in-process atomics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshResolution {
	/// The waiter observed a refresh round that produced a new credential.
	Refreshed,
	/// Generation gating short-circuited the waiter onto an already newer credential.
	Gated,
	/// Admission was refused because the slot's waiter queue was at capacity.
	QueueRejected,
	/// The waiter observed a refresh round that failed.
	Failed,
}
impl RefreshResolution {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshResolution::Refreshed => "refreshed",
			RefreshResolution::Gated => "gated",
			RefreshResolution::QueueRejected => "queue_rejected",
			RefreshResolution::Failed => "failed",
		}
	}
}

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_stage_outcome(kind: StageKind, outcome: StageOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"bearer_gate_stage_total",
		"stage" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Records how a refresh request resolved via the global metrics recorder (when enabled).
pub fn record_refresh_resolution(resolution: RefreshResolution) {
	#[cfg(feature = "metrics")]
	metrics::counter!(
		"bearer_gate_refresh_resolutions_total",
		"resolution" => resolution.as_str()
	)
	.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = resolution;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_noops_without_the_metrics_feature() {
		record_stage_outcome(StageKind::Refresh, StageOutcome::Failure);
		record_refresh_resolution(RefreshResolution::Gated);
		record_refresh_resolution(RefreshResolution::QueueRejected);
	}

	#[test]
	fn resolution_labels_are_stable() {
		assert_eq!(RefreshResolution::Refreshed.as_str(), "refreshed");
		assert_eq!(RefreshResolution::Gated.as_str(), "gated");
		assert_eq!(RefreshResolution::QueueRejected.as_str(), "queue_rejected");
		assert_eq!(RefreshResolution::Failed.as_str(), "failed");
	}
}
