//! Optional observability helpers for interceptor stages.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `bearer_gate.stage` with the `stage`
//!   (pipeline step) and `site` (call site) fields.
//! - Enable `metrics` to increment the `bearer_gate_stage_total` counter for every
//!   attempt/success/failure (labeled by `stage` + `outcome`), and the
//!   `bearer_gate_refresh_resolutions_total` counter for every refresh resolution path
//!   (labeled by `resolution`).
//!
//! Both layers are no-ops when their feature is disabled; the interceptor itself never logs.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Pipeline stages observed by the interceptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
	/// Lazy one-time initial credential load.
	InitialLoad,
	/// Coordinated credential refresh.
	Refresh,
	/// Full decorate/forward/retry pass for one request.
	Intercept,
}
impl StageKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageKind::InitialLoad => "initial_load",
			StageKind::Refresh => "refresh",
			StageKind::Intercept => "intercept",
		}
	}
}
impl Display for StageKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
