//! Public interceptor entry: decorate, forward, and retry exactly once after a coordinated
//! refresh.

pub mod refresh;

pub use refresh::*;

// crates.io
use http::StatusCode;
// self
use crate::{
	_prelude::*,
	auth::Credential,
	http::{AUTHORIZATION, HttpRequest, HttpResponse, InterceptorChain},
	obs::{self, StageKind, StageOutcome, StageSpan},
	provider::CredentialProvider,
};

/// Response statuses treated as credential rejection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RejectionPolicy {
	/// Any non-2xx response triggers a reactive refresh.
	#[default]
	AnyNonSuccess,
	/// Only `401 Unauthorized` triggers a reactive refresh.
	UnauthorizedOnly,
}
impl RejectionPolicy {
	/// Returns `true` when the status indicates the credential was rejected upstream.
	pub fn is_rejection(self, status: StatusCode) -> bool {
		match self {
			Self::AnyNonSuccess => !status.is_success(),
			Self::UnauthorizedOnly => status == StatusCode::UNAUTHORIZED,
		}
	}
}

/// Attaches bearer credentials to outbound requests and coordinates refresh across every
/// in-flight request sharing this instance.
///
/// One intercept pass forwards the request at most twice: once with the credential observed
/// on entry, and once more after a successful refresh when the first response indicated
/// rejection. The retried response is returned regardless of its status. Transport errors
/// pass through untouched and never trigger refresh.
#[derive(Clone)]
pub struct Interceptor {
	coordinator: RefreshCoordinator,
	policy: RejectionPolicy,
}
impl Interceptor {
	/// Creates an interceptor with a queue size of 1 and the default rejection policy.
	pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
		Self { coordinator: RefreshCoordinator::new(provider), policy: RejectionPolicy::default() }
	}

	/// Overrides the maximum number of waiters (leader included) admitted per refresh.
	///
	/// Values below 1 are clamped to 1.
	pub fn with_queue_size(mut self, queue_size: usize) -> Self {
		self.coordinator = self.coordinator.with_queue_size(queue_size);

		self
	}

	/// Overrides the rejection policy.
	pub fn with_rejection_policy(mut self, policy: RejectionPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Shared counters describing refresh coordination activity.
	pub fn refresh_metrics(&self) -> &Arc<RefreshMetrics> {
		self.coordinator.metrics()
	}

	/// Decorates `request`, forwards it through `chain`, and retries exactly once after a
	/// coordinated refresh when the response indicates credential rejection.
	pub async fn intercept(
		&self,
		request: HttpRequest,
		chain: &dyn InterceptorChain,
	) -> Result<HttpResponse> {
		const KIND: StageKind = StageKind::Intercept;

		let span = StageSpan::new(KIND, "intercept");

		obs::record_stage_outcome(KIND, StageOutcome::Attempt);

		let result = span.instrument(self.intercept_inner(request, chain)).await;

		match &result {
			Ok(_) => obs::record_stage_outcome(KIND, StageOutcome::Success),
			Err(_) => obs::record_stage_outcome(KIND, StageOutcome::Failure),
		}

		result
	}

	async fn intercept_inner(
		&self,
		request: HttpRequest,
		chain: &dyn InterceptorChain,
	) -> Result<HttpResponse> {
		self.coordinator.ensure_initialized().await?;

		let mut snapshot = self.coordinator.snapshot();

		// An already expired credential is replaced before the first forward, so upstream
		// never sees a request authenticated with a known-stale value.
		if let Some(credential) = &snapshot.credential {
			if credential.is_expired_at(OffsetDateTime::now_utc()) {
				snapshot = self.coordinator.refresh(snapshot.generation).await?.into_snapshot();
			}
		}

		let decorated = decorate(&request, snapshot.credential.as_ref());
		let response = chain.proceed(decorated).await?;

		if !self.policy.is_rejection(response.status) {
			return Ok(response);
		}

		// Rejection with no credential attached is the bootstrap path: the provider returned
		// no initial credential, and the first rejected request mints one.
		let refreshed = self.coordinator.refresh(snapshot.generation).await?;
		let retried = decorate(&request, Some(&refreshed.credential));

		Ok(chain.proceed(retried).await?)
	}
}
impl Debug for Interceptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Interceptor")
			.field("coordinator", &self.coordinator)
			.field("policy", &self.policy)
			.finish()
	}
}

/// Returns a copy of `request` carrying the credential, leaving the original untouched.
///
/// Decoration always starts from the undecorated request, so the retry after a refresh
/// replaces the interceptor's stale `Authorization` header instead of stacking a second one.
/// Caller-supplied headers are never removed, reordered, or deduplicated.
fn decorate(request: &HttpRequest, credential: Option<&Credential>) -> HttpRequest {
	match credential {
		Some(credential) => request
			.clone()
			.with_header(AUTHORIZATION, format!("Bearer {}", credential.secret().expose())),
		None => request.clone(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::probe_request;

	fn credential(value: &str) -> Credential {
		Credential::new(value, OffsetDateTime::now_utc() + Duration::hours(1))
	}

	#[test]
	fn default_policy_treats_any_non_success_as_rejection() {
		let policy = RejectionPolicy::default();

		assert!(!policy.is_rejection(StatusCode::OK));
		assert!(!policy.is_rejection(StatusCode::CREATED));
		assert!(policy.is_rejection(StatusCode::UNAUTHORIZED));
		assert!(policy.is_rejection(StatusCode::FORBIDDEN));
		assert!(policy.is_rejection(StatusCode::INTERNAL_SERVER_ERROR));
	}

	#[test]
	fn narrowed_policy_only_reacts_to_unauthorized() {
		let policy = RejectionPolicy::UnauthorizedOnly;

		assert!(policy.is_rejection(StatusCode::UNAUTHORIZED));
		assert!(!policy.is_rejection(StatusCode::FORBIDDEN));
		assert!(!policy.is_rejection(StatusCode::INTERNAL_SERVER_ERROR));
		assert!(!policy.is_rejection(StatusCode::OK));
	}

	#[test]
	fn decoration_attaches_exactly_one_authorization_header() {
		let request = probe_request().with_header("X-Request-Id", "42");
		let decorated = decorate(&request, Some(&credential("0")));

		assert_eq!(decorated.header_all(AUTHORIZATION), vec!["Bearer 0"]);
		assert_eq!(decorated.header("X-Request-Id"), Some("42"));

		// The retry decorates the original again, so the fresh value replaces the stale one.
		let retried = decorate(&request, Some(&credential("1")));

		assert_eq!(retried.header_all(AUTHORIZATION), vec!["Bearer 1"]);
	}

	#[test]
	fn decoration_without_credential_leaves_the_request_unchanged() {
		let request = probe_request().with_header("Accept", "application/json");
		let decorated = decorate(&request, None);

		assert!(decorated.header(AUTHORIZATION).is_none());
		assert_eq!(decorated.headers, request.headers);
	}
}
