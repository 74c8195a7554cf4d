//! Transport-agnostic bearer-auth interceptor—decorate outbound requests with a credential,
//! coordinate single-flight refresh across concurrent callers, and retry rejections exactly once.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod http;
pub mod intercept;
pub mod obs;
pub mod provider;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for unit and integration tests; enabled via
	//! `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		sync::atomic::{AtomicU64, Ordering},
		time::Duration as StdDuration,
	};
	// crates.io
	use http::{Method, StatusCode};
	// self
	use crate::{
		auth::Credential,
		error::ProviderError,
		http::{ChainFuture, HttpRequest, HttpResponse, InterceptorChain},
		provider::{CredentialProvider, ProviderFuture},
	};

	/// Builds a plain GET request fixture pointed at a placeholder origin.
	pub fn probe_request() -> HttpRequest {
		HttpRequest::new(
			Method::GET,
			Url::parse("https://api.example.com/resource")
				.expect("Probe request URL should parse successfully."),
		)
	}

	/// Scriptable [`CredentialProvider`] that replays configured outcomes and records every
	/// call it receives.
	pub struct ScriptedProvider {
		initials: Mutex<VecDeque<Result<Option<Credential>, ProviderError>>>,
		refreshes: Mutex<VecDeque<Result<Credential, ProviderError>>>,
		refresh_delay: StdDuration,
		load_calls: AtomicU64,
		refresh_calls: AtomicU64,
		previous_values: Mutex<Vec<Option<String>>>,
	}
	impl ScriptedProvider {
		/// Creates a provider whose first `load_initial` call yields `initial`.
		pub fn new(initial: Option<Credential>) -> Self {
			Self {
				initials: Mutex::new(VecDeque::from([Ok(initial)])),
				refreshes: Mutex::new(VecDeque::new()),
				refresh_delay: StdDuration::ZERO,
				load_calls: AtomicU64::new(0),
				refresh_calls: AtomicU64::new(0),
				previous_values: Mutex::new(Vec::new()),
			}
		}

		/// Creates a provider whose first `load_initial` call fails.
		pub fn failing_initial(message: impl Into<String>) -> Self {
			let provider = Self::new(None);

			provider.initials.lock().clear();
			provider.initials.lock().push_back(Err(ProviderError::load(message)));

			provider
		}

		/// Queues an additional `load_initial` outcome behind the ones already scripted.
		pub fn with_initial(self, initial: Option<Credential>) -> Self {
			self.initials.lock().push_back(Ok(initial));

			self
		}

		/// Queues a successful refresh outcome.
		pub fn with_refresh(self, credential: Credential) -> Self {
			self.refreshes.lock().push_back(Ok(credential));

			self
		}

		/// Queues a failing refresh outcome.
		pub fn with_refresh_error(self, message: impl Into<String>) -> Self {
			self.refreshes.lock().push_back(Err(ProviderError::refresh(message)));

			self
		}

		/// Holds every refresh in flight for `delay` before resolving.
		pub fn with_refresh_delay(mut self, delay: StdDuration) -> Self {
			self.refresh_delay = delay;

			self
		}

		/// Number of `load_initial` calls observed so far.
		pub fn load_calls(&self) -> u64 {
			self.load_calls.load(Ordering::SeqCst)
		}

		/// Number of `refresh` calls observed so far.
		pub fn refresh_calls(&self) -> u64 {
			self.refresh_calls.load(Ordering::SeqCst)
		}

		/// The `previous` argument of each observed refresh call, in order.
		pub fn previous_values(&self) -> Vec<Option<String>> {
			self.previous_values.lock().clone()
		}
	}
	impl CredentialProvider for ScriptedProvider {
		fn load_initial(&self) -> ProviderFuture<'_, Option<Credential>> {
			Box::pin(async move {
				self.load_calls.fetch_add(1, Ordering::SeqCst);

				self.initials
					.lock()
					.pop_front()
					.unwrap_or_else(|| Err(ProviderError::load("initial load script exhausted")))
			})
		}

		fn refresh<'a>(&'a self, previous: Option<&'a str>) -> ProviderFuture<'a, Credential> {
			Box::pin(async move {
				self.refresh_calls.fetch_add(1, Ordering::SeqCst);
				self.previous_values.lock().push(previous.map(str::to_owned));

				if !self.refresh_delay.is_zero() {
					tokio::time::sleep(self.refresh_delay).await;
				}

				self.refreshes
					.lock()
					.pop_front()
					.unwrap_or_else(|| Err(ProviderError::refresh("refresh script exhausted")))
			})
		}
	}

	/// [`InterceptorChain`] fixture that echoes the forwarded `Authorization` header value as
	/// the response body.
	///
	/// Statuses pop from a FIFO script (200 once exhausted) and every forwarded request is
	/// recorded for header assertions. Give each simulated request its own chain instance so
	/// per-request scripts never interleave.
	#[derive(Default)]
	pub struct EchoChain {
		delay: StdDuration,
		statuses: Mutex<VecDeque<StatusCode>>,
		forwarded: Mutex<Vec<HttpRequest>>,
	}
	impl EchoChain {
		/// Creates a chain that responds immediately with status 200.
		pub fn new() -> Self {
			Self::default()
		}

		/// Delays every forward by `delay` before responding.
		pub fn with_delay(mut self, delay: StdDuration) -> Self {
			self.delay = delay;

			self
		}

		/// Scripts the response statuses, consumed one per forward.
		pub fn with_statuses(self, statuses: impl IntoIterator<Item = u16>) -> Self {
			self.statuses.lock().extend(statuses.into_iter().map(|status| {
				StatusCode::from_u16(status).expect("Status code fixture should be valid.")
			}));

			self
		}

		/// Every request forwarded through this chain, in order.
		pub fn forwarded(&self) -> Vec<HttpRequest> {
			self.forwarded.lock().clone()
		}

		/// Number of forwards observed so far.
		pub fn proceed_count(&self) -> usize {
			self.forwarded.lock().len()
		}
	}
	impl InterceptorChain for EchoChain {
		fn proceed(&self, request: HttpRequest) -> ChainFuture<'_> {
			Box::pin(async move {
				if !self.delay.is_zero() {
					tokio::time::sleep(self.delay).await;
				}

				let status = self.statuses.lock().pop_front().unwrap_or(StatusCode::OK);
				let body = request.header("authorization").unwrap_or_default().to_owned();

				self.forwarded.lock().push(request);

				Ok(HttpResponse::new(status).with_body(body.into_bytes()))
			})
		}
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use bearer_gate as _;
