//! Interceptor-level error types shared across decoration, refresh, and transport seams.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical interceptor error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential provider failure while loading or refreshing.
	#[error(transparent)]
	Provider(#[from] ProviderError),
	/// Transport failure (DNS, TCP, TLS) surfaced by the chain; never recovered locally.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Refresh admission was denied because the slot's waiter queue is at capacity.
	#[error("Refresh queue is full: {queue_size} waiters are already admitted.")]
	QueueFull {
		/// Configured admission limit, leader included.
		queue_size: usize,
	},
}

/// Credential provider failures.
///
/// Cloneable so a single refresh failure can be published to every waiter attached to the
/// failed refresh slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderError {
	/// Initial credential load failed; the interceptor stays uninitialized and the next
	/// request retries the load.
	#[error("Initial credential load failed: {message}.")]
	Load {
		/// Provider-supplied reason string.
		message: String,
	},
	/// Credential refresh failed; the credential and generation remain unchanged.
	#[error("Credential refresh failed: {message}.")]
	Refresh {
		/// Provider-supplied reason string.
		message: String,
	},
}
impl ProviderError {
	/// Wraps a load failure reason.
	pub fn load(message: impl Into<String>) -> Self {
		Self::Load { message: message.into() }
	}

	/// Wraps a refresh failure reason.
	pub fn refresh(message: impl Into<String>) -> Self {
		Self::Refresh { message: message.into() }
	}

	/// Returns the provider-supplied reason string.
	pub fn message(&self) -> &str {
		match self {
			Self::Load { message } | Self::Refresh { message } => message,
		}
	}
}

/// Transport-level failures (network, IO) raised by the interceptor chain.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while forwarding the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced while forwarding.
	#[error("I/O error occurred while forwarding the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn provider_error_helpers_carry_messages() {
		let load = ProviderError::load("vault sealed");
		let refresh = ProviderError::refresh("invalid token");

		assert_eq!(load.message(), "vault sealed");
		assert_eq!(refresh.message(), "invalid token");
		assert_eq!(load.to_string(), "Initial credential load failed: vault sealed.");
		assert_eq!(refresh.to_string(), "Credential refresh failed: invalid token.");
	}

	#[test]
	fn provider_error_converts_into_interceptor_error() {
		let err: Error = ProviderError::refresh("invalid token").into();

		assert!(matches!(err, Error::Provider(ProviderError::Refresh { .. })));
	}

	#[test]
	fn transport_error_wraps_network_sources() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
		let err = TransportError::network(io);

		assert!(matches!(err, TransportError::Network { .. }));
	}
}
