//! Credential provider capability consumed by the interceptor.

// self
use crate::{_prelude::*, auth::Credential, error::ProviderError};

/// Boxed future returned by [`CredentialProvider`] operations.
pub type ProviderFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, ProviderError>> + 'a + Send>>;

/// Capability that loads the initial credential and produces refreshed ones.
///
/// The interceptor guarantees both operations are invoked at most once per logical event:
/// `load_initial` once per instance (retried only after a failed attempt), `refresh` once per
/// generation transition. Providers therefore need not be idempotent. Both operations may
/// suspend; neither is ever called while the interceptor holds its state lock.
pub trait CredentialProvider
where
	Self: Send + Sync,
{
	/// Loads the initial credential, or `None` when requests should start unauthenticated.
	fn load_initial(&self) -> ProviderFuture<'_, Option<Credential>>;

	/// Produces a replacement for the superseded credential.
	///
	/// `previous` is the credential value of the generation being superseded, or `None` when
	/// no credential was ever set.
	fn refresh<'a>(&'a self, previous: Option<&'a str>) -> ProviderFuture<'a, Credential>;
}
