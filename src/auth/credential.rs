//! Immutable bearer credential with an absolute expiry instant.

// crates.io
use time::error::ComponentRange;
// self
use crate::{_prelude::*, auth::secret::CredentialSecret};

/// Immutable bearer credential: an opaque secret plus the wall-clock instant it expires.
///
/// Freely clonable; the interceptor hands copies to every request without synchronization.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	secret: CredentialSecret,
	expires_at: OffsetDateTime,
}
impl Credential {
	/// Creates a credential expiring at the provided instant.
	pub fn new(value: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { secret: CredentialSecret::new(value), expires_at }
	}

	/// Creates a credential from an absolute unix expiry expressed in whole seconds.
	pub fn from_unix_expiry(
		value: impl Into<String>,
		expires_at_seconds: i64,
	) -> Result<Self, ComponentRange> {
		Ok(Self::new(value, OffsetDateTime::from_unix_timestamp(expires_at_seconds)?))
	}

	/// Returns the redacted secret wrapper.
	pub fn secret(&self) -> &CredentialSecret {
		&self.secret
	}

	/// Returns the expiry instant.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Returns `true` when the credential is still usable at the provided instant.
	///
	/// A credential expiring exactly at `instant` counts as expired.
	pub fn is_valid_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at > instant
	}

	/// Convenience helper that checks validity against the current UTC clock.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` when the credential has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		!self.is_valid_at(instant)
	}

	/// Convenience helper that checks expiry against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("secret", &self.secret)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn expiry_boundary_counts_as_expired() {
		let instant = macros::datetime!(2025-01-01 00:00 UTC);
		let credential = Credential::new("0", instant);

		assert!(credential.is_expired_at(instant));
		assert!(!credential.is_valid_at(instant));
		assert!(credential.is_valid_at(instant - Duration::seconds(1)));
		assert!(credential.is_expired_at(instant + Duration::seconds(1)));
	}

	#[test]
	fn unix_expiry_constructor_matches_instant() {
		let credential = Credential::from_unix_expiry("0", 1_735_689_600)
			.expect("Unix expiry fixture should be in range.");

		assert_eq!(credential.expires_at(), macros::datetime!(2025-01-01 00:00 UTC));
	}

	#[test]
	fn debug_masks_secret_material() {
		let credential = Credential::new("super-secret", OffsetDateTime::now_utc());
		let rendered = format!("{credential:?}");

		assert!(rendered.contains("****cret"));
		assert!(!rendered.contains("super-secret"));
	}
}
