//! Credential records produced by a successful token exchange.

// self
use crate::{_prelude::*, connection::secret::TokenSecret};

/// Provider-specific facts captured alongside the tokens at exchange time.
#[derive(Clone, Debug)]
pub struct IssuedMetadata {
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from the provider's `expires_in`, when supplied.
	pub expires_at: Option<OffsetDateTime>,
	/// Payments-provider live/test mode flag, when supplied.
	pub livemode: Option<bool>,
	/// Payments-provider publishable key, when supplied.
	pub publishable_key: Option<String>,
}
impl IssuedMetadata {
	/// Stamps a metadata block at the current instant with no provider extras.
	pub fn issued_now() -> Self {
		Self {
			issued_at: OffsetDateTime::now_utc(),
			expires_at: None,
			livemode: None,
			publishable_key: None,
		}
	}

	/// Sets the expiry to `lifetime` past the issue instant.
	///
	/// `None` when the expiry would fall outside the representable time range.
	pub fn expires_in(mut self, lifetime: Duration) -> Option<Self> {
		self.expires_at = Some(self.issued_at.checked_add(lifetime)?);

		Some(self)
	}
}

/// Stored access/refresh token bundle for one connection.
///
/// Records are created only by a successful exchange and are owned by the credential store;
/// adapters and the proxy read them through the store contract and never keep copies beyond a
/// single call.
#[derive(Clone)]
pub struct CredentialRecord {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// `token_type` reported by the provider, usually `bearer`.
	pub token_type: Option<String>,
	/// Scope string granted by the provider, when reported.
	pub scope: Option<String>,
	/// Provider-specific issue metadata.
	pub issued: IssuedMetadata,
}
impl Debug for CredentialRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialRecord")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("issued", &self.issued)
			.finish()
	}
}
