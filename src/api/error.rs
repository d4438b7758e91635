//! Boundary translation from typed broker failures to HTTP responses.

// crates.io
use axum::{
	http::StatusCode,
	response::{IntoResponse, Json, Response},
};
// self
use crate::_prelude::*;

/// JSON envelope carried by every failing response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
	/// Human-readable failure description.
	pub error: String,
}

/// Route-level failure.
///
/// This is the only place status codes are assigned; everything below the boundary deals in
/// typed errors.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Broker or provider failure, translated per variant.
	#[error("{0}")]
	Broker(#[from] Error),
	/// Request parameter outside its accepted range or shape.
	#[error("{0}")]
	InvalidParam(String),
}
impl ApiError {
	fn status(&self) -> StatusCode {
		match self {
			Self::Broker(error) => match error {
				Error::AuthorizationDenied { .. } | Error::MissingCode { .. } =>
					StatusCode::BAD_REQUEST,
				Error::UnknownConnection { .. } | Error::UnsupportedResource { .. } =>
					StatusCode::NOT_FOUND,
				Error::OAuthExchangeFailed { .. }
				| Error::TokenResponseParse { .. }
				| Error::ExpiresInOutOfRange { .. }
				| Error::ProviderApi { .. }
				| Error::Transport { .. } => StatusCode::BAD_GATEWAY,
				Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
			},
			Self::InvalidParam(_) => StatusCode::BAD_REQUEST,
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();

		tracing::warn!(status = status.as_u16(), error = %self, "request failed");

		(status, Json(ErrorBody { error: self.to_string() })).into_response()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{connection::ConnectionId, provider::ProviderKind, store::StoreError};

	fn status_of(error: Error) -> StatusCode {
		ApiError::from(error).status()
	}

	#[test]
	fn statuses_follow_the_taxonomy() {
		assert_eq!(
			status_of(Error::AuthorizationDenied {
				provider: ProviderKind::Stripe,
				detail: "access_denied".into(),
			}),
			StatusCode::BAD_REQUEST,
		);
		assert_eq!(
			status_of(Error::MissingCode { provider: ProviderKind::Ga }),
			StatusCode::BAD_REQUEST,
		);
		assert_eq!(
			status_of(Error::UnknownConnection {
				provider: ProviderKind::Stripe,
				identity: ConnectionId::new("acct_404").expect("Valid identity."),
			}),
			StatusCode::NOT_FOUND,
		);
		assert_eq!(
			status_of(Error::UnsupportedResource { provider: ProviderKind::Ga }),
			StatusCode::NOT_FOUND,
		);
		assert_eq!(
			status_of(Error::ExpiresInOutOfRange {
				provider: ProviderKind::Ga,
				seconds: i64::MAX,
			}),
			StatusCode::BAD_GATEWAY,
		);
		assert_eq!(
			status_of(Error::OAuthExchangeFailed {
				provider: ProviderKind::Ga,
				status: Some(401),
				detail: "invalid_grant".into(),
			}),
			StatusCode::BAD_GATEWAY,
		);
		assert_eq!(
			status_of(Error::ProviderApi {
				provider: ProviderKind::Stripe,
				status: 500,
				detail: "boom".into(),
			}),
			StatusCode::BAD_GATEWAY,
		);
		assert_eq!(
			status_of(Error::Storage(StoreError::Backend { message: "lost".into() })),
			StatusCode::INTERNAL_SERVER_ERROR,
		);
	}

	#[test]
	fn invalid_params_are_client_errors() {
		let error = ApiError::InvalidParam("Query parameter `limit` is out of range.".into());

		assert_eq!(error.status(), StatusCode::BAD_REQUEST);
		assert_eq!(error.to_string(), "Query parameter `limit` is out of range.");
	}
}
