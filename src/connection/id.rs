//! Strongly typed connection identity enforced across the broker domain.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

const IDENTITY_MAX_LEN: usize = 128;

/// Error returned when connection-identity validation fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentityError {
	/// The identity was empty.
	#[error("Connection identity cannot be empty.")]
	Empty,
	/// The identity contains whitespace characters.
	#[error("Connection identity contains whitespace.")]
	ContainsWhitespace,
	/// The identity exceeded the allowed character count.
	#[error("Connection identity exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Opaque key identifying one authorized link between the platform and one provider account.
///
/// For the payments provider this is the account id returned at token-exchange time; for the
/// analytics provider it is a fixed placeholder until per-account connections exist.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);
impl ConnectionId {
	/// Creates a new identity after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentityError> {
		let view = value.as_ref();

		if view.is_empty() {
			return Err(IdentityError::Empty);
		}
		if view.chars().any(char::is_whitespace) {
			return Err(IdentityError::ContainsWhitespace);
		}
		if view.len() > IDENTITY_MAX_LEN {
			return Err(IdentityError::TooLong { max: IDENTITY_MAX_LEN });
		}

		Ok(Self(view.to_owned()))
	}
}
impl Deref for ConnectionId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ConnectionId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for ConnectionId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Connection({})", self.0)
	}
}
impl Display for ConnectionId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for ConnectionId {
	type Err = IdentityError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identities_validate() {
		assert!(ConnectionId::new("").is_err());
		assert!(ConnectionId::new("acct 1").is_err(), "Inner whitespace must be rejected.");
		assert!(ConnectionId::new(" acct_1").is_err(), "Leading whitespace must be rejected.");

		let id = ConnectionId::new("acct_1Foo").expect("Account fixture should be valid.");

		assert_eq!(id.as_ref(), "acct_1Foo");
		assert_eq!(id.to_string(), "acct_1Foo");
	}

	#[test]
	fn unicode_whitespace_and_length_limits() {
		let nbsp = format!("acct{}id", '\u{00A0}');

		assert!(ConnectionId::new(&nbsp).is_err());

		let exact = "a".repeat(IDENTITY_MAX_LEN);

		ConnectionId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTITY_MAX_LEN + 1);

		assert!(ConnectionId::new(&too_long).is_err());
	}

	#[test]
	fn parse_goes_through_validation() {
		assert!("with space".parse::<ConnectionId>().is_err());

		let id = "default".parse::<ConnectionId>().expect("Parse should accept a plain identity.");

		assert_eq!(id.as_ref(), "default");
	}
}
