//! Strongly typed user identifier carried by the OAuth `state` parameter.

// std
use std::{borrow::Borrow, ops::Deref, str::FromStr};
// self
use crate::_prelude::*;

/// Error returned when user identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum UserIdError {
	/// The identifier was empty.
	#[error("User identifier cannot be empty.")]
	Empty,
}

/// Provider-external user identifier used as the credential storage key.
///
/// The value arrives as the OAuth `state` parameter and is treated as an opaque,
/// untrusted claim: anything non-empty is accepted and nothing about it is
/// authenticated. Binding state to a server-issued nonce would harden this, but the
/// relay deliberately preserves the weaker round-trip contract.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);
impl UserId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, UserIdError> {
		let view = value.as_ref();

		if view.is_empty() {
			return Err(UserIdError::Empty);
		}

		Ok(Self(view.to_owned()))
	}
}
impl Deref for UserId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for UserId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for UserId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<UserId> for String {
	fn from(value: UserId) -> Self {
		value.0
	}
}
impl TryFrom<String> for UserId {
	type Error = UserIdError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		if value.is_empty() {
			return Err(UserIdError::Empty);
		}

		Ok(Self(value))
	}
}
impl FromStr for UserId {
	type Err = UserIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "UserId({})", self.0)
	}
}
impl Display for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
