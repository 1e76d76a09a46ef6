// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use zeroize::Zeroize;

/// Placeholder printed wherever a secret would otherwise appear.
pub const REDACTED: &str = "[REDACTED]";

/// A value that redacts itself in Debug, Display and Serialize output and is
/// zeroed on drop.
///
/// Configured shared-database passwords are held in this type from the moment
/// they are parsed until a provider writes them into a cluster secret.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Explicitly access the inner value.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + PartialEq,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + Eq {}

impl From<String> for Secret<String> {
	fn from(value: String) -> Self {
		Secret::new(value)
	}
}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Secret<T>
	where
		T: Serialize + Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_debug_is_redacted() {
		let secret = Secret::new("root-password-123".to_string());
		let output = format!("{secret:?}");

		assert!(!output.contains("root-password-123"));
		assert_eq!(output, "Secret(\"[REDACTED]\")");
	}

	#[test]
	fn test_display_is_redacted() {
		let secret = SecretString::from("hunter2".to_string());
		assert_eq!(format!("{secret}"), REDACTED);
	}

	#[test]
	fn test_expose_returns_inner_value() {
		let secret = Secret::new("abc".to_string());
		assert_eq!(secret.expose(), "abc");
	}

	#[test]
	fn test_clone_and_equality() {
		let secret = Secret::new("abc".to_string());
		assert_eq!(secret.clone(), secret);
		assert_ne!(secret, Secret::new("abd".to_string()));
	}

	#[cfg(feature = "serde")]
	#[test]
	fn test_serialize_is_redacted_and_deserialize_keeps_value() {
		let secret = Secret::new("db-pass".to_string());
		let json = serde_json::to_string(&secret).unwrap();
		assert_eq!(json, "\"[REDACTED]\"");

		let parsed: SecretString = serde_json::from_str("\"db-pass\"").unwrap();
		assert_eq!(parsed.expose(), "db-pass");
	}

	proptest! {
		#[test]
		fn debug_never_contains_secret(inner in "[a-zA-Z0-9]{4,40}") {
			let secret = Secret::new(inner.clone());
			let output = format!("{secret:?}");
			prop_assert!(!output.contains(&inner));
		}
	}
}
