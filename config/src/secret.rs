use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// Wrapper around [`Secret<String>`] that implements [`Serialize`] and [`Deserialize`].
///
/// Secrets must cross process boundaries (they are part of the payload handed to a
/// replication worker), so they need serde support, but they must never leak through
/// [`fmt::Debug`] output. `secrecy` provides the redaction, this wrapper provides the
/// serde round trip.
#[derive(Clone)]
pub struct SerializableSecretString(Secret<String>);

impl SerializableSecretString {
    /// Returns the wrapped secret value.
    ///
    /// Call sites should be kept to the places that actually ship the secret over a
    /// process or network boundary.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Deref for SerializableSecretString {
    type Target = Secret<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<String> for SerializableSecretString {
    fn from(value: String) -> Self {
        Self(Secret::new(value))
    }
}

impl From<&str> for SerializableSecretString {
    fn from(value: &str) -> Self {
        Self(Secret::new(value.to_owned()))
    }
}

impl From<Secret<String>> for SerializableSecretString {
    fn from(value: Secret<String>) -> Self {
        Self(value)
    }
}

impl Serialize for SerializableSecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.expose_secret())
    }
}

impl<'de> Deserialize<'de> for SerializableSecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;

        Ok(Self(Secret::new(string)))
    }
}

impl fmt::Debug for SerializableSecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = SerializableSecretString::from("super-secret-password");
        let debug = format!("{secret:?}");

        assert!(!debug.contains("super-secret-password"));
    }

    #[test]
    fn serde_round_trip_preserves_value() {
        let secret = SerializableSecretString::from("api-key-123");
        let json = serde_json::to_string(&secret).unwrap();

        assert_eq!(json, "\"api-key-123\"");

        let back: SerializableSecretString = serde_json::from_str(&json).unwrap();
        assert_eq!(back.expose_secret(), "api-key-123");
    }
}
