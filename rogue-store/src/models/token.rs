//! Bearer session tokens

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use super::ValidationError;

/// Token width in bytes (256 bits)
pub const TOKEN_LEN: usize = 32;

/// Opaque 256-bit session token
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken([u8; TOKEN_LEN]);

impl SessionToken {
    /// Draw a new token from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; TOKEN_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ValidationError> {
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "token".into(),
                reason: "must be 32 bytes",
            })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Short prefix safe for logs and error messages.
    pub fn redacted(&self) -> String {
        let encoded = self.to_string();
        format!("{}..", &encoded[..6])
    }
}

/// URL-safe base64, as carried in the bearer header.
impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&URL_SAFE.encode(self.0))
    }
}

/// Only a short prefix, so tokens don't leak into logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({})", self.redacted())
    }
}

impl FromStr for SessionToken {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = URL_SAFE
            .decode(s.trim())
            .map_err(|_| ValidationError::InvalidFormat {
                field: "token".into(),
                reason: "not valid base64",
            })?;
        Self::from_slice(&bytes)
    }
}
