//! [`Session`] definitions.

use std::time::Duration;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

use super::Username;

/// Claims of an administrator session, signed into a [`Token`].
///
/// Sessions are stateless: nothing is stored server-side, so a [`Session`] is
/// valid until it expires or its [`Token`] signature stops verifying.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Session {
    /// [`Username`] of the administrator this [`Session`] was issued to.
    pub username: Username,

    /// [`DateTime`] when this [`Session`] was issued.
    #[serde(rename = "iat", with = "common::datetime::serde::unix_timestamp")]
    pub issued_at: IssuanceDateTime,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// [`Duration`] a [`Session`] stays valid after being issued.
    pub const LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

    /// Creates a new [`Session`] for the provided [`Username`] issued right
    /// now.
    #[must_use]
    pub fn issue(username: Username) -> Self {
        let issued_at = IssuanceDateTime::now();
        Self {
            username,
            issued_at,
            expires_at: (issued_at + Self::LIFETIME).coerce(),
        }
    }
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
#[as_ref(str)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of a [`Session`] issuance.
pub type IssuanceDateTime = DateTimeOf<(Session, unit::Issuance)>;

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
