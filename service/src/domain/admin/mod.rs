//! Administrator [`Identity`] definitions.

pub mod session;

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHasher as _, PasswordVerifier as _,
        SaltString,
    },
    Argon2,
};
use derive_more::{AsRef, Display, From};
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};

pub use self::session::Session;

/// The only administrator of the storefront.
///
/// There is no user model: the identity is loaded from configuration once at
/// startup and injected into the [`Service`].
///
/// [`Service`]: crate::Service
#[derive(Clone, Debug)]
pub struct Identity {
    /// [`Username`] of the administrator.
    pub username: Username,

    /// [`PasswordHash`] of the administrator.
    pub password_hash: PasswordHash,
}

impl Identity {
    /// Creates a new [`Identity`] by hashing the provided [`Password`] with a
    /// freshly generated salt.
    ///
    /// # Errors
    ///
    /// If the [`Password`] cannot be hashed.
    pub fn new(
        username: Username,
        password: &Password,
    ) -> Result<Self, password_hash::Error> {
        Ok(Self {
            username,
            password_hash: PasswordHash::new(password)?,
        })
    }
}

/// Username of the administrator.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Creates a new [`Username`] if the given `username` is valid.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Option<Self> {
        let username = username.into();
        Self::check(&username).then_some(Self(username))
    }

    /// Checks whether the given `username` is a valid [`Username`].
    fn check(username: impl AsRef<str>) -> bool {
        let username = username.as_ref();
        username.trim() == username
            && !username.is_empty()
            && username.chars().count() <= 64
    }
}

impl std::str::FromStr for Username {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Username`")
    }
}

impl TryFrom<String> for Username {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or("invalid `Username`")
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Password of the administrator.
#[derive(Clone, Display, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

impl Password {
    /// Returns the bytes of this [`Password`].
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// [Argon2id] hash of a [`Password`] in [PHC string format].
///
/// [Argon2id]: https://en.wikipedia.org/wiki/Argon2
/// [PHC string format]: https://github.com/P-H-C/phc-string-format
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the provided [`Password`] with a random salt.
    ///
    /// # Errors
    ///
    /// If [`Argon2`] fails to hash the [`Password`].
    pub fn new(password: &Password) -> Result<Self, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
    }

    /// Checks whether the provided [`Password`] matches this [`PasswordHash`].
    ///
    /// Comparison of the derived keys is performed in constant time.
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        password_hash::PasswordHash::new(&self.0).is_ok_and(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), &hash)
                .is_ok()
        })
    }
}

#[cfg(test)]
mod spec {
    use super::{Identity, Password, PasswordHash, Username};

    #[test]
    fn hash_is_salted_and_verifiable() {
        let password = Password::from("apex12345");
        let first = PasswordHash::new(&password).unwrap();
        let second = PasswordHash::new(&password).unwrap();

        assert_ne!(first, second, "every hash must use its own salt");
        assert!(first.to_string().starts_with("$argon2id$"));
        assert!(first.verify(&password));
        assert!(second.verify(&password));
        assert!(!first.verify(&Password::from("apex123456")));
    }

    #[test]
    fn username_validation() {
        assert!(Username::new("Apex").is_some());
        assert!(Username::new("").is_none());
        assert!(Username::new(" Apex").is_none());
        assert!(Username::new("a".repeat(65)).is_none());
    }

    #[test]
    fn identity_hashes_password_once() {
        let identity = Identity::new(
            Username::new("Apex").unwrap(),
            &Password::from("apex12345"),
        )
        .unwrap();

        assert!(identity.password_hash.verify(&Password::from("apex12345")));
    }
}
