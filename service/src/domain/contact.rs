//! Contact form definitions.

use std::str::FromStr;

use derive_more::{AsRef, Display};

pub use super::payment::Email;

/// Name of a customer reaching out through the contact form.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the provided `name` is a non-blank single
    /// line of at most 200 characters.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let name = name.as_ref().trim();
        is_line(name, 200).then(|| Self(name.to_owned()))
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Phone number a customer may be called back at.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the provided `phone` is a non-blank single
    /// line of at most 50 characters.
    #[must_use]
    pub fn new(phone: impl AsRef<str>) -> Option<Self> {
        let phone = phone.as_ref().trim();
        is_line(phone, 50).then(|| Self(phone.to_owned()))
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Subject of a contact request.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Subject(String);

impl Subject {
    /// Creates a new [`Subject`] if the provided `subject` is a non-blank
    /// single line of at most 200 characters.
    #[must_use]
    pub fn new(subject: impl AsRef<str>) -> Option<Self> {
        let subject = subject.as_ref().trim();
        is_line(subject, 200).then(|| Self(subject.to_owned()))
    }
}

impl FromStr for Subject {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Subject`")
    }
}

/// Free-form text of a contact request.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Text(String);

impl Text {
    /// Minimal number of characters in a [`Text`].
    pub const MIN_LENGTH: usize = 10;

    /// Maximal number of characters in a [`Text`].
    pub const MAX_LENGTH: usize = 10_000;

    /// Creates a new [`Text`] if the provided `text` has from
    /// [`Text::MIN_LENGTH`] to [`Text::MAX_LENGTH`] characters, not counting
    /// the surrounding whitespace.
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let text = text.as_ref().trim();
        let len = text.chars().count();
        (Self::MIN_LENGTH..=Self::MAX_LENGTH)
            .contains(&len)
            .then(|| Self(text.to_owned()))
    }
}

impl FromStr for Text {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Text`")
    }
}

/// E-mail to be delivered by a mailer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mail {
    /// Recipient of this [`Mail`].
    pub to: Email,

    /// Address the replies to this [`Mail`] should go to, if not the sender.
    pub reply_to: Option<Email>,

    /// Subject line of this [`Mail`].
    pub subject: String,

    /// Plain text body of this [`Mail`].
    pub body: String,
}

/// Checks the provided `s` is not empty, has no control characters and is at
/// most `max` characters long.
fn is_line(s: &str, max: usize) -> bool {
    !s.is_empty()
        && s.chars().count() <= max
        && !s.chars().any(char::is_control)
}

#[cfg(test)]
mod spec {
    use super::{Name, Phone, Subject, Text};

    #[test]
    fn name_is_single_line() {
        assert_eq!(
            Name::new("  Hans Muster ").unwrap().as_ref(),
            "Hans Muster",
        );

        assert!(Name::new("").is_none());
        assert!(Name::new("   ").is_none());
        assert!(Name::new("Hans\r\nBcc: x@example.ch").is_none());
        assert!(Name::new("a".repeat(201)).is_none());
    }

    #[test]
    fn optional_lines_are_bounded() {
        assert!(Phone::new("+41 76 123 45 67").is_some());
        assert!(Phone::new("1".repeat(51)).is_none());
        assert!(Subject::new("Offerte Fassadengerüst").is_some());
        assert!(Subject::new("Offerte\nGerüst").is_none());
    }

    #[test]
    fn text_has_min_length() {
        assert!(Text::new("Guten Tag!").is_some());
        assert!(Text::new("Zeile 1\nZeile 2").is_some());

        assert!(Text::new("Zu kurz").is_none());
        assert!(Text::new("  Hallo!   ").is_none());
        assert!(Text::new("x".repeat(10_001)).is_none());
    }
}
