use std::num::NonZero;

use derive_more::IsVariant;

/// The number of entries in a non-empty chain. An empty chain has no Length at all, see
/// [`ListState::Empty`](super::ListState::Empty).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub(crate) struct Length(pub NonZero<usize>);

impl Length {
    pub const fn checked_add(self, other: usize) -> Option<Length> {
        Length::wrap_non_zero(self.0.checked_add(other))
    }

    pub const fn checked_sub(self, other: usize) -> Option<Length> {
        Length::wrap_non_zero(match self.0.get().checked_sub(other) {
            Some(res) => NonZero::new(res),
            None => None,
        })
    }

    pub const fn get(self) -> usize {
        self.0.get()
    }

    pub const fn wrap_non_zero(value: Option<NonZero<usize>>) -> Option<Length> {
        match value {
            Some(res) => Some(Length(res)),
            None => None,
        }
    }
}

pub(crate) const ONE: Length = Length(NonZero::<usize>::MIN);

/// How the byte length of a payload should be determined when it is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IsVariant)]
pub enum ByteLen {
    /// The payload is exactly this many bytes long.
    Exact(usize),
    /// The payload is text. Its length is measured up to the first nul byte (or the end of the
    /// text if there is none), plus one for the terminator.
    Text,
}

impl ByteLen {
    /// Resolves this specification into a concrete length for `value`.
    ///
    /// ```
    /// # use locked_list::ByteLen;
    /// assert_eq!(ByteLen::Text.resolve("abc"), 4);
    /// assert_eq!(ByteLen::Text.resolve(b"ab\0cd"), 3);
    /// assert_eq!(ByteLen::Exact(7).resolve("abc"), 7);
    /// ```
    pub fn resolve<V: AsRef<[u8]> + ?Sized>(self, value: &V) -> usize {
        match self {
            ByteLen::Exact(len) => len,
            ByteLen::Text => {
                let bytes = value.as_ref();
                bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len()) + 1
            },
        }
    }
}

impl From<usize> for ByteLen {
    fn from(value: usize) -> Self {
        ByteLen::Exact(value)
    }
}
