//! Validated name types for stored artifacts.
//!
//! Two names travel through the system:
//!
//! - [`DisplayName`]: the client-supplied upload name after sanitisation. It is always a single
//!   path component and never empty.
//! - [`StoredName`]: `<opaque_id>-<display_name>`, the key under which an artifact is stored and
//!   later requested for download.
//!
//! Both are only constructible through their validating constructors, so holding one is proof
//! that joining it onto the storage root stays inside the root.

use dropshare_id::OpaqueId;
use std::fmt;

/// Name used when sanitisation leaves nothing behind.
pub const FALLBACK_DISPLAY_NAME: &str = "file";

/// Upper bound, in bytes, for a sanitised display name.
pub const MAX_DISPLAY_NAME_BYTES: usize = 200;

/// Errors produced when validating a requested stored name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// The input text was empty
    #[error("name cannot be empty")]
    Empty,

    /// The input contains a path separator, parent segment or other unsafe character
    #[error("name contains unsafe path characters: {0}")]
    UnsafePath(String),

    /// The input does not follow the `<opaque_id>-<name>` layout
    #[error("malformed stored name: {0}")]
    Malformed(String),
}

/// A sanitised, single-component file name derived from untrusted client input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    /// Sanitises an untrusted upload name.
    ///
    /// - Only the final component is kept (`/` and `\` both count as separators).
    /// - Control characters and `"` are dropped.
    /// - Leading whitespace and dots are removed, as is trailing whitespace.
    /// - The result is capped at [`MAX_DISPLAY_NAME_BYTES`] on a character boundary.
    /// - An empty result becomes [`FALLBACK_DISPLAY_NAME`].
    ///
    /// Sanitisation is idempotent: sanitising an already sanitised name returns it unchanged.
    pub fn sanitise(input: &str) -> Self {
        let last = input.rsplit(['/', '\\']).next().unwrap_or("");

        let cleaned: String = last
            .chars()
            .filter(|c| !c.is_control() && *c != '"')
            .collect();

        let mut name = cleaned
            .trim_start_matches(|c: char| c == '.' || c.is_whitespace())
            .trim_end()
            .to_owned();

        if name.len() > MAX_DISPLAY_NAME_BYTES {
            let mut cut = MAX_DISPLAY_NAME_BYTES;
            while !name.is_char_boundary(cut) {
                cut -= 1;
            }
            name.truncate(cut);
            name.truncate(name.trim_end().len());
        }

        if name.is_empty() {
            return Self(FALLBACK_DISPLAY_NAME.to_owned());
        }
        Self(name)
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Storage key of an artifact: `<opaque_id>-<display_name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredName {
    full: String,
    id: OpaqueId,
}

impl StoredName {
    /// Combines a freshly generated id with a sanitised display name.
    pub fn new(id: &OpaqueId, display: &DisplayName) -> Self {
        Self {
            full: format!("{}-{}", id, display),
            id: id.clone(),
        }
    }

    /// Validates a stored name received from a client.
    ///
    /// The name must be a single path component, must not start with `.`, and must consist of
    /// a canonical opaque id, a `-`, and a display name that is already in sanitised form.
    /// Anything else cannot have been produced by [`StoredName::new`] and is rejected before
    /// storage is touched.
    ///
    /// # Errors
    ///
    /// - [`NameError::Empty`] for an empty input
    /// - [`NameError::UnsafePath`] for separators, NUL/control characters, or a leading dot
    /// - [`NameError::Malformed`] when the id prefix or display suffix is not canonical
    pub fn parse(input: &str) -> Result<Self, NameError> {
        if input.is_empty() {
            return Err(NameError::Empty);
        }

        if input.starts_with('.')
            || input.contains(['/', '\\'])
            || input.chars().any(char::is_control)
        {
            return Err(NameError::UnsafePath(input.to_owned()));
        }

        let (id_part, display_part) = input
            .split_once('-')
            .ok_or_else(|| NameError::Malformed(input.to_owned()))?;

        let id = OpaqueId::parse(id_part).map_err(|_| NameError::Malformed(input.to_owned()))?;

        if DisplayName::sanitise(display_part).as_str() != display_part {
            return Err(NameError::Malformed(input.to_owned()));
        }

        Ok(Self {
            full: input.to_owned(),
            id,
        })
    }

    /// Returns the full stored name.
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// Returns the opaque id prefix.
    pub fn opaque_id(&self) -> &OpaqueId {
        &self.id
    }

    /// Returns the sanitised display name suffix.
    pub fn display_name(&self) -> &str {
        // The id has a fixed width and is always followed by '-'.
        &self.full[dropshare_id::OPAQUE_ID_LEN + 1..]
    }
}

impl fmt::Display for StoredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl AsRef<str> for StoredName {
    fn as_ref(&self) -> &str {
        &self.full
    }
}

impl serde::Serialize for StoredName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.full)
    }
}

impl<'de> serde::Deserialize<'de> for StoredName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        StoredName::parse(&s).map_err(serde::de::Error::custom)
    }
}
