use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A registry entry describing a named network relay.
///
/// `uri` is the unique key. A stored relay is never edited in place: changing any
/// field means removing the entry and adding it again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relay {
    pub uri: String,
    pub operator: String,
    pub is_mandatory: bool,
    pub description: String,
}

impl Relay {
    pub fn new(
        uri: impl Into<String>,
        operator: impl Into<String>,
        is_mandatory: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            operator: operator.into(),
            is_mandatory,
            description: description.into(),
        }
    }
}

/// The answer of a full listing.
///
/// An empty registry is reported as [`Relays::Empty`] rather than as an empty
/// list, so callers built around "nothing configured" vs "configured" can tell
/// the two states apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "relays", rename_all = "snake_case")]
pub enum Relays {
    Empty,
    Listed(Vec<Relay>),
}

impl Relays {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Collapses the listing into a slice, the empty signal becoming `&[]`.
    #[must_use]
    pub fn as_slice(&self) -> &[Relay] {
        match self {
            Self::Empty => &[],
            Self::Listed(relays) => relays,
        }
    }

    #[must_use]
    pub fn into_option(self) -> Option<Vec<Relay>> {
        match self {
            Self::Empty => None,
            Self::Listed(relays) => Some(relays),
        }
    }
}

/// Content hash of a relay URI, published alongside add/remove events so that
/// indexers can key entries without storing the full URI.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UriHash([u8; 32]);

impl UriHash {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for UriHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for UriHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UriHash({self})")
    }
}

impl Serialize for UriHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UriHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let digits = raw.strip_prefix("0x").unwrap_or(&raw);
        let mut bytes = [0; 32];
        hex::decode_to_slice(digits, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}
