//! Item identifiers
//!
//! Provides [`ItemId`], the tagged identifier of a checklist item, and the
//! codec functions that translate between it and the loose wire forms the
//! backend and the local cache use ([`RawItemId`]).
//!
//! # Forms
//! - `42` → [`ItemId::Base`]: a template item id on its own
//! - `"15_950"` → [`ItemId::Compound`]: instance `15`, base item `950`

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between the instance and base segments of a compound id
pub const SEPARATOR: char = '_';

/// Item id exactly as it appears on the wire: a JSON number or a string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawItemId {
    /// Numeric form (`42`)
    Number(i64),
    /// Textual form (`"42"`, `"15_950"`)
    Text(String),
}

impl RawItemId {
    /// Text form used for string comparison and cache keys
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Number(n) => Cow::Owned(n.to_string()),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Numeric value when this id is a plain non-negative integer
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => u64::try_from(*n).ok(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl Display for RawItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<i64> for RawItemId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for RawItemId {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<u64> for RawItemId {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Number)
    }
}

impl From<&str> for RawItemId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawItemId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<ItemId> for RawItemId {
    fn from(id: ItemId) -> Self {
        match id {
            ItemId::Base(base) => Self::from(base),
            ItemId::Compound { .. } => Self::Text(id.to_string()),
        }
    }
}

impl From<&ItemId> for RawItemId {
    fn from(id: &ItemId) -> Self {
        Self::from(*id)
    }
}

/// Identifier of a checklist item, decided once at construction
///
/// Both segments of a compound id and a base id are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawItemId", into = "RawItemId")]
pub enum ItemId {
    /// Template item id without instance scope
    Base(u64),
    /// Item scoped to one checklist instance
    Compound {
        /// Owning instance
        instance_id: u64,
        /// Template item id
        base_id: u64,
    },
}

impl ItemId {
    /// Create a base id
    ///
    /// # Errors
    /// [`ItemIdError::NotPositive`] when `base_id` is zero.
    #[inline]
    pub fn base(base_id: u64) -> Result<Self, ItemIdError> {
        positive(base_id).map(Self::Base)
    }

    /// Create a compound id
    ///
    /// # Errors
    /// [`ItemIdError::NotPositive`] when either segment is zero.
    #[inline]
    pub fn compound(instance_id: u64, base_id: u64) -> Result<Self, ItemIdError> {
        Ok(Self::Compound {
            instance_id: positive(instance_id)?,
            base_id: positive(base_id)?,
        })
    }

    /// Template item id
    #[inline]
    #[must_use]
    pub fn base_id(&self) -> u64 {
        match *self {
            Self::Base(base) | Self::Compound { base_id: base, .. } => base,
        }
    }

    /// Instance scope, if any
    #[inline]
    #[must_use]
    pub fn instance_id(&self) -> Option<u64> {
        match *self {
            Self::Base(_) => None,
            Self::Compound { instance_id, .. } => Some(instance_id),
        }
    }

    /// Whether this id carries an instance scope
    #[inline]
    #[must_use]
    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Compound { .. })
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base(base) => write!(f, "{base}"),
            Self::Compound {
                instance_id,
                base_id,
            } => write!(f, "{instance_id}{SEPARATOR}{base_id}"),
        }
    }
}

impl FromStr for ItemId {
    type Err = ItemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ItemIdError::Empty);
        }

        match s.split_once(SEPARATOR) {
            Some((instance, base)) => {
                if base.contains(SEPARATOR) {
                    return Err(ItemIdError::Malformed(s.to_string()));
                }
                Self::compound(segment(instance, s)?, segment(base, s)?)
            }
            None => Self::base(segment(s, s)?),
        }
    }
}

impl TryFrom<RawItemId> for ItemId {
    type Error = ItemIdError;

    fn try_from(raw: RawItemId) -> Result<Self, Self::Error> {
        Self::try_from(&raw)
    }
}

impl TryFrom<&RawItemId> for ItemId {
    type Error = ItemIdError;

    fn try_from(raw: &RawItemId) -> Result<Self, Self::Error> {
        match raw {
            RawItemId::Number(n) => u64::try_from(*n)
                .map_err(|_| ItemIdError::NotPositive(n.to_string()))
                .and_then(Self::base),
            RawItemId::Text(s) => s.parse(),
        }
    }
}

fn positive(value: u64) -> Result<u64, ItemIdError> {
    if value == 0 {
        Err(ItemIdError::NotPositive(value.to_string()))
    } else {
        Ok(value)
    }
}

fn segment(text: &str, whole: &str) -> Result<u64, ItemIdError> {
    if text.starts_with('-') {
        return Err(ItemIdError::NotPositive(whole.to_string()));
    }
    // Plain ASCII digits only
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ItemIdError::Malformed(whole.to_string()));
    }
    text.parse::<u64>()
        .map_err(|_| ItemIdError::Malformed(whole.to_string()))
}

/// Build the compound id string for an item of an instance
#[inline]
#[must_use]
pub fn create_compound_id(instance_id: u64, base_item_id: u64) -> String {
    format!("{instance_id}{SEPARATOR}{base_item_id}")
}

/// Recover the template item id from any id form
///
/// An explicit `fallback` always wins. Otherwise the segment after the
/// separator is parsed, or the whole id when there is no separator.
#[must_use]
pub fn extract_base_item_id(id: &RawItemId, fallback: Option<u64>) -> Option<u64> {
    if fallback.is_some() {
        return fallback;
    }
    match id {
        RawItemId::Number(n) => u64::try_from(*n).ok(),
        RawItemId::Text(s) => match s.split_once(SEPARATOR) {
            Some((_, base)) => base.trim().parse().ok(),
            None => s.trim().parse().ok(),
        },
    }
}

/// Recover the instance id from a compound id string
#[must_use]
pub fn extract_instance_id(id: &str) -> Option<u64> {
    id.split_once(SEPARATOR)
        .and_then(|(instance, _)| instance.trim().parse().ok())
}

/// Whether `id` is a positive integer or a two-segment compound id of positive integers
#[must_use]
pub fn is_valid_item_id(id: impl Into<RawItemId>) -> bool {
    ItemId::try_from(id.into()).is_ok()
}

/// Whether `id` can identify a checklist instance
#[inline]
#[must_use]
pub fn is_valid_instance_id(id: i64) -> bool {
    id > 0
}

/// Collapse any id form to its base item id for use as a lookup key
///
/// Unparseable input maps to `0`.
#[must_use]
pub fn to_numeric_key(id: impl Into<RawItemId>) -> u64 {
    extract_base_item_id(&id.into(), None).unwrap_or(0)
}

/// Item id parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemIdError {
    /// Empty id
    #[error("item id is empty")]
    Empty,

    /// A segment is zero or negative
    #[error("item id '{0}' must be a positive integer")]
    NotPositive(String),

    /// Not a number and not `<instance>_<base>`
    #[error("malformed item id '{0}'")]
    Malformed(String),
}
