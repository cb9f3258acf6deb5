//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Identifier of an inventory item.
///
/// Item ids are assigned by the catalog (outside this workspace) and are
/// positive integers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    /// Wrap a raw id without checking it. Prefer [`ItemId::checked`] at trust boundaries.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Wrap a raw id, rejecting zero and negative values.
    pub fn checked(raw: i64) -> DomainResult<Self> {
        if raw <= 0 {
            return Err(DomainError::invalid_id(format!(
                "ItemId must be a positive integer, got {raw}"
            )));
        }
        Ok(Self(raw))
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<ItemId> for i64 {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::invalid_id(format!("ItemId: {e}")))?;
        Self::checked(raw)
    }
}
