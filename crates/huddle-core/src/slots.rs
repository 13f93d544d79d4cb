//! Packed availability codec for one calendar day.
//!
//! ## Summary
//! A day is divided into 30 indexed half-hour slots. The persisted form is a
//! fixed 4-byte blob: slot `i` occupies bit `7 - i % 8` of byte `i / 8`, so
//! the first 30 bits carry the day and the trailing 2 bits stay unused. The
//! packed layout is a storage compatibility contract and must not change.

use crate::constants::{PACKED_DAY_LEN, SLOTS_PER_DAY};
use crate::error::{CoreError, CoreResult};

/// One day's availability, slot 0 through slot 29.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DaySlots([bool; SLOTS_PER_DAY]);

impl DaySlots {
    /// A day with every slot unset. Missing schedule rows decode to this.
    pub const EMPTY: Self = Self([false; SLOTS_PER_DAY]);

    #[must_use]
    pub const fn new(slots: [bool; SLOTS_PER_DAY]) -> Self {
        Self(slots)
    }

    #[must_use]
    pub const fn as_array(&self) -> &[bool; SLOTS_PER_DAY] {
        &self.0
    }

    /// ## Summary
    /// Packs the 30 slots into the fixed 4-byte storage form. Bits 30 and 31
    /// are always written as 0.
    #[must_use]
    pub fn pack(&self) -> PackedDay {
        let mut bytes = [0u8; PACKED_DAY_LEN];
        for (i, set) in self.0.iter().enumerate() {
            if *set {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        PackedDay(bytes)
    }
}

impl Default for DaySlots {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl TryFrom<&[bool]> for DaySlots {
    type Error = CoreError;

    /// Boundary check for slot vectors arriving from callers: anything other
    /// than exactly 30 entries is rejected.
    fn try_from(slots: &[bool]) -> CoreResult<Self> {
        let slots: [bool; SLOTS_PER_DAY] = slots.try_into().map_err(|_| {
            CoreError::ValidationError(format!(
                "a day must have exactly {SLOTS_PER_DAY} slots, got {}",
                slots.len()
            ))
        })?;
        Ok(Self(slots))
    }
}

/// The 4-byte packed form of a [`DaySlots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedDay([u8; PACKED_DAY_LEN]);

impl PackedDay {
    #[must_use]
    pub const fn new(bytes: [u8; PACKED_DAY_LEN]) -> Self {
        Self(bytes)
    }

    /// ## Summary
    /// Validates a blob read back from storage. The schedule column is a
    /// fixed-width BYTEA(4); any other length means the row is corrupt.
    ///
    /// ## Errors
    /// Returns `CoreError::InvariantViolation` if `bytes` is not exactly
    /// 4 bytes long.
    pub fn from_stored(bytes: &[u8]) -> CoreResult<Self> {
        let bytes: [u8; PACKED_DAY_LEN] = bytes
            .try_into()
            .map_err(|_| CoreError::InvariantViolation("stored slot blob is not 4 bytes"))?;
        Ok(Self(bytes))
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PACKED_DAY_LEN] {
        &self.0
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// ## Summary
    /// Unpacks the first 30 bits back into slots. The trailing 2 bits are
    /// ignored, so blobs with garbage there still decode cleanly.
    #[must_use]
    pub fn unpack(&self) -> DaySlots {
        let mut slots = [false; SLOTS_PER_DAY];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = (self.0[i / 8] >> (7 - i % 8)) & 1 == 1;
        }
        DaySlots(slots)
    }
}
