// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use bitflags::bitflags;
use core::fmt;

/// Comparison semantics of a table's match field.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchKind {
    Exact,
    Lpm,
    Ternary,
    Range,
}

impl MatchKind {
    /// Number of match key entries one field of this kind occupies.
    ///
    /// LPM carries a trailing prefix length, ternary a mask, and range
    /// its upper bound.
    #[inline]
    pub const fn slots(self) -> usize {
        match self {
            MatchKind::Exact => 1,
            MatchKind::Lpm | MatchKind::Ternary | MatchKind::Range => 2,
        }
    }

    #[inline]
    pub const fn flag(self) -> MatchKinds {
        match self {
            MatchKind::Exact => MatchKinds::EXACT,
            MatchKind::Lpm => MatchKinds::LPM,
            MatchKind::Ternary => MatchKinds::TERNARY,
            MatchKind::Range => MatchKinds::RANGE,
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchKind::Exact => "exact",
            MatchKind::Lpm => "lpm",
            MatchKind::Ternary => "ternary",
            MatchKind::Range => "range",
        })
    }
}

bitflags! {
/// The set of match kinds used across a table's match fields.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchKinds: u8 {
    const EXACT   = 0b0001;
    const LPM     = 0b0010;
    const TERNARY = 0b0100;
    const RANGE   = 0b1000;
}
}

impl MatchKinds {
    /// Entries on tables matching on these kinds may overlap, and so
    /// must carry a priority.
    #[inline]
    pub fn requires_priority(self) -> bool {
        self.intersects(MatchKinds::TERNARY | MatchKinds::RANGE)
    }
}

impl FromIterator<MatchKind> for MatchKinds {
    fn from_iter<I: IntoIterator<Item = MatchKind>>(iter: I) -> Self {
        iter.into_iter().fold(MatchKinds::empty(), |acc, k| acc | k.flag())
    }
}
