// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt;

/// Convenience type for fallible registry and codec operations.
pub type Result<T> = core::result::Result<T, Error>;

/// An error encountered while building a registry or encoding values
/// against it.
///
/// None of these are transient: each one points at a caller or metadata
/// mistake, and is reported by the call that detected it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Error {
    /// An identifier was decoded as a different kind of object than
    /// the context expects.
    IdentifierKindMismatch,
    /// An identifier did not resolve to a populated registry entry, or
    /// carried an unrecognised kind tag.
    UnknownId,
    /// A field identifier did not resolve.
    UnknownField,
    /// An action identifier did not resolve.
    UnknownAction,
    /// A table identifier did not resolve.
    UnknownTable,
    /// A registry slot was populated twice.
    DuplicateId,
    /// An index fell outside of the capacity declared at init time.
    IndexOutOfRange,
    /// A target is wider than the host type supplying its value.
    BitwidthExceeded,
    /// A value's bitwidth does not match the bitwidth declared for the
    /// slot it is written to.
    BitwidthMismatch,
    /// A buffer's length does not match the byte length implied by a
    /// bitwidth.
    LengthMismatch,
    /// A buffer has non-zero bits above the declared bitwidth.
    MalformedValue,
    /// More values were set than the object was allocated for.
    TooManySet,
    /// An LPM prefix length exceeds the field's bitwidth.
    InvalidPrefixLength,
    /// Storage could not be obtained.
    AllocationFailure,
    /// The next declared match field uses a different match kind.
    MatchKindMismatch,
    /// A bitwidth of zero was declared.
    InvalidBitwidth,
}

impl Error {
    /// Stable numeric status code for consumers on the far side of an
    /// FFI or wire boundary.
    ///
    /// Zero is reserved for success and is never returned.
    pub const fn code(self) -> u32 {
        match self {
            Error::IdentifierKindMismatch => 1,
            Error::UnknownId => 2,
            Error::UnknownField => 3,
            Error::UnknownAction => 4,
            Error::UnknownTable => 5,
            Error::DuplicateId => 6,
            Error::IndexOutOfRange => 7,
            Error::BitwidthExceeded => 8,
            Error::BitwidthMismatch => 9,
            Error::LengthMismatch => 10,
            Error::MalformedValue => 11,
            Error::TooManySet => 12,
            Error::InvalidPrefixLength => 13,
            Error::AllocationFailure => 14,
            Error::MatchKindMismatch => 15,
            Error::InvalidBitwidth => 16,
        }
    }
}

/// Status code reported for a successful operation.
pub const STATUS_SUCCESS: u32 = 0;

/// Collapses a result into a status code.
#[inline]
pub fn status_of<T>(res: &Result<T>) -> u32 {
    match res {
        Ok(_) => STATUS_SUCCESS,
        Err(e) => e.code(),
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Error::IdentifierKindMismatch => "identifier has the wrong kind",
            Error::UnknownId => "identifier does not resolve",
            Error::UnknownField => "unknown field",
            Error::UnknownAction => "unknown action",
            Error::UnknownTable => "unknown table",
            Error::DuplicateId => "identifier already populated",
            Error::IndexOutOfRange => "index exceeds declared capacity",
            Error::BitwidthExceeded => "bitwidth exceeds host value width",
            Error::BitwidthMismatch => "bitwidth does not match declaration",
            Error::LengthMismatch => "buffer length does not match bitwidth",
            Error::MalformedValue => "non-zero bits above declared bitwidth",
            Error::TooManySet => "all slots already set",
            Error::InvalidPrefixLength => "prefix length exceeds bitwidth",
            Error::AllocationFailure => "allocation failed",
            Error::MatchKindMismatch => "match kind does not match declaration",
            Error::InvalidBitwidth => "bitwidth must be non-zero",
        };

        f.write_str(s)
    }
}

impl core::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_codes_are_distinct_and_nonzero() {
        let all = [
            Error::IdentifierKindMismatch,
            Error::UnknownId,
            Error::UnknownField,
            Error::UnknownAction,
            Error::UnknownTable,
            Error::DuplicateId,
            Error::IndexOutOfRange,
            Error::BitwidthExceeded,
            Error::BitwidthMismatch,
            Error::LengthMismatch,
            Error::MalformedValue,
            Error::TooManySet,
            Error::InvalidPrefixLength,
            Error::AllocationFailure,
            Error::MatchKindMismatch,
            Error::InvalidBitwidth,
        ];

        for (i, a) in all.iter().enumerate() {
            assert_ne!(a.code(), STATUS_SUCCESS);
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
    }

    #[test]
    fn status_of_result() {
        assert_eq!(status_of(&Ok::<_, Error>(())), STATUS_SUCCESS);
        assert_eq!(status_of::<()>(&Err(Error::TooManySet)), 12);
    }
}
