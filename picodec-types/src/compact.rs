// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bitwidth-exact, big-endian value storage.

use crate::{Error, Result};
use alloc::{boxed::Box, vec::Vec};
use core::fmt;
use zerocopy::byteorder::network_endian::{U128, U64};
use zerocopy::IntoBytes;

/// Largest byte length held in [`StorageClass::Narrow`] storage.
pub const NARROW_BYTES: usize = 8;
/// Largest byte length held in [`StorageClass::Wide`] storage.
pub const WIDE_BYTES: usize = 16;

/// Number of bytes needed to hold `bitwidth` bits.
#[inline]
pub const fn bytes_for(bitwidth: usize) -> usize {
    bitwidth.div_ceil(8)
}

/// Mask of the bits in the most significant byte which fall within
/// `bitwidth`.
#[inline]
pub const fn first_byte_mask(bitwidth: usize) -> u8 {
    match bitwidth % 8 {
        0 => 0xff,
        r => (1u8 << r) - 1,
    }
}

/// Which backing store a [`CompactValue`] uses.
///
/// This is a function of byte length alone.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StorageClass {
    /// Inline, up to [`NARROW_BYTES`]. Also readable as a `u64`.
    Narrow,
    /// Inline, up to [`WIDE_BYTES`].
    Wide,
    /// Heap-allocated.
    Extended,
}

impl StorageClass {
    #[inline]
    pub const fn for_len(len: usize) -> Self {
        if len <= NARROW_BYTES {
            StorageClass::Narrow
        } else if len <= WIDE_BYTES {
            StorageClass::Wide
        } else {
            StorageClass::Extended
        }
    }
}

// Meaningful bytes always start at index 0; any inline tail is zero.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum Storage {
    Narrow([u8; NARROW_BYTES]),
    Wide([u8; WIDE_BYTES]),
    Extended(Box<[u8]>),
}

/// The canonical encoding of one field or parameter value.
///
/// Holds exactly `ceil(bitwidth / 8)` big-endian bytes, with any unused
/// high bits of the first byte cleared.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CompactValue {
    bitwidth: usize,
    storage: Storage,
}

impl CompactValue {
    /// Builds an all-zero value of `bitwidth` bits.
    pub fn zeroed(bitwidth: usize) -> Result<Self> {
        if bitwidth == 0 {
            return Err(Error::InvalidBitwidth);
        }

        let len = bytes_for(bitwidth);
        let storage = match StorageClass::for_len(len) {
            StorageClass::Narrow => Storage::Narrow([0; NARROW_BYTES]),
            StorageClass::Wide => Storage::Wide([0; WIDE_BYTES]),
            StorageClass::Extended => {
                let mut buf = Vec::new();
                buf.try_reserve_exact(len)
                    .map_err(|_| Error::AllocationFailure)?;
                buf.resize(len, 0);
                Storage::Extended(buf.into_boxed_slice())
            }
        };

        Ok(Self { bitwidth, storage })
    }

    /// Copies an already-canonical big-endian buffer.
    ///
    /// Fails if `bytes` is not exactly `ceil(bitwidth / 8)` long, or if
    /// any bit above `bitwidth` is set.
    pub fn from_be_slice(bitwidth: usize, bytes: &[u8]) -> Result<Self> {
        let out = Self::copy_in(bitwidth, bytes)?;
        let mask = first_byte_mask(bitwidth);
        if out.as_bytes()[0] & !mask != 0 {
            return Err(Error::MalformedValue);
        }

        Ok(out)
    }

    /// As [`Self::from_be_slice`], but clears bits above `bitwidth`
    /// rather than rejecting them.
    pub fn from_be_slice_masked(
        bitwidth: usize,
        bytes: &[u8],
    ) -> Result<Self> {
        let mut out = Self::copy_in(bitwidth, bytes)?;
        out.bytes_mut()[0] &= first_byte_mask(bitwidth);

        Ok(out)
    }

    fn copy_in(bitwidth: usize, bytes: &[u8]) -> Result<Self> {
        let mut out = Self::zeroed(bitwidth)?;
        if bytes.len() != out.byte_len() {
            return Err(Error::LengthMismatch);
        }
        out.bytes_mut().copy_from_slice(bytes);

        Ok(out)
    }

    /// Encodes the low `bitwidth` bits of `v`.
    pub fn from_u64(bitwidth: usize, v: u64) -> Result<Self> {
        if bitwidth > 64 {
            return Err(Error::BitwidthExceeded);
        }

        let mut out = Self::zeroed(bitwidth)?;
        let be = U64::new(v);
        let len = out.byte_len();
        out.bytes_mut().copy_from_slice(&be.as_bytes()[8 - len..]);
        out.bytes_mut()[0] &= first_byte_mask(bitwidth);

        Ok(out)
    }

    /// Encodes the low `bitwidth` bits of `v`.
    pub fn from_u128(bitwidth: usize, v: u128) -> Result<Self> {
        if bitwidth > 128 {
            return Err(Error::BitwidthExceeded);
        }

        let mut out = Self::zeroed(bitwidth)?;
        let be = U128::new(v);
        let len = out.byte_len();
        out.bytes_mut().copy_from_slice(&be.as_bytes()[16 - len..]);
        out.bytes_mut()[0] &= first_byte_mask(bitwidth);

        Ok(out)
    }

    #[inline]
    pub fn bitwidth(&self) -> usize {
        self.bitwidth
    }

    /// Number of meaningful bytes, `ceil(bitwidth / 8)`.
    #[inline]
    pub fn byte_len(&self) -> usize {
        bytes_for(self.bitwidth)
    }

    #[inline]
    pub fn storage_class(&self) -> StorageClass {
        match self.storage {
            Storage::Narrow(_) => StorageClass::Narrow,
            Storage::Wide(_) => StorageClass::Wide,
            Storage::Extended(_) => StorageClass::Extended,
        }
    }

    /// The value's big-endian bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.byte_len();
        match &self.storage {
            Storage::Narrow(b) => &b[..len],
            Storage::Wide(b) => &b[..len],
            Storage::Extended(b) => &b[..],
        }
    }

    #[inline]
    fn bytes_mut(&mut self) -> &mut [u8] {
        let len = self.byte_len();
        match &mut self.storage {
            Storage::Narrow(b) => &mut b[..len],
            Storage::Wide(b) => &mut b[..len],
            Storage::Extended(b) => &mut b[..],
        }
    }

    /// Reads a narrow value back as a native integer.
    ///
    /// Returns `None` for wide and extended values.
    #[inline]
    pub fn as_u64(&self) -> Option<u64> {
        match self.storage {
            Storage::Narrow(_) => Some(
                self.as_bytes()
                    .iter()
                    .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)),
            ),
            _ => None,
        }
    }

    /// Reads a narrow or wide value back as a native integer.
    #[inline]
    pub fn as_u128(&self) -> Option<u128> {
        match self.storage {
            Storage::Extended(_) => None,
            _ => Some(
                self.as_bytes()
                    .iter()
                    .fold(0u128, |acc, b| (acc << 8) | u128::from(*b)),
            ),
        }
    }
}

impl AsRef<[u8]> for CompactValue {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Display for CompactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for b in self.as_bytes() {
            write!(f, "{b:02x}")?;
        }
        write!(f, "/{}", self.bitwidth)
    }
}
