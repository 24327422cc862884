// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{CompactValue, Error, Result};
use alloc::vec::Vec;
use core::mem::MaybeUninit;
use zerocopy::{ByteSliceMut, SplitByteSliceMut};

/// Serialise an encoded value, key or argument list into its packed
/// byte form, as consumed by a device driver.
pub trait Emit {
    /// Number of bytes written by [`Emit::emit_raw`].
    fn packed_len(&self) -> usize;

    /// Writes this object's contents into a target buffer without
    /// performing length checks.
    ///
    /// `buf` must have a length of at least [`Emit::packed_len`].
    fn emit_raw<V: ByteSliceMut>(&self, buf: V) -> usize;

    /// Writes this object's contents into a target buffer.
    #[inline]
    fn emit<V: ByteSliceMut>(&self, buf: V) -> Result<usize> {
        if buf.len() != self.packed_len() {
            return Err(Error::LengthMismatch);
        }

        Ok(self.emit_raw(buf))
    }

    /// Writes this object's contents into the start of a target buffer,
    /// returning the remainder.
    #[inline]
    fn emit_prefix<V: SplitByteSliceMut>(&self, buf: V) -> Result<V> {
        let (into, out) = buf
            .split_at(self.packed_len())
            .map_err(|_| Error::LengthMismatch)?;

        self.emit_raw(into);
        Ok(out)
    }

    /// Writes this object's contents into a newly allocated `Vec` of
    /// length [`Emit::packed_len`].
    #[inline]
    fn to_vec(&self) -> Vec<u8> {
        let len = self.packed_len();

        let mut out = vec![0u8; len];

        let o_len = self.emit(&mut out[..]).expect(
            "mismatch between requested packed length and required length",
        );

        assert_eq!(o_len, len);

        out
    }

    /// Writes this object's contents into uninitialised memory.
    #[inline]
    fn emit_uninit(&self, buf: &mut [MaybeUninit<u8>]) -> Result<usize>
    where
        Self: EmitDoesNotRelyOnBufContents,
    {
        // SAFETY: `u8` does not have any validity constraints or Drop,
        // and the implementor promises not to read from `buf` before
        // writing every byte of it.
        let buf = unsafe { &mut *(buf as *mut [_] as *mut [u8]) };

        self.emit(buf)
    }

    /// Writes this object's contents into a newly allocated `Vec`,
    /// without zero-filling it first.
    #[inline]
    fn emit_vec(&self) -> Vec<u8>
    where
        Self: EmitDoesNotRelyOnBufContents,
    {
        let len = self.packed_len();

        let mut out = Vec::with_capacity(len);

        let o_len = self
            .emit_uninit(&mut out.spare_capacity_mut()[..len])
            .expect(
                "mismatch between requested packed length and required length",
            );
        assert_eq!(o_len, len);
        // SAFETY: `emit_uninit` has initialised exactly `o_len` bytes.
        unsafe {
            out.set_len(o_len);
        }

        out
    }
}

impl Emit for CompactValue {
    #[inline]
    fn packed_len(&self) -> usize {
        self.byte_len()
    }

    #[inline]
    fn emit_raw<V: ByteSliceMut>(&self, mut buf: V) -> usize {
        let bytes = self.as_bytes();
        buf[..bytes.len()].copy_from_slice(bytes);

        bytes.len()
    }
}

impl<T: Emit> Emit for Vec<T> {
    #[inline]
    fn packed_len(&self) -> usize {
        self.iter().map(Emit::packed_len).sum()
    }

    #[inline]
    fn emit_raw<V: ByteSliceMut>(&self, mut buf: V) -> usize {
        let mut emitted = 0;

        for el in self {
            emitted += el.emit_raw(&mut buf[emitted..]);
        }

        emitted
    }
}

impl<E: Emit> Emit for &E {
    #[inline]
    fn packed_len(&self) -> usize {
        E::packed_len(self)
    }

    #[inline]
    fn emit_raw<V: ByteSliceMut>(&self, buf: V) -> usize {
        E::emit_raw(self, buf)
    }
}

/// A promise from the programmer to the compiler that an implementation
/// of [`Emit`] does not perform any reads from uninitialised memory.
///
/// # Safety
/// Implementors will be given an uninitialised slice of bytes, and must
/// not meaningfully read from its contents. They are obligated, when
/// implementing [`Emit`], to have written a value to all bytes when
/// given a slice by `emit_uninit`.
pub unsafe trait EmitDoesNotRelyOnBufContents {}

// Safety: compact values copy their full byte range and never read `buf`.
unsafe impl EmitDoesNotRelyOnBufContents for CompactValue {}
unsafe impl<E: Emit + EmitDoesNotRelyOnBufContents> EmitDoesNotRelyOnBufContents
    for &E
{
}
unsafe impl<T: EmitDoesNotRelyOnBufContents> EmitDoesNotRelyOnBufContents
    for Vec<T>
{
}
