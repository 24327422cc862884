// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The encoded match key of one table entry.
//!
//! A key is filled sequentially, in the table's declared match-field
//! order. Each `set_*` call is checked against [`MatchKey::next_field`]
//! before anything is written, so a rejected call leaves the key exactly
//! as it was.

use crate::p4info::{MatchFieldInfo, P4Info, TableInfo};
use alloc::vec::Vec;
use picodec_types::{
    bytes_for, CompactValue, Emit, EmitDoesNotRelyOnBufContents, Error,
    MatchKind, P4Id, Result,
};
use zerocopy::ByteSliceMut;

/// Width of the synthetic prefix-length entry following an LPM value.
pub const PREFIX_LEN_BITWIDTH: usize = 32;

/// Packed size of the prefix-length entry.
pub const PREFIX_LEN_BYTES: usize = bytes_for(PREFIX_LEN_BITWIDTH);

#[derive(Clone, Debug)]
pub struct MatchKey<'p> {
    table: &'p TableInfo,
    entries: Vec<CompactValue>,
    slot_count: usize,
    fields_set: usize,
}

impl<'p> MatchKey<'p> {
    /// Sizes a key for `table_id`: one entry per match field, plus one
    /// per LPM, ternary or range field.
    #[tracing::instrument(level = "trace", skip(p4info))]
    pub fn allocate(p4info: &'p P4Info, table_id: P4Id) -> Result<Self> {
        let table = p4info.lookup_table(table_id, Error::UnknownTable)?;
        let slot_count = table.slot_count();

        let mut entries = Vec::new();
        entries
            .try_reserve_exact(slot_count)
            .map_err(|_| Error::AllocationFailure)?;

        Ok(Self { table, entries, slot_count, fields_set: 0 })
    }

    /// Empties the key so it can be refilled, keeping its storage.
    pub fn init(&mut self) {
        self.entries.clear();
        self.fields_set = 0;
    }

    /// Releases the key's storage.
    #[inline]
    pub fn destroy(self) {}

    #[inline]
    pub fn table_id(&self) -> P4Id {
        self.table.id()
    }

    /// Number of entries set.
    #[inline]
    pub fn nset(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Number of match fields consumed.
    #[inline]
    pub fn fields_set(&self) -> usize {
        self.fields_set
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.table.is_complete() && self.nset() == self.slot_count
    }

    /// The match field the next `set_*` call will fill.
    #[inline]
    pub fn next_field(&self) -> Option<&'p MatchFieldInfo> {
        self.table.match_fields().get(self.fields_set)
    }

    #[inline]
    pub fn entries(&self) -> &[CompactValue] {
        &self.entries
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&CompactValue> {
        self.entries.get(index)
    }

    pub fn set_exact(&mut self, value: CompactValue) -> Result<()> {
        self.check_next(MatchKind::Exact, value.bitwidth())?;
        self.push(value, None);

        Ok(())
    }

    /// Sets `value` followed by its prefix length.
    pub fn set_lpm(
        &mut self,
        value: CompactValue,
        prefix_len: u32,
    ) -> Result<()> {
        self.check_next(MatchKind::Lpm, value.bitwidth())?;
        if prefix_len as usize > value.bitwidth() {
            tracing::debug!(
                table_id = %self.table_id(),
                prefix_len,
                bitwidth = value.bitwidth(),
                "prefix longer than value"
            );
            return Err(Error::InvalidPrefixLength);
        }
        let prefix =
            CompactValue::from_u64(PREFIX_LEN_BITWIDTH, prefix_len.into())?;
        self.push(value, Some(prefix));

        Ok(())
    }

    /// Sets `value` followed by `mask`.
    pub fn set_ternary(
        &mut self,
        value: CompactValue,
        mask: CompactValue,
    ) -> Result<()> {
        self.set_pair(MatchKind::Ternary, value, mask)
    }

    /// Sets the lower bound `low` followed by the upper bound `high`.
    pub fn set_range(
        &mut self,
        low: CompactValue,
        high: CompactValue,
    ) -> Result<()> {
        self.set_pair(MatchKind::Range, low, high)
    }

    fn set_pair(
        &mut self,
        kind: MatchKind,
        first: CompactValue,
        second: CompactValue,
    ) -> Result<()> {
        self.check_next(kind, first.bitwidth())?;
        if second.bitwidth() != first.bitwidth() {
            tracing::debug!(
                table_id = %self.table_id(),
                %kind,
                first = first.bitwidth(),
                second = second.bitwidth(),
                "paired entry widths differ"
            );
            return Err(Error::BitwidthMismatch);
        }
        self.push(first, Some(second));

        Ok(())
    }

    fn check_next(&self, kind: MatchKind, bitwidth: usize) -> Result<()> {
        let res = match self.next_field() {
            Some(_) if self.nset() + kind.slots() > self.slot_count => {
                Err(Error::TooManySet)
            }
            None => Err(Error::TooManySet),
            Some(mf) if mf.match_kind != kind => Err(Error::MatchKindMismatch),
            Some(mf) if mf.bitwidth != bitwidth => Err(Error::BitwidthMismatch),
            Some(_) => Ok(()),
        };
        if let Err(e) = res {
            tracing::debug!(
                table_id = %self.table_id(),
                %kind,
                bitwidth,
                fields_set = self.fields_set,
                %e,
                "match field rejected"
            );
        }

        res
    }

    // Capacity was reserved for every slot at allocation, so this never
    // reallocates.
    fn push(&mut self, value: CompactValue, extra: Option<CompactValue>) {
        tracing::trace!(
            table_id = %self.table_id(),
            field = self.fields_set,
            %value,
            "match field set"
        );
        self.entries.push(value);
        self.entries.extend(extra);
        self.fields_set += 1;
    }
}

impl Emit for MatchKey<'_> {
    #[inline]
    fn packed_len(&self) -> usize {
        self.entries.iter().map(Emit::packed_len).sum()
    }

    fn emit_raw<V: ByteSliceMut>(&self, mut buf: V) -> usize {
        let mut emitted = 0;

        for el in &self.entries {
            emitted += el.emit_raw(&mut buf[emitted..]);
        }

        emitted
    }
}

// Safety: every byte is written from an entry; `buf` is never read.
unsafe impl EmitDoesNotRelyOnBufContents for MatchKey<'_> {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::netv;

    // f0: bit<7>, f1: bit<16>; t0 matches f0 lpm then f1 ternary.
    fn registry() -> P4Info {
        let mut p4info = P4Info::new();
        p4info.field_init(2).unwrap();
        p4info.action_init(0).unwrap();
        p4info.table_init(2).unwrap();
        p4info.field_add(P4Id::field(0), "f0", 7).unwrap();
        p4info.field_add(P4Id::field(1), "f1", 16).unwrap();

        let t0 = P4Id::table(0);
        p4info.table_add(t0, "t0", 2, 0).unwrap();
        p4info
            .table_add_match_field(t0, P4Id::field(0), "f0", MatchKind::Lpm, 7)
            .unwrap();
        p4info
            .table_add_match_field(
                t0,
                P4Id::field(1),
                "f1",
                MatchKind::Ternary,
                16,
            )
            .unwrap();

        p4info
    }

    #[test]
    fn allocate_sizes_slots() {
        let p4info = registry();
        let key = MatchKey::allocate(&p4info, P4Id::table(0)).unwrap();
        assert_eq!(key.slot_count(), 4);
        assert_eq!(key.nset(), 0);
        assert_eq!(
            key.next_field().map(|mf| mf.field_id),
            Some(P4Id::field(0))
        );

        assert_eq!(
            MatchKey::allocate(&p4info, P4Id::table(1)).err(),
            Some(Error::UnknownTable)
        );
        assert_eq!(
            MatchKey::allocate(&p4info, P4Id::field(0)).err(),
            Some(Error::IdentifierKindMismatch)
        );
    }

    #[test]
    fn rejected_sets_leave_key_untouched() {
        let p4info = registry();
        let mut key = MatchKey::allocate(&p4info, P4Id::table(0)).unwrap();
        let f0 = netv::from_u8(&p4info, P4Id::field(0), 0x5b).unwrap();

        assert_eq!(key.set_exact(f0.clone()), Err(Error::MatchKindMismatch));
        assert_eq!(
            key.set_lpm(f0.clone(), 8),
            Err(Error::InvalidPrefixLength)
        );
        let wrong = CompactValue::from_u64(8, 1).unwrap();
        assert_eq!(key.set_lpm(wrong, 1), Err(Error::BitwidthMismatch));
        assert_eq!(key.nset(), 0);
        assert_eq!(key.fields_set(), 0);

        key.set_lpm(f0, 7).unwrap();
        assert_eq!(key.nset(), 2);
        assert_eq!(key.get(1).and_then(CompactValue::as_u64), Some(7));

        let v = netv::from_u16(&p4info, P4Id::field(1), 0x0800).unwrap();
        let narrow = CompactValue::from_u64(8, 0xff).unwrap();
        assert_eq!(
            key.set_ternary(v.clone(), narrow),
            Err(Error::BitwidthMismatch)
        );
        assert_eq!(key.nset(), 2);

        let m = netv::from_u16(&p4info, P4Id::field(1), 0xff00).unwrap();
        key.set_ternary(v.clone(), m.clone()).unwrap();
        assert!(key.is_complete());
        assert_eq!(key.next_field(), None);
        assert_eq!(key.set_ternary(v, m), Err(Error::TooManySet));
    }

    #[test]
    fn emits_entries_in_order() {
        let p4info = registry();
        let mut key = MatchKey::allocate(&p4info, P4Id::table(0)).unwrap();
        key.set_lpm(CompactValue::from_u64(7, 0x50).unwrap(), 3).unwrap();
        key.set_ternary(
            CompactValue::from_u64(16, 0x0800).unwrap(),
            CompactValue::from_u64(16, 0xffff).unwrap(),
        )
        .unwrap();

        assert_eq!(
            key.packed_len(),
            p4info.match_key_size(P4Id::table(0)).unwrap()
        );
        assert_eq!(
            key.to_vec(),
            [0x50, 0, 0, 0, 3, 0x08, 0x00, 0xff, 0xff]
        );
    }
}
