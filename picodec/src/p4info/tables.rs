// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{index_of, P4Info, Slots};
use crate::match_key::PREFIX_LEN_BYTES;
use alloc::{string::String, vec::Vec};
use core::fmt;
use itertools::Itertools;
use picodec_types::{
    bytes_for, Error, MatchKind, MatchKinds, ObjectKind, P4Id, Result,
};

/// A field a table matches on, and how.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchFieldInfo {
    pub field_id: P4Id,
    pub name: String,
    pub match_kind: MatchKind,
    pub bitwidth: usize,
}

impl MatchFieldInfo {
    /// Bytes this field occupies in a packed match key.
    #[inline]
    pub fn packed_len(&self) -> usize {
        let len = bytes_for(self.bitwidth);
        match self.match_kind {
            MatchKind::Exact => len,
            MatchKind::Lpm => len + PREFIX_LEN_BYTES,
            MatchKind::Ternary | MatchKind::Range => 2 * len,
        }
    }
}

impl fmt::Display for MatchFieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.match_kind)
    }
}

/// A match-action table.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableInfo {
    id: P4Id,
    name: String,
    num_match_fields: usize,
    match_fields: Vec<MatchFieldInfo>,
    num_actions: usize,
    actions: Vec<P4Id>,
    match_kinds: MatchKinds,
}

impl TableInfo {
    #[inline]
    pub fn id(&self) -> P4Id {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of match fields declared when the table was added.
    #[inline]
    pub fn num_match_fields(&self) -> usize {
        self.num_match_fields
    }

    /// Match fields, in declaration order.
    #[inline]
    pub fn match_fields(&self) -> &[MatchFieldInfo] {
        &self.match_fields
    }

    /// Number of actions declared when the table was added.
    #[inline]
    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    #[inline]
    pub fn actions(&self) -> &[P4Id] {
        &self.actions
    }

    #[inline]
    pub fn match_kinds(&self) -> MatchKinds {
        self.match_kinds
    }

    #[inline]
    pub fn requires_priority(&self) -> bool {
        self.match_kinds.requires_priority()
    }

    /// Number of match key entries needed to hold one full key.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.match_fields.iter().map(|mf| mf.match_kind.slots()).sum()
    }

    /// Whether every declared match field has been added.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.match_fields.len() == self.num_match_fields
    }

    fn match_field_index(&self, field_id: P4Id) -> Option<usize> {
        self.match_fields.iter().position(|mf| mf.field_id == field_id)
    }
}

impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.match_fields.iter().join(", "))
    }
}

impl P4Info {
    /// Reserves room for exactly `count` tables, discarding any present.
    pub fn table_init(&mut self, count: usize) -> Result<()> {
        self.tables = Slots::with_capacity(count)?;
        tracing::debug!(count, "table storage initialised");

        Ok(())
    }

    pub fn table_add(
        &mut self,
        id: P4Id,
        name: &str,
        num_match_fields: usize,
        num_actions: usize,
    ) -> Result<()> {
        let index = index_of(id, ObjectKind::Table)?;

        let mut match_fields = Vec::new();
        match_fields
            .try_reserve_exact(num_match_fields)
            .map_err(|_| Error::AllocationFailure)?;
        let mut actions = Vec::new();
        actions
            .try_reserve_exact(num_actions)
            .map_err(|_| Error::AllocationFailure)?;

        let info = TableInfo {
            id,
            name: name.into(),
            num_match_fields,
            match_fields,
            num_actions,
            actions,
            match_kinds: MatchKinds::empty(),
        };
        self.tables.insert(index, info)?;
        tracing::trace!(
            %id,
            name,
            num_match_fields,
            num_actions,
            "table added"
        );

        Ok(())
    }

    /// Appends a match field to `table_id`.
    ///
    /// Match fields are kept in the order they are added, which is the
    /// order codecs expect them to be set in.
    pub fn table_add_match_field(
        &mut self,
        table_id: P4Id,
        field_id: P4Id,
        name: &str,
        match_kind: MatchKind,
        bitwidth: usize,
    ) -> Result<()> {
        let index = index_of(table_id, ObjectKind::Table)?;
        self.lookup_table(table_id, Error::UnknownTable)?;
        let field_width =
            self.lookup_field(field_id, Error::UnknownField)?.bitwidth;

        let table = self.tables.get_mut(index).ok_or(Error::UnknownTable)?;
        if table.match_fields.len() >= table.num_match_fields {
            return Err(Error::IndexOutOfRange);
        }
        if table.match_field_index(field_id).is_some() {
            return Err(Error::DuplicateId);
        }
        if bitwidth != field_width {
            return Err(Error::BitwidthMismatch);
        }

        table.match_fields.push(MatchFieldInfo {
            field_id,
            name: name.into(),
            match_kind,
            bitwidth,
        });
        table.match_kinds |= match_kind.flag();
        tracing::trace!(
            %table_id,
            %field_id,
            name,
            %match_kind,
            bitwidth,
            "match field added"
        );

        Ok(())
    }

    /// Permits `action_id` on `table_id`.
    pub fn table_add_action(
        &mut self,
        table_id: P4Id,
        action_id: P4Id,
    ) -> Result<()> {
        let index = index_of(table_id, ObjectKind::Table)?;
        self.lookup_table(table_id, Error::UnknownTable)?;
        self.lookup_action(action_id, Error::UnknownAction)?;

        let table = self.tables.get_mut(index).ok_or(Error::UnknownTable)?;
        if table.actions.len() >= table.num_actions {
            return Err(Error::IndexOutOfRange);
        }
        if table.actions.contains(&action_id) {
            return Err(Error::DuplicateId);
        }
        table.actions.push(action_id);
        tracing::trace!(%table_id, %action_id, "table action added");

        Ok(())
    }

    /// Releases all table storage.
    pub fn table_free(&mut self) {
        self.tables = Slots::default();
    }

    pub fn table(&self, id: P4Id) -> Result<&TableInfo> {
        self.lookup_table(id, Error::UnknownId)
    }

    pub(crate) fn lookup_table(
        &self,
        id: P4Id,
        missing: Error,
    ) -> Result<&TableInfo> {
        let index = index_of(id, ObjectKind::Table)?;
        self.tables.get(index).ok_or(missing)
    }

    /// Match fields of `table_id`, in declaration order.
    pub fn match_fields_of(&self, table_id: P4Id) -> Result<&[MatchFieldInfo]> {
        Ok(self.table(table_id)?.match_fields())
    }

    pub fn match_kind_of(
        &self,
        table_id: P4Id,
        field_id: P4Id,
    ) -> Result<MatchKind> {
        let i = self.match_field_index(table_id, field_id)?;
        Ok(self.table(table_id)?.match_fields[i].match_kind)
    }

    /// Position of `field_id` among `table_id`'s match fields.
    pub fn match_field_index(
        &self,
        table_id: P4Id,
        field_id: P4Id,
    ) -> Result<usize> {
        index_of(field_id, ObjectKind::Field)?;
        self.table(table_id)?
            .match_field_index(field_id)
            .ok_or(Error::UnknownId)
    }

    /// Actions permitted on `table_id`.
    pub fn actions_of(&self, table_id: P4Id) -> Result<&[P4Id]> {
        Ok(self.table(table_id)?.actions())
    }

    pub fn table_is_action_of(
        &self,
        table_id: P4Id,
        action_id: P4Id,
    ) -> Result<bool> {
        index_of(action_id, ObjectKind::Action)?;
        Ok(self.table(table_id)?.actions.contains(&action_id))
    }

    pub fn table_id_from_name(&self, name: &str) -> Option<P4Id> {
        self.tables.iter().find(|t| t.name == name).map(|t| t.id)
    }

    /// Number of populated tables.
    pub fn num_tables(&self) -> usize {
        self.tables.iter().count()
    }

    /// Populated tables, in index order.
    pub fn tables(&self) -> impl Iterator<Item = &TableInfo> {
        self.tables.iter()
    }

    /// Size in bytes of a packed, complete match key for `table_id`.
    pub fn match_key_size(&self, table_id: P4Id) -> Result<usize> {
        Ok(self
            .table(table_id)?
            .match_fields
            .iter()
            .map(MatchFieldInfo::packed_len)
            .sum())
    }

    /// Byte offset of `field_id`'s value within a packed match key.
    pub fn match_field_offset(
        &self,
        table_id: P4Id,
        field_id: P4Id,
    ) -> Result<usize> {
        let i = self.match_field_index(table_id, field_id)?;
        Ok(self.table(table_id)?.match_fields[..i]
            .iter()
            .map(MatchFieldInfo::packed_len)
            .sum())
    }
}
