// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The P4Info registry: fields, actions and tables of one program.
//!
//! A registry is populated once, class by class, by declaring a capacity
//! (`*_init`) and then filling slots by identifier (`*_add*`). After that
//! it is only read. Codec objects borrow it, so the compiler rejects any
//! attempt to mutate or free it while a [`MatchKey`] or [`ActionData`] is
//! still alive.
//!
//! [`MatchKey`]: crate::match_key::MatchKey
//! [`ActionData`]: crate::action_data::ActionData

mod actions;
mod fields;
mod tables;

pub use actions::{ActionInfo, ParamInfo};
pub use fields::FieldInfo;
pub use tables::{MatchFieldInfo, TableInfo};

use alloc::vec::Vec;
use picodec_types::{Error, Object, ObjectKind, P4Id, Result};

/// Metadata for one program's fields, actions and tables.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct P4Info {
    fields: Slots<FieldInfo>,
    actions: Slots<ActionInfo>,
    tables: Slots<TableInfo>,
}

impl P4Info {
    /// An empty registry. Every class must be `*_init`ed before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bitwidth of a field or action parameter.
    pub fn bitwidth_of(&self, id: P4Id) -> Result<usize> {
        match id.decode()? {
            Object::Field(_) => Ok(self.field(id)?.bitwidth),
            Object::ActionParam { .. } => Ok(self.param(id)?.bitwidth),
            _ => Err(Error::IdentifierKindMismatch),
        }
    }

    /// Name of any object in the registry.
    pub fn name_of(&self, id: P4Id) -> Result<&str> {
        Ok(match id.decode()? {
            Object::Field(_) => self.field(id)?.name.as_str(),
            Object::Action(_) => self.action(id)?.name(),
            Object::Table(_) => self.table(id)?.name(),
            Object::ActionParam { .. } => self.param(id)?.name.as_str(),
        })
    }
}

/// Index of `id`, which must be of kind `kind`.
#[inline]
fn index_of(id: P4Id, kind: ObjectKind) -> Result<u32> {
    id.decode_as(kind).map(|o| o.index())
}

/// Fixed-capacity, index-addressed storage for one object class.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
struct Slots<T> {
    inner: Vec<Option<T>>,
}

// Thanks to rustc's excellent Default generic detection...
impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self { inner: Vec::new() }
    }
}

impl<T> Slots<T> {
    fn with_capacity(count: usize) -> Result<Self> {
        let mut inner = Vec::new();
        inner.try_reserve_exact(count).map_err(|_| Error::AllocationFailure)?;
        inner.resize_with(count, || None);

        Ok(Self { inner })
    }

    #[inline]
    fn get(&self, index: u32) -> Option<&T> {
        self.inner.get(index as usize).and_then(Option::as_ref)
    }

    #[inline]
    fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.inner.get_mut(index as usize).and_then(Option::as_mut)
    }

    fn insert(&mut self, index: u32, val: T) -> Result<&mut T> {
        let slot = self
            .inner
            .get_mut(index as usize)
            .ok_or(Error::IndexOutOfRange)?;
        if slot.is_some() {
            return Err(Error::DuplicateId);
        }

        Ok(slot.insert(val))
    }

    /// Populated entries, in index order.
    #[inline]
    fn iter(&self) -> impl Iterator<Item = &T> {
        self.inner.iter().flatten()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use picodec_types::MatchKind;

    fn registry() -> P4Info {
        let mut p4info = P4Info::new();
        p4info.field_init(2).unwrap();
        p4info.action_init(1).unwrap();
        p4info.table_init(1).unwrap();

        let f0 = P4Id::field(0);
        let f1 = P4Id::field(1);
        p4info.field_add(f0, "hdr.eth.dst", 48).unwrap();
        p4info.field_add(f1, "hdr.ipv4.dst", 32).unwrap();

        let a0 = P4Id::action(0);
        p4info.action_add(a0, "set_port", 1).unwrap();
        p4info
            .action_add_param(a0, P4Id::action_param(a0, 0), "port", 9)
            .unwrap();

        let t0 = P4Id::table(0);
        p4info.table_add(t0, "fwd", 2, 1).unwrap();
        p4info
            .table_add_match_field(t0, f0, "hdr.eth.dst", MatchKind::Exact, 48)
            .unwrap();
        p4info
            .table_add_match_field(t0, f1, "hdr.ipv4.dst", MatchKind::Lpm, 32)
            .unwrap();
        p4info.table_add_action(t0, a0).unwrap();

        p4info
    }

    #[test]
    fn bitwidth_lookup_by_kind() {
        let p4info = registry();
        let a0 = P4Id::action(0);

        assert_eq!(p4info.bitwidth_of(P4Id::field(0)), Ok(48));
        assert_eq!(p4info.bitwidth_of(P4Id::action_param(a0, 0)), Ok(9));
        assert_eq!(
            p4info.bitwidth_of(P4Id::table(0)),
            Err(Error::IdentifierKindMismatch)
        );
        assert_eq!(p4info.bitwidth_of(P4Id::field(2)), Err(Error::UnknownId));
        assert_eq!(
            p4info.bitwidth_of(P4Id::action_param(a0, 1)),
            Err(Error::UnknownId)
        );
        assert_eq!(
            p4info.bitwidth_of(P4Id::action_param(P4Id::action(4), 0)),
            Err(Error::UnknownId)
        );
    }

    #[test]
    fn names() {
        let p4info = registry();
        assert_eq!(p4info.name_of(P4Id::table(0)), Ok("fwd"));
        assert_eq!(
            p4info.name_of(P4Id::action_param(P4Id::action(0), 0)),
            Ok("port")
        );
        assert_eq!(p4info.name_of(P4Id::from_raw(0)), Err(Error::UnknownId));
    }

    #[test]
    fn free_releases_class() {
        let mut p4info = registry();
        p4info.table_free();
        assert_eq!(p4info.num_tables(), 0);
        assert_eq!(p4info.table(P4Id::table(0)).err(), Some(Error::UnknownId));

        p4info.field_free();
        p4info.action_free();
        assert_eq!(p4info.num_fields(), 0);
        assert_eq!(p4info.num_actions(), 0);
    }

    #[test]
    fn slots_capacity_and_duplicates() {
        let mut slots = Slots::with_capacity(2).unwrap();
        assert!(slots.insert(1, 'b').is_ok());
        assert_eq!(slots.insert(1, 'c'), Err(Error::DuplicateId));
        assert_eq!(slots.insert(2, 'c'), Err(Error::IndexOutOfRange));
        assert_eq!(slots.get(0), None);
        assert_eq!(slots.iter().collect::<Vec<_>>(), [&'b']);
    }
}
