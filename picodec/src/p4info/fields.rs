// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{index_of, P4Info, Slots};
use alloc::string::String;
use core::fmt;
use picodec_types::{Error, ObjectKind, P4Id, Result};

/// A header or metadata field which tables may match on.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldInfo {
    pub id: P4Id,
    pub name: String,
    pub bitwidth: usize,
}

impl fmt::Display for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: bit<{}>", self.name, self.bitwidth)
    }
}

impl P4Info {
    /// Reserves room for exactly `count` fields, discarding any present.
    pub fn field_init(&mut self, count: usize) -> Result<()> {
        self.fields = Slots::with_capacity(count)?;
        tracing::debug!(count, "field storage initialised");

        Ok(())
    }

    pub fn field_add(
        &mut self,
        id: P4Id,
        name: &str,
        bitwidth: usize,
    ) -> Result<()> {
        let index = index_of(id, ObjectKind::Field)?;
        if bitwidth == 0 {
            return Err(Error::InvalidBitwidth);
        }

        let info = FieldInfo { id, name: name.into(), bitwidth };
        self.fields.insert(index, info)?;
        tracing::trace!(%id, name, bitwidth, "field added");

        Ok(())
    }

    /// Releases all field storage.
    pub fn field_free(&mut self) {
        self.fields = Slots::default();
    }

    pub fn field(&self, id: P4Id) -> Result<&FieldInfo> {
        self.lookup_field(id, Error::UnknownId)
    }

    pub(super) fn lookup_field(
        &self,
        id: P4Id,
        missing: Error,
    ) -> Result<&FieldInfo> {
        let index = index_of(id, ObjectKind::Field)?;
        self.fields.get(index).ok_or(missing)
    }

    pub fn field_id_from_name(&self, name: &str) -> Option<P4Id> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.id)
    }

    /// Number of populated fields.
    pub fn num_fields(&self) -> usize {
        self.fields.iter().count()
    }

    /// Populated fields, in index order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::{string::ToString, vec::Vec};

    #[test]
    fn population_errors() {
        let mut p4info = P4Info::new();
        assert_eq!(
            p4info.field_add(P4Id::field(0), "f0", 8),
            Err(Error::IndexOutOfRange)
        );

        p4info.field_init(2).unwrap();
        p4info.field_add(P4Id::field(0), "f0", 8).unwrap();
        assert_eq!(
            p4info.field_add(P4Id::field(0), "again", 8),
            Err(Error::DuplicateId)
        );
        assert_eq!(
            p4info.field_add(P4Id::field(2), "f2", 8),
            Err(Error::IndexOutOfRange)
        );
        assert_eq!(
            p4info.field_add(P4Id::table(1), "t1", 8),
            Err(Error::IdentifierKindMismatch)
        );
        assert_eq!(
            p4info.field_add(P4Id::field(1), "f1", 0),
            Err(Error::InvalidBitwidth)
        );
        assert_eq!(p4info.num_fields(), 1);
    }

    #[test]
    fn lookups() {
        let mut p4info = P4Info::new();
        p4info.field_init(3).unwrap();
        p4info.field_add(P4Id::field(2), "ipv4.dst", 32).unwrap();
        p4info.field_add(P4Id::field(0), "eth.type", 16).unwrap();

        assert_eq!(p4info.field_id_from_name("ipv4.dst"), Some(P4Id::field(2)));
        assert_eq!(p4info.field_id_from_name("ipv6.dst"), None);
        assert_eq!(p4info.field(P4Id::field(1)), Err(Error::UnknownId));

        let names: Vec<_> = p4info.fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["eth.type", "ipv4.dst"]);
        assert_eq!(
            p4info.field(P4Id::field(0)).unwrap().to_string(),
            "eth.type: bit<16>"
        );
    }
}
