//! Encoding of table entries against P4Info program metadata.
//!
//! A [`P4Info`] registry describes a program's fields, actions and
//! tables. Against it, [`netv`] turns host values into [`CompactValue`]s,
//! which are then assembled, in declared order, into a [`MatchKey`] for
//! a table or [`ActionData`] for an action. Both emit a packed byte form
//! for downstream serialisers via [`Emit`].

#![no_std]

extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod action_data;
pub mod match_key;
pub mod netv;
pub mod p4info;

pub use action_data::ActionData;
pub use match_key::MatchKey;
pub use netv::PaddingPolicy;
pub use p4info::P4Info;
pub use picodec_types::{
    status_of, CompactValue, Emit, EmitDoesNotRelyOnBufContents, Error,
    MatchKind, MatchKinds, Object, ObjectKind, P4Id, Result, StorageClass,
    STATUS_SUCCESS,
};
