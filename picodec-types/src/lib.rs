// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types shared by the P4Info registry and its codecs: tagged
//! identifiers, compact values, match kinds and the error taxonomy.

#![no_std]

#[macro_use]
extern crate alloc;

pub mod compact;
mod emit;
pub mod error;
pub mod id;
mod match_kind;

pub use compact::{bytes_for, CompactValue, StorageClass};
pub use emit::*;
pub use error::*;
pub use id::{Object, ObjectKind, P4Id};
pub use match_kind::*;
