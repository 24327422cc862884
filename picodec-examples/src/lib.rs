// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Example uses of the [`P4Info`] registry and its codecs: a small L2/L3
//! forwarding program, and builders for its table entries.
//!
//! [`P4Info`]: picodec::P4Info

pub mod entries;
pub mod programs;
