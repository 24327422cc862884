// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of host values into the compact big-endian encoding of a
//! field or action parameter.
//!
//! The target's bitwidth is looked up in the registry, which is only read.
//! Integer inputs keep their low `bitwidth` bits; buffer inputs must
//! already be canonical.

use crate::p4info::P4Info;
use core::net::{Ipv4Addr, Ipv6Addr};
use macaddr::MacAddr6;
use picodec_types::{CompactValue, Error, P4Id, Result};

/// Treatment of set bits above the declared bitwidth in buffer inputs.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PaddingPolicy {
    /// Fail with [`Error::MalformedValue`].
    #[default]
    Reject,
    /// Clear them.
    Mask,
}

fn check_host_width(id: P4Id, bitwidth: usize, host_bits: usize) -> Result<()> {
    if bitwidth > host_bits {
        tracing::debug!(%id, bitwidth, host_bits, "host type too narrow");
        return Err(Error::BitwidthExceeded);
    }

    Ok(())
}

#[inline]
fn from_uint(
    p4info: &P4Info,
    id: P4Id,
    v: u64,
    host_bits: usize,
) -> Result<CompactValue> {
    let bitwidth = p4info.bitwidth_of(id)?;
    check_host_width(id, bitwidth, host_bits)?;

    CompactValue::from_u64(bitwidth, v)
}

pub fn from_u8(p4info: &P4Info, id: P4Id, v: u8) -> Result<CompactValue> {
    from_uint(p4info, id, v.into(), u8::BITS as usize)
}

pub fn from_u16(p4info: &P4Info, id: P4Id, v: u16) -> Result<CompactValue> {
    from_uint(p4info, id, v.into(), u16::BITS as usize)
}

pub fn from_u32(p4info: &P4Info, id: P4Id, v: u32) -> Result<CompactValue> {
    from_uint(p4info, id, v.into(), u32::BITS as usize)
}

pub fn from_u64(p4info: &P4Info, id: P4Id, v: u64) -> Result<CompactValue> {
    from_uint(p4info, id, v, u64::BITS as usize)
}

pub fn from_u128(p4info: &P4Info, id: P4Id, v: u128) -> Result<CompactValue> {
    let bitwidth = p4info.bitwidth_of(id)?;
    check_host_width(id, bitwidth, u128::BITS as usize)?;

    CompactValue::from_u128(bitwidth, v)
}

/// Copies a canonical big-endian buffer, rejecting padding bits.
pub fn from_bytes(
    p4info: &P4Info,
    id: P4Id,
    bytes: &[u8],
) -> Result<CompactValue> {
    from_bytes_with(p4info, id, bytes, PaddingPolicy::Reject)
}

pub fn from_bytes_with(
    p4info: &P4Info,
    id: P4Id,
    bytes: &[u8],
    padding: PaddingPolicy,
) -> Result<CompactValue> {
    let bitwidth = p4info.bitwidth_of(id)?;
    let out = match padding {
        PaddingPolicy::Reject => CompactValue::from_be_slice(bitwidth, bytes),
        PaddingPolicy::Mask => {
            CompactValue::from_be_slice_masked(bitwidth, bytes)
        }
    };
    if let Err(e) = out {
        let len = bytes.len();
        tracing::debug!(%id, bitwidth, len, %e, "buffer rejected");
    }

    out
}

pub fn from_mac(
    p4info: &P4Info,
    id: P4Id,
    mac: MacAddr6,
) -> Result<CompactValue> {
    from_bytes(p4info, id, mac.as_bytes())
}

pub fn from_ipv4(
    p4info: &P4Info,
    id: P4Id,
    addr: Ipv4Addr,
) -> Result<CompactValue> {
    from_bytes(p4info, id, &addr.octets())
}

pub fn from_ipv6(
    p4info: &P4Info,
    id: P4Id,
    addr: Ipv6Addr,
) -> Result<CompactValue> {
    from_bytes(p4info, id, &addr.octets())
}

#[cfg(test)]
mod test {
    use super::*;
    use picodec_types::StorageClass;

    fn registry() -> P4Info {
        let mut p4info = P4Info::new();
        p4info.field_init(5).unwrap();
        p4info.action_init(1).unwrap();
        p4info.field_add(P4Id::field(0), "vid", 12).unwrap();
        p4info.field_add(P4Id::field(1), "eth.dst", 48).unwrap();
        p4info.field_add(P4Id::field(2), "ipv4.dst", 32).unwrap();
        p4info.field_add(P4Id::field(3), "ipv6.dst", 128).unwrap();
        p4info.field_add(P4Id::field(4), "blob", 200).unwrap();

        let a0 = P4Id::action(0);
        p4info.action_add(a0, "set_port", 1).unwrap();
        p4info
            .action_add_param(a0, P4Id::action_param(a0, 0), "port", 9)
            .unwrap();

        p4info
    }

    #[test]
    fn integers_truncate_to_bitwidth() {
        let p4info = registry();
        let vid = P4Id::field(0);

        let v = from_u16(&p4info, vid, 0xfabc).unwrap();
        assert_eq!(v.as_bytes(), [0x0a, 0xbc]);
        assert_eq!(v.as_u64(), Some(0xabc));

        let v = from_u32(&p4info, vid, 0x1234_5678).unwrap();
        assert_eq!(v.as_bytes(), [0x06, 0x78]);

        let port = P4Id::action_param(P4Id::action(0), 0);
        let v = from_u16(&p4info, port, 0x1ff).unwrap();
        assert_eq!(v.as_bytes(), [0x01, 0xff]);
    }

    #[test]
    fn host_type_too_narrow() {
        let p4info = registry();

        assert_eq!(
            from_u8(&p4info, P4Id::field(0), 0xff),
            Err(Error::BitwidthExceeded)
        );
        assert_eq!(
            from_u64(&p4info, P4Id::field(3), 1),
            Err(Error::BitwidthExceeded)
        );
        assert_eq!(
            from_u128(&p4info, P4Id::field(4), 1),
            Err(Error::BitwidthExceeded)
        );
        let v = from_u128(&p4info, P4Id::field(3), u128::MAX).unwrap();
        assert_eq!(v.storage_class(), StorageClass::Wide);
        assert_eq!(v.as_u128(), Some(u128::MAX));
    }

    #[test]
    fn target_must_be_field_or_param() {
        let p4info = registry();

        assert_eq!(
            from_u8(&p4info, P4Id::table(0), 1),
            Err(Error::IdentifierKindMismatch)
        );
        assert_eq!(
            from_u8(&p4info, P4Id::action(0), 1),
            Err(Error::IdentifierKindMismatch)
        );
        assert_eq!(from_u8(&p4info, P4Id::field(9), 1), Err(Error::UnknownId));
    }

    #[test]
    fn buffers_and_padding() {
        let p4info = registry();
        let vid = P4Id::field(0);

        let v = from_bytes(&p4info, vid, &[0x0f, 0xff]).unwrap();
        assert_eq!(v.as_u64(), Some(0xfff));
        assert_eq!(
            from_bytes(&p4info, vid, &[0x1f, 0xff]),
            Err(Error::MalformedValue)
        );
        assert_eq!(
            from_bytes(&p4info, vid, &[0x0f]),
            Err(Error::LengthMismatch)
        );

        let v =
            from_bytes_with(&p4info, vid, &[0xff, 0xff], PaddingPolicy::Mask)
                .unwrap();
        assert_eq!(v.as_bytes(), [0x0f, 0xff]);

        let blob = [0xa5; 25];
        let v = from_bytes(&p4info, P4Id::field(4), &blob).unwrap();
        assert_eq!(v.storage_class(), StorageClass::Extended);
        assert_eq!(v.as_bytes(), blob);
    }

    #[test]
    fn addresses() {
        let p4info = registry();

        let mac = MacAddr6::new(0x02, 0x08, 0x20, 0xaa, 0xbb, 0xcc);
        let v = from_mac(&p4info, P4Id::field(1), mac).unwrap();
        assert_eq!(v.as_u64(), Some(0x0208_20aa_bbcc));

        let v = from_ipv4(&p4info, P4Id::field(2), Ipv4Addr::new(10, 0, 0, 1))
            .unwrap();
        assert_eq!(v.as_bytes(), [10, 0, 0, 1]);

        let v =
            from_ipv6(&p4info, P4Id::field(3), Ipv6Addr::LOCALHOST).unwrap();
        assert_eq!(v.as_u128(), Some(1));

        assert_eq!(
            from_ipv4(&p4info, P4Id::field(1), Ipv4Addr::LOCALHOST),
            Err(Error::LengthMismatch)
        );
    }
}
