//! Builders for complete table entries of the [`l2_l3`] program.
//!
//! [`l2_l3`]: crate::programs::l2_l3

use crate::programs::{actions, fields, tables};
use core::{
    net::{Ipv4Addr, Ipv6Addr},
    ops::RangeInclusive,
};
use macaddr::MacAddr6;
use picodec::{
    netv, ActionData, Emit, EmitDoesNotRelyOnBufContents, Error, MatchKey,
    P4Id, P4Info, Result,
};
use zerocopy::ByteSliceMut;

/// A match key paired with the action to run on a hit.
///
/// Emits as the packed key immediately followed by the packed arguments.
#[derive(Clone, Debug)]
pub struct TableEntry<'p> {
    pub key: MatchKey<'p>,
    pub action: ActionData<'p>,
    pub priority: Option<u32>,
}

impl<'p> TableEntry<'p> {
    fn new(
        p4info: &'p P4Info,
        table_id: P4Id,
        action_id: P4Id,
    ) -> Result<Self> {
        if !p4info.table_is_action_of(table_id, action_id)? {
            return Err(Error::UnknownAction);
        }

        Ok(Self {
            key: MatchKey::allocate(p4info, table_id)?,
            action: ActionData::allocate(p4info, action_id)?,
            priority: None,
        })
    }

    /// Whether both halves are fully populated, and a priority is present
    /// where the table needs one.
    pub fn is_complete(&self, p4info: &P4Info) -> Result<bool> {
        let table = p4info.table(self.key.table_id())?;

        Ok(self.key.is_complete()
            && self.action.is_complete()
            && (self.priority.is_some() || !table.requires_priority()))
    }
}

impl Emit for TableEntry<'_> {
    #[inline]
    fn packed_len(&self) -> usize {
        self.key.packed_len() + self.action.packed_len()
    }

    fn emit_raw<V: ByteSliceMut>(&self, mut buf: V) -> usize {
        let n = self.key.emit_raw(&mut buf[..]);
        n + self.action.emit_raw(&mut buf[n..])
    }
}

// Safety: the key and arguments together cover every byte.
unsafe impl EmitDoesNotRelyOnBufContents for TableEntry<'_> {}

/// Routes `dst` to next hop `nhop` out of `port`.
pub fn ipv4_route(
    p4info: &P4Info,
    dst: Ipv4Addr,
    prefix_len: u32,
    nhop: Ipv4Addr,
    port: u16,
) -> Result<TableEntry<'_>> {
    let mut entry =
        TableEntry::new(p4info, tables::IPV4_LPM, actions::SET_NHOP)?;
    entry
        .key
        .set_lpm(netv::from_ipv4(p4info, fields::IPV4_DST, dst)?, prefix_len)?;
    set_nhop(p4info, &mut entry.action, nhop, port)?;

    Ok(entry)
}

/// Routes exactly `dst` to next hop `nhop` out of `port`.
pub fn ipv6_host(
    p4info: &P4Info,
    dst: Ipv6Addr,
    nhop: Ipv4Addr,
    port: u16,
) -> Result<TableEntry<'_>> {
    let mut entry =
        TableEntry::new(p4info, tables::IPV6_HOST, actions::SET_NHOP)?;
    entry.key.set_exact(netv::from_ipv6(p4info, fields::IPV6_DST, dst)?)?;
    set_nhop(p4info, &mut entry.action, nhop, port)?;

    Ok(entry)
}

fn set_nhop(
    p4info: &P4Info,
    adata: &mut ActionData<'_>,
    nhop: Ipv4Addr,
    port: u16,
) -> Result<()> {
    adata.set_arg(netv::from_ipv4(p4info, actions::SET_NHOP_NHOP, nhop)?)?;
    adata.set_arg(netv::from_u16(p4info, actions::SET_NHOP_PORT, port)?)
}

/// Drops packets whose protocol matches `protocol` under `mask`, and
/// whose TCP destination port lies in `dports`.
pub fn acl_drop(
    p4info: &P4Info,
    protocol: u8,
    mask: u8,
    dports: RangeInclusive<u16>,
    priority: u32,
) -> Result<TableEntry<'_>> {
    let mut entry = TableEntry::new(p4info, tables::ACL, actions::DROP)?;
    entry.key.set_ternary(
        netv::from_u8(p4info, fields::IPV4_PROTOCOL, protocol)?,
        netv::from_u8(p4info, fields::IPV4_PROTOCOL, mask)?,
    )?;
    entry.key.set_range(
        netv::from_u16(p4info, fields::TCP_DPORT, *dports.start())?,
        netv::from_u16(p4info, fields::TCP_DPORT, *dports.end())?,
    )?;
    entry.priority = Some(priority);

    Ok(entry)
}

/// Rewrites the destination MAC of frames addressed to `dst`.
pub fn dmac_rewrite(
    p4info: &P4Info,
    dst: MacAddr6,
    dmac: MacAddr6,
) -> Result<TableEntry<'_>> {
    let mut entry = TableEntry::new(p4info, tables::DMAC, actions::SET_DMAC)?;
    entry.key.set_exact(netv::from_mac(p4info, fields::ETH_DST, dst)?)?;
    entry
        .action
        .set_arg(netv::from_mac(p4info, actions::SET_DMAC_DMAC, dmac)?)?;

    Ok(entry)
}
