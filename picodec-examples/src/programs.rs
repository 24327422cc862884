//! Registry for a small L2/L3 forwarding program.

use picodec::{MatchKind, P4Id, P4Info, Result};

pub mod fields {
    use picodec::P4Id;

    pub const ETH_DST: P4Id = P4Id::field(0);
    pub const IPV4_DST: P4Id = P4Id::field(1);
    pub const IPV6_DST: P4Id = P4Id::field(2);
    pub const IPV4_PROTOCOL: P4Id = P4Id::field(3);
    pub const TCP_DPORT: P4Id = P4Id::field(4);
}

pub mod actions {
    use picodec::P4Id;

    pub const SET_NHOP: P4Id = P4Id::action(0);
    pub const DROP: P4Id = P4Id::action(1);
    pub const SET_DMAC: P4Id = P4Id::action(2);

    pub const SET_NHOP_NHOP: P4Id = P4Id::action_param(SET_NHOP, 0);
    pub const SET_NHOP_PORT: P4Id = P4Id::action_param(SET_NHOP, 1);
    pub const SET_DMAC_DMAC: P4Id = P4Id::action_param(SET_DMAC, 0);
}

pub mod tables {
    use picodec::P4Id;

    pub const IPV4_LPM: P4Id = P4Id::table(0);
    pub const IPV6_HOST: P4Id = P4Id::table(1);
    pub const ACL: P4Id = P4Id::table(2);
    pub const DMAC: P4Id = P4Id::table(3);
}

const FIELDS: &[(P4Id, &str, usize)] = &[
    (fields::ETH_DST, "ethernet.dst_addr", 48),
    (fields::IPV4_DST, "ipv4.dst_addr", 32),
    (fields::IPV6_DST, "ipv6.dst_addr", 128),
    (fields::IPV4_PROTOCOL, "ipv4.protocol", 8),
    (fields::TCP_DPORT, "tcp.dst_port", 16),
];

type TableDef =
    (P4Id, &'static str, &'static [(P4Id, MatchKind)], &'static [P4Id]);

const TABLES: &[TableDef] = &[
    (
        tables::IPV4_LPM,
        "ipv4_lpm",
        &[(fields::IPV4_DST, MatchKind::Lpm)],
        &[actions::SET_NHOP, actions::DROP],
    ),
    (
        tables::IPV6_HOST,
        "ipv6_host",
        &[(fields::IPV6_DST, MatchKind::Exact)],
        &[actions::SET_NHOP, actions::DROP],
    ),
    (
        tables::ACL,
        "acl",
        &[
            (fields::IPV4_PROTOCOL, MatchKind::Ternary),
            (fields::TCP_DPORT, MatchKind::Range),
        ],
        &[actions::DROP],
    ),
    (
        tables::DMAC,
        "dmac",
        &[(fields::ETH_DST, MatchKind::Exact)],
        &[actions::SET_DMAC, actions::DROP],
    ),
];

/// Builds the program's registry.
pub fn l2_l3() -> Result<P4Info> {
    let mut p4info = P4Info::new();

    p4info.field_init(FIELDS.len())?;
    for &(id, name, bitwidth) in FIELDS {
        p4info.field_add(id, name, bitwidth)?;
    }

    p4info.action_init(3)?;
    p4info.action_add(actions::SET_NHOP, "set_nhop", 2)?;
    p4info.action_add_param(
        actions::SET_NHOP,
        actions::SET_NHOP_NHOP,
        "nhop",
        32,
    )?;
    p4info.action_add_param(
        actions::SET_NHOP,
        actions::SET_NHOP_PORT,
        "port",
        9,
    )?;
    p4info.action_add(actions::DROP, "drop", 0)?;
    p4info.action_add(actions::SET_DMAC, "set_dmac", 1)?;
    p4info.action_add_param(
        actions::SET_DMAC,
        actions::SET_DMAC_DMAC,
        "dmac",
        48,
    )?;

    p4info.table_init(TABLES.len())?;
    for &(id, name, match_fields, table_actions) in TABLES {
        p4info.table_add(id, name, match_fields.len(), table_actions.len())?;
        for &(field_id, kind) in match_fields {
            let field = p4info.field(field_id)?;
            let (name, bitwidth) = (field.name.clone(), field.bitwidth);
            p4info.table_add_match_field(id, field_id, &name, kind, bitwidth)?;
        }
        for &action_id in table_actions {
            p4info.table_add_action(id, action_id)?;
        }
    }

    Ok(p4info)
}
