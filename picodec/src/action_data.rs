// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The encoded arguments of one action invocation, filled in the
//! action's declared parameter order.

use crate::p4info::{ActionInfo, P4Info, ParamInfo};
use alloc::vec::Vec;
use picodec_types::{
    CompactValue, Emit, EmitDoesNotRelyOnBufContents, Error, P4Id, Result,
};
use zerocopy::ByteSliceMut;

#[derive(Clone, Debug)]
pub struct ActionData<'p> {
    action: &'p ActionInfo,
    args: Vec<CompactValue>,
}

impl<'p> ActionData<'p> {
    /// Sizes storage for one argument per declared parameter.
    #[tracing::instrument(level = "trace", skip(p4info))]
    pub fn allocate(p4info: &'p P4Info, action_id: P4Id) -> Result<Self> {
        let action = p4info.lookup_action(action_id, Error::UnknownAction)?;

        let mut args = Vec::new();
        args.try_reserve_exact(action.num_params())
            .map_err(|_| Error::AllocationFailure)?;

        Ok(Self { action, args })
    }

    /// Empties the argument list so it can be refilled.
    pub fn init(&mut self) {
        self.args.clear();
    }

    /// Releases the argument storage.
    #[inline]
    pub fn destroy(self) {}

    #[inline]
    pub fn action_id(&self) -> P4Id {
        self.action.id()
    }

    #[inline]
    pub fn nset(&self) -> usize {
        self.args.len()
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.action.num_params()
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.nset() == self.slot_count()
    }

    /// The parameter the next [`Self::set_arg`] call will fill, if it
    /// exists and has been added to the registry.
    #[inline]
    pub fn next_param(&self) -> Option<&'p ParamInfo> {
        self.action.param_at(self.nset())
    }

    #[inline]
    pub fn entries(&self) -> &[CompactValue] {
        &self.args
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&CompactValue> {
        self.args.get(index)
    }

    /// Appends the value of the next declared parameter.
    pub fn set_arg(&mut self, value: CompactValue) -> Result<()> {
        let res = if self.is_complete() {
            Err(Error::TooManySet)
        } else {
            match self.next_param() {
                None => Err(Error::UnknownId),
                Some(p) if p.bitwidth != value.bitwidth() => {
                    Err(Error::BitwidthMismatch)
                }
                Some(_) => Ok(()),
            }
        };
        if let Err(e) = res {
            tracing::debug!(
                action_id = %self.action_id(),
                param = self.nset(),
                bitwidth = value.bitwidth(),
                %e,
                "argument rejected"
            );
            return Err(e);
        }

        tracing::trace!(
            action_id = %self.action_id(),
            param = self.nset(),
            %value,
            "argument set"
        );
        self.args.push(value);

        Ok(())
    }
}

impl Emit for ActionData<'_> {
    #[inline]
    fn packed_len(&self) -> usize {
        self.args.iter().map(Emit::packed_len).sum()
    }

    fn emit_raw<V: ByteSliceMut>(&self, mut buf: V) -> usize {
        let mut emitted = 0;

        for el in &self.args {
            emitted += el.emit_raw(&mut buf[emitted..]);
        }

        emitted
    }
}

// Safety: every byte is written from an argument; `buf` is never read.
unsafe impl EmitDoesNotRelyOnBufContents for ActionData<'_> {}
