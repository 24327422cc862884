// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{index_of, P4Info, Slots};
use alloc::{string::String, vec::Vec};
use core::fmt;
use itertools::Itertools;
use picodec_types::{
    bytes_for,
    id::{MAX_PARAM_INDEX, MAX_PARENT_INDEX},
    Error, Object, ObjectKind, P4Id, Result,
};

/// One parameter of an action.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamInfo {
    pub id: P4Id,
    pub name: String,
    pub bitwidth: usize,
}

impl fmt::Display for ParamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: bit<{}>", self.name, self.bitwidth)
    }
}

/// An action and its ordered parameter list.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionInfo {
    id: P4Id,
    name: String,
    // One slot per declared parameter, addressed by parameter index.
    params: Vec<Option<ParamInfo>>,
}

impl ActionInfo {
    #[inline]
    pub fn id(&self) -> P4Id {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of parameters declared when the action was added.
    #[inline]
    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    /// The parameter declared at position `index`, if it has been added.
    #[inline]
    pub fn param_at(&self, index: usize) -> Option<&ParamInfo> {
        self.params.get(index).and_then(Option::as_ref)
    }

    /// Populated parameters, in declaration order.
    #[inline]
    pub fn params(&self) -> impl Iterator<Item = &ParamInfo> {
        self.params.iter().flatten()
    }

    /// Whether every declared parameter has been added.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.params.iter().all(Option::is_some)
    }
}

impl fmt::Display for ActionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.params().join(", "))
    }
}

impl P4Info {
    /// Reserves room for exactly `count` actions, discarding any present.
    pub fn action_init(&mut self, count: usize) -> Result<()> {
        self.actions = Slots::with_capacity(count)?;
        tracing::debug!(count, "action storage initialised");

        Ok(())
    }

    /// Adds action `id` with room for `num_params` parameters.
    ///
    /// Parameter identifiers carry only 16 bits of their action's index, so
    /// an action above [`MAX_PARENT_INDEX`] may not declare parameters.
    pub fn action_add(
        &mut self,
        id: P4Id,
        name: &str,
        num_params: usize,
    ) -> Result<()> {
        let index = index_of(id, ObjectKind::Action)?;
        if num_params > MAX_PARAM_INDEX as usize + 1
            || (num_params > 0 && index > MAX_PARENT_INDEX)
        {
            return Err(Error::IndexOutOfRange);
        }

        let mut params = Vec::new();
        params
            .try_reserve_exact(num_params)
            .map_err(|_| Error::AllocationFailure)?;
        params.resize_with(num_params, || None);

        let info = ActionInfo { id, name: name.into(), params };
        self.actions.insert(index, info)?;
        tracing::trace!(%id, name, num_params, "action added");

        Ok(())
    }

    /// Adds parameter `param_id` to `action_id`.
    ///
    /// `param_id` must have been made from `action_id`.
    pub fn action_add_param(
        &mut self,
        action_id: P4Id,
        param_id: P4Id,
        name: &str,
        bitwidth: usize,
    ) -> Result<()> {
        let index = index_of(action_id, ObjectKind::Action)?;
        let Object::ActionParam { action, param } =
            param_id.decode_as(ObjectKind::ActionParam)?
        else {
            return Err(Error::IdentifierKindMismatch);
        };
        if action != index {
            return Err(Error::UnknownAction);
        }
        if bitwidth == 0 {
            return Err(Error::InvalidBitwidth);
        }

        let info = self.actions.get_mut(index).ok_or(Error::UnknownAction)?;
        let slot = info
            .params
            .get_mut(param as usize)
            .ok_or(Error::IndexOutOfRange)?;
        if slot.is_some() {
            return Err(Error::DuplicateId);
        }
        *slot = Some(ParamInfo { id: param_id, name: name.into(), bitwidth });
        tracing::trace!(%action_id, %param_id, name, bitwidth, "param added");

        Ok(())
    }

    /// Releases all action storage.
    pub fn action_free(&mut self) {
        self.actions = Slots::default();
    }

    pub fn action(&self, id: P4Id) -> Result<&ActionInfo> {
        self.lookup_action(id, Error::UnknownId)
    }

    pub(crate) fn lookup_action(
        &self,
        id: P4Id,
        missing: Error,
    ) -> Result<&ActionInfo> {
        let index = index_of(id, ObjectKind::Action)?;
        self.actions.get(index).ok_or(missing)
    }

    /// Resolves an action parameter through its owning action.
    pub fn param(&self, id: P4Id) -> Result<&ParamInfo> {
        let Object::ActionParam { action, param } =
            id.decode_as(ObjectKind::ActionParam)?
        else {
            return Err(Error::IdentifierKindMismatch);
        };

        self.actions
            .get(action)
            .and_then(|a| a.param_at(param as usize))
            .ok_or(Error::UnknownId)
    }

    /// Parameters of `id`, in declaration order.
    pub fn params_of(
        &self,
        id: P4Id,
    ) -> Result<impl Iterator<Item = &ParamInfo>> {
        Ok(self.action(id)?.params())
    }

    pub fn action_id_from_name(&self, name: &str) -> Option<P4Id> {
        self.actions.iter().find(|a| a.name == name).map(|a| a.id)
    }

    pub fn param_id_from_name(
        &self,
        action: P4Id,
        name: &str,
    ) -> Option<P4Id> {
        self.action(action)
            .ok()?
            .params()
            .find(|p| p.name == name)
            .map(|p| p.id)
    }

    /// Number of populated actions.
    pub fn num_actions(&self) -> usize {
        self.actions.iter().count()
    }

    /// Populated actions, in index order.
    pub fn actions(&self) -> impl Iterator<Item = &ActionInfo> {
        self.actions.iter()
    }

    /// Size in bytes of the packed argument list for `id`.
    pub fn action_data_size(&self, id: P4Id) -> Result<usize> {
        let action = self.action(id)?;
        let mut size = 0;
        for i in 0..action.num_params() {
            let param = action.param_at(i).ok_or(Error::UnknownId)?;
            size += bytes_for(param.bitwidth);
        }

        Ok(size)
    }

    /// Byte offset of a parameter within its action's packed arguments.
    ///
    /// Every parameter before it must have been added.
    pub fn param_offset(&self, id: P4Id) -> Result<usize> {
        let Object::ActionParam { action, param } =
            id.decode_as(ObjectKind::ActionParam)?
        else {
            return Err(Error::IdentifierKindMismatch);
        };
        let action = self.actions.get(action).ok_or(Error::UnknownId)?;
        action.param_at(param as usize).ok_or(Error::UnknownId)?;

        let mut offset = 0;
        for i in 0..param as usize {
            let p = action.param_at(i).ok_or(Error::UnknownId)?;
            offset += bytes_for(p.bitwidth);
        }

        Ok(offset)
    }
}
