//! Patches: active-region views over a grid.
//!
//! A patch designates the subset of grid units currently participating in
//! computation. It holds per-unit-type lists of [`UnitHandle`]s into the
//! owning grid. The grid invalidates every up-to-date patch whenever unit
//! storage is mutated; an invalidated patch is **locked** and must have
//! its references rebuilt (and be re-validated) before it is used again.
//!
//! Membership mutation goes through the owning [`Grid`](crate::Grid)
//! (`include_unit` / `exclude_unit`), which keeps the unit's activation
//! state and patch bookkeeping in step with the handle lists.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use ebb_core::PatchId;

use crate::error::MeshError;
use crate::handle::UnitHandle;
use crate::unit::GridUnit;

/// Framework-managed state embedded in every patch type.
///
/// Concrete patch types embed a `PatchCore` and expose it through
/// [`GridPatch`]; the grid constructs them via `Default` when
/// [`add_patch`](crate::Grid::add_patch) is called.
#[derive(Default)]
pub struct PatchCore {
    id: Option<PatchId>,
    up_to_date: bool,
    locked: bool,
    /// Per-unit-type handle lists, keyed by the unit type.
    units: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl fmt::Debug for PatchCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchCore")
            .field("id", &self.id)
            .field("up_to_date", &self.up_to_date)
            .field("locked", &self.locked)
            .field("unit_types", &self.units.len())
            .finish()
    }
}

impl PatchCore {
    /// Create an empty, unassigned patch core.
    pub fn new() -> Self {
        Self::default()
    }

    /// The patch's id, once the grid has assigned one.
    pub fn id(&self) -> Option<PatchId> {
        self.id
    }

    /// Whether the patch's references are current.
    pub fn is_up_to_date(&self) -> bool {
        self.up_to_date
    }

    /// Whether the patch is locked pending a reference rebuild.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The handles of all type-`U` units in this patch, in patch order.
    pub fn handles<U: GridUnit>(&self) -> &[UnitHandle<U>] {
        self.units
            .get(&TypeId::of::<U>())
            .and_then(|list| list.downcast_ref::<Vec<UnitHandle<U>>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of type-`U` units in this patch.
    pub fn n_units<U: GridUnit>(&self) -> usize {
        self.handles::<U>().len()
    }

    pub(crate) fn assign_id(&mut self, id: PatchId) -> Result<(), MeshError> {
        if let Some(existing) = self.id {
            return Err(MeshError::PatchIdAssigned { id: existing });
        }
        self.id = Some(id);
        Ok(())
    }

    /// Called by the grid whenever unit storage is mutated.
    pub(crate) fn invalidate(&mut self) {
        self.up_to_date = false;
        self.locked = true;
    }

    /// Called once the model has rebuilt the patch's references.
    pub(crate) fn validate(&mut self) {
        self.up_to_date = true;
        self.locked = false;
    }

    pub(crate) fn push_handle<U: GridUnit>(&mut self, handle: UnitHandle<U>) {
        self.units
            .entry(TypeId::of::<U>())
            .or_insert_with(|| Box::new(Vec::<UnitHandle<U>>::new()))
            .downcast_mut::<Vec<UnitHandle<U>>>()
            .expect("patch handle list has wrong type")
            .push(handle);
    }

    pub(crate) fn remove_handle_at<U: GridUnit>(
        &mut self,
        index: usize,
    ) -> Option<UnitHandle<U>> {
        let list = self
            .units
            .get_mut(&TypeId::of::<U>())?
            .downcast_mut::<Vec<UnitHandle<U>>>()?;
        if index >= list.len() {
            return None;
        }
        Some(list.remove(index))
    }
}

/// Implemented by every concrete patch type stored in a grid.
///
/// `Default` is required so the grid can construct patches in
/// [`add_patch`](crate::Grid::add_patch), mirroring how unit types embed
/// [`UnitCore`](crate::UnitCore).
pub trait GridPatch: Default + Send + 'static {
    /// Borrow the framework-managed core state.
    fn core(&self) -> &PatchCore;

    /// Mutably borrow the framework-managed core state.
    fn core_mut(&mut self) -> &mut PatchCore;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitCore;

    #[derive(Clone, Debug)]
    struct Cell {
        core: UnitCore,
    }

    impl GridUnit for Cell {
        fn core(&self) -> &UnitCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut UnitCore {
            &mut self.core
        }
    }

    #[test]
    fn fresh_patch_is_neither_current_nor_locked() {
        let core = PatchCore::new();
        assert!(!core.is_up_to_date());
        assert!(!core.is_locked());
        assert_eq!(core.id(), None);
        assert!(core.handles::<Cell>().is_empty());
    }

    #[test]
    fn invalidate_locks_until_validate() {
        let mut core = PatchCore::new();
        core.validate();
        assert!(core.is_up_to_date());
        core.invalidate();
        assert!(!core.is_up_to_date());
        assert!(core.is_locked());
        core.validate();
        assert!(core.is_up_to_date());
        assert!(!core.is_locked());
    }

    #[test]
    fn id_can_be_assigned_once() {
        let mut core = PatchCore::new();
        core.assign_id(PatchId(0)).unwrap();
        assert_eq!(core.id(), Some(PatchId(0)));
        assert_eq!(
            core.assign_id(PatchId(1)).unwrap_err(),
            MeshError::PatchIdAssigned { id: PatchId(0) }
        );
    }

    #[test]
    fn handle_lists_are_per_unit_type() {
        let mut core = PatchCore::new();
        let h: UnitHandle<Cell> = UnitHandle::new(0, 0);
        core.push_handle(h);
        assert_eq!(core.n_units::<Cell>(), 1);
        assert_eq!(core.handles::<Cell>()[0], h);

        let removed = core.remove_handle_at::<Cell>(0);
        assert_eq!(removed, Some(h));
        assert_eq!(core.n_units::<Cell>(), 0);
        assert_eq!(core.remove_handle_at::<Cell>(0), None);
    }
}
