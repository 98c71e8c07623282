//! The grid: container and manager of discrete model data for one domain.
//!
//! A grid owns one [`UnitStore`] per unit type, type-erased behind the
//! unit's `TypeId` so a single grid can carry an arbitrary mix of unit
//! types, plus the patch collection and the patch id free list. Every
//! mutation of unit storage invalidates the up-to-date patches on the
//! grid, because their handle lists may no longer describe the active
//! region faithfully.

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, VecDeque};

use ebb_core::{PatchId, Timestep, UnitId};
use log::warn;

use crate::error::MeshError;
use crate::handle::UnitHandle;
use crate::patch::GridPatch;
use crate::store::UnitStore;
use crate::unit::GridUnit;

/// Type-erased access to a [`UnitStore`].
trait AnyStore: Send {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<U: GridUnit> AnyStore for UnitStore<U> {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn typed_store<U: GridUnit>(
    stores: &HashMap<TypeId, Box<dyn AnyStore>>,
) -> Result<&UnitStore<U>, MeshError> {
    stores
        .get(&TypeId::of::<U>())
        .and_then(|store| store.as_any().downcast_ref::<UnitStore<U>>())
        .ok_or(MeshError::UnknownUnitType {
            type_name: type_name::<U>(),
        })
}

fn typed_store_mut<U: GridUnit>(
    stores: &mut HashMap<TypeId, Box<dyn AnyStore>>,
) -> Result<&mut UnitStore<U>, MeshError> {
    stores
        .get_mut(&TypeId::of::<U>())
        .and_then(|store| store.as_any_mut().downcast_mut::<UnitStore<U>>())
        .ok_or(MeshError::UnknownUnitType {
            type_name: type_name::<U>(),
        })
}

fn patch_index<P: GridPatch>(patches: &[P], id: PatchId) -> Result<usize, MeshError> {
    patches
        .iter()
        .position(|p| p.core().id() == Some(id))
        .ok_or(MeshError::UnknownPatch { id })
}

/// Container of unit stores and patches for one domain's mesh.
///
/// `P` is the model's patch type. Unit types are registered implicitly:
/// the store for a type is created on first insertion.
pub struct Grid<P: GridPatch> {
    stores: HashMap<TypeId, Box<dyn AnyStore>>,
    patches: Vec<P>,
    /// Patch ids freed by removal, recycled on the next `add_patch`.
    vacant_patch_ids: VecDeque<u32>,
}

impl<P: GridPatch> Default for Grid<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: GridPatch> Grid<P> {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self {
            stores: HashMap::new(),
            patches: Vec::new(),
            vacant_patch_ids: VecDeque::new(),
        }
    }

    // ── Unit management ────────────────────────────────────────────

    /// Insert a unit, creating the store for its type if needed.
    ///
    /// Invalidates every up-to-date patch on this grid.
    pub fn insert_unit<U: GridUnit>(&mut self, unit: U) -> UnitHandle<U> {
        let store = self
            .stores
            .entry(TypeId::of::<U>())
            .or_insert_with(|| Box::new(UnitStore::<U>::new()))
            .as_any_mut()
            .downcast_mut::<UnitStore<U>>()
            .expect("unit store has wrong type");
        let handle = store.insert(unit);
        self.invalidate_patches();
        handle
    }

    /// Clone a unit of the parent grid into this grid and record the
    /// two-way position correspondence between the grids.
    ///
    /// Invalidates every up-to-date patch on this grid.
    pub fn copy_from_parent<U: GridUnit>(&mut self, parent_unit: &U) -> UnitHandle<U> {
        let store = self
            .stores
            .entry(TypeId::of::<U>())
            .or_insert_with(|| Box::new(UnitStore::<U>::new()))
            .as_any_mut()
            .downcast_mut::<UnitStore<U>>()
            .expect("unit store has wrong type");
        let handle = store.copy_from_parent(parent_unit);
        self.invalidate_patches();
        handle
    }

    /// Remove the unit a handle points at, returning it.
    ///
    /// Prefer deactivating units over removing them; removal shifts the
    /// positions of every following unit and invalidates every up-to-date
    /// patch on this grid.
    pub fn remove_unit<U: GridUnit>(&mut self, handle: UnitHandle<U>) -> Result<U, MeshError> {
        let store = typed_store_mut::<U>(&mut self.stores)?;
        let (id, pos) = {
            let unit = store.resolve(handle)?;
            (unit.core().id(), unit.core().pos())
        };
        warn!("removing unit {id} at position {pos}");
        let unit = store.remove(handle)?;
        self.invalidate_patches();
        Ok(unit)
    }

    /// Resolve a handle to the unit it points at.
    pub fn unit<U: GridUnit>(&self, handle: UnitHandle<U>) -> Result<&U, MeshError> {
        typed_store::<U>(&self.stores)?.resolve(handle)
    }

    /// Resolve a handle to a mutable unit reference.
    pub fn unit_mut<U: GridUnit>(&mut self, handle: UnitHandle<U>) -> Result<&mut U, MeshError> {
        typed_store_mut::<U>(&mut self.stores)?.resolve_mut(handle)
    }

    /// Whether a unit of type `U` with the given id exists.
    pub fn unit_exists<U: GridUnit>(&self, id: UnitId) -> bool {
        typed_store::<U>(&self.stores)
            .map(|store| store.contains_id(id))
            .unwrap_or(false)
    }

    /// Current sequence position of the type-`U` unit with the given id.
    pub fn pos_of<U: GridUnit>(&self, id: UnitId) -> Result<u32, MeshError> {
        typed_store::<U>(&self.stores)?
            .pos_of(id)
            .ok_or(MeshError::UnknownUnit { id })
    }

    /// Handle to the type-`U` unit at a sequence position.
    pub fn handle_at<U: GridUnit>(&self, pos: u32) -> Result<UnitHandle<U>, MeshError> {
        typed_store::<U>(&self.stores)?.handle_at(pos)
    }

    /// Whether the unit's recorded position matches the store's sequence.
    pub fn confirm_unit_position<U: GridUnit>(&self, unit: &U) -> bool {
        typed_store::<U>(&self.stores)
            .map(|store| store.confirm_position(unit))
            .unwrap_or(false)
    }

    /// Read access to the store for unit type `U`, if one exists.
    ///
    /// Mutation goes through the grid-level operations so that patch
    /// invalidation cannot be bypassed.
    pub fn store<U: GridUnit>(&self) -> Option<&UnitStore<U>> {
        typed_store::<U>(&self.stores).ok()
    }

    /// Number of type-`U` units in the grid.
    pub fn n_units<U: GridUnit>(&self) -> usize {
        self.store::<U>().map(UnitStore::len).unwrap_or(0)
    }

    // ── Patch management ───────────────────────────────────────────

    /// Add a patch, assigning it an id recycled from the free list when
    /// one is available.
    pub fn add_patch(&mut self) -> PatchId {
        let id = match self.vacant_patch_ids.pop_front() {
            Some(id) => PatchId(id),
            None => PatchId(self.patches.len() as u32),
        };
        let mut patch = P::default();
        patch
            .core_mut()
            .assign_id(id)
            .expect("default patch carries an id");
        self.patches.push(patch);
        id
    }

    /// Remove a patch, returning its id to the free list.
    pub fn remove_patch(&mut self, id: PatchId) -> Result<P, MeshError> {
        let index = patch_index(&self.patches, id)?;
        let patch = self.patches.remove(index);
        self.vacant_patch_ids.push_back(id.0);
        Ok(patch)
    }

    /// The patch with the given id.
    pub fn patch(&self, id: PatchId) -> Result<&P, MeshError> {
        let index = patch_index(&self.patches, id)?;
        Ok(&self.patches[index])
    }

    /// The patch with the given id, mutably.
    pub fn patch_mut(&mut self, id: PatchId) -> Result<&mut P, MeshError> {
        let index = patch_index(&self.patches, id)?;
        Ok(&mut self.patches[index])
    }

    /// Number of patches on the grid.
    pub fn n_patches(&self) -> usize {
        self.patches.len()
    }

    /// Iterate the grid's patches.
    pub fn patches(&self) -> impl Iterator<Item = &P> {
        self.patches.iter()
    }

    /// Mark a patch's references as rebuilt and current again.
    ///
    /// Call after re-establishing the patch's membership following an
    /// invalidating grid mutation.
    pub fn validate_patch(&mut self, id: PatchId) -> Result<(), MeshError> {
        let index = patch_index(&self.patches, id)?;
        self.patches[index].core_mut().validate();
        Ok(())
    }

    /// Include a unit in a patch at timestep `ts`.
    ///
    /// Assigns the unit's patch position and patch id, activates it, and
    /// appends its handle to the patch. Fails if the unit is already
    /// active.
    pub fn include_unit<U: GridUnit>(
        &mut self,
        patch: PatchId,
        handle: UnitHandle<U>,
        ts: Timestep,
    ) -> Result<(), MeshError> {
        let Self {
            stores, patches, ..
        } = self;
        let store = typed_store_mut::<U>(stores)?;
        let index = patch_index(patches, patch)?;
        let target = &mut patches[index];

        let unit = store.resolve_mut(handle)?;
        unit.core_mut().activate(ts)?;
        let patch_pos = target.core().n_units::<U>() as u32;
        unit.core_mut().set_patch(patch, patch_pos);
        target.core_mut().push_handle(handle);
        Ok(())
    }

    /// Exclude a unit from a patch.
    ///
    /// Deactivates the unit, erases its handle from the patch, and shifts
    /// the patch positions of every following member downward.
    pub fn exclude_unit<U: GridUnit>(
        &mut self,
        patch: PatchId,
        handle: UnitHandle<U>,
    ) -> Result<(), MeshError> {
        let Self {
            stores, patches, ..
        } = self;
        let store = typed_store_mut::<U>(stores)?;
        let index = patch_index(patches, patch)?;
        let target = &mut patches[index];

        let unit = store.resolve_mut(handle)?;
        let id = unit.core().id();
        if unit.core().patch_id() != Some(patch) {
            return Err(MeshError::NotInPatch { unit: id, patch });
        }
        let patch_pos = unit.core().patch_pos();
        unit.core_mut().deactivate()?;
        unit.core_mut().clear_patch();

        let removed = target.core_mut().remove_handle_at::<U>(patch_pos as usize);
        debug_assert_eq!(removed, Some(handle), "patch handle list out of step");

        // Shift the patch positions of members after the removed one.
        let tail: Vec<UnitHandle<U>> = target.core().handles::<U>()[patch_pos as usize..].to_vec();
        for h in tail {
            let member = store.resolve_mut(h)?;
            let core = member.core_mut();
            let shifted = core.patch_pos() - 1;
            core.set_patch_pos(shifted);
        }
        Ok(())
    }

    /// The handles of all type-`U` units in a patch, in patch order.
    ///
    /// Fails with [`MeshError::PatchLocked`] if the patch has been
    /// invalidated and not yet rebuilt.
    pub fn patch_units<U: GridUnit>(&self, patch: PatchId) -> Result<&[UnitHandle<U>], MeshError> {
        let index = patch_index(&self.patches, patch)?;
        let target = &self.patches[index];
        if target.core().is_locked() {
            return Err(MeshError::PatchLocked { id: patch });
        }
        Ok(target.core().handles::<U>())
    }

    fn invalidate_patches(&mut self) {
        for patch in &mut self.patches {
            if patch.core().is_up_to_date() {
                patch.core_mut().invalidate();
            }
        }
    }
}
