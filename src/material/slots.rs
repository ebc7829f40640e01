//! Material slots of a target mesh and the ranges appended for shell layers.

use std::ops::Range;

use bevy::prelude::*;

use super::selection::MaterialSelection;
use super::stack::ShellLayerStack;
use crate::modifier::ShellModifiers;

/// A named material assigned to one slot of a mesh.
#[derive(Clone, Debug)]
pub struct MaterialSlot {
    pub name: String,
    pub material: Handle<StandardMaterial>,
}

impl MaterialSlot {
    pub fn new(name: impl Into<String>, material: Handle<StandardMaterial>) -> Self {
        Self {
            name: name.into(),
            material,
        }
    }
}

/// Ordered material slots of a mesh entity plus the slot index of every
/// triangle.
///
/// Empty slots (`None`) keep their position so face indices stay valid.
#[derive(Component, Clone, Debug, Default)]
#[require(MaterialSelection, ShellModifiers)]
pub struct MaterialSlots {
    pub slots: Vec<Option<MaterialSlot>>,
    /// Slot index per triangle, in index-buffer order.
    pub face_materials: Vec<u32>,
}

impl MaterialSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, name: impl Into<String>, material: Handle<StandardMaterial>) -> Self {
        self.slots.push(Some(MaterialSlot::new(name, material)));
        self
    }

    pub fn with_empty_slot(mut self) -> Self {
        self.slots.push(None);
        self
    }

    pub fn with_face_materials(mut self, face_materials: Vec<u32>) -> Self {
        self.face_materials = face_materials;
        self
    }

    /// Number of slots, including empty ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MaterialSlot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Appends a slot and returns its index.
    pub fn push(&mut self, slot: MaterialSlot) -> usize {
        self.slots.push(Some(slot));
        self.slots.len() - 1
    }

    /// Appends every layer of every stack, in order, and records where each
    /// base slot's layers landed.
    pub fn append_shells(&mut self, stacks: &[ShellLayerStack]) -> SlotRanges {
        let mut ranges = SlotRanges::default();
        for stack in stacks {
            let start = self.len();
            for layer in &stack.layers {
                self.push(MaterialSlot::new(layer.material_name.clone(), layer.material.clone()));
            }
            ranges.insert(stack.base_slot, start..self.len());
        }
        ranges
    }
}

/// Base slot index -> contiguous range of appended shell slots, in the order
/// the bases were processed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotRanges {
    entries: Vec<(usize, Range<usize>)>,
}

impl SlotRanges {
    fn insert(&mut self, base_slot: usize, range: Range<usize>) {
        self.entries.push((base_slot, range));
    }

    pub fn get(&self, base_slot: usize) -> Option<Range<usize>> {
        self.entries
            .iter()
            .find(|(base, _)| *base == base_slot)
            .map(|(_, range)| range.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        self.entries
            .iter()
            .map(|(base, range)| (*base, range.clone()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of appended slots.
    pub fn slot_count(&self) -> usize {
        self.entries.iter().map(|(_, range)| range.len()).sum()
    }
}
