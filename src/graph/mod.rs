//! Declarative shell expansion graph.
//!
//! A [`ShellGraph`] describes which material regions get shells and where
//! their slots start. It can be lowered to an explicit [`NodeTree`] for
//! inspection, or evaluated directly over [`ShellGeometry`].

mod nodes;

use std::collections::HashMap;

use bevy::prelude::*;

use crate::geometry::{ShellGeometry, Taper, shell_offset};
use crate::material::SlotRanges;
use crate::settings::{DEFAULT_THICKNESS, ShellFurSettings};

pub use nodes::{
    InterfaceSocket, Link, MathOp, NodeId, NodeKind, NodeTree, SocketDirection, SocketRef,
    SocketType, SocketValue,
};

/// Name the shell graph is stored under in the [`GraphLibrary`].
pub const SHELL_GRAPH_NAME: &str = "ShellFurSystem";

/// Values fed to a graph's `Layers` and `Thickness` inputs.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct GraphInputs {
    pub layers: u32,
    pub thickness: f32,
}

impl Default for GraphInputs {
    fn default() -> Self {
        Self {
            layers: 10,
            thickness: DEFAULT_THICKNESS,
        }
    }
}

impl GraphInputs {
    pub fn from_settings(settings: &ShellFurSettings) -> Self {
        Self {
            layers: settings.layers,
            thickness: settings.thickness,
        }
    }
}

/// Shell expansion of one base material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShellPass {
    /// Faces with this material index are duplicated.
    pub material_index: u32,
    /// Material index of the first shell; shell `i` uses `slot_start + i`.
    pub slot_start: u32,
    pub taper: Taper,
}

impl ShellPass {
    /// Every shell of this pass, joined in iteration order.
    pub fn evaluate(&self, geometry: &ShellGeometry, inputs: GraphInputs) -> ShellGeometry {
        let source = geometry.separate_material(self.material_index);
        let mut accumulated = ShellGeometry::default();

        for iteration in 0..inputs.layers {
            let mut layer = source.clone();
            layer.offset_along_normals(|uv| {
                shell_offset(iteration, inputs.thickness, self.taper.factor(uv))
            });
            layer.set_material_index(self.slot_start + iteration);
            accumulated.join(&layer);
        }

        accumulated
    }
}

/// Shell expansion graph: input geometry plus one [`ShellPass`] per selected
/// base material.
#[derive(Clone, Debug, PartialEq)]
pub struct ShellGraph {
    pub name: String,
    /// Interface defaults of `Layers` and `Thickness`.
    pub defaults: GraphInputs,
    pub passes: Vec<ShellPass>,
}

impl ShellGraph {
    /// One pass per slot range, in range order.
    pub fn from_slot_ranges(ranges: &SlotRanges, settings: &ShellFurSettings) -> Self {
        let taper = Taper::from_settings(settings);
        let passes = ranges
            .iter()
            .map(|(base_slot, range)| ShellPass {
                material_index: base_slot as u32,
                slot_start: range.start as u32,
                taper,
            })
            .collect();

        Self {
            name: SHELL_GRAPH_NAME.to_string(),
            defaults: GraphInputs::from_settings(settings),
            passes,
        }
    }

    /// Lowers the graph to explicit nodes and links.
    pub fn to_node_tree(&self) -> NodeTree {
        nodes::lower(self)
    }

    /// Original geometry first, then each pass's shells.
    pub fn evaluate(&self, geometry: &ShellGeometry, inputs: GraphInputs) -> ShellGeometry {
        let mut output = geometry.clone();
        for pass in &self.passes {
            output.join(&pass.evaluate(geometry, inputs));
        }
        output
    }
}

/// Named graph definitions shared by all modifiers.
#[derive(Resource, Default, Debug)]
pub struct GraphLibrary {
    graphs: HashMap<String, ShellGraph>,
}

impl GraphLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `graph` under its name, replacing any previous definition.
    pub fn rebuild(&mut self, graph: ShellGraph) -> Option<ShellGraph> {
        self.graphs.insert(graph.name.clone(), graph)
    }

    pub fn get(&self, name: &str) -> Option<&ShellGraph> {
        self.graphs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.graphs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
