//! Graph modifiers attached to mesh entities.

use bevy::prelude::*;

use crate::graph::GraphInputs;

/// Name of the modifier that applies the shell graph.
pub const SHELL_MODIFIER_NAME: &str = "Shell Fur";

/// What generation does when the target already has the shell modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum ModifierPolicy {
    /// Leave the existing modifier's inputs untouched.
    #[default]
    ReuseExisting,
    /// Overwrite the existing modifier's inputs with the current settings.
    RefreshInputs,
}

/// A modifier evaluating a named graph from the [`GraphLibrary`](crate::graph::GraphLibrary).
#[derive(Clone, Debug, PartialEq)]
pub struct NodesModifier {
    pub name: String,
    pub graph: String,
    pub inputs: GraphInputs,
}

/// Result of [`ShellModifiers::ensure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierOutcome {
    Attached,
    Reused,
    Refreshed,
}

impl ModifierOutcome {
    #[inline]
    pub fn is_attached(self) -> bool {
        self == Self::Attached
    }
}

/// Ordered modifier stack of a mesh entity.
#[derive(Component, Clone, Debug, Default)]
pub struct ShellModifiers {
    modifiers: Vec<NodesModifier>,
}

impl ShellModifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&NodesModifier> {
        self.modifiers.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodesModifier> + '_ {
        self.modifiers.iter()
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Makes sure a modifier called `name` evaluates `graph`.
    ///
    /// A missing modifier is appended with `inputs`. An existing one is
    /// pointed at `graph` and keeps or replaces its inputs according to
    /// `policy`.
    pub fn ensure(
        &mut self,
        name: &str,
        graph: &str,
        inputs: GraphInputs,
        policy: ModifierPolicy,
    ) -> ModifierOutcome {
        match self.modifiers.iter_mut().find(|m| m.name == name) {
            Some(existing) => {
                existing.graph = graph.to_string();
                match policy {
                    ModifierPolicy::ReuseExisting => ModifierOutcome::Reused,
                    ModifierPolicy::RefreshInputs => {
                        existing.inputs = inputs;
                        ModifierOutcome::Refreshed
                    }
                }
            }
            None => {
                self.modifiers.push(NodesModifier {
                    name: name.to_string(),
                    graph: graph.to_string(),
                    inputs,
                });
                ModifierOutcome::Attached
            }
        }
    }
}
