//! Top-level shell generation.

use bevy::prelude::*;

use crate::error::ShellFurError;
use crate::graph::{GraphInputs, GraphLibrary, SHELL_GRAPH_NAME, ShellGraph};
use crate::material::{MaterialSelection, MaterialSlots, ShellAssets, SlotRanges, build_stack};
use crate::modifier::{ModifierOutcome, SHELL_MODIFIER_NAME, ShellModifiers};
use crate::settings::{ShellFurSettings, ShellPattern};

/// The mesh entity receiving shells.
pub struct ShellTarget<'a> {
    pub slots: &'a mut MaterialSlots,
    pub modifiers: &'a mut ShellModifiers,
}

/// A base material whose stack could not be built.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialFailure {
    pub slot: usize,
    pub material: String,
    pub error: ShellFurError,
}

/// Outcome of one [`generate_shells`] run.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationReport {
    /// Base materials that received a shell stack.
    pub materials_created: usize,
    /// Shell slots appended to the target.
    pub layers_generated: usize,
    /// `true` when the shell modifier was newly added.
    pub modifier_attached: bool,
    pub modifier: ModifierOutcome,
    pub slot_ranges: SlotRanges,
    pub failures: Vec<MaterialFailure>,
}

impl GenerationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Shell texturing created for {} material(s), {} layer slot(s)",
            self.materials_created, self.layers_generated
        );
        if !self.failures.is_empty() {
            let names: Vec<&str> = self.failures.iter().map(|f| f.material.as_str()).collect();
            summary.push_str(&format!("; skipped {}", names.join(", ")));
        }
        summary
    }
}

/// Builds shell stacks for every checked material, appends their slots to the
/// target, rebuilds the shell graph and makes sure the target carries the
/// shell modifier.
///
/// Fails without side effects on invalid settings, a missing target or an
/// empty selection. A material whose stack cannot be built is recorded in the
/// report and the others continue.
pub fn generate_shells(
    target: Option<ShellTarget>,
    selection: &MaterialSelection,
    settings: &ShellFurSettings,
    assets: &mut ShellAssets,
    graphs: &mut GraphLibrary,
) -> Result<GenerationReport, ShellFurError> {
    settings.validate()?;

    let Some(target) = target else {
        return Err(ShellFurError::NoActiveMesh {
            reason: "no target mesh".to_string(),
        });
    };

    if selection.checked_count() == 0 {
        return Err(ShellFurError::NoMaterialsSelected);
    }

    let mut rng = settings.rng();
    let noise = match settings.pattern {
        ShellPattern::Random => Some(assets.cache.noise_mask(assets.images, &mut rng)?),
        ShellPattern::Vertical => None,
    };

    let mut stacks = Vec::with_capacity(selection.checked_count());
    let mut failures = Vec::new();
    for (slot, name, material) in selection.checked() {
        match build_stack(material, slot, name, noise.as_ref(), settings, assets, &mut rng) {
            Ok(stack) => stacks.push(stack),
            Err(error) => {
                warn!("Skipping material '{name}' in slot {slot}: {error}");
                failures.push(MaterialFailure {
                    slot,
                    material: name.to_string(),
                    error,
                });
            }
        }
    }

    let slot_ranges = target.slots.append_shells(&stacks);
    graphs.rebuild(ShellGraph::from_slot_ranges(&slot_ranges, settings));

    let modifier = target.modifiers.ensure(
        SHELL_MODIFIER_NAME,
        SHELL_GRAPH_NAME,
        GraphInputs::from_settings(settings),
        settings.modifier_policy,
    );

    let report = GenerationReport {
        materials_created: stacks.len(),
        layers_generated: slot_ranges.slot_count(),
        modifier_attached: modifier.is_attached(),
        modifier,
        slot_ranges,
        failures,
    };
    info!("{}", report.summary());
    Ok(report)
}
