//! Morph-target mesh seam
//!
//! The render side owns meshes. The rig only borrows a mesh's name -> index
//! dictionary and its parallel weight array for the duration of one write;
//! it never resizes or recreates either.

use std::collections::HashMap;

use tracing::{debug, trace};
use visage_core::Pose;

use crate::{approach, BindingCache};

/// Borrowed morph-target storage of one mesh
#[derive(Debug)]
pub struct MorphTargetsMut<'a> {
    pub dictionary: &'a HashMap<String, usize>,
    pub influences: &'a mut [f32],
}

/// A mesh that may expose morph targets
pub trait MorphTargetMesh {
    /// Dictionary and weights, or `None` if this mesh has no morph targets
    fn morph_targets(&mut self) -> Option<MorphTargetsMut<'_>>;
}

/// Step every target of `mesh` toward its value under `targets`.
///
/// Returns the number of weights written, or `None` if the mesh exposes no
/// morph targets. Targets clamp to [0, 1]; dictionary indices past the end
/// of the weight array are skipped.
pub fn drive_mesh<M>(
    mesh: &mut M,
    targets: &Pose,
    factor: f32,
    bindings: &mut BindingCache,
) -> Option<usize>
where
    M: MorphTargetMesh + ?Sized,
{
    let MorphTargetsMut {
        dictionary,
        influences,
    } = mesh.morph_targets()?;

    if let Some(report) = bindings.learn(dictionary.keys().map(String::as_str)) {
        debug!(
            targets = dictionary.len(),
            direct = report.direct.len(),
            via_rules = report.via_rules.len(),
            unmapped = report.unmapped.len(),
            missing = report.missing().len(),
            "rig coverage"
        );
    }

    let mut written = 0;
    for (name, &idx) in dictionary {
        let Some(slot) = influences.get_mut(idx) else {
            trace!(name = %name, idx, "morph target index out of range");
            continue;
        };
        let target = bindings.binding(name).target(targets).clamp(0.0, 1.0);
        let current = if slot.is_finite() { *slot } else { 0.0 };
        *slot = approach(current, target, factor);
        written += 1;
    }
    Some(written)
}

/// In-memory morph-target mesh
#[derive(Debug, Clone, Default)]
pub struct MorphMesh {
    name: String,
    dictionary: HashMap<String, usize>,
    influences: Vec<f32>,
    has_targets: bool,
}

impl MorphMesh {
    /// Mesh with the given target names, all weights zero
    pub fn new<I, S>(name: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dictionary: HashMap<String, usize> = targets
            .into_iter()
            .enumerate()
            .map(|(i, s)| (s.into(), i))
            .collect();
        let influences = vec![0.0; dictionary.len()];
        Self {
            name: name.into(),
            dictionary,
            influences,
            has_targets: true,
        }
    }

    /// Mesh without morph targets (a body or hair mesh)
    pub fn without_targets(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn influence(&self, target: &str) -> Option<f32> {
        let idx = *self.dictionary.get(target)?;
        self.influences.get(idx).copied()
    }

    pub fn set_influence(&mut self, target: &str, weight: f32) -> bool {
        match self.dictionary.get(target) {
            Some(&idx) if idx < self.influences.len() => {
                self.influences[idx] = weight;
                true
            }
            _ => false,
        }
    }

    /// Target names, sorted
    pub fn target_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dictionary.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn influences(&self) -> &[f32] {
        &self.influences
    }
}

impl MorphTargetMesh for MorphMesh {
    fn morph_targets(&mut self) -> Option<MorphTargetsMut<'_>> {
        if !self.has_targets {
            return None;
        }
        Some(MorphTargetsMut {
            dictionary: &self.dictionary,
            influences: &mut self.influences,
        })
    }
}
