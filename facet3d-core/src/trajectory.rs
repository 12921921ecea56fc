/// Position-update policies applied when an object's offset changes
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::transform::TransformState;

/// Phase advance of the circular orbit per offset update, in radians
pub const ORBIT_STEP: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trajectory {
    /// `offset += delta`
    #[default]
    Linear,
    /// Unit circle in the xy plane driven by the object's own phase; the
    /// supplied delta is ignored and z is left unchanged
    Orbit,
}

impl Trajectory {
    pub fn advance(self, state: &mut TransformState, delta: &Vector3<f32>) {
        match self {
            Trajectory::Linear => state.translate(delta),
            Trajectory::Orbit => {
                let (sin, cos) = state.orbit_phase.sin_cos();
                state.offset = Vector3::new(cos, sin, state.offset.z);
                state.orbit_phase += ORBIT_STEP;
            }
        }
    }
}
