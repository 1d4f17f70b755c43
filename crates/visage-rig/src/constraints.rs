//! Constraint corrector
//!
//! Naive layering of independent sources can ask the lips to be closed and
//! the jaw to hang open at the same time. Four rules run in a fixed order,
//! each reading the output of the previous one:
//!
//! 1. `mouthClose > 0.6` scales `jawOpen` and `mouthFunnel` by
//!    `1 - mouthClose`, and `mouthPucker` by `1 - 0.6 * mouthClose`.
//! 2. `max(pucker, funnel) > 0.4` scales both stretches by `1 - that max`.
//! 3. Smile and frown both active: the stronger side scales the weaker by
//!    `1 - stronger`. Ties favor smile.
//! 4. `max(stretch) > 0.4` scales pucker and funnel by `1 - that max`.
//!
//! The rules are not a fixed point: each scales by its own trigger, so a
//! pose that fired any of them is suppressed again on a second run (closed
//! lips take `jawOpen` 0.5 to 0.05, then 0.005). The corrected pose is a
//! distinct type and [`apply_constraints`] on a [`CorrectedPose`] returns it
//! unchanged. Poses that fire no rule pass through the rules untouched.

use std::ops::Deref;

use visage_core::{FacialParam, Pose};

use FacialParam::*;

/// A pose that has been through the corrector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectedPose(Pose);

impl CorrectedPose {
    /// Drop the marker. Correcting the returned [`Pose`] runs the rules again,
    /// which compounds any suppression that fired.
    pub fn into_pose(self) -> Pose {
        self.0
    }

    /// Borrow the weights. Same caveat as [`CorrectedPose::into_pose`].
    pub fn as_pose(&self) -> &Pose {
        &self.0
    }
}

impl Deref for CorrectedPose {
    type Target = Pose;

    fn deref(&self) -> &Pose {
        &self.0
    }
}

/// Anything the corrector accepts
pub trait ConstraintInput {
    fn corrected(self) -> CorrectedPose;
}

impl ConstraintInput for Pose {
    fn corrected(mut self) -> CorrectedPose {
        correct_in_place(&mut self);
        CorrectedPose(self)
    }
}

impl ConstraintInput for CorrectedPose {
    #[inline]
    fn corrected(self) -> CorrectedPose {
        self
    }
}

/// Run the corrector
pub fn apply_constraints<P: ConstraintInput>(pose: P) -> CorrectedPose {
    pose.corrected()
}

/// Scale a parameter only if the pose defines it
#[inline]
fn scale_present(pose: &mut Pose, param: FacialParam, factor: f32) {
    if let Some(w) = pose.try_get(param) {
        pose.set(param, w * factor);
    }
}

fn correct_in_place(pose: &mut Pose) {
    let close = pose.get(MouthClose);
    if close > 0.6 {
        scale_present(pose, JawOpen, 1.0 - close);
        scale_present(pose, MouthFunnel, 1.0 - close);
        scale_present(pose, MouthPucker, 1.0 - close * 0.6);
    }

    let rounding = pose.max_of(MouthPucker, MouthFunnel);
    if rounding > 0.4 {
        scale_present(pose, MouthStretchLeft, 1.0 - rounding);
        scale_present(pose, MouthStretchRight, 1.0 - rounding);
    }

    let smile = pose.max_of(MouthSmileLeft, MouthSmileRight);
    let frown = pose.max_of(MouthFrownLeft, MouthFrownRight);
    if smile > 0.0 && frown > 0.0 {
        if smile >= frown {
            scale_present(pose, MouthFrownLeft, 1.0 - smile);
            scale_present(pose, MouthFrownRight, 1.0 - smile);
        } else {
            scale_present(pose, MouthSmileLeft, 1.0 - frown);
            scale_present(pose, MouthSmileRight, 1.0 - frown);
        }
    }

    let stretch = pose.max_of(MouthStretchLeft, MouthStretchRight);
    if stretch > 0.4 {
        scale_present(pose, MouthPucker, 1.0 - stretch);
        scale_present(pose, MouthFunnel, 1.0 - stretch);
    }
}
