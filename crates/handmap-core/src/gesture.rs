//! Gesture extraction: one hand's landmarks to one scalar.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::geometry::{
    angle_between, centroid_2d, cross_z, distance_2d, heading, vector_2d, vector_3d,
};
use crate::landmarks::{
    Finger, FINGERTIPS, INDEX_MCP, LANDMARK_COUNT, MIDDLE_MCP, PALM_BASE, THUMB_TIP, WRIST,
};
use crate::types::{HandObservation, Landmark};

/// Built-in geometric gesture measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureType {
    /// Thumb tip to selected fingertip, image plane
    PinchDistance,
    /// Mean fingertip distance from the palm centroid
    HandOpenness,
    /// 0 = straight, 1 = fully curled
    FingerCurl,
    /// Wrist→middle knuckle heading in radians
    HandRotation,
    WristPositionX,
    WristPositionY,
    WristDepth,
    /// Mean angle between adjacent finger directions (radians)
    FingerSpread,
    /// Palm winding in the image plane mapped to {0, 1}
    PalmFacing,
    VelocityX,
    VelocityY,
}

impl GestureType {
    pub const ALL: [GestureType; 11] = [
        GestureType::PinchDistance,
        GestureType::HandOpenness,
        GestureType::FingerCurl,
        GestureType::HandRotation,
        GestureType::WristPositionX,
        GestureType::WristPositionY,
        GestureType::WristDepth,
        GestureType::FingerSpread,
        GestureType::PalmFacing,
        GestureType::VelocityX,
        GestureType::VelocityY,
    ];

    /// Whether the gesture reads the previous frame's landmarks
    pub fn uses_history(&self) -> bool {
        matches!(self, GestureType::VelocityX | GestureType::VelocityY)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GestureType::PinchDistance => "pinch_distance",
            GestureType::HandOpenness => "hand_openness",
            GestureType::FingerCurl => "finger_curl",
            GestureType::HandRotation => "hand_rotation",
            GestureType::WristPositionX => "wrist_position_x",
            GestureType::WristPositionY => "wrist_position_y",
            GestureType::WristDepth => "wrist_depth",
            GestureType::FingerSpread => "finger_spread",
            GestureType::PalmFacing => "palm_facing",
            GestureType::VelocityX => "velocity_x",
            GestureType::VelocityY => "velocity_y",
        }
    }
}

/// Where a mapping's raw value comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    /// Measured from the target hand's landmarks
    Gesture { gesture: GestureType },
    /// Supplied by the caller in `FrameObservation::external`
    External { key: String },
}

impl InputKind {
    pub fn gesture(gesture: GestureType) -> Self {
        InputKind::Gesture { gesture }
    }

    pub fn external(key: impl Into<String>) -> Self {
        InputKind::External { key: key.into() }
    }
}

impl From<GestureType> for InputKind {
    fn from(gesture: GestureType) -> Self {
        InputKind::Gesture { gesture }
    }
}

/// Compute one gesture value from a hand.
///
/// `previous` holds the same hand's landmarks from the prior frame and `dt`
/// is the elapsed time in the frame timestamp's unit; both only matter for
/// velocity gestures.
/// Degenerate geometry and missing history resolve to 0.
pub fn extract(
    gesture: GestureType,
    hand: &HandObservation,
    finger: Option<Finger>,
    previous: Option<&[Landmark; LANDMARK_COUNT]>,
    dt: f64,
) -> f64 {
    let lm = &hand.landmarks;
    let finger = finger.unwrap_or_default();

    match gesture {
        GestureType::PinchDistance => pinch_distance(lm, finger),
        GestureType::HandOpenness => hand_openness(lm),
        GestureType::FingerCurl => finger_curl(lm, finger),
        GestureType::HandRotation => hand_rotation(lm),
        GestureType::WristPositionX => lm[WRIST].x,
        GestureType::WristPositionY => lm[WRIST].y,
        GestureType::WristDepth => lm[WRIST].z,
        GestureType::FingerSpread => finger_spread(lm),
        GestureType::PalmFacing => palm_facing(lm),
        GestureType::VelocityX => wrist_speed(lm, previous, dt, |l| l.x),
        GestureType::VelocityY => wrist_speed(lm, previous, dt, |l| l.y),
    }
}

pub fn pinch_distance(lm: &[Landmark; LANDMARK_COUNT], finger: Finger) -> f64 {
    distance_2d(&lm[THUMB_TIP], &lm[finger.tip()])
}

pub fn hand_openness(lm: &[Landmark; LANDMARK_COUNT]) -> f64 {
    let palm: Vec<Landmark> = PALM_BASE.iter().map(|&i| lm[i]).collect();
    let Some(center) = centroid_2d(&palm) else {
        return 0.0;
    };

    let total: f64 = FINGERTIPS
        .iter()
        .map(|&i| nalgebra::distance(&lm[i].to_point2(), &center))
        .sum();
    total / FINGERTIPS.len() as f64
}

/// Flexion at the finger's middle joint, measured between the joint→base
/// and joint→tip vectors so that a straight finger (angle π) reads 0.
pub fn finger_curl(lm: &[Landmark; LANDMARK_COUNT], finger: Finger) -> f64 {
    let [base, mid, _, tip] = finger.indices();
    let to_base = vector_3d(&lm[mid], &lm[base]);
    let to_tip = vector_3d(&lm[mid], &lm[tip]);

    match angle_between(&to_base, &to_tip) {
        Some(angle) => 1.0 - angle / PI,
        None => 0.0,
    }
}

pub fn hand_rotation(lm: &[Landmark; LANDMARK_COUNT]) -> f64 {
    heading(&vector_2d(&lm[WRIST], &lm[MIDDLE_MCP]))
}

pub fn finger_spread(lm: &[Landmark; LANDMARK_COUNT]) -> f64 {
    let directions: Vec<_> = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky]
        .iter()
        .map(|f| vector_3d(&lm[f.base()], &lm[f.tip()]))
        .collect();

    let angles: Vec<f64> = directions
        .windows(2)
        .filter_map(|w| angle_between(&w[0], &w[1]))
        .collect();

    if angles.is_empty() {
        return 0.0;
    }
    angles.iter().sum::<f64>() / angles.len() as f64
}

pub fn palm_facing(lm: &[Landmark; LANDMARK_COUNT]) -> f64 {
    let to_middle = vector_2d(&lm[WRIST], &lm[MIDDLE_MCP]);
    let to_index = vector_2d(&lm[WRIST], &lm[INDEX_MCP]);
    let cross = cross_z(&to_middle, &to_index);

    // f64::signum maps 0.0 to 1.0, so handle the flat case explicitly
    let sign = if cross > 0.0 {
        1.0
    } else if cross < 0.0 {
        -1.0
    } else {
        0.0
    };
    (sign + 1.0) / 2.0
}

fn wrist_speed<F>(
    lm: &[Landmark; LANDMARK_COUNT],
    previous: Option<&[Landmark; LANDMARK_COUNT]>,
    dt: f64,
    axis: F,
) -> f64
where
    F: Fn(&Landmark) -> f64,
{
    match previous {
        Some(prev) if dt > 0.0 => ((axis(&lm[WRIST]) - axis(&prev[WRIST])) / dt).abs(),
        _ => 0.0,
    }
}
