//! Fundamental types for the handmap engine.

use nalgebra::{Point2, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::landmarks::LANDMARK_COUNT;

/// A single hand landmark (x, y normalized to the frame, z relative depth)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_point2(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn to_vector3(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Which physical hand a landmark set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Slot index for per-hand storage
    pub fn index(&self) -> usize {
        match self {
            Handedness::Left => 0,
            Handedness::Right => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        }
    }
}

/// One tracked hand in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub landmarks: [Landmark; LANDMARK_COUNT],
    pub handedness: Handedness,
    /// Detection confidence (0-1)
    pub confidence: f64,
}

impl HandObservation {
    /// Build an observation from an upstream landmark list.
    ///
    /// Fails if the list does not hold exactly 21 finite landmarks.
    /// Confidence is clamped to [0, 1].
    pub fn new(handedness: Handedness, landmarks: &[Landmark], confidence: f64) -> Result<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] =
            landmarks.try_into().map_err(|_| Error::LandmarkCount {
                expected: LANDMARK_COUNT,
                actual: landmarks.len(),
            })?;

        if let Some(i) = landmarks.iter().position(|l| !l.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "landmark {} has a non-finite coordinate",
                i
            )));
        }

        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Ok(Self {
            landmarks,
            handedness,
            confidence,
        })
    }

    /// Build from a flat `[x0, y0, z0, x1, ...]` buffer of 63 values
    pub fn from_flat(handedness: Handedness, data: &[f64], confidence: f64) -> Result<Self> {
        if data.len() != LANDMARK_COUNT * 3 {
            return Err(Error::LandmarkCount {
                expected: LANDMARK_COUNT,
                actual: data.len() / 3,
            });
        }

        let landmarks: Vec<Landmark> = data
            .chunks_exact(3)
            .map(|c| Landmark::new(c[0], c[1], c[2]))
            .collect();

        Self::new(handedness, &landmarks, confidence)
    }

    pub fn landmark(&self, index: usize) -> Landmark {
        self.landmarks[index]
    }
}

/// Everything the upstream tracker reports for one frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameObservation {
    pub hands: Vec<HandObservation>,
    /// Monotonically non-decreasing, unit fixed for a session
    pub timestamp: f64,
    /// Frame size in pixels, informational only
    pub width: u32,
    pub height: u32,
    /// Externally computed scalars keyed by name
    #[serde(default)]
    pub external: HashMap<String, f64>,
}

impl FrameObservation {
    pub fn new(timestamp: f64, hands: Vec<HandObservation>) -> Self {
        Self {
            hands,
            timestamp,
            ..Default::default()
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_external(mut self, key: impl Into<String>, value: f64) -> Self {
        self.external.insert(key.into(), value);
        self
    }

    /// First hand matching `handedness`
    pub fn hand(&self, handedness: Handedness) -> Option<&HandObservation> {
        self.hands.iter().find(|h| h.handedness == handedness)
    }
}
