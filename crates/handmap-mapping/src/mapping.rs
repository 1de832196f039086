//! Mapping definitions and the per-mapping state record.

use serde::{Deserialize, Serialize};

use handmap_core::{Finger, FrameObservation, HandObservation, Handedness, InputKind};
use handmap_filter::SmoothingSpec;

use crate::curve::CurveType;

/// Closed interval `[min, max]`; `min > max` is allowed and reverses direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Which hand a mapping reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSelector {
    Left,
    Right,
    /// First hand observed in the frame
    #[default]
    Any,
}

impl HandSelector {
    pub fn matches(&self, handedness: Handedness) -> bool {
        match self {
            HandSelector::Left => handedness == Handedness::Left,
            HandSelector::Right => handedness == Handedness::Right,
            HandSelector::Any => true,
        }
    }

    /// Resolve the target hand within a frame
    pub fn select<'a>(&self, frame: &'a FrameObservation) -> Option<&'a HandObservation> {
        frame.hands.iter().find(|hand| self.matches(hand.handedness))
    }
}

impl From<Handedness> for HandSelector {
    fn from(handedness: Handedness) -> Self {
        match handedness {
            Handedness::Left => HandSelector::Left,
            Handedness::Right => HandSelector::Right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub kind: InputKind,
    #[serde(default)]
    pub hand: HandSelector,
    /// Pinch partner / curled finger; Index when unset
    #[serde(default)]
    pub finger: Option<Finger>,
    #[serde(default)]
    pub range: ValueRange,
    #[serde(default)]
    pub curve: CurveType,
}

impl InputSpec {
    pub fn new(kind: impl Into<InputKind>) -> Self {
        Self {
            kind: kind.into(),
            hand: HandSelector::default(),
            finger: None,
            range: ValueRange::default(),
            curve: CurveType::default(),
        }
    }

    pub fn with_hand(mut self, hand: impl Into<HandSelector>) -> Self {
        self.hand = hand.into();
        self
    }

    pub fn with_finger(mut self, finger: Finger) -> Self {
        self.finger = Some(finger);
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = ValueRange::new(min, max);
        self
    }

    pub fn with_curve(mut self, curve: CurveType) -> Self {
        self.curve = curve;
        self
    }
}

/// Where a mapping's value goes. Target and parameter are opaque to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub target: String,
    pub parameter: String,
    #[serde(default)]
    pub range: ValueRange,
    #[serde(default)]
    pub invert: bool,
}

impl OutputSpec {
    pub fn new(target: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            parameter: parameter.into(),
            range: ValueRange::default(),
            invert: false,
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = ValueRange::new(min, max);
        self
    }

    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }
}

/// One configured gesture → parameter pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureMapping {
    pub id: String,
    pub enabled: bool,
    pub input: InputSpec,
    pub output: OutputSpec,
    #[serde(default)]
    pub smoothing: SmoothingSpec,
}

impl GestureMapping {
    /// Enabled mapping with passthrough smoothing
    pub fn new(id: impl Into<String>, input: InputSpec, output: OutputSpec) -> Self {
        Self {
            id: id.into(),
            enabled: true,
            input,
            output,
            smoothing: SmoothingSpec::default(),
        }
    }

    pub fn with_smoothing(mut self, smoothing: SmoothingSpec) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Merge the set fields of `update`; returns true when smoothing changed
    pub(crate) fn apply_update(&mut self, update: MappingUpdate) -> bool {
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(input) = update.input {
            self.input = input;
        }
        if let Some(output) = update.output {
            self.output = output;
        }
        match update.smoothing {
            Some(smoothing) if smoothing != self.smoothing => {
                self.smoothing = smoothing;
                true
            }
            _ => false,
        }
    }
}

/// Partial replacement for a registered mapping; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingUpdate {
    pub enabled: Option<bool>,
    pub input: Option<InputSpec>,
    pub output: Option<OutputSpec>,
    pub smoothing: Option<SmoothingSpec>,
}

impl MappingUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn input(mut self, input: InputSpec) -> Self {
        self.input = Some(input);
        self
    }

    pub fn output(mut self, output: OutputSpec) -> Self {
        self.output = Some(output);
        self
    }

    pub fn smoothing(mut self, smoothing: SmoothingSpec) -> Self {
        self.smoothing = Some(smoothing);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.input.is_none()
            && self.output.is_none()
            && self.smoothing.is_none()
    }
}

/// Last values computed for a mapping. All zero until first processed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MappingState {
    pub raw_value: f64,
    pub smoothed_value: f64,
    pub output_value: f64,
    /// Frame timestamp in the caller's unit
    pub last_update: f64,
}

/// One value emitted for a downstream target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingOutput {
    pub mapping_id: String,
    pub target: String,
    pub parameter: String,
    pub value: f64,
    pub timestamp: f64,
}
