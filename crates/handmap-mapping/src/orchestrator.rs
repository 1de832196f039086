//! Mapping registry and per-frame driver.

use std::collections::HashMap;

use handmap_core::{extract, Error, FrameObservation, HandObservation, InputKind, Result};
use handmap_filter::Smoother;

use crate::config::OrchestratorConfig;
use crate::curve::map_value;
use crate::history::LandmarkHistory;
use crate::mapping::{GestureMapping, HandSelector, MappingOutput, MappingState, MappingUpdate};

type OutputCallback = Box<dyn FnMut(&MappingOutput) + Send>;

/// A registered mapping with its private filter and state
struct MappingSlot {
    mapping: GestureMapping,
    smoother: Smoother,
    state: MappingState,
}

impl MappingSlot {
    fn new(mapping: GestureMapping) -> Self {
        let smoother = mapping.smoothing.build();
        Self {
            mapping,
            smoother,
            state: MappingState::default(),
        }
    }
}

/// Runs every enabled mapping once per frame and emits shaped values.
///
/// Mappings are processed and reported in registration order. Each one owns
/// exactly one filter; the previous-frame landmark cache is shared by all of
/// them and keyed by handedness.
pub struct MappingOrchestrator {
    config: OrchestratorConfig,
    order: Vec<String>,
    slots: HashMap<String, MappingSlot>,
    history: LandmarkHistory,
    /// Caller's unit
    previous_timestamp: Option<f64>,
    callbacks: Vec<OutputCallback>,
}

impl Default for MappingOrchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

impl MappingOrchestrator {
    pub fn new(mut config: OrchestratorConfig) -> Self {
        config.min_hand_confidence = if config.min_hand_confidence.is_finite() {
            config.min_hand_confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            config,
            order: Vec::new(),
            slots: HashMap::new(),
            history: LandmarkHistory::new(),
            previous_timestamp: None,
            callbacks: Vec::new(),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Add a callback for emitted values; callbacks run in the order added
    pub fn on_output<F>(&mut self, callback: F)
    where
        F: FnMut(&MappingOutput) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Register a mapping with a fresh filter and zeroed state
    pub fn register(&mut self, mapping: GestureMapping) -> Result<()> {
        if self.slots.contains_key(&mapping.id) {
            return Err(Error::duplicate(mapping.id));
        }

        tracing::info!(
            "Registered mapping {} ({} -> {}.{}, {} smoothing)",
            mapping.id,
            describe_input(&mapping.input.kind),
            mapping.output.target,
            mapping.output.parameter,
            mapping.smoothing.name()
        );

        let id = mapping.id.clone();
        self.slots.insert(id.clone(), MappingSlot::new(mapping));
        self.order.push(id);
        Ok(())
    }

    /// Register several mappings, stopping at the first duplicate
    pub fn register_all<I>(&mut self, mappings: I) -> Result<()>
    where
        I: IntoIterator<Item = GestureMapping>,
    {
        for mapping in mappings {
            self.register(mapping)?;
        }
        Ok(())
    }

    /// Remove a mapping together with its filter and state
    pub fn unregister(&mut self, id: &str) -> Result<GestureMapping> {
        let slot = self.slots.remove(id).ok_or_else(|| Error::unknown(id))?;
        self.order.retain(|registered| registered != id);

        tracing::info!("Unregistered mapping {}", id);
        Ok(slot.mapping)
    }

    /// Merge a partial update. The filter is rebuilt only if smoothing changed.
    pub fn update_spec(&mut self, id: &str, update: MappingUpdate) -> Result<()> {
        let slot = self.slots.get_mut(id).ok_or_else(|| Error::unknown(id))?;
        let was_enabled = slot.mapping.enabled;

        if slot.mapping.apply_update(update) {
            slot.smoother = slot.mapping.smoothing.build();
            tracing::debug!(
                "Rebuilt filter for mapping {} ({})",
                id,
                slot.mapping.smoothing.name()
            );
        }
        if slot.mapping.enabled != was_enabled {
            tracing::debug!("Mapping {} enabled={}", id, slot.mapping.enabled);
        }
        Ok(())
    }

    /// Toggle processing without touching filter or state
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<()> {
        let slot = self.slots.get_mut(id).ok_or_else(|| Error::unknown(id))?;
        if slot.mapping.enabled != enabled {
            slot.mapping.enabled = enabled;
            tracing::debug!("Mapping {} enabled={}", id, enabled);
        }
        Ok(())
    }

    /// Run every enabled mapping against one frame.
    ///
    /// Mappings whose hand or external value is missing are skipped and keep
    /// their previous state. Emitted values are passed to each callback and
    /// also returned.
    pub fn process(&mut self, frame: &FrameObservation) -> Vec<MappingOutput> {
        // Velocity uses the caller's unit, filters run on seconds
        let dt = self
            .previous_timestamp
            .map_or(0.0, |previous| frame.timestamp - previous);
        let now = self.config.timestamp_unit.to_seconds(frame.timestamp);
        let min_confidence = self.config.min_hand_confidence;

        let mut outputs = Vec::new();
        let mut used_hands: [Option<&HandObservation>; 2] = [None, None];

        for id in &self.order {
            let Some(slot) = self.slots.get_mut(id) else {
                continue;
            };
            if !slot.mapping.enabled {
                continue;
            }

            let input = &slot.mapping.input;
            let raw = match &input.kind {
                InputKind::Gesture { gesture } => {
                    let Some(hand) = resolve_hand(input.hand, frame, min_confidence) else {
                        tracing::trace!("Mapping {}: no {:?} hand this frame", id, input.hand);
                        continue;
                    };
                    used_hands[hand.handedness.index()] = Some(hand);
                    extract(
                        *gesture,
                        hand,
                        input.finger,
                        self.history.get(hand.handedness),
                        dt,
                    )
                }
                InputKind::External { key } => match frame.external.get(key) {
                    Some(value) => *value,
                    None => {
                        tracing::trace!("Mapping {}: no external value {}", id, key);
                        continue;
                    }
                },
            };

            if !raw.is_finite() {
                tracing::trace!("Mapping {}: non-finite input {}", id, raw);
                continue;
            }

            let smoothed = slot.smoother.apply(raw, now);
            let value = map_value(smoothed, input, &slot.mapping.output);

            slot.state = MappingState {
                raw_value: raw,
                smoothed_value: smoothed,
                output_value: value,
                last_update: frame.timestamp,
            };

            let output = MappingOutput {
                mapping_id: id.clone(),
                target: slot.mapping.output.target.clone(),
                parameter: slot.mapping.output.parameter.clone(),
                value,
                timestamp: frame.timestamp,
            };
            for callback in &mut self.callbacks {
                callback(&output);
            }
            outputs.push(output);
        }

        for hand in used_hands.into_iter().flatten() {
            self.history.store(hand.handedness, hand.landmarks);
        }
        if frame.timestamp.is_finite() {
            self.previous_timestamp = Some(frame.timestamp);
        }

        outputs
    }

    /// Reset every filter and state, and forget the previous frame.
    /// Specs and enabled flags are kept.
    pub fn reset(&mut self) {
        for slot in self.slots.values_mut() {
            slot.smoother.reset();
            slot.state = MappingState::default();
        }
        self.history.clear();
        self.previous_timestamp = None;

        tracing::info!("Reset {} mappings", self.slots.len());
    }

    pub fn state(&self, id: &str) -> Result<MappingState> {
        self.slots
            .get(id)
            .map(|slot| slot.state)
            .ok_or_else(|| Error::unknown(id))
    }

    /// Snapshot of every state, in registration order
    pub fn states(&self) -> Vec<(String, MappingState)> {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(id).map(|slot| (id.clone(), slot.state)))
            .collect()
    }

    pub fn mapping(&self, id: &str) -> Result<&GestureMapping> {
        self.slots
            .get(id)
            .map(|slot| &slot.mapping)
            .ok_or_else(|| Error::unknown(id))
    }

    /// Registered mappings in registration order
    pub fn mappings(&self) -> impl Iterator<Item = &GestureMapping> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(id).map(|slot| &slot.mapping))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// First hand matching the selector whose confidence passes the gate
fn resolve_hand(
    selector: HandSelector,
    frame: &FrameObservation,
    min_confidence: f64,
) -> Option<&HandObservation> {
    frame
        .hands
        .iter()
        .filter(|hand| hand.confidence >= min_confidence)
        .find(|hand| selector.matches(hand.handedness))
}

fn describe_input(kind: &InputKind) -> String {
    match kind {
        InputKind::Gesture { gesture } => gesture.as_str().to_string(),
        InputKind::External { key } => format!("external:{}", key),
    }
}
