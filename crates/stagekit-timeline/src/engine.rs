//! Pure, seekable animation evaluation.
//!
//! `seek` is a function of `(definition, time)` and nothing else: there is
//! no internal playhead, so evaluation order cannot influence results and
//! backward scrubbing costs the same as forward. A seek completes
//! synchronously; the scrubber re-seeks every enabled animation on every
//! interaction frame.

use crate::definition::{AnimationDefinition, AnimationKind, Repeat};
use crate::timeline::{Timeline, Track};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// The visual state an animation contributes at a point in time.
///
/// Rotation and offsets are deltas on top of the shape's authored
/// attributes; scale and opacity are factors with identity 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedState {
    pub rotation: f64,
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub opacity: f64,
}

impl Default for AnimatedState {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            opacity: 1.0,
        }
    }
}

impl AnimatedState {
    /// The do-nothing state.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    fn set(&mut self, track: Track, value: f64) {
        match track {
            Track::Rotation => self.rotation = value,
            Track::Scale => self.scale = value,
            Track::OffsetX => self.offset_x = value,
            Track::OffsetY => self.offset_y = value,
            Track::Opacity => self.opacity = value,
        }
    }

    /// Combines two states: deltas add, factors multiply. Used when several
    /// animations drive the same shape.
    pub fn combine(&self, other: &AnimatedState) -> AnimatedState {
        AnimatedState {
            rotation: self.rotation + other.rotation,
            scale: self.scale * other.scale,
            offset_x: self.offset_x + other.offset_x,
            offset_y: self.offset_y + other.offset_y,
            opacity: self.opacity * other.opacity,
        }
    }
}

/// Evaluates a definition at absolute timeline time `t`.
///
/// This compiles the timeline on the fly; [`AnimationEngine`] keeps
/// compiled timelines cached and should be preferred when seeking the same
/// definitions repeatedly.
pub fn seek_definition(def: &AnimationDefinition, t: f64) -> AnimatedState {
    let timeline = Timeline::compile(def);
    evaluate(def, &timeline, t)
}

fn evaluate(def: &AnimationDefinition, timeline: &Timeline, t: f64) -> AnimatedState {
    if !def.enabled {
        return AnimatedState::identity();
    }
    // Unsupported kinds were warned about when inserted; the per-seek
    // path stays quiet since it runs every scrub frame.
    if matches!(def.kind, AnimationKind::Unsupported { .. }) {
        return AnimatedState::identity();
    }
    let cycle = timeline.cycle_duration();
    if timeline.is_empty() || cycle <= 0.0 {
        return AnimatedState::identity();
    }

    let local = t - def.start_time;
    if local < 0.0 {
        return AnimatedState::identity();
    }

    let cycle_time = match def.repeat {
        Repeat::Infinite => local.rem_euclid(cycle),
        Repeat::Times(n) => {
            let span = cycle * (n as f64 + 1.0);
            if local > span {
                // Past the active span: freeze at the resting state of the
                // final segment.
                return end_state(timeline);
            }
            local.rem_euclid(cycle)
        }
    };

    sample(timeline, cycle_time)
}

/// State at `cycle_time` within one cycle, `0 <= cycle_time <= cycle`.
fn sample(timeline: &Timeline, cycle_time: f64) -> AnimatedState {
    let mut state = AnimatedState::identity();
    let mut acc = 0.0;
    for segment in timeline.segments() {
        let end = acc + segment.duration;
        if cycle_time >= end {
            // Segment fully elapsed: it contributes its end values.
            for tween in &segment.tweens {
                state.set(tween.track, tween.to);
            }
        } else {
            let progress = if segment.duration > 0.0 {
                (cycle_time - acc) / segment.duration
            } else {
                1.0
            };
            let eased = segment.easing.apply(progress);
            for tween in &segment.tweens {
                state.set(tween.track, tween.from + (tween.to - tween.from) * eased);
            }
            return state;
        }
        acc = end;
    }
    state
}

fn end_state(timeline: &Timeline) -> AnimatedState {
    let mut state = AnimatedState::identity();
    for segment in timeline.segments() {
        for tween in &segment.tweens {
            state.set(tween.track, tween.to);
        }
    }
    state
}

/// Holds the current definition set with their compiled timelines.
///
/// Timelines are derived data: every insert or update recompiles, so a
/// stale compilation can never outlive its definition.
#[derive(Debug, Default)]
pub struct AnimationEngine {
    entries: HashMap<Uuid, Entry>,
}

#[derive(Debug)]
struct Entry {
    def: AnimationDefinition,
    timeline: Timeline,
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a definition, rebuilding its timeline.
    pub fn upsert(&mut self, def: AnimationDefinition) {
        if let AnimationKind::Unsupported { raw } = &def.kind {
            warn!(definition = %def.id, kind = %raw, "unsupported animation kind, will evaluate as identity");
        }
        debug!(definition = %def.id, shape = def.shape_id, kind = def.kind.name(), "compiling animation");
        let timeline = Timeline::compile(&def);
        self.entries.insert(def.id, Entry { def, timeline });
    }

    /// Removes a definition. Returns it if it was present.
    pub fn remove(&mut self, id: Uuid) -> Option<AnimationDefinition> {
        self.entries.remove(&id).map(|e| e.def)
    }

    pub fn definition(&self, id: Uuid) -> Option<&AnimationDefinition> {
        self.entries.get(&id).map(|e| &e.def)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &AnimationDefinition> {
        self.entries.values().map(|e| &e.def)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluates one definition at time `t`. An unknown id evaluates to the
    /// identity: a missing animation must not break rendering of the rest.
    pub fn seek(&self, id: Uuid, t: f64) -> AnimatedState {
        match self.entries.get(&id) {
            Some(entry) => evaluate(&entry.def, &entry.timeline, t),
            None => {
                warn!(definition = %id, "seek on unknown animation id");
                AnimatedState::identity()
            }
        }
    }

    /// Evaluates every enabled definition at time `t` and combines the
    /// results per shape.
    pub fn seek_all(&self, t: f64) -> HashMap<u64, AnimatedState> {
        let mut states: HashMap<u64, AnimatedState> = HashMap::new();
        for entry in self.entries.values() {
            if !entry.def.enabled {
                continue;
            }
            let state = evaluate(&entry.def, &entry.timeline, t);
            states
                .entry(entry.def.shape_id)
                .and_modify(|s| *s = s.combine(&state))
                .or_insert(state);
        }
        states
    }
}
