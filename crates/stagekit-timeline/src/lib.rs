//! # StageKit Timeline
//!
//! The animation half of StageKit: declarative animation definitions
//! (spin, pulse, bounce, fade, shake), the timelines they compile to, a
//! pure seek engine, and the scrubber that maps timeline-strip pixels to
//! playhead time.
//!
//! The engine deliberately has no playhead of its own. Evaluating an
//! animation at time `t` is a pure function of `(definition, t)`, so
//! scrubbing backward is exactly as cheap and correct as scrubbing
//! forward, and two seeks to the same time always agree.

pub mod definition;
pub mod easing;
pub mod engine;
pub mod scrubber;
pub mod timeline;

pub use definition::{
    AnimationDefinition, AnimationKind, BounceParams, Direction, FadeParams, PulseParams, Repeat,
    ShakeAxis, ShakeParams, SpinParams,
};
pub use easing::Easing;
pub use engine::{seek_definition, AnimatedState, AnimationEngine};
pub use scrubber::TimelineScrubber;
pub use timeline::{Segment, Timeline, Track, TrackTween};
