//! Compiled timelines: the segment sequences animation definitions reduce to.

use crate::definition::{AnimationDefinition, AnimationKind, Direction, ShakeAxis};
use crate::easing::Easing;
use smallvec::{smallvec, SmallVec};
use stagekit_core::constants::SHAKE_CYCLES;

/// A property an animation can drive. Rotation and the offsets are deltas
/// applied on top of the shape's authored attributes; scale and opacity are
/// absolute factors with identity 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Rotation,
    Scale,
    OffsetX,
    OffsetY,
    Opacity,
}

/// One property interpolation within a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackTween {
    pub track: Track,
    pub from: f64,
    pub to: f64,
}

/// One continuous tween over a span of the cycle. A segment may drive more
/// than one track at once (a shake along both axes moves x and y together).
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub duration: f64,
    pub easing: Easing,
    pub tweens: SmallVec<[TrackTween; 2]>,
}

impl Segment {
    fn single(track: Track, from: f64, to: f64, duration: f64, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            tweens: smallvec![TrackTween { track, from, to }],
        }
    }
}

/// An ordered sequence of tween segments derived from one definition.
///
/// A timeline has no identity of its own beyond the owning definition's id;
/// it is rebuilt whenever that definition changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    /// Compiles a definition into its segment sequence.
    ///
    /// Unsupported kinds and non-positive durations compile to an empty
    /// timeline, which the engine evaluates as the identity transform.
    pub fn compile(def: &AnimationDefinition) -> Timeline {
        if def.duration <= 0.0 {
            return Timeline::default();
        }
        let d = def.duration;
        let segments = match &def.kind {
            AnimationKind::Spin(p) => {
                let degrees = match p.direction {
                    Direction::Clockwise => p.degrees,
                    Direction::CounterClockwise => -p.degrees,
                };
                vec![Segment::single(Track::Rotation, 0.0, degrees, d, def.easing)]
            }
            AnimationKind::Pulse(p) => vec![
                Segment::single(Track::Scale, p.scale_from, p.scale_to, d / 2.0, def.easing),
                Segment::single(Track::Scale, p.scale_to, p.scale_from, d / 2.0, def.easing),
            ],
            AnimationKind::Bounce(p) => {
                // Up eases out; the fall lands with a bounce unless the
                // definition asks for a specific curve.
                let fall = match def.easing {
                    Easing::Linear => Easing::BounceOut,
                    other => other,
                };
                vec![
                    Segment::single(Track::OffsetY, 0.0, -p.height, d / 2.0, Easing::EaseOut),
                    Segment::single(Track::OffsetY, -p.height, 0.0, d / 2.0, fall),
                ]
            }
            AnimationKind::Fade(p) => vec![
                Segment::single(
                    Track::Opacity,
                    p.opacity_from,
                    p.opacity_to,
                    d / 2.0,
                    def.easing,
                ),
                Segment::single(
                    Track::Opacity,
                    p.opacity_to,
                    p.opacity_from,
                    d / 2.0,
                    def.easing,
                ),
            ],
            AnimationKind::Shake(p) => {
                // The per-cycle shake count is structural; the definition's
                // `repeat` field loops the whole group of shakes.
                let pair_count = SHAKE_CYCLES as usize;
                let seg_duration = d / (pair_count as f64 * 2.0);
                let mut segments = Vec::with_capacity(pair_count * 2);
                for _ in 0..pair_count {
                    segments.push(shake_segment(p.axis, 0.0, p.distance, seg_duration));
                    segments.push(shake_segment(p.axis, p.distance, 0.0, seg_duration));
                }
                segments
            }
            AnimationKind::Unsupported { .. } => Vec::new(),
        };
        Timeline { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total duration of one cycle: the sum of segment durations.
    pub fn cycle_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }
}

fn shake_segment(axis: ShakeAxis, from: f64, to: f64, duration: f64) -> Segment {
    let tweens: SmallVec<[TrackTween; 2]> = match axis {
        ShakeAxis::X => smallvec![TrackTween {
            track: Track::OffsetX,
            from,
            to
        }],
        ShakeAxis::Y => smallvec![TrackTween {
            track: Track::OffsetY,
            from,
            to
        }],
        ShakeAxis::Both => smallvec![
            TrackTween {
                track: Track::OffsetX,
                from,
                to
            },
            TrackTween {
                track: Track::OffsetY,
                from,
                to
            },
        ],
    };
    Segment {
        duration,
        easing: Easing::Linear,
        tweens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AnimationDefinition;

    #[test]
    fn spin_compiles_to_one_segment() {
        let def = AnimationDefinition::spin(1, 2.0, 360.0, Direction::Clockwise);
        let tl = Timeline::compile(&def);
        assert_eq!(tl.segments().len(), 1);
        assert_eq!(tl.cycle_duration(), 2.0);
        assert_eq!(tl.segments()[0].tweens[0].to, 360.0);
    }

    #[test]
    fn counter_clockwise_spin_negates_degrees() {
        let def = AnimationDefinition::spin(1, 2.0, 90.0, Direction::CounterClockwise);
        let tl = Timeline::compile(&def);
        assert_eq!(tl.segments()[0].tweens[0].to, -90.0);
    }

    #[test]
    fn pulse_splits_duration_in_half() {
        let def = AnimationDefinition::pulse(1, 3.0, 1.0, 1.4);
        let tl = Timeline::compile(&def);
        assert_eq!(tl.segments().len(), 2);
        assert_eq!(tl.segments()[0].duration, 1.5);
        assert_eq!(tl.segments()[1].duration, 1.5);
        assert_eq!(tl.cycle_duration(), 3.0);
    }

    #[test]
    fn shake_cycle_count_is_structural() {
        let def = AnimationDefinition::shake(1, 1.6, ShakeAxis::X, 8.0);
        let tl = Timeline::compile(&def);
        assert_eq!(tl.segments().len(), SHAKE_CYCLES as usize * 2);
        assert!((tl.cycle_duration() - 1.6).abs() < 1e-9);
    }

    #[test]
    fn shake_both_axes_moves_two_tracks() {
        let def = AnimationDefinition::shake(1, 1.0, ShakeAxis::Both, 5.0);
        let tl = Timeline::compile(&def);
        assert_eq!(tl.segments()[0].tweens.len(), 2);
    }

    #[test]
    fn unsupported_or_degenerate_compiles_empty() {
        let mut def = AnimationDefinition::spin(1, 2.0, 360.0, Direction::Clockwise);
        def.kind = AnimationKind::Unsupported {
            raw: "wobble".to_string(),
        };
        assert!(Timeline::compile(&def).is_empty());

        let zero = AnimationDefinition::fade(1, 0.0, 1.0, 0.5);
        assert!(Timeline::compile(&zero).is_empty());
    }
}
