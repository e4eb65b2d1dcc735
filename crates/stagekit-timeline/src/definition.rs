//! Declarative animation definitions.
//!
//! A definition is a parameter set attached to a shape by id; it carries no
//! playback state. The host creates one when the user applies an animation
//! template and destroys it on removal. Everything derived from it (the
//! compiled [`crate::Timeline`]) is rebuilt whenever the definition changes.

use crate::easing::Easing;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Rotation direction for spin animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Clockwise,
    CounterClockwise,
}

/// Which axis a shake animation offsets along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShakeAxis {
    #[default]
    X,
    Y,
    Both,
}

/// Repeat count for an animation. Serialized as an integer where `-1`
/// means infinite and `n >= 0` means the cycle plays `n + 1` times total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    Infinite,
    Times(u32),
}

impl Repeat {
    pub fn from_count(count: i64) -> Self {
        if count < 0 {
            Repeat::Infinite
        } else {
            Repeat::Times(count as u32)
        }
    }

    pub fn as_count(&self) -> i64 {
        match self {
            Repeat::Infinite => -1,
            Repeat::Times(n) => *n as i64,
        }
    }
}

impl Serialize for Repeat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_count())
    }
}

impl<'de> Deserialize<'de> for Repeat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Repeat::from_count(i64::deserialize(deserializer)?))
    }
}

fn default_one() -> f64 {
    1.0
}

/// Parameters for a spin animation: rotate by `degrees` from the shape's
/// current orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinParams {
    pub degrees: f64,
    #[serde(default)]
    pub direction: Direction,
}

impl Default for SpinParams {
    fn default() -> Self {
        Self {
            degrees: 360.0,
            direction: Direction::Clockwise,
        }
    }
}

/// Parameters for a pulse animation: scale up and back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseParams {
    #[serde(default = "default_one")]
    pub scale_from: f64,
    pub scale_to: f64,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            scale_from: 1.0,
            scale_to: 1.5,
        }
    }
}

/// Parameters for a bounce animation: hop up by `height` and fall back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BounceParams {
    pub height: f64,
}

impl Default for BounceParams {
    fn default() -> Self {
        Self { height: 30.0 }
    }
}

/// Parameters for a fade animation: opacity down and back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeParams {
    #[serde(default = "default_one")]
    pub opacity_from: f64,
    pub opacity_to: f64,
}

impl Default for FadeParams {
    fn default() -> Self {
        Self {
            opacity_from: 1.0,
            opacity_to: 0.3,
        }
    }
}

/// Parameters for a shake animation: small out-and-back offsets along an
/// axis, repeated a structural number of times per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShakeParams {
    #[serde(default)]
    pub axis: ShakeAxis,
    pub distance: f64,
}

impl Default for ShakeParams {
    fn default() -> Self {
        Self {
            axis: ShakeAxis::X,
            distance: 10.0,
        }
    }
}

/// The kind-specific half of an animation definition.
///
/// Deserialization is tolerant: a `kind` tag the engine does not know maps
/// to [`AnimationKind::Unsupported`] rather than an error, so one bad
/// definition cannot break the rest of the scene. The engine evaluates
/// unsupported kinds as the identity transform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnimationKind {
    Spin(SpinParams),
    Pulse(PulseParams),
    Bounce(BounceParams),
    Fade(FadeParams),
    Shake(ShakeParams),
    Unsupported {
        /// The unrecognized kind tag, kept for diagnostics.
        raw: String,
    },
}

impl AnimationKind {
    /// The kind tag as it appears on the wire.
    pub fn name(&self) -> &str {
        match self {
            AnimationKind::Spin(_) => "spin",
            AnimationKind::Pulse(_) => "pulse",
            AnimationKind::Bounce(_) => "bounce",
            AnimationKind::Fade(_) => "fade",
            AnimationKind::Shake(_) => "shake",
            AnimationKind::Unsupported { raw } => raw,
        }
    }
}

impl<'de> Deserialize<'de> for AnimationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = value
            .get("kind")
            .and_then(|k| k.as_str())
            .unwrap_or_default()
            .to_string();
        let parsed = match kind.as_str() {
            "spin" => serde_json::from_value(value).map(AnimationKind::Spin),
            "pulse" => serde_json::from_value(value).map(AnimationKind::Pulse),
            "bounce" => serde_json::from_value(value).map(AnimationKind::Bounce),
            "fade" => serde_json::from_value(value).map(AnimationKind::Fade),
            "shake" => serde_json::from_value(value).map(AnimationKind::Shake),
            _ => return Ok(AnimationKind::Unsupported { raw: kind }),
        };
        parsed.map_err(D::Error::custom)
    }
}

fn default_enabled() -> bool {
    true
}

/// One animation attached to one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationDefinition {
    pub id: Uuid,
    pub shape_id: u64,
    /// Duration of one cycle, in seconds.
    pub duration: f64,
    /// Offset on the global timeline at which the animation begins.
    #[serde(default)]
    pub start_time: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default)]
    pub easing: Easing,
    #[serde(flatten)]
    pub kind: AnimationKind,
}

impl AnimationDefinition {
    /// Creates an enabled definition with a fresh id, starting at time zero.
    pub fn new(shape_id: u64, duration: f64, kind: AnimationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            shape_id,
            duration,
            start_time: 0.0,
            enabled: true,
            repeat: Repeat::Infinite,
            easing: Easing::Linear,
            kind,
        }
    }

    pub fn spin(shape_id: u64, duration: f64, degrees: f64, direction: Direction) -> Self {
        Self::new(
            shape_id,
            duration,
            AnimationKind::Spin(SpinParams { degrees, direction }),
        )
    }

    pub fn pulse(shape_id: u64, duration: f64, scale_from: f64, scale_to: f64) -> Self {
        Self::new(
            shape_id,
            duration,
            AnimationKind::Pulse(PulseParams {
                scale_from,
                scale_to,
            }),
        )
    }

    pub fn bounce(shape_id: u64, duration: f64, height: f64) -> Self {
        Self::new(
            shape_id,
            duration,
            AnimationKind::Bounce(BounceParams { height }),
        )
    }

    pub fn fade(shape_id: u64, duration: f64, opacity_from: f64, opacity_to: f64) -> Self {
        Self::new(
            shape_id,
            duration,
            AnimationKind::Fade(FadeParams {
                opacity_from,
                opacity_to,
            }),
        )
    }

    pub fn shake(shape_id: u64, duration: f64, axis: ShakeAxis, distance: f64) -> Self {
        Self::new(
            shape_id,
            duration,
            AnimationKind::Shake(ShakeParams { axis, distance }),
        )
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}
