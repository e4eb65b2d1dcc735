//! Editor-wide constants.

/// Minimum width/height for a free shape, in world units.
pub const MIN_SHAPE_SIZE: f64 = 5.0;

/// Minimum width/height for a layer container.
pub const MIN_LAYER_SIZE: f64 = 50.0;

/// Stage view scale clamp.
pub const MIN_VIEW_SCALE: f64 = 0.1;
pub const MAX_VIEW_SCALE: f64 = 10.0;

/// Timeline strip zoom clamp.
pub const MIN_TIMELINE_ZOOM: f64 = 1.0;
pub const MAX_TIMELINE_ZOOM: f64 = 20.0;

/// Negative pan allowance on the timeline strip when zoomed in, in pixels.
pub const TIMELINE_PAN_ALLOWANCE: f64 = 80.0;

/// Default duration of a newly created layer, in seconds.
pub const DEFAULT_LAYER_DURATION: f64 = 5.0;

/// Number of out-and-back offset pairs a shake animation compiles to.
/// The shake's internal repeat is structural; the definition's own
/// `repeat` field loops the whole group.
pub const SHAKE_CYCLES: u32 = 8;
