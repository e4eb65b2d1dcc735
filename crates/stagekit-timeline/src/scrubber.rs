//! The timeline strip: mapping pixels to playhead time under zoom and pan.

use stagekit_core::constants::{MAX_TIMELINE_ZOOM, MIN_TIMELINE_ZOOM, TIMELINE_PAN_ALLOWANCE};
use tracing::debug;

/// A zoomable, pannable horizontal strip mapping pixel positions to time.
///
/// `time = (pixel + pan_offset) / zoom / width * total_duration`, with the
/// pixel-space inverse used to place the playhead marker. Every scrub or
/// click updates the playhead; the host then re-seeks all enabled
/// animations at the new time.
#[derive(Debug, Clone)]
pub struct TimelineScrubber {
    width_px: f64,
    total_duration: f64,
    zoom: f64,
    pan_offset: f64,
    playhead: f64,
}

impl TimelineScrubber {
    pub fn new(width_px: f64, total_duration: f64) -> Self {
        Self {
            width_px: width_px.max(1.0),
            total_duration: total_duration.max(0.0),
            zoom: 1.0,
            pan_offset: 0.0,
            playhead: 0.0,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan_offset(&self) -> f64 {
        self.pan_offset
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Updates the total duration (e.g. when the layer's duration changes)
    /// and keeps the playhead inside the new range.
    pub fn set_total_duration(&mut self, total_duration: f64) {
        self.total_duration = total_duration.max(0.0);
        self.playhead = self.playhead.clamp(0.0, self.total_duration);
        self.clamp_pan();
    }

    /// Updates the strip width (host resize).
    pub fn set_width(&mut self, width_px: f64) {
        self.width_px = width_px.max(1.0);
        self.clamp_pan();
    }

    /// The time at a strip pixel, clamped into `[0, total_duration]`.
    pub fn time_at(&self, pixel_x: f64) -> f64 {
        if self.total_duration <= 0.0 {
            return 0.0;
        }
        self.raw_time_at(pixel_x).clamp(0.0, self.total_duration)
    }

    // Unclamped pixel-to-time mapping, used where the math must follow
    // the pointer even outside the strip's mapped range.
    fn raw_time_at(&self, pixel_x: f64) -> f64 {
        (pixel_x + self.pan_offset) / self.zoom / self.width_px * self.total_duration
    }

    /// The strip pixel of a time value. Exact inverse of [`Self::time_at`]
    /// for in-range times.
    pub fn pixel_at(&self, time: f64) -> f64 {
        if self.total_duration <= 0.0 {
            return 0.0;
        }
        time / self.total_duration * self.width_px * self.zoom - self.pan_offset
    }

    /// Scrub or click: moves the playhead to the time under `pixel_x` and
    /// returns it.
    pub fn scrub_to(&mut self, pixel_x: f64) -> f64 {
        self.playhead = self.time_at(pixel_x);
        self.playhead
    }

    /// Zooms around `pixel_x`, keeping the time under the pointer fixed.
    pub fn zoom_at(&mut self, pixel_x: f64, new_zoom: f64) {
        let new_zoom = new_zoom.clamp(MIN_TIMELINE_ZOOM, MAX_TIMELINE_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.raw_time_at(pixel_x);
        self.zoom = new_zoom;
        if self.total_duration > 0.0 {
            self.pan_offset =
                anchor / self.total_duration * self.width_px * self.zoom - pixel_x;
        }
        self.clamp_pan();
        debug!(zoom = self.zoom, pan = self.pan_offset, "timeline zoom");
    }

    /// Pans the strip by a pixel delta.
    pub fn pan_by(&mut self, delta_px: f64) {
        self.pan_offset += delta_px;
        self.clamp_pan();
    }

    // Keeps the visible range anchored. At zoom <= 1 the whole strip fits,
    // so t = 0 may never scroll past the left edge; zoomed in, a small
    // negative allowance is permitted.
    fn clamp_pan(&mut self) {
        let overflow = self.width_px * self.zoom - self.width_px;
        if self.zoom <= 1.0 {
            self.pan_offset = self.pan_offset.clamp(overflow.min(0.0), 0.0);
        } else {
            self.pan_offset = self.pan_offset.clamp(-TIMELINE_PAN_ALLOWANCE, overflow);
        }
    }
}
