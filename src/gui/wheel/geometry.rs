use super::{IMAGE_COVER_FACTOR, IMAGE_DISTANCE_FACTOR, LABEL_INSET, POINTER_ANGLE, WHEEL_MARGIN};
use crate::gui::wheel::model::ImageAdjust;
use std::f64::consts::{FRAC_PI_2, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `distance` from the origin along `angle` (radians, zero at 3 o'clock).
    pub fn polar(angle: f64, distance: f64) -> Self {
        Self::new(angle.cos() * distance, angle.sin() * distance)
    }
}

/// Canvas-level measurements of the wheel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelGeometry {
    pub size: f64,
    pub center: Point,
    pub radius: f64,
}

impl WheelGeometry {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            center: Point::new(size / 2.0, size / 2.0),
            radius: size / 2.0 - WHEEL_MARGIN,
        }
    }

    /// Right edge of a label, measured from the center along the bisector.
    pub fn label_anchor(&self) -> f64 {
        self.radius - LABEL_INSET
    }
}

pub fn slice_angle(count: usize) -> Option<f64> {
    (count > 0).then(|| TAU / count as f64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wedge {
    pub index: usize,
    pub start: f64,
    pub end: f64,
}

impl Wedge {
    pub fn new(index: usize, count: usize) -> Option<Self> {
        let slice = slice_angle(count)?;
        (index < count).then(|| Self {
            index,
            start: index as f64 * slice,
            end: (index + 1) as f64 * slice,
        })
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn bisector(&self) -> f64 {
        self.start + self.width() / 2.0
    }
}

/// Wedges in the wheel's local frame, before rotation. They tile `[0, 2π)`.
pub fn wedges(count: usize) -> impl Iterator<Item = Wedge> {
    (0..count).filter_map(move |i| Wedge::new(i, count))
}

/// Angle on the unrotated wheel that currently sits under the pointer.
pub fn pointer_angle_on_wheel(rotation: f64) -> f64 {
    (POINTER_ANGLE - rotation.rem_euclid(TAU)).rem_euclid(TAU)
}

/// Index of the wedge under the pointer for a given cumulative rotation.
///
/// Both the spin controller and the renderer go through this function so the reported winner
/// always matches the highlighted wedge. Floating point can land exactly on `2π`, hence the
/// clamp instead of an error.
pub fn winning_index(rotation: f64, count: usize) -> Option<usize> {
    let slice = slice_angle(count)?;
    let index = (pointer_angle_on_wheel(rotation) / slice).floor();
    if index.is_nan() {
        return Some(0);
    }
    Some((index.max(0.0) as usize).min(count - 1))
}

/// Transform applied to an image inside its wedge, in the wheel's rotated frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    pub anchor: Point,
    pub rotation: f64,
    pub offset: Point,
    pub side: f64,
}

impl ImagePlacement {
    pub fn new(wedge: &Wedge, radius: f64, adjust: &ImageAdjust) -> Self {
        let bisector = wedge.bisector();
        Self {
            anchor: Point::polar(bisector, radius * IMAGE_DISTANCE_FACTOR),
            rotation: bisector + FRAC_PI_2 + adjust.rotation_degrees.to_radians(),
            offset: Point::new(adjust.offset_x, adjust.offset_y),
            side: radius * IMAGE_COVER_FACTOR * adjust.scale,
        }
    }
}
