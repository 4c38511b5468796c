use std::f64::consts::PI;

pub mod geometry;
pub mod model;
pub mod spin;
pub mod view;

pub use geometry::{Point, WheelGeometry, Wedge, winning_index};
pub use model::{ImageAdjust, Sector, SectorContent, SectorId, SpinOutcome, Wheel, WheelFrame};
pub use spin::{Phase, SpinController, SpinTuning};
pub use view::draw;

pub const WHEEL_SIZE: f64 = 500.0;
pub const WHEEL_MARGIN: f64 = 20.0;
pub const POINTER_ANGLE: f64 = 1.5 * PI; // top of the circle, angle zero is 3 o'clock
pub const LABEL_INSET: f64 = 30.0; // label right edge, from the rim
pub const IMAGE_DISTANCE_FACTOR: f64 = 0.55; // image center along the bisector
pub const IMAGE_COVER_FACTOR: f64 = 0.8; // image side relative to the radius
pub const BORDER_WIDTH: f64 = 2.0;
pub const WINNER_BORDER_WIDTH: f64 = 6.0;
pub const GLOW_LAYERS: u32 = 4;
pub const GLOW_SPREAD: f64 = 3.0;
pub const LABEL_FONT_SIZE: f64 = 24.0;
pub const WINNER_LABEL_FONT_SIZE: f64 = 26.0;
pub const PLACEHOLDER_FONT_SIZE: f64 = 20.0;
pub const PLACEHOLDER_GLYPH: &str = "...";
pub const POINTER_HALF_WIDTH: f64 = 20.0;
pub const POINTER_OVERLAP: f64 = 10.0; // tip reaches into the wheel
pub const POINTER_BASE_OFFSET: f64 = 20.0; // base sits above the rim
pub const HUB_RADIUS: f64 = 15.0;
pub const HUB_DOT_RADIUS: f64 = 8.0;
