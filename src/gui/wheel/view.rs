use super::geometry::{ImagePlacement, Wedge, WheelGeometry};
use super::model::{Sector, SectorContent, WheelFrame};
use super::{
    BORDER_WIDTH, GLOW_LAYERS, GLOW_SPREAD, HUB_DOT_RADIUS, HUB_RADIUS, LABEL_FONT_SIZE,
    PLACEHOLDER_FONT_SIZE, PLACEHOLDER_GLYPH, POINTER_BASE_OFFSET, POINTER_HALF_WIDTH,
    POINTER_OVERLAP, WHEEL_SIZE, WINNER_BORDER_WIDTH, WINNER_LABEL_FONT_SIZE,
};
use crate::gui::images::ImageCache;
use crate::gui::theme::WheelColors;
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use palette::Srgba;
use std::f64::consts::TAU;

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

fn wedge_path(cr: &Context, radius: f64, wedge: &Wedge) {
    cr.new_path();
    cr.move_to(0.0, 0.0);
    cr.arc(0.0, 0.0, radius, wedge.start, wedge.end);
    cr.close_path();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WedgeState {
    Plain,
    Winner,
}

struct LabelStyle {
    size: f64,
    color: Srgba<f64>,
    shadow: Srgba<f64>,
    shadow_spread: f64,
}

impl WedgeState {
    fn label_style(&self, colors: &WheelColors) -> LabelStyle {
        match self {
            Self::Plain => LabelStyle {
                size: LABEL_FONT_SIZE,
                color: colors.label,
                shadow: colors.label_shadow,
                shadow_spread: 1.0,
            },
            Self::Winner => LabelStyle {
                size: WINNER_LABEL_FONT_SIZE,
                color: colors.label,
                shadow: colors.winner_label_shadow,
                shadow_spread: 2.0,
            },
        }
    }
}

/// Placeholder for images that are not decoded (yet).
fn placeholder_style(colors: &WheelColors) -> LabelStyle {
    LabelStyle {
        size: PLACEHOLDER_FONT_SIZE,
        color: colors.placeholder,
        shadow: Srgba::new(0.0, 0.0, 0.0, 0.0),
        shadow_spread: 0.0,
    }
}

/// Order in which wedges are painted. The highlighted wedge goes last so its border sits on
/// top of both neighbours.
fn draw_order(count: usize, highlighted: Option<usize>) -> Vec<(usize, WedgeState)> {
    let mut order: Vec<_> = (0..count)
        .filter(|&i| Some(i) != highlighted)
        .map(|i| (i, WedgeState::Plain))
        .collect();
    if let Some(winner) = highlighted.filter(|&i| i < count) {
        order.push((winner, WedgeState::Winner));
    }
    order
}

struct WedgeRenderer<'a> {
    sector: &'a Sector,
    wedge: Wedge,
    geometry: &'a WheelGeometry,
    state: WedgeState,
    image: Option<&'a Pixbuf>,
}

impl<'a> WedgeRenderer<'a> {
    fn new(
        sector: &'a Sector,
        wedge: Wedge,
        geometry: &'a WheelGeometry,
        state: WedgeState,
        image: Option<&'a Pixbuf>,
    ) -> Self {
        Self {
            sector,
            wedge,
            geometry,
            state,
            image,
        }
    }

    fn draw(&self, cr: &Context, colors: &WheelColors) -> Result<(), cairo::Error> {
        cr.save()?;
        self.draw_background(cr)?;
        self.draw_border(cr, colors)?;

        cr.save()?;
        wedge_path(cr, self.geometry.radius, &self.wedge);
        cr.clip();
        self.draw_content(cr, colors)?;
        cr.restore()?;

        if self.state == WedgeState::Winner {
            wedge_path(cr, self.geometry.radius, &self.wedge);
            set_source(cr, colors.winner_overlay);
            cr.fill()?;
        }
        cr.restore()
    }

    fn draw_background(&self, cr: &Context) -> Result<(), cairo::Error> {
        wedge_path(cr, self.geometry.radius, &self.wedge);
        set_source(cr, self.sector.color);
        cr.fill()
    }

    fn draw_border(&self, cr: &Context, colors: &WheelColors) -> Result<(), cairo::Error> {
        wedge_path(cr, self.geometry.radius, &self.wedge);
        cr.set_line_join(cairo::LineJoin::Round);
        match self.state {
            WedgeState::Plain => {
                set_source(cr, colors.border);
                cr.set_line_width(BORDER_WIDTH);
            }
            WedgeState::Winner => {
                // widest and faintest first
                let (r, g, b, a) = colors.winner_glow.into_components();
                for layer in (1..=GLOW_LAYERS).rev() {
                    cr.set_source_rgba(r, g, b, a / (GLOW_LAYERS + 1) as f64);
                    cr.set_line_width(WINNER_BORDER_WIDTH + 2.0 * GLOW_SPREAD * layer as f64);
                    cr.stroke_preserve()?;
                }
                set_source(cr, colors.winner_border);
                cr.set_line_width(WINNER_BORDER_WIDTH);
            }
        }
        cr.stroke()
    }

    fn draw_content(&self, cr: &Context, colors: &WheelColors) -> Result<(), cairo::Error> {
        match (&self.sector.content, self.image) {
            (SectorContent::Text(label), _) => {
                self.draw_label(cr, label, &self.state.label_style(colors))
            }
            (SectorContent::Image(_), Some(pixbuf)) => self.draw_image(cr, pixbuf),
            (SectorContent::Image(_), None) => {
                self.draw_label(cr, PLACEHOLDER_GLYPH, &placeholder_style(colors))
            }
        }
    }

    /// Right-aligned against the rim, reading outward along the bisector.
    fn draw_label(
        &self,
        cr: &Context,
        text: &str,
        style: &LabelStyle,
    ) -> Result<(), cairo::Error> {
        if text.is_empty() {
            return Ok(());
        }
        cr.rotate(self.wedge.bisector());
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(style.size);

        let ext = cr.text_extents(text)?;
        let x = self.geometry.label_anchor() - ext.x_advance();
        let y = -(ext.y_bearing() + ext.height() / 2.0);

        if style.shadow_spread > 0.0 {
            let (r, g, b, a) = style.shadow.into_components();
            cr.set_source_rgba(r, g, b, a / 2.0);
            let s = style.shadow_spread;
            for (dx, dy) in [(-s, -s), (s, -s), (-s, s), (s, s)] {
                cr.move_to(x + dx, y + dy);
                cr.show_text(text)?;
            }
        }

        set_source(cr, style.color);
        cr.move_to(x, y);
        cr.show_text(text)
    }

    fn draw_image(&self, cr: &Context, pixbuf: &Pixbuf) -> Result<(), cairo::Error> {
        let placement = ImagePlacement::new(&self.wedge, self.geometry.radius, &self.sector.adjust);
        let (w, h) = (pixbuf.width() as f64, pixbuf.height() as f64);
        // a zero or negative side would leave the context with a singular matrix
        if !(placement.side > 0.0 && w > 0.0 && h > 0.0) {
            return Ok(());
        }

        cr.translate(placement.anchor.x, placement.anchor.y);
        cr.rotate(placement.rotation);
        cr.translate(placement.offset.x, placement.offset.y);
        cr.translate(-placement.side / 2.0, -placement.side / 2.0);
        cr.scale(placement.side / w, placement.side / h);
        cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
        cr.paint()
    }
}

/// Draws one frame. Output depends only on the arguments.
pub fn draw(
    cr: &Context,
    frame: &WheelFrame,
    images: &ImageCache<Pixbuf>,
    colors: &WheelColors,
) -> Result<(), cairo::Error> {
    let geometry = WheelGeometry::new(WHEEL_SIZE);
    clear(cr)?;

    let count = frame.sectors.len();
    if count == 0 {
        return Ok(());
    }

    cr.save()?;
    cr.translate(geometry.center.x, geometry.center.y);
    cr.rotate(frame.rotation);

    for (index, state) in draw_order(count, frame.highlighted_index()) {
        let sector = &frame.sectors[index];
        if let Some(wedge) = Wedge::new(index, count) {
            let image = sector.image_id().and_then(|id| images.get(id));
            WedgeRenderer::new(sector, wedge, &geometry, state, image).draw(cr, colors)?;
        }
    }
    cr.restore()?;

    draw_pointer(cr, &geometry, colors)?;
    draw_hub(cr, &geometry, colors)
}

fn clear(cr: &Context) -> Result<(), cairo::Error> {
    cr.save()?;
    cr.set_operator(cairo::Operator::Clear);
    cr.paint()?;
    cr.restore()
}

fn draw_pointer(
    cr: &Context,
    geometry: &WheelGeometry,
    colors: &WheelColors,
) -> Result<(), cairo::Error> {
    let (cx, cy, radius) = (geometry.center.x, geometry.center.y, geometry.radius);
    let base = cy - radius - POINTER_BASE_OFFSET;

    cr.new_path();
    cr.move_to(cx, cy - radius + POINTER_OVERLAP);
    cr.line_to(cx - POINTER_HALF_WIDTH, base);
    cr.line_to(cx + POINTER_HALF_WIDTH, base);
    cr.close_path();
    set_source(cr, colors.pointer);
    cr.fill_preserve()?;
    set_source(cr, colors.pointer_outline);
    cr.set_line_width(BORDER_WIDTH);
    cr.stroke()
}

fn draw_hub(
    cr: &Context,
    geometry: &WheelGeometry,
    colors: &WheelColors,
) -> Result<(), cairo::Error> {
    let center = geometry.center;
    cr.new_path();
    cr.arc(center.x, center.y, HUB_RADIUS, 0.0, TAU);
    set_source(cr, colors.hub);
    cr.fill()?;

    cr.arc(center.x, center.y, HUB_DOT_RADIUS, 0.0, TAU);
    set_source(cr, colors.hub_dot);
    cr.fill()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::images::{ImageId, ImageLoader};
    use crate::gui::wheel::ImageAdjust;
    use gdk_pixbuf::Colorspace;
    use std::f64::consts::{FRAC_PI_4, PI};

    struct NoopLoader;

    impl ImageLoader for NoopLoader {
        fn load(&self, _id: &ImageId) {}
    }

    const RED: Srgba<f64> = Srgba::new(1.0, 0.0, 0.0, 1.0);
    const GREEN: Srgba<f64> = Srgba::new(0.0, 1.0, 0.0, 1.0);
    const BLUE: Srgba<f64> = Srgba::new(0.0, 0.0, 1.0, 1.0);
    const BLACK: Srgba<f64> = Srgba::new(0.0, 0.0, 0.0, 1.0);

    struct Rendered {
        stride: usize,
        data: Vec<u8>,
    }

    impl Rendered {
        /// (red, green, blue, alpha); ARGB32 is stored native-endian.
        fn pixel(&self, x: usize, y: usize) -> (u8, u8, u8, u8) {
            let offset = y * self.stride + x * 4;
            let px = u32::from_ne_bytes(self.data[offset..offset + 4].try_into().unwrap());
            (
                (px >> 16) as u8,
                (px >> 8) as u8,
                px as u8,
                (px >> 24) as u8,
            )
        }
    }

    fn render(frame: &WheelFrame, images: &ImageCache<Pixbuf>) -> Rendered {
        let size = WHEEL_SIZE as i32;
        let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, size, size).unwrap();
        {
            let cr = Context::new(&surface).unwrap();
            draw(&cr, frame, images, &WheelColors::default()).unwrap();
        }
        surface.flush();
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap().to_vec();
        Rendered { stride, data }
    }

    fn quad() -> Vec<Sector> {
        vec![
            Sector::text("0", "", RED),
            Sector::text("1", "", GREEN),
            Sector::text("2", "", BLUE),
            Sector::text("3", "", BLACK),
        ]
    }

    #[test]
    fn test_draw_order_puts_winner_last() {
        let order = draw_order(5, Some(2));
        let indices: Vec<_> = order.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 3, 4, 2]);
        assert_eq!(order.last().unwrap().1, WedgeState::Winner);
        assert!(order[..4].iter().all(|(_, s)| *s == WedgeState::Plain));
    }

    #[test]
    fn test_draw_order_without_highlight() {
        let order = draw_order(3, None);
        assert_eq!(
            order,
            vec![
                (0, WedgeState::Plain),
                (1, WedgeState::Plain),
                (2, WedgeState::Plain)
            ]
        );
        assert!(
            draw_order(3, Some(7))
                .iter()
                .all(|(_, s)| *s == WedgeState::Plain)
        );
    }

    #[test]
    fn test_winner_label_style_is_distinct() {
        let colors = WheelColors::default();
        let plain = WedgeState::Plain.label_style(&colors);
        let winner = WedgeState::Winner.label_style(&colors);

        assert!(winner.size > plain.size);
        assert!(winner.shadow_spread > plain.shadow_spread);
        assert!(winner.shadow.alpha > plain.shadow.alpha);
    }

    #[test]
    fn test_winner_label_renders_larger() {
        let mut sectors = quad();
        sectors[2] = Sector::text("2", "Pizza", BLUE);
        let mut frame = WheelFrame {
            rotation: FRAC_PI_4,
            sectors: &sectors,
            highlight: false,
        };

        // wedge 2 points up; its label runs from the rim toward the hub along x = 250
        let label_pixels = |out: &Rendered| {
            let background = out.pixel(250, 170);
            (40..135)
                .flat_map(|y| (225..276).map(move |x| (x, y)))
                .filter(|&(x, y)| out.pixel(x, y) != background)
                .count()
        };

        let plain = render(&frame, &ImageCache::new());
        assert_eq!(plain.pixel(250, 170), (0, 0, 255, 255));
        let plain_count = label_pixels(&plain);

        frame.highlight = true;
        let lit = render(&frame, &ImageCache::new());
        assert_ne!(lit.pixel(250, 170), (0, 0, 255, 255));
        let lit_count = label_pixels(&lit);

        assert!(plain_count > 0);
        assert!(lit_count > plain_count, "{lit_count} <= {plain_count}");
    }

    #[test]
    fn test_empty_wheel_draws_nothing() {
        let frame = WheelFrame {
            rotation: 1.0,
            sectors: &[],
            highlight: true,
        };
        let out = render(&frame, &ImageCache::new());
        assert!(out.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_draw_is_idempotent() {
        let sectors = vec![
            Sector::text("a", "Pizza", RED),
            Sector::text("b", "Burger", GREEN),
            Sector::image("c", "missing.png", BLUE),
        ];
        let frame = WheelFrame {
            rotation: 2.3,
            sectors: &sectors,
            highlight: true,
        };
        let images = ImageCache::new();
        assert_eq!(render(&frame, &images).data, render(&frame, &images).data);
    }

    #[test]
    fn test_winner_under_pointer_is_lightened() {
        let sectors = quad();
        // pointer sits in the middle of wedge 2
        let mut frame = WheelFrame {
            rotation: FRAC_PI_4,
            sectors: &sectors,
            highlight: false,
        };
        assert_eq!(frame.pointer_index(), Some(2));

        let plain = render(&frame, &ImageCache::new());
        assert_eq!(plain.pixel(250, 130), (0, 0, 255, 255));

        frame.highlight = true;
        let lit = render(&frame, &ImageCache::new());
        let (r, g, b, a) = lit.pixel(250, 130);
        assert!((60..=68).contains(&r), "red {r}");
        assert!((60..=68).contains(&g), "green {g}");
        assert_eq!((b, a), (255, 255));

        // wedge 0 is straight down and untouched either way
        assert_eq!(plain.pixel(250, 370), (255, 0, 0, 255));
        assert_eq!(lit.pixel(250, 370), (255, 0, 0, 255));
    }

    #[test]
    fn test_pointer_and_hub_are_fixed() {
        let sectors = quad();
        for rotation in [0.3, PI, 17.0] {
            let frame = WheelFrame {
                rotation,
                sectors: &sectors,
                highlight: false,
            };
            let out = render(&frame, &ImageCache::new());
            assert_eq!(out.pixel(250, 10), (51, 51, 51, 255));
            assert_eq!(out.pixel(250, 250), (51, 51, 51, 255));
            assert_eq!(out.pixel(250, 240), (255, 255, 255, 255));
        }
    }

    #[test]
    fn test_loaded_image_replaces_placeholder() {
        let mut sectors = quad();
        sectors[0] = Sector::image("img", "green.png", RED);
        let frame = WheelFrame {
            rotation: 0.0,
            sectors: &sectors,
            highlight: false,
        };

        let mut images = ImageCache::new();
        let pending = render(&frame, &images);
        // image center: bisector of wedge 0 at 55% of the radius
        assert_eq!(pending.pixel(339, 339), (255, 0, 0, 255));

        let pixbuf = Pixbuf::new(Colorspace::Rgb, true, 8, 4, 4).unwrap();
        pixbuf.fill(0x00ff_00ff);
        let id = ImageId::new("green.png");
        images.request(&id, &NoopLoader);
        assert!(images.complete(id, pixbuf));

        let loaded = render(&frame, &images);
        assert_eq!(loaded.pixel(339, 339), (0, 255, 0, 255));
    }

    #[test]
    fn test_zero_scale_image_is_skipped() {
        let mut sectors = quad();
        sectors[0] = Sector::image("img", "green.png", RED).with_adjust(ImageAdjust {
            scale: 0.0,
            ..Default::default()
        });
        let frame = WheelFrame {
            rotation: 0.0,
            sectors: &sectors,
            highlight: true,
        };

        let pixbuf = Pixbuf::new(Colorspace::Rgb, true, 8, 4, 4).unwrap();
        pixbuf.fill(0x00ff_00ff);
        let mut images = ImageCache::new();
        let id = ImageId::new("green.png");
        images.request(&id, &NoopLoader);
        images.complete(id, pixbuf);

        let out = render(&frame, &images);
        assert_eq!(out.pixel(339, 339), (255, 0, 0, 255));
        // later wedges still render
        assert_eq!(out.pixel(161, 339), (0, 255, 0, 255));
    }
}
