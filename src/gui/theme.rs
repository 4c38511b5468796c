use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct WheelColors {
    pub border: Srgba<f64>,
    pub winner_border: Srgba<f64>,
    pub winner_glow: Srgba<f64>,
    pub winner_overlay: Srgba<f64>,
    pub label: Srgba<f64>,
    pub label_shadow: Srgba<f64>,
    pub winner_label_shadow: Srgba<f64>,
    pub placeholder: Srgba<f64>,
    pub pointer: Srgba<f64>,
    pub pointer_outline: Srgba<f64>,
    pub hub: Srgba<f64>,
    pub hub_dot: Srgba<f64>,
}

impl Default for WheelColors {
    fn default() -> Self {
        Self {
            border: Srgba::new(1.0, 1.0, 1.0, 1.0),
            winner_border: Srgba::new(1.0, 0.843, 0.0, 1.0),
            winner_glow: Srgba::new(1.0, 1.0, 0.0, 1.0),
            winner_overlay: Srgba::new(1.0, 1.0, 1.0, 0.25),
            label: Srgba::new(1.0, 1.0, 1.0, 1.0),
            label_shadow: Srgba::new(0.0, 0.0, 0.0, 0.5),
            winner_label_shadow: Srgba::new(0.0, 0.0, 0.0, 0.8),
            placeholder: Srgba::new(1.0, 1.0, 1.0, 0.8),
            pointer: Srgba::new(0.2, 0.2, 0.2, 1.0),
            pointer_outline: Srgba::new(1.0, 1.0, 1.0, 1.0),
            hub: Srgba::new(1.0, 1.0, 1.0, 1.0),
            hub_dot: Srgba::new(0.2, 0.2, 0.2, 1.0),
        }
    }
}

impl WheelColors {
    /// Pointer and hub follow the GTK theme; wedge styling stays fixed so results read the same
    /// everywhere.
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        let base = Self::default();
        Self {
            pointer: Self::lookup_color(context, "theme_fg_color", base.pointer, Some(1.0)),
            hub_dot: Self::lookup_color(context, "theme_fg_color", base.hub_dot, Some(1.0)),
            hub: Self::lookup_color(context, "theme_base_color", base.hub, Some(1.0)),
            ..base
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.fortuna-spin {
    font-size: 20px;
    font-weight: bold;
    padding: 8px 40px;
    border-radius: 999px;
}
.fortuna-result {
    font-size: 24px;
    font-weight: 800;
}
.fortuna-result-caption {
    font-size: 11px;
    letter-spacing: 2px;
    opacity: 0.6;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
