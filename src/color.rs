use eframe::egui::Color32;
use palette::{Clamp, Hsl, IntoColor, Lab, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb = rgb.into_format::<u8>();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Diverging "coolwarm" scale for the correlation heatmap
// ---------------------------------------------------------------------------

const COOL: (f32, f32, f32) = (0.230, 0.299, 0.754);
const NEUTRAL: (f32, f32, f32) = (0.865, 0.865, 0.865);
const WARM: (f32, f32, f32) = (0.706, 0.016, 0.150);

/// Colour for a coefficient in [-1, 1]: blue for -1, grey for 0, red for 1.
/// Interpolated in Lab space so the midpoint stays perceptually neutral.
pub fn coolwarm(value: f64) -> Color32 {
    let t = value.clamp(-1.0, 1.0) as f32;
    let lab = |(r, g, b): (f32, f32, f32)| -> Lab { Srgb::new(r, g, b).into_color() };
    let mixed = if t < 0.0 {
        lab(NEUTRAL).mix(lab(COOL), -t)
    } else {
        lab(NEUTRAL).mix(lab(WARM), t)
    };
    let rgb: Srgb = mixed.into_color();
    to_color32(rgb.clamp())
}

// ---------------------------------------------------------------------------
// Color mapping: scatter group label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of scatter groups to distinct colours, in group order.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: Vec<(Option<String>, Color32)>,
    default_color: Color32,
}

impl ColorMap {
    /// One colour per labelled group; unlabelled groups are grey.
    pub fn new<'a>(labels: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let labels: Vec<Option<String>> = labels.into_iter().map(|l| l.map(str::to_string)).collect();
        let labelled = labels.iter().filter(|l| l.is_some()).count();
        let mut palette = generate_palette(labelled).into_iter();
        let mapping = labels
            .into_iter()
            .map(|label| {
                let color = match label {
                    Some(_) => palette.next().unwrap_or(Color32::GRAY),
                    None => Color32::GRAY,
                };
                (label, color)
            })
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    /// Look up the colour for a given group label.
    pub fn color_for(&self, label: Option<&str>) -> Color32 {
        if self.mapping.len() == 1 {
            return self.default_color;
        }
        self.mapping
            .iter()
            .find(|(l, _)| l.as_deref() == label)
            .map(|(_, c)| *c)
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert_ne!(colors[i], colors[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn coolwarm_ends_are_blue_and_red() {
        let cold = coolwarm(-1.0);
        let hot = coolwarm(1.0);
        assert!(cold.b() > cold.r());
        assert!(hot.r() > hot.b());
        let mid = coolwarm(0.0);
        assert!(mid.r().abs_diff(mid.b()) < 8);
    }

    #[test]
    fn unlabelled_group_is_grey() {
        let map = ColorMap::new([Some("a"), Some("b"), None]);
        assert_eq!(map.color_for(None), Color32::GRAY);
        assert_ne!(map.color_for(Some("a")), map.color_for(Some("b")));
    }
}
