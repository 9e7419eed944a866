use eframe::egui::Color32;

/// First letters of up to two words, uppercased. Stands in for the avatar
/// images the source datasets reference by URL.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Assigns palette colors to keys in first-seen order, cycling when the
/// palette is exhausted.
pub struct OrdinalColors {
    palette: Vec<Color32>,
    assigned: Vec<String>,
}

impl OrdinalColors {
    pub fn new(palette: Vec<Color32>) -> Self {
        Self {
            palette,
            assigned: Vec::new(),
        }
    }

    pub fn category10() -> Self {
        Self::new(vec![
            Color32::from_rgb(0x1f, 0x77, 0xb4),
            Color32::from_rgb(0xff, 0x7f, 0x0e),
            Color32::from_rgb(0x2c, 0xa0, 0x2c),
            Color32::from_rgb(0xd6, 0x27, 0x28),
            Color32::from_rgb(0x94, 0x67, 0xbd),
            Color32::from_rgb(0x8c, 0x56, 0x4b),
            Color32::from_rgb(0xe3, 0x77, 0xc2),
            Color32::from_rgb(0x7f, 0x7f, 0x7f),
            Color32::from_rgb(0xbc, 0xbd, 0x22),
            Color32::from_rgb(0x17, 0xbe, 0xcf),
        ])
    }

    /// The four-color ramp used by the suspicious-retweets page.
    pub fn embers() -> Self {
        Self::new(vec![
            Color32::from_rgb(0xff, 0x57, 0x33),
            Color32::from_rgb(0xc7, 0x00, 0x39),
            Color32::from_rgb(0x90, 0x0c, 0x3f),
            Color32::from_rgb(0x58, 0x18, 0x45),
        ])
    }

    pub fn color(&mut self, key: &str) -> Color32 {
        let index = match self.assigned.iter().position(|known| known == key) {
            Some(index) => index,
            None => {
                self.assigned.push(key.to_owned());
                self.assigned.len() - 1
            }
        };
        self.palette[index % self.palette.len()]
    }
}

pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity) as u8,
    )
}

pub fn greyscale(color: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let grey = (color.r() as f32 * 0.299) + (color.g() as f32 * 0.587) + (color.b() as f32 * 0.114);
    let mix = |channel: u8| ((channel as f32 * (1.0 - amount)) + (grey * amount)) as u8;
    Color32::from_rgba_unmultiplied(mix(color.r()), mix(color.g()), mix(color.b()), color.a())
}
