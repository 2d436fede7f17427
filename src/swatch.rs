/// One palette entry: a representative color and the number of source pixels
/// it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Swatch {
    red: u8,
    green: u8,
    blue: u8,
    count: u32,
}

impl Swatch {
    pub fn new((red, green, blue): (u8, u8, u8), count: u32) -> Swatch {
        Self {
            red,
            green,
            blue,
            count,
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// The color as a canonical lowercase `#rrggbb` string.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    pub fn hsl(self) -> (f32, f32, f32) {
        crate::rgb_to_hsl(self.rgb())
    }

    /// WCAG relative luminance, 0.0 for black up to 1.0 for white.
    pub fn luminance(self) -> f32 {
        crate::relative_luminance(self.rgb())
    }

    pub fn count(self) -> u32 {
        self.count
    }

    pub(crate) fn absorb(&mut self, count: u32) {
        self.count += count;
    }
}
