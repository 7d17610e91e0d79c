//! Road palettes
//!
//! Segments alternate between `LIGHT` and `DARK` every rumble band; the two
//! segments past the start position use `START` and the last band `FINISH`.

/// 24-bit RGB color, `0xRRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xFFFFFF);
    pub const BLACK: Color = Color(0x000000);

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Opaque ARGB pixel value
    pub const fn to_argb(self) -> u32 {
        0xFF000000 | (self.0 & 0x00FF_FFFF)
    }
}

/// Colors for one segment's road band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub road: Color,
    pub grass: Color,
    pub rumble: Color,
    /// Lane dividers are only painted on light bands
    pub lane: Option<Color>,
}

pub const FOG: Color = Color(0x410A00);

pub const LIGHT: ColorScheme = ColorScheme {
    road: Color(0x3F3839),
    grass: Color(0x959999),
    rumble: Color(0x555555),
    lane: Some(Color(0x636363)),
};

pub const DARK: ColorScheme = ColorScheme {
    road: Color(0x3F3839),
    grass: Color(0x959999),
    rumble: Color(0x636363),
    lane: None,
};

pub const START: ColorScheme = ColorScheme {
    road: Color::WHITE,
    grass: Color::WHITE,
    rumble: Color::WHITE,
    lane: None,
};

pub const FINISH: ColorScheme = ColorScheme {
    road: Color::BLACK,
    grass: Color::BLACK,
    rumble: Color::BLACK,
    lane: None,
};
