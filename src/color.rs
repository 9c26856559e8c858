use glam::Vec4;

/// Eight saturated colors used to tell polygons apart without shading.
const PALETTE: [u32; 8] = [
    0xFFE6194B, 0xFF3CB44B, 0xFFFFE119, 0xFF4363D8,
    0xFFF58231, 0xFF911EB4, 0xFF46F0F0, 0xFFF032E6,
];

/// RGBA color in `[0, 1]`, packed as `0xAARRGGBB` for the frame buffer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    rgba: Vec4,
}

impl Color {
    pub const BLACK: Color = Color { rgba: Vec4::new(0.0, 0.0, 0.0, 1.0) };
    pub const WHITE: Color = Color { rgba: Vec4::ONE };

    pub fn from_f32(r: f32, g: f32, b: f32, a: f32) -> Color {
        Self {
            rgba: Vec4::new(r, g, b, a)
        }
    }

    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            rgba: Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0,
        }
    }

    pub fn from_u32(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Self::from_u8(r, g, b, a)
    }

    /// Palette color for a material/face id, wrapping around.
    pub fn from_id(id: u32) -> Self {
        Self::from_u32(PALETTE[id as usize % PALETTE.len()])
    }

    /// Grey level for a value in `[0, 1]`; used to visualize depth.
    pub fn grey(value: f32) -> Self {
        let v = value.clamp(0.0, 1.0);
        Self::from_f32(v, v, v, 1.0)
    }

    pub fn to_u32(&self) -> u32 {
        let scaled = (self.rgba.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
        u32::from_be_bytes([scaled.w as u8, scaled.x as u8, scaled.y as u8, scaled.z as u8])
    }
}
