#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0, 0, 0);
    pub const WHITE: Color = Color::new_rgb(255, 255, 255);

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    #[inline]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Read the pixel at `index` from an RGB24 buffer.
    pub fn from_rgb24(buffer: &[u8], index: usize) -> Color {
        let offset = index * 3;
        Color::new_rgb(buffer[offset], buffer[offset + 1], buffer[offset + 2])
    }

    /// Write this color as pixel `index` of an RGB24 buffer.
    pub fn write_rgb24(&self, buffer: &mut [u8], index: usize) {
        let offset = index * 3;
        buffer[offset] = self.r;
        buffer[offset + 1] = self.g;
        buffer[offset + 2] = self.b;
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn rgb24_buffer_access() {
        let mut buffer = [0u8; 6];
        Color::new_rgb(1, 2, 3).write_rgb24(&mut buffer, 1);
        assert_eq!(buffer, [0, 0, 0, 1, 2, 3]);
        assert_eq!(Color::from_rgb24(&buffer, 1).rgb(), (1, 2, 3));
        assert_eq!(Color::from_rgb24(&buffer, 0), Color::BLACK);
    }
}
