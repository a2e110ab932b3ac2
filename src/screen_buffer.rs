/// ScreenBuffer holds the RGB values for each pixel of the picture area.
///
/// The PPU is the only writer; readers should wait for the frame-complete
/// signal before touching the buffer and treat it as read-only.
pub struct ScreenBuffer {
    buffer: Vec<u8>,
}

impl ScreenBuffer {
    pub const WIDTH: u32 = 256;
    pub const HEIGHT: u32 = 240;
    const BYTES_PER_PIXEL: usize = 3; // RGB

    /// Creates a new ScreenBuffer with the fixed NES picture size (256x240).
    pub fn new() -> Self {
        let buffer_size = (Self::WIDTH * Self::HEIGHT) as usize * Self::BYTES_PER_PIXEL;

        ScreenBuffer {
            buffer: vec![0; buffer_size],
        }
    }

    /// Calculates the buffer offset for a given pixel coordinate.
    fn pixel_offset(x: u32, y: u32) -> usize {
        ((y * Self::WIDTH + x) as usize) * Self::BYTES_PER_PIXEL
    }

    /// Sets the RGB color of the pixel at the given coordinates.
    /// Coordinates outside the picture area are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) {
        if x >= Self::WIDTH || y >= Self::HEIGHT {
            return;
        }
        let offset = Self::pixel_offset(x, y);
        self.buffer[offset] = r;
        self.buffer[offset + 1] = g;
        self.buffer[offset + 2] = b;
    }

    /// Returns the RGB color of the pixel at the given coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let offset = Self::pixel_offset(x, y);
        (
            self.buffer[offset],
            self.buffer[offset + 1],
            self.buffer[offset + 2],
        )
    }

    /// Raw RGB24 bytes, row-major, for blitting into a streaming texture.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of bytes per row, matching the texture pitch.
    pub fn pitch(&self) -> usize {
        Self::WIDTH as usize * Self::BYTES_PER_PIXEL
    }
}

impl Default for ScreenBuffer {
    fn default() -> Self {
        Self::new()
    }
}
