pub mod composite;
pub mod scene;
pub mod text;

/// One rendered frame as RGBA8 pixels, row-major.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight (non-premultiplied) RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ];
        Some(if self.premultiplied {
            composite::unpremultiply(px)
        } else {
            px
        })
    }

    /// Drop alpha (frames are rendered over an opaque background).
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() / 4 * 3);
        for px in self.data.chunks_exact(4) {
            let [r, g, b, _] = if self.premultiplied {
                composite::unpremultiply([px[0], px[1], px[2], px[3]])
            } else {
                [px[0], px[1], px[2], px[3]]
            };
            out.extend_from_slice(&[r, g, b]);
        }
        out
    }
}
