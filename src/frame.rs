use bevy::{
    color::Color,
    math::{uvec2, UVec2},
    prelude::Resource,
};

use crate::{board::Board, cell::Cell, config::ColorDepth};

/// 16 bits per channel, the widest depth the matrix supports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb48 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl Rgb48 {
    pub const BLACK: Rgb48 = Rgb48::new(0, 0, 0);

    pub const fn new(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b }
    }

    /// Widens 8-bit channels by repeating the byte, so 0xff maps to 0xffff.
    pub const fn from_rgb24(r: u8, g: u8, b: u8) -> Self {
        Self::new(widen(r), widen(g), widen(b))
    }

    fn lerp(self, other: Rgb48, t: f32) -> Self {
        let mix = |a: u16, b: u16| (a as f32 + (b as f32 - a as f32) * t).round() as u16;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

impl From<Rgb48> for Color {
    fn from(rgb: Rgb48) -> Self {
        let unit = |v: u16| v as f32 / u16::MAX as f32;
        Color::srgb(unit(rgb.r), unit(rgb.g), unit(rgb.b))
    }
}

#[inline]
const fn widen(v: u8) -> u16 {
    (v as u16) << 8 | v as u16
}

/// Maps a cell's age to the colour of its LED.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub dead: Rgb48,
    /// newborn cells
    pub young: Rgb48,
    /// cells that survived `fade_ages` generations or more
    pub old: Rgb48,
    pub fade_ages: u8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            dead: Rgb48::BLACK,
            young: Rgb48::from_rgb24(0x33, 0xff, 0x33),
            old: Rgb48::from_rgb24(0x33, 0x66, 0xff),
            fade_ages: 16,
        }
    }
}

impl Palette {
    pub fn color(&self, cell: Cell) -> Rgb48 {
        if !cell.is_alive() {
            return self.dead;
        }
        if self.fade_ages == 0 || cell.age >= self.fade_ages {
            return self.old;
        }
        self.young
            .lerp(self.old, cell.age as f32 / self.fade_ages as f32)
    }
}

/// Packed pixel data ready to be shifted out to the panel, row-major.
///
/// 24-bit pixels are `r g b`, 48-bit pixels are three big-endian `u16`s.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    depth: ColorDepth,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, depth: ColorDepth) -> Self {
        let len = width as usize * height as usize * depth.bytes_per_pixel();
        Self {
            width,
            height,
            depth,
            data: vec![0; len],
        }
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        uvec2(self.width, self.height)
    }

    #[inline]
    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn offset(&self, pos: UVec2) -> usize {
        debug_assert!(pos.x < self.width && pos.y < self.height);
        (pos.y * self.width + pos.x) as usize * self.depth.bytes_per_pixel()
    }

    pub fn set(&mut self, pos: UVec2, color: Rgb48) {
        let offset = self.offset(pos);
        let px = &mut self.data[offset..offset + self.depth.bytes_per_pixel()];
        match self.depth {
            ColorDepth::Rgb24 => {
                px[0] = (color.r >> 8) as u8;
                px[1] = (color.g >> 8) as u8;
                px[2] = (color.b >> 8) as u8;
            }
            ColorDepth::Rgb48 => {
                px[0..2].copy_from_slice(&color.r.to_be_bytes());
                px[2..4].copy_from_slice(&color.g.to_be_bytes());
                px[4..6].copy_from_slice(&color.b.to_be_bytes());
            }
        }
    }

    /// Reads a pixel back; 24-bit pixels come back widened.
    pub fn get(&self, pos: UVec2) -> Rgb48 {
        let offset = self.offset(pos);
        let px = &self.data[offset..offset + self.depth.bytes_per_pixel()];
        match self.depth {
            ColorDepth::Rgb24 => Rgb48::from_rgb24(px[0], px[1], px[2]),
            ColorDepth::Rgb48 => Rgb48::new(
                u16::from_be_bytes([px[0], px[1]]),
                u16::from_be_bytes([px[2], px[3]]),
                u16::from_be_bytes([px[4], px[5]]),
            ),
        }
    }

    /// Repaints every pixel from the board. The board must match the frame's size.
    pub fn render(&mut self, board: &Board, palette: &Palette) {
        debug_assert_eq!(self.size(), board.size());
        for (idx, cell) in board.cells().iter().enumerate() {
            self.set(board.coord(idx), palette.color(*cell));
        }
    }
}
