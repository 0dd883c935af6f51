pub mod board;
pub mod camera;
pub mod cell;
pub mod config;
pub mod frame;
pub mod life;
pub mod pattern;
pub mod state;

pub mod prelude {
    use bevy::{color::Color, math::Vec2};

    use crate::config::ColorDepth;

    // simulation defaults, overridable from the config file
    pub const GEN_DELAY_MS: u64 = 250;
    pub const LIKELIHOOD: u8 = 55;
    pub const CLEAR_ON_LOOP: bool = true;
    pub const DEBUG_MODE: bool = false;
    pub const COLOR_DEPTH: ColorDepth = ColorDepth::Rgb24;
    pub const NUM_BOARD_COPIES: usize = 4;
    pub const MATRIX_WIDTH: u32 = 64;
    pub const MATRIX_HEIGHT: u32 = 32;
    /// smallest board side on which every cell has 8 distinct neighbours
    pub const MIN_BOARD_SIDE: u32 = 3;

    const _: () = assert!(LIKELIHOOD <= 100);
    const _: () = assert!(NUM_BOARD_COPIES >= 1);
    const _: () = assert!(MATRIX_WIDTH >= MIN_BOARD_SIDE && MATRIX_HEIGHT >= MIN_BOARD_SIDE);

    // preview window
    pub const BG_COLOR: Color = Color::srgb(0.05, 0.05, 0.05);
    pub const MATRIX_POS: Vec2 = Vec2::ZERO;
    pub const BORDER_WIDTH_PX: f32 = 6.0;
    pub const BORDER_COLOR: Color = Color::srgb(0.3, 0.3, 0.3);
    pub const LED_SIZE_PX: Vec2 = Vec2::splat(14.0);
    /// fraction of the pitch the LED itself covers
    pub const LED_SCALE: Vec2 = Vec2::splat(0.8);
}
