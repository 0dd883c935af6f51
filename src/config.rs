use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use bevy::prelude::Resource;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    board::Seed,
    pattern::{Pattern, PatternError},
    prelude::*,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("random fill likelihood must be within 0..=100, got {0}")]
    Likelihood(u8),
    #[error("color depth must be 24 or 48, got {0}")]
    ColorDepth(u8),
    #[error("at least one board copy is needed for cycle detection")]
    NoBoardCopies,
    #[error("board must be at least 3x3, got {width}x{height}")]
    BoardTooSmall { width: u32, height: u32 },
    #[error("pattern `{name}` ({cols}x{rows}) does not fit a {width}x{height} board")]
    PatternTooLarge {
        name: String,
        rows: usize,
        cols: usize,
        width: u32,
        height: u32,
    },
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Bits per pixel in the LED frame buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u8")]
pub enum ColorDepth {
    #[default]
    Rgb24,
    Rgb48,
}

impl ColorDepth {
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColorDepth::Rgb24 => 3,
            ColorDepth::Rgb48 => 6,
        }
    }

    #[inline]
    pub fn bits(self) -> u8 {
        match self {
            ColorDepth::Rgb24 => 24,
            ColorDepth::Rgb48 => 48,
        }
    }
}

impl TryFrom<u8> for ColorDepth {
    type Error = ConfigError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            24 => Ok(ColorDepth::Rgb24),
            48 => Ok(ColorDepth::Rgb48),
            other => Err(ConfigError::ColorDepth(other)),
        }
    }
}

/// How the board is populated on start and on every reset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum StartPattern {
    /// Every cell is alive with `likelihood` percent chance.
    Random {
        #[serde(default = "default_likelihood")]
        likelihood: u8,
    },
    /// The predefined three-glider table, centred.
    IdealGlider,
    /// One glider in the middle of the matrix.
    PureGlider,
    /// A plaintext (`.cells`) pattern read from disk, centred.
    File { path: PathBuf },
}

fn default_likelihood() -> u8 {
    LIKELIHOOD
}

impl Default for StartPattern {
    fn default() -> Self {
        StartPattern::Random {
            likelihood: LIKELIHOOD,
        }
    }
}

/// Runtime configuration, validated once at program start.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifeConfig {
    /// matrix columns
    pub width: u32,
    /// matrix rows
    pub height: u32,
    pub gen_delay_ms: u64,
    /// reseed the board once it gets stuck in a cycle
    pub clear_on_loop: bool,
    /// log a board dump every generation
    pub debug: bool,
    pub color_depth: ColorDepth,
    /// number of past generations kept for cycle detection
    pub board_copies: usize,
    /// fixed rng seed, random when unset
    pub seed: Option<u64>,
    pub start: StartPattern,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            width: MATRIX_WIDTH,
            height: MATRIX_HEIGHT,
            gen_delay_ms: GEN_DELAY_MS,
            clear_on_loop: CLEAR_ON_LOOP,
            debug: DEBUG_MODE,
            color_depth: COLOR_DEPTH,
            board_copies: NUM_BOARD_COPIES,
            seed: None,
            start: StartPattern::default(),
        }
    }
}

impl LifeConfig {
    /// Reads a TOML config file. Keys that are left out keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&src).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(src: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(src)
    }

    #[inline]
    pub fn gen_delay(&self) -> Duration {
        Duration::from_millis(self.gen_delay_ms)
    }

    /// The fixed timestep between generations, or `None` when a zero delay
    /// asks for one generation every frame.
    pub fn fixed_timestep(&self) -> Option<Duration> {
        Some(self.gen_delay()).filter(|delay| !delay.is_zero())
    }

    /// Checks everything that can be checked without touching the disk.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // on a torus narrower than 3 cells a cell would be its own neighbour
        if self.width < MIN_BOARD_SIDE || self.height < MIN_BOARD_SIDE {
            return Err(ConfigError::BoardTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        if self.board_copies == 0 {
            return Err(ConfigError::NoBoardCopies);
        }
        if let StartPattern::Random { likelihood } = self.start {
            if likelihood > 100 {
                return Err(ConfigError::Likelihood(likelihood));
            }
        }
        match &self.start {
            StartPattern::IdealGlider => self.check_fits(Pattern::ideal_glider()),
            StartPattern::PureGlider => self.check_fits(&Pattern::pure_glider()),
            StartPattern::Random { .. } | StartPattern::File { .. } => Ok(()),
        }
    }

    fn check_fits(&self, pattern: &Pattern) -> Result<(), ConfigError> {
        if pattern.cols() > self.width as usize || pattern.rows() > self.height as usize {
            return Err(ConfigError::PatternTooLarge {
                name: pattern.name().to_owned(),
                rows: pattern.rows(),
                cols: pattern.cols(),
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Resolves the start mode into what the board seeds itself from.
    ///
    /// Pattern files are read here and only here.
    pub fn seed_source(&self) -> Result<Seed, ConfigError> {
        let pattern = match &self.start {
            StartPattern::Random { likelihood } => return Ok(Seed::Random(*likelihood)),
            StartPattern::IdealGlider => Pattern::ideal_glider().clone(),
            StartPattern::PureGlider => Pattern::pure_glider(),
            StartPattern::File { path } => Pattern::load(path)?,
        };

        self.check_fits(&pattern)?;
        Ok(Seed::Pattern(pattern))
    }
}
