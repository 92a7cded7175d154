use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{CompositeBody, Contact, Landscape};
use crate::error::{Error, Result};

mod defaults {
    pub const WIDTH: u32 = 1200;
    pub const SPACING: u32 = 20;
    pub const MEAN_HEIGHT: f64 = 60.;
    pub const SPREAD: f64 = 15.;
    pub const PAD_START: u32 = 80;
    pub const PAD_WIDTH: u32 = 40;
}

/// Flat stretch of terrain at the mean height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandingPad {
    pub start: u32,
    pub width: u32,
}

impl LandingPad {
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.width)
    }

    pub fn contains(&self, x: u32) -> bool {
        (self.start..=self.end()).contains(&x)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainSettings {
    pub width: u32,
    /// Horizontal distance between generated points.
    pub spacing: u32,
    pub mean_height: f64,
    /// Heights are drawn uniformly from `mean_height ± spread`.
    pub spread: f64,
    pub pad: Option<LandingPad>,
    /// Fixed seed for reproducible terrain, entropy otherwise.
    pub seed: Option<u64>,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            width: defaults::WIDTH,
            spacing: defaults::SPACING,
            mean_height: defaults::MEAN_HEIGHT,
            spread: defaults::SPREAD,
            pad: Some(LandingPad {
                start: defaults::PAD_START,
                width: defaults::PAD_WIDTH,
            }),
            seed: None,
        }
    }
}

impl TerrainSettings {
    pub fn with_width(self, width: u32) -> Self {
        Self { width, ..self }
    }
    pub fn with_spacing(self, spacing: u32) -> Self {
        Self { spacing, ..self }
    }
    pub fn with_mean_height(self, mean_height: f64) -> Self {
        Self {
            mean_height,
            ..self
        }
    }
    pub fn with_spread(self, spread: f64) -> Self {
        Self { spread, ..self }
    }
    pub fn with_pad(self, start: u32, width: u32) -> Self {
        Self {
            pad: Some(LandingPad { start, width }),
            ..self
        }
    }
    pub fn without_pad(self) -> Self {
        Self { pad: None, ..self }
    }
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    fn validate(&self) -> Result<()> {
        if self.spacing == 0 {
            return Err(Error::InvalidValue {
                key: "/Generator/Spacing",
                reason: "must be positive".to_owned(),
            });
        }
        if !self.spread.is_finite() || self.spread < 0. {
            return Err(Error::InvalidValue {
                key: "/Generator/Spread",
                reason: format!("must be a non negative number, got {}", self.spread),
            });
        }
        if !self.mean_height.is_finite() {
            return Err(Error::InvalidValue {
                key: "/Generator/MeanHeight",
                reason: format!("must be finite, got {}", self.mean_height),
            });
        }
        match self.pad {
            Some(pad) if pad.end() > self.width => Err(Error::InvalidValue {
                key: "/Generator/Pad",
                reason: format!("pad ends at {} past terrain width {}", pad.end(), self.width),
            }),
            _ => Ok(()),
        }
    }
}

/// A generated landscape together with the settings it came from.
#[derive(Debug, Clone)]
pub struct Planet {
    settings: TerrainSettings,
    landscape: Landscape,
}

impl Planet {
    pub fn try_generate(settings: TerrainSettings) -> Result<Self> {
        settings.validate()?;
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut landscape = Landscape::new();
        let TerrainSettings {
            width,
            spacing,
            mean_height,
            spread,
            pad,
            ..
        } = settings;
        for x in (0..width).step_by(spacing as usize) {
            let height = match pad {
                Some(pad) if pad.contains(x) => mean_height,
                _ => (mean_height + rng.gen_range(-spread..=spread)).max(0.),
            };
            landscape.add_point(x, height);
        }
        if let Some(pad) = pad {
            landscape.add_point(pad.start, mean_height);
            landscape.add_point(pad.end(), mean_height);
        }

        debug!(
            "generated {} terrain points over width {width}, pad {pad:?}",
            landscape.len()
        );
        Ok(Self {
            settings,
            landscape,
        })
    }

    /// Wraps a hand-made landscape.
    pub fn from_landscape(landscape: Landscape) -> Self {
        let width = landscape
            .x_range()
            .map_or(0, |(_, right)| right.saturating_add(1));
        Self {
            settings: TerrainSettings::default().with_width(width).without_pad(),
            landscape,
        }
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    pub fn width(&self) -> u32 {
        self.settings.width
    }

    pub fn pad(&self) -> Option<LandingPad> {
        self.settings.pad
    }

    pub fn landscape(&self) -> &Landscape {
        &self.landscape
    }

    pub fn landscape_mut(&mut self) -> &mut Landscape {
        &mut self.landscape
    }

    pub fn into_landscape(self) -> Landscape {
        self.landscape
    }

    pub fn check_collision<B: CompositeBody>(&self, body: &B) -> Vec<Contact> {
        self.landscape.check_collision(body)
    }
}
