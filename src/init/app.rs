use std::path::Path;

use super::json::{self, Config};
use crate::error::Result;
use crate::App;

impl App {
    pub fn try_from_config(config: &Config) -> Result<Self> {
        Self::try_new(
            config.rocket.clone(),
            config.planet()?,
            config.obstacle_colliders(),
            config.run,
        )
    }

    pub fn try_from_file<P: AsRef<Path>>(config_file_path: P) -> Result<Self> {
        Self::try_from_config(&json::from_file(config_file_path)?)
    }
}
