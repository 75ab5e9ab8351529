use std::path::{
    Path,
    PathBuf,
};

use color_eyre::eyre::eyre;
use directories::ProjectDirs;

use crate::{
    Error,
    station::Station,
};

#[derive(Debug)]
pub struct AppFiles {
    project_dirs: ProjectDirs,
}

impl AppFiles {
    pub fn new() -> Result<Self, Error> {
        let project_dirs = ProjectDirs::from("", "scottie", "scottie-cli")
            .ok_or_else(|| eyre!("Could not determine project directories"))?;
        let this = Self { project_dirs };

        std::fs::create_dir_all(this.config_dir())?;

        Ok(this)
    }

    fn config_dir(&self) -> &Path {
        self.project_dirs.config_dir()
    }

    pub fn station_path(&self) -> PathBuf {
        self.config_dir().join("station.toml")
    }

    /// Loads the station file, writing a default one if there is none yet.
    pub fn station(&self) -> Result<Station, Error> {
        let path = self.station_path();

        if path.exists() {
            Station::from_path(path)
        }
        else {
            tracing::debug!(path = %path.display(), "Writing default station file");
            let station = Station::default();
            station.to_path(path)?;
            Ok(station)
        }
    }
}
