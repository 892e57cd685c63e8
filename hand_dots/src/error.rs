//! Application errors. Optional hardware never produces one of these; it
//! degrades to a null source with a warning instead.

use std::io;
use std::path::PathBuf;

use dot_field::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("window: {0}")]
    Window(#[from] minifb::Error),

    #[error("reading {}: {source}", path.display())]
    ConfigIo {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("encoding config: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
