//! Configuration module for the zone editor.
//!
//! Startup flags come from the command line, editor options from the
//! add-on options file. Both are resolved once into an immutable
//! [`Settings`] value that is shared with the handlers.

use std::path::{Path, PathBuf};

use clap::Parser;
use config::{Config as ConfigLoader, File, FileFormat};
use serde::Deserialize;

use crate::error::ZoneResult;

/// Colour used for the zones when the options file does not set one.
pub const DEFAULT_ZONE_COLOUR: &str = "green";

/// Address the HTTP listener binds to.
pub const BIND_ADDRESS: &str = "0.0.0.0:8000";

/// Command line flags.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "zone-editor")]
#[command(about = "Serves the polygonal zone editor and stores its zones", long_about = None)]
pub struct Cli {
    /// Allow requests from every IP address, not only the ingress proxy.
    /// Intended for local development.
    #[arg(short = 'a', long)]
    pub allow_all_ips: bool,
}

/// Options read from the externally owned options file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Options {
    /// Allow every caller regardless of network origin.
    pub allow_all_ips: bool,
    /// Colour substituted into the index page.
    pub zone_colour: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allow_all_ips: false,
            zone_colour: DEFAULT_ZONE_COLOUR.to_string(),
        }
    }
}

impl Options {
    /// Load options from a JSON file.
    ///
    /// A missing file yields the defaults. Unknown keys are ignored.
    pub fn load(path: &Path) -> ZoneResult<Self> {
        let config = ConfigLoader::builder()
            .set_default("allow_all_ips", false)?
            .set_default("zone_colour", DEFAULT_ZONE_COLOUR)?
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Json)
                    .required(false),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Fixed filesystem locations.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root of the static editor assets.
    pub asset_root: PathBuf,
    /// Persisted zone document.
    pub zones_file: PathBuf,
    /// Add-on options file (read-only input).
    pub options_file: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("static"),
            zones_file: PathBuf::from("/data/zones.json"),
            options_file: PathBuf::from("/data/options.json"),
        }
    }
}

/// Effective, immutable server settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Whether every network origin is permitted.
    pub allow_all_ips: bool,
    /// Colour substituted into the index page.
    pub zone_colour: String,
    pub paths: Paths,
}

impl Settings {
    /// Combine startup flags with file options. The flag can only force
    /// "allow all" on; it never turns a file-level `true` off.
    pub fn resolve(cli: &Cli, options: Options, paths: Paths) -> Self {
        Self {
            allow_all_ips: cli.allow_all_ips || options.allow_all_ips,
            zone_colour: options.zone_colour,
            paths,
        }
    }
}
