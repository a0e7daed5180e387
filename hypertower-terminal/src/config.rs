/// Layered tower configuration: defaults, TOML preset, query string, CLI flags
use clap::Args;
use hypertower_core::{apply_query, Partition, TowerSpec, WaistMode};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Query(#[from] hypertower_core::Error),
}

/// A TOML preset. Every field is optional and overlays the defaults.
///
/// ```toml
/// height = 240.0
/// sectionCount = 4
/// partition = "uniform"
/// query = "twist=35"
///
/// [waist]
/// mode = "manual"
/// position = 0.4
/// radius = 12.0
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TowerConfig {
    pub height: Option<f64>,
    pub base_radius: Option<f64>,
    pub top_radius: Option<f64>,
    pub section_count: Option<u32>,
    pub strut_count: Option<u32>,
    pub ring_count: Option<u32>,
    pub strut_radius: Option<f64>,
    pub show_rings: Option<bool>,
    pub twist_degrees: Option<f64>,
    pub partition: Option<Partition>,
    pub waist: Option<WaistMode>,
    /// Applied after the fields above, like a bookmarked URL.
    pub query: Option<String>,
}

impl TowerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded tower config");
        Ok(config)
    }

    pub fn apply(&self, base: &TowerSpec) -> Result<TowerSpec, ConfigError> {
        let mut spec = *base;
        overlay(&mut spec.height, self.height);
        overlay(&mut spec.base_radius, self.base_radius);
        overlay(&mut spec.top_radius, self.top_radius);
        overlay(&mut spec.section_count, self.section_count);
        overlay(&mut spec.strut_count, self.strut_count);
        overlay(&mut spec.ring_count, self.ring_count);
        overlay(&mut spec.strut_radius, self.strut_radius);
        overlay(&mut spec.show_rings, self.show_rings);
        overlay(&mut spec.twist_degrees, self.twist_degrees);
        overlay(&mut spec.partition, self.partition);
        overlay(&mut spec.waist, self.waist);

        match &self.query {
            Some(query) => Ok(apply_query(&spec, query)?),
            None => Ok(spec),
        }
    }
}

fn overlay<T: Copy>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Tower parameters accepted on the command line.
#[derive(Debug, Default, Clone, Args)]
pub struct SpecArgs {
    /// TOML preset to start from
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// URL-style parameters, e.g. "height=300&twist=45&rings=off"
    #[arg(short, long, global = true)]
    pub query: Option<String>,

    /// Total tower height
    #[arg(long, global = true)]
    pub height: Option<f64>,

    /// Radius at the base
    #[arg(long, global = true)]
    pub base_radius: Option<f64>,

    /// Radius at the top
    #[arg(long, global = true)]
    pub top_radius: Option<f64>,

    /// Number of stacked sections
    #[arg(long, global = true)]
    pub sections: Option<u32>,

    /// Struts per section and twist family
    #[arg(long, global = true)]
    pub struts: Option<u32>,

    /// Ring intervals per section
    #[arg(long, global = true)]
    pub rings: Option<u32>,

    /// Twist per section in degrees
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub twist: Option<f64>,

    /// Split the height evenly instead of shortening sections toward the top
    #[arg(long, global = true)]
    pub uniform: bool,

    /// Hide the horizontal rings
    #[arg(long, global = true)]
    pub no_rings: bool,
}

impl SpecArgs {
    /// Resolve defaults, then the config file, then the query, then flags.
    pub fn resolve(&self) -> Result<TowerSpec, ConfigError> {
        let mut spec = TowerSpec::default();

        if let Some(path) = &self.config {
            spec = TowerConfig::load(path)?.apply(&spec)?;
        }
        if let Some(query) = &self.query {
            spec = apply_query(&spec, query)?;
        }

        overlay(&mut spec.height, self.height);
        overlay(&mut spec.base_radius, self.base_radius);
        overlay(&mut spec.top_radius, self.top_radius);
        overlay(&mut spec.section_count, self.sections);
        overlay(&mut spec.strut_count, self.struts);
        overlay(&mut spec.ring_count, self.rings);
        overlay(&mut spec.twist_degrees, self.twist);
        if self.uniform {
            spec.partition = Partition::Uniform;
        }
        if self.no_rings {
            spec.show_rings = false;
        }

        Ok(spec.sanitized())
    }
}
