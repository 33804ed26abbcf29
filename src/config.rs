//! Studio configuration.
//!
//! Every section has sensible defaults, so a config file only needs to list
//! the values it overrides:
//!
//! ```json
//! { "segmentation": { "angle_threshold_degrees": 15.0 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acoustics::{AcousticParams, ExportParams};
use crate::error::ConfigError;
use crate::mesh::MeshParams;
use crate::picking::PickParams;
use crate::segmentation::{SegmentationParams, SegmentationStrategy};

/// All tunable parameters of the geometry core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub mesh: MeshParams,
    pub segmentation: SegmentationParams,
    pub picking: PickParams,
    pub export: ExportParams,
    pub acoustics: AcousticParams,
}

impl StudioConfig {
    /// Reads a JSON config file and validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for
    /// this schema, or holds out-of-range values.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parses a config from a JSON string without validating it.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the text does not match the schema.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Checks value ranges that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weld = self.mesh.weld_tolerance;
        if !(weld.is_finite() && weld > 0.0) {
            return Err(invalid("mesh.weld_tolerance", format!("{weld} must be positive")));
        }

        let angle = self.segmentation.angle_threshold_degrees;
        if !(angle.is_finite() && (0.0..=180.0).contains(&angle)) {
            return Err(invalid(
                "segmentation.angle_threshold_degrees",
                format!("{angle} must lie in [0, 180]"),
            ));
        }
        if let SegmentationStrategy::Coplanar { tolerance } = self.segmentation.strategy {
            if !(tolerance.is_finite() && tolerance >= 0.0) {
                return Err(invalid(
                    "segmentation.strategy.tolerance",
                    format!("{tolerance} must be non-negative"),
                ));
            }
        }

        let eps = self.picking.epsilon;
        if !(eps.is_finite() && eps > 0.0) {
            return Err(invalid("picking.epsilon", format!("{eps} must be positive")));
        }

        let scale = self.export.scale_factor;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(invalid("export.scale_factor", format!("{scale} must be positive")));
        }
        let material = self.export.default_material;
        if !material.is_valid() {
            return Err(invalid(
                "export.default_material",
                format!(
                    "absorption {} and scattering {} must lie in [0, 1]",
                    material.absorption, material.scattering
                ),
            ));
        }

        if self.acoustics.sample_rate == 0 {
            return Err(invalid("acoustics.sample_rate", "must be non-zero".into()));
        }
        let c = self.acoustics.speed_of_sound;
        if !(c.is_finite() && c > 0.0) {
            return Err(invalid("acoustics.speed_of_sound", format!("{c} must be positive")));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
