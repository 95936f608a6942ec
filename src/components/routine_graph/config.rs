use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("Failed to parse graph config: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("Invalid zoom range: min {min} must be positive and not above max {max}")]
	ZoomRange { min: f64, max: f64 },
	#[error("Invalid value for {field}: {value}")]
	NonPositive { field: &'static str, value: f64 },
}

/// Tunables for placement, sizing, zoom and persistence. Every field has a
/// default, so a JSON override only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	pub node_base_radius: f64,
	pub node_radius_per_degree: f64,
	pub weekly_node_radius: f64,
	pub jitter: f64,
	/// Circle radius as a fraction of `min(width, height)`.
	pub circular_radius_fraction: f64,
	pub radial_radius_fraction: f64,
	pub wedge_radius_fraction: f64,
	pub day_label_radius_fraction: f64,
	pub in_day_spacing: f64,
	/// Angular offset of morning/evening nodes, as a fraction of segment width.
	pub time_slot_offset: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub wheel_zoom_step: f64,
	pub focus_duration_ms: f64,
	pub focus_revert_ms: f64,
	pub storage_namespace: String,
	pub schema_version: u32,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			node_base_radius: 20.0,
			node_radius_per_degree: 3.0,
			weekly_node_radius: 12.0,
			jitter: 3.0,
			circular_radius_fraction: 0.3,
			radial_radius_fraction: 0.35,
			wedge_radius_fraction: 0.4,
			day_label_radius_fraction: 0.45,
			in_day_spacing: 15.0,
			time_slot_offset: 0.3,
			min_zoom: 0.5,
			max_zoom: 3.0,
			wheel_zoom_step: 1.1,
			focus_duration_ms: 500.0,
			focus_revert_ms: 3000.0,
			storage_namespace: "skincare".into(),
			schema_version: 1,
		}
	}
}

impl GraphConfig {
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let config: GraphConfig = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
			return Err(ConfigError::ZoomRange {
				min: self.min_zoom,
				max: self.max_zoom,
			});
		}
		for (field, value) in [
			("node_base_radius", self.node_base_radius),
			("weekly_node_radius", self.weekly_node_radius),
			("circular_radius_fraction", self.circular_radius_fraction),
			("radial_radius_fraction", self.radial_radius_fraction),
			("wheel_zoom_step", self.wheel_zoom_step),
		] {
			if !(value > 0.0) {
				return Err(ConfigError::NonPositive { field, value });
			}
		}
		Ok(())
	}
}
