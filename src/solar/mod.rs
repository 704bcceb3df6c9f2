//! Physical models: sun position, atmosphere, clear-sky irradiance and
//! plane-of-array transposition.
//!
//! Every function here is pure. Series helpers take slices and return new
//! vectors; nothing is cached between calls.

/// Extraterrestrial irradiance, site pressure and air mass.
pub mod atmosphere;
/// Ineichen-Perez clear-sky model.
pub mod clearsky;
/// NREL SPA solar position.
pub mod position;
/// Plane-of-array transposition and sky diffuse models.
pub mod transposition;
pub mod types;

pub use clearsky::{DEFAULT_LINKE_TURBIDITY, LinkeTurbidity, clearsky_series, ineichen};
pub use position::{DEFAULT_DELTA_T, refraction_at, solar_position, solar_positions};
pub use transposition::{SkyModel, SurfaceType, TranspositionInputs, total_irradiance, transpose};
pub use types::{ClearSkyIrradiance, PoaIrradiance, SolarPosition};
