//! Domain models - core accessibility types and stored records
//!
//! This module contains the canonical data types used throughout the system:
//! - `types` - grades, entrance attributes, marker priorities
//! - `records` - `Place`, `Report` and `Contributor` as stored
//! - `forms` - raw request bodies from the map client

pub mod forms;
pub mod records;
pub mod types;

// Re-export commonly used types at module level
pub use records::{Contributor, Place, RegionFilter, Report};
pub use types::{
    DoorType, Grade, GradeResult, MarkerCategory, MarkerPriority, PlaceId, PlaceMeasurement,
    RampType, ReportStatus, SlopeType,
};
