//! Shared types for accessibility grading and marker classification

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Newtype wrapper for place IDs to provide type safety
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(pub String);

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlaceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Raised when a form value does not name a known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind} value: {value:?}")]
pub struct ParseKindError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseKindError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self { kind, value: value.to_string() }
    }
}

/// How the entrance is approached
///
/// Accepts the form labels used by the map client (`평지`, `경사로`, `계단만`)
/// as well as the English names. Always serializes to the English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum RampType {
    Flat,
    Ramp,
    StairsOnly,
}

impl RampType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RampType::Flat => "FLAT",
            RampType::Ramp => "RAMP",
            RampType::StairsOnly => "STAIRS_ONLY",
        }
    }
}

impl FromStr for RampType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "평지" => return Ok(RampType::Flat),
            "경사로" => return Ok(RampType::Ramp),
            "계단만" => return Ok(RampType::StairsOnly),
            _ => {}
        }
        match s.to_ascii_uppercase().as_str() {
            "FLAT" => Ok(RampType::Flat),
            "RAMP" => Ok(RampType::Ramp),
            "STAIRS_ONLY" => Ok(RampType::StairsOnly),
            _ => Err(ParseKindError::new("ramp", s)),
        }
    }
}

impl TryFrom<String> for RampType {
    type Error = ParseKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RampType> for &'static str {
    fn from(value: RampType) -> Self {
        value.as_str()
    }
}

impl std::fmt::Display for RampType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entrance door mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum DoorType {
    Automatic,
    Hinged,
    Sliding,
}

impl DoorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorType::Automatic => "AUTOMATIC",
            DoorType::Hinged => "HINGED",
            DoorType::Sliding => "SLIDING",
        }
    }
}

impl FromStr for DoorType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "자동문" => return Ok(DoorType::Automatic),
            "여닫이" => return Ok(DoorType::Hinged),
            "미닫이" => return Ok(DoorType::Sliding),
            _ => {}
        }
        match s.to_ascii_uppercase().as_str() {
            "AUTOMATIC" => Ok(DoorType::Automatic),
            "HINGED" => Ok(DoorType::Hinged),
            "SLIDING" => Ok(DoorType::Sliding),
            _ => Err(ParseKindError::new("door", s)),
        }
    }
}

impl TryFrom<String> for DoorType {
    type Error = ParseKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DoorType> for &'static str {
    fn from(value: DoorType) -> Self {
        value.as_str()
    }
}

impl std::fmt::Display for DoorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accessibility grade of an entrance
///
/// Categorical only: the derive order is not an accessibility ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Grade {
    Red,
    Yellow,
    Green,
}

impl Grade {
    pub const ALL: [Grade; 3] = [Grade::Red, Grade::Yellow, Grade::Green];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Red => "RED",
            Grade::Yellow => "YELLOW",
            Grade::Green => "GREEN",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical measurements of an entrance, already normalized by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceMeasurement {
    pub ramp_type: RampType,
    pub door_type: DoorType,
    pub threshold_height_cm: f64,
    pub door_width_cm: f64,
}

/// Outcome of grading: the grade and the fixed comment of the branch taken
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradeResult {
    pub grade: Grade,
    pub comment: &'static str,
}

/// Visual treatment bucket for a map marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarkerCategory {
    /// Glow: updated within the last two days
    Recent,
    /// Faded: not updated for thirty days or more
    Stale,
    Normal,
}

impl MarkerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerCategory::Recent => "RECENT",
            MarkerCategory::Stale => "STALE",
            MarkerCategory::Normal => "NORMAL",
        }
    }
}

/// Display priority of a marker, recomputed on every render
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerPriority {
    pub category: MarkerCategory,
    pub opacity: f64,
    pub stack_order: i32,
    pub pulse: bool,
}

impl MarkerPriority {
    /// Stack order of the glow halo drawn behind a pulsing marker
    pub fn halo_order(&self) -> i32 {
        self.stack_order - 1
    }

    /// Stack order of the label badge drawn above the marker
    pub fn badge_order(&self) -> i32 {
        self.stack_order + 1
    }
}

/// Slope of a reported entrance
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SlopeType {
    #[default]
    Flat,
    Moderate,
    Steep,
    Other(String),
}

impl SlopeType {
    pub fn as_str(&self) -> &str {
        match self {
            SlopeType::Flat => "FLAT",
            SlopeType::Moderate => "MODERATE",
            SlopeType::Steep => "STEEP",
            SlopeType::Other(s) => s,
        }
    }
}

impl From<String> for SlopeType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "FLAT" => SlopeType::Flat,
            "MODERATE" => SlopeType::Moderate,
            "STEEP" => SlopeType::Steep,
            _ => SlopeType::Other(value),
        }
    }
}

impl From<SlopeType> for String {
    fn from(value: SlopeType) -> Self {
        match value {
            SlopeType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// Accessibility status derived for a field report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportStatus {
    Accessible,
    Conditional,
    Inaccessible,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 3] =
        [ReportStatus::Accessible, ReportStatus::Conditional, ReportStatus::Inaccessible];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Accessible => "ACCESSIBLE",
            ReportStatus::Conditional => "CONDITIONAL",
            ReportStatus::Inaccessible => "INACCESSIBLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_type_from_form_labels() {
        assert_eq!("평지".parse::<RampType>().unwrap(), RampType::Flat);
        assert_eq!("경사로".parse::<RampType>().unwrap(), RampType::Ramp);
        assert_eq!("계단만".parse::<RampType>().unwrap(), RampType::StairsOnly);
        assert_eq!("stairs_only".parse::<RampType>().unwrap(), RampType::StairsOnly);
        assert!("elevator".parse::<RampType>().is_err());
    }

    #[test]
    fn test_door_type_from_form_labels() {
        assert_eq!("자동문".parse::<DoorType>().unwrap(), DoorType::Automatic);
        assert_eq!("여닫이".parse::<DoorType>().unwrap(), DoorType::Hinged);
        assert_eq!(" 미닫이 ".parse::<DoorType>().unwrap(), DoorType::Sliding);
        assert_eq!("Hinged".parse::<DoorType>().unwrap(), DoorType::Hinged);

        let err = "revolving".parse::<DoorType>().unwrap_err();
        assert_eq!(err.kind, "door");
    }

    #[test]
    fn test_enum_serde_uses_english_names() {
        let ramp: RampType = serde_json::from_str("\"경사로\"").unwrap();
        assert_eq!(serde_json::to_string(&ramp).unwrap(), "\"RAMP\"");
        assert!(serde_json::from_str::<RampType>("\"ladder\"").is_err());

        assert_eq!(serde_json::to_string(&Grade::Yellow).unwrap(), "\"YELLOW\"");
        assert_eq!(serde_json::from_str::<Grade>("\"GREEN\"").unwrap(), Grade::Green);
    }

    #[test]
    fn test_slope_type_keeps_unknown_values() {
        let slope: SlopeType = serde_json::from_str("\"GENTLE\"").unwrap();
        assert_eq!(slope, SlopeType::Other("GENTLE".to_string()));
        assert_eq!(serde_json::to_string(&slope).unwrap(), "\"GENTLE\"");
        assert_eq!(SlopeType::from("STEEP".to_string()), SlopeType::Steep);
    }

    #[test]
    fn test_marker_companion_orders() {
        let priority = MarkerPriority {
            category: MarkerCategory::Recent,
            opacity: 1.0,
            stack_order: 1000,
            pulse: true,
        };
        assert_eq!(priority.halo_order(), 999);
        assert_eq!(priority.badge_order(), 1001);
    }
}
