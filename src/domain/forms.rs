//! Raw request bodies as the map client sends them
//!
//! The client posts form state directly, so numeric fields may arrive as
//! numbers, numeric strings, empty strings or null, and flags may arrive as
//! anything truthy. These types capture that shape; normalization into
//! records happens in `services::submission`.

use crate::domain::types::SlopeType;
use serde::{Deserialize, Deserializer};

/// Body of `POST /places` and `PUT /places`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceForm {
    /// Required for updates, ignored on create
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "optional_number")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub ramp: Option<String>,
    #[serde(default)]
    pub door: Option<String>,
    #[serde(default)]
    pub space: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    pub threshold: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub door_width: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "truthy")]
    pub has_restroom: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub has_parking: bool,
    #[serde(default, deserialize_with = "optional_number")]
    pub slope: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub ramp_slope: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub ramp_width: Option<f64>,
    #[serde(default, deserialize_with = "truthy")]
    pub has_bell: bool,
    #[serde(default)]
    pub bell_status: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
}

/// Body of `POST /reports`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportForm {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub place_name: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    pub step_height_cm: Option<f64>,
    #[serde(default)]
    pub slope_type: Option<SlopeType>,
    /// Already-uploaded entrance photo
    #[serde(default)]
    pub photo_url1: Option<String>,
    /// Already-uploaded step detail photo
    #[serde(default)]
    pub photo_url2: Option<String>,
    #[serde(default)]
    pub user_memo: Option<String>,
}

/// Accept a number, a numeric string, an empty string or null.
///
/// Anything that does not read as a finite number becomes `None`.
fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct NumberVisitor;

    impl<'de> Visitor<'de> for NumberVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number, a numeric string or null")
        }

        fn visit_f64<E>(self, value: f64) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(value.is_finite().then_some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_str<E>(self, value: &str) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(value.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        }

        fn visit_bool<E>(self, _value: bool) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Option<f64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Option<f64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(NumberVisitor)
        }
    }

    deserializer.deserialize_any(NumberVisitor)
}

/// Read any JSON value as a flag: false, 0, "", and null are false, the rest true
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};

    struct TruthyVisitor;

    impl<'de> Visitor<'de> for TruthyVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("any value")
        }

        fn visit_bool<E>(self, value: bool) -> Result<bool, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<bool, E>
        where
            E: de::Error,
        {
            Ok(value != 0)
        }

        fn visit_u64<E>(self, value: u64) -> Result<bool, E>
        where
            E: de::Error,
        {
            Ok(value != 0)
        }

        fn visit_f64<E>(self, value: f64) -> Result<bool, E>
        where
            E: de::Error,
        {
            Ok(value != 0.0 && !value.is_nan())
        }

        fn visit_str<E>(self, value: &str) -> Result<bool, E>
        where
            E: de::Error,
        {
            Ok(!value.is_empty())
        }

        fn visit_unit<E>(self) -> Result<bool, E>
        where
            E: de::Error,
        {
            Ok(false)
        }

        fn visit_none<E>(self) -> Result<bool, E>
        where
            E: de::Error,
        {
            Ok(false)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<bool, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(TruthyVisitor)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<bool, A::Error>
        where
            A: SeqAccess<'de>,
        {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(true)
        }

        fn visit_map<A>(self, mut map: A) -> Result<bool, A::Error>
        where
            A: MapAccess<'de>,
        {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(true)
        }
    }

    deserializer.deserialize_any(TruthyVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_form_numbers_are_lenient() {
        let form: PlaceForm = serde_json::from_str(
            r#"{
                "name": "Cafe",
                "lat": "35.17",
                "lng": 126.91,
                "ramp": "평지",
                "door": "자동문",
                "threshold": "",
                "door_width": "95",
                "ramp_slope": null,
                "ramp_width": "wide"
            }"#,
        )
        .unwrap();

        assert_eq!(form.lat, Some(35.17));
        assert_eq!(form.lng, Some(126.91));
        assert_eq!(form.threshold, None);
        assert_eq!(form.door_width, Some(95.0));
        assert_eq!(form.ramp_slope, None);
        assert_eq!(form.ramp_width, None);
        assert_eq!(form.slope, None);
    }

    #[test]
    fn test_place_form_flags_are_truthy() {
        let form: PlaceForm = serde_json::from_str(
            r#"{"has_restroom": "yes", "has_parking": 0, "has_bell": null}"#,
        )
        .unwrap();
        assert!(form.has_restroom);
        assert!(!form.has_parking);
        assert!(!form.has_bell);

        let form: PlaceForm =
            serde_json::from_str(r#"{"has_restroom": [], "has_parking": 1.5}"#).unwrap();
        assert!(form.has_restroom);
        assert!(form.has_parking);
    }

    #[test]
    fn test_report_form_camel_case() {
        let form: ReportForm = serde_json::from_str(
            r#"{
                "placeName": "Library",
                "userId": "u-1",
                "latitude": 35.1,
                "longitude": "126.9",
                "stepHeightCm": "3.5",
                "slopeType": "STEEP"
            }"#,
        )
        .unwrap();

        assert_eq!(form.place_name, "Library");
        assert_eq!(form.user_id.as_deref(), Some("u-1"));
        assert_eq!(form.longitude, Some(126.9));
        assert_eq!(form.step_height_cm, Some(3.5));
        assert_eq!(form.slope_type, Some(SlopeType::Steep));
    }
}
