use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature<T> {
    Disabled,
    Enabled(T),
}

impl<T> Feature<T> {
    pub fn enabled(&self) -> Option<&T> {
        match self {
            Feature::Disabled => None,
            Feature::Enabled(params) => Some(params),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Feature::Enabled(_))
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Feature<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut section = Map::deserialize(deserializer)?;
        let enabled = match section.remove("enabled") {
            Some(Value::Bool(enabled)) => enabled,
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "`enabled` must be true or false, found {other}"
                )))
            }
            None => return Err(D::Error::missing_field("enabled")),
        };
        if !enabled {
            return Ok(Feature::Disabled);
        }
        serde_json::from_value(Value::Object(section))
            .map(Feature::Enabled)
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq, Eq)]
    struct Params {
        filename: String,
    }

    #[test]
    fn disabled_section_ignores_its_parameters() {
        let feature: Feature<Params> =
            serde_json::from_str(r#"{"enabled": false, "unrelated": 1}"#).expect("should parse");
        assert_eq!(feature, Feature::Disabled);
    }

    #[test]
    fn enabled_section_requires_its_parameters() {
        let feature: Feature<Params> =
            serde_json::from_str(r#"{"enabled": true, "filename": "positions"}"#)
                .expect("should parse");
        assert_eq!(
            feature.enabled(),
            Some(&Params {
                filename: "positions".to_string()
            })
        );

        let err = serde_json::from_str::<Feature<Params>>(r#"{"enabled": true}"#)
            .expect_err("missing parameter should fail");
        assert!(err.to_string().contains("filename"), "{err}");
    }

    #[test]
    fn enabled_flag_is_required_and_boolean() {
        assert!(serde_json::from_str::<Feature<Params>>(r#"{"filename": "x"}"#).is_err());
        assert!(serde_json::from_str::<Feature<Params>>(r#"{"enabled": "yes"}"#).is_err());
    }
}
