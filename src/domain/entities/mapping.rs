use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pairs: Vec<(String, String)>,
}

impl ColumnMapping {
    #[allow(dead_code)]
    pub fn new<L, R>(pairs: impl IntoIterator<Item = (L, R)>) -> Self
    where
        L: Into<String>,
        R: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(left, right)| (left.into(), right.into()))
                .collect(),
        }
    }

    #[allow(dead_code)]
    pub fn identity<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self::new(columns.into_iter().map(|column| {
            let column = column.into();
            (column.clone(), column)
        }))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(left, right)| (left.as_str(), right.as_str()))
    }
}

impl<'de> Deserialize<'de> for ColumnMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = ColumnMapping;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping spreadsheet columns to warehouse columns")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::new();
                while let Some((left, right)) = map.next_entry::<String, String>()? {
                    pairs.push((left, right));
                }
                Ok(ColumnMapping { pairs })
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_keeps_document_order() {
        let mapping: ColumnMapping =
            serde_json::from_str(r#"{"zeta": "z", "alpha": "a", "mid": "m"}"#)
                .expect("mapping should parse");

        let pairs: Vec<(&str, &str)> = mapping.pairs().collect();
        assert_eq!(pairs, vec![("zeta", "z"), ("alpha", "a"), ("mid", "m")]);
    }
}
