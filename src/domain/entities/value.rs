use std::fmt;
use std::hash::{Hash, Hasher};

// Absent and empty values collapse into `Empty`.
#[derive(Debug, Clone, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Integer(i64),
    Number(f64),
}

// 2^53; past it a whole float no longer names a single integer
const EXACT_FLOAT_LIMIT: f64 = 9_007_199_254_740_992.0;

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    pub fn number(value: f64) -> Self {
        if !value.is_finite() {
            CellValue::Empty
        } else if value.fract() == 0.0 && value.abs() <= EXACT_FLOAT_LIMIT {
            // a REAL 3.0 and a sheet's 3 compare equal
            CellValue::Integer(value as i64)
        } else {
            CellValue::Number(value)
        }
    }

    pub fn numericise(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }
        if let Ok(int) = raw.parse::<i64>() {
            return CellValue::Integer(int);
        }
        match raw.parse::<f64>() {
            Ok(float) if float.is_finite() && looks_numeric(raw) => CellValue::number(float),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

// Rust accepts "inf", "NaN" and "infinity" as floats; a sheet cell reading
// "nan" is text.
fn looks_numeric(raw: &str) -> bool {
    raw.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => true,
            (CellValue::Text(left), CellValue::Text(right)) => left == right,
            (CellValue::Integer(left), CellValue::Integer(right)) => left == right,
            (CellValue::Number(left), CellValue::Number(right)) => {
                left.to_bits() == right.to_bits()
            }
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Empty => 0_u8.hash(state),
            CellValue::Text(value) => {
                1_u8.hash(state);
                value.hash(state);
            }
            CellValue::Integer(value) => {
                2_u8.hash(state);
                value.hash(state);
            }
            CellValue::Number(value) => {
                3_u8.hash(state);
                value.to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Integer(value) => write!(f, "{value}"),
            CellValue::Number(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(pub Vec<CellValue>);

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{single}"),
            parts => {
                f.write_str("(")?;
                for (idx, part) in parts.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_blank() {
        assert_eq!(CellValue::text(""), CellValue::Empty);
        assert_eq!(CellValue::from(None::<String>), CellValue::Empty);
    }

    #[test]
    fn non_finite_numbers_are_blank() {
        assert_eq!(CellValue::number(f64::INFINITY), CellValue::Empty);
        assert_eq!(CellValue::number(f64::NEG_INFINITY), CellValue::Empty);
        assert_eq!(CellValue::number(f64::NAN), CellValue::Empty);
    }

    #[test]
    fn numbers_and_text_never_compare_equal() {
        assert_ne!(CellValue::from(1_i64), CellValue::from("1"));
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(CellValue::from(42_i64).render(), "42");
        assert_eq!(CellValue::from(1.5).render(), "1.5");
        assert_eq!(CellValue::number(-0.0).render(), "0");
    }

    #[test]
    fn numericise_reads_sheet_text() {
        assert_eq!(CellValue::numericise("12"), CellValue::from(12_i64));
        assert_eq!(CellValue::numericise("1.25"), CellValue::from(1.25));
        assert_eq!(CellValue::numericise("nan"), CellValue::from("nan"));
        assert_eq!(CellValue::numericise("inf"), CellValue::from("inf"));
        assert_eq!(CellValue::numericise(" 12"), CellValue::from(" 12"));
        assert_eq!(CellValue::numericise(""), CellValue::Empty);
    }

    #[test]
    fn large_integers_stay_exact() {
        let above = CellValue::from(9_007_199_254_740_993_i64);
        let limit = CellValue::from(9_007_199_254_740_992_i64);

        assert_ne!(above, limit);
        assert_eq!(above.render(), "9007199254740993");
        assert_eq!(
            CellValue::numericise("9007199254740993"),
            CellValue::Integer(9_007_199_254_740_993)
        );
        assert_eq!(CellValue::from(i64::MAX).render(), i64::MAX.to_string());
    }

    #[test]
    fn whole_floats_equal_integers() {
        assert_eq!(CellValue::number(3.0), CellValue::from(3_i64));
        assert_eq!(CellValue::numericise("3.0"), CellValue::from(3_i64));
        assert_ne!(CellValue::number(2.5), CellValue::from(2_i64));
        assert_eq!(CellValue::number(1e300).render(), 1e300.to_string());
    }

    #[test]
    fn composite_key_displays_as_tuple() {
        let key = Key(vec![CellValue::from(3_i64), CellValue::from("day")]);
        assert_eq!(key.to_string(), "(3, day)");
        assert_eq!(Key(vec![CellValue::from("a")]).to_string(), "a");
    }
}
