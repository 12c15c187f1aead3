use std::cmp::Ordering;
use std::num::IntErrorKind;

/// Ordering applied to the values of the sort column.
///
/// The same comparator orders the records of every run and drives the merge of the runs.
/// Numeric modes never fail: text that does not parse is compared as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Comparator {
    /// Lexicographic byte order
    #[default]
    String,
    /// Signed 64 bit integer
    Integer,
    /// 64 bit floating point number
    Float,
}

impl Comparator {
    /// Select a comparator by mode name.
    ///
    /// Accepts `string`, `int`/`integer` and `float`/`number`. Missing or unrecognized names
    /// select [Comparator::String].
    ///
    /// # Examples
    /// ```
    /// use csv_file_sort::comparator::Comparator;
    /// assert_eq!(Comparator::from_mode(Some("int")), Comparator::Integer);
    /// assert_eq!(Comparator::from_mode(Some("decimal")), Comparator::String);
    /// assert_eq!(Comparator::from_mode(None), Comparator::String);
    /// ```
    pub fn from_mode(mode: Option<&str>) -> Comparator {
        match mode.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            Some("int") | Some("integer") => Comparator::Integer,
            Some("float") | Some("number") => Comparator::Float,
            _ => Comparator::String,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Comparator::String => "string",
            Comparator::Integer => "integer",
            Comparator::Float => "float",
        }
    }

    /// Compare two column values.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            Comparator::String => a.as_bytes().cmp(b.as_bytes()),
            Comparator::Integer => parse_integer(a).cmp(&parse_integer(b)),
            Comparator::Float => compare_floats(parse_float(a), parse_float(b)),
        }
    }
}

fn parse_integer(value: &str) -> i64 {
    match value.parse::<i64>() {
        Ok(i) => i,
        Err(e) => match e.kind() {
            // out of range values saturate
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => 0,
        },
    }
}

fn parse_float(value: &str) -> f64 {
    value.parse::<f64>().unwrap_or(0.0)
}

// NaN equals NaN and sorts before every number.
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}
