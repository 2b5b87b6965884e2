//! Pokemon filter criteria.
//!
//! A passing pokemon must have at least one type in the filter's type set,
//! a height inside the height range and a base experience inside the XP
//! range. Both ranges are inclusive. A missing height or XP never matches.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// Inclusive `[low, high]` bound, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds(i64, i64);

impl Bounds {
    fn from_slice(field: &'static str, bounds: &[i64]) -> Result<Self, ValidationError> {
        let [low, high] = bounds else {
            return Err(ValidationError::RangeArity {
                field,
                len: bounds.len(),
            });
        };
        if low > high {
            return Err(ValidationError::InvertedRange {
                field,
                low: *low,
                high: *high,
            });
        }
        Ok(Bounds(*low, *high))
    }

    pub fn low(&self) -> i64 {
        self.0
    }

    pub fn high(&self) -> i64 {
        self.1
    }

    fn contains(&self, value: Option<i64>) -> bool {
        value.is_some_and(|v| v >= self.0 && v <= self.1)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.low(), self.high())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    types: BTreeSet<String>,
    height_range: Bounds,
    xp_range: Bounds,
}

impl Filter {
    pub fn new<I, S>(
        types: I,
        height_range: &[i64],
        xp_range: &[i64],
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types: BTreeSet<String> = types.into_iter().map(Into::into).collect();
        if types.is_empty() {
            return Err(ValidationError::EmptyTypes);
        }
        Ok(Filter {
            types,
            height_range: Bounds::from_slice("height_range", height_range)?,
            xp_range: Bounds::from_slice("xp_range", xp_range)?,
        })
    }

    /// Build a filter from a loosely typed document such as a config table
    /// or a `--filter-file`. Every element is type-checked.
    ///
    /// ```json
    /// {"types": ["grass"], "height_range": [1, 100], "xp_range": [20, 200]}
    /// ```
    pub fn from_json(doc: &Value) -> Result<Self, ValidationError> {
        let types = array_field(doc, "types")?
            .iter()
            .enumerate()
            .map(|(index, t)| {
                t.as_str()
                    .map(str::to_string)
                    .ok_or(ValidationError::NonStringType { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let height = int_bounds(doc, "height_range")?;
        let xp = int_bounds(doc, "xp_range")?;
        Filter::new(types, &height, &xp)
    }

    pub fn types(&self) -> &BTreeSet<String> {
        &self.types
    }

    pub fn height_range(&self) -> Bounds {
        self.height_range
    }

    pub fn xp_range(&self) -> Bounds {
        self.xp_range
    }

    pub fn height_in_range(&self, height: Option<i64>) -> bool {
        self.height_range.contains(height)
    }

    pub fn xp_in_range(&self, xp: Option<i64>) -> bool {
        self.xp_range.contains(xp)
    }

    /// True if at least one of `types` is wanted. Stops at the first hit.
    pub fn type_matches(&self, types: &BTreeSet<String>) -> bool {
        types.iter().any(|t| self.types.contains(t))
    }

    pub fn matching_types(&self, types: &BTreeSet<String>) -> BTreeSet<String> {
        self.types.intersection(types).cloned().collect()
    }

    pub fn matches(
        &self,
        height: Option<i64>,
        xp: Option<i64>,
        types: &BTreeSet<String>,
    ) -> bool {
        self.xp_in_range(xp) && self.height_in_range(height) && self.type_matches(types)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<&str> = self.types().iter().map(String::as_str).collect();
        write!(
            f,
            "types=[{}] height={} xp={}",
            types.join(", "),
            self.height_range(),
            self.xp_range()
        )
    }
}

fn array_field<'a>(
    doc: &'a Value,
    field: &'static str,
) -> Result<&'a Vec<Value>, ValidationError> {
    doc.get(field)
        .ok_or(ValidationError::MissingField(field))?
        .as_array()
        .ok_or(ValidationError::NotAnArray(field))
}

fn int_bounds(doc: &Value, field: &'static str) -> Result<Vec<i64>, ValidationError> {
    array_field(doc, field)?
        .iter()
        .enumerate()
        .map(|(index, b)| {
            b.as_i64()
                .ok_or(ValidationError::NonIntegerBound { field, index })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Filter {
        Filter::new(["test"], &[1, 4], &[5, 8]).unwrap()
    }

    #[test]
    fn construct_valid() {
        let f = Filter::new(["type"], &[1, 2], &[3, 4]).unwrap();
        assert_eq!(f.types(), &set(&["type"]));
        assert_eq!(f.height_range(), Bounds(1, 2));
        assert_eq!(f.xp_range(), Bounds(3, 4));
    }

    #[test]
    fn single_point_range_is_valid() {
        let f = Filter::new(["type"], &[7, 7], &[0, 0]).unwrap();
        assert!(f.height_in_range(Some(7)));
        assert!(f.xp_in_range(Some(0)));
    }

    #[test]
    fn reject_empty_types() {
        let err = Filter::new(Vec::<String>::new(), &[1, 2], &[3, 4]).unwrap_err();
        assert_eq!(err, ValidationError::EmptyTypes);
    }

    #[test]
    fn reject_wrong_arity() {
        let err = Filter::new(["type"], &[1], &[1, 3]).unwrap_err();
        assert_eq!(err, ValidationError::RangeArity { field: "height_range", len: 1 });

        let err = Filter::new(["type"], &[1, 3], &[1, 2, 3]).unwrap_err();
        assert_eq!(err, ValidationError::RangeArity { field: "xp_range", len: 3 });
    }

    #[test]
    fn reject_inverted_range() {
        let err = Filter::new(["type"], &[5, 1], &[1, 3]).unwrap_err();
        assert!(matches!(err, ValidationError::InvertedRange { field: "height_range", .. }));
    }

    #[test]
    fn from_json_valid() {
        let doc = json!({
            "types": ["grass", "poison"],
            "height_range": [1, 100],
            "xp_range": [20, 200],
        });
        let f = Filter::from_json(&doc).unwrap();
        assert_eq!(f.types(), &set(&["grass", "poison"]));
        assert_eq!(f.xp_range(), Bounds(20, 200));
    }

    #[test]
    fn from_json_rejects_bad_shapes() {
        let cases = [
            (
                json!({"types": [1], "height_range": [1, 2], "xp_range": [3, 4]}),
                ValidationError::NonStringType { index: 0 },
            ),
            (
                json!({"types": [], "height_range": [1, 2], "xp_range": [3, 4]}),
                ValidationError::EmptyTypes,
            ),
            (
                json!({"types": ["type"], "height_range": ["a", 3], "xp_range": [1, 3]}),
                ValidationError::NonIntegerBound { field: "height_range", index: 0 },
            ),
            (
                json!({"types": ["type"], "height_range": [1, 3], "xp_range": ["a", 3]}),
                ValidationError::NonIntegerBound { field: "xp_range", index: 0 },
            ),
            (
                json!({"types": ["type"], "height_range": 1, "xp_range": [1, 3]}),
                ValidationError::NotAnArray("height_range"),
            ),
            (
                json!({"types": ["type"], "height_range": [1, 3], "xp_range": [1]}),
                ValidationError::RangeArity { field: "xp_range", len: 1 },
            ),
            (
                json!({"types": "grass", "height_range": [1, 3], "xp_range": [1, 3]}),
                ValidationError::NotAnArray("types"),
            ),
            (
                json!({"height_range": [1, 3], "xp_range": [1, 3]}),
                ValidationError::MissingField("types"),
            ),
            (
                json!({"types": ["type"], "height_range": [1.5, 3], "xp_range": [1, 3]}),
                ValidationError::NonIntegerBound { field: "height_range", index: 0 },
            ),
        ];
        for (doc, expected) in cases {
            assert_eq!(Filter::from_json(&doc).unwrap_err(), expected, "doc: {doc}");
        }
    }

    #[test]
    fn height_in_range() {
        let f = sample();
        assert!(f.height_in_range(Some(1)));
        assert!(f.height_in_range(Some(2)));
        assert!(f.height_in_range(Some(4)));

        assert!(!f.height_in_range(Some(0)));
        assert!(!f.height_in_range(Some(5)));
        assert!(!f.height_in_range(None));
    }

    #[test]
    fn xp_in_range() {
        let f = sample();
        assert!(f.xp_in_range(Some(5)));
        assert!(f.xp_in_range(Some(6)));
        assert!(f.xp_in_range(Some(8)));

        assert!(!f.xp_in_range(Some(4)));
        assert!(!f.xp_in_range(Some(9)));
        assert!(!f.xp_in_range(None));
    }

    #[test]
    fn types_match() {
        let f = Filter::new(["type1", "type2"], &[0, 10], &[0, 10]).unwrap();
        assert!(f.type_matches(&set(&["type1"])));
        assert!(f.type_matches(&set(&["type2"])));
        assert!(f.type_matches(&set(&["type1", "not-type"])));
        assert!(!f.type_matches(&set(&["not-type"])));
        assert!(!f.type_matches(&set(&[])));
    }

    #[test]
    fn matching_types() {
        let f = Filter::new(["type1", "type2"], &[0, 10], &[0, 10]).unwrap();
        assert_eq!(f.matching_types(&set(&["type1"])), set(&["type1"]));
        assert_eq!(f.matching_types(&set(&["type2"])), set(&["type2"]));
        assert_eq!(f.matching_types(&set(&["not-type"])), set(&[]));
        assert_eq!(f.matching_types(&set(&["type1", "type2"])), set(&["type1", "type2"]));
        assert_eq!(f.matching_types(&set(&["type1", "non-type"])), set(&["type1"]));
    }

    #[test]
    fn queries_are_repeatable() {
        let f = Filter::new(["grass", "poison"], &[1, 100], &[20, 200]).unwrap();
        let types = set(&["grass", "fire"]);
        assert_eq!(f.matching_types(&types), f.matching_types(&types));
        assert_eq!(f.matches(Some(50), Some(100), &types), f.matches(Some(50), Some(100), &types));
        assert!(f.matches(Some(50), Some(100), &types));
    }

    #[test]
    fn display_lists_criteria() {
        let f = Filter::new(["poison", "grass"], &[1, 100], &[20, 200]).unwrap();
        assert_eq!(f.to_string(), "types=[grass, poison] height=1..=100 xp=20..=200");
    }

    #[test]
    fn serializes_ranges_as_pairs() {
        let f = Filter::new(["grass"], &[1, 100], &[20, 200]).unwrap();
        let v = serde_json::to_value(&f).unwrap();
        assert_eq!(v, json!({"types": ["grass"], "height_range": [1, 100], "xp_range": [20, 200]}));
        assert_eq!(Filter::from_json(&v).unwrap(), f);
    }
}
