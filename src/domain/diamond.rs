// ============================================================
// Layer 3 — Diamond Records
// ============================================================
// A `Diamond` is one raw observation as it appears in the
// source CSV, categorical columns still as string labels.
// An `EncodedDiamond` is the same observation after the
// category encoder replaced each label with its rank.
//
// The model never sees either struct directly: it sees a
// `FeatureRow`, a fixed-order array of nine numbers. The
// order is a strict contract with the trained model, so
// both the training rows and the serving rows are produced
// by `feature_row` below.
//
// Reference: Rust Book §5 (Structs and Methods)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::CategoryError;
use crate::domain::vocabulary::{encode, CategoryColumn};

/// Number of model input features
pub const FEATURE_COUNT: usize = 9;

/// Feature column order expected by every trained model
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "carat", "depth", "table", "x", "y", "z", "cut", "color", "clarity",
];

/// One model input row, ordered as FEATURE_NAMES
pub type FeatureRow = [f64; FEATURE_COUNT];

/// A raw diamond observation. Field order matches the
/// column order of the seaborn diamonds CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diamond {
    pub carat:   f64,
    pub cut:     String,
    pub color:   String,
    pub clarity: String,
    pub depth:   f64,
    pub table:   f64,
    pub price:   f64,
    pub x:       f64,
    pub y:       f64,
    pub z:       f64,
}

impl Diamond {
    /// True when any physical dimension is exactly zero
    pub fn has_zero_dimension(&self) -> bool {
        self.x == 0.0 || self.y == 0.0 || self.z == 0.0
    }

    /// Replace the three labels with their ordinal ranks
    pub fn encode(&self) -> Result<EncodedDiamond, CategoryError> {
        Ok(EncodedDiamond {
            carat:   self.carat,
            cut:     encode(CategoryColumn::Cut, &self.cut)?,
            color:   encode(CategoryColumn::Color, &self.color)?,
            clarity: encode(CategoryColumn::Clarity, &self.clarity)?,
            depth:   self.depth,
            table:   self.table,
            price:   self.price,
            x:       self.x,
            y:       self.y,
            z:       self.z,
        })
    }
}

/// A diamond whose categorical columns hold ordinal ranks.
/// Serialised with the same column order as `Diamond`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedDiamond {
    pub carat:   f64,
    pub cut:     u8,
    pub color:   u8,
    pub clarity: u8,
    pub depth:   f64,
    pub table:   f64,
    pub price:   f64,
    pub x:       f64,
    pub y:       f64,
    pub z:       f64,
}

impl EncodedDiamond {
    pub fn feature_row(&self) -> FeatureRow {
        feature_row(
            [self.carat, self.depth, self.table, self.x, self.y, self.z],
            [self.cut, self.color, self.clarity],
        )
    }
}

/// Assemble a model input row from the six numeric measurements
/// (carat, depth, table, x, y, z) and the three ranks
/// (cut, color, clarity).
pub fn feature_row(numeric: [f64; 6], ranks: [u8; 3]) -> FeatureRow {
    let [carat, depth, table, x, y, z] = numeric;
    let [cut, color, clarity]          = ranks;
    [
        carat, depth, table, x, y, z,
        f64::from(cut), f64::from(color), f64::from(clarity),
    ]
}

// ─── Numeric Columns ──────────────────────────────────────────────────────────
/// Numeric columns that can be named in configuration,
/// e.g. as outlier-filter columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericColumn {
    Carat,
    Depth,
    Table,
    Price,
    X,
    Y,
    Z,
}

impl NumericColumn {
    pub fn name(self) -> &'static str {
        match self {
            Self::Carat => "carat",
            Self::Depth => "depth",
            Self::Table => "table",
            Self::Price => "price",
            Self::X     => "x",
            Self::Y     => "y",
            Self::Z     => "z",
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "carat" => Ok(Self::Carat),
            "depth" => Ok(Self::Depth),
            "table" => Ok(Self::Table),
            "price" => Ok(Self::Price),
            "x"     => Ok(Self::X),
            "y"     => Ok(Self::Y),
            "z"     => Ok(Self::Z),
            other   => Err(format!("unknown numeric column '{other}'")),
        }
    }
}

/// Rows that expose their numeric columns by name
pub trait NumericRow {
    fn numeric(&self, column: NumericColumn) -> f64;
}

impl NumericRow for Diamond {
    fn numeric(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::Carat => self.carat,
            NumericColumn::Depth => self.depth,
            NumericColumn::Table => self.table,
            NumericColumn::Price => self.price,
            NumericColumn::X     => self.x,
            NumericColumn::Y     => self.y,
            NumericColumn::Z     => self.z,
        }
    }
}

impl NumericRow for EncodedDiamond {
    fn numeric(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::Carat => self.carat,
            NumericColumn::Depth => self.depth,
            NumericColumn::Table => self.table,
            NumericColumn::Price => self.price,
            NumericColumn::X     => self.x,
            NumericColumn::Y     => self.y,
            NumericColumn::Z     => self.z,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_diamond() -> Diamond {
    Diamond {
        carat:   1.0,
        cut:     "Ideal".into(),
        color:   "E".into(),
        clarity: "SI1".into(),
        depth:   61.5,
        table:   55.0,
        price:   5000.0,
        x:       6.5,
        y:       6.5,
        z:       4.0,
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_row_order() {
        let row = sample_diamond().encode().unwrap().feature_row();
        // Ideal = 4, E = 5, SI1 = 2
        assert_eq!(row, [1.0, 61.5, 55.0, 6.5, 6.5, 4.0, 4.0, 5.0, 2.0]);
        assert_eq!(&FEATURE_NAMES[6..], &["cut", "color", "clarity"]);
    }

    #[test]
    fn test_zero_dimension_detection() {
        let mut d = sample_diamond();
        assert!(!d.has_zero_dimension());
        d.y = 0.0;
        assert!(d.has_zero_dimension());
    }

    #[test]
    fn test_encode_rejects_unknown_label() {
        let mut d = sample_diamond();
        d.clarity = "SI3".into();
        let err = d.encode().unwrap_err();
        assert_eq!(err.column, CategoryColumn::Clarity);
    }

    #[test]
    fn test_numeric_column_parsing() {
        assert_eq!("carat".parse::<NumericColumn>().unwrap(), NumericColumn::Carat);
        assert_eq!("z".parse::<NumericColumn>().unwrap(), NumericColumn::Z);
        assert!("cut".parse::<NumericColumn>().is_err());
    }

    #[test]
    fn test_numeric_accessor_matches_fields() {
        let d = sample_diamond();
        assert_eq!(d.numeric(NumericColumn::Depth), 61.5);
        assert_eq!(d.numeric(NumericColumn::Price), 5000.0);
        let e = d.encode().unwrap();
        assert_eq!(e.numeric(NumericColumn::Table), 55.0);
    }
}
