// ============================================================
// Layer 3 — Ordinal Vocabularies & Category Encoder
// ============================================================
// The three categorical diamond attributes are ordinal: each
// has a fixed, worst-to-best ordering of labels, and a label's
// encoded value is simply its zero-based position.
//
//   cut:     Fair < Good < Very Good < Premium < Ideal
//   color:   J < I < H < G < F < E < D
//   clarity: I1 < SI2 < SI1 < VS2 < VS1 < VVS2 < VVS1 < IF
//
// These orderings are a contract with every trained model.
// They are published as a versioned schema: the version is
// stored next to each registered model and checked when the
// model is loaded for serving. Reordering a vocabulary means
// bumping SCHEMA_VERSION and retraining, never editing in place.
//
// Training-time preparation and inference both call `encode`
// from this module; there is exactly one lookup routine.
//
// Reference: Rust Book §6 (Enums and Pattern Matching)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::CategoryError;

/// Version of the ordinal schema below
pub const SCHEMA_VERSION: u32 = 1;

const CUT_ORDER:     &[&str] = &["Fair", "Good", "Very Good", "Premium", "Ideal"];
const COLOR_ORDER:   &[&str] = &["J", "I", "H", "G", "F", "E", "D"];
const CLARITY_ORDER: &[&str] = &["I1", "SI2", "SI1", "VS2", "VS1", "VVS2", "VVS1", "IF"];

/// The three ordinal (categorical) columns of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryColumn {
    Cut,
    Color,
    Clarity,
}

impl CategoryColumn {
    pub const ALL: [CategoryColumn; 3] = [Self::Cut, Self::Color, Self::Clarity];

    pub fn name(self) -> &'static str {
        match self {
            Self::Cut     => "cut",
            Self::Color   => "color",
            Self::Clarity => "clarity",
        }
    }

    /// Ordered labels of this column, worst first
    pub fn vocabulary(self) -> &'static [&'static str] {
        match self {
            Self::Cut     => CUT_ORDER,
            Self::Color   => COLOR_ORDER,
            Self::Clarity => CLARITY_ORDER,
        }
    }
}

impl fmt::Display for CategoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encode `label` as its zero-based rank in `column`'s vocabulary.
/// The match is exact and case-sensitive.
pub fn encode(column: CategoryColumn, label: &str) -> Result<u8, CategoryError> {
    column
        .vocabulary()
        .iter()
        .position(|&l| l == label)
        .map(|rank| rank as u8)
        .ok_or_else(|| CategoryError { column, label: label.to_string() })
}

/// Label at `rank`, or None when the rank is out of range
#[allow(dead_code)]
pub fn decode(column: CategoryColumn, rank: u8) -> Option<&'static str> {
    column.vocabulary().get(rank as usize).copied()
}

// ─── Schema Snapshot ──────────────────────────────────────────────────────────
/// Serialisable snapshot of the vocabularies, saved with every
/// registered model so a server can refuse a model that was
/// trained against a different ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalSchema {
    pub version: u32,
    pub cut:     Vec<String>,
    pub color:   Vec<String>,
    pub clarity: Vec<String>,
}

impl OrdinalSchema {
    /// The schema compiled into this binary
    pub fn current() -> Self {
        let owned = |c: CategoryColumn| c.vocabulary().iter().map(|s| s.to_string()).collect();
        Self {
            version: SCHEMA_VERSION,
            cut:     owned(CategoryColumn::Cut),
            color:   owned(CategoryColumn::Color),
            clarity: owned(CategoryColumn::Clarity),
        }
    }

    pub fn is_current(&self) -> bool {
        *self == Self::current()
    }
}
