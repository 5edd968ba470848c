// ============================================================
// Layer 3 — Prediction Contract
// ============================================================
// The shape of one prediction request and its response.
//
// A request is checked field by field before anything else
// touches it:
//   carat, x, y, z   → finite and strictly positive
//   depth, table     → finite and strictly inside (0, 100)
//   cut/color/clarity → exact members of their vocabularies
//
// All violations are collected into a single ValidationError
// so the caller learns about every bad field at once.
// Nothing is coerced, and unknown JSON fields are rejected.
//
// Reference: Rust Book §9 (To panic! or Not to panic!)
//            serde crate documentation (container attributes)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::diamond::{feature_row, FeatureRow};
use crate::domain::error::{CategoryError, FieldError, ValidationError};
use crate::domain::vocabulary::{encode, CategoryColumn};

/// Body of `POST /predict`: one diamond without its price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictionRequest {
    pub carat:   f64,
    pub cut:     String,
    pub color:   String,
    pub clarity: String,
    pub depth:   f64,
    pub table:   f64,
    pub x:       f64,
    pub y:       f64,
    pub z:       f64,
}

/// Body of a successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_price: f64,
    pub model_version:   String,
}

impl PredictionResponse {
    /// Build a response, rounding the price to cents
    pub fn new(price: f64, model_version: impl Into<String>) -> Self {
        Self {
            predicted_price: (price * 100.0).round() / 100.0,
            model_version:   model_version.into(),
        }
    }
}

/// Every field of a request body, in declaration order
const REQUEST_FIELDS: [&str; 9] =
    ["carat", "cut", "color", "clarity", "depth", "table", "x", "y", "z"];

impl PredictionRequest {
    /// Parse a JSON body. Missing fields, wrong types and unknown
    /// fields are each reported under their own name; only a body
    /// that is not a JSON object at all is reported as `body`.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::single("body", e.to_string()))?;
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ValidationError::single(
                    "body",
                    format!("expected a JSON object, got {}", json_kind(&other)),
                ))
            }
        };

        let mut fields = Vec::new();
        let request = Self {
            carat:   number_field(&map, "carat", &mut fields),
            cut:     label_field(&map, "cut", &mut fields),
            color:   label_field(&map, "color", &mut fields),
            clarity: label_field(&map, "clarity", &mut fields),
            depth:   number_field(&map, "depth", &mut fields),
            table:   number_field(&map, "table", &mut fields),
            x:       number_field(&map, "x", &mut fields),
            y:       number_field(&map, "y", &mut fields),
            z:       number_field(&map, "z", &mut fields),
        };

        for key in map.keys().filter(|k| !REQUEST_FIELDS.contains(&k.as_str())) {
            fields.push(FieldError::new(key.as_str(), "unknown field"));
        }

        if fields.is_empty() {
            Ok(request)
        } else {
            Err(ValidationError { fields })
        }
    }

    /// Check every field against its range or vocabulary
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut fields = Vec::new();

        for (name, value) in [
            ("carat", self.carat),
            ("x", self.x),
            ("y", self.y),
            ("z", self.z),
        ] {
            if !value.is_finite() {
                fields.push(FieldError::new(name, "must be a finite number"));
            } else if value <= 0.0 {
                fields.push(FieldError::new(name, format!("must be greater than 0, got {value}")));
            }
        }

        for (name, value) in [("depth", self.depth), ("table", self.table)] {
            if !value.is_finite() {
                fields.push(FieldError::new(name, "must be a finite number"));
            } else if value <= 0.0 || value >= 100.0 {
                fields.push(FieldError::new(
                    name,
                    format!("must be strictly between 0 and 100, got {value}"),
                ));
            }
        }

        // Membership goes through the encoder itself so there is
        // no second copy of the vocabularies to drift out of sync.
        for (column, label) in self.labels() {
            if let Err(e) = encode(column, label) {
                fields.push(FieldError::new(column.name(), e.to_string()));
            }
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields })
        }
    }

    /// Encode into the model's feature order:
    /// [carat, depth, table, x, y, z, cut, color, clarity]
    pub fn feature_row(&self) -> Result<FeatureRow, CategoryError> {
        Ok(feature_row(
            [self.carat, self.depth, self.table, self.x, self.y, self.z],
            [
                encode(CategoryColumn::Cut, &self.cut)?,
                encode(CategoryColumn::Color, &self.color)?,
                encode(CategoryColumn::Clarity, &self.clarity)?,
            ],
        ))
    }

    fn labels(&self) -> [(CategoryColumn, &str); 3] {
        [
            (CategoryColumn::Cut, self.cut.as_str()),
            (CategoryColumn::Color, self.color.as_str()),
            (CategoryColumn::Clarity, self.clarity.as_str()),
        ]
    }
}

/// A JSON number; strings holding numbers are not accepted
fn number_field(map: &Map<String, Value>, name: &str, errors: &mut Vec<FieldError>) -> f64 {
    match map.get(name) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(other) => {
            errors.push(FieldError::new(name, format!("must be a number, got {}", json_kind(other))));
            f64::NAN
        }
        None => {
            errors.push(FieldError::new(name, "field required"));
            f64::NAN
        }
    }
}

fn label_field(map: &Map<String, Value>, name: &str, errors: &mut Vec<FieldError>) -> String {
    match map.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            errors.push(FieldError::new(name, format!("must be a string, got {}", json_kind(other))));
            String::new()
        }
        None => {
            errors.push(FieldError::new(name, "field required"));
            String::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_)  => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
pub(crate) fn sample_request() -> PredictionRequest {
    PredictionRequest {
        carat:   1.0,
        cut:     "Ideal".into(),
        color:   "E".into(),
        clarity: "SI1".into(),
        depth:   61.5,
        table:   55.0,
        x:       6.5,
        y:       6.5,
        z:       4.0,
    }
}
