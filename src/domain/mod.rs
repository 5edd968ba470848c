// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing what a
// diamond is, how its categories are encoded, and what a
// valid prediction request looks like.
//
// Rules for this layer:
//   - NO file I/O or network calls
//   - NO gradient-boosting or HTTP types
//   - Only pure functions over plain data
//
// Everything here is safe to call concurrently from any
// number of request handlers.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Raw and encoded diamond rows, feature order
pub mod diamond;

// Ordinal vocabularies and the category encoder
pub mod vocabulary;

// Prediction request/response and validation
pub mod contract;

// Typed errors
pub mod error;

// Abstractions implemented by the data and ml layers
pub mod traits;
