// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw CSV file to model-ready rows.
//
//   diamonds.csv (raw)
//       │
//       ▼
//   CsvDiamondSource  → reads rows, fails if the file is missing
//       │
//       ▼
//   zero-dimension drop (x, y or z == 0)
//       │
//       ▼
//   outlier::filter   → sequential IQR band per numeric column
//       │
//       ▼
//   Diamond::encode   → ordinal ranks for cut, color, clarity
//       │
//       ▼
//   ProcessedStore    → overwrites diamonds_processed.csv
//       │
//       ▼
//   splitter          → seeded 80/20 train/test partition
//
// The sequencing itself lives in the application layer
// (PrepareUseCase); each module here does exactly one step.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Reads the raw diamonds CSV
pub mod loader;

/// Row container and train/test split types
pub mod dataset;

/// IQR-based outlier removal
pub mod outlier;

/// Writes and reads the processed CSV
pub mod store;

/// Seeded train/test splitting
pub mod splitter;
