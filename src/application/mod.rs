// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one goal per use case.
//
// Rules for this layer:
//   - No boosting math here (that's Layer 5)
//   - No printing or HTTP here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Raw CSV → cleaned, encoded, persisted dataset + split
pub mod prepare_use_case;

// Grid search, evaluation and registration
pub mod train_use_case;

// Latest registered model → local serving directory
pub mod fetch_use_case;

// Model loading and request → prediction flow
pub mod predict_use_case;
