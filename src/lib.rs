//! # texcell
//!
//! Reactive LaTeX expression engine written in Rust.
//!
//! ## Features
//!
//! - **Live Evaluation**: LaTeX snippets evaluate as arithmetic expressions
//! - **Named Variables**: `name := expr` definitions shared across a document
//! - **Reactive Updates**: dependents recompute when a definition changes
//! - **Canonical Identifiers**: `x_1` and `x_{1}` resolve to one variable
//! - **Delimiter Schemes**: dollar, bracket and custom span recognition
//! - **Cycle Rejection**: self-referential definitions fail without side effects
//! - **WASM Support**: compiles to WebAssembly for browser hosts
//!
//! ## Usage Examples
//!
//! ### Definitions and dependent expressions
//!
//! ```rust
//! use texcell::{evaluate, ListenerRegistry, VariableStore};
//!
//! let mut store = VariableStore::new();
//! let mut registry = ListenerRegistry::new();
//!
//! let def = evaluate("n := 5", &mut store, &mut registry).unwrap();
//! let id = def.defined_variable.unwrap();
//!
//! let eval = evaluate("n * 2", &mut store, &mut registry).unwrap();
//! assert_eq!(eval.value, 10.0);
//! assert!(eval.variables_used.contains(&id));
//! ```
//!
//! ### Math spans in prose
//!
//! ```rust
//! use texcell::{build_pattern, find_spans, DelimiterScheme, PatternKind};
//!
//! let pattern = build_pattern(PatternKind::Inline, &DelimiterScheme::Dollar).unwrap();
//! let spans = find_spans("an inline $x_1$ span", &pattern);
//! assert_eq!(spans[0].latex, "x_1");
//! ```

/// Core engine modules
pub mod core;

/// Data layer - static mappings and constants
pub mod data;

/// Utility modules
pub mod utils;

/// WASM bindings (feature-gated)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export the engine surface
pub use core::canonical::{canonical_name, canonical_name_loose, variable_aliases};
pub use core::delimiter::{
    build_pattern, delimiter_pair, find_first, find_spans, CustomDelimiters, DelimiterScheme,
    MathSpan, PatternKind,
};
pub use core::eval::{evaluate, Evaluation};
pub use core::numeric::{evaluate_numeric, NumericEval};
pub use core::session::{EngineOptions, Session, SpanOutcome};
pub use core::site::{format_result, MathSite};
pub use core::store::{
    notify_listeners, ListenerEntry, ListenerRegistry, UpdateCallback, Variable, VariableStore,
    MAX_NOTIFY_DEPTH,
};

// Re-export data modules
pub use data::constants;

// Re-export utilities
pub use utils::error::{EvalError, EvalResult};
pub use utils::idgen::{IdGen, RandomIdGen, SequentialIdGen};
