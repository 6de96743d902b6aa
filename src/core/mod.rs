//! Core engine modules
//!
//! - `canonical`: canonical identifier derivation for variable fragments
//! - `delimiter`: math-span recognition in prose text
//! - `eval`: the evaluation pipeline over a shared variable store
//! - `numeric`: numeric interpretation of parsed LaTeX expressions
//! - `site`: reactive display-site lifecycle
//! - `session`: per-document store/registry/options bundle
//! - `store`: variable store and listener registry

pub mod canonical;
pub mod delimiter;
pub mod eval;
pub mod numeric;
pub mod session;
pub mod site;
pub mod store;

// Re-export main types and functions
pub use canonical::{canonical_name, canonical_name_loose, variable_aliases};
pub use delimiter::{
    build_pattern, delimiter_pair, find_first, find_spans, CustomDelimiters, DelimiterScheme,
    MathSpan, PatternKind,
};
pub use eval::{evaluate, Evaluation};
pub use numeric::{evaluate_numeric, NumericEval};
pub use session::{EngineOptions, Session, SpanOutcome};
pub use site::{format_result, MathSite};
pub use store::{
    notify_listeners, ListenerEntry, ListenerRegistry, UpdateCallback, Variable, VariableStore,
    MAX_NOTIFY_DEPTH,
};
