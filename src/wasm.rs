//! WASM bindings for texcell
//!
//! This module provides the JavaScript-accessible engine surface: a
//! `MathEngine` class owning one session (store + registry + options),
//! with evaluation, span scanning and display-site management.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "wasm")]
use fxhash::FxHashMap;

#[cfg(feature = "wasm")]
use crate::core::delimiter::{CustomDelimiters, DelimiterScheme, PatternKind};
#[cfg(feature = "wasm")]
use crate::core::session::{EngineOptions, Session};
#[cfg(feature = "wasm")]
use crate::core::site::{format_result, MathSite};

/// Engine options (exposed to WASM)
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Evaluate LaTeX expressions (vs. pure display)
    #[serde(default)]
    pub evaluation: bool,
    /// Recognize inline math spans
    #[serde(default = "default_true")]
    pub add_inline_math: bool,
    /// "dollar" (default), "bracket", or "custom"
    #[serde(default)]
    pub delimiters: Option<String>,
    /// Custom inline regex (content must be capture group 1)
    #[serde(default)]
    pub inline_regex: Option<String>,
    /// Custom block regex (content must be capture group 1)
    #[serde(default)]
    pub block_regex: Option<String>,
    #[serde(default)]
    pub inline_start: Option<String>,
    #[serde(default)]
    pub inline_end: Option<String>,
    #[serde(default)]
    pub block_start: Option<String>,
    #[serde(default)]
    pub block_end: Option<String>,
}

#[cfg(feature = "wasm")]
fn default_true() -> bool {
    true
}

#[cfg(feature = "wasm")]
impl EngineConfig {
    fn into_options(self) -> Result<EngineOptions, String> {
        let delimiters = match self.delimiters.as_deref() {
            None | Some("dollar") => DelimiterScheme::Dollar,
            Some("bracket") => DelimiterScheme::Bracket,
            Some("custom") => DelimiterScheme::Custom(CustomDelimiters {
                inline_regex: self.inline_regex,
                block_regex: self.block_regex,
                inline_start: self.inline_start,
                inline_end: self.inline_end,
                block_start: self.block_start,
                block_end: self.block_end,
            }),
            Some(other) => return Err(format!("unknown delimiter scheme '{}'", other)),
        };
        Ok(EngineOptions {
            evaluation: self.evaluation,
            add_inline_math: self.add_inline_math,
            delimiters,
        })
    }
}

/// Evaluation result with additional metadata
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct EvalOutcome {
    /// Numeric value, absent on failure
    pub value: Option<f64>,
    /// Display text (`=...` or `=Error`)
    pub display: String,
    /// Identifier written by this call, if it was a definition
    pub defined_variable: Option<String>,
    /// Identifiers the expression depends on
    pub variables_used: Vec<String>,
    /// Error message if evaluation failed
    pub error: Option<String>,
}

/// One recognized span in prose text
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct SpanInfo {
    pub start: usize,
    pub end: usize,
    pub latex: String,
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// One document's engine: session plus mounted display sites
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct MathEngine {
    session: Session,
    sites: FxHashMap<String, MathSite>,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl MathEngine {
    /// Create an engine. `config` is an options object; pass `undefined`
    /// for the defaults (display-only, dollar delimiters).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<MathEngine, JsValue> {
        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        let options = config.into_options().map_err(|e| JsValue::from_str(&e))?;
        Ok(MathEngine {
            session: Session::with_options(options),
            sites: FxHashMap::default(),
        })
    }

    /// Evaluate one math span's source in the shared session.
    pub fn evaluate(&mut self, latex: &str) -> Result<JsValue, JsValue> {
        let outcome = match self.session.evaluate(latex) {
            Ok(eval) => {
                let mut used: Vec<String> = eval.variables_used.into_iter().collect();
                used.sort();
                EvalOutcome {
                    value: Some(eval.value),
                    display: format_result(Some(eval.value)),
                    defined_variable: eval.defined_variable,
                    variables_used: used,
                    error: None,
                }
            }
            Err(err) => EvalOutcome {
                value: None,
                display: format_result(None),
                defined_variable: None,
                variables_used: Vec::new(),
                error: Some(err.to_string()),
            },
        };
        serde_wasm_bindgen::to_value(&outcome).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Locate math spans in text (paste handling).
    #[wasm_bindgen(js_name = "scanText")]
    pub fn scan_text(&self, text: &str, block: bool) -> Result<JsValue, JsValue> {
        let kind = if block {
            PatternKind::Block
        } else {
            PatternKind::Inline
        };
        let spans = self
            .session
            .scan(text, kind)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let infos: Vec<SpanInfo> = spans
            .into_iter()
            .map(|s| SpanInfo {
                start: s.start,
                end: s.end,
                latex: s.latex,
            })
            .collect();
        serde_wasm_bindgen::to_value(&infos).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Mount a reactive display site; returns its subscriber token.
    #[wasm_bindgen(js_name = "mountSite")]
    pub fn mount_site(&mut self, latex: &str) -> String {
        let site = self.session.mount_site(latex);
        let id = site.subscriber_id().to_string();
        self.sites.insert(id.clone(), site);
        id
    }

    /// Current display text of a mounted site.
    #[wasm_bindgen(js_name = "siteDisplay")]
    pub fn site_display(&self, id: &str) -> Option<String> {
        self.sites.get(id).map(|site| site.display())
    }

    /// Tear a site down, removing all of its listeners.
    #[wasm_bindgen(js_name = "disposeSite")]
    pub fn dispose_site(&mut self, id: &str) -> bool {
        match self.sites.remove(id) {
            Some(site) => {
                site.detach(&mut self.session.registry);
                true
            }
            None => false,
        }
    }

    /// Number of variables currently defined in the session.
    #[wasm_bindgen(js_name = "variableCount")]
    pub fn variable_count(&self) -> usize {
        self.session.store.len()
    }
}
