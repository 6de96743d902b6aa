//! Expression evaluation against a shared variable store
//!
//! One call turns a math span's LaTeX source into a numeric result:
//! normalize `\pi`, detect a `name := expr` definition, isolate the
//! right-hand side of display equalities, substitute every stored alias by
//! its canonical identifier, interpret the result numerically, and - for
//! definitions - write the variable and notify its listeners.
//!
//! Failures are uniform: the store is never mutated on a failing call, and
//! every evaluation is independently retryable.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::canonical::variable_aliases;
use crate::core::numeric::evaluate_numeric;
use crate::core::store::{notify_listeners, ListenerRegistry, Variable, VariableStore};
use crate::utils::error::{EvalError, EvalResult};

lazy_static! {
    /// `\pi` (with or without an empty group) becomes the PI placeholder
    static ref PI_PATTERN: Regex = Regex::new(r"\\pi(\{\})?").unwrap();
    /// `name := ` prefix; everything before the first marker is the name
    static ref ASSIGN_PATTERN: Regex = Regex::new(r"^(.*?)\s*:=\s*").unwrap();
}

/// Outcome of a successful evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Numeric result of the right-hand expression
    pub value: f64,
    /// Canonical identifier written by this call, if it was a definition
    pub defined_variable: Option<String>,
    /// Canonical identifiers of the variables the expression depends on
    pub variables_used: HashSet<String>,
}

/// Evaluate one math span against the session's store and registry.
pub fn evaluate(
    latex: &str,
    store: &mut VariableStore,
    registry: &mut ListenerRegistry,
) -> EvalResult<Evaluation> {
    let mut changed: String = PI_PATTERN.replace_all(latex.trim(), "{PI}").into_owned();

    // Assignment detection: `name := expr`
    let mut defines_name: Option<String> = None;
    if let Some(caps) = ASSIGN_PATTERN.captures(&changed) {
        let marker_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let name = caps
            .get(1)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        changed = changed[marker_end..].to_string();
        if !name.is_empty() {
            defines_name = Some(name);
        }
    }

    // `x = y = 3` evaluates `3`; a trailing empty segment (`result =`)
    // falls back to the segment before it.
    let segments: Vec<&str> = changed.split('=').collect();
    let last = segments[segments.len() - 1];
    let mut expr = if !last.is_empty() {
        last.to_string()
    } else if segments.len() >= 2 {
        segments[segments.len() - 2].to_string()
    } else {
        last.to_string()
    };

    let aliases: Vec<String> = defines_name
        .as_deref()
        .map(variable_aliases)
        .unwrap_or_default();

    // Substitute every stored alias as a whole token. An alias that is
    // also an alias of the new definition names the slot being redefined.
    let mut defined_id: Option<String> = None;
    for (id, variable) in store.iter() {
        for alias in &variable.aliases {
            expr = replace_whole_token(&expr, alias, id);
            if aliases.iter().any(|a| a == alias) {
                defined_id = Some(id.clone());
            }
        }
    }

    let bindings = store.bindings();
    let numeric = evaluate_numeric(&expr, &bindings)?;

    if defines_name.is_some() {
        let id = match defined_id {
            Some(id) => id,
            None => store.mint_identifier(),
        };
        // Cyclic dependency - fail before touching the store
        if numeric.symbols.contains(&id) {
            return Err(EvalError::cyclic(id));
        }
        store.insert(
            id.clone(),
            Variable {
                value: numeric.value,
                aliases,
            },
        );
        notify_listeners(store, registry, &id);
        return Ok(Evaluation {
            value: numeric.value,
            defined_variable: Some(id),
            variables_used: numeric.symbols,
        });
    }

    Ok(Evaluation {
        value: numeric.value,
        defined_variable: None,
        variables_used: numeric.symbols,
    })
}

/// Replace whole-token occurrences of `alias`: a match may not be
/// immediately preceded or followed by an ASCII letter, so `y` never
/// matches inside `xy`. Manual scan; the regex crate has no look-around.
fn replace_whole_token(text: &str, alias: &str, replacement: &str) -> String {
    if alias.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(pos) = text[cursor..].find(alias) {
        let start = cursor + pos;
        let end = start + alias.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_ascii_alphabetic());
        let after_ok = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_alphabetic());
        if before_ok && after_ok {
            out.push_str(&text[cursor..start]);
            out.push_str(replacement);
            cursor = end;
        } else {
            let step = text[start..].chars().next().map_or(1, |c| c.len_utf8());
            out.push_str(&text[cursor..start + step]);
            cursor = start + step;
        }
    }
    out.push_str(&text[cursor..]);
    out
}
