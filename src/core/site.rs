//! Display-site lifecycle
//!
//! A math-display site owns one LaTeX source string and shows its current
//! value next to the rendered math. Mounting a site evaluates the source
//! and registers one listener per variable it used; when any of them is
//! redefined the site re-evaluates and re-renders itself. Detaching
//! removes the site's listeners from every identifier in one operation.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::core::eval::{evaluate, Evaluation};
use crate::core::store::{ListenerRegistry, VariableStore};
use crate::utils::error::EvalResult;

/// Render the value shown after the math span: `=3`, `=0.3333` (rounded to
/// four decimals once the fractional part exceeds five digits) or `=Error`.
pub fn format_result(value: Option<f64>) -> String {
    match value {
        Some(v) => {
            let text = v.to_string();
            let frac_len = text.split('.').nth(1).map(|s| s.len()).unwrap_or(0);
            if frac_len > 5 {
                format!("={:.4}", v)
            } else {
                format!("={}", text)
            }
        }
        None => "=Error".to_string(),
    }
}

#[derive(Debug)]
struct SiteState {
    latex: String,
    result: Option<f64>,
    display: String,
    used: HashSet<String>,
}

/// One mounted display site. The site is identified by a subscriber token
/// minted at creation; its listeners live until `detach`.
pub struct MathSite {
    subscriber: String,
    state: Rc<RefCell<SiteState>>,
}

impl MathSite {
    /// Evaluate `latex` in the session and subscribe to every variable the
    /// evaluation used. A failing evaluation still produces a site (showing
    /// the error indicator); it simply has no subscriptions.
    pub fn mount(
        latex: &str,
        store: &mut VariableStore,
        registry: &mut ListenerRegistry,
    ) -> MathSite {
        let subscriber = store.mint_identifier();
        let state = Rc::new(RefCell::new(SiteState {
            latex: latex.to_string(),
            result: None,
            display: String::new(),
            used: HashSet::new(),
        }));

        let outcome = evaluate(latex, store, registry);
        apply_outcome(&state, &outcome);

        if let Ok(eval) = &outcome {
            for identifier in &eval.variables_used {
                let st = Rc::clone(&state);
                registry.register(
                    identifier,
                    &subscriber,
                    Rc::new(move |store, registry| {
                        let latex = st.borrow().latex.clone();
                        let outcome = evaluate(&latex, store, registry);
                        apply_outcome(&st, &outcome);
                    }),
                );
            }
        }

        MathSite { subscriber, state }
    }

    /// The site's unique subscriber token.
    pub fn subscriber_id(&self) -> &str {
        &self.subscriber
    }

    /// Latest numeric result, if the last evaluation succeeded.
    pub fn result(&self) -> Option<f64> {
        self.state.borrow().result
    }

    /// Current display text (`=...` or `=Error`).
    pub fn display(&self) -> String {
        self.state.borrow().display.clone()
    }

    /// Identifiers the last successful evaluation depended on.
    pub fn variables_used(&self) -> HashSet<String> {
        self.state.borrow().used.clone()
    }

    /// Remove this site's listeners from every identifier (teardown). The
    /// variables it defined stay in the store for the session's lifetime.
    pub fn detach(&self, registry: &mut ListenerRegistry) {
        registry.unregister(&self.subscriber);
    }
}

fn apply_outcome(state: &Rc<RefCell<SiteState>>, outcome: &EvalResult<Evaluation>) {
    let mut s = state.borrow_mut();
    match outcome {
        Ok(eval) => {
            s.result = Some(eval.value);
            s.display = format_result(Some(eval.value));
            s.used = eval.variables_used.clone();
        }
        Err(_) => {
            s.result = None;
            s.display = format_result(None);
        }
    }
}
