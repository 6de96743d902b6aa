//! Session context: one store/registry pair per document
//!
//! A session owns the variable store, the listener registry and the engine
//! options for one independent document. Sessions are never shared: a host
//! running several documents concurrently owns one session per document.

use crate::core::delimiter::{build_pattern, find_spans, DelimiterScheme, MathSpan, PatternKind};
use crate::core::eval::{evaluate, Evaluation};
use crate::core::site::MathSite;
use crate::core::store::{ListenerRegistry, VariableStore};
use crate::utils::error::EvalResult;
use crate::utils::idgen::IdGen;

/// Engine configuration recognized by the host surface.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Run the evaluator and reactive machinery (vs. pure display)
    pub evaluation: bool,
    /// Recognize inline math spans at all
    pub add_inline_math: bool,
    /// Delimiter convention for span recognition
    pub delimiters: DelimiterScheme,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            evaluation: false,
            add_inline_math: true,
            delimiters: DelimiterScheme::Dollar,
        }
    }
}

/// Outcome for one span found in prose text.
#[derive(Debug)]
pub struct SpanOutcome {
    pub span: MathSpan,
    /// `None` when evaluation is disabled in the options
    pub evaluation: Option<EvalResult<Evaluation>>,
}

/// Shared evaluation context for one document.
pub struct Session {
    pub store: VariableStore,
    pub registry: ListenerRegistry,
    options: EngineOptions,
}

impl Session {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            store: VariableStore::new(),
            registry: ListenerRegistry::new(),
            options,
        }
    }

    /// Replace the identifier generator (deterministic ids in tests).
    pub fn with_idgen(options: EngineOptions, idgen: Box<dyn IdGen>) -> Self {
        Self {
            store: VariableStore::with_idgen(idgen),
            registry: ListenerRegistry::new(),
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Evaluate one math span's source against this session.
    pub fn evaluate(&mut self, latex: &str) -> EvalResult<Evaluation> {
        evaluate(latex, &mut self.store, &mut self.registry)
    }

    /// Mount a reactive display site for one math span.
    pub fn mount_site(&mut self, latex: &str) -> MathSite {
        MathSite::mount(latex, &mut self.store, &mut self.registry)
    }

    /// Locate math spans in prose under this session's delimiter scheme.
    pub fn scan(&self, text: &str, kind: PatternKind) -> EvalResult<Vec<MathSpan>> {
        if kind == PatternKind::Inline && !self.options.add_inline_math {
            return Ok(Vec::new());
        }
        let pattern = build_pattern(kind, &self.options.delimiters)?;
        Ok(find_spans(text, &pattern))
    }

    /// Scan prose and evaluate every span in order against the shared
    /// store (paste handling). With evaluation disabled the spans are
    /// returned unevaluated.
    pub fn process_text(&mut self, text: &str, kind: PatternKind) -> EvalResult<Vec<SpanOutcome>> {
        let spans = self.scan(text, kind)?;
        let mut outcomes = Vec::with_capacity(spans.len());
        for span in spans {
            let evaluation = if self.options.evaluation {
                Some(self.evaluate(&span.latex))
            } else {
                None
            };
            outcomes.push(SpanOutcome { span, evaluation });
        }
        Ok(outcomes)
    }

    /// Warnings collected during notification cascades.
    pub fn warnings(&self) -> &[String] {
        &self.registry.warnings
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::idgen::SequentialIdGen;

    fn evaluating_session() -> Session {
        Session::with_idgen(
            EngineOptions {
                evaluation: true,
                ..Default::default()
            },
            Box::new(SequentialIdGen::new("VAR")),
        )
    }

    #[test]
    fn test_default_options_match_display_mode() {
        let options = EngineOptions::default();
        assert!(!options.evaluation);
        assert!(options.add_inline_math);
        assert_eq!(options.delimiters, DelimiterScheme::Dollar);
    }

    #[test]
    fn test_process_text_shares_one_store() {
        let mut session = evaluating_session();
        let outcomes = session
            .process_text("Let $n := 5$ and then $n * 2$.", PatternKind::Inline)
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes[1].evaluation.as_ref().unwrap().as_ref().unwrap().value,
            10.0
        );
        assert_eq!(session.store.len(), 1);
    }

    #[test]
    fn test_process_text_without_evaluation() {
        let mut session = Session::new();
        let outcomes = session
            .process_text("a $x_1$ span", PatternKind::Inline)
            .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].evaluation.is_none());
    }

    #[test]
    fn test_add_inline_math_disabled() {
        let mut session = Session::with_options(EngineOptions {
            add_inline_math: false,
            ..Default::default()
        });
        let outcomes = session
            .process_text("a $x_1$ span", PatternKind::Inline)
            .unwrap();
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = evaluating_session();
        let mut second = evaluating_session();
        first.evaluate("n := 5").unwrap();
        assert!(second.evaluate("n * 2").is_err());
    }
}
