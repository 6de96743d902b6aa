//! Integration tests for the Texcell reactive expression engine

use texcell::{
    build_pattern, canonical_name, evaluate, find_first, find_spans, DelimiterScheme,
    EngineOptions, EvalError, ListenerRegistry, PatternKind, SequentialIdGen, Session,
    VariableStore,
};

use pretty_assertions::assert_eq;

fn session() -> (VariableStore, ListenerRegistry) {
    (
        VariableStore::with_idgen(Box::new(SequentialIdGen::new("VAR"))),
        ListenerRegistry::new(),
    )
}

// ============================================================================
// Canonicalization
// ============================================================================

mod canonicalization {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_equivalent_spellings() {
        assert_eq!(canonical_name("x_1"), canonical_name("x_{1}"));
        assert_eq!(canonical_name("{x_1}"), canonical_name("x_{1}"));
        assert_eq!(canonical_name("\\color{red} x_1"), canonical_name("x_1"));
    }

    #[test]
    fn test_idempotence() {
        for fragment in ["x_1", "\\beta^{2}", "m_{\\text{tot}}", "a b", "{q}"] {
            let once = canonical_name(fragment);
            assert_eq!(canonical_name(&once), once);
        }
    }

    #[test]
    fn test_round_trip_through_store() {
        let (mut store, mut registry) = session();
        let id = evaluate("x_{1} := 5", &mut store, &mut registry)
            .unwrap()
            .defined_variable
            .unwrap();
        // Every stored alias re-canonicalizes to the key's canonical form
        for alias in &store.get(&id).unwrap().aliases {
            assert_eq!(canonical_name(alias), "x_{1}");
        }
    }
}

// ============================================================================
// Delimiter recognition
// ============================================================================

mod delimiters {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inline_dollar_literals() {
        let r = build_pattern(PatternKind::Inline, &DelimiterScheme::Dollar).unwrap();
        assert_eq!(find_first("$x_1$", &r).unwrap().latex, "x_1");
        assert_eq!(
            find_first(r"$\sum_{i=1}^n i$", &r).unwrap().latex,
            r"\sum_{i=1}^n i"
        );
        assert_eq!(find_first(r"$\$$", &r).unwrap().latex, r"\$");
        assert_eq!(find_first("$1.23456789$", &r).unwrap().latex, "1.23456789");
        assert!(find_first("One scoop is $2 and two are $3", &r).is_none());
        assert!(find_first("$10 ($5)", &r).is_none());
    }

    #[test]
    fn test_inline_dollar_multiple_spans() {
        let r = build_pattern(PatternKind::Inline, &DelimiterScheme::Dollar).unwrap();
        let spans = find_spans(r"$\$120$ ($40$ ...)", &r);
        let found: Vec<&str> = spans.iter().map(|s| s.latex.as_str()).collect();
        assert_eq!(found, vec![r"\$120", "40"]);
    }

    #[test]
    fn test_double_dollar_under_inline_pattern() {
        // Pinned: the inline pattern matches the inner single-dollar span
        let r = build_pattern(PatternKind::Inline, &DelimiterScheme::Dollar).unwrap();
        let spans = find_spans("$$x_1$$", &r);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].latex, "x_1");
        assert_eq!((spans[0].start, spans[0].end), (1, 6));
    }

    #[test]
    fn test_block_dollar_literals() {
        let r = build_pattern(PatternKind::Block, &DelimiterScheme::Dollar).unwrap();
        assert_eq!(find_first("$$x_1$$", &r).unwrap().latex, "x_1");
        assert_eq!(find_first(r"$$\$$$", &r).unwrap().latex, r"\$");
        assert!(find_first("One scoop is $2 and two are $3", &r).is_none());
    }

    #[test]
    fn test_bracket_literals() {
        let inline = build_pattern(PatternKind::Inline, &DelimiterScheme::Bracket).unwrap();
        assert_eq!(find_first(r"\(x_1\)", &inline).unwrap().latex, "x_1");
        assert_eq!(find_first(r"\(\$\)", &inline).unwrap().latex, r"\$");
        assert!(find_first("Solve task a) and b)", &inline).is_none());

        let block = build_pattern(PatternKind::Block, &DelimiterScheme::Bracket).unwrap();
        assert_eq!(
            find_first(r"\[\sum_{i=1}^n i\]", &block).unwrap().latex,
            r"\sum_{i=1}^n i"
        );
    }
}

// ============================================================================
// Evaluation semantics
// ============================================================================

mod evaluation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_definition_then_use() {
        let (mut store, mut registry) = session();
        let id = evaluate("n := 5", &mut store, &mut registry)
            .unwrap()
            .defined_variable
            .unwrap();
        let eval = evaluate("n * 2", &mut store, &mut registry).unwrap();
        assert_eq!(eval.value, 10.0);
        assert!(eval.variables_used.contains(&id));
    }

    #[test]
    fn test_cycle_rejection_leaves_store_empty() {
        let (mut store, mut registry) = session();
        assert!(evaluate("r := r + 1", &mut store, &mut registry).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_redefinition_keeps_one_entry() {
        let (mut store, mut registry) = session();
        evaluate("n := 2", &mut store, &mut registry).unwrap();
        evaluate("n := 3", &mut store, &mut registry).unwrap();
        assert_eq!(store.len(), 1);
        let (_, var) = store.iter().next().unwrap();
        assert_eq!(var.value, 3.0);
    }

    #[test]
    fn test_cyclic_redefinition_is_detected() {
        let (mut store, mut registry) = session();
        evaluate("r := 5", &mut store, &mut registry).unwrap();
        let err = evaluate("r := r + 1", &mut store, &mut registry).unwrap_err();
        assert!(matches!(err, EvalError::CyclicDefinition { .. }));
        let (_, var) = store.iter().next().unwrap();
        assert_eq!(var.value, 5.0);
    }

    #[test]
    fn test_chained_definitions() {
        let (mut store, mut registry) = session();
        evaluate("a := 2", &mut store, &mut registry).unwrap();
        evaluate("b := a * 3", &mut store, &mut registry).unwrap();
        let eval = evaluate("a + b", &mut store, &mut registry).unwrap();
        assert_eq!(eval.value, 8.0);
        assert_eq!(eval.variables_used.len(), 2);
    }

    #[test]
    fn test_latex_constructs_in_definitions() {
        let (mut store, mut registry) = session();
        evaluate(r"h := \frac{1}{2}", &mut store, &mut registry).unwrap();
        let eval = evaluate(r"h \cdot 4", &mut store, &mut registry).unwrap();
        assert_eq!(eval.value, 2.0);
    }
}

// ============================================================================
// Reactive updates
// ============================================================================

mod reactive {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dependent_sites_update_through_chain() {
        let mut session = Session::with_idgen(
            EngineOptions {
                evaluation: true,
                ..Default::default()
            },
            Box::new(SequentialIdGen::new("VAR")),
        );

        session.evaluate("base := 2").unwrap();
        let def_site = session.mount_site("twice := base * 2");
        let use_site = session.mount_site("twice + 1");
        assert_eq!(def_site.display(), "=4");
        assert_eq!(use_site.display(), "=5");

        session.evaluate("base := 10").unwrap();
        assert_eq!(def_site.display(), "=20");
        assert_eq!(use_site.display(), "=21");
        assert!(session.warnings().is_empty());
    }

    #[test]
    fn test_teardown_is_complete() {
        let mut session = Session::with_idgen(
            EngineOptions {
                evaluation: true,
                ..Default::default()
            },
            Box::new(SequentialIdGen::new("VAR")),
        );
        session.evaluate("a := 1").unwrap();
        session.evaluate("b := 2").unwrap();

        let site = session.mount_site("a + b");
        assert_eq!(site.display(), "=3");
        assert_eq!(
            session.registry.subscriptions_of(site.subscriber_id()).len(),
            2
        );

        site.detach(&mut session.registry);
        assert!(session
            .registry
            .subscriptions_of(site.subscriber_id())
            .is_empty());

        session.evaluate("a := 100").unwrap();
        assert_eq!(site.display(), "=3");
    }
}

// ============================================================================
// Whole-text processing
// ============================================================================

mod text_processing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prose_with_currency_and_math() {
        let mut session = Session::with_idgen(
            EngineOptions {
                evaluation: true,
                ..Default::default()
            },
            Box::new(SequentialIdGen::new("VAR")),
        );
        let text = "The budget is $40 per day. Define $n := 3$ so that $n + 1$ works.";
        let outcomes = session.process_text(text, PatternKind::Inline).unwrap();
        let sources: Vec<&str> = outcomes.iter().map(|o| o.span.latex.as_str()).collect();
        assert_eq!(sources, vec!["n := 3", "n + 1"]);
        assert_eq!(
            outcomes[1]
                .evaluation
                .as_ref()
                .unwrap()
                .as_ref()
                .unwrap()
                .value,
            4.0
        );
    }

    #[test]
    fn test_bracket_scheme_processing() {
        let mut session = Session::with_options(EngineOptions {
            evaluation: true,
            add_inline_math: true,
            delimiters: DelimiterScheme::Bracket,
        });
        let outcomes = session
            .process_text(r"Let \(m := 6\) and \(m / 2\).", PatternKind::Inline)
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes[1]
                .evaluation
                .as_ref()
                .unwrap()
                .as_ref()
                .unwrap()
                .value,
            3.0
        );
    }

    #[test]
    fn test_failed_span_does_not_poison_later_spans() {
        let mut session = Session::with_options(EngineOptions {
            evaluation: true,
            ..Default::default()
        });
        let outcomes = session
            .process_text("$q + 1$ then $2 * 3$", PatternKind::Inline)
            .unwrap();
        assert!(outcomes[0].evaluation.as_ref().unwrap().is_err());
        assert_eq!(
            outcomes[1]
                .evaluation
                .as_ref()
                .unwrap()
                .as_ref()
                .unwrap()
                .value,
            6.0
        );
    }
}
