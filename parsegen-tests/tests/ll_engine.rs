use parsegen_core::prelude::v1::*;

fn statements() -> Language {
    Language::statements(ParserConfig::default()).unwrap()
}

/// Builds the expected tree from `(depth, symbol)` pairs.
fn tree(lines: &[(usize, &str)]) -> String {
    lines
        .iter()
        .map(|(depth, symbol)| format!("{}{}\n", "\t".repeat(*depth), symbol))
        .collect()
}

#[test]
fn should_render_tree_respecting_operator_precedence() {
    let language = statements();
    let derivation = language
        .ll_parser()
        .render(&tokenize("{ y = 2 + 3 * 4 ; }"));

    let expected = tree(&[
        (0, "<program>"),
        (1, "<compoundstmt>"),
        (2, "{"),
        (2, "<stmts>"),
        (3, "<stmt>"),
        (4, "<assgstmt>"),
        (5, "ID"),
        (5, "="),
        (5, "<arithexpr>"),
        (6, "<multexpr>"),
        (7, "<simpleexpr>"),
        (8, "NUM"),
        (7, "<multexprprime>"),
        (8, "<epsilon>"),
        (6, "<arithexprprime>"),
        (7, "+"),
        (7, "<multexpr>"),
        (8, "<simpleexpr>"),
        (9, "NUM"),
        (8, "<multexprprime>"),
        (9, "*"),
        (9, "<simpleexpr>"),
        (10, "NUM"),
        (9, "<multexprprime>"),
        (10, "<epsilon>"),
        (7, "<arithexprprime>"),
        (8, "<epsilon>"),
        (5, ";"),
        (3, "<stmts>"),
        (4, "<epsilon>"),
        (2, "}"),
    ]);

    assert!(derivation.diagnostics.is_clean());
    assert_eq!(Some(expected), derivation.tree);
}

#[test]
fn should_render_empty_block() {
    let language = statements();
    let derivation = language.ll_parser().render(&tokenize("{ }"));

    assert!(derivation.diagnostics.is_clean());
    assert_eq!(
        Some(tree(&[
            (0, "<program>"),
            (1, "<compoundstmt>"),
            (2, "{"),
            (2, "<stmts>"),
            (3, "<epsilon>"),
            (2, "}"),
        ])),
        derivation.tree
    );
}

#[test]
fn should_report_missing_terminator_on_single_line() {
    let language = statements();
    let diagnostics = language.ll_parser().probe(&tokenize("{ x = 1 }"));

    assert_eq!(
        Some(1),
        diagnostics
            .missing_terminator
            .as_ref()
            .map(|missing| missing.line)
    );
    assert!(!diagnostics.syntax_error);
    assert_eq!("syntax error, line 1, missing \";\"", diagnostics.to_string());
}

#[test]
fn should_attribute_missing_terminator_to_last_consumed_line() {
    let cases = [
        ("{\n  x = 1\n}", 2),
        ("{\nif ( a == 1 ) then b = 2 ; else b = 3\n}", 2),
        ("{ x = 1 ; y = 2 }", 1),
        ("{\nwhile ( a < 3 )\n  a = a + 1\n\n\nb = 2 ;\n}", 3),
    ];

    let language = statements();
    let parser = language.ll_parser();

    for (source, line) in cases {
        let diagnostics = parser.probe(&tokenize(source));

        assert_eq!(
            Some(line),
            diagnostics
                .missing_terminator
                .as_ref()
                .map(|missing| missing.line),
            "{:?}",
            source
        );
        assert!(!diagnostics.syntax_error, "{:?}", source);
    }
}

#[test]
fn probe_should_be_repeatable_and_agree_with_render() {
    let language = statements();
    let parser = language.ll_parser();

    for source in [
        "{ x = 1 }",
        "{ y = 2 + 3 * 4 ; }",
        "{ x = ( 1 + 2 }",
        "{ } }",
    ] {
        let tokens = tokenize(source);
        let first = parser.probe(&tokens);

        assert_eq!(first, parser.probe(&tokens), "{:?}", source);
        assert_eq!(first, parser.render(&tokens).diagnostics, "{:?}", source);
    }
}

#[test]
fn should_flag_syntax_errors() {
    let language = statements();
    let parser = language.ll_parser();

    let derivation = parser.render(&tokenize("{ x = ( 1 + 2 }"));
    assert_eq!(None, derivation.diagnostics.missing_terminator);
    assert!(derivation.diagnostics.syntax_error);
    assert_eq!(None, derivation.tree);

    // input left over after the start symbol is complete.
    let diagnostics = parser.probe(&tokenize("{ } }"));
    assert!(diagnostics.syntax_error);
    assert_eq!("syntax error", diagnostics.to_string());
}

#[test]
fn both_engines_should_agree_on_valid_programs() {
    let source = "{
while ( i < 10 )
  {
    i = i + 1 ;
    total = total * ( i - 1 ) / 2 ;
  }
if ( total >= 100 ) then done = 1 ; else done = 0 ;
}";

    let language = statements();
    let tokens = tokenize(source);

    let ll = language.ll_parser().render(&tokens);
    let lr = language.lr_parser().parse(&tokens);

    assert!(ll.diagnostics.is_clean());
    assert!(lr.diagnostics.is_clean());
    assert_eq!("no errors", ll.diagnostics.to_string());
    assert!(ll.tree.unwrap().starts_with("<program>\n\t<compoundstmt>\n"));
    assert_eq!(
        Some("<program>"),
        lr.steps.as_ref().and_then(|steps| steps.last()).map(String::as_str)
    );
}

#[test]
fn should_reject_truncated_expressions_like_the_lr_engine() {
    let language = statements();

    for source in ["{ x = }", "{ x = 1 + }"] {
        let tokens = tokenize(source);
        let ll = language.ll_parser().render(&tokens);
        let lr = language.lr_parser().parse(&tokens);

        assert!(ll.diagnostics.syntax_error, "{:?}", source);
        assert_eq!(None, ll.diagnostics.missing_terminator, "{:?}", source);
        assert_eq!(None, ll.tree, "{:?}", source);
        assert_eq!(lr.diagnostics, ll.diagnostics, "{:?}", source);
        assert_eq!(None, lr.steps, "{:?}", source);
    }
}
