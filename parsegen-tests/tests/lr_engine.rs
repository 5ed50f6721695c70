use parsegen_core::prelude::v1::*;

fn statements() -> Language {
    Language::statements(ParserConfig::default()).unwrap()
}

#[test]
fn should_trace_reductions_respecting_operator_precedence() {
    let language = statements();
    let derivation = language
        .lr_parser()
        .parse(&tokenize("{ y = 2 + 3 * 4 ; }"));

    assert!(derivation.diagnostics.is_clean());
    assert_eq!(
        Some(vec![
            "{ y = 2 + 3 * 4 ; }",
            "{ y = <simpleexpr> + 3 * 4 ; }",
            "{ y = <simpleexpr> <multexprprime> + 3 * 4 ; }",
            "{ y = <multexpr> + 3 * 4 ; }",
            "{ y = <multexpr> + <simpleexpr> * 4 ; }",
            "{ y = <multexpr> + <simpleexpr> * <simpleexpr> ; }",
            "{ y = <multexpr> + <simpleexpr> * <simpleexpr> <multexprprime> ; }",
            "{ y = <multexpr> + <simpleexpr> <multexprprime> ; }",
            "{ y = <multexpr> + <multexpr> ; }",
            "{ y = <multexpr> + <multexpr> <arithexprprime> ; }",
            "{ y = <multexpr> <arithexprprime> ; }",
            "{ y = <arithexpr> ; }",
            "{ <assgstmt> }",
            "{ <stmt> }",
            "{ <stmt> <stmts> }",
            "{ <stmts> }",
            "<compoundstmt>",
            "<program>",
        ]
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>()),
        derivation.steps
    );
}

#[test]
fn should_render_trace_in_either_order() {
    let language = statements();
    let derivation = language.lr_parser().parse(&tokenize("{ }"));

    assert!(derivation.diagnostics.is_clean());
    assert_eq!(
        Some("{ } => \n{ <stmts> } => \n<compoundstmt> => \n<program>".to_string()),
        derivation.render(TraceOrder::OldestFirst)
    );
    assert_eq!(
        Some("<program> => \n<compoundstmt> => \n{ <stmts> } => \n{ }".to_string()),
        derivation.render(TraceOrder::NewestFirst)
    );
}

#[test]
fn should_recover_from_missing_terminator_on_single_line() {
    let language = statements();
    let derivation = language.lr_parser().parse(&tokenize("{ x = 1 }"));

    assert_eq!(
        Some(1),
        derivation
            .diagnostics
            .missing_terminator
            .as_ref()
            .map(|missing| missing.line)
    );
    assert!(!derivation.diagnostics.syntax_error);

    let steps = derivation.steps.unwrap();
    assert_eq!("{ x = 1 ; }", steps[0]);
    assert_eq!(Some(&"<program>".to_string()), steps.last());
    assert_eq!(
        "syntax error, line 1, missing \";\"",
        derivation.diagnostics.to_string()
    );
}

#[test]
fn should_attribute_missing_terminator_to_last_consumed_line() {
    let cases = [
        ("{\n  x = 1\n}", 2),
        ("{\nif ( a == 1 ) then b = 2 ; else b = 3\n}", 2),
        ("{ x = 1 ; y = 2 }", 1),
    ];

    let language = statements();
    let parser = language.lr_parser();

    for (source, line) in cases {
        let derivation = parser.parse(&tokenize(source));

        assert_eq!(
            Some(line),
            derivation
                .diagnostics
                .missing_terminator
                .as_ref()
                .map(|missing| missing.line),
            "{:?}",
            source
        );
        assert!(!derivation.diagnostics.syntax_error, "{:?}", source);
        assert!(derivation.steps.is_some(), "{:?}", source);
    }
}

#[test]
fn should_not_count_blank_lines() {
    let source = "{\nwhile ( a < 3 )\n  a = a + 1\n\n\nb = 2 ;\n}";
    let tokens = tokenize(source);

    let b = tokens.iter().find(|token| token.lexeme == "b").unwrap();
    assert_eq!(4, b.line);

    let language = statements();
    let diagnostics = language.lr_parser().check(&tokens);

    assert_eq!(
        Some(3),
        diagnostics
            .missing_terminator
            .as_ref()
            .map(|missing| missing.line)
    );
    assert!(!diagnostics.syntax_error);
}

#[test]
fn check_should_be_repeatable_and_agree_with_parse() {
    let language = statements();
    let parser = language.lr_parser();

    for source in ["{ x = 1 }", "{ a = 1 ; }", "{ x = ( 1 + 2 }", "{ = }"] {
        let tokens = tokenize(source);
        let first = parser.check(&tokens);

        assert_eq!(first, parser.check(&tokens), "{:?}", source);
        assert_eq!(
            first.missing_terminator,
            parser.parse(&tokens).diagnostics.missing_terminator,
            "{:?}",
            source
        );
    }
}

#[test]
fn should_flag_unrecoverable_input() {
    let language = statements();
    let parser = language.lr_parser();

    // the inserted terminator cannot close the open parenthesis.
    let derivation = parser.parse(&tokenize("{ x = ( 1 + 2 }"));
    assert_eq!(
        Some(1),
        derivation
            .diagnostics
            .missing_terminator
            .as_ref()
            .map(|missing| missing.line)
    );
    assert!(derivation.diagnostics.syntax_error);
    assert_eq!(None, derivation.steps);

    let derivation = parser.parse(&tokenize("{ = }"));
    assert_eq!(None, derivation.diagnostics.missing_terminator);
    assert!(derivation.diagnostics.syntax_error);
    assert_eq!("syntax error", derivation.diagnostics.to_string());
}
