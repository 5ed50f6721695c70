use crate::config::ParserConfig;
use crate::grammar::{BuiltinTerminals, GrammarTable, Terminal, TerminalRef};

/// The lexeme that marks the end of a token stream.
pub const EOF_LEXEME: &str = "$";

/// A lexeme paired with the 1-based source line it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new<S: AsRef<str>>(lexeme: S, line: usize) -> Self {
        Self {
            lexeme: lexeme.as_ref().to_string(),
            line,
        }
    }

    pub fn eof(line: usize) -> Self {
        Self::new(EOF_LEXEME, line)
    }

    pub fn is_eof(&self) -> bool {
        self.lexeme == EOF_LEXEME
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.lexeme, self.line)
    }
}

/// Splits source text into whitespace separated tokens, terminated by an
/// end-of-input token.
///
/// The line counter only advances past lines that produced a token, so blank
/// lines never shift the reported line numbers. The end-of-input token
/// carries the line following the last token-bearing line.
pub fn tokenize<S: AsRef<str>>(source: S) -> Vec<Token> {
    let mut line = 1;
    let mut tokens = vec![];

    for source_line in source.as_ref().lines() {
        let len_before = tokens.len();
        tokens.extend(
            source_line
                .split_whitespace()
                .map(|lexeme| Token::new(lexeme, line)),
        );

        if tokens.len() > len_before {
            line += 1;
        }
    }

    tokens.push(Token::eof(line));
    tokens
}

/// Maps lexemes onto the terminal alphabet of a grammar.
///
/// `$` classifies as end-of-input, a lexeme spelled like a grammar terminal
/// as that terminal, a numeric literal as the number class and anything else
/// as the identifier class. A class the grammar does not define classifies
/// as `None`.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'g> {
    grammar_table: &'g GrammarTable,
    identifier: Option<TerminalRef>,
    number: Option<TerminalRef>,
}

impl<'g> Classifier<'g> {
    pub fn new(grammar_table: &'g GrammarTable, config: &ParserConfig) -> Self {
        let identifier = grammar_table.terminal_mapping(&Terminal::new(&config.identifier_class));
        let number = grammar_table.terminal_mapping(&Terminal::new(&config.number_class));

        Self {
            grammar_table,
            identifier,
            number,
        }
    }

    pub fn classify<S: AsRef<str>>(&self, lexeme: S) -> Option<TerminalRef> {
        let lexeme = lexeme.as_ref();

        if lexeme == EOF_LEXEME {
            return Some(self.grammar_table.eof_terminal_ref());
        }

        let grammar_terminal = Some(lexeme)
            .filter(|lexeme| !BuiltinTerminals::is_builtin(lexeme))
            .and_then(|lexeme| self.grammar_table.terminal_mapping(&Terminal::new(lexeme)));

        match grammar_terminal {
            Some(terminal) => Some(terminal),
            None if is_numeric_literal(lexeme) => self.number,
            None => self.identifier,
        }
    }

    pub fn classify_token(&self, token: &Token) -> Option<TerminalRef> {
        self.classify(&token.lexeme)
    }
}

fn is_numeric_literal(lexeme: &str) -> bool {
    let starts_with_digit = lexeme.starts_with(|c: char| c.is_ascii_digit());

    starts_with_digit && lexeme.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{load_grammar, SymbolRef};

    #[test]
    fn should_tokenize_with_line_numbers() {
        let tokens = tokenize("{\n  x = 1 ;\n}");

        let got = tokens
            .iter()
            .map(|token| (token.lexeme.as_str(), token.line))
            .collect::<Vec<_>>();

        assert_eq!(
            vec![
                ("{", 1),
                ("x", 2),
                ("=", 2),
                ("1", 2),
                (";", 2),
                ("}", 3),
                ("$", 4)
            ],
            got
        );
    }

    #[test]
    fn should_not_advance_line_counter_on_blank_lines() {
        let tokens = tokenize("{\n\n   \nx = 1\n\n}\n\n\n");

        let lines = tokens.iter().map(|token| token.line).collect::<Vec<_>>();

        assert_eq!(vec![1, 2, 2, 2, 3, 4], lines);
        assert!(tokens.last().unwrap().is_eof());
    }

    #[test]
    fn should_tokenize_empty_source_to_eof() {
        assert_eq!(vec![Token::eof(1)], tokenize("  \n"));
    }

    #[test]
    fn should_classify_lexemes() {
        let grammar_table = load_grammar(
            "
<stmt> ::= ID = <expr> ;
<expr> ::= NUM
<expr> ::= ID
<expr> ::= ( <expr> <= <expr> )
",
        )
        .unwrap();
        let classifier = Classifier::new(&grammar_table, &ParserConfig::default());
        let name_of = |lexeme: &str| {
            classifier
                .classify(lexeme)
                .map(|t| grammar_table.symbol_name(SymbolRef::Terminal(t)))
        };

        assert_eq!(Some("<$>"), name_of("$"));
        assert_eq!(Some("="), name_of("="));
        assert_eq!(Some("<="), name_of("<="));
        assert_eq!(Some("NUM"), name_of("42"));
        assert_eq!(Some("NUM"), name_of("3.25"));
        assert_eq!(Some("ID"), name_of("4ever"));
        assert_eq!(Some("ID"), name_of("count"));
        assert_eq!(Some("ID"), name_of("<$>"));
    }

    #[test]
    fn should_not_classify_undefined_classes() {
        let grammar_table = load_grammar("<stmt> ::= go ;").unwrap();
        let classifier = Classifier::new(&grammar_table, &ParserConfig::default());

        assert_eq!(None, classifier.classify("x"));
        assert_eq!(None, classifier.classify("7"));
        assert!(classifier.classify("go").is_some());
    }
}
