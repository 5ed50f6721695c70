use crate::config::ParserConfig;
use crate::grammar::{load_grammar, GrammarTable};
use crate::ll::parser::LlParser;
use crate::ll::{Ll1, LlTable, LlTableGenerator};
use crate::lr::parser::LrParser;
use crate::lr::{LrTable, LrTableGenerator, Slr1};
use crate::sets::GrammarSets;
use crate::{Error, ErrorKind};

/// The statement language: compound statements, if/then/else, while loops,
/// assignments and boolean and arithmetic expressions. Productions are
/// listed in reduction order, `r1` first.
pub const STATEMENT_GRAMMAR: &str = "
; programs
<program> ::= <compoundstmt>
; statements
<stmt> ::= <ifstmt>
<stmt> ::= <whilestmt>
<stmt> ::= <assgstmt>
<stmt> ::= <compoundstmt>
<compoundstmt> ::= { <stmts> }
<stmts> ::= <stmt> <stmts>
<stmts> ::= <epsilon>
<ifstmt> ::= if ( <boolexpr> ) then <stmt> else <stmt>
<whilestmt> ::= while ( <boolexpr> ) <stmt>
<assgstmt> ::= ID = <arithexpr> ;
; boolean expressions
<boolexpr> ::= <arithexpr> <boolop> <arithexpr>
<boolop> ::= <
<boolop> ::= >
<boolop> ::= <=
<boolop> ::= >=
<boolop> ::= ==
; arithmetic expressions
<arithexpr> ::= <multexpr> <arithexprprime>
<arithexprprime> ::= + <multexpr> <arithexprprime>
<arithexprprime> ::= - <multexpr> <arithexprprime>
<arithexprprime> ::= <epsilon>
<multexpr> ::= <simpleexpr> <multexprprime>
<multexprprime> ::= * <simpleexpr> <multexprprime>
<multexprprime> ::= / <simpleexpr> <multexprprime>
<multexprprime> ::= <epsilon>
<simpleexpr> ::= ID
<simpleexpr> ::= NUM
<simpleexpr> ::= ( <arithexpr> )
";

/// A grammar together with everything derived from it. Built once and
/// read-only afterwards, parsers borrow from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    grammar_table: GrammarTable,
    sets: GrammarSets,
    ll_table: LlTable,
    lr_table: LrTable,
    config: ParserConfig,
}

impl Language {
    /// Builds the First/Follow sets and both tables for a grammar, failing
    /// if the grammar is malformed or not both LL(1) and SLR(1).
    pub fn new<G: AsRef<str>>(grammar: G, config: ParserConfig) -> Result<Self, Error> {
        let grammar_table =
            load_grammar(grammar).map_err(|e| Error::new(ErrorKind::GrammarError(e)))?;
        let sets = GrammarSets::new(&grammar_table);

        let ll_table = Ll1::generate_table(&grammar_table, &sets).map_err(|e| {
            Error::new(ErrorKind::TableGenerationError(e)).with_data("ll(1)".to_string())
        })?;
        let lr_table = Slr1::generate_table(&grammar_table, &sets).map_err(|e| {
            Error::new(ErrorKind::TableGenerationError(e)).with_data("slr(1)".to_string())
        })?;

        Ok(Self {
            grammar_table,
            sets,
            ll_table,
            lr_table,
            config,
        })
    }

    /// Builds the statement language.
    pub fn statements(config: ParserConfig) -> Result<Self, Error> {
        Self::new(STATEMENT_GRAMMAR, config)
    }

    pub fn grammar(&self) -> &GrammarTable {
        &self.grammar_table
    }

    pub fn sets(&self) -> &GrammarSets {
        &self.sets
    }

    pub fn ll_table(&self) -> &LlTable {
        &self.ll_table
    }

    pub fn lr_table(&self) -> &LrTable {
        &self.lr_table
    }

    /// Renders the LR(0) item sets behind the SLR(1) table.
    pub fn human_readable_item_sets(&self) -> String {
        crate::lr::human_readable_item_sets(&self.grammar_table)
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn ll_parser(&self) -> LlParser<'_> {
        LlParser::new(&self.grammar_table, &self.sets, &self.ll_table, &self.config)
    }

    pub fn lr_parser(&self) -> LrParser<'_> {
        LrParser::new(&self.grammar_table, &self.lr_table, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ProductionId;

    #[test]
    fn should_build_statement_language() {
        let language = Language::statements(ParserConfig::default()).unwrap();

        assert_eq!(15, language.grammar().non_terminal_count());
        assert_eq!(29, language.grammar().production_count());
        assert_eq!(58, language.lr_table().states);
    }

    #[test]
    fn should_number_productions_in_reduction_order() {
        let language = Language::statements(ParserConfig::default()).unwrap();
        let grammar = language.grammar();

        let rendered = |id: usize| {
            grammar
                .production(ProductionId::unchecked_new(id))
                .map(|production| grammar.human_readable_production(production))
        };

        assert_eq!(Some("<*> ::= <program>".to_string()), rendered(0));
        assert_eq!(
            Some("<compoundstmt> ::= { <stmts> }".to_string()),
            rendered(6)
        );
        assert_eq!(
            Some("<assgstmt> ::= ID = <arithexpr> ;".to_string()),
            rendered(11)
        );
        assert_eq!(Some("<simpleexpr> ::= ( <arithexpr> )".to_string()), rendered(28));
    }

    #[test]
    fn should_be_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<Language>();
    }
}
