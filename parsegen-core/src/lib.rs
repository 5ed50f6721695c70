//! Generates LL(1) and SLR(1) parse tables from a BNF grammar and drives
//! table-based parsers over them, recovering from a missing statement
//! terminator.

use grammar::GrammarLoadError;

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod grammar;
pub mod language;
pub mod ll;
pub mod lr;
pub mod sets;
pub mod token;

pub use error::{TableGenError, TableGenErrorKind};

pub mod prelude {
    pub mod v1 {
        pub use crate::config::ParserConfig;
        pub use crate::diagnostic::{Diagnostics, MissingTerminator};
        pub use crate::language::{Language, STATEMENT_GRAMMAR};
        pub use crate::ll::parser::{LlDerivation, LlParser};
        pub use crate::lr::parser::{LrDerivation, LrParser, TraceOrder};
        pub use crate::token::{tokenize, Token};
    }
}

/// Represents the kind of table that can be generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    /// LL(1) predictive table
    Ll1,
    /// SLR(1) ACTION/GOTO table
    Slr1,
}

/// A generated table of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedTable {
    Ll1(ll::LlTable),
    Slr1(lr::LrTable),
}

impl GeneratedTable {
    pub fn human_readable_format(&self, grammar_table: &grammar::GrammarTable) -> String {
        match self {
            Self::Ll1(table) => table.human_readable_format(grammar_table),
            Self::Slr1(table) => table.human_readable_format(grammar_table),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ErrorKind {
    GrammarError(GrammarLoadError),
    TableGenerationError(TableGenError),
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GrammarError(err) => write!(f, "grammar error: {}", err),
            Self::TableGenerationError(err) => write!(f, "table generation error: {}", err),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    data: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, data: None }
    }

    pub fn with_data_mut(&mut self, data: String) {
        self.data = Some(data)
    }

    pub fn with_data(mut self, data: String) -> Self {
        self.with_data_mut(data);
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            Some(ctx) => write!(f, "{}: {}", &self.kind, ctx),
            None => write!(f, "{}", &self.kind),
        }
    }
}

impl std::error::Error for Error {}

/// Loads a grammar from its BNF text and generates a table of the requested
/// kind.
pub fn generate_table_from_production_set<G: AsRef<str>>(
    kind: GeneratorKind,
    grammar: G,
) -> Result<GeneratedTable, Error> {
    use grammar::load_grammar;

    let grammar = grammar.as_ref();
    let grammar_table =
        load_grammar(grammar).map_err(|e| Error::new(ErrorKind::GrammarError(e)))?;

    generate_table_from_grammar(kind, &grammar_table)
}

pub fn generate_table_from_grammar(
    kind: GeneratorKind,
    grammar_table: &grammar::GrammarTable,
) -> Result<GeneratedTable, Error> {
    let sets = sets::GrammarSets::new(grammar_table);

    match kind {
        GeneratorKind::Ll1 => {
            use crate::ll::LlTableGenerator;

            crate::ll::Ll1::generate_table(grammar_table, &sets)
                .map(GeneratedTable::Ll1)
                .map_err(|e| Error::new(ErrorKind::TableGenerationError(e)))
        }
        GeneratorKind::Slr1 => {
            use crate::lr::LrTableGenerator;

            crate::lr::Slr1::generate_table(grammar_table, &sets)
                .map(GeneratedTable::Slr1)
                .map_err(|e| Error::new(ErrorKind::TableGenerationError(e)))
        }
    }
}
