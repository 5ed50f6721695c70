use std::collections::BTreeMap;

use log::debug;

use crate::error::{TableGenError, TableGenErrorKind};
use crate::grammar::*;
use crate::sets::GrammarSets;

pub mod parser;

/// Exposes a trait for generating a predictive table from a grammar.
pub(crate) trait LlTableGenerator {
    fn generate_table(
        grammar_table: &GrammarTable,
        sets: &GrammarSets,
    ) -> Result<LlTable, TableGenError>;
}

/// A wrapper type for LL(1) parser tables.
pub(crate) struct Ll1;

impl LlTableGenerator for Ll1 {
    fn generate_table(
        grammar_table: &GrammarTable,
        sets: &GrammarSets,
    ) -> Result<LlTable, TableGenError> {
        build_table(grammar_table, sets)
    }
}

/// A predictive parse table mapping a non-terminal and a lookahead terminal
/// to the production to expand.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LlTable {
    entries: BTreeMap<(NonTerminalRef, TerminalRef), ProductionId>,
}

impl LlTable {
    pub fn lookup(
        &self,
        non_terminal: NonTerminalRef,
        lookahead: TerminalRef,
    ) -> Option<ProductionId> {
        self.entries.get(&(non_terminal, lookahead)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NonTerminalRef, TerminalRef, ProductionId)> + '_ {
        self.entries
            .iter()
            .map(|(&(non_terminal, terminal), &production)| (non_terminal, terminal, production))
    }

    /// Installs a prediction. Installing the same production twice is
    /// allowed, a different one is a conflict.
    fn insert(
        &mut self,
        grammar_table: &GrammarTable,
        non_terminal: NonTerminalRef,
        lookahead: TerminalRef,
        production: ProductionId,
    ) -> Result<(), TableGenError> {
        match self.entries.get(&(non_terminal, lookahead)) {
            Some(&existing) if existing != production => {
                let render = |id: ProductionId| {
                    grammar_table
                        .production(id)
                        .map(|production| grammar_table.human_readable_production(production))
                        .unwrap_or_else(|| id.to_string())
                };

                Err(
                    TableGenError::new(TableGenErrorKind::PredictionConflict).with_data(format!(
                        "({}, '{}'): {} vs {}",
                        grammar_table.symbol_name(SymbolRef::NonTerminal(non_terminal)),
                        grammar_table.symbol_name(SymbolRef::Terminal(lookahead)),
                        render(existing),
                        render(production)
                    )),
                )
            }
            Some(_) => Ok(()),
            None => {
                self.entries.insert((non_terminal, lookahead), production);
                Ok(())
            }
        }
    }

    /// Outputs a human-readable listing of every prediction, one per line.
    pub fn human_readable_format(&self, grammar_table: &GrammarTable) -> String {
        self.iter()
            .map(|(non_terminal, terminal, production_id)| {
                let production = grammar_table
                    .production(production_id)
                    .map(|production| grammar_table.human_readable_production(production))
                    .unwrap_or_else(|| production_id.to_string());

                format!(
                    "[{}, {}] {}",
                    grammar_table.symbol_name(SymbolRef::NonTerminal(non_terminal)),
                    grammar_table.symbol_name(SymbolRef::Terminal(terminal)),
                    production
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Constructs the predictive table from first and follow sets.
///
/// ```ignore
/// ∀ production A → α
///     ∀ a ∈ FIRST(α) \ { ε }
///         TABLE[A,a] ← α
///     if ε ∈ FIRST(α) then
///         ∀ b ∈ FOLLOW(A)
///             TABLE[A,b] ← α
/// ```
fn build_table(grammar_table: &GrammarTable, sets: &GrammarSets) -> Result<LlTable, TableGenError> {
    let epsilon = grammar_table.epsilon_terminal_ref();
    let mut table = LlTable::default();

    for (idx, production) in grammar_table.productions().enumerate() {
        let production_id = ProductionId::unchecked_new(idx);
        let first_of_rhs = sets.first_of_sequence(&production.rhs);

        for &a in first_of_rhs.iter().filter(|&&t| t != epsilon) {
            table.insert(grammar_table, production.lhs, a, production_id)?;
        }

        if first_of_rhs.contains(&epsilon) {
            for &b in sets.follow(production.lhs).into_iter().flatten() {
                table.insert(grammar_table, production.lhs, b, production_id)?;
            }
        }
    }

    debug!("ll(1) table generated: {} predictions", table.len());

    Ok(table)
}
