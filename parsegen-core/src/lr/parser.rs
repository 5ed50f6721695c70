use log::{debug, trace};

use super::{Action, Goto, LrTable, StateId};
use crate::config::ParserConfig;
use crate::diagnostic::Diagnostics;
use crate::grammar::*;
use crate::token::{Classifier, Token};

/// The order in which reduction snapshots are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOrder {
    /// The accepted configuration first, the raw input last.
    NewestFirst,
    /// The raw input first, the accepted configuration last.
    OldestFirst,
}

/// The result of a full parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrDerivation {
    pub diagnostics: Diagnostics,
    /// Snapshots of the symbol stack followed by the remaining input, oldest
    /// first. `None` unless the parse was accepted.
    pub steps: Option<Vec<String>>,
}

impl LrDerivation {
    pub const SEPARATOR: &'static str = " => \n";

    /// Joins the snapshots with the derivation separator.
    pub fn render(&self, order: TraceOrder) -> Option<String> {
        self.steps.as_ref().map(|steps| match order {
            TraceOrder::OldestFirst => steps.join(Self::SEPARATOR),
            TraceOrder::NewestFirst => steps
                .iter()
                .rev()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(Self::SEPARATOR),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Check,
    Parse,
}

/// How a single pass over the tokens ended.
#[derive(Debug)]
enum PassOutcome {
    Accepted(Vec<String>),
    MissingTerminator { position: usize, line: usize },
    Rejected,
}

/// A shift-reduce parser over a borrowed SLR(1) table.
#[derive(Debug, Clone)]
pub struct LrParser<'a> {
    grammar_table: &'a GrammarTable,
    table: &'a LrTable,
    classifier: Classifier<'a>,
    terminator: Option<TerminalRef>,
    terminator_lexeme: &'a str,
    max_recovery_restarts: usize,
}

impl<'a> LrParser<'a> {
    pub fn new(
        grammar_table: &'a GrammarTable,
        table: &'a LrTable,
        config: &'a ParserConfig,
    ) -> Self {
        Self {
            grammar_table,
            table,
            classifier: Classifier::new(grammar_table, config),
            terminator: grammar_table.terminal_mapping(&Terminal::new(&config.terminator)),
            terminator_lexeme: &config.terminator,
            max_recovery_restarts: config.max_recovery_restarts,
        }
    }

    /// Runs the automaton for diagnostics only, stopping at the first
    /// missing terminator or syntax error.
    pub fn check(&self, tokens: &[Token]) -> Diagnostics {
        self.run(tokens, Mode::Check).0
    }

    /// Runs the automaton to acceptance, recovering from a missing
    /// terminator by inserting it and restarting.
    pub fn parse(&self, tokens: &[Token]) -> LrDerivation {
        let (diagnostics, steps) = self.run(tokens, Mode::Parse);

        LrDerivation { diagnostics, steps }
    }

    fn run(&self, tokens: &[Token], mode: Mode) -> (Diagnostics, Option<Vec<String>>) {
        let mut diagnostics = Diagnostics::default();
        let mut tokens = tokens.to_vec();
        let mut restarts = 0;

        loop {
            match self.pass(&tokens, mode == Mode::Parse) {
                PassOutcome::Accepted(steps) => {
                    let steps = Some(steps).filter(|_| mode == Mode::Parse);
                    return (diagnostics, steps);
                }
                PassOutcome::MissingTerminator { position, line } => {
                    diagnostics.record_missing_terminator(line, self.terminator_lexeme);

                    if mode == Mode::Check {
                        return (diagnostics, None);
                    }

                    if restarts >= self.max_recovery_restarts {
                        debug!(
                            "recovery limit of {} restarts reached",
                            self.max_recovery_restarts
                        );
                        diagnostics.record_syntax_error();
                        return (diagnostics, None);
                    }

                    restarts += 1;
                    debug!(
                        "inserting '{}' at token {} on line {}, restart {}",
                        self.terminator_lexeme, position, line, restarts
                    );
                    tokens.insert(position, Token::new(self.terminator_lexeme, line));
                }
                PassOutcome::Rejected => {
                    diagnostics.record_syntax_error();
                    return (diagnostics, None);
                }
            }
        }
    }

    fn pass(&self, tokens: &[Token], record_steps: bool) -> PassOutcome {
        let mut states = vec![StateId::unchecked_new(0)];
        let mut symbols: Vec<String> = vec![];
        let mut steps = vec![];
        let mut position = 0;
        let mut last_shifted_line = None;

        if record_steps {
            steps.push(snapshot(&symbols, &tokens[position..]));
        }

        loop {
            let state = match states.last() {
                Some(&state) => state,
                None => return PassOutcome::Rejected,
            };
            let token = tokens.get(position);
            let lookahead = match token {
                Some(token) => self.classifier.classify_token(token),
                None => Some(self.grammar_table.eof_terminal_ref()),
            };
            let action = lookahead
                .map(|lookahead| self.table.action_for(state, lookahead))
                .unwrap_or_default();

            match action {
                Action::Shift(next) => {
                    let lexeme = token.map(|token| token.lexeme.clone()).unwrap_or_default();
                    trace!("{}: shift '{}' to {}", state, lexeme, next);

                    last_shifted_line = token.map(|token| token.line);
                    states.push(next);
                    symbols.push(lexeme);
                    position += 1;
                }
                Action::Reduce(production_id) => {
                    let production = match self.grammar_table.production(production_id) {
                        Some(production) => production,
                        None => return PassOutcome::Rejected,
                    };

                    let rhs_len = production.rhs_len();
                    if rhs_len >= states.len() || rhs_len > symbols.len() {
                        return PassOutcome::Rejected;
                    }
                    states.truncate(states.len() - rhs_len);
                    symbols.truncate(symbols.len() - rhs_len);

                    let exposed = match states.last() {
                        Some(&exposed) => exposed,
                        None => return PassOutcome::Rejected,
                    };
                    let next = match self.table.goto_for(exposed, production.lhs) {
                        Goto::State(next) => next,
                        Goto::DeadState => return PassOutcome::Rejected,
                    };

                    trace!(
                        "{}: reduce {}",
                        state,
                        self.grammar_table.human_readable_production(production)
                    );
                    states.push(next);
                    symbols.push(
                        self.grammar_table
                            .symbol_name(SymbolRef::NonTerminal(production.lhs))
                            .to_string(),
                    );

                    if record_steps {
                        steps.push(snapshot(&symbols, &tokens[position..]));
                    }
                }
                Action::Accept => {
                    trace!("{}: accept", state);
                    return PassOutcome::Accepted(steps);
                }
                Action::DeadState => {
                    let line = last_shifted_line
                        .or_else(|| token.map(|token| token.line))
                        .unwrap_or(1);

                    if self.expects_terminator(state) {
                        debug!(
                            "{}: missing '{}' on line {}",
                            state, self.terminator_lexeme, line
                        );
                        return PassOutcome::MissingTerminator { position, line };
                    }

                    debug!("{}: no action at token {} on line {}", state, position, line);
                    return PassOutcome::Rejected;
                }
            }
        }
    }

    fn expects_terminator(&self, state: StateId) -> bool {
        self.terminator
            .map(|terminator| self.table.action_for(state, terminator) != Action::DeadState)
            .unwrap_or(false)
    }
}

/// Renders the symbol stack followed by the remaining input, excluding the
/// end-of-input marker.
fn snapshot(symbols: &[String], remaining: &[Token]) -> String {
    symbols
        .iter()
        .map(String::as_str)
        .chain(
            remaining
                .iter()
                .filter(|token| !token.is_eof())
                .map(|token| token.lexeme.as_str()),
        )
        .collect::<Vec<_>>()
        .join(" ")
}
