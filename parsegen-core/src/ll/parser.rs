use std::collections::BTreeSet;

use log::{debug, trace};

use super::LlTable;
use crate::config::ParserConfig;
use crate::diagnostic::Diagnostics;
use crate::grammar::*;
use crate::sets::GrammarSets;
use crate::token::{Classifier, Token};

/// The result of a rendering traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlDerivation {
    pub diagnostics: Diagnostics,
    /// One line per visited symbol, indented by depth. `None` unless the
    /// traversal succeeded.
    pub tree: Option<String>,
}

/// A table-driven predictive parser over a borrowed LL(1) table.
#[derive(Debug, Clone)]
pub struct LlParser<'a> {
    grammar_table: &'a GrammarTable,
    sets: &'a GrammarSets,
    table: &'a LlTable,
    classifier: Classifier<'a>,
    terminator: Option<TerminalRef>,
    terminator_lexeme: &'a str,
    /// Terminals that may follow the terminator anywhere in the grammar.
    terminator_follow: BTreeSet<TerminalRef>,
}

/// A pending obligation on the expansion stack.
#[derive(Debug, Clone, Copy)]
struct Obligation {
    symbol: SymbolRef,
    depth: usize,
}

/// Per-traversal position state. Each traversal owns a fresh copy so probing
/// and rendering the same tokens are independent.
struct Traversal<'t> {
    tokens: &'t [Token],
    position: usize,
    last_consumed_line: Option<usize>,
    diagnostics: Diagnostics,
    tree: Option<String>,
}

impl<'t> Traversal<'t> {
    fn new(tokens: &'t [Token], render: bool) -> Self {
        Self {
            tokens,
            position: 0,
            last_consumed_line: None,
            diagnostics: Diagnostics::default(),
            tree: if render { Some(String::new()) } else { None },
        }
    }

    fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    /// The line a diagnostic at the current position is attributed to.
    fn diagnostic_line(&self) -> usize {
        self.last_consumed_line
            .or_else(|| self.current().map(|token| token.line))
            .or_else(|| self.tokens.last().map(|token| token.line))
            .unwrap_or(1)
    }

    fn consume(&mut self) {
        if let Some(token) = self.current() {
            self.last_consumed_line = Some(token.line);
            self.position += 1;
        }
    }

    fn write_line(&mut self, depth: usize, name: &str) {
        if let Some(tree) = self.tree.as_mut() {
            tree.extend(std::iter::repeat('\t').take(depth));
            tree.push_str(name);
            tree.push('\n');
        }
    }

    /// Flags a hard syntax error unless a missing terminator already
    /// explains the failure.
    fn fail(&mut self) {
        if self.diagnostics.missing_terminator.is_none() {
            self.diagnostics.record_syntax_error();
        }
    }
}

impl<'a> LlParser<'a> {
    pub fn new(
        grammar_table: &'a GrammarTable,
        sets: &'a GrammarSets,
        table: &'a LlTable,
        config: &'a ParserConfig,
    ) -> Self {
        let terminator = grammar_table.terminal_mapping(&Terminal::new(&config.terminator));
        let terminator_follow = terminator
            .map(|terminator| sets.follow_of_terminal(grammar_table, terminator))
            .unwrap_or_default();

        Self {
            grammar_table,
            sets,
            table,
            classifier: Classifier::new(grammar_table, config),
            terminator,
            terminator_lexeme: &config.terminator,
            terminator_follow,
        }
    }

    /// Traverses the tokens for diagnostics only.
    pub fn probe(&self, tokens: &[Token]) -> Diagnostics {
        let mut traversal = Traversal::new(tokens, false);
        self.traverse(&mut traversal);

        traversal.diagnostics
    }

    /// Traverses the tokens, rendering the derivation tree.
    pub fn render(&self, tokens: &[Token]) -> LlDerivation {
        let mut traversal = Traversal::new(tokens, true);
        let succeeded = self.traverse(&mut traversal);

        LlDerivation {
            diagnostics: traversal.diagnostics,
            tree: traversal.tree.filter(|_| succeeded),
        }
    }

    fn lookahead(&self, traversal: &Traversal) -> Option<TerminalRef> {
        match traversal.current() {
            Some(token) => self.classifier.classify_token(token),
            // a stream without an explicit end marker ends here.
            None => Some(self.grammar_table.eof_terminal_ref()),
        }
    }

    /// Expands the start symbol against the tokens, returning `true` if the
    /// whole input was derived.
    fn traverse(&self, traversal: &mut Traversal) -> bool {
        let start = match self.grammar_table.start_non_terminal_ref() {
            Some(start) => start,
            None => {
                traversal.fail();
                return false;
            }
        };

        let mut stack = vec![Obligation {
            symbol: SymbolRef::NonTerminal(start),
            depth: 0,
        }];

        while let Some(Obligation { symbol, depth }) = stack.pop() {
            traversal.write_line(depth, self.grammar_table.symbol_name(symbol));

            let expanded = match symbol {
                SymbolRef::Terminal(expected) => self.match_terminal(traversal, expected),
                SymbolRef::NonTerminal(non_terminal) => {
                    self.expand(traversal, &mut stack, non_terminal, depth)
                }
            };

            if !expanded {
                return false;
            }
        }

        let eof = self.grammar_table.eof_terminal_ref();
        if self.lookahead(traversal) != Some(eof) {
            debug!(
                "trailing input at token {} after derivation",
                traversal.position
            );
            traversal.fail();
            return false;
        }

        true
    }

    fn match_terminal(&self, traversal: &mut Traversal, expected: TerminalRef) -> bool {
        if self.lookahead(traversal) == Some(expected) {
            trace!(
                "matched '{}'",
                self.grammar_table.symbol_name(SymbolRef::Terminal(expected))
            );
            traversal.consume();
            return true;
        }

        if Some(expected) == self.terminator {
            // treat the terminator as present so the derivation continues.
            let line = traversal.diagnostic_line();
            if traversal
                .diagnostics
                .record_missing_terminator(line, self.terminator_lexeme)
            {
                debug!("missing '{}' on line {}", self.terminator_lexeme, line);
            }
            return true;
        }

        debug!(
            "expected '{}' at token {}",
            self.grammar_table.symbol_name(SymbolRef::Terminal(expected)),
            traversal.position
        );
        traversal.fail();
        false
    }

    fn expand(
        &self,
        traversal: &mut Traversal,
        stack: &mut Vec<Obligation>,
        non_terminal: NonTerminalRef,
        depth: usize,
    ) -> bool {
        let lookahead = self.lookahead(traversal);
        let production = lookahead
            .and_then(|lookahead| self.table.lookup(non_terminal, lookahead))
            .and_then(|id| self.grammar_table.production(id));

        match production {
            Some(production) if production.is_epsilon() => {
                self.write_epsilon(traversal, depth);
                true
            }
            Some(production) => {
                trace!(
                    "expanding {}",
                    self.grammar_table.human_readable_production(production)
                );
                // pushed in reverse so the leftmost symbol is expanded first.
                stack.extend(production.rhs.iter().rev().map(|&symbol| Obligation {
                    symbol,
                    depth: depth + 1,
                }));
                true
            }
            None if self.epsilon_fallback(non_terminal, lookahead) => {
                trace!(
                    "{} falls back to epsilon",
                    self.grammar_table
                        .symbol_name(SymbolRef::NonTerminal(non_terminal))
                );
                self.write_epsilon(traversal, depth);
                true
            }
            None => {
                debug!(
                    "no prediction for {} at token {}",
                    self.grammar_table
                        .symbol_name(SymbolRef::NonTerminal(non_terminal)),
                    traversal.position
                );
                traversal.fail();
                false
            }
        }
    }

    fn write_epsilon(&self, traversal: &mut Traversal, depth: usize) {
        let epsilon = self.grammar_table.epsilon_terminal_ref();
        traversal.write_line(
            depth + 1,
            self.grammar_table.symbol_name(SymbolRef::Terminal(epsilon)),
        );
    }

    /// A nullable non-terminal without a prediction may derive epsilon when
    /// the lookahead may follow it, or when the terminator may follow it and
    /// the lookahead may follow the terminator. The latter lets an
    /// unterminated statement finish so the terminator itself is reported.
    fn epsilon_fallback(
        &self,
        non_terminal: NonTerminalRef,
        lookahead: Option<TerminalRef>,
    ) -> bool {
        if !self.sets.is_nullable(non_terminal) {
            return false;
        }

        let (lookahead, follow) = match (lookahead, self.sets.follow(non_terminal)) {
            (Some(lookahead), Some(follow)) => (lookahead, follow),
            _ => return false,
        };

        let follows_directly = follow.contains(&lookahead);
        let finishes_before_terminator = self
            .terminator
            .map(|terminator| follow.contains(&terminator))
            .unwrap_or(false)
            && self.terminator_follow.contains(&lookahead);

        follows_directly || finishes_before_terminator
    }
}
