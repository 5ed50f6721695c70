use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::grammar::*;

/// A mapping of non-terminal symbols to their corresponding terminal symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRefSet {
    sets: BTreeMap<NonTerminalRef, BTreeSet<TerminalRef>>,
}

impl SymbolRefSet {
    fn new<NT: IntoIterator<Item = NonTerminalRef>>(non_terminals: NT) -> Self {
        let sets = non_terminals
            .into_iter()
            .map(|non_terminal| (non_terminal, BTreeSet::new()))
            .collect();

        Self { sets }
    }

    /// Inserts a terminal into a non-terminals's set returning true if it
    /// was not already a member.
    fn insert<T: Into<TerminalRef>>(&mut self, key: NonTerminalRef, terminal: T) -> bool {
        self.sets
            .get_mut(&key)
            .map(|terminal_set| terminal_set.insert(terminal.into()))
            .unwrap_or(false)
    }

    /// Adds every terminal to the set for `key`, returning true if the set
    /// grew.
    fn extend<I: IntoIterator<Item = TerminalRef>>(
        &mut self,
        key: NonTerminalRef,
        terminals: I,
    ) -> bool {
        terminals
            .into_iter()
            .fold(false, |changed, terminal| self.insert(key, terminal) || changed)
    }

    /// Sets the terminals for `lhs` to the union of `lhs` and `rhs`.
    fn union_of_sets(&mut self, lhs: NonTerminalRef, rhs: &NonTerminalRef) -> bool {
        let terminals_from_rhs = self.sets.get(rhs).cloned().unwrap_or_default();

        self.extend(lhs, terminals_from_rhs)
    }

    pub fn get(&self, non_terminal: NonTerminalRef) -> Option<&BTreeSet<TerminalRef>> {
        self.sets.get(&non_terminal)
    }

    pub fn contains(&self, non_terminal: NonTerminalRef, terminal: TerminalRef) -> bool {
        self.sets
            .get(&non_terminal)
            .map(|terminals| terminals.contains(&terminal))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NonTerminalRef, &BTreeSet<TerminalRef>)> {
        self.sets.iter()
    }

    pub fn human_readable_format(&self, grammar_table: &GrammarTable) -> String {
        let lines = self
            .sets
            .iter()
            .map(|(nonterm, terms)| {
                let rhs = terms
                    .iter()
                    .map(|term| grammar_table.symbol_name(SymbolRef::Terminal(*term)))
                    .collect::<Vec<_>>();

                format!(
                    "{}: {}",
                    grammar_table.symbol_name(SymbolRef::NonTerminal(*nonterm)),
                    rhs.join(", ")
                )
            })
            .collect::<Vec<_>>();

        lines.join("\n")
    }
}

/// First and Follow sets for every non-terminal of a grammar.
///
/// First sets carry the `<epsilon>` terminal for nullable non-terminals.
/// Follow sets never do, and the follow set of the goal and start symbols
/// always carries `<$>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarSets {
    epsilon: TerminalRef,
    first: SymbolRefSet,
    follow: SymbolRefSet,
}

impl GrammarSets {
    /// Computes both fixed points for the grammar.
    pub fn new(grammar_table: &GrammarTable) -> Self {
        let mut sets = Self::seeded(grammar_table);

        let mut first_passes = 1;
        while sets.propagate_first(grammar_table) {
            first_passes += 1;
        }

        let mut follow_passes = 1;
        while sets.propagate_follow(grammar_table) {
            follow_passes += 1;
        }

        debug!(
            "first sets stable after {} passes, follow sets stable after {} passes",
            first_passes, follow_passes
        );

        sets
    }

    /// Returns the starting point of both fixed points: empty first sets and
    /// follow sets holding only the end-of-input seed.
    pub fn seeded(grammar_table: &GrammarTable) -> Self {
        let first = SymbolRefSet::new(grammar_table.non_terminal_refs());
        let mut follow = SymbolRefSet::new(grammar_table.non_terminal_refs());

        let eof = grammar_table.eof_terminal_ref();
        follow.insert(grammar_table.goal_non_terminal_ref(), eof);
        if let Some(start) = grammar_table.start_non_terminal_ref() {
            follow.insert(start, eof);
        }

        Self {
            epsilon: grammar_table.epsilon_terminal_ref(),
            first,
            follow,
        }
    }

    /// Runs a single pass of the first set rule over every production,
    /// returning `true` if any set grew.
    pub fn propagate_first(&mut self, grammar_table: &GrammarTable) -> bool {
        let mut changed = false;

        for production in grammar_table.productions() {
            let firsts = self.first_of_sequence(&production.rhs);
            if self.first.extend(production.lhs, firsts) {
                changed = true;
            }
        }

        changed
    }

    /// Runs a single pass of the follow set rule over every production,
    /// returning `true` if any set grew.
    pub fn propagate_follow(&mut self, grammar_table: &GrammarTable) -> bool {
        let mut changed = false;

        for production in grammar_table.productions() {
            for (idx, symbol) in production.rhs.iter().enumerate() {
                let b = match symbol {
                    SymbolRef::NonTerminal(b) => *b,
                    SymbolRef::Terminal(_) => continue,
                };

                let beta = &production.rhs[idx + 1..];
                let first_of_beta = self.first_of_sequence(beta);
                let beta_is_nullable = first_of_beta.contains(&self.epsilon);

                let epsilon = self.epsilon;
                let non_epsilon = first_of_beta.into_iter().filter(|t| *t != epsilon);
                if self.follow.extend(b, non_epsilon) {
                    changed = true;
                }

                if beta_is_nullable && self.follow.union_of_sets(b, &production.lhs) {
                    changed = true;
                }
            }
        }

        changed
    }

    /// Returns First(X). A terminal's first set is itself.
    pub fn first(&self, symbol: SymbolRef) -> BTreeSet<TerminalRef> {
        match symbol {
            SymbolRef::Terminal(t) => [t].into_iter().collect(),
            SymbolRef::NonTerminal(nt) => self.first.get(nt).cloned().unwrap_or_default(),
        }
    }

    /// Returns the first set of a sequence of symbols, scanning left to
    /// right until a symbol that cannot derive epsilon. An exhausted
    /// sequence, including the empty one, contributes `<epsilon>`.
    pub fn first_of_sequence(&self, sequence: &[SymbolRef]) -> BTreeSet<TerminalRef> {
        let mut firsts = BTreeSet::new();

        for symbol in sequence {
            let symbol_firsts = self.first(*symbol);
            let nullable = symbol_firsts.contains(&self.epsilon);

            firsts.extend(symbol_firsts.into_iter().filter(|t| *t != self.epsilon));
            if !nullable {
                return firsts;
            }
        }

        firsts.insert(self.epsilon);
        firsts
    }

    pub fn follow(&self, non_terminal: NonTerminalRef) -> Option<&BTreeSet<TerminalRef>> {
        self.follow.get(non_terminal)
    }

    pub fn is_nullable(&self, non_terminal: NonTerminalRef) -> bool {
        self.first.contains(non_terminal, self.epsilon)
    }

    /// Returns the terminals that may directly follow an occurrence of the
    /// terminal `terminal` anywhere in the grammar.
    pub fn follow_of_terminal(
        &self,
        grammar_table: &GrammarTable,
        terminal: TerminalRef,
    ) -> BTreeSet<TerminalRef> {
        let mut follows = BTreeSet::new();

        for production in grammar_table.productions() {
            let occurrences = production
                .rhs
                .iter()
                .enumerate()
                .filter(|(_, symbol)| **symbol == SymbolRef::Terminal(terminal));

            for (idx, _) in occurrences {
                let first_of_suffix = self.first_of_sequence(&production.rhs[idx + 1..]);
                if first_of_suffix.contains(&self.epsilon) {
                    follows.extend(self.follow(production.lhs).into_iter().flatten().copied());
                }
                follows.extend(first_of_suffix.into_iter().filter(|t| *t != self.epsilon));
            }
        }

        follows
    }

    pub fn first_sets(&self) -> &SymbolRefSet {
        &self.first
    }

    pub fn follow_sets(&self) -> &SymbolRefSet {
        &self.follow
    }

    pub fn human_readable_format(&self, grammar_table: &GrammarTable) -> String {
        format!(
            "FIRST\n{}\n\nFOLLOW\n{}",
            self.first.human_readable_format(grammar_table),
            self.follow.human_readable_format(grammar_table)
        )
    }
}
