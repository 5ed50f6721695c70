use log::debug;

use crate::error::{TableGenError, TableGenErrorKind};
use crate::grammar::*;
use crate::sets::GrammarSets;

mod item;
mod ordered_set;
pub mod parser;

use item::{build_canonical_collection, ItemCollection};

/// Exposes a trait for generating an LR table from a grammar.
pub(crate) trait LrTableGenerator {
    fn generate_table(
        grammar_table: &GrammarTable,
        sets: &GrammarSets,
    ) -> Result<LrTable, TableGenError>;
}

/// A wrapper type for SLR(1) parser tables.
pub(crate) struct Slr1;

impl LrTableGenerator for Slr1 {
    fn generate_table(
        grammar_table: &GrammarTable,
        sets: &GrammarSets,
    ) -> Result<LrTable, TableGenError> {
        let collection = build_canonical_collection(grammar_table);

        build_table(grammar_table, sets, &collection)
    }
}

/// Renders the canonical LR(0) collection of a grammar, one block per state
/// in state order, each item written as `<A> -> a . <B>`.
pub fn human_readable_item_sets(grammar_table: &GrammarTable) -> String {
    build_canonical_collection(grammar_table).human_readable_format(grammar_table)
}

/// A wrapper type for annotating a state of the automaton.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    /// Instantiates a new [StateId] from a reference id.
    ///
    /// # Safety
    ///
    /// Caller guarantees that the id usize corresponds to a valid state in
    /// the parse table.
    pub fn unchecked_new(id: usize) -> Self {
        StateId(id)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl From<StateId> for usize {
    fn from(value: StateId) -> Self {
        value.as_usize()
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Represents one of 4 valid actions for the action table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The goal state has been reached and a parse can be accepted.
    Accept,
    /// Shift the input on to the terminal stream.
    Shift(StateId),
    /// Reduce the production to a previous state and type.
    Reduce(ProductionId),
    /// No further actions for the parse.
    #[default]
    DeadState,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Accept => write!(f, "accept"),
            Action::Shift(id) => write!(f, "{}", id),
            Action::Reduce(id) => write!(f, "{}", id),
            Action::DeadState => write!(f, " "),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Goto {
    State(StateId),
    #[default]
    DeadState,
}

/// ACTION and GOTO tables, indexed `[terminal][state]` and
/// `[non_terminal][state]` respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LrTable {
    pub states: usize,
    pub goto: Vec<Vec<Goto>>,
    pub action: Vec<Vec<Action>>,
}

impl LrTable {
    pub(crate) fn new(states: usize, goto: Vec<Vec<Goto>>, action: Vec<Vec<Action>>) -> Self {
        Self {
            states,
            goto,
            action,
        }
    }

    /// Returns the action for a state and lookahead, `DeadState` for any
    /// cell outside the table.
    pub fn action_for(&self, state: StateId, terminal: TerminalRef) -> Action {
        self.action
            .get(terminal.as_usize())
            .and_then(|col| col.get(state.as_usize()))
            .copied()
            .unwrap_or_default()
    }

    pub fn goto_for(&self, state: StateId, non_terminal: NonTerminalRef) -> Goto {
        self.goto
            .get(non_terminal.as_usize())
            .and_then(|col| col.get(state.as_usize()))
            .copied()
            .unwrap_or_default()
    }

    /// Returns the number of non-dead ACTION cells.
    pub fn action_entries(&self) -> usize {
        self.action
            .iter()
            .flatten()
            .filter(|action| **action != Action::DeadState)
            .count()
    }

    /// Returns the number of non-dead GOTO cells.
    pub fn goto_entries(&self) -> usize {
        self.goto
            .iter()
            .flatten()
            .filter(|goto| **goto != Goto::DeadState)
            .count()
    }

    /// Writes an action into a cell. Writing the same action twice is
    /// allowed, writing a different one is a conflict.
    fn set_action(
        &mut self,
        grammar_table: &GrammarTable,
        state: StateId,
        terminal: TerminalRef,
        action: Action,
    ) -> Result<(), TableGenError> {
        let cell = self
            .action
            .get_mut(terminal.as_usize())
            .and_then(|col| col.get_mut(state.as_usize()))
            .ok_or_else(|| {
                TableGenError::new(TableGenErrorKind::UnknownTerminal).with_data(format!(
                    "{} in {}",
                    grammar_table.symbol_name(SymbolRef::Terminal(terminal)),
                    state
                ))
            })?;

        let existing = *cell;
        match existing {
            Action::DeadState => {
                *cell = action;
                Ok(())
            }
            _ if existing == action => Ok(()),
            _ => Err(
                TableGenError::new(TableGenErrorKind::ActionConflict).with_data(format!(
                    "state {} on '{}': {} vs {}",
                    state,
                    grammar_table.symbol_name(SymbolRef::Terminal(terminal)),
                    existing,
                    action
                )),
            ),
        }
    }

    /// Outputs a human-readable representation of the parse table.
    pub fn human_readable_format(&self, grammar_table: &GrammarTable) -> String {
        const DEAD_STATE_STR: &str = " ";

        let left_side_padding = 8;
        let row_header = grammar_table
            .terminals()
            // epsilon never labels a column.
            .skip(1)
            .map(|t| t.to_string())
            .chain(
                grammar_table
                    .non_terminals()
                    // skip the goal non-terminal
                    .skip(1)
                    .map(|s| s.to_string()),
            )
            .map(|t_or_s_str_repr| format!("{: >10}", t_or_s_str_repr))
            .collect::<String>();
        let table_width_without_left_side_padding = row_header.len();

        let padding = " ".repeat(left_side_padding);
        let first_row = format!("{}{}", &padding, &row_header);
        let table_padding = format!(
            "{}{}",
            &padding,
            "-".repeat(table_width_without_left_side_padding)
        );

        let rows = (0..self.states)
            .map(|curr_state| {
                let action_row = self.action.iter().skip(1).map(|col| {
                    col.get(curr_state)
                        .map(|a| format!("{: >10}", a.to_string()))
                        .unwrap_or_else(|| format!("{: >10}", ""))
                });
                let goto_row = self.goto.iter().skip(1).map(|col| {
                    col.get(curr_state)
                        .map(|g| match g {
                            Goto::State(id) => format!("{: >10}", id.as_usize()),
                            Goto::DeadState => format!("{: >10}", DEAD_STATE_STR),
                        })
                        .unwrap_or_else(|| format!("{: >10}", ""))
                });

                format!(
                    "{: >6} |{}{}",
                    curr_state,
                    action_row.collect::<String>(),
                    goto_row.collect::<String>()
                )
            })
            .collect::<Vec<_>>();

        [first_row, table_padding]
            .into_iter()
            .chain(rows)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Constructs action table from a canonical collection.
///
/// ```ignore
/// ∀ set sx ∈ S
///     ∀ item i ∈ sx
///         if i is [A → β •aγ] and goto(sx ,a) = sk , a ∈ T
///             then ACTION[x,a] ← “shift k”
///         else if i is [S’→S •]
///             then ACTION[x,EOF] ← “accept”
///         else if i is [A →β •]
///             then ∀ a ∈ FOLLOW(A) ACTION[x,a] ← “reduce A → β”
///     ∀ n ∈ NT
///         if goto(sx ,n) = s k
///             then GOTO [x,n] ← k
/// ```
///
/// Any cell that would receive two different actions fails the build.
fn build_table(
    grammar_table: &GrammarTable,
    sets: &GrammarSets,
    canonical_collection: &ItemCollection,
) -> Result<LrTable, TableGenError> {
    let eof_terminal_ref = grammar_table.eof_terminal_ref();
    let goal = grammar_table.goal_non_terminal_ref();
    let states = canonical_collection.states();

    let mut table = LrTable::new(
        states,
        vec![vec![Goto::default(); states]; grammar_table.non_terminal_count()],
        vec![vec![Action::default(); states]; grammar_table.terminal_count()],
    );

    for (x, sx) in canonical_collection.item_sets() {
        for i in sx.items() {
            let production = grammar_table.production(i.production).ok_or_else(|| {
                TableGenError::new(TableGenErrorKind::MissingGoto)
                    .with_data(format!("unknown production {}", i.production))
            })?;

            match i.symbol_after_dot(grammar_table) {
                Some(SymbolRef::Terminal(a)) => {
                    let k = canonical_collection
                        .transition(x, SymbolRef::Terminal(a))
                        .ok_or_else(|| {
                            TableGenError::new(TableGenErrorKind::MissingGoto).with_data(format!(
                                "{} on '{}'",
                                x,
                                grammar_table.symbol_name(SymbolRef::Terminal(a))
                            ))
                        })?;

                    table.set_action(grammar_table, x, a, Action::Shift(k))?;
                }
                Some(SymbolRef::NonTerminal(_)) => {}
                None if production.lhs == goal => {
                    table.set_action(grammar_table, x, eof_terminal_ref, Action::Accept)?;
                }
                None => {
                    let follow = sets.follow(production.lhs).into_iter().flatten();
                    for a in follow {
                        table.set_action(grammar_table, x, *a, Action::Reduce(i.production))?;
                    }
                }
            }
        }

        // ∀ n ∈ NT
        //     if goto(sx ,n) = s k
        //         then GOTO [x,n] ← k
        let non_terminal_transitions = canonical_collection
            .transitions_from(x)
            .filter_map(|(sym, k)| sym.as_non_terminal().map(|n| (n, k)));
        for (n, k) in non_terminal_transitions {
            if let Some(cell) = table
                .goto
                .get_mut(n.as_usize())
                .and_then(|col| col.get_mut(x.as_usize()))
            {
                *cell = Goto::State(k);
            }
        }
    }

    debug!(
        "slr(1) table generated: {} states, {} actions, {} gotos",
        table.states,
        table.action_entries(),
        table.goto_entries()
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_GRAMMAR: &str = "
<E> ::= <T> - <E>
<E> ::= <T>
<T> ::= <F> * <T>
<T> ::= <F>
<F> ::= n
";

    fn generate(grammar: &str) -> Result<LrTable, TableGenError> {
        let grammar_table = load_grammar(grammar).unwrap();
        let sets = GrammarSets::new(&grammar_table);

        Slr1::generate_table(&grammar_table, &sets)
    }

    fn terminal(grammar_table: &GrammarTable, name: &str) -> TerminalRef {
        grammar_table
            .terminal_mapping(&Terminal::new(name))
            .unwrap()
    }

    #[test]
    fn should_generate_expected_table() {
        let grammar_table = load_grammar(TEST_GRAMMAR).unwrap();
        let sets = GrammarSets::new(&grammar_table);
        let table = Slr1::generate_table(&grammar_table, &sets).unwrap();

        assert_eq!(9, table.states);

        let s0 = StateId::unchecked_new(0);
        let s1 = StateId::unchecked_new(1);
        let eof = grammar_table.eof_terminal_ref();

        assert_eq!(
            Action::Shift(StateId::unchecked_new(4)),
            table.action_for(s0, terminal(&grammar_table, "n"))
        );
        assert_eq!(Action::Accept, table.action_for(s1, eof));
        assert_eq!(
            Action::DeadState,
            table.action_for(s0, terminal(&grammar_table, "-"))
        );

        let e = grammar_table
            .non_terminal_mapping(&NonTerminal::new("<E>"))
            .unwrap();
        assert_eq!(Goto::State(s1), table.goto_for(s0, e));
    }

    #[test]
    fn should_reduce_on_follow_set_only() {
        let grammar_table = load_grammar(TEST_GRAMMAR).unwrap();
        let sets = GrammarSets::new(&grammar_table);
        let table = Slr1::generate_table(&grammar_table, &sets).unwrap();

        // s4 is `<F> -> n .`
        let s4 = StateId::unchecked_new(4);
        let reduce_f = Action::Reduce(ProductionId::unchecked_new(5));
        for name in ["-", "*", "<$>"] {
            assert_eq!(reduce_f, table.action_for(s4, terminal(&grammar_table, name)));
        }
        assert_eq!(
            Action::DeadState,
            table.action_for(s4, terminal(&grammar_table, "n"))
        );
    }

    #[test]
    fn should_generate_reductions_for_epsilon_productions() {
        let grammar_table = load_grammar(
            "
<list> ::= ( <items> )
<items> ::= x <items>
<items> ::= <epsilon>
",
        )
        .unwrap();
        let sets = GrammarSets::new(&grammar_table);
        let table = Slr1::generate_table(&grammar_table, &sets).unwrap();

        let s0 = StateId::unchecked_new(0);
        let after_open = match table.action_for(s0, terminal(&grammar_table, "(")) {
            Action::Shift(state) => state,
            other => panic!("expected shift, got {:?}", other),
        };

        assert_eq!(
            Action::Reduce(ProductionId::unchecked_new(3)),
            table.action_for(after_open, terminal(&grammar_table, ")"))
        );
    }

    #[test]
    fn should_reject_grammar_with_conflicting_actions() {
        // the dangling else is the classic shift/reduce conflict.
        let res = generate(
            "
<S> ::= if <S>
<S> ::= if <S> else <S>
<S> ::= x
",
        );

        assert_eq!(
            Err(&TableGenErrorKind::ActionConflict),
            res.as_ref().map_err(|e| e.kind())
        );
    }

    #[test]
    fn should_generate_identical_tables_across_runs() {
        assert_eq!(generate(TEST_GRAMMAR), generate(TEST_GRAMMAR));
    }

    #[test]
    fn should_render_item_sets_per_state() {
        let grammar_table = load_grammar(TEST_GRAMMAR).unwrap();
        let rendered = human_readable_item_sets(&grammar_table);

        assert!(rendered.starts_with("\nS0:\n"), "{}", rendered);
        assert!(rendered.contains("<*> -> . <E>\n"), "{}", rendered);
        assert!(rendered.contains("\nS8:\n"), "{}", rendered);
        assert!(!rendered.contains("\nS9:\n"), "{}", rendered);
    }

    #[test]
    fn should_render_human_readable_table() {
        let grammar_table = load_grammar(TEST_GRAMMAR).unwrap();
        let sets = GrammarSets::new(&grammar_table);
        let table = Slr1::generate_table(&grammar_table, &sets).unwrap();

        let rendered = table.human_readable_format(&grammar_table);
        let mut lines = rendered.lines();

        let header = lines.next().unwrap();
        assert!(header.contains("<$>") && header.contains("<E>"));
        assert!(!header.contains("<epsilon>"));
        // header, separator and one row per state.
        assert_eq!(2 + 9, rendered.lines().count());
        assert!(rendered.contains("accept"));
        assert!(rendered.contains("r5"));
    }
}
