use std::collections::hash_map::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinNonTerminals {
    Goal,
}

impl BuiltinNonTerminals {
    pub fn is_builtin<S: AsRef<str>>(non_terminal_str: S) -> bool {
        let val = non_terminal_str.as_ref();
        [Self::Goal]
            .iter()
            .map(|builtin| builtin.as_non_terminal())
            .any(|builtin| builtin == val)
    }

    pub(crate) fn as_non_terminal(&self) -> &'static str {
        match self {
            Self::Goal => "<*>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTerminals {
    Epsilon,
    Eof,
}

impl BuiltinTerminals {
    pub fn is_builtin<S: AsRef<str>>(terminal_str: S) -> bool {
        let val = terminal_str.as_ref();
        [Self::Epsilon, Self::Eof]
            .iter()
            .map(|builtin| builtin.as_terminal())
            .any(|builtin| builtin == val)
    }

    pub(crate) fn as_terminal(&self) -> &'static str {
        match self {
            BuiltinTerminals::Epsilon => "<epsilon>",
            BuiltinTerminals::Eof => "<$>",
        }
    }
}

/// A wrapper type for non-terminals borrowed from the grammar table.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NonTerminal<'a>(&'a str);

impl<'a> NonTerminal<'a> {
    pub fn new(non_terminal: &'a str) -> Self {
        Self(non_terminal)
    }
}

impl<'a> AsRef<str> for NonTerminal<'a> {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl<'a> std::fmt::Display for NonTerminal<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0)
    }
}

impl<'a> From<BuiltinNonTerminals> for NonTerminal<'a> {
    fn from(val: BuiltinNonTerminals) -> Self {
        Self::new(val.as_non_terminal())
    }
}

impl<'a> From<&'a str> for NonTerminal<'a> {
    fn from(val: &'a str) -> Self {
        Self::new(val)
    }
}

/// A wrapper type for terminals borrowed from the grammar table.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Terminal<'a>(&'a str);

impl<'a> Terminal<'a> {
    pub fn new(terminal: &'a str) -> Self {
        Self(terminal)
    }
}

impl<'a> AsRef<str> for Terminal<'a> {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl<'a> From<&'a str> for Terminal<'a> {
    fn from(val: &'a str) -> Self {
        Terminal::new(val)
    }
}

impl<'a> From<BuiltinTerminals> for Terminal<'a> {
    fn from(val: BuiltinTerminals) -> Self {
        Terminal::new(val.as_terminal())
    }
}

impl<'a> std::fmt::Display for Terminal<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol<'a> {
    NonTerminal(NonTerminal<'a>),
    Terminal(Terminal<'a>),
}

impl<'a> std::fmt::Display for Symbol<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::NonTerminal(nt) => nt.fmt(f),
            Symbol::Terminal(t) => t.fmt(f),
        }
    }
}

/// A wrapper type for non-terminals that reference the grammar table.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NonTerminalRef(usize);

impl NonTerminalRef {
    pub(crate) fn new(non_terminal: usize) -> Self {
        Self(non_terminal)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl From<usize> for NonTerminalRef {
    fn from(val: usize) -> Self {
        Self::new(val)
    }
}

impl std::fmt::Display for NonTerminalRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 1-indexed when human-readable.
        write!(f, "N{}", &self.0 + 1)
    }
}

/// A wrapper type for terminals that reference the grammar table.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TerminalRef(usize);

impl TerminalRef {
    pub(crate) fn new(terminal: usize) -> Self {
        Self(terminal)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl From<usize> for TerminalRef {
    fn from(val: usize) -> Self {
        Self::new(val)
    }
}

impl std::fmt::Display for TerminalRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 1-indexed when human-readable.
        write!(f, "T{}", &self.0 + 1)
    }
}

#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SymbolRef {
    NonTerminal(NonTerminalRef),
    Terminal(TerminalRef),
}

impl SymbolRef {
    pub fn as_non_terminal(&self) -> Option<NonTerminalRef> {
        match self {
            SymbolRef::NonTerminal(nt) => Some(*nt),
            SymbolRef::Terminal(_) => None,
        }
    }

    pub fn as_terminal(&self) -> Option<TerminalRef> {
        match self {
            SymbolRef::Terminal(t) => Some(*t),
            SymbolRef::NonTerminal(_) => None,
        }
    }
}

impl std::fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolRef::NonTerminal(id) => write!(f, "{}", id),
            SymbolRef::Terminal(id) => write!(f, "{}", id),
        }
    }
}

/// The stable reduction identity of a production, its declaration index.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProductionId(usize);

impl ProductionId {
    /// Instantiates a new [ProductionId] from a reference id.
    ///
    /// # Safety
    ///
    /// Caller guarantees that the id usize corresponds to a valid production
    /// id in the corresponding grammar.
    pub fn unchecked_new(id: usize) -> Self {
        ProductionId(id)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl From<ProductionId> for usize {
    fn from(value: ProductionId) -> Self {
        value.as_usize()
    }
}

impl std::fmt::Display for ProductionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // production 0 is the goal production, so `r1` is the first declared
        // rule.
        write!(f, "r{}", self.0)
    }
}

/// A production of the grammar. An empty right-hand side derives epsilon.
#[derive(Debug, Hash, Clone, PartialEq, Eq)]
pub struct ProductionRef {
    pub lhs: NonTerminalRef,
    pub rhs: Vec<SymbolRef>,
}

impl ProductionRef {
    pub(crate) fn new(lhs: NonTerminalRef, rhs: Vec<SymbolRef>) -> Option<Self> {
        let production = Self::new_unchecked(lhs, rhs);

        if production.is_valid() {
            Some(production)
        } else {
            None
        }
    }

    fn new_unchecked(lhs: NonTerminalRef, rhs: Vec<SymbolRef>) -> Self {
        Self { lhs, rhs }
    }

    fn is_valid(&self) -> bool {
        // `<a> ::= <a>` can never derive anything.
        let is_self_derivation = self.rhs == [SymbolRef::NonTerminal(self.lhs)];

        !is_self_derivation
    }

    pub fn rhs_len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl std::fmt::Display for ProductionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rhs = if self.rhs.is_empty() {
            BuiltinTerminals::Epsilon.as_terminal().to_string()
        } else {
            self.rhs
                .iter()
                .map(|sym| sym.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };

        write!(f, "{} ::= {}", self.lhs, rhs)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GrammarTable {
    non_terminals: HashMap<String, usize>,
    terminals: HashMap<String, usize>,
    non_terminal_names: Vec<String>,
    terminal_names: Vec<String>,
    productions: Vec<ProductionRef>,
}

impl GrammarTable {
    pub(crate) const GOAL_PRODUCTION_IDX: usize = 0;

    /// Adds a non-terminal to the table, returning its index. If the
    /// non-terminal already exists, the index to the previously added
    /// non-terminal is returned.
    fn add_non_terminal_mut<S: AsRef<str>>(&mut self, non_terminal: S) -> usize {
        let non_terminal = non_terminal.as_ref();

        if let Some(&id) = self.non_terminals.get(non_terminal) {
            return id;
        }

        let new_id = self.non_terminal_names.len();
        self.non_terminals.insert(non_terminal.to_string(), new_id);
        self.non_terminal_names.push(non_terminal.to_string());

        new_id
    }

    /// Adds a terminal to the table, returning its index. If the terminal
    /// already exists, the index to the previously added terminal is
    /// returned.
    fn add_terminal_mut<S: AsRef<str>>(&mut self, terminal: S) -> usize {
        let terminal = terminal.as_ref();

        if let Some(&id) = self.terminals.get(terminal) {
            return id;
        }

        let new_id = self.terminal_names.len();
        self.terminals.insert(terminal.to_string(), new_id);
        self.terminal_names.push(terminal.to_string());

        new_id
    }

    fn add_production_mut(&mut self, production: ProductionRef) {
        self.productions.push(production);
    }

    /// Returns an ordered iterator over all non-terminals in the grammar.
    pub fn non_terminals(&self) -> impl Iterator<Item = NonTerminal<'_>> + '_ {
        self.non_terminal_names
            .iter()
            .map(|name| NonTerminal(name.as_str()))
    }

    /// Returns an ordered iterator over all terminals in the grammar.
    pub fn terminals(&self) -> impl Iterator<Item = Terminal<'_>> + '_ {
        self.terminal_names.iter().map(|name| Terminal(name.as_str()))
    }

    pub fn non_terminal_refs(&self) -> impl Iterator<Item = NonTerminalRef> {
        (0..self.non_terminal_names.len()).map(NonTerminalRef)
    }

    pub fn terminal_refs(&self) -> impl Iterator<Item = TerminalRef> {
        (0..self.terminal_names.len()).map(TerminalRef)
    }

    pub fn non_terminal_count(&self) -> usize {
        self.non_terminal_names.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.terminal_names.len()
    }

    pub fn non_terminal_mapping(&self, non_terminal: &NonTerminal) -> Option<NonTerminalRef> {
        self.non_terminals
            .get(non_terminal.0)
            .map(|id| NonTerminalRef(*id))
    }

    pub fn terminal_mapping(&self, terminal: &Terminal) -> Option<TerminalRef> {
        self.terminals.get(terminal.0).map(|id| TerminalRef(*id))
    }

    pub fn non_terminal(&self, non_terminal_ref: NonTerminalRef) -> Option<NonTerminal<'_>> {
        self.non_terminal_names
            .get(non_terminal_ref.as_usize())
            .map(|name| NonTerminal(name.as_str()))
    }

    pub fn terminal(&self, terminal_ref: TerminalRef) -> Option<Terminal<'_>> {
        self.terminal_names
            .get(terminal_ref.as_usize())
            .map(|name| Terminal(name.as_str()))
    }

    pub fn symbol(&self, symbol_ref: SymbolRef) -> Option<Symbol<'_>> {
        match symbol_ref {
            SymbolRef::NonTerminal(nt) => self.non_terminal(nt).map(Symbol::NonTerminal),
            SymbolRef::Terminal(t) => self.terminal(t).map(Symbol::Terminal),
        }
    }

    /// Returns the display name of a symbol, or a placeholder for a
    /// reference that belongs to a different grammar.
    pub fn symbol_name(&self, symbol_ref: SymbolRef) -> &str {
        match symbol_ref {
            SymbolRef::NonTerminal(nt) => self
                .non_terminal_names
                .get(nt.as_usize())
                .map(String::as_str),
            SymbolRef::Terminal(t) => self.terminal_names.get(t.as_usize()).map(String::as_str),
        }
        .unwrap_or("<?>")
    }

    /// Similarly to terminal_mapping, this looks up a TerminalRef, however
    /// builtins are registered on initialization which removes the need to
    /// return an Option.
    pub fn builtin_terminal_mapping(&self, terminal: &BuiltinTerminals) -> TerminalRef {
        match terminal {
            BuiltinTerminals::Epsilon => TerminalRef(0),
            BuiltinTerminals::Eof => TerminalRef(1),
        }
    }

    pub fn eof_terminal_ref(&self) -> TerminalRef {
        self.builtin_terminal_mapping(&BuiltinTerminals::Eof)
    }

    pub fn epsilon_terminal_ref(&self) -> TerminalRef {
        self.builtin_terminal_mapping(&BuiltinTerminals::Epsilon)
    }

    pub fn goal_non_terminal_ref(&self) -> NonTerminalRef {
        NonTerminalRef(Self::GOAL_PRODUCTION_IDX)
    }

    /// The user-facing start symbol, the only right-hand symbol of the goal
    /// production.
    pub fn start_non_terminal_ref(&self) -> Option<NonTerminalRef> {
        self.productions
            .get(Self::GOAL_PRODUCTION_IDX)
            .and_then(|goal| goal.rhs.first())
            .and_then(SymbolRef::as_non_terminal)
    }

    pub fn productions(&self) -> impl Iterator<Item = &ProductionRef> {
        self.productions.iter()
    }

    pub fn production(&self, production_id: ProductionId) -> Option<&ProductionRef> {
        self.productions.get(production_id.as_usize())
    }

    pub fn production_count(&self) -> usize {
        self.productions.len()
    }

    /// Returns all productions, paired with their id, whose left-hand side
    /// is the given non-terminal.
    pub fn productions_for(
        &self,
        lhs: NonTerminalRef,
    ) -> impl Iterator<Item = (ProductionId, &ProductionRef)> {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, production)| production.lhs == lhs)
            .map(|(id, production)| (ProductionId(id), production))
    }

    /// Renders a production with symbol names, i.e. `<a> ::= ( <b> )`.
    pub fn human_readable_production(&self, production: &ProductionRef) -> String {
        let lhs = self.symbol_name(SymbolRef::NonTerminal(production.lhs));
        let rhs = if production.is_epsilon() {
            BuiltinTerminals::Epsilon.as_terminal().to_string()
        } else {
            production
                .rhs
                .iter()
                .map(|sym| self.symbol_name(*sym))
                .collect::<Vec<_>>()
                .join(" ")
        };

        format!("{} ::= {}", lhs, rhs)
    }
}

impl std::fmt::Display for GrammarTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header = "Grammar Table
-------------";

        let non_terminals = self
            .non_terminals()
            .enumerate()
            .map(|(id, non_terminal)| format!("{}. '{}'\n", id + 1, non_terminal))
            .collect::<String>();
        let terminals = self
            .terminals()
            .enumerate()
            .map(|(id, terminal)| format!("{}. '{}'\n", id + 1, terminal))
            .collect::<String>();

        let productions = self
            .productions
            .iter()
            .enumerate()
            .map(|(idx, production)| {
                format!("{}. {}\n", idx, self.human_readable_production(production))
            })
            .collect::<String>();

        write!(
            f,
            "{}\nNON-TERMINALS\n{}\nTERMINALS\n{}\nPRODUCTIONS\n{}",
            header, non_terminals, terminals, productions
        )
    }
}

/// Provides methods for initializing a [GrammarTable] with expected terms.
pub trait GrammarInitializer {
    fn initialize_table() -> GrammarTable;
}

/// Defines a [GrammarTable] builder that includes the Goal non-terminal, an
/// empty Goal production and the builtin terminals.
pub struct DefaultInitializedWithGoalProductionGrammarTableBuilder;

impl DefaultInitializedWithGoalProductionGrammarTableBuilder {
    const DEFAULT_NON_TERMINALS: [BuiltinNonTerminals; 1] = [BuiltinNonTerminals::Goal];
    // order matters, builtin_terminal_mapping depends on it.
    const DEFAULT_TERMINALS: [BuiltinTerminals; 2] =
        [BuiltinTerminals::Epsilon, BuiltinTerminals::Eof];
}

impl GrammarInitializer for DefaultInitializedWithGoalProductionGrammarTableBuilder {
    fn initialize_table() -> GrammarTable {
        let mut grammar_table = GrammarTable::default();

        for builtin_non_terminal in Self::DEFAULT_NON_TERMINALS {
            grammar_table.add_non_terminal_mut(builtin_non_terminal.as_non_terminal());
        }

        for builtin_terminal in Self::DEFAULT_TERMINALS {
            grammar_table.add_terminal_mut(builtin_terminal.as_terminal());
        }

        // the goal production is completed once the start symbol is known.
        let goal_ref = NonTerminalRef::new(GrammarTable::GOAL_PRODUCTION_IDX);
        let goal_production = ProductionRef::new_unchecked(goal_ref, vec![]);
        grammar_table.add_production_mut(goal_production);

        grammar_table
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum GrammarLoadErrorKind {
    NoTerminalProduction,
    InvalidRule,
    ConflictingRule,
    UndefinedNonTerminal,
}

impl std::fmt::Display for GrammarLoadErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTerminalProduction => {
                write!(f, "grammar does not include a terminal production")
            }
            Self::InvalidRule => write!(f, "provided rule is invalid",),
            Self::ConflictingRule => write!(f, "provided rule conflicts with existing rule",),
            Self::UndefinedNonTerminal => {
                write!(f, "non-terminal is referenced but never defined")
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct GrammarLoadError {
    kind: GrammarLoadErrorKind,
    data: Option<String>,
}

impl GrammarLoadError {
    pub fn new(kind: GrammarLoadErrorKind) -> Self {
        Self { kind, data: None }
    }

    pub fn with_data_mut(&mut self, data: String) {
        self.data = Some(data)
    }

    pub fn with_data(mut self, data: String) -> Self {
        self.with_data_mut(data);
        self
    }

    pub fn kind(&self) -> &GrammarLoadErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for GrammarLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            Some(ctx) => write!(f, "{}: {}", &self.kind, ctx),
            None => write!(f, "{}", &self.kind),
        }
    }
}

pub fn define_production_mut<S: AsRef<str>>(
    grammar_table: &mut GrammarTable,
    line: S,
) -> Result<(), GrammarLoadError> {
    let trimmed_line = line.as_ref().trim();

    // validate the start of the line is a non-terminal
    if !trimmed_line.starts_with('<') {
        return Err(GrammarLoadError::new(GrammarLoadErrorKind::InvalidRule)
            .with_data("doesn't start with non-terminal".to_string()));
    }

    // split the line at the assignment delimiter
    let split_line = trimmed_line.split("::=").collect::<Vec<_>>();
    let (lhs, rhs) = match split_line.as_slice() {
        [lhs, rhs] => (lhs.trim(), rhs.split_whitespace().collect::<Vec<_>>()),
        _ => {
            return Err(GrammarLoadError::new(GrammarLoadErrorKind::InvalidRule)
                .with_data("does not contain right-hand side".to_string()))
        }
    };

    let lhs_non_terminal = non_terminal_value_from_str(lhs)
        .filter(|lhs| !BuiltinNonTerminals::is_builtin(lhs))
        .ok_or_else(|| {
            GrammarLoadError::new(GrammarLoadErrorKind::InvalidRule)
                .with_data(format!("invalid left-hand side ({})", lhs))
        })?;

    if rhs.is_empty() {
        return Err(GrammarLoadError::new(GrammarLoadErrorKind::InvalidRule)
            .with_data(format!(
                "empty right-hand side, use {}",
                BuiltinTerminals::Epsilon.as_terminal()
            )));
    }

    let epsilon = BuiltinTerminals::Epsilon.as_terminal();
    let derives_epsilon = rhs.contains(&epsilon);
    if derives_epsilon && rhs.len() != 1 {
        return Err(GrammarLoadError::new(GrammarLoadErrorKind::InvalidRule)
            .with_data(format!("{} must be the only right-hand symbol", epsilon)));
    }

    let lhs_id = grammar_table.add_non_terminal_mut(lhs_non_terminal);
    let mut production = ProductionRef::new_unchecked(NonTerminalRef::new(lhs_id), vec![]);

    // an epsilon production keeps its right-hand side empty.
    let rhs_elems = rhs.into_iter().filter(|_| !derives_epsilon);
    for elem in rhs_elems {
        if let Some(non_terminal) = non_terminal_value_from_str(elem) {
            if BuiltinNonTerminals::is_builtin(non_terminal) {
                return Err(GrammarLoadError::new(GrammarLoadErrorKind::InvalidRule)
                    .with_data(format!("reserved non-terminal ({})", elem)));
            }

            let non_terminal_id = grammar_table.add_non_terminal_mut(non_terminal);
            production
                .rhs
                .push(SymbolRef::NonTerminal(NonTerminalRef::new(non_terminal_id)));
        } else if let Some(terminal) = terminal_value_from_str(elem) {
            let terminal_id = grammar_table.add_terminal_mut(terminal);
            production
                .rhs
                .push(SymbolRef::Terminal(TerminalRef::new(terminal_id)));
        } else {
            return Err(GrammarLoadError::new(GrammarLoadErrorKind::InvalidRule)
                .with_data(format!("invalid rhs value ({})", elem)));
        }
    }

    if grammar_table.productions.contains(&production) {
        Err(GrammarLoadError::new(GrammarLoadErrorKind::ConflictingRule)
            .with_data(grammar_table.human_readable_production(&production)))
    } else {
        let human_readable = grammar_table.human_readable_production(&production);
        let production = ProductionRef::new(production.lhs, production.rhs).ok_or_else(|| {
            GrammarLoadError::new(GrammarLoadErrorKind::InvalidRule).with_data(human_readable)
        })?;

        grammar_table.add_production_mut(production);
        Ok(())
    }
}

pub fn load_grammar<S: AsRef<str>>(input: S) -> Result<GrammarTable, GrammarLoadError> {
    let mut grammar_table =
        DefaultInitializedWithGoalProductionGrammarTableBuilder::initialize_table();

    // breakup input into enumerated lines.
    let lines = input
        .as_ref()
        .lines()
        .enumerate()
        .map(|(lineno, line)| (lineno + 1, line));

    let lines_containing_rules = lines
        // ignore commented lines.
        .filter(|(_, line)| !line.trim_start().starts_with(';'))
        // ignore empty lines.
        .filter(|(_, line)| !line.chars().all(|c| c.is_whitespace()));

    for (lineno, line) in lines_containing_rules {
        define_production_mut(&mut grammar_table, line).map_err(|e| match e.data {
            Some(data) => {
                let line_annotated_data = format!("lineno {}: {}", lineno, data);
                GrammarLoadError::new(e.kind).with_data(line_annotated_data)
            }
            None => e,
        })?;
    }

    // add the first production's lhs to the goal.
    let start_non_terminal = grammar_table
        .productions()
        .nth(1)
        .map(|production| production.lhs)
        .map(SymbolRef::NonTerminal)
        .ok_or_else(|| GrammarLoadError::new(GrammarLoadErrorKind::NoTerminalProduction))?;

    grammar_table.productions[GrammarTable::GOAL_PRODUCTION_IDX]
        .rhs
        .push(start_non_terminal);

    // every referenced non-terminal needs at least one production.
    let undefined = grammar_table.non_terminal_refs().find(|&non_terminal_ref| {
        !grammar_table
            .productions()
            .any(|production| production.lhs == non_terminal_ref)
    });
    if let Some(undefined) = undefined {
        let name = grammar_table
            .symbol_name(SymbolRef::NonTerminal(undefined))
            .to_string();
        return Err(
            GrammarLoadError::new(GrammarLoadErrorKind::UndefinedNonTerminal).with_data(name),
        );
    }

    Ok(grammar_table)
}

fn non_terminal_value_from_str(value: &str) -> Option<&str> {
    let trimmed_value = value.trim();

    let is_wrapped = trimmed_value.starts_with('<') && trimmed_value.ends_with('>');
    let is_not_empty = trimmed_value.len() > 2;
    let is_builtin = BuiltinTerminals::is_builtin(trimmed_value);

    // guarantee that it's a non-terminal and that it's not just an empty
    // non-terminal `<>`
    if is_wrapped && is_not_empty && !is_builtin {
        Some(trimmed_value)
    } else {
        None
    }
}

fn terminal_value_from_str(value: &str) -> Option<&str> {
    let trimmed_value = value.trim();

    // builtins are never written out as terminals.
    if BuiltinTerminals::is_builtin(trimmed_value) {
        None
    } else {
        Some(trimmed_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_GRAMMAR: &str = "
; a comment
<parens> ::= ( <parens> )
<parens> ::= ( )
<parens> ::= <parens> ( )
<parens> ::= <parens> ( <parens> )
<parens> ::= ( ) <parens>
<parens> ::= ( <parens> ) <parens>
";

    #[test]
    fn should_parse_table_with_valid_test_grammar() {
        let grammar_table = load_grammar(TEST_GRAMMAR).unwrap();

        assert_eq!(2, grammar_table.non_terminals.len());
        // 2 builtins plus `(` and `)`
        assert_eq!(4, grammar_table.terminals.len());
        // 6 rules plus the goal.
        assert_eq!(7, grammar_table.productions.len());
    }

    #[test]
    fn should_error_on_conflicting_rule() {
        let res = load_grammar(
            "
<expr> ::= ( <expr> )
<expr> ::= ( )
<expr> ::= ( )
        ",
        );

        assert_eq!(
            Err(GrammarLoadErrorKind::ConflictingRule),
            res.map_err(|e| e.kind)
        );
    }

    #[test]
    fn should_error_on_undefined_non_terminal() {
        let res = load_grammar("<expr> ::= ( <term> )");

        let err = res.unwrap_err();
        assert_eq!(&GrammarLoadErrorKind::UndefinedNonTerminal, err.kind());
        assert!(err.to_string().contains("<term>"));
    }

    #[test]
    fn should_error_on_invalid_epsilon_placement() {
        let res = load_grammar("<expr> ::= ( <epsilon> )");

        assert_eq!(
            Err(GrammarLoadErrorKind::InvalidRule),
            res.map_err(|e| e.kind)
        );
    }

    #[test]
    fn should_error_on_self_derivation_and_annotate_line() {
        let res = load_grammar("<expr> ::= 0\n<expr> ::= <expr>");

        let err = res.unwrap_err();
        assert_eq!(&GrammarLoadErrorKind::InvalidRule, err.kind());
        assert!(err.to_string().contains("lineno 2"));
    }

    #[test]
    fn should_error_on_empty_grammar() {
        assert_eq!(
            Err(GrammarLoadErrorKind::NoTerminalProduction),
            load_grammar("; nothing but a comment").map_err(|e| e.kind)
        );
    }

    #[test]
    fn should_store_epsilon_production_as_empty_rhs() {
        let grammar_table = load_grammar(
            "
<list> ::= x <list>
<list> ::= <epsilon>
",
        )
        .unwrap();

        let epsilon_production = grammar_table
            .production(ProductionId::unchecked_new(2))
            .unwrap();
        assert!(epsilon_production.is_epsilon());
        assert_eq!(
            "<list> ::= <epsilon>",
            grammar_table.human_readable_production(epsilon_production)
        );
    }

    #[test]
    fn should_augment_goal_with_first_production() {
        let grammar_table = load_grammar(
            "
<expr> ::= ( <expr> )
<expr> ::= <addition>
<addition> ::= <expr> + <expr>
        ",
        )
        .unwrap();

        let goal = grammar_table.productions().next().unwrap();
        assert_eq!(
            "<*> ::= <expr>",
            grammar_table.human_readable_production(goal)
        );
        assert_eq!(
            Some(NonTerminal::new("<expr>")),
            grammar_table
                .start_non_terminal_ref()
                .and_then(|nt| grammar_table.non_terminal(nt))
        );
    }

    #[test]
    fn should_iterate_non_terminals_in_order() {
        let grammar = "
<expr> ::= ( <expr> )
<expr> ::= <addition>
<addition> ::= <expr> + <expr>
        ";
        let grammar_table = load_grammar(grammar).unwrap();

        let mut non_terminal_iter = grammar_table.non_terminals();

        assert_eq!(
            Some(NonTerminal::from(BuiltinNonTerminals::Goal)),
            non_terminal_iter.next()
        );
        assert_eq!(Some(NonTerminal("<expr>")), non_terminal_iter.next());
        assert_eq!(Some(NonTerminal("<addition>")), non_terminal_iter.next());
        assert_eq!(None, non_terminal_iter.next());
    }

    #[test]
    fn should_iterate_terminals_in_order() {
        let grammar = "
<expr> ::= ( <expr> )
<expr> ::= <addition>
<addition> ::= <expr> + <expr>
<cmp> ::= <expr> <= <expr>
        ";
        let grammar_table = load_grammar(grammar).unwrap();

        let mut terminal_iter = grammar_table
            .terminals()
            // strip out the builtins for the sake of testing.
            .filter(|terminal| !BuiltinTerminals::is_builtin(terminal));

        assert_eq!(Some(Terminal("(")), terminal_iter.next());
        assert_eq!(Some(Terminal(")")), terminal_iter.next());
        assert_eq!(Some(Terminal("+")), terminal_iter.next());
        // angle-bracketed operators are terminals, not non-terminals.
        assert_eq!(Some(Terminal("<=")), terminal_iter.next());
        assert_eq!(None, terminal_iter.next());
    }
}
