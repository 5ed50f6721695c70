use std::collections::BTreeMap;

use log::debug;

use super::ordered_set::OrderedSet;
use super::StateId;
use crate::grammar::*;

/// An LR(0) item, a production with a marker for how much of its right-hand
/// side has been matched.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct ItemRef {
    pub(crate) production: ProductionId,
    pub(crate) dot_position: usize,
}

impl ItemRef {
    pub(crate) fn new(production: ProductionId, dot_position: usize) -> Self {
        Self {
            production,
            dot_position,
        }
    }

    fn production<'a>(&self, grammar_table: &'a GrammarTable) -> Option<&'a ProductionRef> {
        grammar_table.production(self.production)
    }

    pub(crate) fn is_completed(&self, grammar_table: &GrammarTable) -> bool {
        self.production(grammar_table)
            .map(|production| self.dot_position >= production.rhs_len())
            .unwrap_or(true)
    }

    /// Advances the dot position of a previous ItemRef, returning a new
    /// ItemRef if the position is not the last element in the Item.
    pub(crate) fn advance_dot_position(&self, grammar_table: &GrammarTable) -> Option<Self> {
        if self.is_completed(grammar_table) {
            None
        } else {
            Some(Self::new(self.production, self.dot_position + 1))
        }
    }

    /// Returns `Some(B)` in the production `[ A -> ?.B? ]`.
    pub(crate) fn symbol_after_dot(&self, grammar_table: &GrammarTable) -> Option<SymbolRef> {
        self.production(grammar_table)
            .and_then(|production| production.rhs.get(self.dot_position))
            .copied()
    }

    pub(crate) fn human_readable_format(&self, grammar_table: &GrammarTable) -> String {
        let production = match self.production(grammar_table) {
            Some(production) => production,
            None => return format!("{} -> ?", self.production),
        };

        let mut rhs = production
            .rhs
            .iter()
            .map(|sym| grammar_table.symbol_name(*sym))
            .collect::<Vec<_>>();
        rhs.insert(self.dot_position.min(rhs.len()), ".");

        format!(
            "{} -> {}",
            grammar_table.symbol_name(SymbolRef::NonTerminal(production.lhs)),
            rhs.join(" ")
        )
    }
}

/// ItemSet contains the items of one state, kept sorted so that two sets
/// holding the same items compare equal regardless of discovery order.
#[derive(Default, Hash, Debug, Clone, PartialEq, Eq)]
pub(crate) struct ItemSet {
    items: Vec<ItemRef>,
}

impl ItemSet {
    pub(crate) fn new(mut items: Vec<ItemRef>) -> Self {
        items.sort();
        items.dedup();

        Self { items }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn items(&self) -> &[ItemRef] {
        &self.items
    }

    /// Returns each symbol that appears after a dot, in item order and
    /// without repeats.
    pub(crate) fn symbols_after_dot(&self, grammar_table: &GrammarTable) -> Vec<SymbolRef> {
        self.items
            .iter()
            .filter_map(|item| item.symbol_after_dot(grammar_table))
            .collect::<OrderedSet<_>>()
            .to_vec()
    }

    pub(crate) fn human_readable_format(&self, grammar_table: &GrammarTable) -> String {
        self.items
            .iter()
            .map(|item| format!("{}\n", item.human_readable_format(grammar_table)))
            .collect::<String>()
    }
}

impl FromIterator<ItemRef> for ItemSet {
    fn from_iter<T: IntoIterator<Item = ItemRef>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

pub(crate) fn initial_item_set() -> ItemSet {
    let goal = ProductionId::unchecked_new(GrammarTable::GOAL_PRODUCTION_IDX);

    [ItemRef::new(goal, 0)].into_iter().collect()
}

/// Generates the closure of a `ItemSet` using the following algorithm.
///
/// ```ignore
/// Closure(I)
/// repeat
///     for (each item [ A -> ?.B? ] in I )
///         for (each production B -> ? in G’)
///             add [ B -> .? ] to set I;
/// until no more items are added to I;
/// return I;
/// ```
pub(crate) fn closure(grammar_table: &GrammarTable, i: ItemSet) -> ItemSet {
    // if the itemset is empty exit early
    if i.is_empty() {
        return i;
    }

    let mut set = i.items.into_iter().collect::<OrderedSet<_>>();

    // each member is visited once, new members are appended behind the
    // cursor.
    let mut cursor = 0;
    while let Some(item) = set.get(cursor).copied() {
        cursor += 1;

        if let Some(SymbolRef::NonTerminal(b)) = item.symbol_after_dot(grammar_table) {
            for (production_id, _) in grammar_table.productions_for(b) {
                set.insert(ItemRef::new(production_id, 0));
            }
        }
    }

    ItemSet::new(set.to_vec())
}

/// Generates the goto of an `ItemSet` using the following algorithm.
///
/// ```ignore
/// Goto(I, X)
/// Initialise J to be the empty set;
/// for ( each item A -> ?.X? ] in I )
///     Add item A -> ?X.? ] to set J;   /* move the dot one step */
/// return Closure(J);    /* apply closure to the set */
/// ```
pub(crate) fn goto(grammar_table: &GrammarTable, i: &ItemSet, x: SymbolRef) -> ItemSet {
    let j = i
        .items
        .iter()
        .filter(|item| item.symbol_after_dot(grammar_table) == Some(x))
        .filter_map(|item| item.advance_dot_position(grammar_table))
        .collect();

    closure(grammar_table, j)
}

/// Contains the canonical collection of `ItemSet` states ordered by their
/// state id, along with every transition recorded while it was built.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub(crate) struct ItemCollection {
    item_sets: OrderedSet<ItemSet>,
    transitions: Vec<BTreeMap<SymbolRef, StateId>>,
}

impl ItemCollection {
    pub(crate) fn states(&self) -> usize {
        self.item_sets.len()
    }

    /// inserts a value into the collection, returning its state id and
    /// `true` if the collection did not yet contain the value.
    pub(crate) fn insert(&mut self, new_set: ItemSet) -> (StateId, bool) {
        let (id, inserted) = self.item_sets.insert_full(new_set);
        if inserted {
            self.transitions.push(BTreeMap::new());
        }

        (StateId::unchecked_new(id), inserted)
    }

    /// Returns the set id of a given set if it exists within the collection.
    #[cfg(test)]
    pub(crate) fn id_from_set(&self, set: &ItemSet) -> Option<StateId> {
        self.item_sets.position(set).map(StateId::unchecked_new)
    }

    pub(crate) fn item_sets(&self) -> impl Iterator<Item = (StateId, &ItemSet)> {
        self.item_sets
            .as_ref()
            .iter()
            .enumerate()
            .map(|(id, set)| (StateId::unchecked_new(id), set))
    }

    fn record_transition(&mut self, from: StateId, symbol: SymbolRef, to: StateId) {
        if let Some(transitions) = self.transitions.get_mut(from.as_usize()) {
            transitions.insert(symbol, to);
        }
    }

    /// Returns the state reached from `from` on `symbol`.
    pub(crate) fn transition(&self, from: StateId, symbol: SymbolRef) -> Option<StateId> {
        self.transitions
            .get(from.as_usize())
            .and_then(|transitions| transitions.get(&symbol))
            .copied()
    }

    pub(crate) fn transitions_from(
        &self,
        from: StateId,
    ) -> impl Iterator<Item = (SymbolRef, StateId)> + '_ {
        self.transitions
            .get(from.as_usize())
            .into_iter()
            .flat_map(|transitions| transitions.iter().map(|(sym, to)| (*sym, *to)))
    }

    /// Prints a human readable representation of a given collection.
    pub(crate) fn human_readable_format(&self, grammar_table: &GrammarTable) -> String {
        self.item_sets()
            .map(|(id, i)| {
                format!(
                    "\nS{}:\n{}",
                    id.as_usize(),
                    &i.human_readable_format(grammar_table)
                )
            })
            .collect::<String>()
    }
}

/// Constructs a canonical collection from a GrammarTable using the following
/// algorithm.
///
/// ```ignore
/// s0 ← closure ( [S’→S] )
/// S ← { s0 }
/// worklist ← [ s0 ]
/// while worklist is not empty
///     sj ← pop front of worklist
///     ∀ x after a dot in sj
///         sk ← goto(sj ,x)
///         if sk ∉ S then
///             S ← S ∪ sk
///             push sk onto worklist
///         record sj → sk on x
/// ```
///
/// States are numbered in discovery order, so repeated runs over the same
/// grammar yield the same numbering.
pub(crate) fn build_canonical_collection(grammar_table: &GrammarTable) -> ItemCollection {
    let mut collection = ItemCollection::default();

    let s0 = closure(grammar_table, initial_item_set());
    collection.insert(s0);

    // states are appended in discovery order, so the unprocessed states are
    // always the tail of the collection.
    let mut next_unprocessed = 0;
    while let Some(parent_state) = collection.item_sets.get(next_unprocessed).cloned() {
        let sj = StateId::unchecked_new(next_unprocessed);
        next_unprocessed += 1;

        for symbol_after_dot in parent_state.symbols_after_dot(grammar_table) {
            let new_state = goto(grammar_table, &parent_state, symbol_after_dot);
            if new_state.is_empty() {
                continue;
            }

            let (sk, _) = collection.insert(new_state);
            collection.record_transition(sj, symbol_after_dot, sk);
        }
    }

    debug!(
        "canonical collection built with {} states",
        collection.states()
    );

    collection
}
