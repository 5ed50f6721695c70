/// Markers for the type of error encountered in table generation.
#[derive(Debug, PartialEq, Eq)]
pub enum TableGenErrorKind {
    /// A terminal that did not match the grammar has been encountered.
    UnknownTerminal,
    /// Two different actions were assigned to the same ACTION cell.
    ActionConflict,
    /// Two different productions were predicted for the same LL(1) cell.
    PredictionConflict,
    /// An item expects a transition that the canonical collection never
    /// recorded.
    MissingGoto,
}

impl std::fmt::Display for TableGenErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTerminal => write!(f, "terminal is undefined"),
            Self::ActionConflict => write!(f, "grammar is not SLR(1), conflicting actions"),
            Self::PredictionConflict => {
                write!(f, "grammar is not LL(1), conflicting predictions")
            }
            Self::MissingGoto => write!(f, "no transition recorded for symbol"),
        }
    }
}

/// Represents errors that can occur in the table generation process.
#[derive(Debug, PartialEq, Eq)]
pub struct TableGenError {
    kind: TableGenErrorKind,
    data: Option<String>,
}

impl TableGenError {
    pub(crate) fn new(kind: TableGenErrorKind) -> Self {
        Self { kind, data: None }
    }

    pub(crate) fn with_data_mut<S: AsRef<str>>(&mut self, data: S) {
        let data = data.as_ref().to_string();

        self.data = Some(data)
    }

    pub(crate) fn with_data<S: AsRef<str>>(mut self, data: S) -> Self {
        self.with_data_mut(data);
        self
    }

    pub fn kind(&self) -> &TableGenErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for TableGenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            Some(ctx) => write!(f, "{}: {}", &self.kind, ctx),
            None => write!(f, "{}", &self.kind),
        }
    }
}
