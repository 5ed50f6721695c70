/// Runtime knobs shared by both parsing engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// The statement terminator that missing-terminator recovery inserts.
    pub terminator: String,
    /// The terminal that identifiers classify into.
    pub identifier_class: String,
    /// The terminal that numeric literals classify into.
    pub number_class: String,
    /// The number of times the LR engine may insert a synthetic terminator
    /// and restart a single parse.
    pub max_recovery_restarts: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            terminator: ";".to_string(),
            identifier_class: "ID".to_string(),
            number_class: "NUM".to_string(),
            max_recovery_restarts: 1,
        }
    }
}

impl ParserConfig {
    pub fn with_terminator<S: AsRef<str>>(mut self, terminator: S) -> Self {
        self.terminator = terminator.as_ref().to_string();
        self
    }

    pub fn with_identifier_class<S: AsRef<str>>(mut self, class: S) -> Self {
        self.identifier_class = class.as_ref().to_string();
        self
    }

    pub fn with_number_class<S: AsRef<str>>(mut self, class: S) -> Self {
        self.number_class = class.as_ref().to_string();
        self
    }

    pub fn with_max_recovery_restarts(mut self, restarts: usize) -> Self {
        self.max_recovery_restarts = restarts;
        self
    }
}
