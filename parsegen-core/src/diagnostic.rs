/// A statement terminator that the parser expected but did not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTerminator {
    /// Line of the last consumed token, or of the current token when
    /// nothing was consumed yet.
    pub line: usize,
    pub terminator: String,
}

impl std::fmt::Display for MissingTerminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "syntax error, line {}, missing \"{}\"",
            self.line, self.terminator
        )
    }
}

/// The outcome of a single parse. At most one missing terminator is reported
/// per parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub missing_terminator: Option<MissingTerminator>,
    pub syntax_error: bool,
}

impl Diagnostics {
    /// Returns `true` when the parse produced no diagnostic at all.
    pub fn is_clean(&self) -> bool {
        self.missing_terminator.is_none() && !self.syntax_error
    }

    /// Records a missing terminator unless one is already pending,
    /// returning `true` if it was recorded.
    pub(crate) fn record_missing_terminator<S: AsRef<str>>(
        &mut self,
        line: usize,
        terminator: S,
    ) -> bool {
        if self.missing_terminator.is_some() {
            return false;
        }

        self.missing_terminator = Some(MissingTerminator {
            line,
            terminator: terminator.as_ref().to_string(),
        });
        true
    }

    pub(crate) fn record_syntax_error(&mut self) {
        self.syntax_error = true;
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.missing_terminator, self.syntax_error) {
            (Some(missing), false) => write!(f, "{}", missing),
            (Some(missing), true) => write!(f, "{}\nsyntax error", missing),
            (None, true) => write!(f, "syntax error"),
            (None, false) => write!(f, "no errors"),
        }
    }
}
