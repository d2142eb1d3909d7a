//! Answers to modified-date conflicts: interactive or preset.
use std::io::{self, BufRead, Write};

use crate::actions::{ModifiedDateConflict, ModifiedDateDecision, NewerSide};

/// Decides what to do when a file sync finds differing modification times.
#[cfg_attr(test, mockall::automock)]
pub trait DecisionProvider {
    /// Choose how to handle `conflict`.
    fn decide(&self, conflict: &ModifiedDateConflict) -> ModifiedDateDecision;
}

/// Menu shown to the user, in display order.
const CHOICES: [(&str, ModifiedDateDecision); 4] = [
    ("Stop execution", ModifiedDateDecision::StopExecution),
    ("Skip this action", ModifiedDateDecision::SkipThisAction),
    ("Overwrite this time", ModifiedDateDecision::ProceedOnce),
    (
        "Overwrite and ignore conflicts for the rest of this run",
        ModifiedDateDecision::IgnoreInFuture,
    ),
];

/// Asks on the terminal.
///
/// Reading failures and end of input are treated as "stop".
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompt;

impl DecisionProvider for ConsolePrompt {
    fn decide(&self, conflict: &ModifiedDateConflict) -> ModifiedDateDecision {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        prompt_decision(conflict, &mut input, &mut output).unwrap_or_else(|e| {
            tracing::warn!("could not read conflict decision ({e}); stopping");
            ModifiedDateDecision::StopExecution
        })
    }
}

/// Returns the same decision for every conflict (`--on-conflict`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDecision(ModifiedDateDecision);

impl FixedDecision {
    /// Always answer with `decision`.
    #[must_use]
    pub const fn new(decision: ModifiedDateDecision) -> Self {
        Self(decision)
    }
}

impl DecisionProvider for FixedDecision {
    fn decide(&self, conflict: &ModifiedDateConflict) -> ModifiedDateDecision {
        tracing::debug!(
            "conflict on {} answered with preset {:?}",
            conflict.destination.display(),
            self.0
        );
        self.0
    }
}

/// Describe `conflict`, show the menu, and read a choice from `input`.
///
/// Invalid answers re-display the prompt.
///
/// # Errors
///
/// Returns an error if writing the prompt or reading the answer fails, or
/// [`io::ErrorKind::UnexpectedEof`] when input ends before a valid answer.
pub fn prompt_decision<R: BufRead, W: Write>(
    conflict: &ModifiedDateConflict,
    input: &mut R,
    output: &mut W,
) -> io::Result<ModifiedDateDecision> {
    let newer = match conflict.newer {
        NewerSide::Source => "the source is newer",
        NewerSide::Destination => "the destination was modified after the last sync",
    };
    writeln!(
        output,
        "\nModified-date conflict for {} ({newer})",
        conflict.destination.display()
    )?;
    writeln!(
        output,
        "  source      {}  {}",
        conflict.source_modified.format("%Y-%m-%d %H:%M:%S UTC"),
        conflict.source
    )?;
    writeln!(
        output,
        "  destination {}",
        conflict.destination_modified.format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    loop {
        for (i, (label, _)) in CHOICES.iter().enumerate() {
            writeln!(output, "  \x1b[1m{}\x1b[0m) {label}", i + 1)?;
        }
        write!(output, "\nSelect [1-{}]: ", CHOICES.len())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no selection made",
            ));
        }

        let picked = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| CHOICES.get(i));
        match picked {
            Some((_, decision)) => return Ok(*decision),
            None => writeln!(output, "Invalid selection '{}'", line.trim())?,
        }
    }
}
