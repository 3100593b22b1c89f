//! Typed confirmation for destructive commands.

use std::fmt;
use std::io::{self, BufRead, BufReader, Cursor, Write};

use crate::error::CommandError;
use crate::log::SharedBuffer;

/// Line-oriented terminal prompt.
pub struct Prompt {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

impl fmt::Debug for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prompt").finish_non_exhaustive()
    }
}

impl Prompt {
    /// Prompt reading `input` and writing to `output`.
    pub fn new(input: impl BufRead + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    /// Prompt on the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }

    /// Prompt answering with `input`; returns the buffer receiving what was
    /// printed.
    pub fn scripted(input: &str) -> (Self, SharedBuffer) {
        let printed = SharedBuffer::default();
        let prompt = Self::new(Cursor::new(input.to_string().into_bytes()), printed.clone());
        (prompt, printed)
    }

    /// Ask the user to type `want`. Anything else, including end of input,
    /// aborts.
    pub fn confirm(&mut self, want: &str) -> Result<(), CommandError> {
        write!(
            self.output,
            "To proceed, type \"{want}\" or re-run this command with --force\n▸ "
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(CommandError::Aborted);
        }
        let got = line.strip_suffix('\n').unwrap_or(&line);
        let got = got.strip_suffix('\r').unwrap_or(got);
        if got == want {
            Ok(())
        } else {
            Err(CommandError::Aborted)
        }
    }
}
