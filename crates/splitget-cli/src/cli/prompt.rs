//! Interactive questions for values missing from the command line.

use anyhow::{bail, Context, Result};
use splitget_core::MAX_SEGMENTS;
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one trimmed line.
    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        let n = self.input.read_line(&mut line).context("read answer")?;
        if n == 0 {
            bail!("no answer given (end of input)");
        }
        Ok(line.trim().to_string())
    }

    /// Number of threads; an empty answer takes `default`.
    pub fn threads(&mut self, default: usize) -> Result<usize> {
        let answer = self.ask(&format!("Number of threads to use [{}]: ", default))?;
        if answer.is_empty() {
            return Ok(default);
        }
        let n: usize = answer
            .parse()
            .with_context(|| format!("'{}' is not a number", answer))?;
        if n == 0 || n > MAX_SEGMENTS {
            bail!("thread count {} out of range: must be between 1 and {}", n, MAX_SEGMENTS);
        }
        Ok(n)
    }

    pub fn url(&mut self) -> Result<String> {
        let answer = self.ask("Copy the file URL: ")?;
        if answer.is_empty() {
            bail!("a URL is required");
        }
        Ok(answer)
    }

    /// Destination path; empty means "derive it from the server".
    pub fn path(&mut self) -> Result<Option<PathBuf>> {
        let answer = self.ask("Choose the path and file name (empty = automatic): ")?;
        Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
    }
}
