//! Interactive query session
//!
//! The session is a plain blocking loop: show the last answer, read a line,
//! ask the coordinator, repeat. It runs on its own thread and holds no lock
//! while it waits for input.

use crate::crawler::{CoordinatorHandle, QueryReply};
use crate::index::{QueryResult, QueryTerms};
use std::io::{self, BufRead, Write};
use tokio::task::JoinHandle;

/// Request/response loop over arbitrary input and output streams
pub struct QuerySession<R, W> {
    input: R,
    output: W,
    prompt: String,
}

impl<R: BufRead, W: Write> QuerySession<R, W> {
    pub fn new(input: R, output: W, prompt: impl Into<String>) -> Self {
        Self {
            input,
            output,
            prompt: prompt.into(),
        }
    }

    /// Runs the loop against a live coordinator
    ///
    /// Must be called from a thread outside the async runtime.
    pub fn run(&mut self, coordinator: &CoordinatorHandle) -> crate::Result<usize> {
        self.run_with(|terms| coordinator.query_blocking(terms))
    }

    /// Runs the loop, answering each query with `ask`
    ///
    /// The loop is primed with an empty result, so the first thing the user
    /// sees is the prompt. Returns the number of answered queries once `ask`
    /// reports termination.
    pub fn run_with<F>(&mut self, mut ask: F) -> crate::Result<usize>
    where
        F: FnMut(QueryTerms) -> crate::Result<QueryReply>,
    {
        let mut answered = 0;
        let mut result = QueryResult::empty();

        loop {
            self.show(&result)?;

            let terms = self.read_terms()?;
            match ask(terms)? {
                QueryReply::Answer(next) => {
                    answered += 1;
                    result = next;
                }
                QueryReply::Terminated => {
                    tracing::debug!("Session ended after {} queries", answered);
                    return Ok(answered);
                }
            }
        }
    }

    fn show(&mut self, result: &QueryResult) -> io::Result<()> {
        if result.has_pages() {
            writeln!(self.output, "{}", result)?;
        }
        Ok(())
    }

    /// Prompts for and tokenizes one line; end of input reads as a blank line
    fn read_terms(&mut self) -> io::Result<QueryTerms> {
        write!(self.output, "{}", self.prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
        }

        Ok(QueryTerms::from_input(&line))
    }
}

/// Runs a session on stdin/stdout in a blocking thread
pub fn spawn_console_session(
    coordinator: CoordinatorHandle,
    prompt: String,
) -> JoinHandle<crate::Result<usize>> {
    tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let stdout = io::stdout();
        QuerySession::new(stdin.lock(), stdout.lock(), prompt).run(&coordinator)
    })
}
