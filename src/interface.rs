use crate::api::Completion;
use crate::logger::Logger;
use anyhow::{Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::collections::VecDeque;
use std::io::Write;

pub const PROMPT: &str = "Enter your prompt: ";
pub const EXIT_KEYWORD: &str = "exit";
const SEPARATOR_WIDTH: usize = 30;

/// Where the loop gets its lines from.
///
/// `Ok(None)` means the user is done (end of input or Ctrl-C).
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive terminal input backed by rustyline.
pub struct TerminalInput {
    editor: DefaultEditor,
}

impl TerminalInput {
    pub fn new() -> Result<Self> {
        let rl_config = Config::builder().auto_add_history(true).build();
        let editor = DefaultEditor::with_config(rl_config).context("Failed to create line editor")?;
        Ok(Self { editor })
    }
}

impl LineSource for TerminalInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Pre-recorded input lines. Runs dry like a closed stdin.
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Exit keyword check: lower-cased line against `exit`, whitespace kept as typed.
pub fn is_exit_command(line: &str) -> bool {
    line.to_lowercase() == EXIT_KEYWORD
}

fn separator() -> ColoredString {
    "-".repeat(SEPARATOR_WIDTH).dimmed()
}

/// One chat session: a client bound to the credential, plus terminal I/O.
///
/// Nothing from a finished turn is kept; every prompt is sent on its own.
pub struct ChatSession<C, I, W> {
    client: C,
    input: I,
    out: W,
    logger: Logger,
}

impl<C, I, W> ChatSession<C, I, W>
where
    C: Completion,
    I: LineSource,
    W: Write,
{
    pub fn new(client: C, input: I, out: W, logger: Logger) -> Self {
        Self {
            client,
            input,
            out,
            logger,
        }
    }

    pub fn print_banner(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "{}",
            format!(
                "Type your prompt and then press Enter. Type '{}' to quit.",
                EXIT_KEYWORD
            )
            .bright_cyan()
        )?;
        Ok(())
    }

    /// Prompt, send, print, repeat. Returns once the user leaves.
    ///
    /// Request failures are printed and the loop carries on; only I/O
    /// errors on the terminal itself end it with an `Err`.
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner()?;

        loop {
            self.out.flush()?;
            let line = match self.input.read_line(PROMPT) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    writeln!(self.out, "{} {}", "✗ Input error:".red(), e)?;
                    let _ = self.logger.log_error(&format!("Input error: {}", e));
                    continue;
                }
            };

            if is_exit_command(&line) {
                break;
            }

            self.turn(&line).await?;
        }

        writeln!(self.out, "{}", "Exiting application.".bright_cyan())?;
        let _ = self.logger.log("SESSION END");
        self.out.flush()?;
        Ok(())
    }

    async fn turn(&mut self, prompt: &str) -> Result<()> {
        let _ = self.logger.log_api_request(prompt);

        match self.client.complete(prompt).await {
            Ok(reply) => {
                let _ = self.logger.log_api_response(&reply);
                writeln!(self.out, "\n{}", "AI Response:".bright_green().bold())?;
                writeln!(self.out, "{}", reply)?;
                writeln!(self.out, "{}", separator())?;
            }
            Err(e) => {
                let _ = self.logger.log_error(&e.to_string());
                writeln!(self.out, "\n{} {}", "An error occurred:".red().bold(), e)?;
                writeln!(
                    self.out,
                    "{}",
                    "Please check your input or API key status.".yellow()
                )?;
                writeln!(self.out, "{}", separator())?;
            }
        }
        Ok(())
    }

    /// Hand back the output sink (used by tests to inspect what was printed).
    pub fn into_output(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use std::cell::RefCell;

    /// Records every prompt and answers from a queue of canned outcomes.
    struct StubChat {
        prompts: RefCell<Vec<String>>,
        replies: RefCell<VecDeque<Result<String, String>>>,
    }

    impl StubChat {
        fn new(replies: Vec<Result<&str, &str>>) -> Self {
            Self {
                prompts: RefCell::new(Vec::new()),
                replies: RefCell::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
            }
        }
    }

    impl Completion for &StubChat {
        async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            match self.replies.borrow_mut().pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(msg)) => Err(ChatError::Malformed(msg)),
                None => Err(ChatError::Malformed("stub ran out of replies".to_string())),
            }
        }
    }

    async fn run_session(stub: &StubChat, lines: Vec<&str>) -> String {
        let mut session = ChatSession::new(
            stub,
            ScriptedInput::new(lines),
            Vec::new(),
            Logger::disabled(),
        );
        session.run().await.unwrap();
        String::from_utf8(session.into_output()).unwrap()
    }

    #[test]
    fn test_is_exit_command_case_insensitive() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("Exit"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command("quit"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn test_is_exit_command_keeps_whitespace() {
        assert!(!is_exit_command(" exit"));
        assert!(!is_exit_command("exit "));
    }

    #[tokio::test]
    async fn test_exit_issues_no_request() {
        let stub = StubChat::new(vec![]);
        let output = run_session(&stub, vec!["ExIt"]).await;

        assert!(stub.prompts.borrow().is_empty());
        assert!(output.contains("Exiting application."));
    }

    #[tokio::test]
    async fn test_successful_turn_prints_reply() {
        let stub = StubChat::new(vec![Ok("Hello!")]);
        let output = run_session(&stub, vec!["hi", "exit"]).await;

        assert_eq!(*stub.prompts.borrow(), vec!["hi".to_string()]);
        assert!(output.contains("AI Response:"));
        assert!(output.contains("\nHello!\n"));
        // Loop came back for another line before exiting
        assert!(output.find("Hello!").unwrap() < output.find("Exiting application.").unwrap());
    }

    #[tokio::test]
    async fn test_failed_turn_is_reported_and_loop_continues() {
        let stub = StubChat::new(vec![Err("simulated network failure"), Ok("recovered")]);
        let output = run_session(&stub, vec!["first", "second", "exit"]).await;

        assert!(output.contains("An error occurred:"));
        assert!(output.contains("simulated network failure"));
        assert!(output.contains("Please check your input or API key status."));
        assert!(output.contains("recovered"));
        assert_eq!(stub.prompts.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_each_turn_sends_only_its_own_prompt() {
        let stub = StubChat::new(vec![Ok("one"), Ok("two")]);
        run_session(&stub, vec!["first question", "second question", "exit"]).await;

        let prompts = stub.prompts.borrow();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[1], "second question");
        assert!(!prompts[1].contains("first question"));
        assert!(!prompts[1].contains("one"));
    }

    #[tokio::test]
    async fn test_end_of_input_exits_cleanly() {
        let stub = StubChat::new(vec![Ok("pong")]);
        let output = run_session(&stub, vec!["ping"]).await;

        assert_eq!(stub.prompts.borrow().len(), 1);
        assert!(output.contains("pong"));
        assert!(output.contains("Exiting application."));
    }

    #[tokio::test]
    async fn test_empty_line_is_forwarded() {
        let stub = StubChat::new(vec![Ok("You sent nothing.")]);
        run_session(&stub, vec!["", "exit"]).await;

        assert_eq!(*stub.prompts.borrow(), vec![String::new()]);
    }

    #[tokio::test]
    async fn test_banner_printed_first() {
        let stub = StubChat::new(vec![]);
        let output = run_session(&stub, vec!["exit"]).await;
        assert!(output.contains("Type 'exit' to quit."));
    }
}
