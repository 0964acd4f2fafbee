//! Interactive session over a single loaded document.

use std::io::Write;
use std::sync::Arc;

use color_eyre::eyre::Result;
use docqa_core::QaOrchestrator;
use docqa_shared::{Document, Question};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::commands::write_evaluation;
use crate::progress::with_spinner;

const HELP: &str = "\
Commands:
  ask <question>      answer a question about the document
  challenge           generate comprehension questions
  answer <n> <text>   grade your answer to question n (1-based)
  help                show this help
  quit                end the session";

/// A parsed session input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionCommand {
    Ask(String),
    Challenge,
    Answer { number: usize, text: String },
    Help,
    Quit,
}

impl SessionCommand {
    /// Parse one input line. `Err` carries a message for the user.
    pub(crate) fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "ask" if rest.is_empty() => Err("usage: ask <question>".into()),
            "ask" => Ok(Self::Ask(rest.to_string())),
            "challenge" => Ok(Self::Challenge),
            "answer" => {
                let (number, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or("usage: answer <n> <text>")?;
                let number = number
                    .parse::<usize>()
                    .map_err(|_| format!("'{number}' is not a question number"))?;
                Ok(Self::Answer {
                    number,
                    text: text.trim().to_string(),
                })
            }
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            "" => Err(String::new()),
            other => Err(format!("unknown command '{other}'; type 'help'")),
        }
    }
}

/// Whether the session should keep reading input.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

pub(crate) struct Session {
    orchestrator: QaOrchestrator,
    document: Arc<Document>,
    question_count: usize,
    questions: Vec<Question>,
}

impl Session {
    pub(crate) fn new(
        orchestrator: QaOrchestrator,
        document: Arc<Document>,
        question_count: usize,
    ) -> Self {
        Self {
            orchestrator,
            document,
            question_count,
            questions: Vec::new(),
        }
    }

    /// Read commands from stdin until `quit` or end of input.
    pub(crate) async fn run_stdin(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut out = std::io::stdout();
        writeln!(out, "{HELP}")?;

        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            match SessionCommand::parse(&line) {
                Ok(command) => {
                    // Generator failures end the command, not the session.
                    match self.execute(command, &mut out).await {
                        Ok(Flow::Stop) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => writeln!(out, "error: {e}")?,
                    }
                }
                Err(message) if message.is_empty() => {}
                Err(message) => writeln!(out, "{message}")?,
            }
        }
        Ok(())
    }

    pub(crate) async fn execute(
        &mut self,
        command: SessionCommand,
        out: &mut impl Write,
    ) -> Result<Flow> {
        debug!(?command, doc = %self.document.id(), "session command");
        let text = self.document.text();

        match command {
            SessionCommand::Ask(question) => {
                let answer =
                    with_spinner("Answering", self.orchestrator.answer(text, &question)).await?;
                writeln!(out, "Answer: {}", answer.answer)?;
                writeln!(out, "Support: {}", answer.support)?;
            }
            SessionCommand::Challenge => {
                let questions = with_spinner(
                    "Generating questions",
                    self.orchestrator.generate_questions(text, self.question_count),
                )
                .await?;
                self.questions = Question::numbered(questions);
                if self.questions.is_empty() {
                    writeln!(out, "No questions could be generated from this document.")?;
                }
                for question in &self.questions {
                    writeln!(out, "{}", question.text)?;
                }
            }
            SessionCommand::Answer { number, text: answer } => {
                let Some(question) = number
                    .checked_sub(1)
                    .and_then(|idx| self.questions.get(idx))
                else {
                    writeln!(
                        out,
                        "No question {number}. Run 'challenge' first ({} available).",
                        self.questions.len()
                    )?;
                    return Ok(Flow::Continue);
                };
                let evaluated = with_spinner(
                    &format!("Evaluating your answer to {}", question.label()),
                    self.orchestrator.evaluate_question(text, &question.text, &answer),
                )
                .await?;
                write_evaluation(out, &evaluated)?;
            }
            SessionCommand::Help => writeln!(out, "{HELP}")?,
            SessionCommand::Quit => return Ok(Flow::Stop),
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docqa_core::TextGenerator;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted(Mutex<VecDeque<String>>);

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _prompt: &str) -> docqa_shared::Result<String> {
            Ok(self.0.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    fn session(responses: &[&str]) -> Session {
        let generator = Scripted(Mutex::new(responses.iter().map(|s| s.to_string()).collect()));
        let orchestrator = QaOrchestrator::new(Arc::new(generator));
        let doc = Document::new(
            "cells.txt",
            "Mitochondria generate most of the chemical energy of the cell as ATP.",
        )
        .unwrap();
        Session::new(orchestrator, Arc::new(doc), 3)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            SessionCommand::parse("ask  What is ATP? "),
            Ok(SessionCommand::Ask("What is ATP?".into()))
        );
        assert_eq!(SessionCommand::parse("CHALLENGE"), Ok(SessionCommand::Challenge));
        assert_eq!(
            SessionCommand::parse("answer 2 the nucleus"),
            Ok(SessionCommand::Answer {
                number: 2,
                text: "the nucleus".into()
            })
        );
        assert_eq!(SessionCommand::parse("exit"), Ok(SessionCommand::Quit));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(SessionCommand::parse("ask").is_err());
        assert!(SessionCommand::parse("answer two ATP").is_err());
        assert!(SessionCommand::parse("answer 1").is_err());
        assert!(SessionCommand::parse("dance").unwrap_err().contains("unknown command"));
        assert_eq!(SessionCommand::parse("   "), Err(String::new()));
    }

    #[tokio::test]
    async fn challenge_numbers_questions_from_one() {
        let mut session = session(&["Q1: What do mitochondria make?\nQ2: What is ATP?"]);
        let mut out = Vec::new();

        let flow = session.execute(SessionCommand::Challenge, &mut out).await.unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(session.questions.len(), 2);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Q1: What do mitochondria make?\nQ2: What is ATP?"), "{printed}");
    }

    #[tokio::test]
    async fn answer_before_challenge_is_reported() {
        let mut session = session(&[]);
        let mut out = Vec::new();

        session
            .execute(
                SessionCommand::Answer {
                    number: 1,
                    text: "ATP".into(),
                },
                &mut out,
            )
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("No question 1"), "{printed}");
    }

    #[tokio::test]
    async fn ask_prints_answer_and_support() {
        let mut session = session(&["Answer: ATP Support: \"as ATP\" Confidence: high"]);
        let mut out = Vec::new();

        session
            .execute(SessionCommand::Ask("What is made?".into()), &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Answer: ATP\n"), "{printed}");
        assert!(printed.contains("Support: \"as ATP\""), "{printed}");
    }

    #[tokio::test]
    async fn answer_grades_listed_question() {
        let mut session = session(&[
            "Q1: What do mitochondria make?",
            "Score: 4\nEvaluation: Mostly right.\nIdeal Answer: ATP",
        ]);
        session.execute(SessionCommand::Challenge, &mut Vec::new()).await.unwrap();
        let mut out = Vec::new();

        session
            .execute(
                SessionCommand::Answer {
                    number: 1,
                    text: "energy".into(),
                },
                &mut out,
            )
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Question: Q1: What do mitochondria make?"), "{printed}");
        assert!(printed.contains("Score: 4/5"), "{printed}");
        assert!(printed.contains("Ideal answer: ATP"), "{printed}");
    }

    #[tokio::test]
    async fn quit_stops() {
        let mut session = session(&[]);
        let flow = session
            .execute(SessionCommand::Quit, &mut Vec::new())
            .await
            .unwrap();
        assert_eq!(flow, Flow::Stop);
    }
}
