//! Question-answering orchestrator.
//!
//! Composes chunking, context selection, prompt rendering, one generator call,
//! and response parsing into the four document operations. The orchestrator
//! holds no per-document state: every call takes the document text, so a
//! single instance can be shared across tasks behind an `Arc`.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use docqa_shared::{
    Answer, DocQaError, EvaluatedAnswer, EvaluationOutcome, QaConfig, Result,
};

use crate::chunker::{self, Chunk, DEFAULT_CHUNK_SIZE};
use crate::generator::TextGenerator;
use crate::parser::{self, MAX_QUESTIONS};
use crate::prompt;
use crate::relevance::{FirstChunk, RelevanceSelector};

/// Questions generated when the caller does not ask for a specific count.
pub const DEFAULT_QUESTION_COUNT: usize = MAX_QUESTIONS;

/// Entry point for summarize / answer / generate-questions / evaluate.
#[derive(Clone)]
pub struct QaOrchestrator {
    generator: Arc<dyn TextGenerator>,
    selector: Arc<dyn RelevanceSelector>,
    chunk_size: usize,
}

impl std::fmt::Debug for QaOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QaOrchestrator")
            .field("model", &self.generator.model())
            .field("selector", &self.selector.name())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl QaOrchestrator {
    /// Orchestrator with first-chunk selection and 2000-character windows.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            selector: Arc::new(FirstChunk),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Orchestrator using the `[qa]` config section.
    pub fn from_config(generator: Arc<dyn TextGenerator>, config: &QaConfig) -> Self {
        Self::new(generator).with_chunk_size(config.chunk_size)
    }

    /// Replace the context selection strategy.
    pub fn with_selector(mut self, selector: Arc<dyn RelevanceSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Set the context window size in characters. Zero makes every
    /// operation fail with `InvalidInput`.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Summarize the opening window of the document.
    #[instrument(skip_all, fields(text_bytes = text.len()))]
    pub async fn summarize(&self, text: &str) -> Result<String> {
        require("text", text)?;
        let chunks = self.chunks(text)?;
        let context = first(&chunks)?;

        let summary = self
            .generate(prompt::SUMMARY.name(), prompt::summary_prompt(context.text)?)
            .await?;

        info!(summary_bytes = summary.trim().len(), "summary generated");
        Ok(summary.trim().to_string())
    }

    /// Answer a free-form question from the most relevant window.
    #[instrument(skip_all, fields(text_bytes = text.len(), question = %question))]
    pub async fn answer(&self, text: &str, question: &str) -> Result<Answer> {
        require("text", text)?;
        require("question", question)?;
        let chunks = self.chunks(text)?;
        let context = self.selector.select(&chunks, question)?;
        debug!(chunk = context.index, selector = self.selector.name(), "context selected");

        let response = self
            .generate(
                prompt::ANSWER.name(),
                prompt::answer_prompt(context.text, question)?,
            )
            .await?;

        Ok(parser::parse_answer(&response))
    }

    /// Generate up to `count` comprehension questions from the opening window.
    ///
    /// The prompt always asks for three, so `count` above three still yields
    /// at most three.
    #[instrument(skip_all, fields(text_bytes = text.len(), count = count))]
    pub async fn generate_questions(&self, text: &str, count: usize) -> Result<Vec<String>> {
        require("text", text)?;
        if count == 0 {
            return Err(DocQaError::invalid_input("question count must be at least 1"));
        }
        if count > MAX_QUESTIONS {
            warn!(
                requested = count,
                max = MAX_QUESTIONS,
                "question generation is capped at three per call"
            );
        }

        let chunks = self.chunks(text)?;
        let context = first(&chunks)?;

        let response = self
            .generate(
                prompt::QUESTIONS.name(),
                prompt::questions_prompt(context.text)?,
            )
            .await?;

        let mut questions = parser::parse_questions(&response);
        questions.truncate(count);
        info!(generated = questions.len(), "questions generated");
        Ok(questions)
    }

    /// Grade an answer to the question at `question_index`.
    ///
    /// The question set is regenerated for this call, so with a
    /// non-deterministic generator the question at an index can differ from
    /// the one shown earlier; [`Self::evaluate_question`] avoids that. An
    /// index past the regenerated set is reported as
    /// [`EvaluationOutcome::InvalidQuestion`], not as an error.
    #[instrument(skip_all, fields(text_bytes = text.len(), question_index = question_index))]
    pub async fn evaluate(
        &self,
        text: &str,
        question_index: i64,
        answer: &str,
    ) -> Result<EvaluationOutcome> {
        require("text", text)?;
        require("answer", answer)?;
        if question_index < 0 {
            return Err(DocQaError::invalid_input(format!(
                "question index must not be negative (got {question_index})"
            )));
        }

        let questions = self.generate_questions(text, DEFAULT_QUESTION_COUNT).await?;
        let Some(question) = usize::try_from(question_index)
            .ok()
            .and_then(|idx| questions.get(idx))
        else {
            info!(
                available = questions.len(),
                "question index out of range for regenerated set"
            );
            return Ok(EvaluationOutcome::invalid_question());
        };

        let evaluated = self.grade(text, question, answer).await?;
        Ok(EvaluationOutcome::Evaluated(evaluated))
    }

    /// Grade an answer to a question the caller already holds.
    #[instrument(skip_all, fields(text_bytes = text.len(), question = %question))]
    pub async fn evaluate_question(
        &self,
        text: &str,
        question: &str,
        answer: &str,
    ) -> Result<EvaluatedAnswer> {
        require("text", text)?;
        require("question", question)?;
        require("answer", answer)?;
        self.grade(text, question, answer).await
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn grade(&self, text: &str, question: &str, answer: &str) -> Result<EvaluatedAnswer> {
        let chunks = self.chunks(text)?;
        let context = self.selector.select(&chunks, question)?;

        let response = self
            .generate(
                prompt::EVALUATION.name(),
                prompt::evaluation_prompt(context.text, question, answer)?,
            )
            .await?;

        let evaluation = parser::parse_evaluation(&response);
        info!(score = evaluation.score, "answer evaluated");

        Ok(EvaluatedAnswer {
            question: question.to_string(),
            user_answer: answer.to_string(),
            evaluation,
        })
    }

    fn chunks<'a>(&self, text: &'a str) -> Result<Vec<Chunk<'a>>> {
        let chunks = chunker::split(text, self.chunk_size)?;
        debug!(chunks = chunks.len(), chunk_size = self.chunk_size, "text chunked");
        Ok(chunks)
    }

    async fn generate(&self, template: &str, prompt: String) -> Result<String> {
        debug!(
            template,
            prompt_bytes = prompt.len(),
            model = self.generator.model(),
            "calling text generator"
        );
        let response = self.generator.generate(&prompt).await?;
        debug!(template, response_bytes = response.len(), "generator responded");
        Ok(response)
    }
}

/// Reject empty or whitespace-only arguments.
fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DocQaError::invalid_input(format!("{name} must not be empty")));
    }
    Ok(())
}

fn first<'c, 'a>(chunks: &'c [Chunk<'a>]) -> Result<&'c Chunk<'a>> {
    chunks
        .first()
        .ok_or_else(|| DocQaError::invalid_input("text produced no chunks"))
}
