//! Prompt templates sent to the text generator.
//!
//! Each template declares the variables it needs and asks the model for a
//! fixed set of labeled sections; [`crate::parser`] reads those labels back.

use std::collections::HashMap;

use docqa_shared::{DocQaError, Result};

/// Variable mapping passed to [`PromptTemplate::render`].
pub type PromptVars<'a> = HashMap<&'a str, &'a str>;

/// A fixed prompt with `{name}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    name: &'static str,
    variables: &'static [&'static str],
    body: &'static str,
}

/// Five to seven sentence summary of the opening context window.
pub const SUMMARY: PromptTemplate = PromptTemplate {
    name: "summary",
    variables: &["context"],
    body: "\
Provide a clear, concise 5-7 sentence summary of the following academic text for a student:

{context}

Summary:",
};

/// Direct answer, supporting excerpt, and a confidence label.
pub const ANSWER: PromptTemplate = PromptTemplate {
    name: "answer",
    variables: &["context", "question"],
    body: "\
As a research assistant, carefully analyze the context and provide:
1. A direct answer to the question
2. Relevant context supporting the answer
3. Confidence level (High/Medium/Low)

Context: {context}
Question: {question}

Format your response as:
Answer: [your answer]
Support: [supporting text]
Confidence: [High/Medium/Low]",
};

/// Three comprehension questions, one per `Q<n>.` line.
pub const QUESTIONS: PromptTemplate = PromptTemplate {
    name: "questions",
    variables: &["context"],
    body: "\
Generate 3 high-quality questions about the following text.
Questions should be:
- Clear and specific
- Require understanding, not just recall
- Cover different aspects of the text
- Include question IDs (Q1, Q2, Q3)

Text: {context}

Format each question as:
Q1. [question text]
Q2. [question text]
Q3. [question text]",
};

/// Grade a user's answer and propose an ideal one.
pub const EVALUATION: PromptTemplate = PromptTemplate {
    name: "evaluation",
    variables: &["context", "question", "answer"],
    body: "\
Evaluate this answer to the question based on the context:

Question: {question}
Provided Answer: {answer}
Context: {context}

Provide:
1. Accuracy score (1-5)
2. Explanation of the score
3. Ideal answer

Format as:
Score: [1-5]
Evaluation: [your evaluation]
Ideal Answer: [suggested answer]",
};

impl PromptTemplate {
    /// Template name for tracing and errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Variables that must be present when rendering.
    pub fn variables(&self) -> &'static [&'static str] {
        self.variables
    }

    /// Substitute every `{name}` placeholder in a single pass.
    ///
    /// Substituted values are not rescanned, so document text containing
    /// `{question}` is emitted verbatim. Brace groups that are not declared
    /// variables are left as-is.
    pub fn render(&self, vars: &PromptVars<'_>) -> Result<String> {
        if let Some(missing) = self.variables.iter().find(|v| !vars.contains_key(**v)) {
            return Err(DocQaError::MissingVariable {
                template: self.name,
                name: (*missing).to_string(),
            });
        }

        let extra: usize = vars.values().map(|v| v.len()).sum();
        let mut out = String::with_capacity(self.body.len() + extra);
        let mut rest = self.body;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                rest = "";
                break;
            };

            let name = &after[..close];
            match vars.get(name) {
                Some(value) if self.variables.iter().any(|v| *v == name) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);

        Ok(out)
    }
}

/// Render [`SUMMARY`] over a context window.
pub fn summary_prompt(context: &str) -> Result<String> {
    SUMMARY.render(&HashMap::from([("context", context)]))
}

/// Render [`ANSWER`] for a question over a context window.
pub fn answer_prompt(context: &str, question: &str) -> Result<String> {
    ANSWER.render(&HashMap::from([("context", context), ("question", question)]))
}

/// Render [`QUESTIONS`] over a context window.
pub fn questions_prompt(context: &str) -> Result<String> {
    QUESTIONS.render(&HashMap::from([("context", context)]))
}

/// Render [`EVALUATION`] for a user's answer to a question.
pub fn evaluation_prompt(context: &str, question: &str, answer: &str) -> Result<String> {
    EVALUATION.render(&HashMap::from([
        ("context", context),
        ("question", question),
        ("answer", answer),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_prompt_substitutes_and_lists_markers_in_order() {
        let prompt = answer_prompt("Paris is the capital of France.", "What is the capital?").unwrap();
        assert!(prompt.contains("Context: Paris is the capital of France."));
        assert!(prompt.contains("Question: What is the capital?"));
        assert!(!prompt.contains("{context}"));

        let answer = prompt.rfind("Answer:").unwrap();
        let support = prompt.rfind("Support:").unwrap();
        let confidence = prompt.rfind("Confidence:").unwrap();
        assert!(answer < support && support < confidence);
    }

    #[test]
    fn questions_prompt_asks_for_three_labeled_lines() {
        let prompt = questions_prompt("Some lecture notes.").unwrap();
        for label in ["Q1.", "Q2.", "Q3."] {
            assert!(prompt.contains(label), "missing {label}");
        }
        assert!(prompt.contains("Text: Some lecture notes."));
    }

    #[test]
    fn evaluation_prompt_requests_all_sections() {
        let prompt = evaluation_prompt("ctx", "Q1. Why?", "Because.").unwrap();
        assert!(prompt.contains("Question: Q1. Why?"));
        assert!(prompt.contains("Provided Answer: Because."));
        for marker in ["Score:", "Evaluation:", "Ideal Answer:"] {
            assert!(prompt.contains(marker), "missing {marker}");
        }
    }

    #[test]
    fn summary_prompt_ends_with_label() {
        let prompt = summary_prompt("Cells divide by mitosis.").unwrap();
        assert!(prompt.contains("Cells divide by mitosis."));
        assert!(prompt.ends_with("Summary:"));
    }

    #[test]
    fn missing_variable_is_reported() {
        let vars = HashMap::from([("context", "only context")]);
        let err = ANSWER.render(&vars).unwrap_err();
        match err {
            DocQaError::MissingVariable { template, name } => {
                assert_eq!(template, "answer");
                assert_eq!(name, "question");
            }
            other => panic!("expected MissingVariable, got {other:?}"),
        }
    }

    #[test]
    fn values_are_not_rescanned() {
        let prompt = answer_prompt("the text mentions {question} literally", "real question").unwrap();
        assert!(prompt.contains("Context: the text mentions {question} literally"));
        assert!(prompt.contains("Question: real question"));
    }

    #[test]
    fn undeclared_braces_are_left_alone() {
        let vars = HashMap::from([("context", "a {json: true} blob {")]);
        let prompt = SUMMARY.render(&vars).unwrap();
        assert!(prompt.contains("a {json: true} blob {"));
    }

    #[test]
    fn extra_variables_are_ignored() {
        let vars = HashMap::from([("context", "ctx"), ("unused", "zzz")]);
        let prompt = QUESTIONS.render(&vars).unwrap();
        assert!(!prompt.contains("zzz"));
    }

    #[test]
    fn templates_declare_expected_variables() {
        assert_eq!(SUMMARY.variables(), &["context"]);
        assert_eq!(ANSWER.variables(), &["context", "question"]);
        assert_eq!(QUESTIONS.variables(), &["context"]);
        assert_eq!(EVALUATION.variables(), &["context", "question", "answer"]);
        assert_eq!(EVALUATION.name(), "evaluation");
    }
}
