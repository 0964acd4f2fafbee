//! Parsing of free-text generator output into structured results.
//!
//! The model does not reliably follow the requested format, so none of these
//! functions fail: a missing marker yields a documented default value.
//! Markers are matched case-sensitively.

use std::sync::LazyLock;

use docqa_shared::{Answer, Evaluation};
use regex::Regex;
use tracing::debug;

/// Most questions kept from one generation call.
pub const MAX_QUESTIONS: usize = 3;

/// Highest score the evaluation prompt asks for.
pub const MAX_SCORE: u8 = 5;

pub const ANSWER_NOT_FOUND: &str = "Answer not found";
pub const SUPPORT_NOT_PROVIDED: &str = "Supporting context not provided";
pub const NO_EVALUATION: &str = "No evaluation provided";
pub const NO_IDEAL_ANSWER: &str = "No ideal answer provided";

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

/// Extract `Answer:` and `Support:` sections.
pub fn parse_answer(response: &str) -> Answer {
    static ANSWER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)Answer:\s*(.*?)\s*Support:").expect("valid regex"));
    static SUPPORT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)Support:\s*(.*?)\s*Confidence:").expect("valid regex"));

    let answer = capture_trimmed(&ANSWER_RE, response).unwrap_or_else(|| {
        debug!("no Answer:/Support: pair in response");
        ANSWER_NOT_FOUND.to_string()
    });
    let support = capture_trimmed(&SUPPORT_RE, response).unwrap_or_else(|| {
        debug!("no Support:/Confidence: pair in response");
        SUPPORT_NOT_PROVIDED.to_string()
    });

    Answer { answer, support }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// Collect up to [`MAX_QUESTIONS`] question lines, in order.
///
/// A line counts when, once trimmed, it starts with `Q` or an ASCII digit.
/// Fewer matches give a shorter list; nothing is padded.
pub fn parse_questions(response: &str) -> Vec<String> {
    let questions: Vec<String> = response
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('Q') || line.starts_with(|c: char| c.is_ascii_digit()))
        .take(MAX_QUESTIONS)
        .map(String::from)
        .collect();

    if questions.len() < MAX_QUESTIONS {
        debug!(found = questions.len(), "fewer question lines than requested");
    }
    questions
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Extract `Score:`, `Evaluation:` and `Ideal Answer:` sections.
///
/// The score is the single digit after `Score:`, range-checked against the
/// 1-5 grading scale: a missing score, or a digit above [`MAX_SCORE`] (6-9),
/// scores 0.
pub fn parse_evaluation(response: &str) -> Evaluation {
    static SCORE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"Score:\s*([0-9])").expect("valid regex"));
    static EVALUATION_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)Evaluation:\s*(.*?)(?:Ideal Answer:|\z)").expect("valid regex")
    });
    static IDEAL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)Ideal Answer:\s*(.*)").expect("valid regex"));

    let score = SCORE_RE
        .captures(response)
        .and_then(|caps| caps[1].parse::<u8>().ok())
        .filter(|score| *score <= MAX_SCORE)
        .unwrap_or_else(|| {
            debug!("Score: missing or outside the 1-5 scale");
            0
        });

    let evaluation = capture_trimmed(&EVALUATION_RE, response)
        .unwrap_or_else(|| NO_EVALUATION.to_string());
    let ideal_answer =
        capture_trimmed(&IDEAL_RE, response).unwrap_or_else(|| NO_IDEAL_ANSWER.to_string());

    Evaluation {
        score,
        evaluation,
        ideal_answer,
    }
}

fn capture_trimmed(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // parse_answer
    // -----------------------------------------------------------------------

    #[test]
    fn answer_well_formed() {
        let response = "Answer: Paris\nSupport: The text says Paris is the capital.\nConfidence: High";
        let parsed = parse_answer(response);
        assert_eq!(parsed.answer, "Paris");
        assert_eq!(parsed.support, "The text says Paris is the capital.");
    }

    #[test]
    fn answer_spans_lines_and_is_trimmed() {
        let response = "  Answer:   first line\n  second line  \n\nSupport:\n  quoted passage \nConfidence: Low";
        let parsed = parse_answer(response);
        assert_eq!(parsed.answer, "first line\n  second line");
        assert_eq!(parsed.support, "quoted passage");
    }

    #[test]
    fn answer_without_markers_uses_defaults() {
        let parsed = parse_answer("I am not sure what you mean.");
        assert_eq!(parsed.answer, ANSWER_NOT_FOUND);
        assert_eq!(parsed.support, SUPPORT_NOT_PROVIDED);

        let parsed = parse_answer("");
        assert_eq!(parsed.answer, ANSWER_NOT_FOUND);
        assert_eq!(parsed.support, SUPPORT_NOT_PROVIDED);
    }

    #[test]
    fn answer_without_confidence_keeps_answer() {
        let parsed = parse_answer("Answer: 42\nSupport: the book says so");
        assert_eq!(parsed.answer, "42");
        assert_eq!(parsed.support, SUPPORT_NOT_PROVIDED);
    }

    #[test]
    fn answer_markers_are_case_sensitive() {
        let parsed = parse_answer("answer: 42\nsupport: x\nconfidence: High");
        assert_eq!(parsed.answer, ANSWER_NOT_FOUND);
        assert_eq!(parsed.support, SUPPORT_NOT_PROVIDED);
    }

    #[test]
    fn answer_stops_at_first_support_marker() {
        let parsed = parse_answer("Answer: a\nSupport: b\nConfidence: High\nSupport: c\nConfidence: Low");
        assert_eq!(parsed.answer, "a");
        assert_eq!(parsed.support, "b");
    }

    // -----------------------------------------------------------------------
    // parse_questions
    // -----------------------------------------------------------------------

    #[test]
    fn questions_well_formed() {
        let response = "Q1. What is osmosis?\nQ2. Why do cells divide?\nQ3. How is ATP made?";
        let parsed = parse_questions(response);
        assert_eq!(
            parsed,
            vec![
                "Q1. What is osmosis?",
                "Q2. Why do cells divide?",
                "Q3. How is ATP made?"
            ]
        );
    }

    #[test]
    fn questions_skip_preamble_and_blank_lines() {
        let response = "Here are your questions:\n\n  Q1. First?\n\n  2. Second?\nthanks\n";
        let parsed = parse_questions(response);
        assert_eq!(parsed, vec!["Q1. First?", "2. Second?"]);
    }

    #[test]
    fn questions_truncate_to_three_in_order() {
        let response = "1. a\n2. b\nQ3. c\n4. d\nQ5. e";
        let parsed = parse_questions(response);
        assert_eq!(parsed, vec!["1. a", "2. b", "Q3. c"]);
    }

    #[test]
    fn questions_never_padded() {
        assert!(parse_questions("no questions here").is_empty());
        assert_eq!(parse_questions("Q1. Only one?").len(), 1);
    }

    #[test]
    fn questions_handle_crlf() {
        let parsed = parse_questions("Q1. One?\r\nQ2. Two?\r\n");
        assert_eq!(parsed, vec!["Q1. One?", "Q2. Two?"]);
    }

    // -----------------------------------------------------------------------
    // parse_evaluation
    // -----------------------------------------------------------------------

    #[test]
    fn evaluation_well_formed() {
        let parsed =
            parse_evaluation("Score: 4\nEvaluation: Good reasoning\nIdeal Answer: The capital is Paris");
        assert_eq!(
            parsed,
            Evaluation {
                score: 4,
                evaluation: "Good reasoning".into(),
                ideal_answer: "The capital is Paris".into(),
            }
        );
    }

    #[test]
    fn evaluation_garbage_uses_defaults() {
        let parsed = parse_evaluation("garbage text");
        assert_eq!(
            parsed,
            Evaluation {
                score: 0,
                evaluation: NO_EVALUATION.into(),
                ideal_answer: NO_IDEAL_ANSWER.into(),
            }
        );
    }

    #[test]
    fn evaluation_without_ideal_answer_runs_to_end() {
        let parsed = parse_evaluation("Score: 2\nEvaluation: Misses the main point.\nSee chapter 3.");
        assert_eq!(parsed.score, 2);
        assert_eq!(parsed.evaluation, "Misses the main point.\nSee chapter 3.");
        assert_eq!(parsed.ideal_answer, NO_IDEAL_ANSWER);
    }

    #[test]
    fn evaluation_ideal_answer_spans_lines() {
        let parsed = parse_evaluation("Evaluation: ok\nIdeal Answer: line one\nline two\n");
        assert_eq!(parsed.score, 0);
        assert_eq!(parsed.evaluation, "ok");
        assert_eq!(parsed.ideal_answer, "line one\nline two");
    }

    #[test]
    fn evaluation_score_variants() {
        assert_eq!(parse_evaluation("Score:5").score, 5);
        assert_eq!(parse_evaluation("Score: 3/5").score, 3);
        assert_eq!(parse_evaluation("Score: four").score, 0);
        assert_eq!(parse_evaluation("Score: 9").score, 0);
        assert_eq!(parse_evaluation("score: 4").score, 0);
    }

    #[test]
    fn evaluation_score_is_checked_against_grading_scale() {
        for digit in 0..=MAX_SCORE {
            assert_eq!(parse_evaluation(&format!("Score: {digit}")).score, digit);
        }
        for digit in 6..=9 {
            let parsed = parse_evaluation(&format!("Score: {digit}\nEvaluation: Fine."));
            assert_eq!(parsed.score, 0, "Score: {digit}");
            assert_eq!(parsed.evaluation, "Fine.");
        }
    }
}
