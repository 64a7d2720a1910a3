//! Diagnostic questionnaire.
//!
//! The app walks the user through [`questions`] and hands the collected
//! [`DiagnosisAnswers`] to `Assistant::prescription`. Answers are not
//! validated against the questions; any mapping is accepted.

use serde::Serialize;

use crate::models::DiagnosisAnswers;

/// How a question collects its answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    /// Pick any number of options.
    Tags { options: Vec<String> },
    /// Pick a number in `min..=max`.
    Slider { min: u8, max: u8, default_value: u8 },
    /// Pick exactly one option.
    Choice { options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn options(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The three-step diagnosis flow, in order.
pub fn questions() -> Vec<Question> {
    vec![
        Question {
            id: "q1".to_string(),
            text: "What's primarily on your mind right now?".to_string(),
            kind: QuestionKind::Tags {
                options: options(&[
                    "Stress",
                    "Sleep Issues",
                    "Lack of Focus",
                    "Low Energy",
                    "Anxiety",
                    "Feeling Overwhelmed",
                    "Need Relaxation",
                ]),
            },
        },
        Question {
            id: "q2".to_string(),
            text: "How would you rate your current mood (1=Low, 10=Great)?".to_string(),
            kind: QuestionKind::Slider {
                min: 1,
                max: 10,
                default_value: 5,
            },
        },
        Question {
            id: "q3".to_string(),
            text: "What do you hope to achieve with a session?".to_string(),
            kind: QuestionKind::Choice {
                options: options(&[
                    "Calm Down",
                    "Fall Asleep",
                    "Concentrate Better",
                    "Boost Energy",
                    "General Well-being",
                ]),
            },
        },
    ]
}

/// Render answers as `id: value` lines, in question-id order.
///
/// Known ids are prefixed with their question text so a model prompt reads
/// naturally; unknown ids are passed through as-is.
pub fn summarize(answers: &DiagnosisAnswers) -> String {
    let questions = questions();
    answers
        .iter()
        .map(|(id, value)| match questions.iter().find(|q| &q.id == id) {
            Some(q) => format!("{} ({}): {}", q.text, id, value),
            None => format!("{}: {}", id, value),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
