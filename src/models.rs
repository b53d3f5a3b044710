use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Header row of the question table, in storage order.
pub const COLUMNS: [&str; 9] = [
    "question", "subject", "use", "correct",
    "responseA", "responseB", "responseC", "responseD", "remark",
];

/// One row of the question table. Empty or missing cells load as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Question {
    pub question: String,
    pub subject: String,
    #[serde(rename = "use")]
    pub usage: String,
    pub correct: String,
    #[serde(rename = "responseA")]
    pub response_a: String,
    #[serde(rename = "responseB")]
    pub response_b: String,
    #[serde(rename = "responseC")]
    pub response_c: String,
    #[serde(rename = "responseD")]
    pub response_d: String,
    pub remark: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Answer { A, B, C, D }

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self { Answer::A => "A", Answer::B => "B", Answer::C => "C", Answer::D => "D" };
        f.write_str(s)
    }
}

/// Body of `POST /Questions`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewQuestion {
    pub question: String,
    pub subject: String,
    #[serde(rename = "use")]
    pub usage: String,
    pub correct: Answer,
    #[serde(rename = "responseA")]
    pub response_a: String,
    #[serde(rename = "responseB")]
    pub response_b: String,
    #[serde(rename = "responseC")]
    pub response_c: String,
    #[serde(rename = "responseD", default)]
    pub response_d: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
}

impl From<NewQuestion> for Question {
    fn from(n: NewQuestion) -> Self {
        Question {
            question: n.question,
            subject: n.subject,
            usage: n.usage,
            correct: n.correct.to_string(),
            response_a: n.response_a,
            response_b: n.response_b,
            response_c: n.response_c,
            response_d: n.response_d.unwrap_or_default(),
            remark: n.remark.unwrap_or_default(),
        }
    }
}

/// Allowed quiz sizes. Anything else is rejected while parsing the query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum QuestionCount {
    #[serde(rename = "5")]
    Five,
    #[default]
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "20")]
    Twenty,
}

impl QuestionCount {
    pub fn get(self) -> usize {
        match self {
            QuestionCount::Five => 5,
            QuestionCount::Ten => 10,
            QuestionCount::Twenty => 20,
        }
    }
}

/// Row selection for a quiz draw.
///
/// `subjects: None` means every subject present in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizFilter {
    pub usage: Option<String>,
    pub subjects: Option<Vec<String>>,
}

impl QuizFilter {
    /// Build a filter from raw query values; `subjects` is comma separated.
    pub fn new(usage: Option<String>, subjects: Option<&str>) -> Self {
        let subjects = subjects.map(|s| s.split(',').map(|p| p.trim().to_string()).collect());
        Self { usage, subjects }
    }

    pub fn matches(&self, q: &Question) -> bool {
        if let Some(ref usage) = self.usage {
            if q.usage != *usage { return false; }
        }
        match self.subjects {
            Some(ref subjects) => subjects.iter().any(|s| *s == q.subject),
            None => true,
        }
    }
}

/// Result of a quiz draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub questions: Vec<Question>,
    /// Fewer matching rows existed than were requested.
    pub incomplete: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QcmResponse {
    #[serde(rename = "QCM")]
    pub qcm: Vec<Question>,
    #[serde(rename = "imcomplete_answer_flag")]
    pub incomplete: bool,
}

impl From<Quiz> for QcmResponse {
    fn from(q: Quiz) -> Self {
        Self { qcm: q.questions, incomplete: q.incomplete }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: u8,
}
