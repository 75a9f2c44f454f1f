use serde::Serialize;

/// How an answer was produced. Only `Generated` comes from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Generated,
    NoContext,
    RetrievalFailed,
    Fallback,
}

impl AnswerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::NoContext => "no_context",
            Self::RetrievalFailed => "retrieval_failed",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub outcome: AnswerOutcome,
}

impl Answer {
    pub fn new(text: impl Into<String>, outcome: AnswerOutcome) -> Self {
        Self {
            text: text.into(),
            outcome,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.outcome != AnswerOutcome::Generated
    }
}
