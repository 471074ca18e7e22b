use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Student,
    Teacher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "essaystatus", rename_all = "lowercase")]
pub(crate) enum EssayStatus {
    Submitted,
    Graded,
    Draft,
}

/// Progress-tracking category a score is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "subject", rename_all = "lowercase")]
pub(crate) enum Subject {
    Writing,
    Grammar,
    Vocabulary,
}

impl Subject {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Writing => "writing",
            Self::Grammar => "grammar",
            Self::Vocabulary => "vocabulary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "quizdifficulty", rename_all = "lowercase")]
pub(crate) enum QuizDifficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Subject::Grammar).unwrap(), "grammar");
        assert_eq!(Subject::Vocabulary.as_str(), "vocabulary");
        let parsed: Subject = serde_json::from_str("\"writing\"").unwrap();
        assert_eq!(parsed, Subject::Writing);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(serde_json::from_str::<UserRole>("\"admin\"").is_err());
    }
}
