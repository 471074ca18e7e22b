use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::time::format_primitive;
use crate::db::models::Essay;
use crate::db::types::EssayStatus;
use crate::repositories::essays::EssayWithAuthor;
use crate::schemas::user::AuthorSummary;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct EssayCreate {
    #[validate(length(min = 1, max = 200, message = "title must be 1 to 200 characters"))]
    pub(crate) title: String,
    #[validate(custom(function = "not_blank", message = "content must not be empty"))]
    pub(crate) content: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "topic must be at most 200 characters"))]
    pub(crate) topic: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub(crate) struct EssayResponse {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) topic: Option<String>,
    pub(crate) word_count: i32,
    pub(crate) grammar_score: Option<i32>,
    pub(crate) structure_score: Option<i32>,
    pub(crate) content_score: Option<i32>,
    pub(crate) overall_score: Option<i32>,
    pub(crate) feedback: Option<String>,
    pub(crate) status: EssayStatus,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl EssayResponse {
    pub(crate) fn from_db(essay: Essay) -> Self {
        Self {
            id: essay.id,
            user_id: essay.user_id,
            title: essay.title,
            content: essay.content,
            topic: essay.topic,
            word_count: essay.word_count,
            grammar_score: essay.grammar_score,
            structure_score: essay.structure_score,
            content_score: essay.content_score,
            overall_score: essay.overall_score,
            feedback: essay.feedback,
            status: essay.status,
            created_at: format_primitive(essay.created_at),
            updated_at: format_primitive(essay.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TeacherEssayResponse {
    #[serde(flatten)]
    pub(crate) essay: EssayResponse,
    pub(crate) author: AuthorSummary,
}

impl TeacherEssayResponse {
    pub(crate) fn from_row(row: EssayWithAuthor) -> Self {
        let author = AuthorSummary {
            id: row.essay.user_id.clone(),
            email: row.author_email,
            first_name: row.author_first_name,
            last_name: row.author_last_name,
        };
        Self { essay: EssayResponse::from_db(row.essay), author }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str, content: &str) -> EssayCreate {
        EssayCreate { title: title.to_string(), content: content.to_string(), topic: None }
    }

    #[test]
    fn accepts_regular_essay() {
        assert!(payload("My summer", "It was warm.").validate().is_ok());
    }

    #[test]
    fn rejects_empty_and_overlong_titles() {
        let empty = payload("", "Body.").validate().expect_err("empty title");
        assert!(empty.field_errors().contains_key("title"));

        let long = payload(&"t".repeat(201), "Body.").validate().expect_err("long title");
        assert!(long.field_errors().contains_key("title"));

        assert!(payload(&"é".repeat(200), "Body.").validate().is_ok());
    }

    #[test]
    fn rejects_whitespace_only_content() {
        let errors = payload("Title", " \n\t ").validate().expect_err("blank content");
        let fields = errors.field_errors();
        let content = fields.get("content").expect("content error");
        assert_eq!(content[0].code, "blank");
    }
}
