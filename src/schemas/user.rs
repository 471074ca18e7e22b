use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::UserRole;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserCreate {
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters long"))]
    pub(crate) password: String,
    #[serde(default)]
    #[serde(alias = "firstName")]
    #[validate(length(max = 100, message = "first_name must be at most 100 characters"))]
    pub(crate) first_name: Option<String>,
    #[serde(default)]
    #[serde(alias = "lastName")]
    #[validate(length(max = 100, message = "last_name must be at most 100 characters"))]
    pub(crate) last_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserLogin {
    #[validate(length(min = 1, message = "email must not be empty"))]
    pub(crate) email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) profile_image_url: Option<String>,
    pub(crate) role: UserRole,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_image_url: user.profile_image_url,
            role: user.role,
            created_at: format_primitive(user.created_at),
        }
    }
}

/// Author details shown next to essays in the teacher view.
#[derive(Debug, Serialize)]
pub(crate) struct AuthorSummary {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
}
