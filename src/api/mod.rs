pub(crate) mod auth;
pub(crate) mod dev;
pub(crate) mod errors;
pub(crate) mod essays;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod progress;
pub(crate) mod quiz_attempts;
pub(crate) mod quizzes;
pub(crate) mod rate_limit;
pub(crate) mod router;
pub(crate) mod teacher;
pub(crate) mod validation;
