pub(crate) mod essays;
pub(crate) mod health;
pub(crate) mod progress;
pub(crate) mod quiz_attempts;
pub(crate) mod quizzes;
pub(crate) mod users;
