use crate::db::models::QuizQuestion;
use crate::db::types::QuizDifficulty;

#[derive(Debug, Clone)]
pub(crate) struct SampleQuiz {
    pub(crate) title: &'static str,
    pub(crate) description: &'static str,
    pub(crate) difficulty: QuizDifficulty,
    pub(crate) time_limit_minutes: i32,
    pub(crate) questions: Vec<QuizQuestion>,
}

fn question(
    prompt: &str,
    options: [&str; 4],
    correct_answer: usize,
    explanation: &str,
) -> QuizQuestion {
    QuizQuestion {
        question: prompt.to_string(),
        options: options.iter().map(|option| option.to_string()).collect(),
        correct_answer,
        explanation: Some(explanation.to_string()),
    }
}

/// Starter quizzes seeded by `POST /init-data`. Titles are unique in storage,
/// so seeding twice leaves the first copy in place.
pub(crate) fn sample_quizzes() -> Vec<SampleQuiz> {
    vec![
        SampleQuiz {
            title: "Grammar Fundamentals",
            description: "Test your basic grammar knowledge",
            difficulty: QuizDifficulty::Beginner,
            time_limit_minutes: 20,
            questions: vec![
                question(
                    "Which sentence is grammatically correct?",
                    [
                        "The team are working on the project.",
                        "The team is working on the project.",
                        "The team was working on the project.",
                        "The team were working on the project.",
                    ],
                    1,
                    "When 'team' is used as a collective noun referring to the group as a unit, \
                     it takes a singular verb.",
                ),
                question(
                    "Choose the correct form of the verb:",
                    [
                        "She don't like coffee.",
                        "She doesn't like coffee.",
                        "She didn't liked coffee.",
                        "She doesn't likes coffee.",
                    ],
                    1,
                    "With third-person singular subjects (she, he, it), use 'doesn't' in the \
                     present tense.",
                ),
            ],
        },
        SampleQuiz {
            title: "Essay Structure",
            description: "Understanding how to organize your writing",
            difficulty: QuizDifficulty::Intermediate,
            time_limit_minutes: 30,
            questions: vec![question(
                "What is the purpose of a thesis statement?",
                [
                    "To summarize the conclusion",
                    "To present the main argument of the essay",
                    "To provide background information",
                    "To list all the sources used",
                ],
                1,
                "A thesis statement presents the main argument or central claim of your essay.",
            )],
        },
        SampleQuiz {
            title: "Advanced Writing",
            description: "Complex writing techniques and analysis",
            difficulty: QuizDifficulty::Advanced,
            time_limit_minutes: 45,
            questions: vec![question(
                "Which literary device is being used: 'The wind whispered through the trees'?",
                ["Metaphor", "Personification", "Simile", "Alliteration"],
                1,
                "Personification gives human characteristics (whispering) to non-human things \
                 (wind).",
            )],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_set_matches_published_catalogue() {
        let quizzes = sample_quizzes();
        let summary: Vec<_> = quizzes
            .iter()
            .map(|quiz| (quiz.title, quiz.difficulty, quiz.time_limit_minutes, quiz.questions.len()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Grammar Fundamentals", QuizDifficulty::Beginner, 20, 2),
                ("Essay Structure", QuizDifficulty::Intermediate, 30, 1),
                ("Advanced Writing", QuizDifficulty::Advanced, 45, 1),
            ]
        );
    }

    #[test]
    fn every_answer_index_points_at_an_option() {
        for quiz in sample_quizzes() {
            for question in &quiz.questions {
                assert!(question.correct_answer < question.options.len(), "{}", question.question);
                assert!(question.explanation.as_deref().is_some_and(|text| !text.contains("  ")));
            }
        }
    }
}
