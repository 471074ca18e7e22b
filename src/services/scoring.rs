//! Essay scoring: surface text statistics plus a pluggable grading strategy.
//!
//! [`EssayScorer`] asks a [`GradingStrategy`] for raw component scores and
//! turns them into the stored [`EssayScore`]. Everything after the strategy
//! call is deterministic.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::{GradingStrategyKind, Settings};

const MIN_COMPONENT_SCORE: f64 = 60.0;
const MAX_COMPONENT_SCORE: f64 = 100.0;

const LONG_SENTENCE_WORDS: f64 = 15.0;
const LONG_ESSAY_WORDS: usize = 300;

const GRAMMAR_FLOOR: f64 = 85.0;
const GRAMMAR_SPREAD: f64 = 10.0;

/// Feedback sentences per dimension, ordered `>85`, `>70`, otherwise.
const GRAMMAR_FEEDBACK: [&str; 3] = [
    "Excellent grammar and punctuation usage.",
    "Good grammar overall with minor areas for improvement.",
    "Focus on improving grammar and punctuation accuracy.",
];
const STRUCTURE_FEEDBACK: [&str; 3] = [
    "Well-structured essay with clear flow and organization.",
    "Good structure with some areas that could be strengthened.",
    "Work on improving essay structure and paragraph organization.",
];
const CONTENT_FEEDBACK: [&str; 3] = [
    "Strong content with compelling arguments and evidence.",
    "Good content development with room for deeper analysis.",
    "Expand your content with more detailed examples and analysis.",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TextStats {
    pub(crate) word_count: usize,
    pub(crate) sentence_count: usize,
    pub(crate) avg_words_per_sentence: f64,
}

impl TextStats {
    pub(crate) fn analyze(content: &str) -> Self {
        let word_count = content.split_whitespace().count();
        let sentence_count = content
            .split(['.', '!', '?'])
            .filter(|segment| !segment.trim().is_empty())
            .count();
        let avg_words_per_sentence = word_count as f64 / sentence_count.max(1) as f64;

        Self { word_count, sentence_count, avg_words_per_sentence }
    }
}

/// Raw, unclamped component scores as produced by a strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScoreComponents {
    pub(crate) grammar: f64,
    pub(crate) structure: f64,
    pub(crate) content: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EssayScore {
    pub(crate) grammar_score: i32,
    pub(crate) structure_score: i32,
    pub(crate) content_score: i32,
    pub(crate) overall_score: i32,
    pub(crate) feedback: String,
}

impl EssayScore {
    /// Clamps each component to [60, 100]; the overall score and feedback bands
    /// are computed from the clamped values before they are rounded for storage.
    pub(crate) fn from_components(components: ScoreComponents) -> Self {
        let grammar = clamp_component(components.grammar);
        let structure = clamp_component(components.structure);
        let content = clamp_component(components.content);

        let overall = ((grammar + structure + content) / 3.0).round();

        Self {
            grammar_score: grammar.round() as i32,
            structure_score: structure.round() as i32,
            content_score: content.round() as i32,
            overall_score: overall as i32,
            feedback: render_feedback(grammar, structure, content),
        }
    }
}

fn clamp_component(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_COMPONENT_SCORE;
    }
    value.clamp(MIN_COMPONENT_SCORE, MAX_COMPONENT_SCORE)
}

fn band(score: f64, sentences: &[&'static str; 3]) -> &'static str {
    if score > 85.0 {
        sentences[0]
    } else if score > 70.0 {
        sentences[1]
    } else {
        sentences[2]
    }
}

pub(crate) fn render_feedback(grammar: f64, structure: f64, content: f64) -> String {
    [
        band(grammar, &GRAMMAR_FEEDBACK),
        band(structure, &STRUCTURE_FEEDBACK),
        band(content, &CONTENT_FEEDBACK),
    ]
    .join(" ")
}

pub(crate) fn structure_score(stats: &TextStats) -> f64 {
    if stats.avg_words_per_sentence > LONG_SENTENCE_WORDS {
        90.0
    } else {
        75.0
    }
}

pub(crate) fn content_score(stats: &TextStats) -> f64 {
    if stats.word_count > LONG_ESSAY_WORDS {
        85.0
    } else {
        70.0
    }
}

/// Source of component scores. Swap implementations to plug in a real text
/// analysis provider; the aggregation downstream does not change.
#[async_trait]
pub(crate) trait GradingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn components(&self, content: &str) -> anyhow::Result<ScoreComponents>;
}

/// Fixed-formula grading: structure and content from [`TextStats`], grammar
/// drawn uniformly from [85, 95) as a stand-in for real analysis.
pub(crate) struct HeuristicGrading {
    rng: Mutex<StdRng>,
}

impl HeuristicGrading {
    pub(crate) fn from_entropy() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    pub(crate) fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    fn draw_grammar(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        GRAMMAR_FLOOR + rng.gen::<f64>() * GRAMMAR_SPREAD
    }
}

#[async_trait]
impl GradingStrategy for HeuristicGrading {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn components(&self, content: &str) -> anyhow::Result<ScoreComponents> {
        let stats = TextStats::analyze(content);
        Ok(ScoreComponents {
            grammar: self.draw_grammar(),
            structure: structure_score(&stats),
            content: content_score(&stats),
        })
    }
}

#[derive(Clone)]
pub(crate) struct EssayScorer {
    strategy: Arc<dyn GradingStrategy>,
}

impl EssayScorer {
    pub(crate) fn new(strategy: Arc<dyn GradingStrategy>) -> Self {
        Self { strategy }
    }

    pub(crate) fn from_settings(settings: &Settings) -> Self {
        let grading = settings.grading();
        let strategy: Arc<dyn GradingStrategy> = match grading.strategy {
            GradingStrategyKind::Heuristic => match grading.seed {
                Some(seed) => Arc::new(HeuristicGrading::seeded(seed)),
                None => Arc::new(HeuristicGrading::from_entropy()),
            },
        };
        tracing::info!(strategy = strategy.name(), seeded = grading.seed.is_some(), "Essay scorer ready");
        Self::new(strategy)
    }

    pub(crate) fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub(crate) async fn score(&self, content: &str) -> anyhow::Result<EssayScore> {
        let components = self.strategy.components(content).await?;
        Ok(EssayScore::from_components(components))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Strategy returning a fixed grammar score, for deterministic assertions.
    pub(crate) struct FixedGrammar(pub(crate) f64);

    #[async_trait]
    impl GradingStrategy for FixedGrammar {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn components(&self, content: &str) -> anyhow::Result<ScoreComponents> {
            let stats = TextStats::analyze(content);
            Ok(ScoreComponents {
                grammar: self.0,
                structure: structure_score(&stats),
                content: content_score(&stats),
            })
        }
    }

    fn long_essay() -> String {
        // 20 sentences of 16 words: 320 words, 16 words per sentence.
        let sentence = "the quick brown fox jumps over the lazy dog while the farmer watches from far away.";
        vec![sentence; 20].join(" ")
    }

    #[test]
    fn counts_words_and_sentences() {
        let stats = TextStats::analyze("  Hello there. How are you?! Fine  ");
        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.sentence_count, 3);
        assert!((stats.avg_words_per_sentence - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_sentences_uses_divisor_one() {
        let stats = TextStats::analyze("just some words without terminal punctuation");
        assert_eq!(stats.sentence_count, 1);

        let stats = TextStats::analyze("...!?");
        assert_eq!(stats.sentence_count, 0);
        assert_eq!(stats.word_count, 1);
        assert!((stats.avg_words_per_sentence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn whitespace_only_content_does_not_divide_by_zero() {
        let stats = TextStats::analyze(" \n\t ");
        assert_eq!(stats.word_count, 0);
        assert_eq!(stats.sentence_count, 0);
        assert_eq!(stats.avg_words_per_sentence, 0.0);
    }

    #[test]
    fn long_essay_gets_top_structure_and_content() {
        let stats = TextStats::analyze(&long_essay());
        assert_eq!(stats.word_count, 320);
        assert!(stats.avg_words_per_sentence > 15.0);
        assert_eq!(structure_score(&stats), 90.0);
        assert_eq!(content_score(&stats), 85.0);
    }

    #[test]
    fn short_essay_gets_base_structure_and_content() {
        let stats = TextStats::analyze("Short. Essay. Here.");
        assert_eq!(structure_score(&stats), 75.0);
        assert_eq!(content_score(&stats), 70.0);
    }

    #[tokio::test]
    async fn long_essay_overall_stays_in_band() {
        let scorer = EssayScorer::new(Arc::new(HeuristicGrading::seeded(7)));
        for _ in 0..50 {
            let score = scorer.score(&long_essay()).await.expect("score");
            assert_eq!(score.structure_score, 90);
            assert_eq!(score.content_score, 85);
            assert!((85..=95).contains(&score.grammar_score));
            // (85 + 90 + 85) / 3 = 86.67 .. (95 + 90 + 85) / 3 = 90
            assert!((87..=90).contains(&score.overall_score), "overall {}", score.overall_score);
        }
    }

    #[tokio::test]
    async fn seeded_heuristic_is_reproducible() {
        let first = HeuristicGrading::seeded(42);
        let second = HeuristicGrading::seeded(42);
        for _ in 0..10 {
            let a = first.components("One sentence.").await.unwrap();
            let b = second.components("One sentence.").await.unwrap();
            assert_eq!(a, b);
            assert!((85.0..95.0).contains(&a.grammar));
        }
    }

    #[test]
    fn overall_is_rounded_mean_of_clamped_components() {
        let score = EssayScore::from_components(ScoreComponents {
            grammar: 90.0,
            structure: 75.0,
            content: 70.0,
        });
        assert_eq!(score.overall_score, 78);
        assert_eq!(score.grammar_score, 90);

        let clamped = EssayScore::from_components(ScoreComponents {
            grammar: 20.0,
            structure: 140.0,
            content: f64::NAN,
        });
        assert_eq!(clamped.grammar_score, 60);
        assert_eq!(clamped.structure_score, 100);
        assert_eq!(clamped.content_score, 60);
        assert_eq!(clamped.overall_score, 73);
    }

    #[test]
    fn feedback_bands_are_stable() {
        assert_eq!(
            render_feedback(90.0, 90.0, 85.0),
            "Excellent grammar and punctuation usage. \
             Well-structured essay with clear flow and organization. \
             Good content development with room for deeper analysis."
        );
        assert_eq!(
            render_feedback(70.0, 75.0, 60.0),
            "Focus on improving grammar and punctuation accuracy. \
             Good structure with some areas that could be strengthened. \
             Expand your content with more detailed examples and analysis."
        );
    }

    #[test]
    fn feedback_uses_unrounded_grammar() {
        let score = EssayScore::from_components(ScoreComponents {
            grammar: 85.3,
            structure: 75.0,
            content: 70.0,
        });
        assert_eq!(score.grammar_score, 85);
        assert!(score.feedback.starts_with("Excellent grammar"));
    }

    #[tokio::test]
    async fn fixed_strategy_is_pluggable() {
        let scorer = EssayScorer::new(Arc::new(FixedGrammar(72.0)));
        let score = scorer.score("Tiny essay.").await.unwrap();
        assert_eq!(scorer.strategy_name(), "fixed");
        assert_eq!(score.grammar_score, 72);
        assert_eq!(score.overall_score, 72);
        assert!(score.feedback.starts_with("Good grammar overall"));
    }
}
