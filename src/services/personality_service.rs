use crate::error::{Error, Result};
use crate::models::personality::{
    CategoryScore, PersonalityAnswerDetail, PersonalityBank, PersonalityCategory,
    PersonalityScoreSummary, PersonalityTestRecord,
};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

pub const HIGH_LEVEL_THRESHOLD: i32 = 160;
pub const MODERATE_LEVEL_THRESHOLD: i32 = 120;
pub const MIN_LIKERT: i32 = 1;
pub const MAX_LIKERT: i32 = 5;

#[derive(Debug, Clone)]
pub struct PersonalityOutcome {
    pub scores: PersonalityScoreSummary,
    pub details: Vec<PersonalityAnswerDetail>,
}

pub struct PersonalityService;

/// Reverse-keyed item score on the 1..=5 scale.
pub fn reverse(raw: i32) -> i32 {
    (MAX_LIKERT + 1) - raw
}

/// Level label for a category total. Totals are raw sums and are not
/// normalized by the number of answered items.
pub fn classify(score: i32, category: PersonalityCategory) -> String {
    let level = if score >= HIGH_LEVEL_THRESHOLD {
        "high"
    } else if score >= MODERATE_LEVEL_THRESHOLD {
        "moderate"
    } else {
        "low"
    };
    format!("{} {}", level, category.label())
}

impl PersonalityService {
    pub fn validate_answers(answers: &HashMap<String, i32>) -> Result<()> {
        if let Some((id, value)) = answers
            .iter()
            .find(|(_, v)| !(MIN_LIKERT..=MAX_LIKERT).contains(*v))
        {
            return Err(Error::BadRequest(format!(
                "Answer for question {} must be between {} and {}, got {}",
                id, MIN_LIKERT, MAX_LIKERT, value
            )));
        }
        Ok(())
    }

    pub fn score(answers: &HashMap<String, i32>, bank: &PersonalityBank) -> PersonalityOutcome {
        let mut totals: HashMap<PersonalityCategory, i32> = HashMap::new();
        let mut details = Vec::with_capacity(answers.len());

        // Sorted so details come out in a stable order.
        let ordered: BTreeMap<&String, &i32> = answers.iter().collect();
        for (id, raw) in ordered {
            let Some(question) = bank.find(id) else {
                tracing::warn!(question_id = %id, "personality answer has no catalog entry, skipped");
                continue;
            };

            let final_score = if question.reverse_scoring {
                reverse(*raw)
            } else {
                *raw
            };
            *totals.entry(question.category).or_insert(0) += final_score;

            details.push(PersonalityAnswerDetail {
                question_id: question.id.clone(),
                category: question.category,
                content: question.content.clone(),
                selected_answer: *raw,
                reverse_scoring: question.reverse_scoring,
                final_score,
            });
        }

        let category_score = |category: PersonalityCategory| {
            let score = totals.get(&category).copied().unwrap_or(0);
            CategoryScore {
                score,
                level: classify(score, category),
            }
        };

        let cooperate = category_score(PersonalityCategory::Cooperate);
        let responsibility = category_score(PersonalityCategory::Responsibility);
        let leadership = category_score(PersonalityCategory::Leadership);
        let total = cooperate.score + responsibility.score + leadership.score;

        PersonalityOutcome {
            scores: PersonalityScoreSummary {
                cooperate,
                responsibility,
                leadership,
                total,
            },
            details,
        }
    }

    pub fn to_record(outcome: PersonalityOutcome) -> PersonalityTestRecord {
        PersonalityTestRecord {
            scores: outcome.scores,
            details: outcome.details,
            submitted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::personality::PersonalityQuestion;

    fn q(id: &str, category: PersonalityCategory, reverse_scoring: bool) -> PersonalityQuestion {
        PersonalityQuestion {
            id: id.to_string(),
            category,
            content: format!("I am item {}", id),
            reverse_scoring,
        }
    }

    #[test]
    fn test_reverse_is_involution() {
        for x in MIN_LIKERT..=MAX_LIKERT {
            assert_eq!(reverse(x), 6 - x);
            assert_eq!(reverse(reverse(x)), x);
        }
    }

    #[test]
    fn test_level_boundaries() {
        let c = PersonalityCategory::Leadership;
        assert_eq!(classify(119, c), "low leadership");
        assert_eq!(classify(120, c), "moderate leadership");
        assert_eq!(classify(159, c), "moderate leadership");
        assert_eq!(classify(160, c), "high leadership");
        assert_eq!(classify(0, PersonalityCategory::Cooperate), "low cooperativeness");
    }

    #[test]
    fn test_score_applies_reverse_and_sums() {
        let bank = PersonalityBank::from_questions(vec![
            q("c1", PersonalityCategory::Cooperate, false),
            q("c2", PersonalityCategory::Cooperate, true),
            q("r1", PersonalityCategory::Responsibility, false),
            q("l1", PersonalityCategory::Leadership, true),
        ]);
        let answers: HashMap<String, i32> = [("c1", 4), ("c2", 5), ("r1", 2), ("l1", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let outcome = PersonalityService::score(&answers, &bank);

        assert_eq!(outcome.scores.cooperate.score, 4 + 1);
        assert_eq!(outcome.scores.responsibility.score, 2);
        assert_eq!(outcome.scores.leadership.score, 5);
        assert_eq!(outcome.scores.total, 12);
        let c2 = outcome.details.iter().find(|d| d.question_id == "c2").unwrap();
        assert_eq!(c2.selected_answer, 5);
        assert_eq!(c2.final_score, 1);
        assert!(outcome.details.iter().all(|d| (1..=5).contains(&d.final_score)));
    }

    #[test]
    fn test_unknown_ids_are_skipped() {
        let bank = PersonalityBank::from_questions(vec![q("c1", PersonalityCategory::Cooperate, false)]);
        let answers: HashMap<String, i32> =
            [("c1".to_string(), 3), ("nope".to_string(), 5)].into_iter().collect();
        let outcome = PersonalityService::score(&answers, &bank);
        assert_eq!(outcome.details.len(), 1);
        assert_eq!(outcome.scores.total, 3);
    }

    #[test]
    fn test_category_score_grows_with_answers() {
        let bank = PersonalityBank::from_questions(
            (0..5)
                .map(|i| q(&format!("c{}", i), PersonalityCategory::Cooperate, i % 2 == 0))
                .collect(),
        );
        let mut answers = HashMap::new();
        let mut previous = 0;
        for i in 0..5 {
            answers.insert(format!("c{}", i), 2);
            let score = PersonalityService::score(&answers, &bank).scores.cooperate.score;
            assert!(score >= previous);
            previous = score;
        }
    }

    #[test]
    fn test_validate_answers_range() {
        let ok: HashMap<String, i32> = [("a".to_string(), 1), ("b".to_string(), 5)].into_iter().collect();
        assert!(PersonalityService::validate_answers(&ok).is_ok());
        let bad: HashMap<String, i32> = [("a".to_string(), 6)].into_iter().collect();
        assert!(matches!(
            PersonalityService::validate_answers(&bad),
            Err(Error::BadRequest(_))
        ));
        let zero: HashMap<String, i32> = [("a".to_string(), 0)].into_iter().collect();
        assert!(PersonalityService::validate_answers(&zero).is_err());
    }
}
