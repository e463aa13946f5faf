use crate::models::question::{Question, QuestionDetails};
use crate::models::technical_result::{GradedResult, TechnicalSubmission, TechnicalTestRecord};
use crate::utils::normalize::{choice_token, normalize};
use chrono::Utc;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub results: Vec<GradedResult>,
    pub score: i32,
    pub max_score: i32,
}

pub struct GradingService;

impl GradingService {
    /// Grades a submission against the question bank of the test instance.
    ///
    /// Iteration is driven by the bank: a bank question with no submitted
    /// answer is graded with an empty answer and counts as wrong. Submitted
    /// ids that are not in the bank contribute nothing. `max_score` is the
    /// number of distinct questions in the bank.
    pub fn grade(submission: &TechnicalSubmission, bank: &[Question]) -> GradeOutcome {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut results = Vec::with_capacity(bank.len());

        for q in bank {
            if !seen.insert(q.id.as_str()) {
                tracing::warn!(question_id = %q.id, "duplicate question in bank, graded once");
                continue;
            }

            let user_answer = submission.answers.get(&q.id).cloned().unwrap_or_default();
            let time_spent = submission.question_times.get(&q.id).copied().unwrap_or(0);
            let is_correct = Self::is_correct(q, &user_answer);

            results.push(GradedResult {
                question_id: q.id.clone(),
                user_answer,
                correct_answer: q.correct_answer_text(),
                is_correct,
                time_spent,
            });
        }

        for id in submission.answers.keys() {
            if !seen.contains(id.as_str()) {
                tracing::warn!(question_id = %id, "submitted answer has no catalog entry, dropped");
            }
        }

        let score = results.iter().filter(|r| r.is_correct).count() as i32;
        let max_score = results.len() as i32;

        GradeOutcome {
            results,
            score,
            max_score,
        }
    }

    pub fn is_correct(question: &Question, user_answer: &str) -> bool {
        match &question.details {
            QuestionDetails::MultipleChoice(mc) => {
                let given = choice_token(user_answer);
                !given.is_empty() && given == choice_token(&mc.correct_answer)
            }
            QuestionDetails::ShortAnswer(sa) => {
                let given = normalize(user_answer);
                !given.is_empty() && sa.correct_answers.iter().any(|a| normalize(a) == given)
            }
        }
    }

    pub fn to_record(outcome: GradeOutcome, total_time: i32) -> TechnicalTestRecord {
        TechnicalTestRecord {
            results: outcome.results,
            score: outcome.score,
            max_score: outcome.max_score,
            total_time,
            submitted_at: Utc::now(),
        }
    }
}
