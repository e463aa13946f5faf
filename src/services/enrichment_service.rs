use crate::models::applicant_results::{ApplicantResults, PersonalitySnapshot, TechnicalSnapshot};
use crate::models::personality::PersonalityTestRecord;
use crate::models::question::Question;
use crate::models::technical_result::{QuestionDetail, TechnicalTestRecord};
use crate::services::category_service::{CategoryService, OTHER_CATEGORY};
use std::collections::HashMap;

pub struct EnrichmentService;

impl EnrichmentService {
    /// Joins graded results with catalog metadata for presentation.
    pub fn technical_details(record: &TechnicalTestRecord, bank: &[Question]) -> Vec<QuestionDetail> {
        let by_id: HashMap<&str, &Question> = bank.iter().map(|q| (q.id.as_str(), q)).collect();

        record
            .results
            .iter()
            .map(|r| match by_id.get(r.question_id.as_str()) {
                Some(q) => QuestionDetail {
                    question_id: r.question_id.clone(),
                    category: q.category.as_str().to_string(),
                    question_type: Some(q.question_type),
                    question: Some(q.question.clone()),
                    options: q.options().map(|o| o.to_vec()),
                    explanation: q.explanation.clone(),
                    user_answer: r.user_answer.clone(),
                    correct_answer: r.correct_answer.clone(),
                    is_correct: r.is_correct,
                    time_spent: r.time_spent,
                },
                None => QuestionDetail {
                    question_id: r.question_id.clone(),
                    category: OTHER_CATEGORY.to_string(),
                    question_type: None,
                    question: None,
                    options: None,
                    explanation: None,
                    user_answer: r.user_answer.clone(),
                    correct_answer: r.correct_answer.clone(),
                    is_correct: r.is_correct,
                    time_spent: r.time_spent,
                },
            })
            .collect()
    }

    pub fn technical_snapshot(record: &TechnicalTestRecord, bank: &[Question]) -> TechnicalSnapshot {
        let lookup = CategoryService::lookup(bank);
        TechnicalSnapshot {
            score: record.score,
            max_score: record.max_score,
            total_time: record.total_time,
            category_scores: CategoryService::aggregate(&record.results, &lookup),
            question_details: Self::technical_details(record, bank),
        }
    }

    pub fn assemble(
        technical: Option<&TechnicalTestRecord>,
        personality: Option<&PersonalityTestRecord>,
        bank: &[Question],
    ) -> ApplicantResults {
        ApplicantResults {
            technical: technical.map(|r| Self::technical_snapshot(r, bank)),
            personality: personality.map(|p| PersonalitySnapshot {
                scores: p.scores.clone(),
                question_details: p.details.clone(),
            }),
        }
    }
}
