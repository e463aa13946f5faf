use crate::error::Result;
use crate::models::personality::{PersonalityBank, PersonalityCategory, PersonalityQuestion};
use crate::models::question::Question;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgPool};
use std::collections::{BTreeMap, HashMap};

/// Read access to the question catalog. These lookups are the only
/// suspension points of grading and scoring.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionCatalog: Send + Sync {
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Question>>;

    /// Draws up to `count` questions spread across categories.
    async fn sample(&self, count: usize) -> Result<Vec<Question>>;

    async fn personality_bank(&self) -> Result<PersonalityBank>;

    async fn find_personality_by_ids(&self, ids: &[String]) -> Result<PersonalityBank>;
}

/// Round-robin over shuffled categories so a short draw still touches every
/// category. `entries` are `(id, category)` pairs.
pub fn spread_sample<R: Rng + ?Sized>(
    entries: Vec<(String, String)>,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (id, category) in entries {
        groups.entry(category).or_default().push(id);
    }
    for ids in groups.values_mut() {
        ids.shuffle(rng);
    }

    let mut queues: Vec<_> = groups.into_values().map(Vec::into_iter).collect();
    let mut chosen = Vec::with_capacity(count);
    while chosen.len() < count {
        let before = chosen.len();
        for queue in queues.iter_mut() {
            if chosen.len() == count {
                break;
            }
            if let Some(id) = queue.next() {
                chosen.push(id);
            }
        }
        if chosen.len() == before {
            break;
        }
    }

    chosen.shuffle(rng);
    chosen
}

#[derive(Debug, FromRow)]
struct PersonalityRow {
    id: String,
    category: String,
    content: String,
    reverse_scoring: bool,
}

impl PersonalityRow {
    fn into_question(self) -> Option<PersonalityQuestion> {
        let Some(category) = PersonalityCategory::from_key(&self.category) else {
            tracing::warn!(question_id = %self.id, category = %self.category, "unknown personality category, skipped");
            return None;
        };
        Some(PersonalityQuestion {
            id: self.id,
            category,
            content: self.content,
            reverse_scoring: self.reverse_scoring,
        })
    }
}

#[derive(Clone)]
pub struct PgQuestionCatalog {
    pool: PgPool,
}

impl PgQuestionCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn decode_questions(rows: Vec<(String, JsonValue)>) -> Vec<Question> {
        rows.into_iter()
            .filter_map(|(id, document)| match serde_json::from_value::<Question>(document) {
                Ok(q) => {
                    q.audit();
                    Some(q)
                }
                Err(e) => {
                    tracing::warn!(question_id = %id, error = %e, "malformed catalog question, skipped");
                    None
                }
            })
            .collect()
    }

    fn bank_from_rows(rows: Vec<PersonalityRow>) -> PersonalityBank {
        let bank = PersonalityBank::from_questions(
            rows.into_iter().filter_map(PersonalityRow::into_question).collect(),
        );
        bank.audit();
        bank
    }
}

#[async_trait]
impl QuestionCatalog for PgQuestionCatalog {
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Question>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<(String, JsonValue)> = sqlx::query_as(
            r#"
            SELECT id, document
            FROM technical_questions
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let questions = Self::decode_questions(rows);
        if questions.len() < ids.len() {
            tracing::warn!(
                requested = ids.len(),
                found = questions.len(),
                "some technical question ids are not in the catalog"
            );
        }
        Ok(questions)
    }

    async fn sample(&self, count: usize) -> Result<Vec<Question>> {
        let entries: Vec<(String, String)> =
            sqlx::query_as("SELECT id, category FROM technical_questions")
                .fetch_all(&self.pool)
                .await?;

        let chosen = {
            let mut rng = rand::thread_rng();
            spread_sample(entries, count, &mut rng)
        };
        let position: HashMap<&str, usize> = chosen
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut questions = self.find_by_ids(&chosen).await?;
        questions.sort_by_key(|q| position.get(q.id.as_str()).copied().unwrap_or(usize::MAX));
        Ok(questions)
    }

    async fn personality_bank(&self) -> Result<PersonalityBank> {
        let rows: Vec<PersonalityRow> = sqlx::query_as(
            r#"
            SELECT id, category, content, reverse_scoring
            FROM personality_questions
            ORDER BY position, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(Self::bank_from_rows(rows))
    }

    async fn find_personality_by_ids(&self, ids: &[String]) -> Result<PersonalityBank> {
        if ids.is_empty() {
            return Ok(PersonalityBank::default());
        }
        let rows: Vec<PersonalityRow> = sqlx::query_as(
            r#"
            SELECT id, category, content, reverse_scoring
            FROM personality_questions
            WHERE id = ANY($1)
            ORDER BY position, id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(Self::bank_from_rows(rows))
    }
}
