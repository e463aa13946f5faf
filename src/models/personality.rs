use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityCategory {
    Cooperate,
    Responsibility,
    Leadership,
}

impl PersonalityCategory {
    /// Lookup order across collections; first match wins.
    pub const ALL: [PersonalityCategory; 3] = [
        PersonalityCategory::Cooperate,
        PersonalityCategory::Responsibility,
        PersonalityCategory::Leadership,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityCategory::Cooperate => "cooperate",
            PersonalityCategory::Responsibility => "responsibility",
            PersonalityCategory::Leadership => "leadership",
        }
    }

    /// Localized trait name used in level labels and generated questions.
    pub fn label(&self) -> &'static str {
        match self {
            PersonalityCategory::Cooperate => "cooperativeness",
            PersonalityCategory::Responsibility => "responsibility",
            PersonalityCategory::Leadership => "leadership",
        }
    }

    pub fn from_key(key: &str) -> Option<PersonalityCategory> {
        PersonalityCategory::ALL.into_iter().find(|c| c.as_str() == key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityQuestion {
    pub id: String,
    pub category: PersonalityCategory,
    pub content: String,
    #[serde(default)]
    pub reverse_scoring: bool,
}

/// Item as served to an applicant; the reverse flag stays server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityItem {
    pub id: String,
    pub category: PersonalityCategory,
    pub content: String,
}

impl From<&PersonalityQuestion> for PersonalityItem {
    fn from(q: &PersonalityQuestion) -> Self {
        Self {
            id: q.id.clone(),
            category: q.category,
            content: q.content.clone(),
        }
    }
}

/// The three personality collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalityBank {
    pub cooperate: Vec<PersonalityQuestion>,
    pub responsibility: Vec<PersonalityQuestion>,
    pub leadership: Vec<PersonalityQuestion>,
}

impl PersonalityBank {
    pub fn from_questions(questions: Vec<PersonalityQuestion>) -> Self {
        let mut bank = Self::default();
        for q in questions {
            match q.category {
                PersonalityCategory::Cooperate => bank.cooperate.push(q),
                PersonalityCategory::Responsibility => bank.responsibility.push(q),
                PersonalityCategory::Leadership => bank.leadership.push(q),
            }
        }
        bank
    }

    pub fn collection(&self, category: PersonalityCategory) -> &[PersonalityQuestion] {
        match category {
            PersonalityCategory::Cooperate => &self.cooperate,
            PersonalityCategory::Responsibility => &self.responsibility,
            PersonalityCategory::Leadership => &self.leadership,
        }
    }

    /// Tries each collection in `PersonalityCategory::ALL` order.
    pub fn find(&self, id: &str) -> Option<&PersonalityQuestion> {
        PersonalityCategory::ALL
            .iter()
            .find_map(|c| self.collection(*c).iter().find(|q| q.id == id))
    }

    pub fn len(&self) -> usize {
        self.cooperate.len() + self.responsibility.len() + self.leadership.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersonalityQuestion> {
        self.cooperate
            .iter()
            .chain(self.responsibility.iter())
            .chain(self.leadership.iter())
    }

    /// Logs ids that appear in more than one collection. Returns the
    /// offending ids; lookup behaviour is unchanged.
    pub fn audit(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for q in self.iter() {
            if !seen.insert(q.id.as_str()) {
                tracing::warn!(question_id = %q.id, "personality question id appears in several collections");
                duplicates.push(q.id.clone());
            }
        }
        duplicates
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityAnswerDetail {
    pub question_id: String,
    pub category: PersonalityCategory,
    pub content: String,
    pub selected_answer: i32,
    pub reverse_scoring: bool,
    pub final_score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub score: i32,
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityScoreSummary {
    pub cooperate: CategoryScore,
    pub responsibility: CategoryScore,
    pub leadership: CategoryScore,
    pub total: i32,
}

impl PersonalityScoreSummary {
    pub fn category(&self, category: PersonalityCategory) -> &CategoryScore {
        match category {
            PersonalityCategory::Cooperate => &self.cooperate,
            PersonalityCategory::Responsibility => &self.responsibility,
            PersonalityCategory::Leadership => &self.leadership,
        }
    }
}

/// Stored personality result for one applicant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityTestRecord {
    pub scores: PersonalityScoreSummary,
    pub details: Vec<PersonalityAnswerDetail>,
    pub submitted_at: DateTime<Utc>,
}
