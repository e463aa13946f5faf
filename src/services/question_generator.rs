use crate::models::applicant_results::ApplicantResults;
use crate::models::question::TechCategory;
use crate::models::report::{GeneratedQuestion, InterviewQuestions};
use crate::models::technical_result::QuestionDetail;
use crate::services::question_templates::{
    follow_up_fallback, generic_pool, personality_fallback, technical_fallback,
    InterviewQuestionTemplate, KeywordTopic, Variables, ANSWER_BASED_QUESTION,
    FOLLOW_UP_TEMPLATES, KEYWORD_TOPICS, KIND_CONCEPT, PERSONALITY_TEMPLATES,
    TECHNICAL_TEMPLATES,
};
use crate::utils::normalize::is_bare_letter;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Upper bound on questions built from missed-question content.
pub const MAX_CONTENT_QUESTIONS: usize = 5;

/// Replaces every `{{key}}` with its value. Placeholders without a value are
/// left as they are.
pub fn render(template: &str, variables: &Variables) -> String {
    variables
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{{{}}}}}", key), value)
        })
}

pub fn match_topic(text: &str) -> Option<&'static KeywordTopic> {
    let haystack = text.to_lowercase();
    KEYWORD_TOPICS
        .iter()
        .find(|t| t.keywords.iter().any(|k| contains_keyword(&haystack, k)))
}

/// ASCII keywords must stand as whole words ("hash" does not match
/// "hashmap"). Korean keywords match anywhere.
fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    if !keyword.is_ascii() {
        return haystack.contains(keyword);
    }
    haystack.match_indices(keyword).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + keyword.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric())
            && !after.is_some_and(|c| c.is_ascii_alphanumeric())
    })
}

pub struct QuestionGenerator;

impl QuestionGenerator {
    /// Template-only generation. Deterministic for a given input.
    pub fn generate(results: &ApplicantResults) -> InterviewQuestions {
        Self::assemble(results, Vec::new())
    }

    /// Builds technical questions from the text of missed questions first,
    /// then runs the template pools. Concept-check templates are skipped for
    /// categories already covered by a content question.
    pub fn generate_with_content<R: Rng + ?Sized>(
        results: &ApplicantResults,
        rng: &mut R,
    ) -> InterviewQuestions {
        let content = Self::content_questions(results, rng);
        Self::assemble(results, content)
    }

    fn assemble(results: &ApplicantResults, content: Vec<GeneratedQuestion>) -> InterviewQuestions {
        let covered: HashSet<String> = content.iter().map(|q| q.category.clone()).collect();

        let mut technical = content;
        technical.extend(Self::run_pool(&TECHNICAL_TEMPLATES, results, |t| {
            t.kind == Some(KIND_CONCEPT) && covered.contains(&t.category)
        }));
        if technical.is_empty() {
            technical.push(technical_fallback());
        }

        let mut personality = Self::run_pool(&PERSONALITY_TEMPLATES, results, |_| false);
        if personality.is_empty() {
            personality.push(personality_fallback());
        }

        let mut follow_up = Self::run_pool(&FOLLOW_UP_TEMPLATES, results, |_| false);
        if follow_up.is_empty() {
            follow_up.push(follow_up_fallback());
        }

        InterviewQuestions {
            technical,
            personality,
            follow_up,
        }
    }

    pub fn run_pool(
        templates: &[InterviewQuestionTemplate],
        results: &ApplicantResults,
        skip: impl Fn(&InterviewQuestionTemplate) -> bool,
    ) -> Vec<GeneratedQuestion> {
        templates
            .iter()
            .filter(|t| !skip(t) && (t.trigger)(results))
            .map(|t| Self::render_template(t, results))
            .collect()
    }

    pub fn render_template(
        template: &InterviewQuestionTemplate,
        results: &ApplicantResults,
    ) -> GeneratedQuestion {
        let variables = (template.variables)(results);
        GeneratedQuestion {
            category: template.category.clone(),
            question: render(template.question, &variables),
            purpose: render(template.purpose, &variables),
            kind: template.kind.map(str::to_string),
            based_on: template.based_on.map(str::to_string),
            related_questions: template
                .related
                .as_ref()
                .map(|f| f(results))
                .unwrap_or_default(),
        }
    }

    fn content_questions<R: Rng + ?Sized>(
        results: &ApplicantResults,
        rng: &mut R,
    ) -> Vec<GeneratedQuestion> {
        let Some(technical) = results.technical.as_ref() else {
            return Vec::new();
        };

        technical
            .question_details
            .iter()
            .filter(|d| !d.is_correct && d.question.is_some())
            .filter_map(|d| {
                let category = TechCategory::from_key(&d.category)?;
                Some(Self::content_question(d, category, rng))
            })
            .take(MAX_CONTENT_QUESTIONS)
            .collect()
    }

    /// One question for a missed catalog question. Keyword topics win; a
    /// bare-letter answer falls back to the category's generic pool instead
    /// of being quoted.
    pub fn content_question<R: Rng + ?Sized>(
        detail: &QuestionDetail,
        category: TechCategory,
        rng: &mut R,
    ) -> GeneratedQuestion {
        let prompt = detail.question.clone().unwrap_or_default();
        let searchable = format!("{} {}", prompt, detail.correct_answer);

        let (question, purpose, kind) = if let Some(topic) = match_topic(&searchable) {
            let phrasing = topic.phrasings.choose(rng).copied().unwrap_or(topic.topic);
            let variables: Variables = [("topic".to_string(), topic.topic.to_string())].into();
            (
                render(phrasing, &variables),
                format!("Re-check {} after an incorrect answer", topic.topic),
                "keyword",
            )
        } else if is_bare_letter(&detail.correct_answer) {
            let pool = generic_pool(category);
            let phrasing = pool.choose(rng).copied().unwrap_or_default();
            (
                phrasing.to_string(),
                format!("General {} check after an incorrect answer", category.label()),
                "generic",
            )
        } else {
            let variables: Variables = [
                ("category".to_string(), category.label().to_string()),
                ("question".to_string(), prompt),
                ("answer".to_string(), detail.correct_answer.trim().to_string()),
            ]
            .into();
            (
                render(ANSWER_BASED_QUESTION, &variables),
                format!("Confirm understanding of a missed {} question", category.label()),
                "answer_review",
            )
        };

        GeneratedQuestion {
            category: category.label().to_string(),
            question,
            purpose,
            kind: Some(kind.to_string()),
            based_on: Some(detail.question_id.clone()),
            related_questions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::applicant_results::{PersonalitySnapshot, TechnicalSnapshot};
    use crate::models::personality::{
        CategoryScore, PersonalityAnswerDetail, PersonalityCategory, PersonalityScoreSummary,
    };
    use crate::services::question_templates::{generic_pool, KIND_ADVANCED, KIND_FALLBACK};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn detail(id: &str, category: &str, question: Option<&str>, answer: &str, correct: bool, time: i32) -> QuestionDetail {
        QuestionDetail {
            question_id: id.to_string(),
            category: category.to_string(),
            question_type: None,
            question: question.map(str::to_string),
            options: None,
            explanation: None,
            user_answer: "x".to_string(),
            correct_answer: answer.to_string(),
            is_correct: correct,
            time_spent: time,
        }
    }

    fn technical(details: Vec<QuestionDetail>) -> ApplicantResults {
        let score = details.iter().filter(|d| d.is_correct).count() as i32;
        ApplicantResults {
            technical: Some(TechnicalSnapshot {
                score,
                max_score: details.len() as i32,
                total_time: 0,
                category_scores: BTreeMap::new(),
                question_details: details,
            }),
            personality: None,
        }
    }

    fn category_score(score: i32) -> CategoryScore {
        CategoryScore {
            score,
            level: String::new(),
        }
    }

    #[test]
    fn test_render_substitutes_every_occurrence() {
        let vars: Variables = [("name".to_string(), "Kim".to_string())].into();
        assert_eq!(render("{{name}} and {{name}}", &vars), "Kim and Kim");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let template = "Hello {{name}}, score {{score}}";
        assert_eq!(render(template, &Variables::new()), template);
        let vars: Variables = [("name".to_string(), "Lee".to_string())].into();
        assert_eq!(render(template, &vars), "Hello Lee, score {{score}}");
    }

    #[test]
    fn test_every_pool_has_a_question_for_empty_results() {
        let questions = QuestionGenerator::generate(&ApplicantResults::default());
        assert_eq!(questions.technical.len(), 1);
        assert_eq!(questions.technical[0].kind.as_deref(), Some(KIND_FALLBACK));
        assert_eq!(questions.personality.len(), 1);
        assert_eq!(questions.personality[0].kind.as_deref(), Some(KIND_FALLBACK));
        assert!(!questions.follow_up.is_empty());
    }

    #[test]
    fn test_wrong_answer_triggers_concept_question() {
        let results = technical(vec![
            detail("d1", "database", Some("What does ACID stand for?"), "atomicity", false, 12),
            detail("j1", "java", Some("Which keyword?"), "A", true, 30),
        ]);
        let questions = QuestionGenerator::generate(&results);
        let concept = questions
            .technical
            .iter()
            .find(|q| q.kind.as_deref() == Some(KIND_CONCEPT))
            .expect("concept question");
        assert_eq!(concept.category, "Database");
        assert!(concept.question.contains("You missed 1 of 1 Database questions"));
        assert!(concept.question.contains("What does ACID stand for?"));
        assert!(!concept.question.contains("{{"));
    }

    #[test]
    fn test_fast_correct_answer_triggers_advanced_with_related() {
        let results = technical(vec![
            detail("n1", "network", Some("TCP or UDP?"), "TCP", true, 2),
            detail("n2", "network", Some("Port of HTTPS?"), "443", true, 40),
            detail("n3", "network", Some("DNS record for mail?"), "MX", false, 20),
        ]);
        let questions = QuestionGenerator::generate(&results);
        let advanced = questions
            .technical
            .iter()
            .find(|q| q.kind.as_deref() == Some(KIND_ADVANCED))
            .expect("advanced question");
        assert!(advanced.question.contains("in 2 seconds"));
        assert_eq!(advanced.related_questions, vec!["n2".to_string()]);
    }

    #[test]
    fn test_missing_time_is_not_fast() {
        let results = technical(vec![detail("c1", "cloud", Some("Q"), "A", true, 0)]);
        let questions = QuestionGenerator::generate(&results);
        assert!(questions
            .technical
            .iter()
            .all(|q| q.kind.as_deref() != Some(KIND_ADVANCED)));
    }

    #[test]
    fn test_personality_rules() {
        let results = ApplicantResults {
            technical: None,
            personality: Some(PersonalitySnapshot {
                scores: PersonalityScoreSummary {
                    cooperate: category_score(90),
                    responsibility: category_score(70),
                    leadership: category_score(40),
                    total: 200,
                },
                question_details: vec![
                    PersonalityAnswerDetail {
                        question_id: "c1".into(),
                        category: PersonalityCategory::Cooperate,
                        content: "I enjoy group work".into(),
                        selected_answer: 5,
                        reverse_scoring: false,
                        final_score: 5,
                    },
                    PersonalityAnswerDetail {
                        question_id: "l1".into(),
                        category: PersonalityCategory::Leadership,
                        content: "I like to lead".into(),
                        selected_answer: 2,
                        reverse_scoring: false,
                        final_score: 2,
                    },
                    PersonalityAnswerDetail {
                        question_id: "r1".into(),
                        category: PersonalityCategory::Responsibility,
                        content: "I meet deadlines".into(),
                        selected_answer: 3,
                        reverse_scoring: false,
                        final_score: 3,
                    },
                ],
            }),
        };

        let questions = QuestionGenerator::generate(&results);
        let kinds: Vec<_> = questions
            .personality
            .iter()
            .map(|q| (q.category.as_str(), q.kind.as_deref().unwrap_or_default()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("cooperativeness", "probe"),
                ("cooperativeness", "experience"),
                ("leadership", "improvement"),
            ]
        );
        assert!(questions.personality[0].question.contains("strongly agreed"));
        assert!(questions.personality[0].question.contains("I enjoy group work"));
        let balance = questions
            .follow_up
            .iter()
            .find(|q| q.based_on.as_deref() == Some("personality_profile"))
            .unwrap();
        assert!(balance.question.contains("cooperativeness"));
        assert!(balance.question.contains("least pronounced leadership"));
    }

    #[test]
    fn test_follow_up_phrasing_depends_on_level() {
        let strong = technical(vec![detail("j1", "java", Some("Q"), "A", true, 10)]);
        let weak = technical(vec![detail("j1", "java", Some("Q"), "A", false, 10)]);
        let s = QuestionGenerator::generate(&strong).follow_up[0].question.clone();
        let w = QuestionGenerator::generate(&weak).follow_up[0].question.clone();
        assert!(s.contains("was strong"));
        assert!(w.contains("was needs-improvement"));
        assert_ne!(s, w);
    }

    #[test]
    fn test_content_question_uses_keyword_topic() {
        let mut rng = StdRng::seed_from_u64(7);
        let d = detail("d9", "database", Some("트랜잭션 격리 수준 중 가장 높은 것은?"), "SERIALIZABLE", false, 5);
        let q = QuestionGenerator::content_question(&d, TechCategory::Database, &mut rng);
        assert_eq!(q.kind.as_deref(), Some("keyword"));
        assert_eq!(q.based_on.as_deref(), Some("d9"));
        let topic = match_topic("rollback").unwrap();
        assert!(topic
            .phrasings
            .iter()
            .any(|p| render(p, &[("topic".to_string(), topic.topic.to_string())].into()) == q.question));
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        assert!(match_topic("How does a HashMap resolve collisions?").is_none());
        assert!(match_topic("What causes an ArrayIndexOutOfBoundsException?").is_none());
        assert_eq!(
            match_topic("Why is a salted hash function used for passwords?").map(|t| t.topic),
            Some("cryptography")
        );
        assert_eq!(
            match_topic("When does a database index slow down writes?").map(|t| t.topic),
            Some("database indexing")
        );
        assert_eq!(
            match_topic("TCP와 UDP의 차이는?").map(|t| t.topic),
            Some("transport protocols")
        );
    }

    #[test]
    fn test_bare_letter_answer_uses_generic_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let d = detail("s1", "security", Some("Pick the odd one out"), "B", false, 5);
        let q = QuestionGenerator::content_question(&d, TechCategory::Security, &mut rng);
        assert_eq!(q.kind.as_deref(), Some("generic"));
        assert!(generic_pool(TechCategory::Security).contains(&q.question.as_str()));
        assert!(!q.question.contains("\"B\""));
    }

    #[test]
    fn test_plain_answer_is_quoted() {
        let mut rng = StdRng::seed_from_u64(3);
        let d = detail("o1", "operating_system", Some("Which structure holds runnable work?"), "ready queue", false, 5);
        let q = QuestionGenerator::content_question(&d, TechCategory::OperatingSystem, &mut rng);
        assert_eq!(q.kind.as_deref(), Some("answer_review"));
        assert!(q.question.contains("\"ready queue\""));
        assert!(q.question.contains("Operating System"));
    }

    #[test]
    fn test_content_questions_replace_concept_templates() {
        let mut rng = StdRng::seed_from_u64(11);
        let results = technical(vec![
            detail("d1", "database", Some("What does a rollback undo?"), "uncommitted changes", false, 8),
            detail("x1", "other", None, "?", false, 8),
            detail("j1", "java", None, "A", false, 8),
        ]);
        let questions = QuestionGenerator::generate_with_content(&results, &mut rng);
        let database: Vec<_> = questions
            .technical
            .iter()
            .filter(|q| q.category == "Database")
            .collect();
        assert_eq!(database.len(), 1);
        assert_eq!(database[0].kind.as_deref(), Some("keyword"));
        // Java has no prompt text, so its concept template still fires.
        assert!(questions
            .technical
            .iter()
            .any(|q| q.category == "Java" && q.kind.as_deref() == Some(KIND_CONCEPT)));
    }
}
