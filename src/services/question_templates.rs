//! Static interview-question rules.
//!
//! Each pool is an ordered list of templates. A template fires when its
//! trigger holds for the applicant's results; its variables are then
//! substituted into `{{name}}` placeholders of the question and purpose.

use crate::models::applicant_results::{ApplicantResults, TechnicalSnapshot};
use crate::models::personality::PersonalityCategory;
use crate::models::question::TechCategory;
use crate::models::report::GeneratedQuestion;
use lazy_static::lazy_static;
use std::collections::BTreeMap;

pub type Variables = BTreeMap<String, String>;

type Trigger = Box<dyn Fn(&ApplicantResults) -> bool + Send + Sync>;
type Extractor = Box<dyn Fn(&ApplicantResults) -> Variables + Send + Sync>;
type RelatedIds = Box<dyn Fn(&ApplicantResults) -> Vec<String> + Send + Sync>;

pub const KIND_CONCEPT: &str = "concept";
pub const KIND_ADVANCED: &str = "advanced";
pub const KIND_REVIEW: &str = "review";
pub const KIND_PROBE: &str = "probe";
pub const KIND_IMPROVEMENT: &str = "improvement";
pub const KIND_EXPERIENCE: &str = "experience";
pub const KIND_FOLLOW_UP: &str = "follow_up";
pub const KIND_FALLBACK: &str = "fallback";

/// A correct answer at or under this many seconds counts as a fast solve.
pub const FAST_SOLVE_SECONDS: i32 = 3;
pub const LOW_TECHNICAL_PERCENTAGE: f64 = 50.0;
pub const STRONG_TECHNICAL_PERCENTAGE: f64 = 80.0;
pub const LOW_TRAIT_SCORE: i32 = 60;
pub const HIGH_TRAIT_SCORE: i32 = 80;

pub const GENERAL_CATEGORY: &str = "General";
pub const FOLLOW_UP_CATEGORY: &str = "Follow-up";

pub struct InterviewQuestionTemplate {
    pub category: String,
    pub question: &'static str,
    pub purpose: &'static str,
    pub kind: Option<&'static str>,
    pub based_on: Option<&'static str>,
    pub trigger: Trigger,
    pub variables: Extractor,
    pub related: Option<RelatedIds>,
}

/// Candidate phrasings for questions derived from a missed question's text.
pub struct KeywordTopic {
    pub keywords: &'static [&'static str],
    pub topic: &'static str,
    pub phrasings: &'static [&'static str],
}

fn vars<const N: usize>(pairs: [(&str, String); N]) -> Variables {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn technical(results: &ApplicantResults) -> Option<&TechnicalSnapshot> {
    results.technical.as_ref()
}

fn is_fast_solve(time_spent: i32, is_correct: bool) -> bool {
    // A missing time is recorded as 0 and is not a fast solve.
    is_correct && time_spent > 0 && time_spent <= FAST_SOLVE_SECONDS
}

pub fn technical_level(percentage: f64) -> &'static str {
    if percentage >= STRONG_TECHNICAL_PERCENTAGE {
        "strong"
    } else if percentage >= LOW_TECHNICAL_PERCENTAGE {
        "moderate"
    } else {
        "needs-improvement"
    }
}

fn concept_template(category: TechCategory) -> InterviewQuestionTemplate {
    let key = category.as_str();
    InterviewQuestionTemplate {
        category: category.label().to_string(),
        question: "You missed {{wrongCount}} of {{total}} {{category}} questions, including \"{{sampleQuestion}}\". Can you walk us through the underlying {{category}} concept in your own words?",
        purpose: "Check conceptual understanding of {{category}} after incorrect answers",
        kind: Some(KIND_CONCEPT),
        based_on: Some("incorrect_answers"),
        trigger: Box::new(move |r: &ApplicantResults| {
            technical(r).is_some_and(|t| t.in_category(key).any(|d| !d.is_correct))
        }),
        variables: Box::new(move |r: &ApplicantResults| {
            let Some(t) = technical(r) else {
                return Variables::new();
            };
            let in_category: Vec<_> = t.in_category(key).collect();
            let wrong: Vec<_> = in_category.iter().filter(|d| !d.is_correct).collect();
            let sample = wrong
                .iter()
                .find_map(|d| d.question.clone())
                .unwrap_or_else(|| "one of the test questions".to_string());
            vars([
                ("category", category.label().to_string()),
                ("wrongCount", wrong.len().to_string()),
                ("total", in_category.len().to_string()),
                ("sampleQuestion", sample),
            ])
        }),
        related: None,
    }
}

fn advanced_template(category: TechCategory) -> InterviewQuestionTemplate {
    let key = category.as_str();
    InterviewQuestionTemplate {
        category: category.label().to_string(),
        question: "You solved \"{{question}}\" in {{time}} seconds. Taking that {{category}} topic one level deeper, how would it behave in a production system under heavy load, and what would you monitor?",
        purpose: "Probe depth behind a very fast correct {{category}} answer",
        kind: Some(KIND_ADVANCED),
        based_on: Some("fast_correct_answers"),
        trigger: Box::new(move |r: &ApplicantResults| {
            technical(r).is_some_and(|t| {
                t.in_category(key)
                    .any(|d| is_fast_solve(d.time_spent, d.is_correct))
            })
        }),
        variables: Box::new(move |r: &ApplicantResults| {
            let fastest = technical(r).and_then(|t| {
                t.in_category(key)
                    .filter(|d| is_fast_solve(d.time_spent, d.is_correct))
                    .min_by_key(|d| d.time_spent)
            });
            match fastest {
                Some(d) => vars([
                    ("category", category.label().to_string()),
                    ("time", d.time_spent.to_string()),
                    (
                        "question",
                        d.question.clone().unwrap_or_else(|| d.question_id.clone()),
                    ),
                ]),
                None => Variables::new(),
            }
        }),
        related: Some(Box::new(move |r: &ApplicantResults| {
            let Some(t) = technical(r) else {
                return Vec::new();
            };
            let fastest = t
                .in_category(key)
                .filter(|d| is_fast_solve(d.time_spent, d.is_correct))
                .min_by_key(|d| d.time_spent)
                .map(|d| d.question_id.clone());
            t.in_category(key)
                .filter(|d| d.is_correct && Some(&d.question_id) != fastest.as_ref())
                .map(|d| d.question_id.clone())
                .collect()
        })),
    }
}

fn low_overall_template() -> InterviewQuestionTemplate {
    InterviewQuestionTemplate {
        category: GENERAL_CATEGORY.to_string(),
        question: "Your technical score was {{score}} out of {{maxScore}}. Which areas would you prioritise studying first, and how would you go about it?",
        purpose: "Understand self-assessment and learning plan after a low technical score",
        kind: Some(KIND_REVIEW),
        based_on: Some("total_score"),
        trigger: Box::new(|r: &ApplicantResults| {
            technical(r).is_some_and(|t| t.max_score > 0 && t.percentage() < LOW_TECHNICAL_PERCENTAGE)
        }),
        variables: Box::new(|r: &ApplicantResults| match technical(r) {
            Some(t) => vars([
                ("score", t.score.to_string()),
                ("maxScore", t.max_score.to_string()),
            ]),
            None => Variables::new(),
        }),
        related: None,
    }
}

fn extreme_response_template(category: PersonalityCategory) -> InterviewQuestionTemplate {
    let is_extreme = |answer: i32| answer == 1 || answer == 5;
    InterviewQuestionTemplate {
        category: category.label().to_string(),
        question: "You {{response}} with the statement \"{{statement}}\". Can you describe a concrete situation that shows this side of your {{trait}}?",
        purpose: "Verify an extreme self-rating on {{trait}} with real experience",
        kind: Some(KIND_PROBE),
        based_on: Some("extreme_responses"),
        trigger: Box::new(move |r: &ApplicantResults| {
            r.personality
                .as_ref()
                .is_some_and(|p| p.in_category(category).any(|d| is_extreme(d.selected_answer)))
        }),
        variables: Box::new(move |r: &ApplicantResults| {
            let first = r
                .personality
                .as_ref()
                .and_then(|p| p.in_category(category).find(|d| is_extreme(d.selected_answer)));
            match first {
                Some(d) => vars([
                    ("trait", category.label().to_string()),
                    ("statement", d.content.clone()),
                    (
                        "response",
                        if d.selected_answer == 5 {
                            "strongly agreed"
                        } else {
                            "strongly disagreed"
                        }
                        .to_string(),
                    ),
                ]),
                None => Variables::new(),
            }
        }),
        related: None,
    }
}

fn trait_score_template(
    category: PersonalityCategory,
    high: bool,
) -> InterviewQuestionTemplate {
    let (question, purpose, kind, based_on) = if high {
        (
            "Your {{trait}} score ({{score}}) stood out. Tell us about an experience where this strength changed the outcome for your team.",
            "Let the applicant elaborate on a strong {{trait}} result",
            KIND_EXPERIENCE,
            "high_category_score",
        )
    } else {
        (
            "Your {{trait}} score ({{score}}) was on the lower side. What have you done, or what would you do, to grow in this area?",
            "Explore awareness and improvement plans for {{trait}}",
            KIND_IMPROVEMENT,
            "low_category_score",
        )
    };
    InterviewQuestionTemplate {
        category: category.label().to_string(),
        question,
        purpose,
        kind: Some(kind),
        based_on: Some(based_on),
        trigger: Box::new(move |r: &ApplicantResults| {
            r.personality.as_ref().is_some_and(|p| {
                let answered = p.in_category(category).next().is_some();
                let score = p.scores.category(category).score;
                let crosses = if high {
                    score >= HIGH_TRAIT_SCORE
                } else {
                    score < LOW_TRAIT_SCORE
                };
                answered && crosses
            })
        }),
        variables: Box::new(move |r: &ApplicantResults| match r.personality.as_ref() {
            Some(p) => vars([
                ("trait", category.label().to_string()),
                ("score", p.scores.category(category).score.to_string()),
            ]),
            None => Variables::new(),
        }),
        related: None,
    }
}

fn technical_level_template() -> InterviewQuestionTemplate {
    InterviewQuestionTemplate {
        category: FOLLOW_UP_CATEGORY.to_string(),
        question: "Your overall technical result was {{techLevel}}. {{techFollowUp}}",
        purpose: "Connect the technical result to real experience",
        kind: Some(KIND_FOLLOW_UP),
        based_on: Some("total_score"),
        trigger: Box::new(|_: &ApplicantResults| true),
        variables: Box::new(|r: &ApplicantResults| {
            let (level, follow_up) = match technical(r) {
                Some(t) => {
                    let level = technical_level(t.percentage());
                    let follow_up = match level {
                        "strong" => "Which project best demonstrates that level, and what exactly was your role in it?",
                        "moderate" => "Which topic from the test would you explain differently now that you have had time to think about it?",
                        _ => "What concrete plan do you have to close the gaps you noticed during the test?",
                    };
                    (level, follow_up)
                }
                None => (
                    "not available",
                    "How would you describe your current technical strengths?",
                ),
            };
            vars([
                ("techLevel", level.to_string()),
                ("techFollowUp", follow_up.to_string()),
            ])
        }),
        related: None,
    }
}

fn trait_balance_template() -> InterviewQuestionTemplate {
    InterviewQuestionTemplate {
        category: FOLLOW_UP_CATEGORY.to_string(),
        question: "Your most pronounced trait appeared to be {{strongestTrait}} and the least pronounced {{weakestTrait}}. How do both show up in the way you work with a team?",
        purpose: "Relate the personality profile to day-to-day collaboration",
        kind: Some(KIND_FOLLOW_UP),
        based_on: Some("personality_profile"),
        trigger: Box::new(|r: &ApplicantResults| r.personality.is_some()),
        variables: Box::new(|r: &ApplicantResults| {
            let Some(p) = r.personality.as_ref() else {
                return Variables::new();
            };
            // Ties resolve to the earlier category.
            let strongest = PersonalityCategory::ALL
                .into_iter()
                .rev()
                .max_by_key(|c| p.scores.category(*c).score);
            let weakest = PersonalityCategory::ALL
                .into_iter()
                .min_by_key(|c| p.scores.category(*c).score);
            match (strongest, weakest) {
                (Some(s), Some(w)) => vars([
                    ("strongestTrait", s.label().to_string()),
                    ("weakestTrait", w.label().to_string()),
                ]),
                _ => Variables::new(),
            }
        }),
        related: None,
    }
}

fn motivation_template() -> InterviewQuestionTemplate {
    InterviewQuestionTemplate {
        category: FOLLOW_UP_CATEGORY.to_string(),
        question: "What motivated you to apply for this position, and what do you expect to learn in your first year?",
        purpose: "Assess motivation and expectations",
        kind: Some(KIND_FOLLOW_UP),
        based_on: None,
        trigger: Box::new(|_: &ApplicantResults| true),
        variables: Box::new(|_: &ApplicantResults| Variables::new()),
        related: None,
    }
}

lazy_static! {
    pub static ref TECHNICAL_TEMPLATES: Vec<InterviewQuestionTemplate> = {
        let mut templates: Vec<InterviewQuestionTemplate> = TechCategory::ALL
            .into_iter()
            .flat_map(|c| [concept_template(c), advanced_template(c)])
            .collect();
        templates.push(low_overall_template());
        templates
    };

    pub static ref PERSONALITY_TEMPLATES: Vec<InterviewQuestionTemplate> = PersonalityCategory::ALL
        .into_iter()
        .flat_map(|c| {
            [
                extreme_response_template(c),
                trait_score_template(c, false),
                trait_score_template(c, true),
            ]
        })
        .collect();

    pub static ref FOLLOW_UP_TEMPLATES: Vec<InterviewQuestionTemplate> = vec![
        technical_level_template(),
        trait_balance_template(),
        motivation_template(),
    ];
}

pub fn technical_fallback() -> GeneratedQuestion {
    GeneratedQuestion {
        category: GENERAL_CATEGORY.to_string(),
        question: "Tell us about the most technically challenging problem you have solved recently and how you approached it.".to_string(),
        purpose: "Assess general problem-solving ability".to_string(),
        kind: Some(KIND_FALLBACK.to_string()),
        based_on: None,
        related_questions: Vec::new(),
    }
}

pub fn personality_fallback() -> GeneratedQuestion {
    GeneratedQuestion {
        category: GENERAL_CATEGORY.to_string(),
        question: "Describe a time you had to work closely with a colleague whose working style was very different from yours. How did you handle it?".to_string(),
        purpose: "Assess collaboration and adaptability".to_string(),
        kind: Some(KIND_FALLBACK.to_string()),
        based_on: None,
        related_questions: Vec::new(),
    }
}

pub fn follow_up_fallback() -> GeneratedQuestion {
    GeneratedQuestion {
        category: FOLLOW_UP_CATEGORY.to_string(),
        question: "Is there anything about your test experience you would like to explain or add?".to_string(),
        purpose: "Give the applicant room to add context".to_string(),
        kind: Some(KIND_FALLBACK.to_string()),
        based_on: None,
        related_questions: Vec::new(),
    }
}

/// Used when a missed question's stored answer is a bare letter or gives
/// nothing to build on.
pub fn generic_pool(category: TechCategory) -> &'static [&'static str] {
    match category {
        TechCategory::Java => &[
            "How does the JVM manage memory, and when have you had to tune garbage collection?",
            "Explain the difference between an interface and an abstract class, and when you would choose each.",
            "How do you make a Java class safe to use from multiple threads?",
        ],
        TechCategory::Database => &[
            "How do you decide which columns to index in a new table?",
            "Explain transaction isolation levels and a bug each one prevents.",
            "When would you denormalize a schema, and what does it cost you?",
        ],
        TechCategory::OperatingSystem => &[
            "What happens during a context switch, and why is it expensive?",
            "Explain the difference between a process and a thread from the operating system's point of view.",
            "How does virtual memory let a program use more memory than is physically available?",
        ],
        TechCategory::Cloud => &[
            "How would you design a service to scale horizontally behind a load balancer?",
            "What are the trade-offs between containers and virtual machines?",
            "How do you keep cloud infrastructure costs under control as traffic grows?",
        ],
        TechCategory::Security => &[
            "How would you store user passwords, and why not with plain hashing?",
            "Explain how an SQL injection works and how you prevent it.",
            "What is the difference between authentication and authorization in a web application?",
        ],
        TechCategory::Network => &[
            "Walk us through what happens when you type a URL into a browser and press enter.",
            "Explain the difference between TCP and UDP and a use case for each.",
            "How does DNS resolution work, and what can go wrong with it?",
        ],
    }
}

/// Phrasing that quotes the missed question and its expected answer.
pub const ANSWER_BASED_QUESTION: &str = "One of the {{category}} questions you missed was \"{{question}}\", and the expected answer was \"{{answer}}\". Can you explain why that answer is correct?";

/// Matched in order against the lowercased question and answer text.
pub static KEYWORD_TOPICS: &[KeywordTopic] = &[
    KeywordTopic {
        keywords: &["트랜잭션", "transaction", "rollback", "롤백", "commit", "커밋", "acid"],
        topic: "transaction management",
        phrasings: &[
            "You missed a question on {{topic}}. How would you explain commit and rollback to a junior developer?",
            "Describe a case where a missing transaction boundary could corrupt data, and how you would prevent it.",
            "How do isolation levels change the behaviour of {{topic}} under concurrent load?",
        ],
    },
    KeywordTopic {
        keywords: &["인덱스", "db index", "database index", "indexing", "index scan", "covering index", "b-tree", "btree", "b+tree"],
        topic: "database indexing",
        phrasings: &[
            "You missed a question on {{topic}}. When does an index make a query slower instead of faster?",
            "How would you find out whether a slow query is missing an index?",
            "Explain how a B-tree index finds a row, step by step.",
        ],
    },
    KeywordTopic {
        keywords: &["정규화", "normalization", "normal form", "정규형"],
        topic: "schema normalization",
        phrasings: &[
            "You missed a question on {{topic}}. Walk us through normalizing a simple orders table.",
            "What anomalies does {{topic}} protect against?",
            "When have you deliberately broken a normal form, and why?",
        ],
    },
    KeywordTopic {
        keywords: &["교착", "데드락", "deadlock", "세마포어", "semaphore", "뮤텍스", "mutex", "race condition", "경쟁 상태"],
        topic: "concurrency and synchronization",
        phrasings: &[
            "You missed a question on {{topic}}. What four conditions must hold for a deadlock, and how do you break one?",
            "Explain the difference between a mutex and a semaphore with an example.",
            "How would you debug a race condition that only appears in production?",
        ],
    },
    KeywordTopic {
        keywords: &["스케줄링", "scheduling", "scheduler", "context switch", "컨텍스트 스위칭", "선점"],
        topic: "process scheduling",
        phrasings: &[
            "You missed a question on {{topic}}. Compare round-robin and priority scheduling.",
            "What causes starvation in a scheduler, and how is it avoided?",
            "Why is a context switch costly, and how can an application reduce them?",
        ],
    },
    KeywordTopic {
        keywords: &["페이징", "paging", "가상 메모리", "virtual memory", "page fault", "페이지 폴트", "세그먼테이션"],
        topic: "memory management",
        phrasings: &[
            "You missed a question on {{topic}}. What happens on a page fault?",
            "Explain how virtual memory isolates processes from each other.",
            "What is thrashing, and how would you recognise it on a server?",
        ],
    },
    KeywordTopic {
        keywords: &["가비지", "garbage collect", "garbage collector", "힙 메모리", "heap memory", "jvm"],
        topic: "JVM memory and garbage collection",
        phrasings: &[
            "You missed a question on {{topic}}. How do generational collectors decide what to collect?",
            "How would you investigate a Java service whose memory keeps growing?",
            "What is a stop-the-world pause, and how can you reduce its impact?",
        ],
    },
    KeywordTopic {
        keywords: &["상속", "inheritance", "다형성", "polymorphism", "캡슐화", "encapsulation", "오버라이딩", "overriding", "오버로딩", "overloading"],
        topic: "object-oriented design",
        phrasings: &[
            "You missed a question on {{topic}}. When would you prefer composition over inheritance?",
            "Explain the difference between overloading and overriding with an example.",
            "How does polymorphism help keep code open for extension?",
        ],
    },
    KeywordTopic {
        keywords: &["예외", "exception", "try-catch", "try catch", "checked", "unchecked"],
        topic: "exception handling",
        phrasings: &[
            "You missed a question on {{topic}}. When should an exception be checked versus unchecked?",
            "How do you avoid swallowing errors while keeping a service available?",
            "Describe your approach to logging and rethrowing exceptions across layers.",
        ],
    },
    KeywordTopic {
        keywords: &["tcp", "udp", "핸드셰이크", "handshake", "3-way", "혼잡 제어", "congestion"],
        topic: "transport protocols",
        phrasings: &[
            "You missed a question on {{topic}}. Walk us through the TCP three-way handshake.",
            "Why would a video call prefer UDP over TCP?",
            "How does TCP react to packet loss?",
        ],
    },
    KeywordTopic {
        keywords: &["http", "쿠키", "cookie", "세션", "session", "restful", "rest api", "상태 코드", "status code"],
        topic: "HTTP and web sessions",
        phrasings: &[
            "You missed a question on {{topic}}. How do cookies and server-side sessions differ?",
            "Explain what makes an HTTP API RESTful.",
            "Which HTTP status codes would you return for validation errors and for missing resources, and why?",
        ],
    },
    KeywordTopic {
        keywords: &["dns", "도메인", "domain name"],
        topic: "name resolution",
        phrasings: &[
            "You missed a question on {{topic}}. Walk us through a recursive DNS lookup.",
            "How does DNS caching affect a deployment that changes IP addresses?",
            "What record types would you configure for a new web service?",
        ],
    },
    KeywordTopic {
        keywords: &["암호화", "encryption", "대칭키", "공개키", "public key", "symmetric", "tls", "ssl", "해시 함수", "해싱", "hash function", "hashing"],
        topic: "cryptography",
        phrasings: &[
            "You missed a question on {{topic}}. When would you use symmetric versus asymmetric encryption?",
            "What does TLS actually protect, and what does it not?",
            "Why is hashing not the same as encryption?",
        ],
    },
    KeywordTopic {
        keywords: &["xss", "csrf", "sql injection", "인젝션", "injection", "취약점", "vulnerability"],
        topic: "web application vulnerabilities",
        phrasings: &[
            "You missed a question on {{topic}}. How do you defend a form against XSS and CSRF?",
            "Describe how you would review code for injection vulnerabilities.",
            "Which security headers would you add to a new web application, and why?",
        ],
    },
    KeywordTopic {
        keywords: &["오토스케일", "auto scaling", "autoscaling", "로드밸런서", "로드 밸런서", "load balancer", "scale out", "스케일 아웃"],
        topic: "cloud scaling",
        phrasings: &[
            "You missed a question on {{topic}}. How would you choose the metric that drives auto scaling?",
            "What has to be true of a service before it can scale out behind a load balancer?",
            "How do you handle sticky sessions when instances come and go?",
        ],
    },
    KeywordTopic {
        keywords: &["컨테이너", "container", "docker", "도커", "kubernetes", "쿠버네티스", "k8s"],
        topic: "containers and orchestration",
        phrasings: &[
            "You missed a question on {{topic}}. What problem does a container solve that a virtual machine does not?",
            "How does Kubernetes decide where to run a pod?",
            "How would you roll out a new container version without downtime?",
        ],
    },
];
