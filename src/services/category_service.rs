use crate::models::question::{Question, TechCategory};
use crate::models::technical_result::{CategoryStat, GradedResult};
use std::collections::{BTreeMap, HashMap};

/// Bucket for results whose question is missing from the catalog.
pub const OTHER_CATEGORY: &str = "other";

/// Question id -> category, built from catalog entries.
pub type CategoryLookup = HashMap<String, TechCategory>;

pub struct CategoryService;

impl CategoryService {
    pub fn lookup(bank: &[Question]) -> CategoryLookup {
        bank.iter().map(|q| (q.id.clone(), q.category)).collect()
    }

    pub fn category_key(question_id: &str, lookup: &CategoryLookup) -> String {
        lookup
            .get(question_id)
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| OTHER_CATEGORY.to_string())
    }

    /// Per-category correct/total/percentage and average time. Unlike
    /// grading, unknown ids are kept under [`OTHER_CATEGORY`].
    pub fn aggregate(
        results: &[GradedResult],
        lookup: &CategoryLookup,
    ) -> BTreeMap<String, CategoryStat> {
        let mut time_totals: HashMap<String, i64> = HashMap::new();
        let mut stats: BTreeMap<String, CategoryStat> = BTreeMap::new();

        for r in results {
            let key = Self::category_key(&r.question_id, lookup);
            *time_totals.entry(key.clone()).or_insert(0) += r.time_spent as i64;
            let stat = stats.entry(key).or_default();
            stat.total += 1;
            if r.is_correct {
                stat.correct += 1;
            }
        }

        for (key, stat) in stats.iter_mut() {
            if stat.total > 0 {
                stat.percentage = stat.correct as f64 / stat.total as f64 * 100.0;
                let time = time_totals.get(key).copied().unwrap_or(0);
                stat.average_time = time as f64 / stat.total as f64;
            }
        }

        stats
    }
}
