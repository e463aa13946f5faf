pub mod ai_service;
pub mod catalog_service;
pub mod category_service;
pub mod enrichment_service;
pub mod grading_service;
pub mod personality_service;
pub mod question_generator;
pub mod question_templates;
pub mod report_parser;
pub mod report_service;
pub mod store_service;
pub mod test_service;
