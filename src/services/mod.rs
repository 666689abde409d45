pub mod ai_evaluator;
pub mod classifier;
pub mod evaluation_engine;
pub mod mock_evaluator;
pub mod request_builder;
pub mod rule_repository;
pub mod text_extractor;

pub use ai_evaluator::{parse_evaluation, AiEvaluator};
pub use classifier::{classify, CONFIDENCE_THRESHOLD};
pub use evaluation_engine::{build_engine, EvaluationEngine};
pub use mock_evaluator::MockEvaluator;
pub use request_builder::{EvaluationRequest, EvaluationRequestBuilder};
pub use rule_repository::{InMemoryRuleRepository, RuleRepository, TomlRuleRepository};
pub use text_extractor::{DocumentExtractor, TextExtractor};
