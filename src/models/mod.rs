pub mod application;
pub mod document;
pub mod evaluation;
pub mod income;
pub mod loaders;
pub mod record;
pub mod rules;
pub mod status;

pub use application::{ApplicationManifest, ApplicationMode, ProcessingRequest};
pub use document::{Document, DocumentKind, ACCEPTED_EXTENSIONS, MAX_DOCUMENT_BYTES};
pub use evaluation::{
    CriteriaEvaluation, CriterionCheck, EvaluationResult, ExtractedData, IncomeCheck, OcrQuality,
};
pub use income::IncomeVerificationContext;
pub use loaders::{load_all_manifests, load_manifest, load_rule_rows};
pub use record::{DecisionRecord, Evaluation, ProcessingOutcome};
pub use rules::{RuleRow, RuleSet, Thresholds};
pub use status::ApplicationStatus;
