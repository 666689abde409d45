//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ApplicationManifest>)
//!     ↓
//! application_processor (暂存文档、保存结果)
//!     ↓
//! workflow::ApplicationFlow (处理单个申请)
//!     ↓
//! services (能力层：提取 / 规则 / 评估 / 分类)
//!     ↓
//! infrastructure (临时文件 / 对象存储 / 记录存储)
//! ```
//!
//! 编排层只做调度和统计，不做具体业务判断

pub mod application_processor;
pub mod batch_processor;

pub use application_processor::ApplicationProcessor;
pub use batch_processor::{App, ProcessingStats};
