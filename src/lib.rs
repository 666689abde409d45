//! # Scholarship Screening
//!
//! 根据申请人提交的收入证明和成绩单评估奖学金申请资格
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 临时文件、对象存储、决策记录存储
//! - `TransientDocument` - 临时文档的唯一持有者，Drop 时删除文件
//!
//! ### ② 客户端（Clients）
//! - `clients/` - 兼容 OpenAI API 的推理服务客户端
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个文档或单次评估
//! - `TextExtractor` - 纯文本 / PDF / OCR 提取
//! - `RuleRepository` - 读取资格规则
//! - `EvaluationRequestBuilder` - 构建评估指令
//! - `EvaluationEngine` - Mock / AI 两种评估引擎
//! - `classify` - 评估结果 → 申请状态
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一份申请"的完整处理流程
//! - `ApplicationCtx` - 上下文封装（request_id + applicant_id）
//! - `ApplicationFlow` - 流程编排（校验 → 提取 ∥ 规则 → 评估 → 分类）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理申请清单，控制并发
//! - `orchestrator/application_processor` - 暂存文档、调用流程、保存结果

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, EvaluatorKind};
pub use error::{AppError, AppResult};
pub use models::{
    ApplicationStatus, DecisionRecord, Document, EvaluationResult, ProcessingOutcome,
    ProcessingRequest,
};
pub use orchestrator::App;
pub use services::{AiEvaluator, EvaluationEngine, MockEvaluator};
pub use workflow::{ApplicationCtx, ApplicationFlow};
