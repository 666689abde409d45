//! 规则仓库 - 业务能力层
//!
//! 只负责"读出全部资格规则"，不缓存、不注入默认值

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{load_rule_rows, RuleRow, RuleSet};

/// 规则仓库
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// 读取全部规则；每次调用都重新读取存储
    async fn load_all(&self) -> AppResult<RuleSet>;
}

/// 以 TOML 文件为存储的规则仓库
pub struct TomlRuleRepository {
    path: PathBuf,
}

impl TomlRuleRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.rules_file)
    }
}

#[async_trait]
impl RuleRepository for TomlRuleRepository {
    async fn load_all(&self) -> AppResult<RuleSet> {
        let rows = load_rule_rows(&self.path).await?;
        debug!("读取规则 {} 行: {}", rows.len(), self.path.display());
        Ok(RuleSet::from_rows(rows))
    }
}

/// 内存中的规则仓库
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuleRepository {
    rows: Vec<RuleRow>,
}

impl InMemoryRuleRepository {
    pub fn new(rows: Vec<RuleRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn load_all(&self) -> AppResult<RuleSet> {
        Ok(RuleSet::from_rows(self.rows.iter().cloned()))
    }
}
