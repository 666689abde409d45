//! 批量申请处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量申请的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、评估引擎、存储
//! 2. **批量加载**：扫描并加载所有待处理的申请清单
//! 3. **并发控制**：使用 Semaphore 限制同时处理的申请数量
//! 4. **取消处理**：Ctrl-C 时中止全部任务，临时文件随任务一起清理
//! 5. **全局统计**：汇总所有申请的处理结果

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::{JsonFileRecordStore, LocalObjectStore, ObjectStore, RecordStore};
use crate::models::ApplicationManifest;
use crate::orchestrator::application_processor::ApplicationProcessor;
use crate::utils::logging;
use crate::workflow::ApplicationFlow;

/// 应用主结构
pub struct App {
    config: Config,
    shared: Arc<Shared>,
}

/// 所有任务共享的只读资源
struct Shared {
    flow: ApplicationFlow,
    object_store: Box<dyn ObjectStore>,
    record_store: Box<dyn RecordStore>,
    staging_folder: PathBuf,
}

/// 处理统计
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub total: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(&config);

        let flow = ApplicationFlow::from_config(&config)?;
        let shared = Shared {
            flow,
            object_store: Box::new(LocalObjectStore::new(&config.object_store_root)),
            record_store: Box::new(JsonFileRecordStore::new(&config.output_folder)),
            staging_folder: PathBuf::from(&config.staging_folder),
        };

        Ok(Self {
            config,
            shared: Arc::new(shared),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        info!("\n📁 正在扫描待处理的申请...");
        let manifests = crate::models::load_all_manifests(&self.config.applications_folder).await?;

        if manifests.is_empty() {
            warn!("⚠️ 没有找到待处理的申请清单，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_applications_loaded(manifests.len(), self.config.max_concurrent_applications);

        let stats = self.process_all(manifests).await?;
        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.cancelled,
            stats.total,
            &self.config,
        );

        Ok(stats)
    }

    /// 并发处理全部申请
    async fn process_all(&self, manifests: Vec<ApplicationManifest>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_applications));
        let mut stats = ProcessingStats {
            total: manifests.len(),
            ..Default::default()
        };

        let mut handles = Vec::with_capacity(manifests.len());
        for (idx, manifest) in manifests.into_iter().enumerate() {
            let index = idx + 1;
            let semaphore = semaphore.clone();
            let shared = self.shared.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                let processor = ApplicationProcessor {
                    flow: &shared.flow,
                    object_store: shared.object_store.as_ref(),
                    record_store: shared.record_store.as_ref(),
                    staging_folder: &shared.staging_folder,
                };
                Some(processor.process(&manifest, index).await)
            });
            handles.push(handle);
        }

        let abort_handles: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();
        let all = join_all(handles);
        tokio::pin!(all);

        let results = tokio::select! {
            results = &mut all => results,
            _ = tokio::signal::ctrl_c() => {
                warn!("⚠️ 收到中断信号，正在取消全部任务...");
                for handle in &abort_handles {
                    handle.abort();
                }
                // 等待任务真正结束，临时文件在任务被丢弃时删除
                all.await
            }
        };

        for (idx, joined) in results.into_iter().enumerate() {
            match joined {
                Ok(Some(true)) => stats.success += 1,
                Ok(Some(false)) | Ok(None) => stats.failed += 1,
                Err(e) if e.is_cancelled() => stats.cancelled += 1,
                Err(e) => {
                    error!("[申请 {}] 任务执行失败: {}", idx + 1, e);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }
}
