use crate::error::RuleLoadError;
use crate::models::application::ApplicationManifest;
use crate::models::rules::RuleRow;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 规则文件结构：由若干 `[[rule]]` 行组成
#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rule: Vec<RuleRow>,
}

/// 从 TOML 文件读取全部规则行（保持文件中的顺序）
pub async fn load_rule_rows(rules_file_path: &Path) -> Result<Vec<RuleRow>, RuleLoadError> {
    let location = rules_file_path.display().to_string();

    let content = fs::read_to_string(rules_file_path)
        .await
        .map_err(|source| RuleLoadError::Unreachable {
            location: location.clone(),
            source,
        })?;

    let file: RulesFile =
        toml::from_str(&content).map_err(|source| RuleLoadError::Malformed { location, source })?;

    Ok(file.rule)
}

/// 从 TOML 文件加载单个申请清单
pub async fn load_manifest(manifest_path: &Path) -> Result<ApplicationManifest> {
    let content = fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("无法读取申请清单: {}", manifest_path.display()))?;

    let mut manifest: ApplicationManifest = toml::from_str(&content)
        .with_context(|| format!("无法解析申请清单: {}", manifest_path.display()))?;

    // 清单中的相对路径以清单所在目录为基准
    if let Some(base) = manifest_path.parent() {
        for path in [
            &mut manifest.document,
            &mut manifest.mother_certificate,
            &mut manifest.father_certificate,
            &mut manifest.report_card,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    manifest.file_path = Some(manifest_path.to_path_buf());

    Ok(manifest)
}

/// 从文件夹中加载所有申请清单，解析失败的文件跳过并记录警告
pub async fn load_all_manifests(folder_path: &str) -> Result<Vec<ApplicationManifest>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut manifest_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            manifest_files.push(path);
        }
    }
    manifest_files.sort();

    let mut manifests = Vec::new();
    for path in manifest_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_manifest(&path).await {
            Ok(manifest) => manifests.push(manifest),
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_rule_rows_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        fs::write(
            &path,
            r#"
            [[rule]]
            rule_key = "max_gwa"
            rule_value = "2.5"

            [[rule]]
            rule_key = "max_monthly_income"
            rule_value = 30000
            description = "Household monthly income ceiling"

            [[rule]]
            rule_key = "max_gwa"
            rule_value = 3.0
            "#,
        )
        .await
        .unwrap();

        let rows = load_rule_rows(&path).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].rule_key, "max_gwa");
        assert_eq!(rows[1].description, "Household monthly income ceiling");
    }

    #[tokio::test]
    async fn test_load_rule_rows_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_rule_rows(&dir.path().join("absent.toml")).await;
        assert!(matches!(result, Err(RuleLoadError::Unreachable { .. })));
    }

    #[tokio::test]
    async fn test_load_rule_rows_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        fs::write(&path, "[[rule]]\nrule_key = \n").await.unwrap();
        let result = load_rule_rows(&path).await;
        assert!(matches!(result, Err(RuleLoadError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_manifest_relative_paths_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a-001.toml");
        fs::write(
            &path,
            r#"
            applicant_id = "A-001"
            mode = "simple"
            document = "docs/report.txt"
            "#,
        )
        .await
        .unwrap();

        let manifest = load_manifest(&path).await.unwrap();
        assert_eq!(
            manifest.document.unwrap(),
            dir.path().join("docs/report.txt")
        );
        assert_eq!(manifest.file_path.unwrap(), path);
    }

    #[tokio::test]
    async fn test_load_all_manifests_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("good.toml"),
            "applicant_id = \"A\"\nmode = \"simple\"\ndocument = \"a.txt\"\n",
        )
        .await
        .unwrap();
        fs::write(dir.path().join("broken.toml"), "applicant_id = ")
            .await
            .unwrap();
        fs::write(
            dir.path().join("unknown-mode.toml"),
            "applicant_id = \"B\"\nmode = \"full\"\ndocument = \"b.txt\"\n",
        )
        .await
        .unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").await.unwrap();

        let manifests = load_all_manifests(&dir.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].applicant_id, "A");
    }
}
