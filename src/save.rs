/*
 * PixelPal - 状态持久化
 * 开发心理过程:
 * 1. 存档是带版本号的JSON包裹，核心状态原样嵌入
 * 2. 读档永不失败：文件缺失或损坏都降级为全新默认状态
 * 3. 读入时做一次清洗：集合去重（保持首次出现顺序）、补齐缺失键
 * 4. 写档先建目录再整体覆盖，save_count记录写入次数
 */

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Serialize, Deserialize};

use crate::core::config::CompanionConfig;
use crate::core::error::Result;
use crate::evolution::state::{CompanionState, DriftCategory, EvolutionVar, PersonalityTrait};

pub const SAVE_VERSION: u32 = 1;

/// 存档文件结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub last_saved: DateTime<Utc>,
    #[serde(default)]
    pub save_count: u64,
    pub state: CompanionState,
}

/// 默认存档路径：<数据目录>/pixelpal/state.json
pub fn default_save_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pixelpal")
        .join("state.json")
}

/// 去重集合、补齐缺失的固定键（旧存档或手工编辑过的文件）
fn normalize_state(mut state: CompanionState, config: &CompanionConfig) -> CompanionState {
    let mut seen = BTreeSet::new();
    state.mutations.retain(|id| seen.insert(id.clone()));
    let mut seen = BTreeSet::new();
    state.evolution_triggers.retain(|id| seen.insert(id.clone()));

    for var in EvolutionVar::ALL {
        state
            .evolution_vars
            .entry(var)
            .or_insert_with(|| config.evolution.defaults.get(&var).copied().unwrap_or(5.0));
    }
    for t in PersonalityTrait::ALL {
        state
            .personality_traits
            .entry(t)
            .or_insert_with(|| config.personality.defaults.get(&t).copied().unwrap_or(5.0));
    }
    for category in DriftCategory::ALL {
        state.personality_drift.entry(category).or_insert(0.0);
    }

    state
}

/// 读取存档；缺失或损坏时返回全新默认状态
pub fn load_state<P: AsRef<Path>>(path: P, config: &CompanionConfig) -> CompanionState {
    let path = path.as_ref();

    if !path.exists() {
        info!("未找到存档，创建全新伙伴: {}", path.display());
        return CompanionState::new(config);
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) => {
            warn!("存档无法读取，使用默认状态: {}", error);
            return CompanionState::new(config);
        }
    };

    match serde_json::from_str::<SaveFile>(&content) {
        Ok(save) => {
            if save.version != SAVE_VERSION {
                warn!("存档版本 {} 与当前版本 {} 不一致", save.version, SAVE_VERSION);
            }
            debug!("读取存档成功 (写入次数 {})", save.save_count);
            normalize_state(save.state, config)
        }
        Err(error) => {
            warn!("存档已损坏，使用默认状态: {}", error);
            CompanionState::new(config)
        }
    }
}

/// 写入存档，save_count在既有存档基础上递增
pub fn save_state<P: AsRef<Path>>(state: &CompanionState, path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let save_count = std::fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str::<SaveFile>(&content).ok())
        .map(|save| save.save_count)
        .unwrap_or(0)
        + 1;

    let save = SaveFile {
        version: SAVE_VERSION,
        last_saved: Utc::now(),
        save_count,
        state: state.clone(),
    };

    let json = serde_json::to_string_pretty(&save)?;
    std::fs::write(path, json)?;

    debug!("存档写入成功: {} (第{}次)", path.display(), save_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let config = CompanionConfig::default();

        let mut state = CompanionState::new(&config);
        state.mutations.push("night_owl".to_string());
        state.activity_counters.insert("passed_lab".to_string(), 4);

        save_state(&state, &path).unwrap();
        let restored = load_state(&path, &config);

        assert_eq!(restored, state);
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = CompanionConfig::default();

        let state = load_state(dir.path().join("nope.json"), &config);

        assert!(state.mutations.is_empty());
        assert_eq!(state.total_activity(), 0);
    }

    #[test]
    fn test_corrupted_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not valid json!").unwrap();
        let config = CompanionConfig::default();

        let state = load_state(&path, &config);

        assert!(state.mutations.is_empty());
        assert_eq!(state.total_activity(), 0);
    }

    #[test]
    fn test_load_deduplicates_and_fills_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let config = CompanionConfig::default();

        let mut state = CompanionState::new(&config);
        state.mutations = vec![
            "night_owl".to_string(),
            "third_eye".to_string(),
            "night_owl".to_string(),
        ];
        state.evolution_triggers = vec!["scholar".to_string(), "scholar".to_string()];
        state.evolution_vars.remove(&EvolutionVar::Empathy);
        save_state(&state, &path).unwrap();

        let restored = load_state(&path, &config);

        assert_eq!(restored.mutations, vec!["night_owl", "third_eye"]);
        assert_eq!(restored.evolution_triggers, vec!["scholar"]);
        assert_eq!(restored.evolution_var(EvolutionVar::Empathy), 5.0);
        assert!(restored.evolution_vars.contains_key(&EvolutionVar::Empathy));
    }

    #[test]
    fn test_save_count_increments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let config = CompanionConfig::default();
        let state = CompanionState::new(&config);

        save_state(&state, &path).unwrap();
        save_state(&state, &path).unwrap();
        save_state(&state, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let save: SaveFile = serde_json::from_str(&content).unwrap();
        assert_eq!(save.save_count, 3);
    }
}
