/*
 * PixelPal - 配置系统
 * 开发心理过程:
 * 1. 所有数值表都进配置，引擎代码里不留魔法数字
 * 2. Default必须完整可用，YAML文件是可选的覆盖层
 * 3. 配置显式传入每个引擎调用，不用全局单例
 * 4. 漂移表按事件种类索引，未知事件查不到表即自然降级为无操作
 */

use std::collections::BTreeMap;
use std::path::Path;
use serde::{Serialize, Deserialize};
use log::warn;

use crate::core::error::Result;
use crate::evolution::mutation::{builtin_catalog, MutationDef};
use crate::evolution::state::{DriftCategory, EvolutionVar, PersonalityTrait};

/// 进化变量联动规则：target += direct_delta(source) * factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarInteraction {
    pub source: EvolutionVar,
    pub target: EvolutionVar,
    pub factor: f64,
}

/// 性格特质联动规则：target += (value(source) - default) * rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitInteraction {
    pub source: PersonalityTrait,
    pub target: PersonalityTrait,
    pub rate: f64,
}

/// 通用设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 伙伴名字
    pub name: String,
    /// 日志级别（trace/debug/info/warn/error）
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: "Octo".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// 进化变量设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// 新状态的初始变量值
    pub defaults: BTreeMap<EvolutionVar, f64>,
    /// 事件种类 -> 直接增量表
    pub drift_rates: BTreeMap<String, BTreeMap<EvolutionVar, f64>>,
    /// 联动规则，按声明顺序应用
    pub interactions: Vec<VarInteraction>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        let defaults = EvolutionVar::ALL.iter().map(|v| (*v, 5.0)).collect();

        let mut drift_rates = BTreeMap::new();
        drift_rates.insert(
            "studied_python".to_string(),
            [
                (EvolutionVar::Curiosity, 0.1),
                (EvolutionVar::Focus, 0.08),
                (EvolutionVar::Chaos, -0.03),
            ]
            .into_iter()
            .collect(),
        );
        drift_rates.insert(
            "studied_security_plus".to_string(),
            [
                (EvolutionVar::Focus, 0.12),
                (EvolutionVar::Curiosity, 0.06),
                (EvolutionVar::Calmness, 0.04),
            ]
            .into_iter()
            .collect(),
        );
        drift_rates.insert(
            "finished_class".to_string(),
            [
                (EvolutionVar::Confidence, 0.5),
                (EvolutionVar::Creativity, 0.3),
                (EvolutionVar::Empathy, 0.15),
            ]
            .into_iter()
            .collect(),
        );
        drift_rates.insert(
            "did_tryhackme".to_string(),
            [
                (EvolutionVar::Chaos, 0.1),
                (EvolutionVar::Creativity, 0.07),
                (EvolutionVar::Calmness, -0.05),
            ]
            .into_iter()
            .collect(),
        );
        drift_rates.insert(
            "passed_lab".to_string(),
            [
                (EvolutionVar::Confidence, 0.35),
                (EvolutionVar::Focus, 0.25),
            ]
            .into_iter()
            .collect(),
        );
        drift_rates.insert(
            "fed".to_string(),
            [
                (EvolutionVar::Empathy, 0.05),
                (EvolutionVar::Calmness, 0.05),
            ]
            .into_iter()
            .collect(),
        );
        drift_rates.insert(
            "petted".to_string(),
            [
                (EvolutionVar::Empathy, 0.05),
                (EvolutionVar::Calmness, 0.05),
            ]
            .into_iter()
            .collect(),
        );

        let interactions = vec![
            VarInteraction {
                source: EvolutionVar::Chaos,
                target: EvolutionVar::Calmness,
                factor: -0.5,
            },
            VarInteraction {
                source: EvolutionVar::Focus,
                target: EvolutionVar::Chaos,
                factor: -0.3,
            },
            VarInteraction {
                source: EvolutionVar::Curiosity,
                target: EvolutionVar::Creativity,
                factor: 0.2,
            },
        ];

        Self {
            defaults,
            drift_rates,
            interactions,
        }
    }
}

/// 性格特质设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityConfig {
    /// 新状态的初始特质值，同时是联动规则的偏差基准
    pub defaults: BTreeMap<PersonalityTrait, f64>,
    /// 事件种类 -> 直接增量表
    pub drift_rates: BTreeMap<String, BTreeMap<PersonalityTrait, f64>>,
    /// 联动规则，按声明顺序应用
    pub interactions: Vec<TraitInteraction>,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        let defaults = PersonalityTrait::ALL.iter().map(|t| (*t, 5.0)).collect();

        let mut drift_rates = BTreeMap::new();
        drift_rates.insert(
            "studied_python".to_string(),
            [
                (PersonalityTrait::Studious, 0.1),
                (PersonalityTrait::Analytical, 0.05),
            ]
            .into_iter()
            .collect(),
        );
        drift_rates.insert(
            "studied_security_plus".to_string(),
            [
                (PersonalityTrait::Analytical, 0.1),
                (PersonalityTrait::Studious, 0.05),
            ]
            .into_iter()
            .collect(),
        );
        drift_rates.insert(
            "finished_class".to_string(),
            [
                (PersonalityTrait::Ambitious, 0.15),
                (PersonalityTrait::Boldness, 0.05),
            ]
            .into_iter()
            .collect(),
        );
        drift_rates.insert(
            "did_tryhackme".to_string(),
            [
                (PersonalityTrait::Chaotic, 0.1),
                (PersonalityTrait::Boldness, 0.05),
            ]
            .into_iter()
            .collect(),
        );
        drift_rates.insert(
            "passed_lab".to_string(),
            [
                (PersonalityTrait::Analytical, 0.08),
                (PersonalityTrait::Ambitious, 0.05),
            ]
            .into_iter()
            .collect(),
        );
        drift_rates.insert(
            "fed".to_string(),
            [(PersonalityTrait::Humor, 0.02)].into_iter().collect(),
        );
        drift_rates.insert(
            "petted".to_string(),
            [
                (PersonalityTrait::Shyness, -0.02),
                (PersonalityTrait::Humor, 0.03),
            ]
            .into_iter()
            .collect(),
        );

        let interactions = vec![
            TraitInteraction {
                source: PersonalityTrait::Chaotic,
                target: PersonalityTrait::Studious,
                rate: -0.01,
            },
            TraitInteraction {
                source: PersonalityTrait::Ambitious,
                target: PersonalityTrait::Boldness,
                rate: 0.01,
            },
        ];

        Self {
            defaults,
            drift_rates,
            interactions,
        }
    }
}

/// 变异系统设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// 基础变异概率（同时是概率下限）
    pub base_chance: f64,
    /// 每点总活动量增加的概率
    pub activity_scale: f64,
    /// 概率上限（递减前）
    pub max_chance: f64,
    /// 每个已持有变异乘一次的递减系数
    pub diminishing_factor: f64,
    /// 变异目录，配置可整体覆盖
    pub catalog: Vec<MutationDef>,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            base_chance: 0.005,
            activity_scale: 0.00009,
            max_chance: 0.05,
            diminishing_factor: 0.9,
            catalog: builtin_catalog(),
        }
    }
}

/// 行为倾向设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// 事件种类 -> 倾向分类。出现在此表中的种类才是活动种类
    pub category_mapping: BTreeMap<String, DriftCategory>,
}

impl Default for DriftConfig {
    fn default() -> Self {
        let category_mapping = [
            ("studied_python".to_string(), DriftCategory::Studious),
            ("studied_security_plus".to_string(), DriftCategory::Analytical),
            ("finished_class".to_string(), DriftCategory::Ambitious),
            ("did_tryhackme".to_string(), DriftCategory::Chaotic),
            ("passed_lab".to_string(), DriftCategory::Analytical),
        ]
        .into_iter()
        .collect();

        Self { category_mapping }
    }
}

/// 顶层配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    pub general: GeneralConfig,
    pub evolution: EvolutionConfig,
    pub personality: PersonalityConfig,
    pub mutation: MutationConfig,
    pub drift: DriftConfig,
}

impl CompanionConfig {
    /// 从YAML文件加载，字段缺失处用默认值补齐
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: CompanionConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置；文件不存在或损坏时退回默认配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(error) => {
                warn!("配置文件无法解析，使用默认配置: {}", error);
                Self::default()
            }
        }
    }
}
