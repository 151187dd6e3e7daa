/*
 * PixelPal - Evolution State Store
 * 开发心理过程:
 * 1. 单一可变记录，所有引擎按值接收、按值返回（写时复制约定）
 * 2. 固定键集合用枚举表达，BTreeMap保证迭代顺序等于声明顺序
 * 3. 进化变量与性格特质无上下限，刻意不做clamp（无限成长是设计选择）
 * 4. 变异/触发集合只增不减，历史日志仅追加
 */

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::constants::{DEFAULT_TRAIT_VALUE, DEFAULT_VAR_VALUE};
use crate::core::config::CompanionConfig;

/// 七个进化变量，声明顺序即为确定性迭代顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionVar {
    Curiosity,
    Creativity,
    Confidence,
    Calmness,
    Chaos,
    Empathy,
    Focus,
}

impl EvolutionVar {
    pub const ALL: [EvolutionVar; 7] = [
        EvolutionVar::Curiosity,
        EvolutionVar::Creativity,
        EvolutionVar::Confidence,
        EvolutionVar::Calmness,
        EvolutionVar::Chaos,
        EvolutionVar::Empathy,
        EvolutionVar::Focus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvolutionVar::Curiosity => "curiosity",
            EvolutionVar::Creativity => "creativity",
            EvolutionVar::Confidence => "confidence",
            EvolutionVar::Calmness => "calmness",
            EvolutionVar::Chaos => "chaos",
            EvolutionVar::Empathy => "empathy",
            EvolutionVar::Focus => "focus",
        }
    }
}

impl std::fmt::Display for EvolutionVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 七个性格特质
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityTrait {
    Humor,
    Boldness,
    Shyness,
    Analytical,
    Chaotic,
    Studious,
    Ambitious,
}

impl PersonalityTrait {
    pub const ALL: [PersonalityTrait; 7] = [
        PersonalityTrait::Humor,
        PersonalityTrait::Boldness,
        PersonalityTrait::Shyness,
        PersonalityTrait::Analytical,
        PersonalityTrait::Chaotic,
        PersonalityTrait::Studious,
        PersonalityTrait::Ambitious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityTrait::Humor => "humor",
            PersonalityTrait::Boldness => "boldness",
            PersonalityTrait::Shyness => "shyness",
            PersonalityTrait::Analytical => "analytical",
            PersonalityTrait::Chaotic => "chaotic",
            PersonalityTrait::Studious => "studious",
            PersonalityTrait::Ambitious => "ambitious",
        }
    }
}

impl std::fmt::Display for PersonalityTrait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 行为倾向分类，值域[0,1]，每个事件衰减2%后再强化触发分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftCategory {
    Analytical,
    Chaotic,
    Studious,
    Ambitious,
}

impl DriftCategory {
    pub const ALL: [DriftCategory; 4] = [
        DriftCategory::Analytical,
        DriftCategory::Chaotic,
        DriftCategory::Studious,
        DriftCategory::Ambitious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriftCategory::Analytical => "analytical",
            DriftCategory::Chaotic => "chaotic",
            DriftCategory::Studious => "studious",
            DriftCategory::Ambitious => "ambitious",
        }
    }
}

impl std::fmt::Display for DriftCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 历史记录类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Mutation,
    EvolutionTrigger,
}

/// 进化历史条目，上下文快照用当时的总活动量表示（保持确定性）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub kind: HistoryKind,
    pub id: String,
    pub total_activity: u64,
}

/// 单次进化周期产生的公告事件，供展示层一次性消费
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleEvent {
    pub kind: HistoryKind,
    pub id: String,
}

/// 描述性进化阶段，由七个进化变量的均值划分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionStage {
    Nascent,
    Developing,
    Maturing,
    Advanced,
    Transcendent,
    Cosmic,
}

impl EvolutionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvolutionStage::Nascent => "Nascent",
            EvolutionStage::Developing => "Developing",
            EvolutionStage::Maturing => "Maturing",
            EvolutionStage::Advanced => "Advanced",
            EvolutionStage::Transcendent => "Transcendent",
            EvolutionStage::Cosmic => "Cosmic",
        }
    }
}

/// 伙伴的完整进化状态
///
/// 引擎遵守写时复制约定：任何引擎都不会就地修改传入的状态，
/// 调用方总是采纳返回值。持久化由外部save模块负责。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionState {
    /// 进化变量，默认5.0，无上下限，可为负
    pub evolution_vars: BTreeMap<EvolutionVar, f64>,

    /// 性格特质，默认5.0，无上下限
    pub personality_traits: BTreeMap<PersonalityTrait, f64>,

    /// 行为倾向分布，[0,1]相对频率，带2%几何衰减
    pub personality_drift: BTreeMap<DriftCategory, f64>,

    /// 已获得的变异，只增不减，无重复
    #[serde(default)]
    pub mutations: Vec<String>,

    /// 已触发的一次性进化事件，只增不减
    #[serde(default)]
    pub evolution_triggers: Vec<String>,

    /// 追加式进化历史日志
    #[serde(default)]
    pub evolution_history: Vec<HistoryRecord>,

    /// 活动计数器（事件种类 -> 单调递增计数）
    #[serde(default)]
    pub activity_counters: BTreeMap<String, u64>,

    /// 最近一次周期的公告事件，每个周期开始时清空
    #[serde(default)]
    pub last_evolution_events: Vec<CycleEvent>,

    /// 创建时间，仅作元数据持久化，不参与任何核心计算
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl CompanionState {
    /// 按配置默认值创建全新状态（首次运行）
    pub fn new(config: &CompanionConfig) -> Self {
        let mut evolution_vars = BTreeMap::new();
        for var in EvolutionVar::ALL {
            let value = config
                .evolution
                .defaults
                .get(&var)
                .copied()
                .unwrap_or(DEFAULT_VAR_VALUE);
            evolution_vars.insert(var, value);
        }

        let mut personality_traits = BTreeMap::new();
        for t in PersonalityTrait::ALL {
            let value = config
                .personality
                .defaults
                .get(&t)
                .copied()
                .unwrap_or(DEFAULT_TRAIT_VALUE);
            personality_traits.insert(t, value);
        }

        let mut personality_drift = BTreeMap::new();
        for category in DriftCategory::ALL {
            personality_drift.insert(category, 0.0);
        }

        Self {
            evolution_vars,
            personality_traits,
            personality_drift,
            mutations: Vec::new(),
            evolution_triggers: Vec::new(),
            evolution_history: Vec::new(),
            activity_counters: BTreeMap::new(),
            last_evolution_events: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }

    /// 总活动量：所有活动计数器之和
    pub fn total_activity(&self) -> u64 {
        self.activity_counters.values().sum()
    }

    pub fn evolution_var(&self, var: EvolutionVar) -> f64 {
        self.evolution_vars.get(&var).copied().unwrap_or(DEFAULT_VAR_VALUE)
    }

    pub fn trait_value(&self, t: PersonalityTrait) -> f64 {
        self.personality_traits.get(&t).copied().unwrap_or(DEFAULT_TRAIT_VALUE)
    }

    pub fn drift_value(&self, category: DriftCategory) -> f64 {
        self.personality_drift.get(&category).copied().unwrap_or(0.0)
    }

    pub fn counter(&self, kind: &str) -> u64 {
        self.activity_counters.get(kind).copied().unwrap_or(0)
    }

    pub fn has_mutation(&self, id: &str) -> bool {
        self.mutations.iter().any(|m| m == id)
    }

    pub fn has_trigger(&self, id: &str) -> bool {
        self.evolution_triggers.iter().any(|t| t == id)
    }

    /// 当前最高的进化变量，并列时取声明顺序靠前者
    pub fn dominant_evolution_var(&self) -> EvolutionVar {
        let mut best = EvolutionVar::ALL[0];
        let mut best_value = self.evolution_var(best);
        for var in EvolutionVar::ALL {
            let value = self.evolution_var(var);
            if value > best_value {
                best = var;
                best_value = value;
            }
        }
        best
    }

    /// 由进化变量均值得到的描述性阶段
    pub fn evolution_stage(&self) -> EvolutionStage {
        let total: f64 = EvolutionVar::ALL.iter().map(|v| self.evolution_var(*v)).sum();
        let avg = total / EvolutionVar::ALL.len() as f64;

        if avg < 6.0 {
            EvolutionStage::Nascent
        } else if avg < 8.0 {
            EvolutionStage::Developing
        } else if avg < 12.0 {
            EvolutionStage::Maturing
        } else if avg < 20.0 {
            EvolutionStage::Advanced
        } else if avg < 50.0 {
            EvolutionStage::Transcendent
        } else {
            EvolutionStage::Cosmic
        }
    }

    /// 取走本周期公告事件（展示层一次性消费）
    pub fn take_evolution_events(&mut self) -> Vec<CycleEvent> {
        std::mem::take(&mut self.last_evolution_events)
    }
}
