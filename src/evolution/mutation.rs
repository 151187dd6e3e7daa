/*
 * PixelPal - Mutation Engine
 * 开发心理过程:
 * 1. 变异目录是声明式数据：标识、稀有度、修正声明，不含可执行逻辑
 * 2. 变异概率随总活动量单调上升，随已持有变异数单调下降
 * 3. 选择是一次加权抽取，不是逐个独立掷币
 * 4. 修正聚合规则固定：速率键相乘，计数键相加，标志键取并集
 * 5. 任何查找缺失都降级为中性默认，引擎永不失败
 */

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};
use log::info;

use crate::core::config::CompanionConfig;
use crate::evolution::state::{CompanionState, HistoryKind, HistoryRecord};
use crate::utils::random::EvolutionRng;

/// 变异稀有度等级，决定加权抽取时的相对权重
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationRarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl MutationRarity {
    pub fn weight(&self) -> u32 {
        match self {
            MutationRarity::Common => 50,
            MutationRarity::Uncommon => 25,
            MutationRarity::Rare => 10,
            MutationRarity::Legendary => 2,
        }
    }
}

/// 单个变异的修正声明
///
/// 速率类键（activity_gain等）默认为None即中性；
/// extra_eyes按个数累加；special_flags按集合并入。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationModifierSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chaos_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mood_influence: BTreeMap<String, f64>,
    #[serde(default)]
    pub extra_eyes: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub special_flags: Vec<String>,
}

/// 变异目录条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationDef {
    pub id: String,
    pub name: String,
    pub description: String,
    /// 缺省稀有度按common处理（目录数据不全时的降级策略）
    #[serde(default)]
    pub rarity: MutationRarity,
    #[serde(default)]
    pub modifiers: MutationModifierSet,
}

/// 所有已持有变异聚合后的有效修正
#[derive(Debug, Clone, PartialEq)]
pub struct MutationModifiers {
    pub activity_gain: f64,
    pub security_gain: f64,
    pub milestone_gain: f64,
    pub chaos_factor: f64,
    pub mood_influence: BTreeMap<String, f64>,
    pub extra_eyes: u32,
    pub special_flags: BTreeSet<String>,
}

impl Default for MutationModifiers {
    fn default() -> Self {
        Self {
            activity_gain: 1.0,
            security_gain: 1.0,
            milestone_gain: 1.0,
            chaos_factor: 1.0,
            mood_influence: BTreeMap::new(),
            extra_eyes: 0,
            special_flags: BTreeSet::new(),
        }
    }
}

impl MutationModifiers {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.special_flags.contains(flag)
    }

    /// 多重人格标志（布尔OR语义：任一变异声明即生效）
    pub fn multi_personality(&self) -> bool {
        self.has_flag("multi_personality")
    }
}

/// 内置变异目录
pub fn builtin_catalog() -> Vec<MutationDef> {
    fn def(
        id: &str,
        name: &str,
        description: &str,
        rarity: MutationRarity,
        modifiers: MutationModifierSet,
    ) -> MutationDef {
        MutationDef {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            rarity,
            modifiers,
        }
    }

    vec![
        def(
            "speed_learner",
            "Speed Learner",
            "Gains activity progress 10% faster",
            MutationRarity::Common,
            MutationModifierSet {
                activity_gain: Some(1.10),
                ..Default::default()
            },
        ),
        def(
            "night_owl",
            "Night Owl",
            "Extra energetic at night",
            MutationRarity::Common,
            MutationModifierSet {
                mood_influence: [("hyper".to_string(), 0.15)].into_iter().collect(),
                ..Default::default()
            },
        ),
        def(
            "chaos_incarnate",
            "Chaos Incarnate",
            "Unpredictable mood swings intensify",
            MutationRarity::Uncommon,
            MutationModifierSet {
                chaos_factor: Some(2.0),
                ..Default::default()
            },
        ),
        def(
            "analytical_mind",
            "Analytical Mind",
            "Better at understanding complex topics",
            MutationRarity::Uncommon,
            MutationModifierSet {
                security_gain: Some(1.25),
                ..Default::default()
            },
        ),
        def(
            "third_eye",
            "Third Eye",
            "An extra eye opens on the forehead",
            MutationRarity::Rare,
            MutationModifierSet {
                extra_eyes: 1,
                ..Default::default()
            },
        ),
        def(
            "unstoppable",
            "Unstoppable",
            "Massive boost on milestones",
            MutationRarity::Rare,
            MutationModifierSet {
                milestone_gain: Some(1.50),
                ..Default::default()
            },
        ),
        def(
            "personality_fracture",
            "Personality Fracture",
            "Multiple personalities emerge",
            MutationRarity::Rare,
            MutationModifierSet {
                special_flags: vec!["multi_personality".to_string()],
                ..Default::default()
            },
        ),
        def(
            "transcendent",
            "Transcendent",
            "Has achieved enlightenment",
            MutationRarity::Legendary,
            MutationModifierSet {
                activity_gain: Some(1.25),
                special_flags: vec!["wisdom_bonus".to_string()],
                ..Default::default()
            },
        ),
    ]
}

/// 计算本周期的变异概率
///
/// 概率随总活动量线性上升并封顶，每个已持有变异再乘一次递减系数，
/// 最终结果保持在[base_chance, max_chance]区间内。
pub fn compute_mutation_chance(state: &CompanionState, config: &CompanionConfig) -> f64 {
    let mutation = &config.mutation;
    let total_activity = state.total_activity() as f64;

    let candidate =
        (mutation.base_chance + total_activity * mutation.activity_scale).min(mutation.max_chance);

    let held = state.mutations.len() as i32;
    let effective = candidate * mutation.diminishing_factor.powi(held);

    effective.max(mutation.base_chance)
}

/// 尚未获得的变异池
pub fn eligible_mutations<'a>(
    state: &CompanionState,
    config: &'a CompanionConfig,
) -> Vec<&'a MutationDef> {
    config
        .mutation
        .catalog
        .iter()
        .filter(|def| !state.has_mutation(&def.id))
        .collect()
}

/// 在未获得的变异中按稀有度权重做一次加权抽取
///
/// 池为空时返回None。
pub fn select_mutation(
    state: &CompanionState,
    config: &CompanionConfig,
    rng: &mut EvolutionRng,
) -> Option<String> {
    let pool = eligible_mutations(state, config);
    if pool.is_empty() {
        return None;
    }

    let weights: Vec<u32> = pool.iter().map(|def| def.rarity.weight()).collect();
    let index = rng.weighted_index(&weights)?;
    Some(pool[index].id.clone())
}

/// 完整的变异掷骰：概率判定 -> 加权抽取 -> 永久应用
///
/// 返回(新状态, 获得的变异标识或None)。获得时追加历史记录。
pub fn apply_mutation(
    state: &CompanionState,
    config: &CompanionConfig,
    rng: &mut EvolutionRng,
) -> (CompanionState, Option<String>) {
    let mut state = state.clone();

    let chance = compute_mutation_chance(&state, config);
    if !rng.chance(chance) {
        return (state, None);
    }

    let Some(id) = select_mutation(&state, config, rng) else {
        return (state, None);
    };

    let total_activity = state.total_activity();
    state.mutations.push(id.clone());
    state.evolution_history.push(HistoryRecord {
        kind: HistoryKind::Mutation,
        id: id.clone(),
        total_activity,
    });

    info!("获得变异: {} (总活动量 {})", id, total_activity);

    (state, Some(id))
}

/// 聚合所有已持有变异的修正
///
/// 速率键相乘，mood_influence与extra_eyes相加，special_flags取并集。
/// 目录中不存在的变异标识被忽略。
pub fn get_mutation_modifiers(
    state: &CompanionState,
    config: &CompanionConfig,
) -> MutationModifiers {
    let mut modifiers = MutationModifiers::default();

    for id in &state.mutations {
        let Some(def) = config.mutation.catalog.iter().find(|def| &def.id == id) else {
            continue;
        };

        let declared = &def.modifiers;
        if let Some(gain) = declared.activity_gain {
            modifiers.activity_gain *= gain;
        }
        if let Some(gain) = declared.security_gain {
            modifiers.security_gain *= gain;
        }
        if let Some(gain) = declared.milestone_gain {
            modifiers.milestone_gain *= gain;
        }
        if let Some(factor) = declared.chaos_factor {
            modifiers.chaos_factor *= factor;
        }
        for (mood, influence) in &declared.mood_influence {
            *modifiers.mood_influence.entry(mood.clone()).or_insert(0.0) += influence;
        }
        modifiers.extra_eyes += declared.extra_eyes;
        for flag in &declared.special_flags {
            modifiers.special_flags.insert(flag.clone());
        }
    }

    modifiers
}

/// 变异的展示名，目录缺失时退回标识本身
pub fn mutation_display_name(config: &CompanionConfig, id: &str) -> String {
    config
        .mutation
        .catalog
        .iter()
        .find(|def| def.id == id)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// 目录一致性检查，返回问题描述列表（永不panic）
pub fn validate_catalog(catalog: &[MutationDef]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = BTreeSet::new();

    for def in catalog {
        if def.id.is_empty() {
            problems.push("mutation with empty id".to_string());
        }
        if def.name.is_empty() {
            problems.push(format!("{}: missing display name", def.id));
        }
        if !seen.insert(def.id.clone()) {
            problems.push(format!("{}: duplicate id", def.id));
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for_chance() -> CompanionConfig {
        let mut config = CompanionConfig::default();
        config.mutation.base_chance = 0.005;
        config.mutation.activity_scale = 0.00009;
        config.mutation.max_chance = 0.05;
        config.mutation.diminishing_factor = 0.9;
        config
    }

    #[test]
    fn test_mutation_chance_reference_value() {
        // 总活动500、已有3个变异: min(0.005+500*0.00009, 0.05)=0.05, 再乘0.9^3
        let config = config_for_chance();
        let mut state = CompanionState::new(&config);
        state.activity_counters.insert("studied_python".to_string(), 300);
        state.activity_counters.insert("did_tryhackme".to_string(), 200);
        state.mutations = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let chance = compute_mutation_chance(&state, &config);
        assert!((chance - 0.03645).abs() < 1e-9);
    }

    #[test]
    fn test_mutation_chance_monotonic_in_activity() {
        let config = config_for_chance();
        let mut previous = 0.0;
        for activity in (0..=1000).step_by(50) {
            let mut state = CompanionState::new(&config);
            state
                .activity_counters
                .insert("studied_python".to_string(), activity);
            let chance = compute_mutation_chance(&state, &config);
            assert!(chance >= previous);
            assert!(chance >= config.mutation.base_chance - 1e-12);
            assert!(chance <= config.mutation.max_chance + 1e-12);
            previous = chance;
        }
    }

    #[test]
    fn test_mutation_chance_non_increasing_in_held_count() {
        let config = config_for_chance();
        let mut previous = f64::MAX;
        for held in 0..8 {
            let mut state = CompanionState::new(&config);
            state
                .activity_counters
                .insert("studied_python".to_string(), 600);
            state.mutations = (0..held).map(|i| format!("m{}", i)).collect();
            let chance = compute_mutation_chance(&state, &config);
            assert!(chance <= previous);
            assert!(chance >= config.mutation.base_chance - 1e-12);
            previous = chance;
        }
    }

    #[test]
    fn test_select_excludes_held_and_empty_pool_yields_none() {
        let config = CompanionConfig::default();
        let mut state = CompanionState::new(&config);
        let mut rng = EvolutionRng::with_seed(7);

        // 全部持有后池为空
        state.mutations = config
            .mutation
            .catalog
            .iter()
            .map(|def| def.id.clone())
            .collect();
        assert_eq!(select_mutation(&state, &config, &mut rng), None);

        // 留下唯一候选时必然选中它
        state.mutations.retain(|id| id != "transcendent");
        assert_eq!(
            select_mutation(&state, &config, &mut rng),
            Some("transcendent".to_string())
        );
    }

    #[test]
    fn test_weighted_selection_distribution() {
        // 池中一个common(50)一个legendary(2)，common应占约 50/52 ≈ 96.2%
        let mut config = CompanionConfig::default();
        config.mutation.catalog = vec![
            MutationDef {
                id: "plain".to_string(),
                name: "Plain".to_string(),
                description: String::new(),
                rarity: MutationRarity::Common,
                modifiers: MutationModifierSet::default(),
            },
            MutationDef {
                id: "mythic".to_string(),
                name: "Mythic".to_string(),
                description: String::new(),
                rarity: MutationRarity::Legendary,
                modifiers: MutationModifierSet::default(),
            },
        ];
        let state = CompanionState::new(&config);
        let mut rng = EvolutionRng::with_seed(424242);

        let mut common_hits = 0u32;
        for _ in 0..10_000 {
            if select_mutation(&state, &config, &mut rng).as_deref() == Some("plain") {
                common_hits += 1;
            }
        }

        let fraction = common_hits as f64 / 10_000.0;
        assert!((fraction - 50.0 / 52.0).abs() < 0.02, "fraction = {}", fraction);
    }

    #[test]
    fn test_apply_mutation_never_duplicates() {
        let mut config = CompanionConfig::default();
        // 概率拉满，确保每次掷骰都通过
        config.mutation.base_chance = 1.0;
        config.mutation.max_chance = 1.0;
        config.mutation.activity_scale = 0.0;
        config.mutation.diminishing_factor = 1.0;

        let mut state = CompanionState::new(&config);
        let mut rng = EvolutionRng::with_seed(99);
        let catalog_size = config.mutation.catalog.len();

        for _ in 0..catalog_size + 5 {
            let (next, _) = apply_mutation(&state, &config, &mut rng);
            state = next;
        }

        assert_eq!(state.mutations.len(), catalog_size);
        let unique: BTreeSet<_> = state.mutations.iter().collect();
        assert_eq!(unique.len(), catalog_size);
        assert_eq!(state.evolution_history.len(), catalog_size);
    }

    #[test]
    fn test_modifier_composition_rules() {
        let config = CompanionConfig::default();
        let mut state = CompanionState::new(&config);
        state.mutations = vec![
            "speed_learner".to_string(),
            "transcendent".to_string(),
            "chaos_incarnate".to_string(),
            "third_eye".to_string(),
            "personality_fracture".to_string(),
        ];

        let modifiers = get_mutation_modifiers(&state, &config);

        // 速率键相乘: 1.10 * 1.25
        assert!((modifiers.activity_gain - 1.375).abs() < 1e-12);
        assert!((modifiers.chaos_factor - 2.0).abs() < 1e-12);
        // 计数键相加
        assert_eq!(modifiers.extra_eyes, 1);
        // 标志键取并集
        assert!(modifiers.multi_personality());
        assert!(modifiers.has_flag("wisdom_bonus"));
    }

    #[test]
    fn test_unknown_mutation_id_is_ignored() {
        let config = CompanionConfig::default();
        let mut state = CompanionState::new(&config);
        state.mutations = vec!["not_in_catalog".to_string()];

        let modifiers = get_mutation_modifiers(&state, &config);
        assert_eq!(modifiers, MutationModifiers::default());
        assert_eq!(mutation_display_name(&config, "not_in_catalog"), "not_in_catalog");
    }

    #[test]
    fn test_catalog_validation() {
        let mut catalog = builtin_catalog();
        assert!(validate_catalog(&catalog).is_empty());

        catalog.push(MutationDef {
            id: "speed_learner".to_string(),
            name: String::new(),
            description: String::new(),
            rarity: MutationRarity::Common,
            modifiers: MutationModifierSet::default(),
        });
        let problems = validate_catalog(&catalog);
        assert_eq!(problems.len(), 2); // 重复id + 缺少名称
    }
}
