/*
 * PixelPal - 性格漂移引擎
 * 开发心理过程:
 * 1. 特质漂移与倾向漂移是两条独立通路，前者无界累加，后者是[0,1]相对频率
 * 2. 特质联动基于相对默认值的偏差，顺序应用，读当前值
 * 3. 倾向分布先整体衰减2%，再把触发分类重置为其相对频率
 * 4. 事件种类不在映射表中时两条通路都是无操作
 */

use std::collections::BTreeMap;

use crate::constants::{DOMINANT_DRIFT_THRESHOLD, DRIFT_DECAY};
use crate::core::config::CompanionConfig;
use crate::evolution::state::{CompanionState, DriftCategory, PersonalityTrait};

/// 对单个事件施加性格特质漂移
///
/// 先按声明顺序施加直接增量，再按规则顺序应用联动：
/// target += (value(source) - default(source)) * rate，读联动时的当前值。
pub fn apply_trait_drift(
    state: &CompanionState,
    event_kind: &str,
    config: &CompanionConfig,
) -> CompanionState {
    let mut state = state.clone();

    let Some(rates) = config.personality.drift_rates.get(event_kind) else {
        return state;
    };

    for t in PersonalityTrait::ALL {
        if let Some(delta) = rates.get(&t) {
            let value = state.trait_value(t) + delta;
            state.personality_traits.insert(t, value);
        }
    }

    for rule in &config.personality.interactions {
        let default = config
            .personality
            .defaults
            .get(&rule.source)
            .copied()
            .unwrap_or(5.0);
        let deviation = state.trait_value(rule.source) - default;
        let value = state.trait_value(rule.target) + deviation * rule.rate;
        state.personality_traits.insert(rule.target, value);
    }

    state
}

/// 对单个事件施加行为倾向漂移
///
/// 仅当事件种类映射到某个分类时生效：所有分类先衰减2%，
/// 随后触发分类被重置为 该分类计数 / 全部映射计数。
pub fn apply_category_drift(
    state: &CompanionState,
    event_kind: &str,
    config: &CompanionConfig,
) -> CompanionState {
    let mut state = state.clone();

    let Some(triggered) = config.drift.category_mapping.get(event_kind).copied() else {
        return state;
    };

    for category in DriftCategory::ALL {
        let value = state.drift_value(category) * DRIFT_DECAY;
        state.personality_drift.insert(category, value);
    }

    let mut category_counts: BTreeMap<DriftCategory, u64> = BTreeMap::new();
    let mut total = 0u64;
    for (kind, category) in &config.drift.category_mapping {
        let count = state.counter(kind);
        *category_counts.entry(*category).or_insert(0) += count;
        total += count;
    }

    if total > 0 {
        let count = category_counts.get(&triggered).copied().unwrap_or(0);
        state
            .personality_drift
            .insert(triggered, count as f64 / total as f64);
    }

    state
}

/// 主导倾向：最高分类达到0.30才算主导，并列取声明顺序靠前者
pub fn get_dominant_drift(state: &CompanionState) -> Option<DriftCategory> {
    let mut best: Option<(DriftCategory, f64)> = None;
    for category in DriftCategory::ALL {
        let value = state.drift_value(category);
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((category, value)),
        }
    }

    best.and_then(|(category, value)| (value >= DOMINANT_DRIFT_THRESHOLD).then_some(category))
}

/// 按值降序取前count个特质（稳定排序，并列保持声明顺序）
pub fn get_dominant_traits(state: &CompanionState, count: usize) -> Vec<(PersonalityTrait, f64)> {
    let mut traits: Vec<(PersonalityTrait, f64)> = PersonalityTrait::ALL
        .iter()
        .map(|t| (*t, state.trait_value(*t)))
        .collect();
    traits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    traits.truncate(count);
    traits
}

fn archetype_noun(t: PersonalityTrait) -> &'static str {
    match t {
        PersonalityTrait::Humor => "Jester",
        PersonalityTrait::Boldness => "Daredevil",
        PersonalityTrait::Shyness => "Dreamer",
        PersonalityTrait::Analytical => "Analyst",
        PersonalityTrait::Chaotic => "Wildcard",
        PersonalityTrait::Studious => "Scholar",
        PersonalityTrait::Ambitious => "Achiever",
    }
}

fn archetype_adjective(t: PersonalityTrait) -> &'static str {
    match t {
        PersonalityTrait::Humor => "Witty",
        PersonalityTrait::Boldness => "Bold",
        PersonalityTrait::Shyness => "Timid",
        PersonalityTrait::Analytical => "Analytical",
        PersonalityTrait::Chaotic => "Chaotic",
        PersonalityTrait::Studious => "Studious",
        PersonalityTrait::Ambitious => "Driven",
    }
}

/// 描述性性格原型，由突出特质组合得出
///
/// 突出 = 高出配置默认值0.5以上。无突出特质时为Balanced Soul。
pub fn personality_archetype(state: &CompanionState, config: &CompanionConfig) -> String {
    let prominent: Vec<PersonalityTrait> = get_dominant_traits(state, 2)
        .into_iter()
        .filter(|(t, value)| {
            let default = config.personality.defaults.get(t).copied().unwrap_or(5.0);
            *value > default + 0.5
        })
        .map(|(t, _)| t)
        .collect();

    match prominent.as_slice() {
        [] => "Balanced Soul".to_string(),
        [first] => archetype_noun(*first).to_string(),
        [first, second, ..] => {
            format!("{} {}", archetype_adjective(*second), archetype_noun(*first))
        }
    }
}
