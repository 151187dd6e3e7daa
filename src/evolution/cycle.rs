/*
 * PixelPal - 进化周期编排器
 * 开发心理过程:
 * 1. 固定阶段顺序：计数 -> 变量漂移 -> 特质漂移 -> 倾向漂移 -> 变异掷骰 -> 触发检查
 * 2. 编排器是唯一调用顺序的权威，各引擎互不感知
 * 3. 公告事件每周期清空重建，展示层只看最近一次
 * 4. 同样的(状态, 事件序列, 种子)必须产生同样的结果
 */

use std::collections::BTreeMap;

use crate::core::config::CompanionConfig;
use crate::evolution::mutation::{apply_mutation, get_mutation_modifiers, MutationModifiers};
use crate::evolution::personality::{
    apply_category_drift, apply_trait_drift, get_dominant_drift, personality_archetype,
};
use crate::evolution::state::{
    CompanionState, CycleEvent, DriftCategory, EvolutionStage, EvolutionVar, HistoryKind,
    HistoryRecord,
};
use crate::evolution::triggers::check_evolution_triggers;
use crate::evolution::variables::apply_evolution_var_drift;
use crate::utils::random::EvolutionRng;

/// 执行一个完整的进化周期
///
/// 活动种类（出现在倾向映射表中的事件）先累加计数器；
/// 之后各引擎按固定顺序执行，公告事件收集到last_evolution_events。
pub fn process_evolution_cycle(
    state: &CompanionState,
    config: &CompanionConfig,
    event_kind: &str,
    rng: &mut EvolutionRng,
) -> CompanionState {
    let mut state = state.clone();
    state.last_evolution_events.clear();

    if config.drift.category_mapping.contains_key(event_kind) {
        *state
            .activity_counters
            .entry(event_kind.to_string())
            .or_insert(0) += 1;
    }

    let mut state = apply_evolution_var_drift(&state, event_kind, config);
    state = apply_trait_drift(&state, event_kind, config);
    state = apply_category_drift(&state, event_kind, config);

    let (mut state, mutated) = apply_mutation(&state, config, rng);
    if let Some(id) = mutated {
        state.last_evolution_events.push(CycleEvent {
            kind: HistoryKind::Mutation,
            id,
        });
    }

    let (mut state, triggered) = check_evolution_triggers(&state);
    if let Some(id) = triggered {
        state.last_evolution_events.push(CycleEvent {
            kind: HistoryKind::EvolutionTrigger,
            id,
        });
    }

    state
}

/// 只读的进化概览，供展示层与调试输出使用
#[derive(Debug, Clone)]
pub struct EvolutionSummary {
    pub stage: EvolutionStage,
    pub archetype: String,
    pub dominant_var: EvolutionVar,
    pub dominant_drift: Option<DriftCategory>,
    pub personality_drift: BTreeMap<DriftCategory, f64>,
    pub mutations: Vec<String>,
    pub evolution_triggers: Vec<String>,
    pub modifiers: MutationModifiers,
    pub total_activity: u64,
    pub history: Vec<HistoryRecord>,
}

pub fn get_evolution_summary(
    state: &CompanionState,
    config: &CompanionConfig,
) -> EvolutionSummary {
    EvolutionSummary {
        stage: state.evolution_stage(),
        archetype: personality_archetype(state, config),
        dominant_var: state.dominant_evolution_var(),
        dominant_drift: get_dominant_drift(state),
        personality_drift: state.personality_drift.clone(),
        mutations: state.mutations.clone(),
        evolution_triggers: state.evolution_triggers.clone(),
        modifiers: get_mutation_modifiers(state, config),
        total_activity: state.total_activity(),
        history: state.evolution_history.clone(),
    }
}
