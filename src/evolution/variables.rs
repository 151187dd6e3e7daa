/*
 * PixelPal - 进化变量引擎
 * 开发心理过程:
 * 1. 两段式：先按事件表施加直接增量，再按联动规则传播
 * 2. 联动只读直接增量，不读联动产生的增量（不级联）
 * 3. 变量无上下限，引擎从不clamp
 * 4. 查不到事件表即整体无操作，返回未变的拷贝
 */

use std::collections::BTreeMap;

use crate::core::config::CompanionConfig;
use crate::evolution::state::{CompanionState, EvolutionVar};

/// 对单个事件施加进化变量漂移
///
/// 直接增量按变量声明顺序应用，联动按规则声明顺序应用。
/// 未配置漂移表的事件种类不改变任何变量。
pub fn apply_evolution_var_drift(
    state: &CompanionState,
    event_kind: &str,
    config: &CompanionConfig,
) -> CompanionState {
    let mut state = state.clone();

    let Some(rates) = config.evolution.drift_rates.get(event_kind) else {
        return state;
    };

    // 第一段：直接增量，同时记录本事件的增量表供联动使用
    let mut direct_deltas: BTreeMap<EvolutionVar, f64> = BTreeMap::new();
    for var in EvolutionVar::ALL {
        if let Some(delta) = rates.get(&var) {
            let value = state.evolution_var(var) + delta;
            state.evolution_vars.insert(var, value);
            direct_deltas.insert(var, *delta);
        }
    }

    // 第二段：联动传播，只基于直接增量
    for rule in &config.evolution.interactions {
        let Some(source_delta) = direct_deltas.get(&rule.source) else {
            continue;
        };
        let value = state.evolution_var(rule.target) + source_delta * rule.factor;
        state.evolution_vars.insert(rule.target, value);
    }

    state
}

/// 把无界变量压缩到[0,1]的影响度
///
/// 默认值5.0映射到0.5，十倍增长约抬升0.25。非正值直接记0。
pub fn evolution_influence(state: &CompanionState, var: EvolutionVar) -> f64 {
    let value = state.evolution_var(var);
    if value <= 0.0 {
        return 0.0;
    }
    (0.5 + (value / 5.0).log10() / 4.0).clamp(0.0, 1.0)
}

/// 展示层使用的行为修正表（变量名 -> 影响度）
pub fn behavior_modifiers(state: &CompanionState) -> BTreeMap<String, f64> {
    EvolutionVar::ALL
        .iter()
        .map(|var| (var.as_str().to_string(), evolution_influence(state, *var)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_interactions() -> CompanionConfig {
        let mut config = CompanionConfig::default();
        config.evolution.interactions.clear();
        config.evolution.drift_rates.clear();
        config.evolution.drift_rates.insert(
            "studied_python".to_string(),
            [(EvolutionVar::Curiosity, 0.1), (EvolutionVar::Focus, 0.05)]
                .into_iter()
                .collect(),
        );
        config
    }

    #[test]
    fn test_direct_drift_applies_exact_deltas() {
        let config = config_without_interactions();
        let state = CompanionState::new(&config);

        let next = apply_evolution_var_drift(&state, "studied_python", &config);

        assert_eq!(next.evolution_var(EvolutionVar::Curiosity), 5.1);
        assert_eq!(next.evolution_var(EvolutionVar::Focus), 5.05);
        // 未列出的变量保持不变
        assert_eq!(next.evolution_var(EvolutionVar::Chaos), 5.0);
    }

    #[test]
    fn test_unknown_event_is_noop() {
        let config = CompanionConfig::default();
        let state = CompanionState::new(&config);

        let next = apply_evolution_var_drift(&state, "went_skydiving", &config);

        assert_eq!(next, state);
    }

    #[test]
    fn test_interactions_use_direct_deltas() {
        let config = CompanionConfig::default();
        let state = CompanionState::new(&config);

        // did_tryhackme: chaos +0.1, creativity +0.07, calmness -0.05
        // 联动: calmness += 0.1 * -0.5, creativity无chaos来源规则
        let next = apply_evolution_var_drift(&state, "did_tryhackme", &config);

        assert!((next.evolution_var(EvolutionVar::Chaos) - 5.1).abs() < 1e-12);
        assert!((next.evolution_var(EvolutionVar::Calmness) - (5.0 - 0.05 - 0.05)).abs() < 1e-12);
    }

    #[test]
    fn test_interaction_skipped_without_source_delta() {
        let config = CompanionConfig::default();
        let state = CompanionState::new(&config);

        // passed_lab只动confidence/focus；focus->chaos联动应生效，chaos->calmness不应
        let next = apply_evolution_var_drift(&state, "passed_lab", &config);

        assert!((next.evolution_var(EvolutionVar::Chaos) - (5.0 + 0.25 * -0.3)).abs() < 1e-12);
        assert_eq!(next.evolution_var(EvolutionVar::Calmness), 5.0);
    }

    #[test]
    fn test_variables_grow_without_ceiling() {
        let config = CompanionConfig::default();
        let mut state = CompanionState::new(&config);

        for _ in 0..1000 {
            state = apply_evolution_var_drift(&state, "finished_class", &config);
        }

        // 1000次 * 0.5，无上限
        assert!(state.evolution_var(EvolutionVar::Confidence) > 500.0);
    }

    #[test]
    fn test_influence_normalization() {
        let config = CompanionConfig::default();
        let mut state = CompanionState::new(&config);

        // 默认值映射到0.5
        assert!((evolution_influence(&state, EvolutionVar::Focus) - 0.5).abs() < 1e-12);

        state.evolution_vars.insert(EvolutionVar::Focus, 50.0);
        assert!((evolution_influence(&state, EvolutionVar::Focus) - 0.75).abs() < 1e-12);

        state.evolution_vars.insert(EvolutionVar::Focus, -2.0);
        assert_eq!(evolution_influence(&state, EvolutionVar::Focus), 0.0);

        state.evolution_vars.insert(EvolutionVar::Focus, 1_000_000.0);
        assert_eq!(evolution_influence(&state, EvolutionVar::Focus), 1.0);
    }
}
