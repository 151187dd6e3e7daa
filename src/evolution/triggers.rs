/*
 * PixelPal - 进化触发引擎
 * 开发心理过程:
 * 1. 触发条件是代码内置的里程碑，不走配置（门槛是产品决策不是调参项）
 * 2. 每个周期最多触发一个，按优先级取第一个满足且未持有的
 * 3. 触发一次性：进入evolution_triggers后永不重复
 * 4. 条件判定纯读状态，无随机性
 */

use log::info;

use crate::evolution::state::{CompanionState, DriftCategory, HistoryKind, HistoryRecord};

struct TriggerDef {
    id: &'static str,
    condition: fn(&CompanionState) -> bool,
}

// 优先级即数组顺序
const TRIGGERS: [TriggerDef; 4] = [
    TriggerDef {
        id: "ascension",
        condition: |state| state.total_activity() >= 500 && state.mutations.len() >= 3,
    },
    TriggerDef {
        id: "chaos_master",
        condition: |state| {
            state.counter("did_tryhackme") >= 50 && state.has_mutation("chaos_incarnate")
        },
    },
    TriggerDef {
        id: "scholar",
        condition: |state| {
            state.counter("finished_class") >= 10
                && state.drift_value(DriftCategory::Analytical) > 0.5
        },
    },
    TriggerDef {
        id: "hybrid_form",
        condition: |state| {
            DriftCategory::ALL
                .iter()
                .all(|category| state.drift_value(*category) > 0.20)
        },
    },
];

/// 全部内置触发标识，按优先级排列
pub fn trigger_ids() -> Vec<&'static str> {
    TRIGGERS.iter().map(|t| t.id).collect()
}

/// 检查并最多触发一个进化事件
///
/// 返回(新状态, 本次触发的标识或None)。触发时追加历史记录。
pub fn check_evolution_triggers(state: &CompanionState) -> (CompanionState, Option<String>) {
    let mut state = state.clone();

    for trigger in &TRIGGERS {
        if state.has_trigger(trigger.id) {
            continue;
        }
        if !(trigger.condition)(&state) {
            continue;
        }

        let total_activity = state.total_activity();
        state.evolution_triggers.push(trigger.id.to_string());
        state.evolution_history.push(HistoryRecord {
            kind: HistoryKind::EvolutionTrigger,
            id: trigger.id.to_string(),
            total_activity,
        });

        info!("进化触发: {} (总活动量 {})", trigger.id, total_activity);

        return (state, Some(trigger.id.to_string()));
    }

    (state, None)
}
