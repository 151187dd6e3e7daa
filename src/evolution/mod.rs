/*
 * PixelPal - 进化系统
 * 开发心理过程:
 * 1. 状态是唯一事实来源，引擎只算不存
 * 2. 编排器定阶段顺序，子引擎各管一条通路
 * 3. 所有函数按值返回新状态，调用方决定是否采纳
 */

pub mod cycle;
pub mod mutation;
pub mod personality;
pub mod state;
pub mod triggers;
pub mod variables;

pub use self::cycle::{get_evolution_summary, process_evolution_cycle, EvolutionSummary};
pub use self::mutation::{
    apply_mutation, builtin_catalog, compute_mutation_chance, get_mutation_modifiers,
    select_mutation, validate_catalog, MutationDef, MutationModifiers, MutationRarity,
};
pub use self::personality::{
    apply_category_drift, apply_trait_drift, get_dominant_drift, get_dominant_traits,
    personality_archetype,
};
pub use self::state::{
    CompanionState, CycleEvent, DriftCategory, EvolutionStage, EvolutionVar, HistoryKind,
    HistoryRecord, PersonalityTrait,
};
pub use self::triggers::check_evolution_triggers;
pub use self::variables::{apply_evolution_var_drift, behavior_modifiers, evolution_influence};
