// 桌面虚拟伙伴进化核心库入口
// 开发心理：纯内存状态机，确定性优先，渲染与窗口层完全解耦
// 架构：状态 -> 引擎 -> 编排器 三层，持久化与CLI是外围协作者

// 核心模块
pub mod core;
pub mod utils;

// 进化系统
pub mod evolution;

// 持久化边界
pub mod save;

// 常用类型再导出
pub use crate::core::config::CompanionConfig;
pub use crate::core::error::{CompanionError, Result};
pub use evolution::cycle::{get_evolution_summary, process_evolution_cycle, EvolutionSummary};
pub use evolution::state::{
    CompanionState, DriftCategory, EvolutionStage, EvolutionVar, PersonalityTrait,
};
pub use save::{default_save_path, load_state, save_state};
pub use utils::random::EvolutionRng;

// 版本信息 - 使用默认值避免编译时环境变量依赖
pub const VERSION: &str = "0.1.0";
pub const NAME: &str = "pixelpal";

// 进化常量
pub mod constants {
    pub const DEFAULT_VAR_VALUE: f64 = 5.0;
    pub const DEFAULT_TRAIT_VALUE: f64 = 5.0;

    // 倾向分布
    pub const DRIFT_DECAY: f64 = 0.98;
    pub const DOMINANT_DRIFT_THRESHOLD: f64 = 0.30;
}

// 便利函数
pub fn init() {
    // 初始化日志系统
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "pixelpal=info");
    }

    env_logger::init();

    log::info!("进化核心初始化完成 v{}", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert_eq!(VERSION, "0.1.0");
        assert_eq!(NAME, "pixelpal");
    }

    #[test]
    fn test_public_api_wiring() {
        let config = CompanionConfig::default();
        let state = CompanionState::new(&config);
        let mut rng = EvolutionRng::with_seed(1);

        let state = process_evolution_cycle(&state, &config, "studied_python", &mut rng);
        let summary = get_evolution_summary(&state, &config);

        assert_eq!(summary.total_activity, 1);
    }
}
