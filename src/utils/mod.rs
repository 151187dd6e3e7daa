// 工具模块

pub mod random;

pub use self::random::EvolutionRng;
