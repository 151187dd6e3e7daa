// 桌面虚拟伙伴主程序入口
// 开发心理：每次调用处理一个事件后立即存档，进程不常驻
// CLI只是核心库的薄壳，所有语义都在库里

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

use pixelpal::evolution::personality::get_dominant_traits;
use pixelpal::{
    default_save_path, get_evolution_summary, init, load_state, process_evolution_cycle,
    save_state, CompanionConfig, CompanionState, EvolutionRng,
};

#[derive(Parser)]
#[command(name = "pixelpal", version = pixelpal::VERSION, about = "桌面虚拟伙伴进化核心")]
struct Cli {
    /// 存档文件路径（默认放在系统数据目录）
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    /// 配置文件路径（YAML，缺失时使用内置默认）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 固定随机种子（回放与调试）
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 上报一个事件并执行一次进化周期
    Event {
        /// 事件种类，如 studied_python / did_tryhackme / fed
        kind: String,
    },
    /// 打印当前进化状态概览
    Status,
    /// 删除存档，重新开始
    Reset,
}

fn main() -> Result<()> {
    init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CompanionConfig::load_or_default(path),
        None => CompanionConfig::default(),
    };
    let state_path = cli.state_file.clone().unwrap_or_else(default_save_path);

    match cli.command {
        Command::Event { kind } => {
            let state = load_state(&state_path, &config);
            let mut rng = match cli.seed {
                Some(seed) => EvolutionRng::with_seed(seed),
                None => EvolutionRng::new(),
            };

            let mut state = process_evolution_cycle(&state, &config, &kind, &mut rng);
            for event in state.take_evolution_events() {
                println!("✨ 进化事件: {:?} {}", event.kind, event.id);
            }
            save_state(&state, &state_path)?;

            info!("事件 {} 处理完毕 (总活动量 {})", kind, state.total_activity());
        }
        Command::Status => {
            let state = load_state(&state_path, &config);
            print_status(&state, &config);
        }
        Command::Reset => {
            if state_path.exists() {
                std::fs::remove_file(&state_path)?;
                println!("存档已删除: {}", state_path.display());
            } else {
                println!("没有存档可删除");
            }
        }
    }

    Ok(())
}

fn print_status(state: &CompanionState, config: &CompanionConfig) {
    let summary = get_evolution_summary(state, config);

    println!("🐙 {} 的进化状态", config.general.name);
    println!("  阶段: {}", summary.stage.as_str());
    println!("  原型: {}", summary.archetype);
    println!("  总活动量: {}", summary.total_activity);
    println!("  主导变量: {}", summary.dominant_var);

    println!("  进化变量:");
    for (var, value) in &state.evolution_vars {
        println!("    {:<12} {:.2}", var.as_str(), value);
    }

    println!("  突出特质:");
    for (t, value) in get_dominant_traits(state, 3) {
        println!("    {:<12} {:.2}", t.as_str(), value);
    }

    println!("  行为倾向:");
    for (category, value) in &summary.personality_drift {
        let marker = if summary.dominant_drift == Some(*category) {
            " <- 主导"
        } else {
            ""
        };
        println!("    {:<12} {:.3}{}", category.as_str(), value, marker);
    }

    if !summary.mutations.is_empty() {
        println!("  变异: {}", summary.mutations.join(", "));
    }
    if !summary.evolution_triggers.is_empty() {
        println!("  进化触发: {}", summary.evolution_triggers.join(", "));
    }
}
