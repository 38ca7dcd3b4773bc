use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use doxa::bisim::Contraction;
use doxa::domains;
use doxa::search::planner;
use doxa::search::trace::Narrator;
use doxa::search::Config;
use doxa::search::Planner;
use doxa::search::Strategy;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Unbounded,
    Iterative,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ContractionArg {
    Full,
    Rooted,
    Canonical,
}

/// Solve a reference epistemic planning problem.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// problem domain (coin, gossip, muddy, tiger)
    domain: String,

    #[arg(long, value_enum, default_value = "iterative")]
    strategy: StrategyArg,

    #[arg(long, value_enum, default_value = "canonical")]
    contraction: ContractionArg,

    /// stop after this many generated states
    #[arg(long)]
    limit: Option<u64>,

    /// replay the plan against the initial state before reporting
    #[arg(long)]
    validate: bool,

    /// directory for DOT renders and the JSON report
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    doxa::init();
    let args = Args::parse();
    let (task, mut storages) = domains::build(&args.domain).with_context(|| {
        format!(
            "unknown domain '{}', expected one of {}",
            args.domain,
            domains::DOMAINS.join(", ")
        )
    })?;

    let config = Config {
        strategy: match args.strategy {
            StrategyArg::Unbounded => Strategy::Unbounded,
            StrategyArg::Iterative => Strategy::IterativeBounded,
        },
        contraction: match args.contraction {
            ContractionArg::Full => Contraction::Full,
            ContractionArg::Rooted => Contraction::Rooted,
            ContractionArg::Canonical => Contraction::Canonical,
        },
        node_limit: args.limit,
    };

    let mut tracer = Narrator;
    let outcome = Planner::search(&task, config, &mut storages, &mut tracer);
    println!("{}", outcome);

    if args.validate {
        if let Some(plan) = &outcome.plan {
            let reached = planner::validate(&task, plan, &mut storages)?;
            anyhow::ensure!(reached, "plan replay does not reach the goal");
            log::info!("plan validated");
        }
    }

    if let Some(dir) = &args.out {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join("initial.dot"), format!("{}\n", task.initial()))?;
        for action in task.actions() {
            std::fs::write(dir.join(format!("{}.dot", action.name())), format!("{}\n", action))?;
        }
        let report = serde_json::json!({
            "domain": task.domain(),
            "problem": task.problem(),
            "plan": outcome.steps(),
            "found": outcome.found(),
            "statistics": &outcome.stats,
        });
        std::fs::write(dir.join("report.json"), serde_json::to_string_pretty(&report)?)?;
        log::info!("{:<24}{}", "report written to", dir.display());
    }

    if !outcome.found() {
        std::process::exit(1);
    }
    Ok(())
}
