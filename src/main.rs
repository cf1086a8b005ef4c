//! CLI entry point for the WvW build optimizer

use clap::{Parser, ValueEnum};
use mist_sim::{
    build::calculate_effective_stats,
    config::RequestConfig,
    gear::optimize_gear,
    optimizer::optimize_equipment,
    registry::{GameData, ItemRegistry, PresetTable, RotationTable},
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "mist-sim")]
#[command(version)]
#[command(about = "Build calculator and equipment optimizer for GW2 WvW", long_about = None)]
struct Args {
    /// Path to the build request file (YAML or JSON)
    #[arg(short, long)]
    request: PathBuf,

    /// Score candidates in parallel
    #[arg(short, long, default_value = "false")]
    parallel: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Also run the per-slot armor preset search
    #[arg(short, long, default_value = "false")]
    gear: bool,

    /// Show timing information
    #[arg(short, long, default_value = "false")]
    timing: bool,

    /// Debug: print effective stats for the bare request and exit
    #[arg(long, default_value = "false")]
    debug_stats: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match RequestConfig::from_file(&args.request) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading request: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = config.context();
    let settings = config.settings();
    let mut request = match config.to_request() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error in request: {}", e);
            std::process::exit(1);
        }
    };
    request.constraints.parallel = args.parallel;

    if args.debug_stats {
        let stats = calculate_effective_stats(&request.base, &[], &ctx, &settings);
        println!("============================================================");
        println!("EFFECTIVE STATS ({:?})", request.role);
        println!("============================================================");
        println!("Power:          {}", stats.attributes.power);
        println!("Precision:      {}", stats.attributes.precision);
        println!("Ferocity:       {}", stats.attributes.ferocity);
        println!("Condition Dmg:  {}", stats.attributes.condition_damage);
        println!("Expertise:      {}", stats.attributes.expertise);
        println!("Concentration:  {}", stats.attributes.concentration);
        println!("Toughness:      {}", stats.attributes.toughness);
        println!("Vitality:       {}", stats.attributes.vitality);
        println!("Healing Power:  {}", stats.attributes.healing_power);
        println!();
        println!("Effective Power:{:.1}", stats.derived.effective_power);
        println!("Effective Cond: {:.1}", stats.derived.effective_condition_damage);
        println!("Crit Chance:    {:.4} ({:.2}%)", stats.derived.crit_chance, stats.derived.crit_chance * 100.0);
        println!("Crit Damage:    {:.4}", stats.derived.crit_damage);
        println!("Cond Duration:  +{:.2}%", stats.derived.condition_duration_bonus * 100.0);
        println!("Boon Duration:  +{:.2}%", stats.derived.boon_duration_bonus * 100.0);
        println!("Max Health:     {:.0}", stats.derived.max_health);
        println!("Strike Mult:    {:.4}", stats.strike_multiplier);
        println!("Condition Mult: {:.4}", stats.condition_multiplier);
        println!("Incoming Mult:  {:.4}", stats.incoming_multiplier);
        return;
    }

    let registry = ItemRegistry::standard();
    let presets = PresetTable::standard();
    let rotations = RotationTable::standard();
    let data = GameData {
        registry: &registry,
        presets: &presets,
        rotations: &rotations,
    };

    let start = Instant::now();
    let results = match optimize_equipment(&request, &data, &ctx, &settings) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Optimization failed: {}", e);
            std::process::exit(1);
        }
    };

    let gear_plan = if args.gear {
        match optimize_gear(
            request.role,
            request.constraints.mode,
            request.constraints.experience,
            &request.base,
            &presets,
        ) {
            Ok(plan) => Some(plan),
            Err(e) => {
                eprintln!("Gear search failed: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        None
    };
    let elapsed = start.elapsed();

    match args.output {
        OutputFormat::Text => {
            println!("=== Equipment Optimization Results ===");
            println!("Role: {:?}", request.role);
            println!();
            for (rank, result) in results.iter().enumerate() {
                let c = &result.candidate;
                println!("#{} {} / {}", rank + 1, c.preset, c.relic.as_deref().unwrap_or("-"));
                println!("   Sigils:     {}", c.sigils.join(", "));
                if let Some(consumable) = &c.consumable {
                    println!("   Consumable: {}", consumable);
                }
                println!(
                    "   Overall: {:.1}  DPS: {:.1}  HPS: {:.1}  Survivability: {:.2}",
                    result.overall,
                    result.breakdown.rotation_dps,
                    result.breakdown.rotation_hps,
                    result.survivability
                );
                println!(
                    "   Effective Power: {:.0}  Crit: {:.1}% x{:.2}  Burst: {:.0}",
                    result.breakdown.effective_power,
                    result.breakdown.crit_chance * 100.0,
                    result.breakdown.crit_damage,
                    result.breakdown.burst_damage
                );
                println!();
            }
            if let Some(plan) = &gear_plan {
                println!("=== Armor Preset Plan ===");
                for assignment in &plan.slots {
                    println!("   {:10} {}", assignment.slot, assignment.preset);
                }
                println!(
                    "   Score: {:.1} after {} passes ({} unmet floors)",
                    plan.score, plan.passes, plan.unmet_floors
                );
                println!();
            }
            if args.timing {
                println!("--- Performance ---");
                println!("Total time: {:.3}s", elapsed.as_secs_f64());
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "role": request.role,
                "parallel": args.parallel,
                "elapsed_seconds": elapsed.as_secs_f64(),
                "results": results,
                "gear_plan": gear_plan,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        }
    }
}
