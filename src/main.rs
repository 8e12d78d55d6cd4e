use contagion_graph::data_management::{self, ModelDataStore, ModelParameters, ScenarioKind};
use contagion_graph::stats::StatsLog;
use contagion_graph::{ContactGraph, ContagionError, StdRandom};
use log::{debug, error, info};
use std::env;
use std::io::{self, Write};
use std::process;

fn main() {
    // process command line arguments (for now just the model root directory location)
    let args: Vec<_> = env::args().collect();
    let model_root = match args.get(1) {
        Some(root) => root.clone(),
        None => {
            eprintln!("Error: no model location specified");
            eprintln!("usage: {} <model root directory>", args[0]);
            process::exit(2);
        }
    };

    if let Err(e) = run(&model_root) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(model_root: &str) -> Result<(), ContagionError> {
    // The model data store handles all models inputs and outputs
    let model_data_store = ModelDataStore::new(model_root)?;
    let model_parms = model_data_store.get_model_parms()?;
    init_logging(&model_parms);

    println!("\n--------------------Contagion Model-----------------------");
    println!("{}", model_parms);

    let population =
        data_management::PopulationData::load(&model_parms.population, model_parms.random_seed)?;

    for (index, kind) in model_parms.scenarios.iter().enumerate() {
        let scenario_number = index + 1;
        println!(
            "\nStarting scenario {} ({}) ------------------------------------------------------------",
            scenario_number, kind
        );

        // each scenario gets its own stream, offset so scenarios differ but stay reproducible
        let rng = match model_parms.random_seed {
            Some(seed) => StdRandom::with_seed(seed.wrapping_add(scenario_number as u64)),
            None => StdRandom::from_entropy(),
        };
        let mut graph = population.build_graph(rng)?;
        graph.set_mitigation_scope(model_parms.mitigation_scope);
        debug!("contacts:\n{}", graph);

        let scenario_dir = model_data_store.create_scenario_directory(scenario_number, *kind)?;
        let mut stats_log = StatsLog::new(&scenario_dir.join("statistics.csv"), &kind.to_string())?;

        println!("{}", graph.statistics_snapshot());
        run_scenario(&mut graph, *kind, &model_parms, &mut stats_log)?;
        stats_log.flush()?;

        println!("After the simulation.");
        println!("{}", graph.statistics_snapshot());
        info!(
            "scenario {} done - results in {}",
            scenario_number,
            scenario_dir.display()
        );
    }
    Ok(())
}

fn run_scenario(
    graph: &mut ContactGraph<StdRandom>,
    kind: ScenarioKind,
    parms: &ModelParameters,
    stats_log: &mut StatsLog,
) -> Result<(), ContagionError> {
    let mut remaining = parms.steps;

    match kind {
        ScenarioKind::Baseline => {
            stats_log.append(0, &graph.statistics_snapshot())?;
        }
        // the policy runs the first step itself
        ScenarioKind::Mitigation => {
            if remaining == 0 {
                return Ok(());
            }
            let distanced = graph.mitigation_policy()?;
            println!("{} people reduced their contacts", distanced);
            stats_log.append(graph.steps_run(), &graph.statistics_snapshot())?;
            remaining -= 1;
        }
    }

    print!("Running {} steps", remaining);
    io::stdout().flush()?;
    for _ in 0..remaining {
        graph.step()?;
        stats_log.append(graph.steps_run(), &graph.statistics_snapshot())?;
        print!(".");
        io::stdout().flush()?;
    }
    println!();
    Ok(())
}

// RUST_LOG wins over the log level in the parameter file
fn init_logging(parms: &ModelParameters) {
    let default_level = parms.log_level.as_deref().unwrap_or("warn");
    let env = env_logger::Env::default().default_filter_or(default_level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        eprintln!("logger already initialized");
    }
}
