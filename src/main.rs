//! Harmony Evolution CLI - Run a sequence search from a JSON task file.

use std::time::Instant;

use harmony_evolution::{
    evolution::{
        Callback, EarlyStopping, EvolutionEngine, EvolutionRng, LogProgress, SequenceGene,
        TargetScore,
    },
    schema::SearchTask,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <task.json>", args[0]);
        eprintln!();
        eprintln!("Evolve a symbol sequence toward the task's target.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  task.json  Path to search task file");
        eprintln!();
        eprintln!("Example task is printed with the --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_task();
        return;
    }

    let task = SearchTask::load(&args[1]).unwrap_or_else(|e| {
        eprintln!("Error loading task: {}", e);
        std::process::exit(1);
    });

    println!("Harmony Evolution");
    println!("=================");
    println!("Alphabet: {}", task.alphabet.join(" "));
    println!("Target: {}", task.target.join(" "));
    println!("Population: {}", task.population_size);
    println!("Selection: {:?}", task.selection);
    println!("Max epochs: {}", task.evolution.max_epochs);
    println!();

    // Initial population draws from a stream derived from the run seed, so
    // the engine's own stream is not replayed.
    let mut rng = match task.evolution.random_seed {
        Some(seed) => EvolutionRng::new(EvolutionRng::new(seed).next_seed()),
        None => EvolutionRng::from_entropy(),
    };
    let population = SequenceGene::initialize_population(
        task.population_size,
        task.target.len(),
        task.alphabet.clone(),
        &mut rng,
    )
    .unwrap_or_else(|e| {
        eprintln!("Error creating population: {}", e);
        std::process::exit(1);
    });

    let mut progress = LogProgress::new(task.log_interval);
    let mut early_stopping = task.patience.map(EarlyStopping::new);
    let mut target_score = task.target_score.map(TargetScore::new);

    let mut callbacks: Vec<&mut dyn Callback<SequenceGene<String>>> = Vec::new();
    callbacks.push(&mut progress);
    if let Some(cb) = early_stopping.as_mut() {
        callbacks.push(cb);
    }
    if let Some(cb) = target_score.as_mut() {
        callbacks.push(cb);
    }

    let engine = EvolutionEngine::new(task.evolution.clone(), task.selection.clone());

    println!("Running evolution...");
    let start = Instant::now();
    let result = engine
        .run(
            |gene: &SequenceGene<String>| task.match_fraction(gene.loci()),
            population,
            &mut callbacks,
        )
        .unwrap_or_else(|e| {
            eprintln!("Evolution failed: {}", e);
            std::process::exit(1);
        });
    let elapsed = start.elapsed();

    println!();
    println!("Result:");
    println!("  Best: {}", result.best);
    println!("  Best score: {:.4}", result.best_score);
    println!("  Epochs: {}", result.stats.epochs);
    println!("  Stop reason: {:?}", result.stats.stop_reason);
    println!("  Evaluations: {}", result.stats.total_evaluations);
    println!("  Seed: {}", result.stats.seed);
    println!(
        "  Time: {:.2}s ({:.1} evals/s)",
        elapsed.as_secs_f32(),
        result.stats.evaluations_per_second
    );
}

fn print_example_task() {
    let task = SearchTask::default();

    println!("Example task (task.json):");
    match serde_json::to_string_pretty(&task) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example: {}", e),
    }
}
