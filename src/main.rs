//! EVM Vanity Address Generator CLI
//!
//! Usage:
//!   evm_vanity 1ead                  # Find address starting with "1ead"
//!   evm_vanity cafe prefix           # Same, explicit position
//!   evm_vanity dead suffix true      # Address ending with "dead", exact checksum case

use std::process;

use clap::Parser;

use evm_vanity::{
    CancellationSignal, Cli, MatchResult, Pattern, SearchCoordinator, SearchOutcome, SearchStats,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config = match cli.search_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let pattern = Pattern::from_config(&config);

    println!("EVM Vanity Address Generator");
    println!("============================");
    println!("Pattern:        0x{} ({})", pattern.pattern(), pattern.position());
    println!("Case-sensitive: {}", pattern.case_sensitive());
    println!("Difficulty:     {}", pattern.difficulty_description());
    println!("Workers:        {}", config.worker_count());
    println!();

    let coordinator = match SearchCoordinator::new(config) {
        Ok(coordinator) => coordinator,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    ctrlc_handler(coordinator.cancellation());

    println!("Searching... (Press Ctrl+C to stop)\n");

    match coordinator.run_with(print_progress) {
        Ok(SearchOutcome::Found { result, stats }) => print_result(&result, &stats),
        Ok(SearchOutcome::Cancelled { stats }) => {
            println!("\n\nSearch stopped by user");
            println!(
                "Checked {} keys in {:.1}s",
                format_number(stats.attempts),
                stats.elapsed.as_secs_f64()
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn print_result(result: &MatchResult, stats: &SearchStats) {
    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!(
        "FOUND in {:.1} seconds after {} attempts!",
        stats.elapsed.as_secs_f64(),
        format_number(stats.attempts)
    );
    println!("{}", rule);
    println!("\nAddress:     {}", result.address);
    println!("Private Key: 0x{}", result.private_key_hex());
    println!("\n{}", rule);
    println!("WARNING: SAVE THE PRIVATE KEY IMMEDIATELY!");
    println!("WARNING: It is not stored anywhere and will not be shown again.");
    println!("{}\n", rule);
}

fn print_progress(stats: &SearchStats) {
    println!(
        "[{:>4}s] Speed: {} keys/s | Checked: {} keys",
        stats.elapsed.as_secs(),
        format_number(stats.keys_per_second() as u64),
        format_number(stats.attempts)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(signal: CancellationSignal) {
    if let Err(e) = ctrlc::set_handler(move || {
        signal.cancel();
    }) {
        log::warn!("Ctrl-C handler not installed: {}", e);
    }
}
