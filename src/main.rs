//! Ares Colony - Entry Point
//!
//! Hosts a single-player session in the terminal: founds a colony for a
//! chosen faction, then runs an interactive loop for advancing turns,
//! constructing buildings, and researching technologies.

use ares_colony::character::Character;
use ares_colony::core::config::EngineConfig;
use ares_colony::core::error::Result;
use ares_colony::session::GameSession;

use std::io::{self, Write};

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("ares_colony=info")
        .init();

    tracing::info!("Ares Colony starting...");

    let config = EngineConfig::default();
    if let Err(reason) = config.validate() {
        tracing::error!(%reason, "invalid engine config");
        return Ok(());
    }

    let mut session = GameSession::new(config);
    let character = Character::new("Cmdr. Alex Shepard", Some("l1_born_leader".to_string()));
    let player_id = session
        .add_player("Commander", "MUSK_CORP", character)
        .expect("built-in faction");

    println!("\n=== ARES COLONY ===");
    println!("A Mars colony economy simulation");
    println!();
    println!("Commands:");
    println!("  tick / t          - Advance one turn");
    println!("  run <n>           - Advance n turns");
    println!("  build <id>        - Construct a building (blueprint id)");
    println!("  upgrade <id>      - Upgrade a building");
    println!("  research <id>     - Start researching a technology");
    println!("  status / s        - Show the habitat report");
    println!("  quit / q          - Exit");
    println!();

    loop {
        print!("turn {}> ", session.current_turn);
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let argument = parts.next();

        match (command, argument) {
            ("tick" | "t", _) => {
                report_turn(&mut session);
            }
            ("run", Some(n)) => {
                let count: u64 = n.parse().unwrap_or(1);
                for _ in 0..count {
                    session.advance_turn();
                }
                println!("Advanced {count} turns.");
            }
            ("build", Some(blueprint_id)) => match session.build(player_id, blueprint_id) {
                Ok(outcome) => println!("{}", outcome.message()),
                Err(e) => println!("Error: {e}"),
            },
            ("upgrade", Some(blueprint_id)) => match session.upgrade(player_id, blueprint_id) {
                Ok(outcome) => println!("{}", outcome.message()),
                Err(e) => println!("Error: {e}"),
            },
            ("research", Some(tech_id)) => match session.start_research(player_id, tech_id) {
                Ok(gate) => println!("{}", gate.message()),
                Err(e) => println!("Error: {e}"),
            },
            ("status" | "s", _) => match session.status_report(player_id) {
                Ok(report) => println!("{report}"),
                Err(e) => println!("Error: {e}"),
            },
            ("quit" | "q", _) => break,
            ("", _) => {}
            _ => println!("Unknown command. Try: tick, run <n>, build <id>, status, quit"),
        }
    }

    tracing::info!("Ares Colony shutting down");
    Ok(())
}

fn report_turn(session: &mut GameSession) {
    let results = session.advance_turn();
    for (_, outcomes) in &results {
        for (_, outcome) in outcomes {
            if outcome.energy_deficit {
                println!("WARNING: energy deficit!");
            }
            if outcome.population_growth > 0.0 {
                println!("Population grew by {:.2}", outcome.population_growth);
            }
        }
    }
    println!("Turn {} complete.", session.current_turn);
}
