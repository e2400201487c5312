// demos/trainer.rs
// Run with:
//   RUST_LOG=times_tables=debug cargo run --example trainer

use std::time::{SystemTime, UNIX_EPOCH};

use times_tables::systems::sdk::{MemoryStore, Offline};
use times_tables::{Trainer, TrainerConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(7);

    let mut trainer = Trainer::new(MemoryStore::new(), TrainerConfig::default(), seed);
    trainer.load();

    let characters = trainer.characters(&Offline);
    trainer.resolve_chains(&characters, &Offline);
    println!("== Characters ==");
    for c in &characters {
        println!("  #{:<3} {}", c.id, c.name);
    }

    if let Err(err) = trainer.select_character(133) {
        eprintln!("select failed: {err}");
        return;
    }

    // Two hard tables; a slip only re-queues the fact.
    for (table, slip) in [(7, true), (8, false)] {
        if let Err(err) = trainer.choose_table(table) {
            eprintln!("table {table}: {err}");
            continue;
        }
        let mut session = match trainer.start_session() {
            Ok(s) => s,
            Err(err) => {
                eprintln!("session failed: {err}");
                return;
            }
        };
        let mut slipped = !slip;
        while let Some(task) = session.current().cloned() {
            let answer = if slipped { task.answer } else { task.answer + 1 };
            slipped = true;
            let graded = session.submit(answer);
            if let Some(t) = graded {
                println!(
                    "  {} x {} = {:<3} {}",
                    t.multiplicand,
                    t.multiplier,
                    answer,
                    if t.is_correct == Some(true) { "ok" } else { "retry" }
                );
            }
        }
        let report = session.report();
        match trainer.complete_session(&report) {
            Ok(award) => println!(
                "== {}x table: +{} points (perfect={}, first time={}, mistakes={}) ==",
                table, award.points, award.perfect, award.first_time, report.mistakes
            ),
            Err(err) => eprintln!("completion failed: {err}"),
        }
    }

    loop {
        match trainer.evolve() {
            Ok(record) => println!("== Evolved {} -> {} ==", record.from.name, record.to.name),
            Err(err) => {
                println!("== No more evolutions: {err} ==");
                break;
            }
        }
    }

    let offers = trainer.shop(&Offline);
    let points = trainer.state().points;
    println!("== Shop ({} points) ==", points);
    for offer in offers.iter().filter(|o| !o.owned).take(5) {
        println!(
            "  {:<16} {:>4} pts {}",
            offer.character.name,
            offer.price,
            if offer.affordable(points) { "" } else { "(locked)" }
        );
    }

    let summary = trainer.summary();
    println!("== Summary ==");
    println!("{summary:#?}");
}
