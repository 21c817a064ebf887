use crate::config::Config;
use crate::engine::Engine;
use crate::game;
use crate::scoreboard;
use crate::watchdog::Watchdog;
use log::info;
use std::collections::HashMap;
use std::path::Path;
use std::process;
use std::time::{Duration, Instant};

const STARTUP_GRACE: Duration = Duration::from_secs(120);

pub fn run(mut config: Config, save_path: &Path) -> ! {
    let watchdog = Watchdog::spawn();
    watchdog.push_deadline(Instant::now() + STARTUP_GRACE);

    let mut engines: Vec<Engine> = Vec::with_capacity(2);
    for engine_config in &config.engines {
        match Engine::start(engine_config, &watchdog) {
            Ok(engine) => engines.push(engine),
            Err(err) => {
                eprintln!("couldn't start {}: {err}", engine_config.name);
                clean_quit(1, &mut engines);
            }
        }
    }

    for engine in engines.iter_mut() {
        match engine.send_and_receive("name") {
            Ok(reply) => info!("{} identifies as {reply:?}", engine.name()),
            Err(err) => {
                eprintln!("{} failed the name probe: {err}", engine.name());
                clean_quit(1, &mut engines);
            }
        }
    }

    // dyer signature -> first filename that produced it
    let mut dyers: HashMap<String, String> = HashMap::new();
    let mut collisions = 0usize;

    for round in config.winners.len()..config.games {
        info!("round {round} of {}", config.games);
        let outcome = game::play_game(&mut engines, round, &config, &watchdog, Path::new("."));

        scoreboard::record(&mut config.winners, &outcome.result_tag);
        if let Err(err) = config.save(save_path) {
            eprintln!("{err:#}");
        }

        if !outcome.filename.is_empty() {
            match dyers.get(&outcome.dyer) {
                Some(first) => {
                    collisions += 1;
                    println!("{} looks similar to {first}", outcome.filename);
                }
                None => {
                    dyers.insert(outcome.dyer.clone(), outcome.filename.clone());
                }
            }
        }

        scoreboard::print_scores(&config);

        if outcome.fatal.is_some() {
            clean_quit(1, &mut engines);
        }

        if config.restart && round + 1 < config.games {
            for engine in engines.iter_mut() {
                if let Err(err) = engine.restart() {
                    eprintln!("couldn't restart {}: {err}", engine.name());
                    clean_quit(1, &mut engines);
                }
            }
        }
    }

    println!("{collisions} Dyer signature collision(s).");
    clean_quit(0, &mut engines);
}

fn clean_quit(code: i32, engines: &mut [Engine]) -> ! {
    for engine in engines.iter_mut() {
        print!("Killing {}...", engine.name());
        match engine.kill() {
            Ok(()) => println!(),
            Err(err) => println!(" {err}"),
        }
    }
    process::exit(code);
}
