use log::info;
use std::env;
use std::path::Path;
use std::process;

use twogtp::config::Config;
use twogtp::runner;
use twogtp::scoreboard;

fn main() {
    flexi_logger::Logger::try_with_env().unwrap().start().ok();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        let program = args
            .first()
            .map(|a| Path::new(a))
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("twogtp"));
        println!("Usage: {program} config_file");
        process::exit(1);
    }

    let config_path = Path::new(&args[1]);
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:#}");
            process::exit(1);
        }
    };
    info!("{config:#?}");

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(err) = env::set_current_dir(parent) {
            eprintln!("couldn't enter {}: {err}", parent.display());
            process::exit(1);
        }
    }
    let save_path = config_path
        .file_name()
        .map(Path::new)
        .unwrap_or(config_path);

    if config.winners.len() >= config.games {
        println!("Match already ended.");
        scoreboard::print_scores(&config);
        process::exit(0);
    }

    runner::run(config, save_path);
}
