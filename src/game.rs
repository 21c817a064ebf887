use crate::config::Config;
use crate::engine::Engine;
use crate::sgf::{Color, GameTree};
use crate::watchdog::Watchdog;
use chrono::Local;
use log::{error, warn};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(5);

pub struct RoundOutcome {
    pub result_tag: String,
    pub filename: String,
    pub dyer: String,
    pub fatal: Option<anyhow::Error>,
}

pub fn play_game(
    engines: &mut [Engine],
    round: usize,
    config: &Config,
    watchdog: &Watchdog,
    out_dir: &Path,
) -> RoundOutcome {
    let (black_idx, white_idx) = if round % 2 == 0 { (0, 1) } else { (1, 0) };

    let mut tree = GameTree::new(config.size);
    tree.set_root_value("KM", &format!("{:.1}", config.komi));
    {
        let black = &engines[black_idx];
        let white = &engines[white_idx];
        tree.set_root_value(
            "C",
            &format!(
                "Black:  {}\n{:?}\n\nWhite:  {}\n{:?}",
                black.base(),
                black.args(),
                white.base(),
                white.args()
            ),
        );
        tree.set_root_value("PB", black.name());
        tree.set_root_value("PW", white.name());
    }

    // Best-effort; not every engine has clear_cache.
    for engine in engines.iter_mut() {
        let mut setup = vec![
            format!("boardsize {}", config.size),
            format!("komi {:.1}", config.komi),
            String::from("clear_board"),
            String::from("clear_cache"),
        ];
        setup.extend(engine.commands().to_vec());
        for command in setup {
            if let Err(err) = engine.send_and_receive(&command) {
                warn!("{}: {command:?} failed: {err}", engine.name());
            }
        }
    }

    let snapshot_path = out_dir.join("current.sgf");
    let mut last_snapshot = Instant::now();
    let mut passes_in_a_row = 0;
    let mut result_tag = String::new();
    let mut fatal: Option<anyhow::Error> = None;

    let mut color = Color::White; // flipped at the top of the loop

    loop {
        color = color.opposite();
        let (engine_idx, opponent_idx) = match color {
            Color::Black => (black_idx, white_idx),
            Color::White => (white_idx, black_idx),
        };

        if last_snapshot.elapsed() > SNAPSHOT_INTERVAL {
            if let Err(err) = tree.save(&snapshot_path) {
                warn!("couldn't write {}: {err}", snapshot_path.display());
            }
            last_snapshot = Instant::now();
        }

        let reply = engines[engine_idx].send_and_receive(&format!("genmove {}", color.lower()));
        watchdog.push_deadline(Instant::now() + Duration::from_secs(config.timeout_seconds));

        let mv = match reply {
            Ok(mv) => mv,
            Err(err) => {
                tree.set_root_value("RE", "Void");
                result_tag = String::from("Void");
                fatal = Some(err.into());
                break;
            }
        };

        print!("{mv} ");
        let _ = io::stdout().flush();

        if mv.eq_ignore_ascii_case("resign") {
            result_tag = format!("{}+R", color.opposite().upper());
            tree.set_root_value("RE", &result_tag);
            break;
        }

        if mv.eq_ignore_ascii_case("pass") {
            passes_in_a_row += 1;
            tree.pass(color);
            if config.passing_wins {
                result_tag = format!("{}+", color.upper());
                tree.set_root_value("RE", &result_tag);
                tree.set_last_value(
                    "C",
                    &format!("{} declared victory.", engines[engine_idx].base()),
                );
                break;
            }
            if passes_in_a_row >= 2 {
                // Nobody here can score the board.
                break;
            }
        } else {
            passes_in_a_row = 0;
            if let Err(err) = tree.play_gtp(color, &mv) {
                tree.set_root_value("RE", "Void");
                result_tag = String::from("Void");
                fatal = Some(err.into());
                break;
            }
        }

        // Relay the move. Only reached with a playable move, including "pass".
        let relay = engines[opponent_idx].send_and_receive(&format!("play {} {mv}", color.lower()));
        if let Err(err) = relay {
            tree.set_root_value("RE", "Void");
            result_tag = String::from("Void");
            fatal = Some(err.into());
            break;
        }
    }

    match (&fatal, result_tag.is_empty()) {
        (Some(err), _) => println!("\n\n{err}"),
        (None, false) => println!("\n{result_tag}"),
        (None, true) => println!(),
    }

    let stamp = Local::now().format("%Y%m%d-%H-%M-%S").to_string();
    let mut filename = String::new();
    match next_output_name(out_dir, &stamp) {
        Some(name) => {
            let path = out_dir.join(&name);
            match tree.save(&path) {
                Ok(()) => filename = name,
                Err(err) => error!("couldn't write {}: {err}", path.display()),
            }
        }
        None => error!("no free output filename for {stamp}.sgf"),
    }
    let _ = fs::remove_file(&snapshot_path);

    RoundOutcome {
        result_tag,
        filename,
        dyer: tree.dyer(),
        fatal,
    }
}

fn next_output_name(dir: &Path, stamp: &str) -> Option<String> {
    let plain = format!("{stamp}.sgf");
    if !dir.join(&plain).exists() {
        return Some(plain);
    }
    ('a'..='z')
        .map(|suffix| format!("{stamp}{suffix}.sgf"))
        .find(|name| !dir.join(name).exists())
}
