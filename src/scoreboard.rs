use crate::config::Config;

pub fn record(winners: &mut String, result_tag: &str) {
    let engine_one_is_black = winners.len() % 2 == 0;
    let c = match result_tag.chars().next() {
        Some('B') => {
            if engine_one_is_black {
                '1'
            } else {
                '2'
            }
        }
        Some('W') => {
            if engine_one_is_black {
                '2'
            } else {
                '1'
            }
        }
        _ => '0',
    };
    winners.push(c);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineScore {
    pub wins: usize,
    pub wins_black: usize,
    pub wins_white: usize,
    pub games_black: usize,
    pub games_white: usize,
}

impl EngineScore {
    pub fn games(&self) -> usize {
        self.games_black + self.games_white
    }
}

pub fn standings(winners: &str) -> [EngineScore; 2] {
    let mut scores = [EngineScore::default(); 2];
    for (round, c) in winners.chars().enumerate() {
        let black = round % 2;
        let white = 1 - black;
        let winner = match c {
            '1' => 0,
            '2' => 1,
            _ => continue, // void rounds count toward nobody
        };
        scores[black].games_black += 1;
        scores[white].games_white += 1;
        scores[winner].wins += 1;
        if winner == black {
            scores[winner].wins_black += 1;
        } else {
            scores[winner].wins_white += 1;
        }
    }
    scores
}

pub fn print_scores(config: &Config) {
    print!("{}", score_table(config));
}

fn score_table(config: &Config) -> String {
    let scores = standings(&config.winners);
    let mut out = String::from("\n\n");
    out.push_str(&format_row("", "", "wins", "", "black", "", "white"));
    for (engine, score) in config.engines.iter().zip(scores.iter()) {
        out.push_str(&format_row(
            &engine.name,
            &score.wins.to_string(),
            &percent(score.wins, score.games()),
            &score.wins_black.to_string(),
            &percent(score.wins_black, score.games_black),
            &score.wins_white.to_string(),
            &percent(score.wins_white, score.games_white),
        ));
    }
    out.push('\n');
    out
}

fn format_row(
    name: &str,
    wins: &str,
    wins_pct: &str,
    black: &str,
    black_pct: &str,
    white: &str,
    white_pct: &str,
) -> String {
    format!(" {name:<20.20}   {wins:>4} {wins_pct:<7} {black:>4} {black_pct:<7} {white:>4} {white_pct:<7}\n")
}

fn percent(wins: usize, games: usize) -> String {
    if games == 0 {
        String::from("0%")
    } else {
        format!("{:.0}%", 100.0 * wins as f64 / games as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn two_engine_config(winners: &str) -> Config {
        Config {
            engines: vec![
                EngineConfig {
                    name: String::from("alpha"),
                    path: String::from("/bin/alpha"),
                    args: vec![],
                    commands: vec![],
                },
                EngineConfig {
                    name: String::from("beta"),
                    path: String::from("/bin/beta"),
                    args: vec![],
                    commands: vec![],
                },
            ],
            timeout_seconds: 60,
            passing_wins: false,
            restart: false,
            games: 100,
            size: 19,
            komi: 7.5,
            winners: winners.to_string(),
        }
    }

    #[test]
    fn black_win_in_round_zero_goes_to_engine_one() {
        let mut winners = String::new();
        record(&mut winners, "B+R");
        assert_eq!(winners, "1");
    }

    #[test]
    fn black_win_in_round_one_goes_to_engine_two() {
        // Round 1 is odd, so engine two holds Black there.
        let mut winners = String::from("1");
        record(&mut winners, "B+R");
        assert_eq!(winners, "12");
    }

    #[test]
    fn white_wins_follow_the_same_parity() {
        let mut winners = String::new();
        record(&mut winners, "W+");
        assert_eq!(winners, "2");
        record(&mut winners, "W+R");
        assert_eq!(winners, "21");
    }

    #[test]
    fn non_colour_tags_record_a_void_round() {
        let mut winners = String::new();
        record(&mut winners, "Void");
        record(&mut winners, "");
        assert_eq!(winners, "00");
    }

    #[test]
    fn standings_split_wins_by_colour() {
        // Round 0: engine one wins as Black. Round 1: engine one wins as
        // White. Round 2: void. Round 3: engine two wins as Black.
        let scores = standings("1102");
        assert_eq!(scores[0].wins, 2);
        assert_eq!(scores[0].wins_black, 1);
        assert_eq!(scores[0].wins_white, 1);
        assert_eq!(scores[0].games_black, 1); // round 2 was void
        assert_eq!(scores[0].games_white, 2);
        assert_eq!(scores[1].wins, 1);
        assert_eq!(scores[1].wins_black, 1);
        assert_eq!(scores[1].wins_white, 0);
        assert_eq!(scores[1].games_black, 2);
        assert_eq!(scores[1].games_white, 1);
    }

    #[test]
    fn void_rounds_shrink_the_denominator() {
        let scores = standings("100");
        assert_eq!(scores[0].games(), 1);
        assert_eq!(scores[1].games(), 1);
        assert_eq!(scores[0].wins, 1);
    }

    #[test]
    fn wins_plus_voids_account_for_every_round() {
        let winners = "120012011202";
        let scores = standings(winners);
        let voids = winners.chars().filter(|&c| c == '0').count();
        assert_eq!(
            scores[0].wins + scores[1].wins + voids,
            winners.len()
        );
        assert_eq!(scores[0].games(), scores[1].games());
        assert_eq!(scores[0].games(), winners.len() - voids);
    }

    #[test]
    fn table_output_is_stable() {
        let config = two_engine_config("121");
        let first = score_table(&config);
        let second = score_table(&config);
        assert_eq!(first, second);
        assert!(first.contains("alpha"));
        assert!(first.contains("beta"));
        assert!(first.contains("wins"));
    }

    #[test]
    fn empty_scoreboard_prints_zero_percentages() {
        let config = two_engine_config("");
        let table = score_table(&config);
        assert!(table.contains("0%"));
    }

    #[test]
    fn replay_from_a_reloaded_string_matches() {
        // Resuming from a persisted winners string yields the same parity
        // assignments as the run that produced it.
        let mut live = String::new();
        for tag in ["B+R", "W+", "Void", "B+"] {
            record(&mut live, tag);
        }
        let reloaded = live.clone();
        assert_eq!(standings(&live), standings(&reloaded));
        assert_eq!(live, "1102");
    }
}
