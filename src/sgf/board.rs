use super::SgfError;
use goban::rules::game::Game;
use goban::rules::{GobanSizes, Move, CHINESE};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub fn lower(self) -> char {
        match self {
            Color::Black => 'b',
            Color::White => 'w',
        }
    }

    pub fn upper(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
        }
    }

    pub fn sgf_key(self) -> &'static str {
        match self {
            Color::Black => "B",
            Color::White => "W",
        }
    }
}

/// Zero-indexed from the top-left corner, SGF style.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Point {
    pub x: u8,
    pub y: u8,
}

/// Legality checks live in goban. Moves must arrive strictly alternating,
/// Black first, since goban tracks the turn itself.
pub struct Board {
    game: Game,
}

impl Board {
    pub fn new(size: u8) -> Board {
        Board {
            game: Game::new(GobanSizes::Custom(size as usize, size as usize), CHINESE),
        }
    }

    pub fn play(&mut self, p: Point) -> Result<(), SgfError> {
        self.game
            .try_play(Move::Play(p.x, p.y))
            .map(|_| ())
            .map_err(|err| SgfError::IllegalMove(format!("{err:?}")))
    }

    pub fn pass(&mut self) {
        let _ = self.game.try_play(Move::Pass);
    }
}
