//! The SGF surface the match driver relies on: a main-line game tree with
//! property nodes, GTP coordinate parsing, move legality, Dyer signatures,
//! and (de)serialization.

mod board;

pub use board::{Board, Color, Point};

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug)]
pub enum SgfError {
    BadCoordinate(String),
    IllegalMove(String),
    Parse(String),
}

impl fmt::Display for SgfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SgfError::BadCoordinate(text) => write!(f, "bad coordinate {text:?}"),
            SgfError::IllegalMove(reason) => write!(f, "illegal move: {reason}"),
            SgfError::Parse(reason) => write!(f, "malformed SGF: {reason}"),
        }
    }
}

impl std::error::Error for SgfError {}

// GTP column letters skip I.
const COLUMNS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// Parses a GTP vertex ("Q16", any case) into a point, or `None` for "pass".
pub fn parse_gtp(text: &str, size: u8) -> Result<Option<Point>, SgfError> {
    if text.eq_ignore_ascii_case("pass") {
        return Ok(None);
    }
    let bad = || SgfError::BadCoordinate(text.to_string());
    let mut chars = text.chars();
    let letter = chars.next().ok_or_else(&bad)?.to_ascii_uppercase();
    let x = COLUMNS
        .iter()
        .position(|&c| c as char == letter)
        .ok_or_else(&bad)?;
    let row: u8 = chars.as_str().parse().map_err(|_| bad())?;
    if x >= size as usize || row < 1 || row > size {
        return Err(bad());
    }
    Ok(Some(Point {
        x: x as u8,
        y: size - row,
    }))
}

pub fn point_to_sgf(p: Point) -> String {
    let mut coords = String::with_capacity(2);
    coords.push((b'a' + p.x) as char);
    coords.push((b'a' + p.y) as char);
    coords
}

#[derive(Debug, Default, Clone)]
pub struct Node {
    props: Vec<(String, Vec<String>)>,
}

impl Node {
    pub fn set_value(&mut self, key: &str, value: &str) {
        match self.props.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => *values = vec![value.to_string()],
            None => self.props.push((key.to_string(), vec![value.to_string()])),
        }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.props
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    fn push_value(&mut self, key: &str, value: String) {
        match self.props.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => self.props.push((key.to_string(), vec![value])),
        }
    }

    fn serialize_into(&self, out: &mut String) {
        out.push(';');
        for (key, values) in &self.props {
            out.push_str(key);
            for value in values {
                out.push('[');
                for c in value.chars() {
                    if c == ']' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push(']');
            }
        }
    }
}

/// A single main line of nodes. `nodes[0]` is the root; every later node
/// carries exactly one B or W move property.
pub struct GameTree {
    size: u8,
    board: Board,
    nodes: Vec<Node>,
    moves: Vec<Option<String>>,
}

impl GameTree {
    pub fn new(size: u8) -> GameTree {
        debug_assert!((1..=25).contains(&size));
        let mut root = Node::default();
        root.set_value("GM", "1");
        root.set_value("FF", "4");
        root.set_value("CA", "UTF-8");
        root.set_value("SZ", &size.to_string());
        GameTree {
            size,
            board: Board::new(size),
            nodes: vec![root],
            moves: Vec::new(),
        }
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn root_value(&self, key: &str) -> Option<&str> {
        self.nodes[0].value(key)
    }

    pub fn set_root_value(&mut self, key: &str, value: &str) {
        self.nodes[0].set_value(key, value);
    }

    pub fn set_last_value(&mut self, key: &str, value: &str) {
        if let Some(node) = self.nodes.last_mut() {
            node.set_value(key, value);
        }
    }

    /// Plays a GTP move string for `color`, checking legality, and appends
    /// the move node. "pass" is accepted and appended as a pass.
    pub fn play_gtp(&mut self, color: Color, text: &str) -> Result<(), SgfError> {
        match parse_gtp(text, self.size)? {
            Some(point) => {
                self.board.play(point)?;
                let coords = point_to_sgf(point);
                let mut node = Node::default();
                node.set_value(color.sgf_key(), &coords);
                self.nodes.push(node);
                self.moves.push(Some(coords));
                Ok(())
            }
            None => {
                self.pass(color);
                Ok(())
            }
        }
    }

    pub fn pass(&mut self, color: Color) {
        self.board.pass();
        let mut node = Node::default();
        node.set_value(color.sgf_key(), "");
        self.nodes.push(node);
        self.moves.push(None);
    }

    /// Dyer signature: the coordinates of moves 20, 40, 60, 31, 51 and 71,
    /// with `??` standing in for passes and moves the game never reached.
    pub fn dyer(&self) -> String {
        const PLIES: [usize; 6] = [20, 40, 60, 31, 51, 71];
        let mut signature = String::with_capacity(12);
        for ply in PLIES {
            match self.moves.get(ply - 1).and_then(|m| m.as_deref()) {
                Some(coords) if coords.len() == 2 => signature.push_str(coords),
                _ => signature.push_str("??"),
            }
        }
        signature
    }

    pub fn serialize(&self) -> String {
        let mut out = String::from("(");
        for node in &self.nodes {
            node.serialize_into(&mut out);
        }
        out.push(')');
        out.push('\n');
        out
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.serialize())
    }
}

/// Parses the main line of an SGF file. At each branch only the first
/// variation is followed, and moves are not replayed for legality.
pub fn parse(text: &str) -> Result<GameTree, SgfError> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    skip_whitespace(&chars, &mut i);
    if chars.get(i) != Some(&'(') {
        return Err(SgfError::Parse(String::from("expected '('")));
    }
    i += 1;

    let mut nodes: Vec<Node> = Vec::new();
    loop {
        skip_whitespace(&chars, &mut i);
        match chars.get(i) {
            Some(&';') => {
                i += 1;
                nodes.push(parse_node(&chars, &mut i)?);
            }
            // Descend into the first variation; the main line ends at the
            // first close paren.
            Some(&'(') => i += 1,
            Some(&')') | None => break,
            Some(&other) => {
                return Err(SgfError::Parse(format!("unexpected character {other:?}")));
            }
        }
    }
    if nodes.is_empty() {
        return Err(SgfError::Parse(String::from("no nodes")));
    }

    let size: u8 = match nodes[0].value("SZ") {
        Some(text) => text
            .parse()
            .ok()
            .filter(|s| (1..=25).contains(s))
            .ok_or_else(|| SgfError::Parse(format!("unsupported board size {text:?}")))?,
        None => 19,
    };

    let mut moves = Vec::new();
    for node in &nodes {
        for key in ["B", "W"] {
            if let Some(value) = node.value(key) {
                moves.push(if value.len() == 2 {
                    Some(value.to_string())
                } else {
                    None
                });
            }
        }
    }

    Ok(GameTree {
        size,
        board: Board::new(size),
        nodes,
        moves,
    })
}

fn skip_whitespace(chars: &[char], i: &mut usize) {
    while matches!(chars.get(*i), Some(c) if c.is_whitespace()) {
        *i += 1;
    }
}

fn parse_node(chars: &[char], i: &mut usize) -> Result<Node, SgfError> {
    let mut node = Node::default();
    loop {
        skip_whitespace(chars, i);
        match chars.get(*i) {
            Some(c) if c.is_ascii_alphabetic() => {
                let start = *i;
                while matches!(chars.get(*i), Some(c) if c.is_ascii_alphabetic()) {
                    *i += 1;
                }
                let key: String = chars[start..*i].iter().collect();
                skip_whitespace(chars, i);
                if chars.get(*i) != Some(&'[') {
                    return Err(SgfError::Parse(format!("property {key} has no value")));
                }
                while chars.get(*i) == Some(&'[') {
                    *i += 1;
                    let mut value = String::new();
                    loop {
                        match chars.get(*i) {
                            Some(&'\\') => {
                                *i += 1;
                                if let Some(&c) = chars.get(*i) {
                                    value.push(c);
                                    *i += 1;
                                }
                            }
                            Some(&']') => {
                                *i += 1;
                                break;
                            }
                            Some(&c) => {
                                value.push(c);
                                *i += 1;
                            }
                            None => {
                                return Err(SgfError::Parse(String::from(
                                    "unterminated property value",
                                )));
                            }
                        }
                    }
                    node.push_value(&key, value);
                    skip_whitespace(chars, i);
                }
            }
            _ => return Ok(node),
        }
    }
}
