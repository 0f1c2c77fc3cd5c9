use serde::{Deserialize, Serialize};

/// Which list a declaration line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Matches the leading keyword of a declaration line.
    pub fn from_keyword(token: &str) -> Option<Direction> {
        match token {
            "input" => Some(Direction::Input),
            "output" => Some(Direction::Output),
            _ => None,
        }
    }
}

/// One `input`/`output` line from the descriptor header, e.g.
/// `input  1 is log_rtosa_1 in [-4.6,0.2]`.
///
/// The variable name is the fourth whitespace-separated token. The full line
/// is kept for [`NetworkModel::info`](crate::network::NetworkModel::info).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub line: String,
}

impl Declaration {
    /// Parses a declaration line. Returns `None` when the line does not start
    /// with `input`/`output` or carries fewer than four tokens.
    pub fn parse(line: &str) -> Option<(Direction, Declaration)> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let direction = Direction::from_keyword(tokens.first()?)?;
        let name = tokens.get(3)?;
        Some((
            direction,
            Declaration {
                name: (*name).to_string(),
                line: line.trim_end().to_string(),
            },
        ))
    }
}
