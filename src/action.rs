use crate::board::Location;
use crate::card::Card;

use std::fmt;

/// A single play.
///
/// Each move records the exposed cards it consumes so it can be checked
/// against a board, replayed, and reverted without looking anything up.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Move {
    /// Removes the exposed cards at two distinct sources whose ranks sum to 13.
    Match {
        sources: [Location; 2],
        cards: [Card; 2],
    },
    /// Parks the top card of a stack in the empty overflow slot.
    Stash { from: usize, card: Card },
}

impl Move {
    pub fn is_stash(&self) -> bool {
        matches!(self, Move::Stash { .. })
    }

    /// Net change in the number of cards on the table.
    pub fn cards_removed(&self) -> usize {
        match self {
            Move::Match { .. } => 2,
            Move::Stash { .. } => 0,
        }
    }

    /// Compact notation: `S1+S4`, `S2+X` or `S3>X`.
    pub fn notation(&self) -> String {
        match self {
            Move::Match { sources, .. } => {
                format!("{}+{}", sources[0].short(), sources[1].short())
            }
            Move::Stash { from, .. } => format!("{}>X", Location::Stack(*from).short()),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.notation())
    }
}

pub fn format_moves(moves: &[Move]) -> String {
    let list: Vec<String> = moves.iter().map(Move::notation).collect();

    let mut output = String::new();
    let max_width = list.iter().map(|s| s.len()).max().unwrap_or_default() + 1;
    for chunk in list.chunks(10) {
        for cmd in chunk {
            output.push_str(&format!("{cmd:<width$}", width = max_width));
        }
        output.push('\n');
    }

    output
}

pub fn describe_move(mov: &Move) -> String {
    match mov {
        Move::Match { sources, cards } => format!(
            "({}) {} + ({}) {}",
            sources[0], cards[0], sources[1], cards[1]
        ),
        Move::Stash { from, card } => {
            format!("({}) {card} -> (Slot)", Location::Stack(*from))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(rank: u8, suit: u8) -> Card {
        Card::new_with_rank_suit(rank, suit)
    }

    #[test]
    fn test_notation() {
        let m = Move::Match {
            sources: [Location::Stack(0), Location::Slot],
            cards: [card(6, 0), card(7, 1)],
        };
        assert_eq!(m.notation(), "S1+X");
        assert_eq!(describe_move(&m), "(Stack1) 6♣ + (Slot) 7♦");
        assert_eq!(m.cards_removed(), 2);

        let s = Move::Stash {
            from: 2,
            card: card(12, 3),
        };
        assert_eq!(s.to_string(), "S3>X");
        assert_eq!(describe_move(&s), "(Stack3) Q♥ -> (Slot)");
        assert!(s.is_stash());
        assert_eq!(s.cards_removed(), 0);
    }

    #[test]
    fn test_format_moves() {
        let moves: Vec<Move> = (0..12)
            .map(|i| Move::Stash {
                from: i,
                card: card(1, 0),
            })
            .collect();
        let output = format_moves(&moves);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("S1>X  S2>X"));
        assert!(lines[1].starts_with("S11>X S12>X"));
        assert_eq!(format_moves(&[]), "");
    }
}
