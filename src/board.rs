use crate::action::Move;
use crate::card::Card;
use crate::error::MoveError;

use anyhow::{Context, Result, bail};
use smallvec::SmallVec;
use std::fmt;

/// Rank sum two exposed cards must reach to be removed together.
pub const TARGET_SUM: u8 = 13;
pub const MAX_STACKS: usize = 12;
/// Most stacks a board may be dealt into.
pub const STACK_LIMIT: usize = 64;
pub const STACK_SIZE: usize = 8;

pub type Stack = SmallVec<[Card; STACK_SIZE]>;
pub type Exposed = SmallVec<[(Location, Card); MAX_STACKS + 1]>;

/// Where an exposed card sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    Stack(usize),
    Slot,
}

impl Location {
    /// Compact form used in move listings: `S1`, `S2`, ... and `X` for the slot.
    pub fn short(&self) -> String {
        match self {
            Location::Stack(idx) => format!("S{}", idx + 1),
            Location::Slot => "X".into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Stack(idx) => write!(f, "Stack{}", idx + 1),
            Location::Slot => write!(f, "Slot"),
        }
    }
}

/// One position of the game: every stack (bottom to top) plus the overflow slot.
///
/// Two boards are equal only when every stack holds the same cards in the same
/// order, hidden cards included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Board {
    pub stacks: SmallVec<[Stack; MAX_STACKS]>,
    pub slot: Option<Card>,
}

impl Board {
    pub fn new<I, S>(stacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = Card>,
    {
        Self {
            stacks: stacks.into_iter().map(|s| s.into_iter().collect()).collect(),
            slot: None,
        }
    }

    pub fn stack_count(&self) -> usize {
        self.stacks.len()
    }

    pub fn card_count(&self) -> usize {
        self.stacks.iter().map(|s| s.len()).sum::<usize>() + self.slot.is_some() as usize
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.stacks
            .iter()
            .flat_map(|s| s.iter().copied())
            .chain(self.slot)
    }

    pub fn is_goal(&self) -> bool {
        self.slot.is_none() && self.stacks.iter().all(|s| s.is_empty())
    }

    pub fn peek(&self, location: Location) -> Option<Card> {
        match location {
            Location::Stack(idx) => self.stacks.get(idx).and_then(|s| s.last().copied()),
            Location::Slot => self.slot,
        }
    }

    /// Exposed cards in source order: stack tops by ascending index, then the slot.
    pub fn exposed(&self) -> Exposed {
        let mut exposed: Exposed = self
            .stacks
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| s.last().map(|&card| (Location::Stack(idx), card)))
            .collect();
        if let Some(card) = self.slot {
            exposed.push((Location::Slot, card));
        }
        exposed
    }

    /// Returns the successor board, leaving `self` untouched.
    pub fn apply(&self, mov: &Move) -> Result<Board, MoveError> {
        let mut next = self.clone();
        next.play(mov)?;
        Ok(next)
    }

    /// Applies `mov` in place. The board is unchanged when an error is returned.
    pub fn play(&mut self, mov: &Move) -> Result<(), MoveError> {
        self.check(mov)?;
        match *mov {
            Move::Match { sources, .. } => {
                for location in sources {
                    self.take(location);
                }
            }
            Move::Stash { from, card } => {
                self.stacks[from].pop();
                self.slot = Some(card);
            }
        }
        Ok(())
    }

    /// Reverts a move previously played on this board.
    pub fn unplay(&mut self, mov: &Move) {
        match *mov {
            Move::Match { sources, cards } => {
                for (location, card) in sources.into_iter().zip(cards) {
                    match location {
                        Location::Stack(idx) => self.stacks[idx].push(card),
                        Location::Slot => self.slot = Some(card),
                    }
                }
            }
            Move::Stash { from, card } => {
                self.slot = None;
                self.stacks[from].push(card);
            }
        }
    }

    fn check(&self, mov: &Move) -> Result<(), MoveError> {
        match *mov {
            Move::Match { sources, cards } => {
                let [a, b] = sources;
                if a == b {
                    return Err(MoveError::SameSource(a));
                }
                for (location, card) in sources.into_iter().zip(cards) {
                    self.check_exposed(location, card)?;
                }
                if cards[0].rank() + cards[1].rank() != TARGET_SUM {
                    return Err(MoveError::RankSumMismatch {
                        first: cards[0],
                        second: cards[1],
                        target: TARGET_SUM,
                    });
                }
            }
            Move::Stash { from, card } => {
                if self.slot.is_some() {
                    return Err(MoveError::SlotOccupied);
                }
                self.check_exposed(Location::Stack(from), card)?;
            }
        }
        Ok(())
    }

    fn check_exposed(&self, location: Location, card: Card) -> Result<(), MoveError> {
        if let Location::Stack(index) = location
            && index >= self.stacks.len()
        {
            return Err(MoveError::StackOutOfRange {
                index,
                stacks: self.stacks.len(),
            });
        }
        match self.peek(location) {
            None => Err(MoveError::EmptySource(location)),
            Some(found) if found != card => Err(MoveError::CardMismatch {
                location,
                expected: card,
                found,
            }),
            Some(_) => Ok(()),
        }
    }

    fn take(&mut self, location: Location) {
        match location {
            Location::Stack(idx) => {
                self.stacks[idx].pop();
            }
            Location::Slot => self.slot = None,
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut board: Self = Default::default();
        let mut listed = [false; STACK_LIMIT];

        for line in content
            .split('\n')
            .map(|v| v.trim())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
        {
            let line_context = || format!("Failed to parse at '{line}'");
            if let Some(rest) = line.strip_prefix("Slot:") {
                let cards = Self::parse_cards(rest.trim()).with_context(line_context)?;
                if cards.len() > 1 {
                    bail!("The slot holds at most one card; {}", line_context());
                }
                board.slot = cards.first().copied();
            } else if let Some(rest) = line.strip_prefix("Stack") {
                let mut parts = rest.splitn(2, ':');
                let idx = parts
                    .next()
                    .unwrap_or("")
                    .trim()
                    .parse::<usize>()
                    .context("Invalid stack index")
                    .with_context(line_context)?;
                if idx == 0 || idx > STACK_LIMIT {
                    bail!(
                        "Stack indices run from 1 to {STACK_LIMIT}; {}",
                        line_context()
                    );
                }
                let idx = idx - 1;
                if std::mem::replace(&mut listed[idx], true) {
                    bail!("Stack{} is listed twice", idx + 1);
                }
                let cards = Self::parse_cards(parts.next().unwrap_or("").trim())
                    .with_context(line_context)?;
                if board.stacks.len() <= idx {
                    board.stacks.resize(idx + 1, Stack::new());
                }
                board.stacks[idx].extend(cards);
            } else {
                bail!("Unrecognized line '{line}'");
            }
        }

        Ok(board)
    }

    fn parse_cards(s: &str) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        let mut chars = s.chars().peekable();
        while let Some(&c1) = chars.peek() {
            if c1.is_whitespace() || c1 == ',' {
                chars.next();
                continue;
            }
            let rank = c1;
            chars.next();
            let Some(suit) = chars.next() else {
                bail!("Missing suit after rank '{rank}'");
            };
            cards.push(Card::parse(rank, suit)?);
        }
        Ok(cards)
    }

    pub fn pretty_print(&self) -> String {
        let mut lines = Vec::with_capacity(self.stacks.len() + 1);
        for (i, stack) in self.stacks.iter().enumerate() {
            let cards: String = stack.iter().map(|c| c.to_string()).collect();
            lines.push(format!("Stack{}: {cards}", i + 1).trim_end().to_string());
        }
        if let Some(card) = self.slot {
            lines.push(format!("Slot: {card}"));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(s: &str) -> Card {
        let mut chars = s.chars();
        Card::parse(chars.next().unwrap(), chars.next().unwrap()).unwrap()
    }

    #[test]
    fn test_parse_board() {
        const BOARD_STR: &str = r#"Stack1: 6♣7♦
Stack2: 9♠4♥K♣
Stack3:
Stack4: A♦
Slot: Q♥"#;

        let board = Board::parse(BOARD_STR).unwrap();
        assert_eq!(board.stack_count(), 4);
        assert_eq!(board.card_count(), 7);
        assert_eq!(board.slot, Some(card("Q♥")));
        assert_eq!(BOARD_STR, board.pretty_print());
    }

    #[test]
    fn test_parse_ascii_and_errors() {
        let board = Board::parse("# comment\nStack2: 6c 7d\nStack1: ah").unwrap();
        assert_eq!(board.stacks[0].as_slice(), &[card("A♥")]);
        assert_eq!(board.stacks[1].as_slice(), &[card("6♣"), card("7♦")]);

        assert!(Board::parse("Stack0: 6♣").is_err());
        assert!(Board::parse("Stack1: 6").is_err());
        assert!(Board::parse("Slot: 6♣7♣").is_err());
        assert!(Board::parse("Stack1: 6♣\nStack1: 7♣").is_err());
        assert!(Board::parse("Pile1: 6♣").is_err());
    }

    #[test]
    fn test_parse_stack_index_bounds() {
        let err = Board::parse("Stack99999999999999: 6♣").unwrap_err();
        assert!(format!("{err:#}").contains("run from 1 to 64"));
        assert!(Board::parse("Stack65: 6♣").is_err());

        let board = Board::parse("Stack64: 6♣").unwrap();
        assert_eq!(board.stack_count(), STACK_LIMIT);
        assert_eq!(board.card_count(), 1);
    }

    #[test]
    fn test_parse_rejects_repeated_empty_stack() {
        assert!(Board::parse("Stack1:\nStack1: 6♣").is_err());
        assert!(Board::parse("Stack2:\nStack1: 6♣\nStack2:").is_err());
        let board = Board::parse("Stack1: 6♣\nStack3:").unwrap();
        assert_eq!(board.stack_count(), 3);
    }

    #[test]
    fn test_exposed_order() {
        let mut board = Board::new([vec![card("6♣"), card("7♦")], vec![], vec![card("9♠")]]);
        board.slot = Some(card("4♥"));
        let exposed = board.exposed();
        assert_eq!(
            exposed.as_slice(),
            &[
                (Location::Stack(0), card("7♦")),
                (Location::Stack(2), card("9♠")),
                (Location::Slot, card("4♥")),
            ]
        );
    }

    #[test]
    fn test_apply_match_and_stash() {
        let board = Board::new([vec![card("6♣"), card("7♦")], vec![card("9♠"), card("6♥")]]);
        let stash = Move::Stash {
            from: 0,
            card: card("7♦"),
        };
        let after_stash = board.apply(&stash).unwrap();
        assert_eq!(after_stash.slot, Some(card("7♦")));
        assert_eq!(after_stash.card_count(), board.card_count());
        assert_eq!(board.stacks[0].len(), 2, "source board must be untouched");

        let matched = Move::Match {
            sources: [Location::Stack(1), Location::Slot],
            cards: [card("6♥"), card("7♦")],
        };
        let after_match = after_stash.apply(&matched).unwrap();
        assert_eq!(after_match.slot, None);
        assert_eq!(after_match.card_count(), board.card_count() - 2);
    }

    #[test]
    fn test_illegal_moves() {
        let mut board = Board::new([vec![card("6♣"), card("7♦")], vec![card("5♠")]]);
        let bad_sum = Move::Match {
            sources: [Location::Stack(0), Location::Stack(1)],
            cards: [card("7♦"), card("5♠")],
        };
        assert!(matches!(
            board.apply(&bad_sum),
            Err(MoveError::RankSumMismatch { .. })
        ));

        let empty_slot = Move::Match {
            sources: [Location::Stack(0), Location::Slot],
            cards: [card("7♦"), card("6♠")],
        };
        assert_eq!(board.apply(&empty_slot), Err(MoveError::EmptySource(Location::Slot)));

        let wrong_card = Move::Stash {
            from: 0,
            card: card("6♣"),
        };
        assert!(matches!(board.apply(&wrong_card), Err(MoveError::CardMismatch { .. })));

        let out_of_range = Move::Stash {
            from: 5,
            card: card("6♣"),
        };
        assert!(matches!(
            board.apply(&out_of_range),
            Err(MoveError::StackOutOfRange { index: 5, stacks: 2 })
        ));

        board.slot = Some(card("A♣"));
        let full_slot = Move::Stash {
            from: 1,
            card: card("5♠"),
        };
        assert_eq!(board.apply(&full_slot), Err(MoveError::SlotOccupied));
    }

    #[test]
    fn test_unplay_restores_board() {
        let original = Board::new([vec![card("6♣"), card("7♦")], vec![card("9♠"), card("6♥")]]);
        let mut board = original.clone();
        let moves = [
            Move::Match {
                sources: [Location::Stack(0), Location::Stack(1)],
                cards: [card("7♦"), card("6♥")],
            },
            Move::Stash {
                from: 1,
                card: card("9♠"),
            },
        ];
        for mov in &moves {
            board.play(mov).unwrap();
        }
        for mov in moves.iter().rev() {
            board.unplay(mov);
        }
        assert_eq!(board, original);
    }
}
