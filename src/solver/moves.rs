use crate::action::Move;
use crate::board::{Board, Location, TARGET_SUM};

use smallvec::SmallVec;

pub type PossibleMoves = SmallVec<[Move; 32]>;

/// Fills `possible_moves` with every legal move from `board`.
///
/// Order is fixed: matches first, pairs taken by ascending source (stacks by
/// index, the slot last), then one stash per non-empty stack when the slot is
/// free. The search relies on this order to be reproducible.
pub fn compute_possible_moves(board: &Board, possible_moves: &mut PossibleMoves) {
    possible_moves.clear();
    let exposed = board.exposed();

    for (i, &(first_loc, first_card)) in exposed.iter().enumerate() {
        for &(second_loc, second_card) in &exposed[i + 1..] {
            if first_card.rank() + second_card.rank() == TARGET_SUM {
                possible_moves.push(Move::Match {
                    sources: [first_loc, second_loc],
                    cards: [first_card, second_card],
                });
            }
        }
    }

    if board.slot.is_none() {
        for &(location, card) in &exposed {
            if let Location::Stack(from) = location {
                possible_moves.push(Move::Stash { from, card });
            }
        }
    }
}

pub fn possible_moves(board: &Board) -> PossibleMoves {
    let mut moves = PossibleMoves::new();
    compute_possible_moves(board, &mut moves);
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;

    fn card(rank: u8) -> Card {
        Card::new_with_rank_suit(rank, 0)
    }

    fn board(stacks: &[&[u8]]) -> Board {
        Board::new(stacks.iter().map(|s| s.iter().map(|&r| card(r)).collect::<Vec<_>>()))
    }

    #[test]
    fn test_goal_has_no_moves() {
        assert!(possible_moves(&board(&[&[], &[]])).is_empty());
    }

    #[test]
    fn test_matches_before_stashes() {
        let b = board(&[&[6, 7], &[9, 6], &[2]]);
        let moves = possible_moves(&b);
        assert_eq!(
            moves.as_slice(),
            &[
                Move::Match {
                    sources: [Location::Stack(0), Location::Stack(1)],
                    cards: [card(7), card(6)],
                },
                Move::Stash {
                    from: 0,
                    card: card(7)
                },
                Move::Stash {
                    from: 1,
                    card: card(6)
                },
                Move::Stash {
                    from: 2,
                    card: card(2)
                },
            ]
        );
    }

    #[test]
    fn test_pairs_in_ascending_order() {
        let mut b = board(&[&[6], &[7], &[], &[7]]);
        b.slot = Some(card(6));
        let moves = possible_moves(&b);
        let notation: Vec<String> = moves.iter().map(|m| m.notation()).collect();
        assert_eq!(notation, vec!["S1+S2", "S1+S4", "S2+X", "S4+X"]);
    }

    #[test]
    fn test_occupied_slot_blocks_stash() {
        let mut b = board(&[&[2], &[5]]);
        b.slot = Some(card(3));
        assert!(possible_moves(&b).is_empty());
    }

    #[test]
    fn test_slot_alone_is_dead_end() {
        let mut b = board(&[&[], &[]]);
        b.slot = Some(card(4));
        assert!(!b.is_goal());
        assert!(possible_moves(&b).is_empty());
    }

    #[test]
    fn test_every_move_applies() {
        let b = board(&[&[1, 12, 6], &[5, 7], &[8, 11], &[2]]);
        for mov in possible_moves(&b) {
            let next = b.apply(&mov).unwrap();
            assert_eq!(next.card_count(), b.card_count() - mov.cards_removed());
        }
    }
}
