// tests/scenarios.rs
// End-to-end checks of the rules engine through the public API.

use bingo::card::Card;
use bingo::defs::Number;
use bingo::drawn::DrawnSet;
use bingo::error::{BingoError, CardDefect};
use bingo::evaluator::{Rules, Verdict, WinMode, classify, evaluate};
use bingo::marks::{MarkedSet, can_mark};
use bingo::ranker::{NearWinner, NearWinnerStrategy, rank, rank_structural};

fn reference_card() -> Card {
    serde_json::from_str(
        "[[1,16,31,46,61],[2,17,32,47,62],[3,18,0,48,63],[4,19,34,49,64],[5,20,35,50,65]]",
    )
    .unwrap()
}

fn drawn(numbers: &[Number]) -> DrawnSet {
    DrawnSet::from_numbers(numbers.iter().copied()).unwrap()
}

#[test]
fn first_column_completes_a_line() {
    let card = reference_card();
    assert_eq!(evaluate(&card, &drawn(&[1, 2, 3, 4, 5]), WinMode::Line), Verdict::Complete);
}

#[test]
fn one_away_structurally_is_not_a_marking_lag_near_winner() {
    let card = reference_card();
    let d = drawn(&[1, 2, 3, 4]);
    assert_eq!(evaluate(&card, &d, WinMode::Line), Verdict::NotClose);

    let marked: MarkedSet = [1, 2, 3, 4].into_iter().collect();
    assert_eq!(rank(&card, &marked, &d, 3), None);
    assert_eq!(
        rank_structural(&card, &d, WinMode::Line, 3),
        Some(NearWinner { missing: vec![5] })
    );

    let lag = Rules::new(WinMode::Line, 3, NearWinnerStrategy::MarkingLag).unwrap();
    assert_eq!(classify(&card, &marked, &d, &lag), Verdict::NotClose);
    let structural = Rules::new(WinMode::Line, 3, NearWinnerStrategy::Structural).unwrap();
    assert_eq!(classify(&card, &marked, &d, &structural), Verdict::Near { missing: vec![5] });
}

#[test]
fn near_winner_boundary_at_threshold_three() {
    let card = reference_card();
    let rules = Rules::new(WinMode::Full, 3, NearWinnerStrategy::MarkingLag).unwrap();

    let d = drawn(&[65, 17, 48]);
    assert_eq!(
        classify(&card, &MarkedSet::new(), &d, &rules),
        Verdict::Near { missing: vec![17, 48, 65] }
    );

    let d = drawn(&[65, 17, 48, 2]);
    assert_eq!(rank(&card, &MarkedSet::new(), &d, 3), None);
    assert_eq!(classify(&card, &MarkedSet::new(), &d, &rules), Verdict::NotClose);
}

#[test]
fn full_mode_is_never_complete_with_a_cell_missing() {
    let card = reference_card();
    for skipped in card.numbers() {
        let rest: Vec<Number> = card.numbers().filter(|&n| n != skipped).collect();
        assert_ne!(evaluate(&card, &drawn(&rest), WinMode::Full), Verdict::Complete);
    }
}

#[test]
fn marking_follows_the_draw() {
    let card = reference_card();
    let mut d = DrawnSet::new();
    assert!(!can_mark(&card, &d, 34));
    d.push(34).unwrap();
    assert!(can_mark(&card, &d, 34));
    assert_eq!(d.push(34), Err(BingoError::DuplicateDraw(34)));
    assert!(can_mark(&card, &d, 34));
}

#[test]
fn malformed_cards_are_rejected_at_the_boundary() {
    let err = serde_json::from_str::<Card>(
        "[[1,16,31,46,61],[2,17,32,47,62],[3,18,33,48,63],[4,19,34,49,64],[5,20,35,50,65]]",
    );
    assert!(err.is_err());

    let rows = vec![vec![1, 16, 31, 46, 61]; 5];
    assert_eq!(
        Card::from_rows(rows),
        Err(BingoError::MalformedCard(CardDefect::DuplicateNumber(1)))
    );
}
