// bingo/src/game.rs
// In-memory game shell around the rules engine: players join with a card, the
// caller draws numbers, players mark them, and the first complete card is
// claimed as the single winner.
//
// Mutex acquisition order: status -> pouch -> drawn -> cards -> winner.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card::{Card, CardGenerator};
use crate::defs::Number;
use crate::drawn::DrawnSet;
use crate::error::BingoError;
use crate::evaluator::{Rules, Verdict, WinMode, evaluate, evaluate_claim};
use crate::logging::{log_info, log_warning};
use crate::marks::{MarkedSet, apply_mark};
use crate::pouch::Pouch;
use crate::ranker::{NearWinnerReport, PlayerCard, find_near_winners};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub player: String,
    pub card_id: String,
}

/// The persistence side the rules engine relies on. `set_winner_if_none` is
/// the at-most-once claim: it records `winner` only when no winner exists and
/// reports whether this call was the one that recorded it.
pub trait GameStore {
    fn insert_draw(&self, number: Number) -> Result<(), BingoError>;
    fn drawn_numbers(&self) -> Result<DrawnSet, BingoError>;
    fn set_winner_if_none(&self, winner: Winner) -> Result<bool, BingoError>;
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &'static str) -> Result<MutexGuard<'a, T>, BingoError> {
    mutex.lock().map_err(|_| BingoError::LockPoisoned(name))
}

fn new_game_id() -> String {
    format!("game_{:08x}", rand::rng().random::<u32>())
}

#[derive(Clone)]
pub struct Game {
    id: Arc<Mutex<String>>,
    created_at: Arc<Mutex<SystemTime>>,
    mode: WinMode,
    status: Arc<Mutex<GameStatus>>,
    pouch: Arc<Mutex<Pouch>>,
    drawn: Arc<Mutex<DrawnSet>>,
    cards: Arc<Mutex<Vec<PlayerCard>>>,
    winner: Arc<Mutex<Option<Winner>>>,
}

impl Game {
    pub fn new(mode: WinMode) -> Self {
        Self {
            id: Arc::new(Mutex::new(new_game_id())),
            created_at: Arc::new(Mutex::new(SystemTime::now())),
            mode,
            status: Arc::new(Mutex::new(GameStatus::Waiting)),
            pouch: Arc::new(Mutex::new(Pouch::new())),
            drawn: Arc::new(Mutex::new(DrawnSet::new())),
            cards: Arc::new(Mutex::new(Vec::new())),
            winner: Arc::new(Mutex::new(None)),
        }
    }

    pub fn id(&self) -> Result<String, BingoError> {
        Ok(lock(&self.id, "game id")?.clone())
    }

    pub fn created_at_string(&self) -> Result<String, BingoError> {
        let created_at = *lock(&self.created_at, "creation time")?;
        let datetime: DateTime<Utc> = created_at.into();
        Ok(datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    }

    pub fn mode(&self) -> WinMode {
        self.mode
    }

    pub fn status(&self) -> Result<GameStatus, BingoError> {
        Ok(*lock(&self.status, "status")?)
    }

    pub fn winner(&self) -> Result<Option<Winner>, BingoError> {
        Ok(lock(&self.winner, "winner")?.clone())
    }

    pub fn pouch_len(&self) -> Result<usize, BingoError> {
        Ok(lock(&self.pouch, "pouch")?.len())
    }

    /// Give `player` a fresh card. Joining closes once the first number is
    /// about to be drawn; a player who already joined gets their card back.
    pub fn join(&self, player: &str) -> Result<Card, BingoError> {
        let generator = CardGenerator::new();
        let status = lock(&self.status, "status")?;
        if *status != GameStatus::Waiting {
            return Err(BingoError::GameAlreadyStarted);
        }

        let mut cards = lock(&self.cards, "cards")?;
        if let Some(existing) = cards.iter().find(|entry| entry.player == player) {
            return Ok(existing.card.clone());
        }

        let card = loop {
            let card = generator.generate();
            if !cards.iter().any(|entry| entry.card == card) {
                break card;
            }
        };
        cards.push(PlayerCard {
            player: player.to_string(),
            card: card.clone(),
            marked: MarkedSet::new(),
        });
        log_info(&format!("Player '{player}' joined with card {}", card.id()));
        Ok(card)
    }

    /// Seat a player with a card restored from elsewhere.
    pub fn join_with_card(&self, player: &str, card: Card) -> Result<(), BingoError> {
        let status = lock(&self.status, "status")?;
        if *status != GameStatus::Waiting {
            return Err(BingoError::GameAlreadyStarted);
        }
        let mut cards = lock(&self.cards, "cards")?;
        cards.retain(|entry| entry.player != player);
        cards.push(PlayerCard {
            player: player.to_string(),
            card,
            marked: MarkedSet::new(),
        });
        Ok(())
    }

    pub fn start(&self) -> Result<(), BingoError> {
        let mut status = lock(&self.status, "status")?;
        if *status != GameStatus::Waiting {
            return Err(BingoError::GameAlreadyStarted);
        }
        *status = GameStatus::InProgress;
        log_info(&format!("Game {} started", lock(&self.id, "game id")?));
        Ok(())
    }

    /// Call the next number. When the pouch runs out the game ends, with the
    /// first complete card in join order as winner if there is one.
    pub fn draw(&self) -> Result<Number, BingoError> {
        let mut status = lock(&self.status, "status")?;
        self.record_draw(&mut status, Pouch::extract)
    }

    /// Shared by `draw` and `insert_draw`: `pick` takes the number out of the
    /// pouch, then it joins the history. Caller holds the status lock.
    fn record_draw<F>(&self, status: &mut GameStatus, pick: F) -> Result<Number, BingoError>
    where
        F: FnOnce(&mut Pouch) -> Result<Number, BingoError>,
    {
        if *status != GameStatus::InProgress {
            return Err(BingoError::GameNotInProgress);
        }

        let (number, exhausted) = {
            let mut pouch = lock(&self.pouch, "pouch")?;
            let mut drawn = lock(&self.drawn, "drawn")?;
            let number = pick(&mut pouch)?;
            drawn.push(number)?;
            (number, drawn.is_complete())
        };

        if exhausted {
            let (drawn, cards) = self.snapshot()?;
            match cards.iter().find(|entry| evaluate(&entry.card, &drawn, self.mode).is_complete()) {
                Some(entry) => {
                    let winner = Winner {
                        player: entry.player.clone(),
                        card_id: entry.card.id(),
                    };
                    self.record_winner(status, winner)?;
                }
                None => {
                    *status = GameStatus::Finished;
                    log_warning("All numbers drawn without a winner, game finished");
                }
            }
        }
        Ok(number)
    }

    /// Record `winner` unless one exists. Caller holds the status lock.
    fn record_winner(&self, status: &mut GameStatus, winner: Winner) -> Result<bool, BingoError> {
        let mut current = lock(&self.winner, "winner")?;
        if current.is_some() {
            return Ok(false);
        }
        log_info(&format!("BINGO! Winner is '{}' with card {}", winner.player, winner.card_id));
        *current = Some(winner);
        *status = GameStatus::Finished;
        Ok(true)
    }

    pub fn mark(&self, player: &str, number: Number) -> Result<MarkedSet, BingoError> {
        let status = lock(&self.status, "status")?;
        if *status != GameStatus::InProgress {
            return Err(BingoError::GameNotInProgress);
        }
        let drawn = lock(&self.drawn, "drawn")?;
        let mut cards = lock(&self.cards, "cards")?;
        let entry = cards
            .iter_mut()
            .find(|entry| entry.player == player)
            .ok_or_else(|| BingoError::UnknownPlayer(player.to_string()))?;

        entry.marked = apply_mark(&entry.card, &drawn, &entry.marked, number)?;
        Ok(entry.marked.clone())
    }

    pub fn card_of(&self, player: &str) -> Result<PlayerCard, BingoError> {
        lock(&self.cards, "cards")?
            .iter()
            .find(|entry| entry.player == player)
            .cloned()
            .ok_or_else(|| BingoError::UnknownPlayer(player.to_string()))
    }

    /// Consistent copy of the draws and every player's card.
    pub fn snapshot(&self) -> Result<(DrawnSet, Vec<PlayerCard>), BingoError> {
        let drawn = lock(&self.drawn, "drawn")?;
        let cards = lock(&self.cards, "cards")?;
        Ok((drawn.clone(), cards.clone()))
    }

    /// Evaluate every card against the current draws and claim the first
    /// complete one, in join order. Returns the recorded winner, which never
    /// changes once set.
    pub fn check_winners(&self) -> Result<Option<Winner>, BingoError> {
        let (drawn, cards) = self.snapshot()?;
        for entry in &cards {
            if evaluate(&entry.card, &drawn, self.mode).is_complete() {
                self.set_winner_if_none(Winner {
                    player: entry.player.clone(),
                    card_id: entry.card.id(),
                })?;
                break;
            }
        }
        self.winner()
    }

    /// A player calls BINGO on their own marks. True if this call won.
    pub fn claim(&self, player: &str) -> Result<bool, BingoError> {
        let (drawn, _) = self.snapshot()?;
        let entry = self.card_of(player)?;
        match evaluate_claim(&entry.card, &entry.marked, &drawn, self.mode) {
            Verdict::Complete => self.set_winner_if_none(Winner {
                player: entry.player,
                card_id: entry.card.id(),
            }),
            _ => Ok(false),
        }
    }

    pub fn near_winners(&self, rules: &Rules) -> Result<Vec<NearWinnerReport>, BingoError> {
        let (drawn, cards) = self.snapshot()?;
        Ok(find_near_winners(&cards, &drawn, rules))
    }

    /// Start over under a new id: draws, marks and winner are cleared, the
    /// seated players keep their cards.
    pub fn reset(&self) -> Result<(), BingoError> {
        let mut status = lock(&self.status, "status")?;
        let new_id = new_game_id();
        *lock(&self.id, "game id")? = new_id.clone();
        *lock(&self.created_at, "creation time")? = SystemTime::now();
        *lock(&self.pouch, "pouch")? = Pouch::new();
        *lock(&self.drawn, "drawn")? = DrawnSet::new();
        for entry in lock(&self.cards, "cards")?.iter_mut() {
            entry.marked = MarkedSet::new();
        }
        *lock(&self.winner, "winner")? = None;
        *status = GameStatus::Waiting;
        log_info(&format!("Game reset, new game ID: {new_id}"));
        Ok(())
    }

    pub fn game_info(&self) -> Result<String, BingoError> {
        let (drawn, cards) = self.snapshot()?;
        Ok(format!(
            "Game[id={}, created={}, mode={}, status={:?}, drawn={}, players={}]",
            self.id()?,
            self.created_at_string()?,
            self.mode,
            self.status()?,
            drawn.len(),
            cards.len()
        ))
    }
}

impl GameStore for Game {
    fn insert_draw(&self, number: Number) -> Result<(), BingoError> {
        let mut status = lock(&self.status, "status")?;
        self.record_draw(&mut status, |pouch| pouch.take(number))?;
        Ok(())
    }

    fn drawn_numbers(&self) -> Result<DrawnSet, BingoError> {
        Ok(lock(&self.drawn, "drawn")?.clone())
    }

    /// Only a seated player's card can win, and only while the game runs.
    /// Once a winner is recorded every later call returns false.
    fn set_winner_if_none(&self, winner: Winner) -> Result<bool, BingoError> {
        let mut status = lock(&self.status, "status")?;
        let seated = lock(&self.cards, "cards")?
            .iter()
            .any(|entry| entry.player == winner.player && entry.card.id() == winner.card_id);
        if !seated {
            return Err(BingoError::UnknownPlayer(winner.player));
        }
        if *status != GameStatus::InProgress {
            return match *lock(&self.winner, "winner")? {
                Some(_) => Ok(false),
                None => Err(BingoError::GameNotInProgress),
            };
        }
        self.record_winner(&mut status, winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn sample_card() -> Card {
        Card::from_rows(vec![
            vec![1, 16, 31, 46, 61],
            vec![2, 17, 32, 47, 62],
            vec![3, 18, 0, 48, 63],
            vec![4, 19, 34, 49, 64],
            vec![5, 20, 35, 50, 65],
        ])
        .unwrap()
    }

    #[test]
    fn test_game_creation() {
        let game = Game::new(WinMode::Line);
        let id = game.id().unwrap();
        assert!(id.starts_with("game_"));
        assert_eq!(id.len(), 13);
        assert_eq!(game.status().unwrap(), GameStatus::Waiting);
        assert_eq!(game.pouch_len().unwrap(), 75);
        assert_eq!(game.winner().unwrap(), None);
        assert!(game.created_at_string().unwrap().ends_with("UTC"));
        assert!(game.game_info().unwrap().contains("mode=line"));
    }

    #[test]
    fn test_join_only_while_waiting() {
        let game = Game::new(WinMode::Full);
        let card = game.join("ana").unwrap();
        assert_eq!(game.join("ana").unwrap(), card);
        game.join("bob").unwrap();

        assert_eq!(game.draw(), Err(BingoError::GameNotInProgress));
        game.start().unwrap();
        assert_eq!(game.start(), Err(BingoError::GameAlreadyStarted));
        assert_eq!(game.join("carl").unwrap_err(), BingoError::GameAlreadyStarted);
        assert_eq!(game.snapshot().unwrap().1.len(), 2);
    }

    #[test]
    fn test_draws_are_unique_until_finished() {
        let game = Game::new(WinMode::Full);
        game.start().unwrap();
        for _ in 0..75 {
            game.draw().unwrap();
        }
        let drawn = game.drawn_numbers().unwrap();
        assert!(drawn.is_complete());
        assert_eq!(drawn.sorted(), (1..=75).collect::<Vec<Number>>());
        assert_eq!(game.status().unwrap(), GameStatus::Finished);
        assert_eq!(game.draw(), Err(BingoError::GameNotInProgress));
    }

    #[test]
    fn test_mark_is_validated() {
        let game = Game::new(WinMode::Line);
        game.join_with_card("ana", sample_card()).unwrap();
        assert_eq!(game.mark("ana", 1), Err(BingoError::GameNotInProgress));
        game.start().unwrap();

        let first = game.draw().unwrap();
        let on_card = sample_card().contains(first);
        match game.mark("ana", first) {
            Ok(marked) => {
                assert!(on_card);
                assert!(marked.contains(first));
            }
            Err(e) => {
                assert!(!on_card);
                assert!(matches!(e, BingoError::InvalidMark { .. }));
            }
        }
        assert_eq!(
            game.mark("zed", first),
            Err(BingoError::UnknownPlayer("zed".to_string()))
        );
    }

    #[test]
    fn test_simultaneous_completion_has_one_winner() {
        let game = Game::new(WinMode::Full);
        game.join_with_card("ana", sample_card()).unwrap();
        game.join_with_card("bob", sample_card()).unwrap();
        game.start().unwrap();

        let mut winner = None;
        while winner.is_none() {
            game.draw().unwrap();
            winner = game.check_winners().unwrap();
        }
        let winner = winner.unwrap();
        assert_eq!(winner.player, "ana");
        assert_eq!(winner.card_id, sample_card().id());
        assert_eq!(game.status().unwrap(), GameStatus::Finished);

        // Later claims never replace the recorded winner
        let late = Winner { player: "bob".into(), card_id: sample_card().id() };
        assert!(!game.set_winner_if_none(late).unwrap());
        assert_eq!(game.check_winners().unwrap().unwrap().player, "ana");
    }

    #[test]
    fn test_claim_needs_marks() {
        let game = Game::new(WinMode::Line);
        game.join_with_card("ana", sample_card()).unwrap();
        game.start().unwrap();

        loop {
            let number = game.draw().unwrap();
            if !sample_card().contains(number) {
                continue;
            }
            // Drawn but not yet covered: the claim is refused
            assert!(!game.claim("ana").unwrap());
            game.mark("ana", number).unwrap();
            if game.claim("ana").unwrap() {
                break;
            }
        }
        assert_eq!(game.winner().unwrap().unwrap().player, "ana");
    }

    #[test]
    fn test_near_winners_track_marking_lag() {
        let game = Game::new(WinMode::Full);
        game.join_with_card("ana", sample_card()).unwrap();
        game.start().unwrap();
        let rules = Rules::default();

        let mut owed = Vec::new();
        while owed.len() < 2 {
            let number = game.draw().unwrap();
            if sample_card().contains(number) {
                owed.push(number);
            }
        }
        owed.sort();
        let reports = game.near_winners(&rules).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].player, "ana");
        assert_eq!(reports[0].missing, owed);
    }

    #[test]
    fn test_reset_clears_round_state() {
        let game = Game::new(WinMode::Line);
        game.join_with_card("ana", sample_card()).unwrap();
        let old_id = game.id().unwrap();
        game.start().unwrap();
        game.draw().unwrap();

        game.reset().unwrap();
        assert_ne!(game.id().unwrap(), old_id);
        assert_eq!(game.status().unwrap(), GameStatus::Waiting);
        assert!(game.drawn_numbers().unwrap().is_empty());
        assert_eq!(game.pouch_len().unwrap(), 75);
        assert_eq!(game.winner().unwrap(), None);
        let entry = game.card_of("ana").unwrap();
        assert!(entry.marked.is_empty());
        assert_eq!(entry.card, sample_card());
    }

    #[test]
    fn test_external_draw_needs_a_running_game() {
        let game = Game::new(WinMode::Full);
        assert_eq!(game.insert_draw(5), Err(BingoError::GameNotInProgress));
        assert!(game.drawn_numbers().unwrap().is_empty());
        assert_eq!(game.pouch_len().unwrap(), 75);

        game.start().unwrap();
        game.insert_draw(5).unwrap();
        assert_eq!(game.pouch_len().unwrap(), 74);
        assert_eq!(game.insert_draw(5), Err(BingoError::DuplicateDraw(5)));
        assert_eq!(game.insert_draw(76), Err(BingoError::NumberOutOfRange(76)));

        // The pouch never hands out a number that came in from outside
        for _ in 0..74 {
            assert_ne!(game.draw().unwrap(), 5);
        }
        assert!(game.drawn_numbers().unwrap().is_complete());
        assert_eq!(game.pouch_len().unwrap(), 0);
        assert_eq!(game.status().unwrap(), GameStatus::Finished);
    }

    #[test]
    fn test_winner_needs_seated_card_and_running_game() {
        let game = Game::new(WinMode::Line);
        game.join_with_card("ana", sample_card()).unwrap();
        let ana = Winner { player: "ana".into(), card_id: sample_card().id() };

        assert_eq!(game.set_winner_if_none(ana.clone()), Err(BingoError::GameNotInProgress));
        assert_eq!(game.status().unwrap(), GameStatus::Waiting);

        game.start().unwrap();
        let stranger = Winner { player: "zed".into(), card_id: sample_card().id() };
        assert_eq!(
            game.set_winner_if_none(stranger),
            Err(BingoError::UnknownPlayer("zed".to_string()))
        );
        let wrong_card = Winner { player: "ana".into(), card_id: "0000000000000000".into() };
        assert!(game.set_winner_if_none(wrong_card).is_err());
        assert_eq!(game.winner().unwrap(), None);

        assert!(game.set_winner_if_none(ana.clone()).unwrap());
        assert!(!game.set_winner_if_none(ana).unwrap());
    }

    #[test]
    fn test_last_draw_completing_a_card_names_the_winner() {
        let game = Game::new(WinMode::Full);
        game.join_with_card("ana", sample_card()).unwrap();
        game.start().unwrap();
        for _ in 0..75 {
            game.draw().unwrap();
        }
        assert_eq!(game.status().unwrap(), GameStatus::Finished);
        assert_eq!(game.winner().unwrap().unwrap().player, "ana");
        assert_eq!(game.check_winners().unwrap().unwrap().player, "ana");
    }

    #[test]
    fn test_concurrent_claims_record_one_winner() {
        let game = Game::new(WinMode::Line);
        let players: Vec<String> = (0..16).map(|i| format!("p{i}")).collect();
        for name in &players {
            game.join_with_card(name, sample_card()).unwrap();
        }
        game.start().unwrap();
        for number in [1, 2, 3, 4, 5] {
            game.insert_draw(number).unwrap();
            for name in &players {
                game.mark(name, number).unwrap();
            }
        }

        let handles: Vec<_> = players
            .iter()
            .map(|name| {
                let game = game.clone();
                let name = name.clone();
                thread::spawn(move || {
                    let by_claim = game.claim(&name).unwrap();
                    let direct = Winner { player: name, card_id: sample_card().id() };
                    let by_store = game.set_winner_if_none(direct).unwrap();
                    (by_claim as usize) + (by_store as usize)
                })
            })
            .collect();
        let wins: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(wins, 1);

        let winner = game.winner().unwrap().unwrap();
        assert!(players.contains(&winner.player));
        assert_eq!(game.check_winners().unwrap(), Some(winner.clone()));
        assert!(!game.claim(&players[0]).unwrap());
        assert_eq!(game.winner().unwrap(), Some(winner));
    }
}
