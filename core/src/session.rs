use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Identity of one dealt game. Every start or reset moves to a new id.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u32);

impl SessionId {
    const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Recurring elapsed-time tick
    Tick,
    /// One-shot turn-back of a mismatched pair
    MismatchRevert,
}

/// Handle for a timer scheduled by the host. Firing a token from an older session does nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerToken {
    pub session: SessionId,
    pub kind: TimerKind,
}

/// One game lifecycle: deals decks, forwards reveals, drives the timers and persists the best score.
///
/// Timers can be driven in two ways. Either the host feeds elapsed time into [`Self::advance`]
/// and the session keeps its own deadlines, or the host schedules real timers and hands their
/// [`TimerToken`]s back to [`Self::fire`]. A host should pick one of the two.
pub struct GameSession<S, G = ShuffledDeckGenerator> {
    config: GameConfig,
    store: S,
    generator: G,
    engine: MatchEngine,
    scoreboard: Scoreboard,
    session: SessionId,
    result: Option<GameResult>,
    since_tick: Duration,
    revert_due_in: Option<Duration>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl<S: ScoreStore> GameSession<S> {
    /// Session dealing shuffled decks. The seed comes from the host, the core has no entropy source.
    pub fn new(config: GameConfig, store: S, seed: u64) -> Result<Self> {
        Self::with_generator(config, store, ShuffledDeckGenerator::new(seed))
    }
}

impl<S: ScoreStore, G: DeckGenerator> GameSession<S, G> {
    /// Builds an idle session. Call [`Self::start`] to deal the first game.
    pub fn with_generator(config: GameConfig, store: S, generator: G) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            generator,
            engine: MatchEngine::new(),
            scoreboard: Scoreboard::new(),
            session: SessionId::default(),
            result: None,
            since_tick: Duration::ZERO,
            revert_due_in: None,
            sinks: Vec::new(),
        })
    }

    /// Deals a fresh deck, zeroes moves and time, and reloads the best score.
    pub fn start(&mut self) -> Result<()> {
        let deck = self.generator.generate(&self.config.symbols)?;

        self.session = self.session.next();
        self.engine.start(deck);
        self.scoreboard.reset_volatile();
        self.scoreboard.load_best(&self.store);
        self.result = None;
        self.since_tick = Duration::ZERO;
        self.revert_due_in = None;
        log::debug!("Started session {:?}", self.session);
        Ok(())
    }

    /// Abandons the current game, cancelling its pending timers, and deals a new one.
    ///
    /// If no new deck can be dealt the current game is kept as it was.
    pub fn reset(&mut self) -> Result<()> {
        log::debug!("Resetting session {:?}", self.session);
        self.start()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn cards(&self) -> &[Card] {
        self.engine.cards()
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Final figures once the game is won.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn is_won(&self) -> bool {
        self.result.is_some()
    }

    pub fn token(&self, kind: TimerKind) -> TimerToken {
        TimerToken {
            session: self.session,
            kind,
        }
    }

    /// Token of the mismatch revert still waiting to fire, if any.
    pub fn pending_revert(&self) -> Option<TimerToken> {
        matches!(self.engine.state(), EngineState::AwaitingUnreveal)
            .then(|| self.token(TimerKind::MismatchRevert))
    }

    pub fn subscribe(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Calls `callback` with the final figures whenever a game is won.
    pub fn on_win(&mut self, mut callback: impl FnMut(GameResult) + 'static) {
        self.subscribe(move |event: &GameEvent| {
            if let GameEvent::GameWon(result) = event {
                callback(*result);
            }
        });
    }

    /// Input entry point: the host may call this for any gesture, invalid reveals are dropped.
    pub fn handle_reveal(&mut self, position: Position) -> Events {
        let mut events = Events::new();

        let outcome = self.engine.reveal(position, &mut self.scoreboard);
        if !outcome.has_update() {
            log::debug!("Ignored reveal at {} in {:?}", position, self.engine.state());
            return events;
        }

        if let Some(card) = self.engine.card(position) {
            events.push(GameEvent::CardRevealed {
                position,
                symbol: card.symbol,
            });
        }

        match outcome {
            RevealOutcome::NoChange | RevealOutcome::Revealed => {}
            RevealOutcome::Matched { first, second } => {
                events.push(GameEvent::MatchFound { first, second });
            }
            RevealOutcome::Mismatched { first, second } => {
                self.revert_due_in = Some(self.config.mismatch_delay());
                events.push(GameEvent::MismatchFound {
                    first,
                    second,
                    revert: self.token(TimerKind::MismatchRevert),
                });
            }
            RevealOutcome::Won { first, second } => {
                events.push(GameEvent::MatchFound { first, second });
                self.finish(&mut events);
            }
        }

        self.dispatch(&events);
        events
    }

    /// Runs a host-scheduled timer callback.
    pub fn fire(&mut self, token: TimerToken) -> Events {
        let mut events = Events::new();

        if token.session != self.session {
            log::warn!(
                "Ignoring stale {:?} timer from {:?}, current is {:?}",
                token.kind,
                token.session,
                self.session
            );
            return events;
        }

        match token.kind {
            TimerKind::Tick => self.on_tick(&mut events),
            TimerKind::MismatchRevert => self.on_revert(&mut events),
        }

        self.dispatch(&events);
        events
    }

    /// One elapsed-time tick for the current session. Does nothing while the timer is stopped.
    pub fn tick(&mut self) -> Events {
        self.fire(self.token(TimerKind::Tick))
    }

    /// Moves virtual time forward, running the mismatch revert once its deadline passes.
    ///
    /// Ticks due over the whole span are counted in one go and reported by a single
    /// [`GameEvent::ClockTicked`] carrying the new elapsed time, on each side of the revert.
    pub fn advance(&mut self, elapsed: Duration) -> Events {
        let mut events = Events::new();

        match self.revert_due_in {
            Some(due_in) if due_in <= elapsed => {
                self.run_clock(due_in, &mut events);
                self.on_revert(&mut events);
                self.run_clock(elapsed - due_in, &mut events);
            }
            Some(due_in) => {
                self.revert_due_in = Some(due_in - elapsed);
                self.run_clock(elapsed, &mut events);
            }
            None => self.run_clock(elapsed, &mut events),
        }

        self.dispatch(&events);
        events
    }

    /// [`Self::advance`] by the wall-clock time since the clock's previous lap.
    pub fn advance_with(&mut self, clock: &mut WallClock) -> Events {
        self.advance(clock.lap())
    }

    fn run_clock(&mut self, step: Duration, events: &mut Events) {
        if !self.engine.timer_running() {
            return;
        }

        // u128 nanoseconds hold any sum of two `Duration`s
        let interval = self.config.tick_interval().as_nanos();
        let total = self.since_tick.as_nanos() + step.as_nanos();
        let ticks = total / interval;
        // the remainder is below one interval, which is at most u32::MAX milliseconds
        self.since_tick = Duration::from_nanos((total % interval) as u64);

        if ticks == 0 {
            return;
        }
        self.scoreboard
            .add_secs(Seconds::try_from(ticks).unwrap_or(Seconds::MAX));
        events.push(GameEvent::ClockTicked {
            elapsed_secs: self.scoreboard.elapsed_secs(),
        });
    }

    fn on_tick(&mut self, events: &mut Events) {
        if !self.engine.timer_running() {
            return;
        }
        self.scoreboard.tick();
        events.push(GameEvent::ClockTicked {
            elapsed_secs: self.scoreboard.elapsed_secs(),
        });
    }

    fn on_revert(&mut self, events: &mut Events) {
        self.revert_due_in = None;
        if let Some((first, second)) = self.engine.unreveal() {
            events.push(GameEvent::MismatchReverted { first, second });
        }
    }

    fn finish(&mut self, events: &mut Events) {
        let moves = self.scoreboard.moves();
        let new_best = self.scoreboard.commit_if_better(&mut self.store, moves);
        let result = GameResult {
            elapsed_secs: self.scoreboard.elapsed_secs(),
            moves,
            best: self.scoreboard.best(),
            new_best,
        };
        self.result = Some(result);
        self.since_tick = Duration::ZERO;

        if new_best {
            log::info!("New best score: {} moves", moves);
            events.push(GameEvent::NewBestScore { moves });
        }
        log::info!(
            "Game won in {} with {} moves",
            result.clock(),
            result.moves
        );
        events.push(GameEvent::GameWon(result));
    }

    fn dispatch(&mut self, events: &Events) {
        for event in events {
            for sink in self.sinks.iter_mut() {
                sink.emit(event);
            }
        }
    }
}

impl<S: fmt::Debug, G: fmt::Debug> fmt::Debug for GameSession<S, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("generator", &self.generator)
            .field("engine", &self.engine)
            .field("scoreboard", &self.scoreboard)
            .field("session", &self.session)
            .field("result", &self.result)
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::format;
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use alloc::vec;
    use core::cell::RefCell;
    use std::sync::Mutex;

    const A: Symbol = Symbol('A');
    const B: Symbol = Symbol('B');
    const SECOND: Duration = Duration::from_secs(1);

    type TestSession = GameSession<MemoryStore, PresetDeckGenerator>;

    fn session_with(store: MemoryStore) -> TestSession {
        let generator = PresetDeckGenerator::new(vec![A, B, A, B]).unwrap();
        let mut session =
            GameSession::with_generator(GameConfig::new(vec![A, B]), store, generator).unwrap();
        session.start().unwrap();
        session
    }

    fn session() -> TestSession {
        session_with(MemoryStore::new())
    }

    fn hidden_count(session: &TestSession) -> usize {
        session
            .cards()
            .iter()
            .filter(|card| card.state == CardState::Hidden)
            .count()
    }

    #[test]
    fn start_deals_hidden_cards_with_a_stopped_timer() {
        let mut session = session();

        assert_eq!(session.state(), EngineState::AwaitingFirstReveal);
        assert_eq!(hidden_count(&session), 4);
        assert!(!session.engine().timer_running());

        assert!(session.tick().is_empty());
        assert!(session.advance(SECOND * 5).is_empty());
        assert_eq!(session.scoreboard().elapsed_secs(), 0);
    }

    #[test]
    fn end_to_end_two_pairs() {
        let mut session = session();

        let events = session.handle_reveal(0);
        assert_eq!(
            events.as_slice(),
            &[GameEvent::CardRevealed { position: 0, symbol: A }]
        );
        session.advance(SECOND);

        let events = session.handle_reveal(1);
        let revert = session.token(TimerKind::MismatchRevert);
        assert_eq!(
            events.as_slice(),
            &[
                GameEvent::CardRevealed { position: 1, symbol: B },
                GameEvent::MismatchFound {
                    first: 0,
                    second: 1,
                    revert
                },
            ]
        );
        assert_eq!(session.scoreboard().moves(), 1);

        let events = session.advance(SECOND);
        assert!(events.contains(&GameEvent::MismatchReverted { first: 0, second: 1 }));
        assert_eq!(hidden_count(&session), 4);

        session.handle_reveal(0);
        let events = session.handle_reveal(2);
        assert!(events.contains(&GameEvent::MatchFound { first: 0, second: 2 }));
        assert_eq!(session.scoreboard().moves(), 2);
        assert_eq!(session.engine().matched_pairs(), 1);

        session.advance(SECOND);
        session.handle_reveal(1);
        let events = session.handle_reveal(3);
        assert_eq!(session.scoreboard().moves(), 3);
        assert_eq!(session.engine().matched_pairs(), 2);
        assert_eq!(session.state(), EngineState::Complete);

        let expected = GameResult {
            elapsed_secs: 3,
            moves: 3,
            best: Some(3),
            new_best: true,
        };
        assert_eq!(events.last(), Some(&GameEvent::GameWon(expected)));
        assert!(events.contains(&GameEvent::NewBestScore { moves: 3 }));
        assert_eq!(session.result(), Some(expected));
        assert_eq!(
            session.store().get(BestScore::KEY).unwrap().as_deref(),
            Some("3")
        );
    }

    #[test]
    fn third_reveal_while_two_pending_is_a_noop() {
        let mut session = session();
        session.handle_reveal(0);
        session.handle_reveal(1);
        let cards_before = session.cards().to_vec();

        assert!(session.handle_reveal(2).is_empty());
        assert!(session.handle_reveal(3).is_empty());

        assert_eq!(session.cards(), cards_before.as_slice());
        assert_eq!(session.scoreboard().moves(), 1);
    }

    #[test]
    fn mismatch_stays_face_up_until_the_delay_passes() {
        let mut session = session();
        session.handle_reveal(0);
        session.handle_reveal(1);

        assert!(session.advance(Duration::from_millis(999)).iter().all(|event| {
            !matches!(event, GameEvent::MismatchReverted { .. })
        }));
        assert_eq!(session.state(), EngineState::AwaitingUnreveal);
        assert!(session.handle_reveal(2).is_empty());

        let events = session.advance(Duration::from_millis(1));
        assert!(events.contains(&GameEvent::MismatchReverted { first: 0, second: 1 }));
        assert_eq!(session.state(), EngineState::AwaitingFirstReveal);
        assert!(!session.handle_reveal(2).is_empty());
    }

    #[test]
    fn host_scheduled_revert_token() {
        let mut session = session();
        session.handle_reveal(0);
        let events = session.handle_reveal(1);
        let Some(GameEvent::MismatchFound { revert, .. }) = events.last().copied() else {
            panic!("expected a mismatch, got {:?}", events);
        };

        assert_eq!(session.pending_revert(), Some(revert));
        let events = session.fire(revert);
        assert_eq!(
            events.as_slice(),
            &[GameEvent::MismatchReverted { first: 0, second: 1 }]
        );
        assert_eq!(session.pending_revert(), None);

        assert!(session.fire(revert).is_empty());
    }

    #[test]
    fn reset_cancels_a_pending_revert() {
        let mut session = session();
        session.handle_reveal(0);
        let events = session.handle_reveal(1);
        let Some(GameEvent::MismatchFound { revert, .. }) = events.last().copied() else {
            panic!("expected a mismatch, got {:?}", events);
        };
        let old_tick = session.token(TimerKind::Tick);

        session.reset().unwrap();
        session.handle_reveal(0);
        session.handle_reveal(1);

        assert!(session.fire(revert).is_empty());
        assert!(session.fire(old_tick).is_empty());
        assert_eq!(session.state(), EngineState::AwaitingUnreveal);
        assert_eq!(session.cards()[0].state, CardState::Revealed);
        assert_eq!(session.cards()[1].state, CardState::Revealed);
        assert_eq!(session.scoreboard().elapsed_secs(), 0);
    }

    #[test]
    fn reset_drops_virtual_deadlines() {
        let mut session = session();
        session.handle_reveal(0);
        session.advance(Duration::from_millis(900));
        session.handle_reveal(1);

        session.reset().unwrap();
        session.handle_reveal(0);

        let events = session.advance(Duration::from_millis(500));
        assert!(events.is_empty());
        assert_eq!(session.cards()[0].state, CardState::Revealed);
        assert_eq!(session.scoreboard().moves(), 0);
        assert_eq!(session.scoreboard().elapsed_secs(), 0);
    }

    #[test]
    fn clock_ticks_only_while_running() {
        let mut session = session();
        session.handle_reveal(0);

        let events = session.advance(Duration::from_millis(2500));
        assert_eq!(
            events.as_slice(),
            &[GameEvent::ClockTicked { elapsed_secs: 2 }]
        );
        assert!(session.advance(Duration::from_millis(499)).is_empty());
        session.advance(Duration::from_millis(1));
        assert_eq!(session.scoreboard().elapsed_secs(), 3);
        assert_eq!(session.scoreboard().clock().to_string(), "00:03");

        session.handle_reveal(2);
        session.handle_reveal(1);
        session.handle_reveal(3);
        assert!(session.is_won());
        assert!(session.advance(SECOND * 10).is_empty());
        assert!(session.tick().is_empty());
        assert_eq!(session.result().map(|result| result.elapsed_secs), Some(3));
    }

    #[test]
    fn long_advance_counts_ticks_in_one_step() {
        let mut session = session();
        session.handle_reveal(0);

        let month = SECOND * 86_400 * 30;
        let events = session.advance(month);
        assert_eq!(
            events.as_slice(),
            &[GameEvent::ClockTicked {
                elapsed_secs: 86_400 * 30
            }]
        );

        let events = session.advance(Duration::MAX);
        assert_eq!(
            events.as_slice(),
            &[GameEvent::ClockTicked {
                elapsed_secs: Seconds::MAX
            }]
        );
        assert_eq!(session.scoreboard().elapsed_secs(), Seconds::MAX);
    }

    #[test]
    fn long_advance_runs_the_revert_between_clock_updates() {
        let mut session = session();
        session.handle_reveal(0);
        session.advance(Duration::from_millis(500));
        session.handle_reveal(1);

        let events = session.advance(SECOND * 3600);
        assert_eq!(
            events.as_slice(),
            &[
                GameEvent::ClockTicked { elapsed_secs: 1 },
                GameEvent::MismatchReverted { first: 0, second: 1 },
                GameEvent::ClockTicked { elapsed_secs: 3600 },
            ]
        );
        assert_eq!(session.state(), EngineState::AwaitingFirstReveal);
        assert_eq!(session.pending_revert(), None);
    }

    /// Deals the preset arrangement once, then refuses every further deck.
    #[derive(Debug)]
    struct SingleDeal(Option<PresetDeckGenerator>);

    impl DeckGenerator for SingleDeal {
        fn generate(&mut self, symbol_set: &[Symbol]) -> Result<Deck> {
            match self.0.take() {
                Some(mut preset) => preset.generate(symbol_set),
                None => Err(GameError::UnpairedSymbol),
            }
        }
    }

    #[test]
    fn failed_reset_keeps_the_current_game() {
        let generator = SingleDeal(Some(PresetDeckGenerator::new(vec![A, B, A, B]).unwrap()));
        let mut session =
            GameSession::with_generator(GameConfig::new(vec![A, B]), MemoryStore::new(), generator)
                .unwrap();
        session.start().unwrap();
        session.handle_reveal(0);
        session.handle_reveal(1);
        let id = session.session_id();
        let revert = session.pending_revert();
        let cards = session.cards().to_vec();

        assert_eq!(session.reset(), Err(GameError::UnpairedSymbol));

        assert_eq!(session.state(), EngineState::AwaitingUnreveal);
        assert_eq!(session.cards(), cards.as_slice());
        assert_eq!(session.scoreboard().moves(), 1);
        assert_eq!(session.session_id(), id);
        assert_eq!(session.pending_revert(), revert);
        assert!(revert.is_some());

        let events = session.advance(SECOND);
        assert!(events.contains(&GameEvent::MismatchReverted { first: 0, second: 1 }));
    }

    #[test]
    fn worse_game_keeps_the_stored_best() {
        let mut session = session_with(MemoryStore::new().with_entry(BestScore::KEY, "2"));
        assert_eq!(session.scoreboard().best(), Some(2));

        for position in [0, 2, 1, 3] {
            session.handle_reveal(position);
        }

        let result = session.result().unwrap();
        assert_eq!(result.moves, 2);
        assert_eq!(result.best, Some(2));
        assert!(!result.new_best);
        assert_eq!(
            session.store().get(BestScore::KEY).unwrap().as_deref(),
            Some("2")
        );
    }

    #[test]
    fn best_score_carries_into_the_next_game() {
        let mut session = session();
        for position in [0, 1] {
            session.handle_reveal(position);
        }
        session.advance(SECOND);
        for position in [0, 2, 1, 3] {
            session.handle_reveal(position);
        }
        assert_eq!(session.scoreboard().best(), Some(3));

        session.reset().unwrap();
        assert_eq!(session.scoreboard().best(), Some(3));
        assert_eq!(session.scoreboard().moves(), 0);
        assert_eq!(session.result(), None);

        for position in [0, 2, 1, 3] {
            session.handle_reveal(position);
        }
        assert_eq!(session.result().map(|result| result.new_best), Some(true));
        assert_eq!(session.scoreboard().best(), Some(2));
    }

    #[test]
    fn subscribers_see_every_event_and_win_callback_fires() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let won = Rc::new(RefCell::new(None));
        let mut session = session();
        {
            let seen = Rc::clone(&seen);
            session.subscribe(move |event: &GameEvent| seen.borrow_mut().push(*event));
        }
        {
            let won = Rc::clone(&won);
            session.on_win(move |result| *won.borrow_mut() = Some(result));
        }

        let mut returned = Vec::new();
        for position in [0, 2, 1, 3] {
            returned.extend(session.handle_reveal(position));
        }

        assert_eq!(*seen.borrow(), returned);
        assert_eq!(*won.borrow(), session.result());
        assert!(won.borrow().is_some());
    }

    #[test]
    fn out_of_range_reveal_is_ignored() {
        let mut session = session();

        assert!(session.handle_reveal(200).is_empty());
        assert!(!session.engine().timer_running());
    }

    static IGNORED_REVEAL_LEVELS: Mutex<Vec<log::Level>> = Mutex::new(Vec::new());

    struct IgnoredRevealLogger;

    impl log::Log for IgnoredRevealLogger {
        fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if format!("{}", record.args()).starts_with("Ignored reveal at 201") {
                IGNORED_REVEAL_LEVELS.lock().unwrap().push(record.level());
            }
        }

        fn flush(&self) {}
    }

    #[test]
    fn ignored_reveal_is_logged_at_debug() {
        log::set_logger(&IgnoredRevealLogger).unwrap();
        log::set_max_level(log::LevelFilter::Trace);

        let mut session = session();
        session.handle_reveal(201);

        assert_eq!(*IGNORED_REVEAL_LEVELS.lock().unwrap(), [log::Level::Debug]);
    }

    #[test]
    fn shuffled_session_deals_the_configured_symbols() {
        let mut session = GameSession::new(GameConfig::default(), MemoryStore::new(), 11).unwrap();
        assert_eq!(session.state(), EngineState::Idle);

        session.start().unwrap();
        let first_id = session.session_id();
        assert_eq!(session.cards().len(), 16);
        for symbol in DEFAULT_SYMBOLS {
            let copies = session
                .cards()
                .iter()
                .filter(|card| card.symbol == symbol)
                .count();
            assert_eq!(copies, 2);
        }

        session.reset().unwrap();
        assert_ne!(session.session_id(), first_id);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = GameConfig {
            tick_interval_ms: 0,
            ..GameConfig::default()
        };

        assert_eq!(
            GameSession::new(config, MemoryStore::new(), 1).err(),
            Some(GameError::InvalidConfig)
        );
    }
}
