use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::catalog::DifficultyPreset;
use crate::praise;
use crate::round::{InvalidConfiguration, Round};
use crate::timer::{FlashTimer, TimerFire};

/// Answers are at most three decimal digits.
pub const MAX_ANSWER_DIGITS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Ready,
    Flashing,
    Answering,
    Result,
}

/// The closed set of things the outside world can ask the session to do.
/// Triggers that make no sense in the current phase are no-ops, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    SelectPreset(usize),
    StartGame,
    Advance,
    Digit(u8),
    Clear,
    Submit,
    Restart,
    GoHome,
}

/// Fire-and-forget feedback cues emitted at transition points. The session
/// never awaits them and never learns whether they were played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Flash,
    Click,
    Correct,
    Wrong,
    Start,
}

/// Read-only snapshot handed to the rendering layer after every transition.
/// Purely derived from session state; requesting it twice without an
/// intervening transition yields identical values.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub phase: Phase,
    pub preset: &'static DifficultyPreset,
    pub preset_index: usize,
    /// The value currently on screen, only during the flash sequence.
    pub flash_value: Option<u32>,
    /// Fraction of the round already flashed; 0.0 when nothing is displayed.
    pub progress: f64,
    pub pending_input: String,
    pub score: u32,
    pub streak: u32,
    pub last_sum: Option<u32>,
    pub last_answer: Option<u32>,
    pub last_correct: Option<bool>,
    pub praise: Option<&'static str>,
}

/// The whole game lives in here: one instance per play session, reset (not
/// destroyed) between rounds. Sole owner and sole mutator of its fields.
#[derive(Debug)]
pub struct GameSession {
    catalog: &'static [DifficultyPreset],
    preset_index: usize,
    phase: Phase,
    round: Option<Round>,
    /// Index into the round's values currently displayed; -1 when nothing is.
    flash_index: isize,
    pending_input: String,
    score: u32,
    streak: u32,
    last_sum: Option<u32>,
    last_answer: Option<u32>,
    last_correct: Option<bool>,
    praise: Option<&'static str>,
    /// Single owned flash schedule; Some only during Flashing.
    timer: Option<FlashTimer>,
    rng: StdRng,
}

impl GameSession {
    pub fn new(catalog: &'static [DifficultyPreset]) -> Self {
        Self::with_rng(catalog, StdRng::from_entropy())
    }

    /// Deterministic session for tests and `--seed` runs.
    pub fn with_seed(catalog: &'static [DifficultyPreset], seed: u64) -> Self {
        Self::with_rng(catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: &'static [DifficultyPreset], rng: StdRng) -> Self {
        debug_assert!(!catalog.is_empty());
        Self {
            catalog,
            preset_index: 0,
            phase: Phase::Start,
            round: None,
            flash_index: -1,
            pending_input: String::new(),
            score: 0,
            streak: 0,
            last_sum: None,
            last_answer: None,
            last_correct: None,
            praise: None,
            timer: None,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn preset(&self) -> &'static DifficultyPreset {
        &self.catalog[self.preset_index]
    }

    pub fn preset_index(&self) -> usize {
        self.preset_index
    }

    /// The active round, if any. Visible so the result screen can show the
    /// breakdown; during the flash/answer phases callers get the snapshot
    /// instead.
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Apply one trigger and return the feedback signals to emit. Triggers
    /// invalid for the current phase fall through as no-ops. The only error
    /// is a preset that cannot generate a round, surfaced before any phase
    /// change happens.
    pub fn apply(&mut self, trigger: Trigger) -> Result<Vec<Signal>, InvalidConfiguration> {
        let mut signals = Vec::new();

        match (self.phase, trigger) {
            (Phase::Start, Trigger::SelectPreset(index)) => {
                if index < self.catalog.len() {
                    self.preset_index = index;
                }
            }
            (Phase::Start, Trigger::StartGame) => {
                self.begin_round()?;
                signals.push(Signal::Start);
            }
            (Phase::Ready, Trigger::Advance) => {
                let steps = self.round.as_ref().map(Round::len).unwrap_or(1) - 1;
                self.flash_index = 0;
                self.timer = Some(FlashTimer::new(self.preset().interval_ms, steps));
                self.phase = Phase::Flashing;
                signals.push(Signal::Flash);
            }
            (Phase::Answering, Trigger::Digit(digit)) => {
                if digit <= 9 && self.pending_input.len() < MAX_ANSWER_DIGITS {
                    self.pending_input.push((b'0' + digit) as char);
                    signals.push(Signal::Click);
                }
            }
            (Phase::Answering, Trigger::Clear) => {
                self.pending_input.clear();
                signals.push(Signal::Click);
            }
            (Phase::Answering, Trigger::Submit) => {
                if !self.pending_input.is_empty() {
                    if let Some(signal) = self.grade() {
                        signals.push(signal);
                    }
                }
            }
            (Phase::Result, Trigger::Restart) => {
                self.begin_round()?;
            }
            // Forced reset: legal from Result, and accepted anywhere else as
            // an abort. Cancels any pending flash schedule first so a stale
            // fire can never touch a superseded round.
            (_, Trigger::GoHome) => {
                self.timer = None;
                self.round = None;
                self.flash_index = -1;
                self.pending_input.clear();
                self.phase = Phase::Start;
            }
            _ => {}
        }

        Ok(signals)
    }

    /// Drive the flash schedule. Outside Flashing this is a no-op; inside,
    /// each due fire advances the displayed index in strict order, and the
    /// final one-shot clears the display and opens the answer phase.
    pub fn on_tick(&mut self, dt_ms: u64) -> Vec<Signal> {
        let mut signals = Vec::new();

        if self.phase != Phase::Flashing {
            return signals;
        }
        let fires = match self.timer.as_mut() {
            Some(timer) => timer.tick(dt_ms),
            None => return signals,
        };

        for fire in fires {
            match fire {
                TimerFire::Advance => {
                    self.flash_index += 1;
                    signals.push(Signal::Flash);
                }
                TimerFire::Expire => {
                    self.timer = None;
                    self.flash_index = -1;
                    self.pending_input.clear();
                    self.phase = Phase::Answering;
                }
            }
        }

        signals
    }

    pub fn snapshot(&self) -> SessionView {
        let count = self.round.as_ref().map(Round::len).unwrap_or(0);

        let flash_value = match (&self.round, self.flash_index) {
            (Some(round), index) if index >= 0 => round.values().get(index as usize).copied(),
            _ => None,
        };
        let progress = if self.flash_index >= 0 && count > 0 {
            (self.flash_index + 1) as f64 / count as f64
        } else {
            0.0
        };

        SessionView {
            phase: self.phase,
            preset: self.preset(),
            preset_index: self.preset_index,
            flash_value,
            progress,
            pending_input: self.pending_input.clone(),
            score: self.score,
            streak: self.streak,
            last_sum: self.last_sum,
            last_answer: self.last_answer,
            last_correct: self.last_correct,
            praise: self.praise,
        }
    }

    /// New round, same ledger. Used by both StartGame and Restart.
    fn begin_round(&mut self) -> Result<(), InvalidConfiguration> {
        let round = Round::generate(self.preset(), &mut self.rng)?;
        self.round = Some(round);
        self.timer = None;
        self.flash_index = -1;
        self.pending_input.clear();
        self.phase = Phase::Ready;
        Ok(())
    }

    fn grade(&mut self) -> Option<Signal> {
        let (sum, count) = match self.round.as_ref() {
            Some(round) => (round.sum(), round.len() as u32),
            None => return None,
        };

        // pending_input holds 1..=3 decimal digits, so this cannot fail
        let answer: u32 = self.pending_input.parse().unwrap_or(0);
        self.last_answer = Some(answer);
        self.last_sum = Some(sum);

        let signal = if answer == sum {
            // streak bonus uses the streak *before* this answer
            self.score += count * 10 + self.streak * 5;
            self.streak += 1;
            self.praise = Some(praise::pick(&mut self.rng));
            self.last_correct = Some(true);
            Signal::Correct
        } else {
            self.streak = 0;
            self.praise = Some(praise::MISS);
            self.last_correct = Some(false);
            Signal::Wrong
        };

        self.phase = Phase::Result;
        Some(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    static SHORT: &[DifficultyPreset] = &[
        DifficultyPreset {
            name: "two",
            count: 2,
            interval_ms: 100,
            max_value: 5,
            color: "white",
            icon: "?",
            tagline: "",
        },
        DifficultyPreset {
            name: "three",
            count: 3,
            interval_ms: 100,
            max_value: 9,
            color: "white",
            icon: "?",
            tagline: "",
        },
    ];

    static BROKEN: &[DifficultyPreset] = &[DifficultyPreset {
        name: "broken",
        count: 0,
        interval_ms: 100,
        max_value: 9,
        color: "white",
        icon: "?",
        tagline: "",
    }];

    fn session() -> GameSession {
        GameSession::with_seed(SHORT, 11)
    }

    /// Run a session up to the answer phase.
    fn to_answering(session: &mut GameSession) {
        if session.phase() == Phase::Start {
            session.apply(Trigger::StartGame).unwrap();
        } else {
            session.apply(Trigger::Restart).unwrap();
        }
        session.apply(Trigger::Advance).unwrap();
        let count = session.round().unwrap().len() as u64;
        session.on_tick(100 * (count + 1));
        assert_eq!(session.phase(), Phase::Answering);
    }

    fn enter(session: &mut GameSession, answer: u32) {
        for c in answer.to_string().chars() {
            session.apply(Trigger::Digit(c as u8 - b'0')).unwrap();
        }
        session.apply(Trigger::Submit).unwrap();
    }

    #[test]
    fn starts_idle_with_first_preset() {
        let session = session();
        assert_eq!(session.phase(), Phase::Start);
        assert!(session.round().is_none());
        assert_eq!(session.score(), 0);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.preset().name, "two");
    }

    #[test]
    fn select_preset_replaces_reference_only() {
        let mut session = session();
        let signals = session.apply(Trigger::SelectPreset(1)).unwrap();
        assert!(signals.is_empty());
        assert_eq!(session.preset().name, "three");
        assert_eq!(session.phase(), Phase::Start);
        assert!(session.round().is_none());
    }

    #[test]
    fn select_preset_out_of_range_is_ignored() {
        let mut session = session();
        session.apply(Trigger::SelectPreset(99)).unwrap();
        assert_eq!(session.preset_index(), 0);
    }

    #[test]
    fn select_preset_outside_start_is_ignored() {
        let mut session = session();
        session.apply(Trigger::StartGame).unwrap();
        session.apply(Trigger::SelectPreset(1)).unwrap();
        assert_eq!(session.preset_index(), 0);
    }

    #[test]
    fn start_game_generates_round_and_signals_start() {
        let mut session = session();
        let signals = session.apply(Trigger::StartGame).unwrap();
        assert_eq!(signals, vec![Signal::Start]);
        assert_eq!(session.phase(), Phase::Ready);
        let round = session.round().unwrap();
        assert_eq!(round.len(), 2);
        assert_eq!(round.sum(), round.values().iter().sum::<u32>());
    }

    #[test]
    fn start_game_with_broken_preset_fails_before_flashing() {
        let mut session = GameSession::with_seed(BROKEN, 1);
        let err = session.apply(Trigger::StartGame);
        assert_matches!(err, Err(InvalidConfiguration { .. }));
        assert_eq!(session.phase(), Phase::Start);
        assert!(session.round().is_none());
    }

    #[test]
    fn advance_shows_first_value_immediately() {
        let mut session = session();
        session.apply(Trigger::StartGame).unwrap();
        let signals = session.apply(Trigger::Advance).unwrap();
        assert_eq!(signals, vec![Signal::Flash]);
        assert_eq!(session.phase(), Phase::Flashing);
        let view = session.snapshot();
        assert_eq!(view.flash_value, Some(session.round().unwrap().values()[0]));
        assert_eq!(view.progress, 0.5);
    }

    #[test]
    fn flash_sequence_visits_every_index_in_order() {
        let mut session = GameSession::with_seed(SHORT, 3);
        session.apply(Trigger::SelectPreset(1)).unwrap(); // count = 3
        session.apply(Trigger::StartGame).unwrap();
        session.apply(Trigger::Advance).unwrap();

        let values: Vec<u32> = session.round().unwrap().values().to_vec();
        let mut seen = vec![session.snapshot().flash_value.unwrap()];

        // two advances, one per interval
        for _ in 0..2 {
            let signals = session.on_tick(100);
            assert_eq!(signals, vec![Signal::Flash]);
            seen.push(session.snapshot().flash_value.unwrap());
        }
        assert_eq!(seen, values);
        assert_eq!(session.snapshot().progress, 1.0);

        // linger fire: still flashing, last value still visible
        assert!(session.on_tick(100).is_empty());
        assert_eq!(session.phase(), Phase::Flashing);
        assert_eq!(session.snapshot().flash_value, Some(values[2]));

        // one further interval: display cleared, answering open
        assert!(session.on_tick(100).is_empty());
        assert_eq!(session.phase(), Phase::Answering);
        let view = session.snapshot();
        assert_eq!(view.flash_value, None);
        assert_eq!(view.progress, 0.0);
        assert!(view.pending_input.is_empty());
    }

    #[test]
    fn partial_ticks_do_not_advance() {
        let mut session = session();
        session.apply(Trigger::StartGame).unwrap();
        session.apply(Trigger::Advance).unwrap();
        assert!(session.on_tick(99).is_empty());
        assert_eq!(session.snapshot().progress, 0.5);
        assert_eq!(session.on_tick(1), vec![Signal::Flash]);
    }

    #[test]
    fn ticks_outside_flashing_are_no_ops() {
        let mut session = session();
        assert!(session.on_tick(1000).is_empty());
        session.apply(Trigger::StartGame).unwrap();
        assert!(session.on_tick(1000).is_empty());
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn digits_accumulate_up_to_three() {
        let mut session = session();
        to_answering(&mut session);

        assert_eq!(session.apply(Trigger::Digit(1)).unwrap(), vec![Signal::Click]);
        session.apply(Trigger::Digit(2)).unwrap();
        session.apply(Trigger::Digit(3)).unwrap();
        assert_eq!(session.snapshot().pending_input, "123");

        // fourth digit is ignored, not an error
        assert!(session.apply(Trigger::Digit(4)).unwrap().is_empty());
        assert_eq!(session.snapshot().pending_input, "123");
    }

    #[test]
    fn digits_outside_answering_are_ignored() {
        let mut session = session();
        session.apply(Trigger::Digit(5)).unwrap();
        session.apply(Trigger::StartGame).unwrap();
        session.apply(Trigger::Digit(5)).unwrap();
        session.apply(Trigger::Advance).unwrap();
        session.apply(Trigger::Digit(5)).unwrap();
        assert!(session.snapshot().pending_input.is_empty());
    }

    #[test]
    fn clear_empties_pending_input() {
        let mut session = session();
        to_answering(&mut session);
        session.apply(Trigger::Digit(7)).unwrap();
        let signals = session.apply(Trigger::Clear).unwrap();
        assert_eq!(signals, vec![Signal::Click]);
        assert!(session.snapshot().pending_input.is_empty());
    }

    #[test]
    fn submit_with_empty_input_is_a_no_op() {
        let mut session = session();
        to_answering(&mut session);
        assert!(session.apply(Trigger::Submit).unwrap().is_empty());
        assert_eq!(session.phase(), Phase::Answering);
    }

    #[test]
    fn correct_answer_scores_and_extends_streak() {
        let mut session = session();
        to_answering(&mut session);
        let sum = session.round().unwrap().sum();

        enter(&mut session, sum);

        assert_eq!(session.phase(), Phase::Result);
        assert_eq!(session.score(), 2 * 10); // count * 10, streak was 0
        assert_eq!(session.streak(), 1);
        let view = session.snapshot();
        assert_eq!(view.last_correct, Some(true));
        assert_eq!(view.last_sum, Some(sum));
        assert_eq!(view.last_answer, Some(sum));
        assert!(praise::AFFIRMATIONS.contains(&view.praise.unwrap()));
    }

    #[test]
    fn wrong_answer_resets_streak_and_keeps_score() {
        let mut session = session();

        // build up a streak first
        to_answering(&mut session);
        let sum = session.round().unwrap().sum();
        enter(&mut session, sum);
        let score_before = session.score();
        assert_eq!(session.streak(), 1);

        to_answering(&mut session);
        let sum = session.round().unwrap().sum();
        enter(&mut session, sum + 1);

        assert_eq!(session.phase(), Phase::Result);
        assert_eq!(session.score(), score_before);
        assert_eq!(session.streak(), 0);
        let view = session.snapshot();
        assert_eq!(view.last_correct, Some(false));
        assert_eq!(view.praise, Some(praise::MISS));
    }

    #[test]
    fn streak_bonus_uses_pre_increment_streak() {
        let mut session = GameSession::with_seed(SHORT, 21);
        session.apply(Trigger::SelectPreset(1)).unwrap(); // count = 3

        let mut expected = 0;
        for streak_before in 0..3u32 {
            to_answering(&mut session);
            let sum = session.round().unwrap().sum();
            enter(&mut session, sum);
            expected += 3 * 10 + streak_before * 5;
            assert_eq!(session.score(), expected);
            assert_eq!(session.streak(), streak_before + 1);
        }
        // third correct answer at streak 2 was worth 3*10 + 2*5 = 40
        assert_eq!(expected, 30 + 35 + 40);
    }

    #[test]
    fn score_never_decreases() {
        let mut session = session();
        let mut high_water = 0;
        for wrong in [false, true, false, true, true, false] {
            to_answering(&mut session);
            let sum = session.round().unwrap().sum();
            enter(&mut session, if wrong { sum + 1 } else { sum });
            assert!(session.score() >= high_water);
            high_water = session.score();
        }
    }

    #[test]
    fn restart_carries_ledger_into_a_fresh_round() {
        let mut session = GameSession::with_seed(SHORT, 8);
        session.apply(Trigger::SelectPreset(1)).unwrap();
        to_answering(&mut session);
        let first = session.round().unwrap().clone();
        let sum = first.sum();
        enter(&mut session, sum);
        let (score, streak) = (session.score(), session.streak());

        let signals = session.apply(Trigger::Restart).unwrap();
        assert!(signals.is_empty());
        assert_eq!(session.phase(), Phase::Ready);
        assert_eq!(session.score(), score);
        assert_eq!(session.streak(), streak);
        assert!(session.snapshot().pending_input.is_empty());
        assert_ne!(session.round().unwrap(), &first);
    }

    #[test]
    fn go_home_drops_round_but_keeps_ledger() {
        let mut session = session();
        to_answering(&mut session);
        let sum = session.round().unwrap().sum();
        enter(&mut session, sum);
        let score = session.score();

        session.apply(Trigger::GoHome).unwrap();
        assert_eq!(session.phase(), Phase::Start);
        assert!(session.round().is_none());
        assert_eq!(session.score(), score);
        assert_eq!(session.streak(), 1);
    }

    #[test]
    fn go_home_mid_flash_cancels_the_schedule() {
        let mut session = session();
        session.apply(Trigger::StartGame).unwrap();
        session.apply(Trigger::Advance).unwrap();
        assert_eq!(session.phase(), Phase::Flashing);

        session.apply(Trigger::GoHome).unwrap();
        assert_eq!(session.phase(), Phase::Start);

        // a stale schedule must not fire against the next round
        assert!(session.on_tick(10_000).is_empty());
        session.apply(Trigger::StartGame).unwrap();
        assert!(session.on_tick(10_000).is_empty());
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn restart_and_advance_only_apply_in_their_phases() {
        let mut session = session();
        session.apply(Trigger::Advance).unwrap();
        session.apply(Trigger::Restart).unwrap();
        assert_eq!(session.phase(), Phase::Start);

        session.apply(Trigger::StartGame).unwrap();
        session.apply(Trigger::StartGame).unwrap();
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn snapshot_is_idempotent() {
        let mut session = session();
        to_answering(&mut session);
        session.apply(Trigger::Digit(4)).unwrap();
        assert_eq!(session.snapshot(), session.snapshot());
    }

    #[test]
    fn sum_invariant_holds_across_transitions() {
        let mut session = session();
        session.apply(Trigger::StartGame).unwrap();
        session.apply(Trigger::Advance).unwrap();
        for _ in 0..4 {
            session.on_tick(100);
            if let Some(round) = session.round() {
                assert_eq!(round.sum(), round.values().iter().sum::<u32>());
            }
        }
    }
}
