/// The flash schedule: a cancellable "repeat every `interval_ms`, then run
/// once more after `interval_ms`" primitive. The session owns at most one of
/// these, only while flashing; dropping it is cancellation, so a superseded
/// round can never be advanced by a stale schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashTimer {
    interval_ms: u64,
    elapsed_ms: u64,
    /// Repeating fires left before the schedule degrades to the final one-shot.
    steps_left: usize,
    lingering: bool,
    done: bool,
}

/// What a schedule fire means to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFire {
    /// Repeating stage: advance to the next flash index.
    Advance,
    /// Final one-shot: the extra interval is over, clear the display.
    Expire,
}

impl FlashTimer {
    /// `steps` is the number of advances still to come, i.e. `count - 1`
    /// when index 0 is already on screen.
    pub fn new(interval_ms: u64, steps: usize) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            elapsed_ms: 0,
            steps_left: steps,
            lingering: false,
            done: false,
        }
    }

    /// Advance the clock by `dt_ms` and return the fires that came due, in
    /// order. The fire after the last advance silently arms the one-shot
    /// stage (the last value stays visible for one further interval); the
    /// fire after that is `Expire`, and the schedule stops.
    pub fn tick(&mut self, dt_ms: u64) -> Vec<TimerFire> {
        let mut fires = Vec::new();
        if self.done {
            return fires;
        }
        self.elapsed_ms += dt_ms;

        while self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms -= self.interval_ms;

            if self.steps_left > 0 {
                self.steps_left -= 1;
                fires.push(TimerFire::Advance);
            } else if !self.lingering {
                // repeating stage cancelled; one more interval before clearing
                self.lingering = true;
            } else {
                self.done = true;
                fires.push(TimerFire::Expire);
                break;
            }
        }

        fires
    }
}
