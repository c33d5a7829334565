use std::io::Write;

use crate::game::Signal;

/// Sink for the fire-and-forget feedback cues. The session hands signals to
/// the caller, the caller forwards them here; nothing flows back, and a sink
/// that fails must swallow the failure itself.
pub trait FeedbackSink {
    fn play(&mut self, signal: Signal);
}

/// Rings the terminal bell on the cues that warrant a sound. Write errors
/// are dropped on the floor.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl FeedbackSink for TerminalBell {
    fn play(&mut self, signal: Signal) {
        let ring = matches!(signal, Signal::Start | Signal::Correct | Signal::Wrong);
        if ring {
            let mut out = std::io::stdout();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
    }
}

/// Discards every signal. Used with `--mute` and in headless tests.
#[derive(Debug, Default)]
pub struct SilentFeedback;

impl FeedbackSink for SilentFeedback {
    fn play(&mut self, _signal: Signal) {}
}
