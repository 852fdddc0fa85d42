//! Sequential reveal of a committed batch.
//!
//! STATES:
//!   Idle -> Playing <-> PausedOnRare -> Complete -> (dismiss) -> Idle
//!
//! RULES:
//!   - One reveal per tick, strictly in result order.
//!   - At most one tick is pending at a time. Every pending tick carries the
//!     session epoch it was scheduled under; anything that moves the cursor
//!     outside a tick, or replaces the session, bumps the epoch first.
//!   - Out-of-order calls (resume while playing, fast-forward when not
//!     allowed, dismiss before complete) are ignored, never errors.
//!   - Revealing never touches the pool. Draws are already committed.

use crate::{
    config::RevealConfig,
    draw::DrawResult,
    pacing::{PendingTick, TickScheduler, TimerId},
    types::DrawType,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
    Idle,
    Playing,
    PausedOnRare,
    Complete,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevealEvent {
    Reveal,
    PauseOnRare,
    Complete,
    /// Complete, and nothing Epic or Legendary came out of the batch.
    Whiff,
}

/// One step's worth of output for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealFrame {
    pub epoch:     u64,
    pub revealed:  Vec<DrawResult>,
    pub displayed: Vec<DrawResult>,
    pub cursor:    usize,
    pub event:     RevealEvent,
}

/// Owns animation and audio. The scheduler only tells it what happened.
pub trait PresentationSink {
    fn present(&mut self, frame: RevealFrame);
}

impl PresentationSink for Vec<RevealFrame> {
    fn present(&mut self, frame: RevealFrame) {
        self.push(frame);
    }
}

#[derive(Debug, Clone)]
pub struct RevealSession {
    pub draw_type:        DrawType,
    results:              Vec<DrawResult>,
    displayed:            Vec<DrawResult>,
    cursor:               usize,
    state:                RevealState,
    pub can_fast_forward: bool,
    epoch:                u64,
}

impl RevealSession {
    fn new(draw_type: DrawType, results: Vec<DrawResult>, can_fast_forward: bool, epoch: u64) -> Self {
        Self {
            draw_type,
            results,
            displayed: Vec::new(),
            cursor: 0,
            state: RevealState::Playing,
            can_fast_forward,
            epoch,
        }
    }

    pub fn results(&self) -> &[DrawResult] { &self.results }
    pub fn displayed(&self) -> &[DrawResult] { &self.displayed }
    pub fn cursor(&self) -> usize { self.cursor }
    pub fn state(&self) -> RevealState { self.state }
    pub fn epoch(&self) -> u64 { self.epoch }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.results.len()
    }

    fn had_highlight(&self) -> bool {
        self.results.iter().any(DrawResult::is_highlight)
    }

    fn completion_event(&self) -> RevealEvent {
        if self.had_highlight() {
            RevealEvent::Complete
        } else {
            RevealEvent::Whiff
        }
    }

    /// Reveal results[cursor], window the displayed set, advance.
    fn reveal_next(&mut self, window_cap: usize) -> DrawResult {
        let result = self.results[self.cursor].clone();
        self.cursor += 1;
        self.displayed.push(result.clone());
        if self.draw_type.is_large_batch() && self.displayed.len() > window_cap {
            self.evict_one();
        }
        result
    }

    /// Drop the oldest non-highlight entry. Only when the whole window is
    /// Epic/Legendary does the oldest highlight go.
    fn evict_one(&mut self) {
        let victim = self
            .displayed
            .iter()
            .position(|r| !r.is_highlight())
            .unwrap_or(0);
        self.displayed.remove(victim);
    }
}

pub struct RevealScheduler<S: TickScheduler, P: PresentationSink> {
    config:     RevealConfig,
    scheduler:  S,
    sink:       P,
    session:    Option<RevealSession>,
    last_epoch: u64,
    pending:    Option<TimerId>,
}

impl<S: TickScheduler, P: PresentationSink> RevealScheduler<S, P> {
    pub fn new(config: RevealConfig, scheduler: S, sink: P) -> Self {
        Self {
            config,
            scheduler,
            sink,
            session: None,
            last_epoch: 0,
            pending: None,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn state(&self) -> RevealState {
        self.session.as_ref().map_or(RevealState::Idle, RevealSession::state)
    }

    pub fn session(&self) -> Option<&RevealSession> { self.session.as_ref() }
    pub fn cursor(&self) -> usize { self.session.as_ref().map_or(0, RevealSession::cursor) }
    pub fn sink(&self) -> &P { &self.sink }
    pub fn sink_mut(&mut self) -> &mut P { &mut self.sink }
    pub fn scheduler(&self) -> &S { &self.scheduler }
    pub fn scheduler_mut(&mut self) -> &mut S { &mut self.scheduler }

    pub fn displayed(&self) -> &[DrawResult] {
        self.session.as_ref().map_or(&[][..], RevealSession::displayed)
    }

    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_can_fast_forward(&mut self, allowed: bool) {
        if let Some(session) = self.session.as_mut() {
            session.can_fast_forward = allowed;
        }
    }

    // ── Transitions ────────────────────────────────────────────────

    /// Begin revealing a new batch. Any session in progress is superseded:
    /// its pending tick is cancelled and will be ignored if it still fires.
    pub fn start(&mut self, draw_type: DrawType, results: Vec<DrawResult>, can_fast_forward: bool) {
        self.stop();
        let epoch = self.bump_epoch();
        log::debug!(
            "reveal start epoch={epoch} type={} results={}",
            draw_type.name(),
            results.len()
        );
        self.session = Some(RevealSession::new(draw_type, results, can_fast_forward, epoch));

        if self.session.as_ref().is_some_and(RevealSession::is_finished) {
            self.finish(Vec::new());
            return;
        }
        self.schedule_next(self.config.first_tick_delay());
    }

    /// Host callback for a scheduled tick. Stale or unexpected wakes exit
    /// silently.
    pub fn on_wake(&mut self, tick: PendingTick) {
        let Some(session) = self.session.as_ref() else {
            log::trace!("reveal wake epoch={} with no session", tick.epoch);
            return;
        };
        if session.epoch != tick.epoch || session.state != RevealState::Playing {
            log::trace!(
                "reveal wake epoch={} dropped (session epoch={}, state={:?})",
                tick.epoch,
                session.epoch,
                session.state
            );
            return;
        }
        self.pending = None;
        self.tick();
    }

    /// Reveal the next result now. Only acts while Playing.
    pub fn tick(&mut self) {
        if self.state() != RevealState::Playing {
            log::trace!("reveal tick ignored in state {:?}", self.state());
            return;
        }
        self.stop();

        let cap = self.config.window_cap;
        let Some(session) = self.session.as_mut() else { return };
        let result = session.reveal_next(cap);

        if session.is_finished() {
            self.finish(vec![result]);
        } else if result.is_highlight() && session.draw_type.is_large_batch() {
            session.state = RevealState::PausedOnRare;
            log::debug!("reveal paused on {} at cursor {}", result.item.id, session.cursor);
            self.emit(vec![result], RevealEvent::PauseOnRare);
        } else {
            self.emit(vec![result], RevealEvent::Reveal);
            self.schedule_next(self.config.tick_delay());
        }
    }

    pub fn resume(&mut self) {
        let Some(session) = self.session.as_mut() else {
            log::trace!("resume ignored with no session");
            return;
        };
        if session.state != RevealState::PausedOnRare {
            log::trace!("resume ignored in state {:?}", session.state);
            return;
        }
        session.state = RevealState::Playing;
        self.schedule_next(self.config.tick_delay());
    }

    /// Reveal everything up to and including the next Epic/Legendary (or
    /// to the end) in one step.
    pub fn fast_forward(&mut self) {
        let allowed = self.session.as_ref().is_some_and(|s| {
            s.state == RevealState::Playing && s.draw_type.is_large_batch() && s.can_fast_forward
        });
        if !allowed {
            log::trace!("fast_forward ignored in state {:?}", self.state());
            return;
        }
        self.stop();

        let cap = self.config.window_cap;
        let Some(session) = self.session.as_mut() else { return };
        let mut revealed = Vec::new();
        while !session.is_finished() {
            let result = session.reveal_next(cap);
            let stop_here = result.is_highlight();
            revealed.push(result);
            if stop_here {
                break;
            }
        }
        log::debug!("fast_forward revealed {} up to cursor {}", revealed.len(), session.cursor);

        if session.is_finished() {
            self.finish(revealed);
        } else {
            session.state = RevealState::PausedOnRare;
            self.emit(revealed, RevealEvent::PauseOnRare);
        }
    }

    /// Close a completed reveal.
    pub fn dismiss(&mut self) {
        if self.state() != RevealState::Complete {
            log::trace!("dismiss ignored in state {:?}", self.state());
            return;
        }
        self.stop();
        self.session = None;
    }

    /// Halt the tick chain immediately. The state is left as it is; a
    /// pending tick is cancelled and invalidated.
    pub fn stop(&mut self) {
        if let Some(timer) = self.pending.take() {
            self.scheduler.cancel(timer);
        }
        let epoch = self.bump_epoch();
        if let Some(session) = self.session.as_mut() {
            session.epoch = epoch;
        }
    }

    // ── Internals ──────────────────────────────────────────────────

    fn bump_epoch(&mut self) -> u64 {
        self.last_epoch += 1;
        self.last_epoch
    }

    fn schedule_next(&mut self, delay: Duration) {
        let Some(epoch) = self.session.as_ref().map(RevealSession::epoch) else { return };
        let timer = self.scheduler.schedule(delay, PendingTick { epoch });
        self.pending = Some(timer);
    }

    fn finish(&mut self, revealed: Vec<DrawResult>) {
        let Some(session) = self.session.as_mut() else { return };
        session.state = RevealState::Complete;
        let event = session.completion_event();
        log::debug!("reveal complete epoch={} event={event:?}", session.epoch);
        self.emit(revealed, event);
    }

    fn emit(&mut self, revealed: Vec<DrawResult>, event: RevealEvent) {
        let Some(session) = self.session.as_ref() else { return };
        let frame = RevealFrame {
            epoch: session.epoch,
            revealed,
            displayed: session.displayed.clone(),
            cursor: session.cursor,
            event,
        };
        self.sink.present(frame);
    }
}
