use foundation::time::Millis;
use runtime::timer::Timers;

use crate::progress::LoadProgress;
use crate::quality::{FixedQuality, QualityProbe, quality_ready};
use crate::stage::{Detail, Stage};

/// Maximum screen-space error (pixels) per detail level.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DetailThresholds {
    pub low: f64,
    pub medium: f64,
    pub fine: f64,
}

impl Default for DetailThresholds {
    fn default() -> Self {
        Self {
            low: 16.0,
            medium: 8.0,
            fine: 2.0,
        }
    }
}

impl DetailThresholds {
    pub fn for_detail(&self, detail: Detail) -> f64 {
        match detail {
            Detail::Low => self.low,
            Detail::Medium => self.medium,
            Detail::Final => self.fine,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProgressionConfig {
    pub thresholds: DetailThresholds,
    /// Low → medium detail, measured from tileset attach.
    pub medium_delay_ms: u64,
    /// Medium → final detail, measured from the medium switch.
    pub final_delay_ms: u64,
    pub poll_interval_ms: u64,
    /// Give up waiting for quality after this long in `HighQualityWait`.
    pub quality_timeout_ms: u64,
    /// Force `Ready` this long after the controller was created.
    pub safety_timeout_ms: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            thresholds: DetailThresholds::default(),
            medium_delay_ms: 2_000,
            final_delay_ms: 4_000,
            poll_interval_ms: 500,
            quality_timeout_ms: 30_000,
            safety_timeout_ms: 35_000,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadyReason {
    QualityReached,
    PollTimeout,
    SafetyTimeout,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ProgressionEvent {
    StageChanged { from: Stage, to: Stage },
    /// The renderer should switch to `max_screen_space_error`.
    DetailChanged {
        detail: Detail,
        max_screen_space_error: f64,
    },
    Ready(ReadyReason),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Tick {
    MediumDetail,
    FinalDetail,
    QualityPoll,
    Safety,
}

/// Coarse-to-fine loading controller.
///
/// Stages only move forward. Detail refinement runs on fixed timers from
/// tileset attach regardless of actual tile completion. Two timeouts
/// guarantee `Ready` is reached: the quality poll gives up after
/// `quality_timeout_ms`, and the safety timer fires `safety_timeout_ms`
/// after creation no matter what.
#[derive(Debug)]
pub struct Progression {
    config: ProgressionConfig,
    stage: Stage,
    detail: Detail,
    tileset_attached: bool,
    timers: Timers<Tick>,
    quality_wait_since: Option<Millis>,
    polls: u32,
    progress: LoadProgress,
    ready: Option<(Millis, ReadyReason)>,
}

impl Progression {
    pub fn new(now: Millis, config: ProgressionConfig) -> Self {
        let mut timers = Timers::new();
        timers.schedule(now.after(config.safety_timeout_ms), Tick::Safety);
        Self {
            config,
            stage: Stage::Idle,
            detail: Detail::Low,
            tileset_attached: false,
            timers,
            quality_wait_since: None,
            polls: 0,
            progress: LoadProgress::default(),
            ready: None,
        }
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn detail(&self) -> Detail {
        self.detail
    }

    /// Current maximum screen-space error for attached tilesets.
    pub fn max_screen_space_error(&self) -> f64 {
        self.config.thresholds.for_detail(self.detail)
    }

    pub fn progress(&self) -> LoadProgress {
        self.progress
    }

    pub fn is_ready(&self) -> bool {
        self.stage == Stage::Ready
    }

    pub fn ready_at(&self) -> Option<(Millis, ReadyReason)> {
        self.ready
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Earliest pending timer; a driver can sleep until then.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    pub fn begin_basic_map(&mut self) -> Vec<ProgressionEvent> {
        let mut events = Vec::new();
        self.enter(Stage::BasicMapLoading, &mut events);
        events
    }

    /// The building tileset is attached at low detail; refinement timers start.
    pub fn attach_tileset(&mut self, now: Millis) -> Vec<ProgressionEvent> {
        let mut events = Vec::new();
        self.start_refinement(now, &mut events);
        events
    }

    pub fn begin_data_loading(&mut self, now: Millis) -> Vec<ProgressionEvent> {
        let mut events = Vec::new();
        self.start_refinement(now, &mut events);
        self.enter(Stage::DataLoading, &mut events);
        events
    }

    /// Reports `done` of `total` secondary datasets finished.
    pub fn dataset_loaded(&mut self, done: usize, total: usize) {
        if self.stage != Stage::DataLoading || total == 0 {
            return;
        }
        let frac = (done.min(total) as f64) / (total as f64);
        let base = Stage::DataLoading.base_percent();
        let span = Stage::HighQualityWait.base_percent() - base - 3.0;
        self.progress.advance(self.stage, base + span * frac);
    }

    pub fn begin_quality_wait(&mut self, now: Millis) -> Vec<ProgressionEvent> {
        let mut events = Vec::new();
        self.start_refinement(now, &mut events);
        if self.enter(Stage::HighQualityWait, &mut events) {
            self.quality_wait_since = Some(now);
            self.timers
                .schedule(now.after(self.config.poll_interval_ms), Tick::QualityPoll);
        }
        events
    }

    /// Fires every timer due at `now`, in deadline order.
    pub fn advance(&mut self, now: Millis, probe: &dyn QualityProbe) -> Vec<ProgressionEvent> {
        let mut events = Vec::new();
        while let Some((at, tick)) = self.timers.pop_due(now) {
            self.on_tick(at, tick, probe, &mut events);
        }
        events
    }

    fn on_tick(
        &mut self,
        at: Millis,
        tick: Tick,
        probe: &dyn QualityProbe,
        events: &mut Vec<ProgressionEvent>,
    ) {
        tracing::debug!(?tick, %at, "progression timer");
        match tick {
            Tick::MediumDetail => {
                self.set_detail(Detail::Medium, events);
                self.timers
                    .schedule(at.after(self.config.final_delay_ms), Tick::FinalDetail);
            }
            Tick::FinalDetail => self.set_detail(Detail::Final, events),
            Tick::QualityPoll => self.poll_quality(at, probe, events),
            Tick::Safety => {
                if !self.is_ready() {
                    tracing::warn!(%at, stage = %self.stage, "loading safety timeout; forcing ready");
                    self.finish(at, ReadyReason::SafetyTimeout, events);
                }
            }
        }
    }

    fn poll_quality(&mut self, at: Millis, probe: &dyn QualityProbe, events: &mut Vec<ProgressionEvent>) {
        if self.stage != Stage::HighQualityWait {
            return;
        }
        self.polls += 1;
        let target = self.config.thresholds.fine;
        let error = probe.screen_space_error();

        let fraction = match error {
            Some(e) if !quality_ready(&FixedQuality(error), target) => {
                let coarse = self.config.thresholds.low;
                if coarse > target {
                    ((coarse - e) / (coarse - target)).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
            _ => 1.0,
        };
        let base = Stage::HighQualityWait.base_percent();
        self.progress
            .advance(self.stage, base + (Stage::Ready.base_percent() - base) * fraction);

        if fraction >= 1.0 {
            self.finish(at, ReadyReason::QualityReached, events);
            return;
        }
        let waited = self
            .quality_wait_since
            .map(|since| at.since(since))
            .unwrap_or(0);
        if waited >= self.config.quality_timeout_ms {
            tracing::warn!(polls = self.polls, ?error, "quality wait timed out");
            self.finish(at, ReadyReason::PollTimeout, events);
            return;
        }
        self.timers
            .schedule(at.after(self.config.poll_interval_ms), Tick::QualityPoll);
    }

    fn start_refinement(&mut self, now: Millis, events: &mut Vec<ProgressionEvent>) {
        if self.tileset_attached || self.is_ready() {
            return;
        }
        self.tileset_attached = true;
        self.enter(Stage::BuildingsLoading(self.detail), events);
        self.timers
            .schedule(now.after(self.config.medium_delay_ms), Tick::MediumDetail);
    }

    fn set_detail(&mut self, detail: Detail, events: &mut Vec<ProgressionEvent>) {
        if detail <= self.detail {
            return;
        }
        self.detail = detail;
        events.push(ProgressionEvent::DetailChanged {
            detail,
            max_screen_space_error: self.max_screen_space_error(),
        });
        if let Stage::BuildingsLoading(_) = self.stage {
            let from = self.stage;
            self.stage = Stage::BuildingsLoading(detail);
            self.progress.advance(self.stage, self.stage.base_percent());
            events.push(ProgressionEvent::StageChanged {
                from,
                to: self.stage,
            });
        }
    }

    /// Moves forward to `to`; returns `false` if that would not be forward.
    fn enter(&mut self, to: Stage, events: &mut Vec<ProgressionEvent>) -> bool {
        if to.rank() <= self.stage.rank() {
            return false;
        }
        let from = self.stage;
        self.stage = to;
        self.progress.advance(to, to.base_percent());
        tracing::info!(%from, %to, percent = self.progress.percent, "loading stage");
        events.push(ProgressionEvent::StageChanged { from, to });
        true
    }

    fn finish(&mut self, at: Millis, reason: ReadyReason, events: &mut Vec<ProgressionEvent>) {
        self.set_detail(Detail::Final, events);
        self.enter(Stage::Ready, events);
        self.timers.clear();
        self.ready = Some((at, reason));
        events.push(ProgressionEvent::Ready(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::{Progression, ProgressionConfig, ProgressionEvent, ReadyReason};
    use crate::quality::{FixedQuality, QualityProbe};
    use crate::stage::{Detail, Stage};
    use foundation::time::Millis;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    const NEVER_READY: FixedQuality = FixedQuality(Some(50.0));

    fn started(now: Millis) -> Progression {
        let mut p = Progression::new(now, ProgressionConfig::default());
        p.begin_basic_map();
        p.attach_tileset(now);
        p
    }

    #[test]
    fn detail_refines_at_two_and_six_seconds() {
        let mut p = started(Millis(0));
        assert_eq!(p.stage(), Stage::BuildingsLoading(Detail::Low));
        assert_eq!(p.max_screen_space_error(), 16.0);

        p.advance(Millis(1_999), &NEVER_READY);
        assert_eq!(p.max_screen_space_error(), 16.0);

        let events = p.advance(Millis(2_000), &NEVER_READY);
        assert_eq!(p.max_screen_space_error(), 8.0);
        assert_eq!(p.stage(), Stage::BuildingsLoading(Detail::Medium));
        assert!(events.contains(&ProgressionEvent::DetailChanged {
            detail: Detail::Medium,
            max_screen_space_error: 8.0
        }));

        p.advance(Millis(5_999), &NEVER_READY);
        assert_eq!(p.detail(), Detail::Medium);
        p.advance(Millis(6_000), &NEVER_READY);
        assert_eq!(p.detail(), Detail::Final);
        assert_eq!(p.max_screen_space_error(), 2.0);
    }

    #[test]
    fn late_advance_fires_both_refinements_in_order() {
        let mut p = started(Millis(0));
        let events = p.advance(Millis(10_000), &NEVER_READY);
        let details: Vec<Detail> = events
            .iter()
            .filter_map(|e| match e {
                ProgressionEvent::DetailChanged { detail, .. } => Some(*detail),
                _ => None,
            })
            .collect();
        assert_eq!(details, vec![Detail::Medium, Detail::Final]);
    }

    #[test]
    fn quality_reached_finishes_on_next_poll() {
        let mut p = started(Millis(0));
        p.begin_data_loading(Millis(1_000));
        p.dataset_loaded(3, 3);
        p.begin_quality_wait(Millis(1_500));
        assert_eq!(p.progress().percent, 98.0);

        p.advance(Millis(1_999), &FixedQuality(Some(1.0)));
        assert!(!p.is_ready());
        let events = p.advance(Millis(2_000), &FixedQuality(Some(1.0)));
        assert!(p.is_ready());
        assert_eq!(p.ready_at(), Some((Millis(2_000), ReadyReason::QualityReached)));
        assert_eq!(p.progress().percent, 100.0);
        assert_eq!(p.detail(), Detail::Final);
        assert!(events.contains(&ProgressionEvent::Ready(ReadyReason::QualityReached)));
    }

    #[test]
    fn poll_timeout_after_thirty_seconds_of_waiting() {
        let mut p = started(Millis(0));
        p.begin_quality_wait(Millis(0));
        let mut now = 0;
        while !p.is_ready() {
            now += 100;
            p.advance(Millis(now), &NEVER_READY);
        }
        assert_eq!(p.ready_at(), Some((Millis(30_000), ReadyReason::PollTimeout)));
        assert_eq!(p.polls(), 60);
    }

    #[test]
    fn safety_timer_bounds_a_stuck_session() {
        let mut p = Progression::new(Millis(0), ProgressionConfig::default());
        p.begin_basic_map();
        p.advance(Millis(34_999), &NEVER_READY);
        assert_eq!(p.stage(), Stage::BasicMapLoading);
        p.advance(Millis(35_000), &NEVER_READY);
        assert!(p.is_ready());
        assert_eq!(p.ready_at(), Some((Millis(35_000), ReadyReason::SafetyTimeout)));
    }

    #[test]
    fn safety_timer_preempts_a_late_quality_wait() {
        let mut p = started(Millis(0));
        p.begin_data_loading(Millis(500));
        p.begin_quality_wait(Millis(10_000));
        let mut now = 10_000;
        while !p.is_ready() {
            now += 250;
            p.advance(Millis(now), &NEVER_READY);
        }
        let (at, reason) = p.ready_at().unwrap();
        assert!(at <= Millis(35_000));
        assert_eq!(reason, ReadyReason::SafetyTimeout);
    }

    #[test]
    fn error_exactly_at_fine_threshold_counts_as_reached() {
        let mut p = started(Millis(0));
        p.begin_quality_wait(Millis(0));
        p.advance(Millis(500), &FixedQuality(Some(2.5)));
        assert!(!p.is_ready());
        p.advance(Millis(1_000), &FixedQuality(Some(2.0)));
        assert_eq!(p.ready_at(), Some((Millis(1_000), ReadyReason::QualityReached)));
        assert_eq!(p.progress().percent, 100.0);
    }

    struct Improving(Cell<f64>);

    impl QualityProbe for Improving {
        fn screen_space_error(&self) -> Option<f64> {
            let e = self.0.get();
            self.0.set(e - 2.0);
            Some(e)
        }
    }

    #[test]
    fn quality_wait_progress_interpolates_and_never_decreases() {
        let mut p = started(Millis(0));
        p.begin_quality_wait(Millis(0));
        let probe = Improving(Cell::new(16.0));
        let mut last = p.progress().percent;
        let mut now = 0;
        while !p.is_ready() {
            now += 500;
            p.advance(Millis(now), &probe);
            let pct = p.progress().percent;
            assert!(pct >= last);
            assert!((98.0..=100.0).contains(&pct));
            last = pct;
        }
        assert_eq!(p.ready_at().map(|r| r.1), Some(ReadyReason::QualityReached));
    }

    #[test]
    fn stages_never_move_backwards() {
        let mut p = started(Millis(0));
        p.begin_data_loading(Millis(0));
        assert!(p.begin_basic_map().is_empty());
        assert_eq!(p.stage(), Stage::DataLoading);
        // Refinement keeps running after buildings finish.
        p.advance(Millis(2_000), &NEVER_READY);
        assert_eq!(p.stage(), Stage::DataLoading);
        assert_eq!(p.detail(), Detail::Medium);
    }
}
