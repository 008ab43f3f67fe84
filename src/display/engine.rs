//! The rotation engine: decides what the TV shows at each moment from the
//! latest polled data. It owns its state outright, never awaits I/O, and is
//! driven entirely by `apply_poll` and `advance_to`.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::config::{display_defaults, CLOCK_TICK_SECS, MIN_POLL_INTERVAL_SECS};
use crate::display::scheduler::{Scheduler, TimerKind};
use crate::error::FetchError;
use crate::types::{BannerSettings, DisplaySettings, MediaItem, PromoImage, RateSnapshot, TransitionEffect};

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// One poll cycle. Each resource succeeds or fails on its own.
#[derive(Debug)]
pub struct PollBatch {
    pub rates: Result<Option<RateSnapshot>, FetchError>,
    pub settings: Result<Option<DisplaySettings>, FetchError>,
    pub media: Result<Vec<MediaItem>, FetchError>,
    pub promos: Result<Vec<PromoImage>, FetchError>,
    pub banner: Result<Option<BannerSettings>, FetchError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Time to fetch a fresh [`PollBatch`].
    PollDue,
    ClockTick(DateTime<Tz>),
    ShowMedia { index: usize },
    ShowRates { next_media_index: usize },
    PromoAdvanced { index: usize, effect: TransitionEffect },
}

/// The promo slide currently on screen.
#[derive(Debug, Clone, Copy)]
pub struct PromoSlide<'a> {
    pub item: &'a PromoImage,
    pub index: usize,
    pub count: usize,
    pub effect: TransitionEffect,
}

/// Everything drawn around the foreground content.
#[derive(Debug, Clone, Copy)]
pub struct Chrome<'a> {
    pub settings: &'a DisplaySettings,
    pub clock: DateTime<Tz>,
    pub promo: Option<PromoSlide<'a>>,
    pub banner: Option<&'a BannerSettings>,
}

#[derive(Debug, Clone, Copy)]
pub enum DisplayView<'a> {
    /// No rate snapshot has been published yet.
    AwaitingData,
    /// The very first rates fetch failed and none has succeeded since.
    FetchFailed(&'a str),
    Rates { rates: &'a RateSnapshot, chrome: Chrome<'a> },
    Media { item: &'a MediaItem, index: usize, chrome: Chrome<'a> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Rates,
    Media(usize),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RotationEngine {
    scheduler: Scheduler,
    epoch: DateTime<Utc>,
    tz: Tz,
    clock: DateTime<Tz>,

    rates: Option<RateSnapshot>,
    rates_error: Option<String>,
    rates_answered: bool,
    settings: DisplaySettings,
    media: Vec<MediaItem>,
    promos: Vec<PromoImage>,
    banner: Option<BannerSettings>,

    showing_rates: bool,
    media_index: usize,
    promo_index: usize,
    promo_effect: TransitionEffect,

    // (phase, seconds) and (index, seconds) the armed timers were built for
    rotation_key: Option<(Phase, u64)>,
    promo_key: Option<(usize, u64)>,
}

impl RotationEngine {
    /// `epoch` is the wall-clock time at scheduler offset zero. Arms the clock
    /// and an immediate poll.
    pub fn new(epoch: DateTime<Utc>, tz: Tz, mut scheduler: Scheduler) -> Self {
        scheduler.schedule(TimerKind::Poll, Duration::ZERO);
        scheduler.schedule(TimerKind::Clock, Duration::from_secs(CLOCK_TICK_SECS));

        let mut engine = Self {
            scheduler,
            epoch,
            tz,
            clock: epoch.with_timezone(&tz),
            rates: None,
            rates_error: None,
            rates_answered: false,
            settings: DisplaySettings::default(),
            media: Vec::new(),
            promos: Vec::new(),
            banner: None,
            showing_rates: true,
            media_index: 0,
            promo_index: 0,
            promo_effect: TransitionEffect::default(),
            rotation_key: None,
            promo_key: None,
        };
        engine.clock = engine.wall_clock();
        engine
    }

    /// Fold one poll cycle into state. Failed resources keep what they had.
    pub fn apply_poll(&mut self, batch: PollBatch) {
        if self.is_disposed() {
            return;
        }
        let PollBatch { rates, settings, media, promos, banner } = batch;

        match rates {
            Ok(Some(snapshot)) => {
                if self.rates.is_none() {
                    debug!(gold_24k_sale = snapshot.gold_24k_sale, "First rate snapshot, starting rotation");
                    self.showing_rates = true;
                    self.media_index = 0;
                    self.promo_index = 0;
                }
                self.rates = Some(snapshot);
                self.rates_answered = true;
                self.rates_error = None;
            }
            // No active snapshot right now: keep showing the last one.
            Ok(None) => {
                self.rates_answered = true;
                self.rates_error = None;
            }
            Err(e) if !self.rates_answered => {
                warn!("Initial rates fetch failed: {e}");
                self.rates_error = Some(e.to_string());
            }
            Err(e) => warn!("Rates fetch failed, keeping last snapshot: {e}"),
        }

        match settings {
            Ok(Some(s)) => self.settings = s,
            Ok(None) => {}
            Err(e) => warn!("Settings fetch failed: {e}"),
        }
        match media {
            Ok(list) => self.media = list,
            Err(e) => warn!("Media fetch failed: {e}"),
        }
        match promos {
            Ok(list) => self.promos = list,
            Err(e) => warn!("Promo fetch failed: {e}"),
        }
        match banner {
            Ok(Some(b)) => self.banner = Some(b),
            Ok(None) => {}
            Err(e) => warn!("Banner fetch failed: {e}"),
        }

        self.repair_indices();
        self.reconcile_timers();
    }

    /// Fire every timer due at `now` (offset from engine start), in deadline order.
    pub fn advance_to(&mut self, now: Duration) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if self.is_disposed() {
            return events;
        }
        while let Some(kind) = self.scheduler.pop_due(now) {
            events.push(self.fire(kind));
        }
        events
    }

    pub fn view(&self) -> DisplayView<'_> {
        let Some(rates) = self.rates.as_ref() else {
            return match self.rates_error.as_deref() {
                Some(message) => DisplayView::FetchFailed(message),
                None => DisplayView::AwaitingData,
            };
        };

        let chrome = Chrome {
            settings: &self.settings,
            clock: self.clock,
            promo: self.promos.get(self.promo_index).map(|item| PromoSlide {
                item,
                index: self.promo_index,
                count: self.promos.len(),
                effect: self.promo_effect,
            }),
            banner: self.banner.as_ref(),
        };

        if !self.showing_rates {
            if let Some(item) = self.media.get(self.media_index) {
                return DisplayView::Media { item, index: self.media_index, chrome };
            }
        }
        DisplayView::Rates { rates, chrome }
    }

    /// Cancel every timer. The engine is inert afterwards.
    pub fn dispose(&mut self) {
        self.scheduler.shutdown();
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn clock(&self) -> DateTime<Tz> {
        self.clock
    }

    pub fn showing_rates(&self) -> bool {
        self.showing_rates
    }

    pub fn media_index(&self) -> usize {
        self.media_index
    }

    pub fn promo_index(&self) -> usize {
        self.promo_index
    }

    pub fn promo_effect(&self) -> TransitionEffect {
        self.promo_effect
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn banner(&self) -> Option<&BannerSettings> {
        self.banner.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.scheduler.is_shut_down()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn poll_period(&self) -> Duration {
        let secs = u64::try_from(self.settings.refresh_interval).unwrap_or(0);
        Duration::from_secs(secs.max(MIN_POLL_INTERVAL_SECS))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn fire(&mut self, kind: TimerKind) -> EngineEvent {
        match kind {
            TimerKind::Poll => {
                self.scheduler.schedule(TimerKind::Poll, self.poll_period());
                EngineEvent::PollDue
            }
            TimerKind::Clock => {
                self.clock = self.wall_clock();
                self.scheduler.schedule(TimerKind::Clock, Duration::from_secs(CLOCK_TICK_SECS));
                EngineEvent::ClockTick(self.clock)
            }
            TimerKind::Rotation => {
                self.rotation_key = None;
                let event = if self.showing_rates {
                    self.showing_rates = false;
                    EngineEvent::ShowMedia { index: self.media_index }
                } else {
                    self.media_index = (self.media_index + 1) % self.media.len().max(1);
                    self.showing_rates = true;
                    EngineEvent::ShowRates { next_media_index: self.media_index }
                };
                debug!(?event, "Rotation phase change");
                self.reconcile_timers();
                event
            }
            TimerKind::Promo => {
                self.promo_key = None;
                self.promo_index = (self.promo_index + 1) % self.promos.len().max(1);
                self.promo_effect = self.current_promo_effect();
                self.reconcile_timers();
                EngineEvent::PromoAdvanced { index: self.promo_index, effect: self.promo_effect }
            }
        }
    }

    fn wall_clock(&self) -> DateTime<Tz> {
        let elapsed = TimeDelta::from_std(self.scheduler.now()).unwrap_or(TimeDelta::zero());
        (self.epoch + elapsed).with_timezone(&self.tz)
    }

    fn repair_indices(&mut self) {
        if self.media_index >= self.media.len() {
            self.media_index = 0;
        }
        if self.promo_index >= self.promos.len() {
            self.promo_index = 0;
        }
        self.promo_effect = self.current_promo_effect();
    }

    fn current_promo_effect(&self) -> TransitionEffect {
        self.promos.get(self.promo_index).map(|p| p.transition_effect).unwrap_or_default()
    }

    fn rotation_enabled(&self) -> bool {
        self.rates.is_some() && self.settings.show_media && !self.media.is_empty()
    }

    fn phase(&self) -> Phase {
        if self.showing_rates {
            Phase::Rates
        } else {
            Phase::Media(self.media_index)
        }
    }

    fn phase_secs(&self) -> u64 {
        match self.phase() {
            Phase::Rates => positive_secs(
                self.settings.rates_display_duration_seconds,
                display_defaults::RATES_DISPLAY_DURATION_SECS,
            ),
            Phase::Media(index) => positive_secs(
                self.media.get(index).map_or(0, |m| m.duration_seconds),
                display_defaults::MEDIA_DURATION_SECS,
            ),
        }
    }

    fn promo_secs(&self) -> u64 {
        positive_secs(
            self.promos.get(self.promo_index).map_or(0, |p| p.duration_seconds),
            display_defaults::PROMO_DURATION_SECS,
        )
    }

    /// Re-arm a rotation or promo timer only when its (phase, index, duration)
    /// key changed; an unchanged key keeps its running deadline.
    fn reconcile_timers(&mut self) {
        if self.rotation_enabled() {
            let key = (self.phase(), self.phase_secs());
            if self.rotation_key != Some(key) || !self.scheduler.is_armed(TimerKind::Rotation) {
                self.scheduler.schedule(TimerKind::Rotation, Duration::from_secs(key.1));
                self.rotation_key = Some(key);
            }
        } else {
            self.showing_rates = true;
            self.scheduler.cancel(TimerKind::Rotation);
            self.rotation_key = None;
        }

        if self.rates.is_some() && self.promos.len() > 1 {
            let key = (self.promo_index, self.promo_secs());
            if self.promo_key != Some(key) || !self.scheduler.is_armed(TimerKind::Promo) {
                self.scheduler.schedule(TimerKind::Promo, Duration::from_secs(key.1));
                self.promo_key = Some(key);
            }
        } else {
            self.scheduler.cancel(TimerKind::Promo);
            self.promo_key = None;
        }
    }
}

fn positive_secs(value: i64, default: i64) -> u64 {
    let secs = if value > 0 { value } else { default };
    u64::try_from(secs).unwrap_or(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
