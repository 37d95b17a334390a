//! Application state container.
//!
//! [`Tracker`] owns the stores and the in-memory copy of the canonical list.
//! Views are computed from it on demand and never mutated directly. Network
//! work (sync push, insight request) is split into a `begin_*` step that hands
//! out a request tagged with a [`Ticket`] and a `complete_*` step that applies
//! the reply only if its ticket is still the latest one issued.

use crate::core::{
    averages, chart_points, distribution, latest, recent, spread, status_tone, window, Averages,
    CategoryCount, ChartPoint, Observation, SpreadSummary, StatusTone, TimeRange,
};
use crate::display::DisplayZone;
use crate::insight::{InsightError, FAILURE_MESSAGE};
use crate::store::{BlobStore, RecordStore, Settings, SettingsStore, StoreError};
use crate::sync::SyncOutcome;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How long a finished sync keeps showing its result.
pub const STATUS_RESET_DELAY: Duration = Duration::from_secs(3);

/// Fewest readings for which an insight is offered.
pub const MIN_RECORDS_FOR_INSIGHT: usize = 2;

/// Readings shown in the recent-history list.
pub const RECENT_HISTORY_LEN: usize = 5;

/// Identifies one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Hands out increasing tickets and remembers the latest.
#[derive(Debug, Default)]
pub struct Sequencer {
    latest: AtomicU64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket newer than every ticket issued before.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is the most recently issued one.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Sync button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncIndicator {
    Idle,
    Syncing,
    Succeeded,
    Failed,
}

/// Insight panel state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightState {
    Idle,
    Loading,
    Ready(String),
    /// The request failed; carries the fallback text
    Failed(String),
}

/// A sync push to perform.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub ticket: Ticket,
    pub endpoint: String,
    pub records: Vec<Observation>,
}

/// What happened when a sync was requested.
#[derive(Debug, Clone)]
pub enum SyncStart {
    Dispatch(SyncRequest),
    /// No endpoint configured; nothing was sent
    NeedsEndpoint,
}

/// An insight request to perform.
#[derive(Debug, Clone)]
pub struct InsightRequest {
    pub ticket: Ticket,
    pub records: Vec<Observation>,
}

/// Everything the dashboard renders, derived from the canonical list.
#[derive(Debug, Clone)]
pub struct Dashboard<'a> {
    pub latest: Option<&'a Observation>,
    pub tone: Option<StatusTone>,
    pub averages: Option<Averages>,
    pub spread: Option<SpreadSummary>,
    pub recent: &'a [Observation],
    pub range: TimeRange,
    pub series: Vec<ChartPoint<'a>>,
    pub distribution: Vec<CategoryCount>,
    pub last_sync_time: Option<i64>,
}

pub struct Tracker<B> {
    records_store: RecordStore<B>,
    settings_store: SettingsStore<B>,
    records: Vec<Observation>,
    settings: Settings,
    sync_sequencer: Sequencer,
    insight_sequencer: Sequencer,
    sync_indicator: SyncIndicator,
    sync_changed_at: Option<Instant>,
    insight: InsightState,
}

impl<B: BlobStore + Clone> Tracker<B> {
    /// Load records and settings once from `blobs`.
    pub fn open(blobs: B) -> Self {
        let records_store = RecordStore::new(blobs.clone());
        let settings_store = SettingsStore::new(blobs);
        let records = records_store.list();
        let settings = settings_store.get();

        tracing::debug!("Loaded {} readings", records.len());

        Self {
            records_store,
            settings_store,
            records,
            settings,
            sync_sequencer: Sequencer::new(),
            insight_sequencer: Sequencer::new(),
            sync_indicator: SyncIndicator::Idle,
            sync_changed_at: None,
            insight: InsightState::Idle,
        }
    }
}

impl<B: BlobStore> Tracker<B> {
    /// The canonical list, newest first.
    pub fn records(&self) -> &[Observation] {
        &self.records
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn add_reading(&mut self, observation: Observation) -> Result<&[Observation], StoreError> {
        self.records = self.records_store.add(observation)?;
        Ok(&self.records)
    }

    pub fn delete_reading(&mut self, id: &str) -> Result<&[Observation], StoreError> {
        self.records = self.records_store.delete(id)?;
        Ok(&self.records)
    }

    pub fn save_settings(&mut self, partial: Settings) -> Result<&Settings, StoreError> {
        self.settings = self.settings_store.save(partial)?;
        Ok(&self.settings)
    }

    /// Derive the dashboard for `range` as of `now`.
    pub fn dashboard(&self, range: TimeRange, now: DateTime<Utc>, zone: DisplayZone) -> Dashboard<'_> {
        let records = self.records.as_slice();
        let newest = latest(records);

        Dashboard {
            latest: newest,
            tone: newest.map(|r| status_tone(r.systolic, r.diastolic)),
            averages: averages(records),
            spread: spread(records),
            recent: recent(records, RECENT_HISTORY_LEN),
            range,
            series: chart_points(records, range, now, zone),
            distribution: distribution(window(records, range, now, zone)),
            last_sync_time: self.settings.last_sync_time,
        }
    }

    /// Start a sync push of the full list.
    pub fn begin_sync(&mut self, now: Instant) -> SyncStart {
        let Some(endpoint) = self.settings.sync_endpoint() else {
            return SyncStart::NeedsEndpoint;
        };

        let request = SyncRequest {
            ticket: self.sync_sequencer.issue(),
            endpoint: endpoint.to_string(),
            records: self.records.clone(),
        };
        self.set_sync_indicator(SyncIndicator::Syncing, now);
        SyncStart::Dispatch(request)
    }

    /// Apply the outcome of a sync push.
    ///
    /// Returns `Ok(false)` and changes nothing if a newer sync has been
    /// started since `ticket` was issued. On delivery the last sync time is
    /// saved as `now_ms`.
    pub fn complete_sync(
        &mut self,
        ticket: Ticket,
        outcome: SyncOutcome,
        now_ms: i64,
        now: Instant,
    ) -> Result<bool, StoreError> {
        if !self.sync_sequencer.is_current(ticket) {
            tracing::debug!(?ticket, "Discarding stale sync result");
            return Ok(false);
        }

        match outcome {
            SyncOutcome::Delivered => {
                self.set_sync_indicator(SyncIndicator::Succeeded, now);
                self.save_settings(Settings {
                    google_sheet_url: None,
                    last_sync_time: Some(now_ms),
                })?;
            }
            SyncOutcome::Failed => self.set_sync_indicator(SyncIndicator::Failed, now),
        }
        Ok(true)
    }

    /// Sync state as of `now`. A finished result reverts to idle after
    /// [`STATUS_RESET_DELAY`].
    pub fn sync_indicator(&self, now: Instant) -> SyncIndicator {
        match (self.sync_indicator, self.sync_changed_at) {
            (SyncIndicator::Succeeded | SyncIndicator::Failed, Some(at))
                if now.saturating_duration_since(at) >= STATUS_RESET_DELAY =>
            {
                SyncIndicator::Idle
            }
            (indicator, _) => indicator,
        }
    }

    fn set_sync_indicator(&mut self, indicator: SyncIndicator, now: Instant) {
        self.sync_indicator = indicator;
        self.sync_changed_at = Some(now);
    }

    /// Start an insight request over the canonical list. `None` when there
    /// are too few readings to be worth analysing.
    pub fn begin_insight(&mut self) -> Option<InsightRequest> {
        if self.records.len() < MIN_RECORDS_FOR_INSIGHT {
            return None;
        }

        self.insight = InsightState::Loading;
        Some(InsightRequest {
            ticket: self.insight_sequencer.issue(),
            records: self.records.clone(),
        })
    }

    /// Apply an insight reply. Returns `false` for a superseded ticket.
    pub fn complete_insight(&mut self, ticket: Ticket, reply: Result<String, InsightError>) -> bool {
        if !self.insight_sequencer.is_current(ticket) {
            tracing::debug!(?ticket, "Discarding stale insight reply");
            return false;
        }

        self.insight = match reply {
            Ok(text) => InsightState::Ready(text),
            Err(e) => {
                tracing::warn!("Insight request failed: {}", e);
                InsightState::Failed(FAILURE_MESSAGE.to_string())
            }
        };
        true
    }

    pub fn insight_state(&self) -> &InsightState {
        &self.insight
    }
}
