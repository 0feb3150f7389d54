//! # Tracking Session
//!
//! The session owns the tracked path and runs every location sample through
//! the pipeline, one sample at a time:
//!
//! ```text
//! admission -> accumulation -> closure detection -> validation -> sink
//! ```
//!
//! Samples can be processed directly with [`TrackingSession::process_sample`]
//! or pushed from any thread through a [`SampleFeed`] and processed with
//! [`TrackingSession::drain`]. Either way only the session mutates the path.
//!
//! ## Cancellation
//!
//! Every feed shares a generation counter with its session. Cancelling
//! (from a feed or via [`TrackingSession::clear`]) advances the counter:
//! samples queued under an older generation are dropped, and the path is
//! reset before the next sample is looked at.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, info, warn};

use crate::admission::{Admission, admit};
use crate::events::{SpeedSeverity, TrackingEvent, TrackingObserver};
use crate::path::TrackedPath;
use crate::store::TerritorySink;
use crate::territory::TerritoryCandidate;
use crate::validation::{ValidationResult, validate};
use crate::{GeofenceError, Result, Sample, TrackingConfig};

/// A sample waiting in the session queue, stamped with the generation it was
/// pushed under.
#[derive(Debug, Clone, Copy)]
struct QueuedSample {
    sample: Sample,
    generation: u64,
}

/// Sending half of a session's sample queue.
///
/// Cheap to clone and safe to move to the thread receiving location fixes.
#[derive(Debug, Clone)]
pub struct SampleFeed {
    tx: Sender<QueuedSample>,
    generation: Arc<AtomicU64>,
}

impl SampleFeed {
    /// Queue a sample for the session.
    pub fn push(&self, sample: Sample) -> Result<()> {
        let generation = self.generation.load(Ordering::SeqCst);
        self.tx
            .send(QueuedSample { sample, generation })
            .map_err(|_| GeofenceError::FeedDisconnected)
    }

    /// Discard everything queued so far and reset the path before the next
    /// sample is processed.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Whether the session is accepting samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    Idle,
    Tracking,
    /// Stopped by a pause-severity speed violation until resumed
    Paused,
}

/// What happened to one sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// Session not tracking
    Ignored,
    /// Coordinates out of range, or coordinates or timestamp not finite
    Invalid,
    /// Implausible speed
    Rejected {
        speed_kmh: f64,
        severity: SpeedSeverity,
    },
    /// Too close to the previous point
    Discarded,
    /// Appended; loop still open
    Appended { count: usize },
    /// Appended, closed the loop, and validated
    Closed { result: ValidationResult },
}

/// An explicitly owned tracking session.
pub struct TrackingSession {
    config: TrackingConfig,
    path: TrackedPath,
    state: TrackingState,
    warning_active: bool,
    last_result: Option<ValidationResult>,

    observers: Vec<Arc<dyn TrackingObserver>>,
    sink: Option<Box<dyn TerritorySink>>,

    // Sample queue
    tx: Sender<QueuedSample>,
    rx: Receiver<QueuedSample>,
    generation: Arc<AtomicU64>,
    seen_generation: u64,
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingSession {
    /// Create an idle session with default thresholds.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            config: TrackingConfig::default(),
            path: TrackedPath::new(),
            state: TrackingState::Idle,
            warning_active: false,
            last_result: None,
            observers: Vec::new(),
            sink: None,
            tx,
            rx,
            generation: Arc::new(AtomicU64::new(0)),
            seen_generation: 0,
        }
    }

    /// Create an idle session with custom thresholds.
    pub fn with_config(config: TrackingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Register an observer for tracking events.
    pub fn add_observer(&mut self, observer: Arc<dyn TrackingObserver>) {
        self.observers.push(observer);
    }

    /// Set where validated territories are handed off.
    pub fn set_sink(&mut self, sink: impl TerritorySink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    /// Create a feed for pushing samples from another thread.
    pub fn feed(&self) -> SampleFeed {
        SampleFeed {
            tx: self.tx.clone(),
            generation: Arc::clone(&self.generation),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn path(&self) -> &TrackedPath {
        &self.path
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state == TrackingState::Tracking
    }

    /// Whether a speed warning is currently standing.
    pub fn has_speed_warning(&self) -> bool {
        self.warning_active
    }

    /// Verdict of the most recent closure attempt.
    pub fn last_result(&self) -> Option<&ValidationResult> {
        self.last_result.as_ref()
    }

    /// The validated loop still held by the session, if any.
    ///
    /// Present after a successful validation when no sink is set or the sink
    /// refused the candidate.
    pub fn candidate(&self) -> Option<TerritoryCandidate> {
        let result = self.last_result.as_ref()?;
        if self.path.is_closed() && result.valid {
            Some(TerritoryCandidate::new(self.path.snapshot(), result.area))
        } else {
            None
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start tracking a new loop. Any previous path and queued samples are dropped.
    pub fn start(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.apply_cancellation();
        self.state = TrackingState::Tracking;
        info!("Tracking started");
        self.emit(TrackingEvent::TrackingStarted);
    }

    /// Stop tracking. The path is kept until cleared or a new start.
    pub fn stop(&mut self) {
        if self.state == TrackingState::Idle {
            return;
        }
        self.state = TrackingState::Idle;
        self.warning_active = false;
        info!("Tracking stopped with {} points", self.path.len());
        self.emit(TrackingEvent::TrackingStopped);
    }

    /// Continue after a speed pause. Returns whether the session was paused.
    pub fn resume(&mut self) -> bool {
        if self.state != TrackingState::Paused {
            return false;
        }
        self.state = TrackingState::Tracking;
        self.warning_active = false;
        info!("Tracking resumed");
        self.emit(TrackingEvent::TrackingResumed);
        true
    }

    /// Reset the path and drop every queued sample.
    pub fn clear(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.apply_cancellation();
        info!("Path cleared");
        self.emit(TrackingEvent::PathCleared);
    }

    // ========================================================================
    // Sample Processing
    // ========================================================================

    /// Process every sample currently queued by feeds.
    ///
    /// Returns how many samples went through the pipeline (stale samples from
    /// a cancelled generation are not counted).
    pub fn drain(&mut self) -> usize {
        self.sync_generation();
        let mut processed = 0;
        while let Ok(queued) = self.rx.try_recv() {
            self.sync_generation();
            if queued.generation != self.seen_generation {
                debug!(
                    "Dropping stale sample from generation {} (current {})",
                    queued.generation, self.seen_generation
                );
                continue;
            }
            self.run_pipeline(queued.sample);
            processed += 1;
        }
        processed
    }

    /// Run one sample through the pipeline.
    pub fn process_sample(&mut self, sample: Sample) -> SampleOutcome {
        self.sync_generation();
        self.run_pipeline(sample)
    }

    fn run_pipeline(&mut self, sample: Sample) -> SampleOutcome {
        if self.state != TrackingState::Tracking {
            return SampleOutcome::Ignored;
        }

        match admit(&sample, &self.path, &self.config) {
            Admission::InvalidCoordinate => {
                debug!(
                    "Ignoring invalid coordinate ({}, {})",
                    sample.point.latitude, sample.point.longitude
                );
                return SampleOutcome::Invalid;
            }
            Admission::InvalidTimestamp => {
                debug!("Ignoring sample with timestamp {}", sample.timestamp);
                return SampleOutcome::Invalid;
            }
            Admission::Rejected {
                speed_kmh,
                severity,
            } => {
                warn!(
                    "Sample rejected at {:.1} km/h ({:?})",
                    speed_kmh, severity
                );
                self.warning_active = true;
                self.emit(TrackingEvent::SpeedWarning {
                    speed_kmh,
                    severity,
                });
                if severity == SpeedSeverity::Pause {
                    self.state = TrackingState::Paused;
                    info!("Tracking paused after speed violation");
                }
                return SampleOutcome::Rejected {
                    speed_kmh,
                    severity,
                };
            }
            Admission::Admitted { .. } => {
                if self.warning_active {
                    self.warning_active = false;
                    self.emit(TrackingEvent::SpeedNormal);
                }
            }
        }

        if !self
            .path
            .accumulate(&sample, self.config.min_displacement_m)
        {
            return SampleOutcome::Discarded;
        }

        let count = self.path.len();
        debug!("Point {} recorded", count);
        self.emit(TrackingEvent::PathPointAdded {
            count: count as u32,
        });

        if !self
            .path
            .check_closure(self.config.closure_threshold_m, self.config.min_points as usize)
        {
            return SampleOutcome::Appended { count };
        }

        info!(
            "Loop closed after {} points ({:.0}m walked)",
            count,
            self.path.total_length()
        );
        self.emit(TrackingEvent::PathClosed);

        // The path is closed, so nothing appends while we read it
        let result = validate(self.path.points(), &self.config);
        self.last_result = Some(result.clone());
        self.emit(TrackingEvent::ValidationCompleted {
            result: result.clone(),
        });

        if result.valid {
            self.hand_off(result.area);
        } else {
            info!(
                "Closure rejected ({}), continuing to walk",
                result
                    .failure_reason
                    .map_or("unknown", |reason| reason.as_str())
            );
            self.path.reopen();
        }

        SampleOutcome::Closed { result }
    }

    /// Give a validated loop to the sink. On success the path starts over.
    fn hand_off(&mut self, area: f64) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        let candidate = TerritoryCandidate::new(self.path.snapshot(), area);
        match sink.save(candidate) {
            Ok(()) => {
                info!("Territory handed off ({:.0}m²)", area);
                self.path.clear();
                self.warning_active = false;
                self.emit(TrackingEvent::PathCleared);
            }
            Err(e) => {
                warn!("Failed to hand off territory: {}", e);
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Reset the path if a feed cancelled since the last sample.
    fn sync_generation(&mut self) {
        if self.generation.load(Ordering::SeqCst) == self.seen_generation {
            return;
        }
        self.apply_cancellation();
        info!("Sample feed cancelled, path cleared");
        self.emit(TrackingEvent::PathCleared);
    }

    fn apply_cancellation(&mut self) {
        self.seen_generation = self.generation.load(Ordering::SeqCst);
        self.path.clear();
        self.warning_active = false;
        self.last_result = None;
    }

    fn emit(&self, event: TrackingEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}
