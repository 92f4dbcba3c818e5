//! Cloud logging handler.
//!
//! # Data Flow
//! ```text
//! root handler (Options + Sink)
//!     → with_attrs / with_group (state.rs, copy-on-derive)
//!     → handle(record)
//!         → dispatch.rs: inline, or scheduled + recorded as pending
//!         → consolidate.rs → RecordFormatter → LevelMapper → Sink::submit
//!     → shutdown: drain pending → close sink
//! ```
//!
//! # Design Decisions
//! - A handler is a cheap value: derivation never touches the parent
//! - Options, sink and the pending list are shared by the whole chain
//! - Sync dispatch returns pipeline errors; async dispatch never does and
//!   hands them to the async error hook instead

pub mod consolidate;
pub mod dispatch;
pub mod state;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::validation::validate_config;
use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::format::{FormatContext, JsonFormatter, RecordFormatter};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::record::{Attr, Level, Record};
use crate::severity::{default_level_mapper, LevelMapper, Severity};
use crate::sink::{Entry, HttpSink, Sink};

use dispatch::{Dispatcher, Scheduler, TokioScheduler};
use state::HandlerState;

/// Receives errors from asynchronous dispatches.
pub type AsyncErrorHook = Arc<dyn Fn(&HandlerError) + Send + Sync>;

/// Handler options: validated configuration plus runtime collaborators.
#[derive(Clone)]
pub struct Options {
    pub config: HandlerConfig,

    /// Level → severity mapping. Defaults to [`default_level_mapper`].
    pub level_mapper: Option<LevelMapper>,

    /// Payload formatter. Defaults to [`JsonFormatter`].
    pub record_formatter: Option<Arc<dyn RecordFormatter>>,

    /// Scheduler for async dispatch. Defaults to the current Tokio runtime.
    pub scheduler: Option<Arc<dyn Scheduler>>,

    /// Called with every async dispatch failure. Defaults to a warning log.
    pub on_async_error: Option<AsyncErrorHook>,
}

impl Options {
    pub fn new(config: HandlerConfig) -> Self {
        Self {
            config,
            level_mapper: None,
            record_formatter: None,
            scheduler: None,
            on_async_error: None,
        }
    }

    pub fn with_level_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(Level) -> Severity + Send + Sync + 'static,
    {
        self.level_mapper = Some(Arc::new(mapper));
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn RecordFormatter>) -> Self {
        self.record_formatter = Some(formatter);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_async_error_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HandlerError) + Send + Sync + 'static,
    {
        self.on_async_error = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("config", &self.config)
            .field("level_mapper", &self.level_mapper.is_some())
            .field("record_formatter", &self.record_formatter.is_some())
            .field("scheduler", &self.scheduler.is_some())
            .field("on_async_error", &self.on_async_error.is_some())
            .finish()
    }
}

/// State shared by every handler derived from one root.
struct Shared {
    config: HandlerConfig,
    log_path: String,
    level_mapper: LevelMapper,
    formatter: Arc<dyn RecordFormatter>,
    on_async_error: Option<AsyncErrorHook>,
    sink: Arc<dyn Sink>,
    dispatcher: Dispatcher,
    closed: AtomicBool,
}

impl Shared {
    /// consolidate → format → map severity → submit.
    fn process(&self, state: &HandlerState, record: Record) -> Result<(), HandlerError> {
        let attrs = state.consolidate(&record.attrs);
        let ctx = FormatContext {
            log_name: &self.config.log_name,
            project_id: &self.config.project_id,
        };

        let payload = self
            .formatter
            .format_record(
                &ctx,
                record.time,
                record.level,
                record.caller.as_ref(),
                &record.message,
                &attrs,
            )
            .map_err(|e| {
                metrics::record_failure("format");
                HandlerError::Format(e)
            })?;

        let severity = (self.level_mapper)(record.level);
        self.sink
            .submit(Entry {
                timestamp: record.time,
                severity,
                payload,
            })
            .map_err(|e| {
                metrics::record_failure("submit");
                HandlerError::Submit(e)
            })?;

        metrics::record_submitted(severity);
        Ok(())
    }

    fn report_async_error(&self, error: &HandlerError) {
        match &self.on_async_error {
            Some(hook) => hook(error),
            None => tracing::warn!(
                log = %self.log_path,
                error = %error,
                "Dropped record from asynchronous dispatch"
            ),
        }
    }
}

/// Log handler forwarding records to a cloud logging backend.
///
/// Cloning or deriving a handler shares the backend connection and the
/// pending-dispatch list; attributes and groups are per handler.
#[derive(Clone)]
pub struct CloudLoggingHandler {
    state: HandlerState,
    shared: Arc<Shared>,
}

impl CloudLoggingHandler {
    /// Create a handler writing through an [`HttpSink`].
    ///
    /// Fails with [`HandlerError::Config`] when required options are missing
    /// and [`HandlerError::Connection`] when the client cannot be built.
    pub fn new(options: Options) -> Result<Self, HandlerError> {
        validate_config(&options.config).map_err(HandlerError::Config)?;
        let sink = HttpSink::connect(&options.config).map_err(HandlerError::Connection)?;
        Self::build(options, Arc::new(sink))
    }

    /// Create a handler writing through a caller-supplied sink.
    pub fn with_sink(options: Options, sink: Arc<dyn Sink>) -> Result<Self, HandlerError> {
        validate_config(&options.config).map_err(HandlerError::Config)?;
        Self::build(options, sink)
    }

    fn build(options: Options, sink: Arc<dyn Sink>) -> Result<Self, HandlerError> {
        let Options {
            config,
            level_mapper,
            record_formatter,
            scheduler,
            on_async_error,
        } = options;

        let dispatcher = if config.enable_async {
            let scheduler: Arc<dyn Scheduler> = match scheduler {
                Some(scheduler) => scheduler,
                None => Arc::new(TokioScheduler::current().ok_or(HandlerError::Scheduler)?),
            };
            Dispatcher::asynchronous(scheduler)
        } else {
            Dispatcher::synchronous()
        };

        let log_path = config.log_path();
        tracing::debug!(
            log = %log_path,
            level = %config.level,
            enable_async = config.enable_async,
            "Cloud logging handler created"
        );

        let shared = Shared {
            log_path,
            level_mapper: level_mapper.unwrap_or_else(|| Arc::new(default_level_mapper)),
            formatter: record_formatter.unwrap_or_else(|| Arc::new(JsonFormatter::default())),
            on_async_error,
            sink,
            dispatcher,
            closed: AtomicBool::new(false),
            config,
        };

        Ok(Self {
            state: HandlerState::new(),
            shared: Arc::new(shared),
        })
    }

    /// Configuration this handler chain was built with.
    pub fn config(&self) -> &HandlerConfig {
        &self.shared.config
    }

    /// Attribute and group state of this handler.
    pub fn state(&self) -> &HandlerState {
        &self.state
    }

    /// Number of async dispatches not yet drained by shutdown.
    pub fn pending(&self) -> usize {
        self.shared.dispatcher.pending().len()
    }

    /// Whether records at `level` should be passed to [`handle`](Self::handle).
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.shared.config.level
    }

    /// Derive a handler with `attrs` added in the active group scope.
    pub fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        Self {
            state: self.state.with_attrs(attrs),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Derive a handler with `name` as the active group. An empty name
    /// returns an equivalent handler.
    pub fn with_group(&self, name: &str) -> Self {
        Self {
            state: self.state.with_group(name),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Send `record` to the backend.
    ///
    /// No level filtering happens here; callers check [`enabled`](Self::enabled).
    /// With async dispatch this returns `Ok(())` as soon as the record is
    /// scheduled, even if writing it later fails; failures go to the async
    /// error hook instead.
    pub fn handle(&self, record: Record) -> Result<(), HandlerError> {
        let shared = Arc::clone(&self.shared);
        let state = self.state.clone();
        let report_errors = self.shared.dispatcher.is_async();

        self.shared
            .dispatcher
            .dispatch(Box::new(move || -> Result<(), HandlerError> {
                let result = shared.process(&state, record);
                if report_errors {
                    if let Err(e) = &result {
                        shared.report_async_error(e);
                    }
                }
                result
            }))
    }

    /// Drain pending dispatches, then release the backend connection.
    ///
    /// Every pending dispatch is awaited regardless of `continue_on_error`.
    /// When it is `false`, failed dispatches seen during the drain are
    /// returned as [`HandlerError::Drain`]; a close failure takes precedence.
    /// The connection is released once per handler chain.
    pub async fn shutdown(&self, continue_on_error: bool) -> Result<(), HandlerError> {
        let shared = &self.shared;
        let report = shutdown::drain(shared.dispatcher.pending(), |e| shared.report_async_error(e)).await;

        if !self.shared.closed.swap(true, Ordering::AcqRel) {
            self.shared.sink.close().map_err(HandlerError::Close)?;
            tracing::debug!(log = %self.shared.log_path, "Cloud logging handler closed");
        }

        if continue_on_error {
            return Ok(());
        }
        match report.into_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for CloudLoggingHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudLoggingHandler")
            .field("log", &self.shared.log_path)
            .field("groups", &self.state.groups())
            .field("attrs", &self.state.attrs().len())
            .field("enable_async", &self.shared.dispatcher.is_async())
            .finish()
    }
}
