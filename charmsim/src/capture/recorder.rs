use std::{fmt, mem, rc::Rc};

use crate::{
    Error, Misuse, Result,
    capture::{CaptureConfig, CaptureLog, Collector},
    interception::{self, InterceptorGuard},
};

enum Status {
    Idle,
    Recording {
        collector: Rc<Collector>,
        guard: InterceptorGuard,
    },
    Stopped(CaptureLog),
}

/// Records the emissions of a scope into a [`CaptureLog`].
///
/// A recorder is single use: `start()` installs its interceptor on the
/// current thread, `stop()` removes it and freezes the log. Dropping a
/// recorder that is still recording removes the interceptor as well, so a
/// failing or panicking test never leaks it into the next one.
///
/// # Example
///
/// ```rust
/// use charmsim::capture::{CaptureConfig, CaptureRecorder};
///
/// let mut recorder = CaptureRecorder::new(CaptureConfig::default());
/// recorder.start()?;
/// // ... trigger events ...
/// let log = recorder.finish()?;
/// assert!(log.is_empty());
/// # Ok::<(), charmsim::Error>(())
/// ```
pub struct CaptureRecorder {
    config: CaptureConfig,
    status: Status,
}

impl CaptureRecorder {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            status: Status::Idle,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.status, Status::Recording { .. })
    }

    /// Install the interceptor and begin recording.
    ///
    /// # Errors
    ///
    /// [`Misuse::AlreadyStarted`] if the recorder was started before, even
    /// if it has since stopped.
    pub fn start(&mut self) -> Result<()> {
        if !matches!(self.status, Status::Idle) {
            return Err(Error::RecorderMisuse(Misuse::AlreadyStarted));
        }
        self.begin();
        Ok(())
    }

    fn begin(&mut self) {
        let collector = Rc::new(Collector::new(self.config.clone()));
        let guard = interception::install_shared(collector.clone());
        tracing::trace!(interceptor_id = guard.id(), "capture started");
        self.status = Status::Recording { collector, guard };
    }

    /// Remove the interceptor and freeze the log.
    ///
    /// # Errors
    ///
    /// [`Misuse::NotStarted`] before `start()`, [`Misuse::AlreadyStopped`]
    /// on a second call.
    pub fn stop(&mut self) -> Result<()> {
        match mem::replace(&mut self.status, Status::Idle) {
            Status::Idle => Err(Error::RecorderMisuse(Misuse::NotStarted)),
            Status::Stopped(log) => {
                self.status = Status::Stopped(log);
                Err(Error::RecorderMisuse(Misuse::AlreadyStopped))
            }
            Status::Recording { collector, guard } => {
                guard.remove();
                let log = CaptureLog::new(collector.take());
                tracing::trace!(captured = log.len(), "capture stopped");
                self.status = Status::Stopped(log);
                Ok(())
            }
        }
    }

    /// The frozen log.
    ///
    /// # Errors
    ///
    /// [`Misuse::StillRecording`] while the scope is open,
    /// [`Misuse::NotStarted`] before it opened.
    pub fn log(&self) -> Result<CaptureLog> {
        match &self.status {
            Status::Idle => Err(Error::RecorderMisuse(Misuse::NotStarted)),
            Status::Recording { .. } => Err(Error::RecorderMisuse(Misuse::StillRecording)),
            Status::Stopped(log) => Ok(log.clone()),
        }
    }

    /// Stop if still recording and return the log.
    pub fn finish(mut self) -> Result<CaptureLog> {
        if self.is_recording() {
            self.stop()?;
        }
        self.log()
    }
}

impl Drop for CaptureRecorder {
    fn drop(&mut self) {
        if let Status::Recording { collector, .. } = &self.status {
            tracing::trace!(
                discarded = collector.len(),
                "capture dropped while recording"
            );
        }
        // The guard, if any, removes the interceptor as it drops.
        self.status = Status::Idle;
    }
}

impl fmt::Debug for CaptureRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match &self.status {
            Status::Idle => "idle",
            Status::Recording { .. } => "recording",
            Status::Stopped(_) => "stopped",
        };
        f.debug_struct("CaptureRecorder")
            .field("config", &self.config)
            .field("status", &status)
            .finish()
    }
}

/// The result of a [`capture`] scope together with everything it emitted.
#[derive(Debug)]
pub struct Captured<R> {
    pub result: Result<R>,
    pub log: CaptureLog,
}

impl<R> Captured<R> {
    /// Split into the scope's result and the log.
    pub fn into_parts(self) -> (Result<R>, CaptureLog) {
        (self.result, self.log)
    }
}

/// Create a recorder that is already recording.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = capture_events(CaptureConfig::default().with_type::<Foo>());
/// charmsim::trigger::<MyCharm>(&State::new(), "start", &meta)?;
/// let log = recorder.finish()?;
/// ```
pub fn capture_events(config: CaptureConfig) -> CaptureRecorder {
    let mut recorder = CaptureRecorder::new(config);
    recorder.begin();
    recorder
}

/// Run `f` inside a capture scope.
///
/// The log is returned whether `f` succeeds or fails. If `f` panics the
/// interceptor is removed while unwinding and the panic continues.
pub fn capture<R>(config: CaptureConfig, f: impl FnOnce() -> Result<R>) -> Captured<R> {
    let recorder = capture_events(config);
    let result = f();
    let log = match recorder.finish() {
        Ok(log) => log,
        Err(e) => {
            // A fresh recorder in the recording state always finishes.
            tracing::error!(error = %e, "capture scope failed to close");
            CaptureLog::default()
        }
    };
    Captured { result, log }
}
