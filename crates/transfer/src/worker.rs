//! Background grid computation with an explicit Idle → Running → Completed lifecycle.
//!
//! The computing thread owns every buffer until it finishes; the finished grid
//! is handed back through a one-slot channel, so the caller never observes a
//! partially written grid and never blocks unless it asks to.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, TryRecvError, bounded};
use thiserror::Error;
use twp_ephemeris::Ephemeris;

use crate::evaluator::{TransferEvaluator, TransferSpec};
use crate::porkchop::{GridError, GridRequest, Palette, PorkchopGrid, compute_grid_with_progress};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkerError {
    #[error("a porkchop computation is already running")]
    Busy,
    #[error("no porkchop computation has been started")]
    NotRunning,
    #[error("porkchop worker thread exited without a result")]
    Disconnected,
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Completed,
}

/// Everything one grid computation needs; moved into the worker thread.
#[derive(Debug, Clone)]
pub struct PorkchopJob<E> {
    pub evaluator: TransferEvaluator<E>,
    pub spec: TransferSpec,
    pub request: GridRequest,
    pub palette: Palette,
}

type GridResult = Result<PorkchopGrid, GridError>;

/// Runs at most one porkchop grid at a time on a dedicated thread.
#[derive(Debug)]
pub struct PorkchopWorker {
    state: WorkerState,
    result: Option<Receiver<GridResult>>,
    handle: Option<JoinHandle<()>>,
    rows_done: Arc<AtomicUsize>,
    rows_total: usize,
}

impl Default for PorkchopWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl PorkchopWorker {
    pub fn new() -> Self {
        Self {
            state: WorkerState::Idle,
            result: None,
            handle: None,
            rows_done: Arc::new(AtomicUsize::new(0)),
            rows_total: 0,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Start computing `job`. Fails with [`WorkerError::Busy`] while a grid is in flight.
    pub fn start<E>(&mut self, job: PorkchopJob<E>) -> Result<(), WorkerError>
    where
        E: Ephemeris + Send + 'static,
    {
        if self.state == WorkerState::Running {
            return Err(WorkerError::Busy);
        }

        let (tx, rx) = bounded::<GridResult>(1);
        let rows_done = Arc::new(AtomicUsize::new(0));
        let progress = Arc::clone(&rows_done);
        let width = job.request.size.width;
        let height = job.request.size.height;

        log::info!(
            "starting {}x{} porkchop {} -> {}",
            width,
            height,
            job.spec.origin.name,
            job.spec.destination.name
        );

        let handle = thread::spawn(move || {
            let PorkchopJob {
                evaluator,
                spec,
                request,
                palette,
            } = job;
            let result = compute_grid_with_progress(&evaluator, &spec, &request, &palette, |rows| {
                progress.store(rows, Ordering::Release);
            });
            // The receiver may already be gone if the worker was dropped.
            let _ = tx.send(result);
        });

        self.state = WorkerState::Running;
        self.result = Some(rx);
        self.handle = Some(handle);
        self.rows_done = rows_done;
        self.rows_total = height;
        Ok(())
    }

    /// Non-blocking check for the finished grid. `Ok(None)` while still running.
    pub fn poll(&mut self) -> Result<Option<PorkchopGrid>, WorkerError> {
        let rx = self.running_receiver()?;
        match rx.try_recv() {
            Ok(result) => self.finish(result).map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => self.disconnected(),
        }
    }

    /// Block until the running grid finishes.
    pub fn wait(&mut self) -> Result<PorkchopGrid, WorkerError> {
        let rx = self.running_receiver()?;
        match rx.recv() {
            Ok(result) => self.finish(result),
            Err(_) => self.disconnected(),
        }
    }

    /// Fraction of rows finished, in [0, 1].
    pub fn progress(&self) -> f64 {
        match self.state {
            WorkerState::Idle => 0.0,
            WorkerState::Completed => 1.0,
            WorkerState::Running if self.rows_total == 0 => 0.0,
            WorkerState::Running => {
                self.rows_done.load(Ordering::Acquire) as f64 / self.rows_total as f64
            }
        }
    }

    fn running_receiver(&self) -> Result<Receiver<GridResult>, WorkerError> {
        match (&self.state, &self.result) {
            (WorkerState::Running, Some(rx)) => Ok(rx.clone()),
            _ => Err(WorkerError::NotRunning),
        }
    }

    fn finish(&mut self, result: GridResult) -> Result<PorkchopGrid, WorkerError> {
        self.join();
        match &result {
            Ok(grid) => log::info!(
                "porkchop finished: best cell {:?}, {} invalid cells",
                grid.best_cell(),
                grid.invalid_cells()
            ),
            Err(err) => log::info!("porkchop finished without a grid: {err}"),
        }
        Ok(result?)
    }

    fn disconnected<T>(&mut self) -> Result<T, WorkerError> {
        self.join();
        Err(WorkerError::Disconnected)
    }

    fn join(&mut self) {
        self.state = WorkerState::Completed;
        self.result = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("porkchop worker thread panicked");
            }
        }
    }
}
