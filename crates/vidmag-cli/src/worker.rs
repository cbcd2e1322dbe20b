use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use anyhow::{anyhow, Context, Result};
use tracing::debug;
use vidmag_core::analysis::AnalysisResult;
use vidmag_core::io::{FrameSink, FrameSource};
use vidmag_core::pipeline::{Magnifier, ParameterHandle};
use vidmag_core::roi::{Rect, Selection};

/// Progress sent from the worker thread for every processed frame.
pub struct FrameEvent {
    pub index: usize,
    pub roi: Rect,
    pub reallocated: bool,
    pub analysis: Option<AnalysisResult>,
}

/// Handle to a running magnification worker.
pub struct Worker {
    pub events: mpsc::Receiver<FrameEvent>,
    shutdown: Arc<AtomicBool>,
    thread: JoinHandle<vidmag_core::error::Result<usize>>,
}

impl Worker {
    /// Ask the worker to stop after the frame in flight.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the worker and return the number of frames it processed.
    pub fn join(self) -> Result<usize> {
        let processed = self
            .thread
            .join()
            .map_err(|_| anyhow!("Worker thread panicked"))?
            .context("Magnification failed")?;
        Ok(processed)
    }
}

/// Start processing `source` on a dedicated thread.
///
/// The worker reads one configuration snapshot from `params` per frame and
/// publishes adopted ROIs back to it. It stops when the source is exhausted,
/// after `limit` frames, or when [`Worker::stop`] is called.
pub fn spawn_worker(
    source: Box<dyn FrameSource>,
    params: ParameterHandle,
    selection: Selection,
    sink: Option<Box<dyn FrameSink + Send>>,
    limit: Option<usize>,
) -> Result<Worker> {
    let (tx, rx) = mpsc::channel();
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);

    let thread = std::thread::Builder::new()
        .name("vidmag-worker".into())
        .spawn(move || worker_loop(source, params, selection, sink, limit, flag, tx))
        .context("Failed to spawn worker thread")?;

    Ok(Worker {
        events: rx,
        shutdown,
        thread,
    })
}

fn worker_loop(
    mut source: Box<dyn FrameSource>,
    params: ParameterHandle,
    mut selection: Selection,
    mut sink: Option<Box<dyn FrameSink + Send>>,
    limit: Option<usize>,
    shutdown: Arc<AtomicBool>,
    tx: mpsc::Sender<FrameEvent>,
) -> vidmag_core::error::Result<usize> {
    let mut magnifier = Magnifier::new();
    let mut processed = 0;

    while !shutdown.load(Ordering::Relaxed) && limit.map_or(true, |limit| processed < limit) {
        let Some(frame) = source.next_frame()? else {
            break;
        };
        let index = frame.metadata.frame_index;

        let snapshot = params.snapshot();
        let output = magnifier.process(frame, &snapshot, &selection)?;
        selection.consume();
        if output.roi_adopted {
            let roi = output.roi;
            params.update(|p| p.roi = roi);
        }

        if let Some(sink) = sink.as_mut() {
            sink.write_frame(&output)?;
        }
        processed += 1;

        let event = FrameEvent {
            index,
            roi: output.roi,
            reallocated: output.reallocated,
            analysis: output.analysis,
        };
        if tx.send(event).is_err() {
            debug!("Event receiver dropped, stopping worker");
            break;
        }
    }

    if let Some(sink) = sink.as_mut() {
        sink.finish()?;
    }
    Ok(processed)
}
