//! Worker backend - main-thread proxy for the ruler worker

use std::collections::BTreeMap;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use flume::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use log::{debug, error, info, warn};

use super::request::{RequestId, WorkerRequest, WorkerResponse};
use super::worker::ruler_worker;
use super::{BackendKind, DESTROY_TIMEOUT, RenderBackend};
use crate::error::{Result, RulerError};
use crate::geometry::{ScrollOffset, SurfaceGeometry};
use crate::render::{Bitmap, SurfacePair};
use crate::style::RulerStyle;

/// Sends ruler work to a background thread and blits the bitmaps it returns
/// into the visible surfaces.
///
/// Responses are applied in send order; a newer frame simply overwrites an
/// older one.
pub struct OffscreenBackend {
    ruler_id: String,
    surfaces: SurfacePair,
    style: RulerStyle,
    scroll: ScrollOffset,
    geometry: SurfaceGeometry,
    pixel_ratio: f32,
    request_tx: Sender<WorkerRequest>,
    response_rx: Receiver<WorkerResponse>,
    worker: Option<JoinHandle<()>>,
    next_request_id: u64,
    pending_requests: BTreeMap<RequestId, &'static str>,
    redraws: u64,
    rejected: u64,
    destroyed: bool,
}

impl OffscreenBackend {
    pub fn new(
        ruler_id: impl Into<String>,
        geometry: &SurfaceGeometry,
        style: &RulerStyle,
        pixel_ratio: f32,
        scroll: ScrollOffset,
    ) -> Result<Self> {
        let ruler_id = ruler_id.into();
        let surfaces = SurfacePair::new(geometry, pixel_ratio)?;

        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();
        let worker = std::thread::Builder::new()
            .name(format!("ruler-worker-{ruler_id}"))
            .spawn(move || ruler_worker(request_rx, response_tx))
            .map_err(|e| {
                error!("Failed to spawn render worker for ruler {ruler_id}: {e}");
                RulerError::WorkerDisconnected(ruler_id.clone())
            })?;
        info!("Spawned render worker for ruler {ruler_id}");

        Ok(Self {
            ruler_id,
            surfaces,
            style: style.clone(),
            scroll,
            geometry: *geometry,
            pixel_ratio,
            request_tx,
            response_rx,
            worker: Some(worker),
            next_request_id: 1,
            pending_requests: BTreeMap::new(),
            redraws: 0,
            rejected: 0,
            destroyed: false,
        })
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            return Err(RulerError::Destroyed(self.ruler_id.clone()));
        }
        Ok(())
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }

    fn send(&mut self, build: impl FnOnce(RequestId) -> WorkerRequest) -> Result<RequestId> {
        self.ensure_alive()?;
        let id = self.next_id();
        let request = build(id);
        let kind = request.kind();
        self.request_tx
            .send(request)
            .map_err(|_| RulerError::WorkerDisconnected(self.ruler_id.clone()))?;
        self.pending_requests.insert(id, kind);
        debug!("Sent {kind} {id:?} to worker for ruler {}", self.ruler_id);
        Ok(id)
    }

    fn blit(&mut self, horizontal: &Bitmap, vertical: &Bitmap) -> Result<()> {
        self.surfaces.horizontal.blit(horizontal)?;
        self.surfaces.vertical.blit(vertical)?;
        self.redraws += 1;
        Ok(())
    }

    /// Apply one response; returns true for an applied frame
    fn apply(&mut self, response: WorkerResponse) -> Result<bool> {
        self.pending_requests.remove(&response.id());
        match response {
            WorkerResponse::Frame {
                id,
                horizontal,
                vertical,
            } => {
                debug!("Blitting frame {id:?} for ruler {}", self.ruler_id);
                self.blit(&horizontal, &vertical)?;
                Ok(true)
            }
            WorkerResponse::Rejected {
                id,
                request,
                reason,
            } => {
                warn!(
                    "Worker for ruler {} rejected {request} {id:?}: {reason}",
                    self.ruler_id
                );
                self.rejected += 1;
                Ok(false)
            }
            WorkerResponse::Destroyed { id } => {
                debug!("Worker for ruler {} acknowledged {id:?}", self.ruler_id);
                Ok(false)
            }
        }
    }

    /// Number of requests sent but not yet answered
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending_requests.len()
    }

    /// Number of requests the worker refused
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Send `Destroy` and wait for the acknowledgement. Frames still in
    /// flight are dropped.
    fn shutdown(&mut self) -> Result<()> {
        let id = self.send(|id| WorkerRequest::Destroy { id })?;
        let deadline = Instant::now() + DESTROY_TIMEOUT;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.response_rx.recv_timeout(remaining) {
                Ok(WorkerResponse::Destroyed { id: ack }) if ack == id => break,
                Ok(other) => {
                    self.pending_requests.remove(&other.id());
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        "Worker for ruler {} did not acknowledge destroy within {DESTROY_TIMEOUT:?}",
                        self.ruler_id
                    );
                    // Detach the stuck worker
                    self.worker = None;
                    return Ok(());
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("Render worker for ruler {} panicked", self.ruler_id);
            }
        }
        Ok(())
    }
}

impl RenderBackend for OffscreenBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Offscreen
    }

    fn draw_canvas(&mut self) -> Result<()> {
        let ruler_id = self.ruler_id.clone();
        let surfaces = self.geometry;
        let style = self.style.clone();
        let pixel_ratio = self.pixel_ratio;
        let scroll = self.scroll;
        self.send(|id| WorkerRequest::Draw {
            id,
            ruler_id,
            surfaces,
            style,
            pixel_ratio,
            scroll,
        })?;
        Ok(())
    }

    fn scale(&mut self, style: &RulerStyle) -> Result<()> {
        let scroll = self.scroll;
        let owned = style.clone();
        self.send(|id| WorkerRequest::Scale {
            id,
            style: owned,
            scroll,
        })?;
        self.style = style.clone();
        Ok(())
    }

    fn update(&mut self, style: &RulerStyle) -> Result<()> {
        let scroll = self.scroll;
        let owned = style.clone();
        self.send(|id| WorkerRequest::UpdateOptions {
            id,
            style: owned,
            scroll,
        })?;
        self.style = style.clone();
        Ok(())
    }

    fn resize(&mut self, geometry: &SurfaceGeometry, style: &RulerStyle) -> Result<()> {
        self.ensure_alive()?;
        self.surfaces.rescale(geometry)?;
        let scroll = self.scroll;
        let surfaces = *geometry;
        let owned = style.clone();
        self.send(|id| WorkerRequest::Resize {
            id,
            surfaces,
            style: owned,
            scroll,
        })?;
        self.geometry = *geometry;
        self.style = style.clone();
        Ok(())
    }

    fn translate(&mut self, scroll: ScrollOffset) -> Result<()> {
        self.send(|id| WorkerRequest::Scroll { id, scroll })?;
        self.scroll = scroll;
        Ok(())
    }

    fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = scroll;
    }

    fn poll(&mut self) -> Result<usize> {
        self.ensure_alive()?;
        let mut applied = 0;
        loop {
            match self.response_rx.try_recv() {
                Ok(response) => {
                    if self.apply(response)? {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.pending_requests.is_empty() {
                        break;
                    }
                    return Err(RulerError::WorkerDisconnected(self.ruler_id.clone()));
                }
            }
        }
        Ok(applied)
    }

    fn flush(&mut self, timeout: Duration) -> Result<usize> {
        self.ensure_alive()?;
        let deadline = Instant::now() + timeout;
        let mut applied = 0;
        while !self.pending_requests.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.response_rx.recv_timeout(remaining) {
                Ok(response) => {
                    if self.apply(response)? {
                        applied += 1;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        "Ruler {}: {} worker requests still in flight after {timeout:?}",
                        self.ruler_id,
                        self.pending_requests.len()
                    );
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(RulerError::WorkerDisconnected(self.ruler_id.clone()));
                }
            }
        }
        Ok(applied)
    }

    fn surfaces(&self) -> &SurfacePair {
        &self.surfaces
    }

    fn redraws(&self) -> u64 {
        self.redraws
    }

    fn destroy(&mut self) -> Result<()> {
        self.ensure_alive()?;
        let result = self.shutdown();
        self.surfaces.clear();
        self.pending_requests.clear();
        self.destroyed = true;
        info!("Offscreen backend for ruler {} destroyed", self.ruler_id);
        result
    }
}

impl Drop for OffscreenBackend {
    fn drop(&mut self) {
        if !self.destroyed {
            let id = self.next_id();
            let _ = self.request_tx.send(WorkerRequest::Destroy { id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    const WAIT: Duration = Duration::from_secs(5);

    fn geometry(infinite: bool) -> SurfaceGeometry {
        SurfaceGeometry {
            horizontal: Size::new(500.0, 20.0),
            vertical: Size::new(20.0, 500.0),
            infinite,
        }
    }

    fn backend(infinite: bool, ratio: f32) -> OffscreenBackend {
        OffscreenBackend::new(
            "offscreen-test",
            &geometry(infinite),
            &RulerStyle::default(),
            ratio,
            ScrollOffset::default(),
        )
        .unwrap()
    }

    #[test]
    fn frames_arrive_at_device_resolution() {
        let mut backend = backend(false, 2.0);
        backend.draw_canvas().unwrap();
        assert_eq!(backend.flush(WAIT).unwrap(), 1);
        assert_eq!(backend.in_flight(), 0);
        assert_eq!(backend.redraws(), 1);
        assert_eq!(backend.surfaces().horizontal.backing_size(), (1000, 40));
        assert_eq!(backend.surfaces().vertical.backing_size(), (40, 1000));
        let bg = RulerStyle::default().background_color;
        let pixel = backend.surfaces().horizontal.pixmap().pixel(3, 3).unwrap();
        assert_eq!((pixel.red(), pixel.green()), (bg.r, bg.g));
        backend.destroy().unwrap();
    }

    #[test]
    fn responses_apply_in_send_order() {
        let mut backend = backend(true, 1.0);
        backend.draw_canvas().unwrap();
        backend.translate(ScrollOffset::new(35.0, 0.0)).unwrap();
        backend.translate(ScrollOffset::new(120.0, 0.0)).unwrap();
        assert_eq!(backend.flush(WAIT).unwrap(), 3);

        let window = backend.surfaces().horizontal.last_window().unwrap();
        assert_eq!(window.origin, 12);
        backend.destroy().unwrap();
    }

    #[test]
    fn resize_rescales_visible_surfaces_immediately() {
        let mut backend = backend(false, 1.0);
        backend.draw_canvas().unwrap();
        backend.flush(WAIT).unwrap();

        let bigger = SurfaceGeometry {
            horizontal: Size::new(800.0, 30.0),
            vertical: Size::new(30.0, 600.0),
            infinite: false,
        };
        backend.resize(&bigger, &RulerStyle::default()).unwrap();
        assert_eq!(backend.surfaces().horizontal.backing_size(), (800, 30));
        backend.flush(WAIT).unwrap();
        assert_eq!(backend.surfaces().vertical.backing_size(), (30, 600));
        assert_eq!(backend.redraws(), 2);
        backend.destroy().unwrap();
    }

    #[test]
    fn destroy_waits_for_ack_and_refuses_more_work() {
        let mut backend = backend(false, 1.0);
        backend.draw_canvas().unwrap();
        backend.destroy().unwrap();
        assert!(backend.worker.is_none());
        assert!(matches!(
            backend.translate(ScrollOffset::default()),
            Err(RulerError::Destroyed(_))
        ));
    }

    #[test]
    fn rejected_before_draw() {
        let mut backend = backend(true, 1.0);
        backend.translate(ScrollOffset::new(5.0, 5.0)).unwrap();
        assert_eq!(backend.flush(WAIT).unwrap(), 0);
        assert_eq!(backend.rejected(), 1);
        assert_eq!(backend.redraws(), 0);
        backend.destroy().unwrap();
    }
}
