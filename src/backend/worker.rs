//! Ruler render worker - runs in its own thread

use flume::{Receiver, Sender};
use log::{debug, info, warn};

use super::request::{RequestId, WorkerRequest, WorkerResponse};
use crate::error::Result;
use crate::geometry::{ScrollOffset, SurfaceGeometry};
use crate::render::SurfacePair;
use crate::style::RulerStyle;

/// Mirrored ruler state living on the worker
struct WorkerCanvas {
    ruler_id: String,
    surfaces: SurfacePair,
    style: RulerStyle,
    scroll: ScrollOffset,
    infinite: bool,
}

impl WorkerCanvas {
    fn new(
        ruler_id: String,
        geometry: &SurfaceGeometry,
        style: RulerStyle,
        pixel_ratio: f32,
        scroll: ScrollOffset,
    ) -> Result<Self> {
        Ok(Self {
            ruler_id,
            surfaces: SurfacePair::new(geometry, pixel_ratio)?,
            style,
            scroll,
            infinite: geometry.infinite,
        })
    }

    fn render(&mut self, id: RequestId) -> Result<WorkerResponse> {
        self.surfaces.draw(&self.style, self.infinite, self.scroll);
        let [horizontal, vertical] = self.surfaces.take_bitmaps()?;
        debug!(
            "Worker rendered ruler {} for {id:?}: {}x{} / {}x{}",
            self.ruler_id,
            horizontal.width(),
            horizontal.height(),
            vertical.width(),
            vertical.height()
        );
        Ok(WorkerResponse::Frame {
            id,
            horizontal,
            vertical,
        })
    }
}

/// Worker lifecycle: nothing but `Draw` is accepted until the first draw
/// has created the surfaces
enum WorkerState {
    Uninitialized,
    Ready(WorkerCanvas),
}

enum Step {
    Reply(WorkerResponse),
    Stop(WorkerResponse),
}

fn rejected(id: RequestId, request: &'static str, reason: impl Into<String>) -> WorkerResponse {
    let reason = reason.into();
    warn!("Worker rejected {request} {id:?}: {reason}");
    WorkerResponse::Rejected {
        id,
        request,
        reason,
    }
}

impl WorkerState {
    fn handle(&mut self, request: WorkerRequest) -> Step {
        let id = request.id();
        let kind = request.kind();

        if let WorkerRequest::Destroy { id } = request {
            if let WorkerState::Ready(canvas) = self {
                canvas.surfaces.clear();
                info!("Worker for ruler {} released its surfaces", canvas.ruler_id);
            }
            *self = WorkerState::Uninitialized;
            return Step::Stop(WorkerResponse::Destroyed { id });
        }

        if let WorkerRequest::Draw {
            ruler_id,
            surfaces,
            style,
            pixel_ratio,
            scroll,
            ..
        } = request
        {
            return match WorkerCanvas::new(ruler_id, &surfaces, style, pixel_ratio, scroll) {
                Ok(canvas) => {
                    *self = WorkerState::Ready(canvas);
                    self.render(id, kind)
                }
                Err(e) => Step::Reply(rejected(id, kind, e.to_string())),
            };
        }

        let WorkerState::Ready(canvas) = self else {
            return Step::Reply(rejected(id, kind, "no draw request received yet"));
        };

        match request {
            WorkerRequest::Scroll { scroll, .. } => {
                canvas.scroll = scroll;
            }
            WorkerRequest::Scale { style, scroll, .. }
            | WorkerRequest::UpdateOptions { style, scroll, .. } => {
                canvas.style = style;
                canvas.scroll = scroll;
            }
            WorkerRequest::Resize {
                surfaces,
                style,
                scroll,
                ..
            } => {
                if let Err(e) = canvas.surfaces.rescale(&surfaces) {
                    return Step::Reply(rejected(id, kind, e.to_string()));
                }
                canvas.infinite = surfaces.infinite;
                canvas.style = style;
                canvas.scroll = scroll;
            }
            WorkerRequest::Draw { .. } | WorkerRequest::Destroy { .. } => {}
        }

        self.render(id, kind)
    }

    fn render(&mut self, id: RequestId, kind: &'static str) -> Step {
        let WorkerState::Ready(canvas) = self else {
            return Step::Reply(rejected(id, kind, "no draw request received yet"));
        };
        match canvas.render(id) {
            Ok(frame) => Step::Reply(frame),
            Err(e) => Step::Reply(rejected(id, kind, e.to_string())),
        }
    }
}

/// Worker loop: handles one request to completion before taking the next.
/// Returns after `Destroy` or when either channel closes.
pub fn ruler_worker(requests: Receiver<WorkerRequest>, responses: Sender<WorkerResponse>) {
    let mut state = WorkerState::Uninitialized;

    for request in requests {
        debug!("Worker received {} {:?}", request.kind(), request.id());
        match state.handle(request) {
            Step::Reply(response) => {
                if responses.send(response).is_err() {
                    break;
                }
            }
            Step::Stop(response) => {
                let _ = responses.send(response);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn draw(id: u64) -> WorkerRequest {
        WorkerRequest::Draw {
            id: RequestId::new(id),
            ruler_id: "worker-test".into(),
            surfaces: SurfaceGeometry {
                horizontal: Size::new(500.0, 20.0),
                vertical: Size::new(20.0, 500.0),
                infinite: true,
            },
            style: RulerStyle::default(),
            pixel_ratio: 2.0,
            scroll: ScrollOffset::default(),
        }
    }

    fn reply(step: Step) -> WorkerResponse {
        match step {
            Step::Reply(response) => response,
            Step::Stop(_) => panic!("worker stopped"),
        }
    }

    #[test]
    fn rejects_everything_but_draw_before_ready() {
        let mut state = WorkerState::Uninitialized;
        let response = reply(state.handle(WorkerRequest::Scroll {
            id: RequestId::new(1),
            scroll: ScrollOffset::new(10.0, 0.0),
        }));
        assert!(matches!(
            response,
            WorkerResponse::Rejected { request: "scroll", .. }
        ));
        assert!(matches!(state, WorkerState::Uninitialized));
    }

    #[test]
    fn draw_makes_worker_ready_and_renders() {
        let mut state = WorkerState::Uninitialized;
        match reply(state.handle(draw(1))) {
            WorkerResponse::Frame {
                id,
                horizontal,
                vertical,
            } => {
                assert_eq!(id, RequestId::new(1));
                assert_eq!((horizontal.width(), horizontal.height()), (1000, 40));
                assert_eq!((vertical.width(), vertical.height()), (40, 1000));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(state, WorkerState::Ready(_)));
    }

    #[test]
    fn scroll_after_draw_renders_window() {
        let mut state = WorkerState::Uninitialized;
        let _ = reply(state.handle(draw(1)));
        match reply(state.handle(WorkerRequest::Scroll {
            id: RequestId::new(2),
            scroll: ScrollOffset::new(35.0, 0.0),
        })) {
            WorkerResponse::Frame { horizontal, .. } => {
                assert_eq!(horizontal.window.map(|w| w.start), Some(-4));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn destroy_stops_the_loop() {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();
        request_tx.send(draw(1)).unwrap();
        request_tx
            .send(WorkerRequest::Destroy {
                id: RequestId::new(2),
            })
            .unwrap();
        request_tx
            .send(WorkerRequest::Scroll {
                id: RequestId::new(3),
                scroll: ScrollOffset::default(),
            })
            .unwrap();

        ruler_worker(request_rx, response_tx);

        let responses: Vec<WorkerResponse> = response_rx.drain().collect();
        assert_eq!(responses.len(), 2);
        assert!(matches!(responses[0], WorkerResponse::Frame { .. }));
        assert!(matches!(
            responses[1],
            WorkerResponse::Destroyed { id: RequestId(2) }
        ));
    }
}
