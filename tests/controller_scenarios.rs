use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use canvas_ruler::{
    BackendKind, HeadlessHost, ModePreference, MountTarget, RenderMode, ResizeRequest, Ruler,
    RulerConfig, RulerError, ScrollDispatch, ScrollOffset, ScrollTargetId, ScrollTargetRef, Size,
    StylePatch,
};

const WAIT: Duration = Duration::from_secs(5);

fn host(pixel_ratio: f32) -> (Arc<HeadlessHost>, ScrollTargetId) {
    let host = HeadlessHost::new(pixel_ratio);
    host.set_mount_size(
        MountTarget::Wrapper("stage".into()),
        Size::new(1200.0, 800.0),
    );
    let target = host.add_scroll_target("#workspace");
    (Arc::new(host), target)
}

fn config(mode: ModePreference, width: f32, height: f32) -> RulerConfig {
    let mut config = RulerConfig::new("stage");
    config.mode = mode;
    config.content_width = width;
    config.content_height = height;
    config.scroll_selector = Some("#workspace".into());
    config.style.gap = Some(10.0);
    config.style.scale = Some(1.0);
    config
}

/// Bounded rulers scroll by moving their container; nothing is redrawn
#[test]
fn test_bounded_scroll_translates_container() {
    let (host, target) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Screen, 1000.0, 1000.0), host).unwrap();
    assert_eq!(ruler.render_mode(), RenderMode::Bounded);
    let redraws = ruler.redraws();

    assert!(ruler.handle_scroll(target, ScrollOffset::new(35.0, 0.0)));
    let dispatch = ruler.animation_frame().unwrap();

    assert_eq!(dispatch, Some(ScrollDispatch::Translated));
    assert_eq!(ruler.container().horizontal.unwrap().translate, -35.0);
    assert_eq!(ruler.container().vertical.unwrap().translate, 0.0);
    assert_eq!(ruler.redraws(), redraws);
    assert_eq!(ruler.geometry().scroll, ScrollOffset::new(35.0, 0.0));
}

/// Infinite rulers redraw the visible window starting at -ceil(s / gap)
#[test]
fn test_infinite_scroll_redraws_window() {
    let (host, target) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Infinite, 1000.0, 1000.0), host).unwrap();
    assert_eq!(ruler.render_mode(), RenderMode::Infinite);
    let redraws = ruler.redraws();

    assert!(ruler.handle_scroll(target, ScrollOffset::new(35.0, 0.0)));
    let dispatch = ruler.animation_frame().unwrap();

    assert_eq!(dispatch, Some(ScrollDispatch::Redrawn));
    assert_eq!(ruler.redraws(), redraws + 1);
    let window = ruler.surfaces().horizontal.last_window().unwrap();
    assert_eq!(window.start, -4);
    assert_eq!(ruler.container().horizontal.unwrap().translate, 0.0);
}

/// The same scroll through the worker backend lands after a flush
#[test]
fn test_infinite_scroll_through_worker() {
    let (host, target) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Auto, 25_000.0, 1000.0), host).unwrap();
    assert_eq!(ruler.backend_kind(), BackendKind::Offscreen);
    ruler.flush(WAIT).unwrap();
    let redraws = ruler.redraws();

    assert!(ruler.handle_scroll(target, ScrollOffset::new(35.0, 0.0)));
    assert_eq!(
        ruler.animation_frame().unwrap(),
        Some(ScrollDispatch::Redrawn)
    );
    ruler.flush(WAIT).unwrap();

    assert_eq!(ruler.redraws(), redraws + 1);
    assert_eq!(
        ruler.surfaces().horizontal.last_window().map(|w| w.start),
        Some(-4)
    );
    ruler.destroy().unwrap();
}

/// Frames finished by the worker land on the next animation frame without
/// an explicit poll
#[test]
fn test_animation_frames_apply_worker_frames() {
    let (host, target) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Auto, 25_000.0, 1000.0), host).unwrap();
    assert_eq!(ruler.backend_kind(), BackendKind::Offscreen);

    for step in 1..=20 {
        ruler.handle_scroll(target, ScrollOffset::new(step as f32 * 10.0, 0.0));
        ruler.animation_frame().unwrap();
        std::thread::sleep(Duration::from_millis(10));
    }
    let landed = ruler.redraws();
    assert!(landed > 0, "no worker frame applied");

    let deadline = std::time::Instant::now() + WAIT;
    while ruler.redraws() < 21 && std::time::Instant::now() < deadline {
        assert_eq!(ruler.animation_frame().unwrap(), None);
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(ruler.redraws(), 21);
    assert_eq!(
        ruler.surfaces().horizontal.last_window().map(|w| w.start),
        Some(-20)
    );
    ruler.destroy().unwrap();
}

/// Auto mode switches to infinite past the 20000 threshold
#[test]
fn test_mode_selection() {
    let (host, _) = host(1.0);
    let big = Ruler::new(config(ModePreference::Auto, 25_000.0, 1000.0), host.clone()).unwrap();
    assert_eq!(big.render_mode(), RenderMode::Infinite);

    let mut config = config(ModePreference::Auto, 1000.0, 1000.0);
    config.ruler_id = "small".into();
    let small = Ruler::new(config, host).unwrap();
    assert_eq!(small.render_mode(), RenderMode::Bounded);
    assert_eq!(small.backend_kind(), BackendKind::Screen);
}

/// Invalid scale and empty resize fail and change nothing
#[test]
fn test_invalid_arguments_leave_ruler_unchanged() {
    let (host, _) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Screen, 1000.0, 1000.0), host).unwrap();
    let style = ruler.style().clone();
    let geometry = *ruler.geometry();

    let err = ruler.scale(f32::NAN).unwrap_err();
    assert!(matches!(err, RulerError::InvalidScale(_)));
    assert!(err.is_configuration());

    let err = ruler.resize(ResizeRequest::default()).unwrap_err();
    assert!(matches!(err, RulerError::InvalidResize));

    assert_eq!(ruler.style(), &style);
    assert_eq!(ruler.geometry(), &geometry);
    assert_eq!(ruler.redraws(), 1);
}

/// Scaling changes labels; the same scale again is a no-op
#[test]
fn test_scale_redraws_once_per_change() {
    let (host, _) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Screen, 1000.0, 1000.0), host).unwrap();

    ruler.scale(2.0).unwrap();
    assert_eq!(ruler.style().scale, 2.0);
    assert_eq!(ruler.redraws(), 2);

    ruler.scale(2.0).unwrap();
    assert_eq!(ruler.redraws(), 2);
}

/// A second identical resize is a pure no-op
#[test]
fn test_resize_is_idempotent() {
    let (host, _) = host(2.0);
    let mut ruler = Ruler::new(config(ModePreference::Screen, 1000.0, 1000.0), host).unwrap();

    assert!(
        ruler
            .resize(ResizeRequest::new(3000.0, 2000.0).with_size(24.0))
            .unwrap()
    );
    let redraws = ruler.redraws();
    let bytes = ruler.surfaces().horizontal.pixmap().data().to_vec();
    assert_eq!(ruler.surfaces().horizontal.backing_size(), (7600, 48));

    assert!(
        !ruler
            .resize(ResizeRequest::new(3000.0, 2000.0).with_size(24.0))
            .unwrap()
    );
    assert_eq!(ruler.redraws(), redraws);
    assert_eq!(ruler.surfaces().horizontal.pixmap().data(), bytes.as_slice());
}

/// Shrinking inside the current surfaces skips the redraw
#[test]
fn test_resize_within_surfaces_is_skipped() {
    let (host, _) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Screen, 2000.0, 2000.0), host).unwrap();
    assert!(!ruler.resize(ResizeRequest::new(1500.0, 1800.0)).unwrap());
    assert!(ruler.resize(ResizeRequest::new(2500.0, 1800.0)).unwrap());
    assert_eq!(ruler.geometry().content, Size::new(2500.0, 1800.0));
}

/// Growing past the threshold switches to infinite and resets the translation
#[test]
fn test_resize_past_threshold_goes_infinite() {
    let (host, target) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Screen, 1000.0, 1000.0), host).unwrap();
    ruler.handle_scroll(target, ScrollOffset::new(50.0, 60.0));
    ruler.animation_frame().unwrap();
    assert_eq!(ruler.container().horizontal.unwrap().translate, -50.0);

    assert!(ruler.resize(ResizeRequest::new(30_000.0, 1000.0)).unwrap());
    assert_eq!(ruler.render_mode(), RenderMode::Infinite);
    assert_eq!(ruler.container().horizontal.unwrap().translate, 0.0);
    // drawable follows the viewport plus the oversize margin
    assert_eq!(ruler.surfaces().horizontal.logical(), Size::new(2000.0, 20.0));

    assert!(ruler.resize(ResizeRequest::new(1000.0, 1000.0)).unwrap());
    assert_eq!(ruler.render_mode(), RenderMode::Bounded);
    assert_eq!(ruler.container().horizontal.unwrap().translate, -50.0);
    assert_eq!(ruler.container().vertical.unwrap().translate, -60.0);
}

/// Infinite surfaces follow the viewport, so content-only changes keep them
#[test]
fn test_infinite_content_change_keeps_surfaces() {
    let (host, _) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Infinite, 1000.0, 1000.0), host).unwrap();
    let redraws = ruler.redraws();

    assert!(!ruler.resize(ResizeRequest::new(5000.0, 3000.0)).unwrap());
    assert_eq!(ruler.redraws(), redraws);
    assert_eq!(ruler.geometry().content, Size::new(5000.0, 3000.0));
    assert_eq!(ruler.surfaces().horizontal.logical(), Size::new(2000.0, 20.0));

    assert!(
        ruler
            .resize(ResizeRequest::new(5000.0, 3000.0).with_size(30.0))
            .unwrap()
    );
    assert_eq!(ruler.redraws(), redraws + 1);
}

/// Scroll events are throttled to one per frame
#[test]
fn test_scroll_events_throttled_per_frame() {
    let (host, target) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Infinite, 1000.0, 1000.0), host).unwrap();
    let redraws = ruler.redraws();

    assert!(ruler.handle_scroll(target, ScrollOffset::new(10.0, 0.0)));
    assert!(!ruler.handle_scroll(target, ScrollOffset::new(20.0, 0.0)));
    assert!(!ruler.handle_scroll(target, ScrollOffset::new(30.0, 0.0)));
    ruler.animation_frame().unwrap();
    assert_eq!(ruler.animation_frame().unwrap(), None);

    assert_eq!(ruler.redraws(), redraws + 1);
    assert_eq!(ruler.geometry().scroll, ScrollOffset::new(10.0, 0.0));
    assert_eq!(ruler.dropped_scroll_events(), 2);
}

/// The scroll callback sees every dispatched frame
#[test]
fn test_on_scroll_callback() {
    let (host, target) = host(1.0);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicU32::new(0));
    let sink = Arc::clone(&seen);
    let counter = Arc::clone(&calls);
    let config = config(ModePreference::Screen, 1000.0, 1000.0).with_on_scroll(move |left, top| {
        sink.lock().unwrap().push((left, top));
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut ruler = Ruler::new(config, host).unwrap();

    ruler.handle_scroll(target, ScrollOffset::new(5.0, 7.0));
    ruler.animation_frame().unwrap();
    ruler.handle_scroll(target, ScrollOffset::new(8.0, 9.0));
    ruler.animation_frame().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(*seen.lock().unwrap(), vec![(5.0, 7.0), (8.0, 9.0)]);
}

/// Scroll events only count for the bound target
#[test]
fn test_change_scroll_element() {
    let (host, old) = host(1.0);
    let new = host.add_scroll_target("#other");
    let mut ruler = Ruler::new(config(ModePreference::Screen, 1000.0, 1000.0), host).unwrap();

    let err = ruler
        .change_scroll_element(ScrollTargetRef::Selector("#missing".into()))
        .unwrap_err();
    assert!(matches!(err, RulerError::UnresolvedScrollTarget(_)));
    assert_eq!(ruler.scroll_target(), Some(old));

    ruler
        .change_scroll_element(ScrollTargetRef::Selector("#other".into()))
        .unwrap();
    assert!(!ruler.handle_scroll(old, ScrollOffset::new(1.0, 1.0)));
    assert!(ruler.handle_scroll(new, ScrollOffset::new(1.0, 1.0)));
}

/// Construction errors come from the taxonomy of configuration errors
#[test]
fn test_construction_errors() {
    let (host, _) = host(1.0);

    let mut bad_type = config(ModePreference::Auto, 100.0, 100.0);
    bad_type.render_type = "range".into();
    assert!(matches!(
        Ruler::new(bad_type, host.clone()).err(),
        Some(RulerError::IllegalRenderType(_))
    ));

    let mut bad_scroll = config(ModePreference::Auto, 100.0, 100.0);
    bad_scroll.scroll_selector = Some("#nope".into());
    assert!(matches!(
        Ruler::new(bad_scroll, host.clone()).err(),
        Some(RulerError::UnresolvedScrollTarget(_))
    ));

    let mut bad_gap = config(ModePreference::Auto, 100.0, 100.0);
    bad_gap.style.gap = Some(-1.0);
    let err = Ruler::new(bad_gap, host).err().unwrap();
    assert!(matches!(err, RulerError::InvalidStyle { .. }));

    assert!(serde_yaml::from_str::<StylePatch>("backgroundColor: '#12'").is_err());
}

/// Style updates refresh the unit corner and honour `show`
#[test]
fn test_update_refreshes_unit_and_visibility() {
    let (host, _) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Screen, 1000.0, 1000.0), host).unwrap();

    let patch: StylePatch =
        serde_yaml::from_str("show: false\nunit:\n  text: mm\n  fontSize: 10\n").unwrap();
    ruler.update(&patch).unwrap();

    let unit = ruler.container().unit.clone().unwrap();
    assert_eq!(unit.text, "mm");
    assert_eq!(unit.font_size, 10.0);
    assert!(!ruler.container().visible);
    assert_eq!(ruler.redraws(), 2);
}

/// Destroy is terminal
#[test]
fn test_destroy_is_terminal() {
    let (host, target) = host(1.0);
    let mut ruler = Ruler::new(config(ModePreference::Screen, 1000.0, 1000.0), host).unwrap();
    ruler.destroy().unwrap();

    assert!(ruler.is_destroyed());
    assert!(!ruler.container().mounted);
    assert!(!ruler.handle_scroll(target, ScrollOffset::new(1.0, 1.0)));
    assert!(matches!(ruler.scale(2.0), Err(RulerError::Destroyed(_))));
    assert!(matches!(ruler.destroy(), Err(RulerError::Destroyed(_))));
    assert!(matches!(ruler.show(), Err(RulerError::Destroyed(_))));
}
