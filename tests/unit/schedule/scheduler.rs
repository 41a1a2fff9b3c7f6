use super::*;
use crate::classify::pixel::PixelClass;
use crate::transport::memory::{InMemoryTransport, TransportCall};
use crate::transport::pack::PanelBuffer;

fn size(w: u32, h: u32) -> PanelSize {
    PanelSize::new(w, h).unwrap()
}

fn frame_with(s: PanelSize, px: &[(u32, u32, PixelClass)]) -> ClassifiedFrame {
    let mut f = ClassifiedFrame::blank(s);
    for &(x, y, c) in px {
        f.set(x, y, c);
    }
    f
}

fn started(
    s: PanelSize,
    strategy: Strategy,
    policy: SchedulerPolicy,
) -> (RefreshScheduler, InMemoryTransport) {
    let mut sched = RefreshScheduler::new(s, strategy, policy).unwrap();
    let mut t = InMemoryTransport::new();
    sched.start(&mut t).unwrap();
    t.clear_calls();
    (sched, t)
}

fn last_full(t: &InMemoryTransport) -> &PanelBuffer {
    t.calls()
        .iter()
        .rev()
        .find_map(|c| match c {
            TransportCall::DisplayFull(buf) => Some(buf),
            _ => None,
        })
        .unwrap()
}

fn unpack_black(buf: &PanelBuffer) -> Plane {
    Plane::from_packed(buf.width, buf.height, buf.black.clone()).unwrap()
}

#[test]
fn start_enters_mode_matching_strategy() {
    let s = size(16, 4);
    for strategy in Strategy::ALL {
        let mut sched = RefreshScheduler::new(s, strategy, SchedulerPolicy::default()).unwrap();
        let mut t = InMemoryTransport::new();
        sched.start(&mut t).unwrap();

        if strategy.uses_partial_mode() {
            assert_eq!(sched.mode(), DisplayMode::Partial);
            assert_eq!(
                t.calls(),
                &[
                    TransportCall::Init,
                    TransportCall::Clear,
                    TransportCall::InitPartialMode
                ]
            );
        } else {
            assert_eq!(sched.mode(), DisplayMode::Full);
            assert_eq!(t.calls(), &[TransportCall::Init, TransportCall::Clear]);
        }
    }
}

#[test]
fn start_failure_is_fatal() {
    let mut sched =
        RefreshScheduler::new(size(8, 8), Strategy::CanvasFull, SchedulerPolicy::default())
            .unwrap();
    let mut t = InMemoryTransport::new().failing_init();
    let err = sched.start(&mut t).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(sched.mode(), DisplayMode::Uninitialized);
}

#[test]
fn new_rejects_bad_configuration() {
    assert!(RefreshScheduler::new(
        PanelSize {
            width: 12,
            height: 4
        },
        Strategy::CanvasFull,
        SchedulerPolicy::default()
    )
    .is_err());
    let policy = SchedulerPolicy {
        layer_threshold: 0,
        ..SchedulerPolicy::default()
    };
    assert!(RefreshScheduler::new(size(8, 8), Strategy::CanvasFull, policy).is_err());
}

#[test]
fn full_ghost_repaints_raw_frames() {
    let s = size(8, 4);
    let (mut sched, mut t) = started(s, Strategy::FullGhost, SchedulerPolicy::default());

    sched
        .process_frame(&frame_with(s, &[(1, 1, PixelClass::Black)]), &mut t)
        .unwrap();
    let report = sched
        .process_frame(&frame_with(s, &[(2, 2, PixelClass::Black)]), &mut t)
        .unwrap();

    assert_eq!(report.decision, Some(DecisionKind::FullRepaint));
    assert_eq!(report.maintenance, None);
    let black = unpack_black(last_full(&t));
    assert!(!black.get(1, 1));
    assert!(black.get(2, 2));
    assert!(sched.canvas().is_blank());
}

#[test]
fn direct_buffer_clears_every_interval() {
    let s = size(8, 4);
    let policy = SchedulerPolicy {
        maintenance_interval: 3,
        ..SchedulerPolicy::default()
    };
    let (mut sched, mut t) = started(s, Strategy::DirectBuffer, policy);
    let f = frame_with(s, &[(0, 0, PixelClass::Red)]);

    let mut maint = Vec::new();
    for _ in 0..6 {
        maint.push(sched.process_frame(&f, &mut t).unwrap().maintenance);
    }

    assert_eq!(
        maint,
        vec![
            None,
            None,
            Some(Maintenance::MaintenanceClear),
            None,
            None,
            Some(Maintenance::MaintenanceClear)
        ]
    );
    assert_eq!(sched.frames_since_maintenance(), 0);
    assert_eq!(t.write_count(), 6);
    let clears = t
        .calls()
        .iter()
        .filter(|c| **c == TransportCall::Clear)
        .count();
    assert_eq!(clears, 2);
}

#[test]
fn canvas_full_repaints_accumulated_canvas() {
    let s = size(8, 4);
    let (mut sched, mut t) = started(s, Strategy::CanvasFull, SchedulerPolicy::default());

    sched
        .process_frame(&frame_with(s, &[(1, 1, PixelClass::Black)]), &mut t)
        .unwrap();
    let report = sched
        .process_frame(&frame_with(s, &[(2, 2, PixelClass::Red)]), &mut t)
        .unwrap();

    assert_eq!(report.layer_count, 2);
    let buf = last_full(&t);
    assert!(unpack_black(buf).get(1, 1));
    let red = Plane::from_packed(buf.width, buf.height, buf.red.clone()).unwrap();
    assert!(red.get(2, 2));
}

#[test]
fn threshold_resets_on_the_overlay_that_reaches_it() {
    let s = size(8, 4);
    let policy = SchedulerPolicy {
        layer_threshold: 3,
        ..SchedulerPolicy::default()
    };
    let (mut sched, mut t) = started(s, Strategy::CanvasFull, policy);
    let f = frame_with(s, &[(4, 1, PixelClass::Black)]);

    for expected in 1..=2 {
        let r = sched.process_frame(&f, &mut t).unwrap();
        assert_eq!(r.layer_count, expected);
        assert_eq!(r.maintenance, None);
    }

    let r = sched.process_frame(&f, &mut t).unwrap();
    assert_eq!(r.maintenance, Some(Maintenance::CanvasReset));
    assert_eq!(r.layer_count, 0);
    assert!(sched.canvas().is_blank());
    assert_eq!(t.calls().last(), Some(&TransportCall::Clear));
}

#[test]
fn partial_strategies_skip_empty_frames() {
    let s = size(16, 8);
    for strategy in [Strategy::CanvasPartialRegion, Strategy::CanvasPartialCircle] {
        let (mut sched, mut t) = started(s, strategy, SchedulerPolicy::default());
        let r = sched
            .process_frame(&ClassifiedFrame::blank(s), &mut t)
            .unwrap();

        assert!(r.skipped());
        assert_eq!(r.layer_count, 0);
        assert!(t.calls().is_empty());
    }
}

#[test]
fn canvas_full_overlays_blank_frames() {
    let s = size(8, 4);
    let (mut sched, mut t) = started(s, Strategy::CanvasFull, SchedulerPolicy::default());
    let r = sched
        .process_frame(&ClassifiedFrame::blank(s), &mut t)
        .unwrap();
    assert_eq!(r.decision, Some(DecisionKind::FullRepaint));
    assert_eq!(r.layer_count, 1);
}

#[test]
fn partial_region_sends_aligned_canvas_slice() {
    let s = size(32, 16);
    let policy = SchedulerPolicy {
        region_margin: 0,
        ..SchedulerPolicy::default()
    };
    let (mut sched, mut t) = started(s, Strategy::CanvasPartialRegion, policy);

    let r = sched
        .process_frame(&frame_with(s, &[(3, 3, PixelClass::Black)]), &mut t)
        .unwrap();
    assert_eq!(r.decision, Some(DecisionKind::PartialRegion));

    let TransportCall::DisplayPartial { region, slice } = &t.calls()[0] else {
        panic!("expected partial write, got {:?}", t.calls());
    };
    assert_eq!(
        *region,
        Region {
            x0: 0,
            y0: 3,
            x1: 8,
            y1: 4
        }
    );
    assert_eq!((slice.width(), slice.height()), (8, 1));
    assert!(slice.get(3, 0));
    assert_eq!(slice.ink_count(), 1);
}

#[test]
fn partial_region_slice_includes_earlier_layers() {
    let s = size(32, 16);
    let policy = SchedulerPolicy {
        region_margin: 0,
        ..SchedulerPolicy::default()
    };
    let (mut sched, mut t) = started(s, Strategy::CanvasPartialRegion, policy);

    sched
        .process_frame(&frame_with(s, &[(1, 5, PixelClass::Black)]), &mut t)
        .unwrap();
    sched
        .process_frame(&frame_with(s, &[(6, 5, PixelClass::Black)]), &mut t)
        .unwrap();

    let TransportCall::DisplayPartial { slice, .. } = t.calls().last().unwrap() else {
        panic!("expected partial write");
    };
    assert!(slice.get(1, 0));
    assert!(slice.get(6, 0));
}

#[test]
fn partial_circle_keeps_previous_state_outside_circle() {
    let s = size(48, 16);
    let policy = SchedulerPolicy {
        circle_margin: 0,
        ..SchedulerPolicy::default()
    };
    let (mut sched, mut t) = started(s, Strategy::CanvasPartialCircle, policy);

    // Horizontal line: mean distance rounds to 10, so the circle is r=15 around (20, 8).
    let line: Vec<_> = (0..=40).map(|x| (x, 8, PixelClass::Black)).collect();
    let decision = sched.decide(&frame_with(s, &line)).unwrap().unwrap();

    let RefreshDecision::PartialCircle {
        circle,
        region,
        black,
    } = &decision
    else {
        panic!("expected circle decision, got {decision:?}");
    };
    assert_eq!(
        *circle,
        CircleFootprint {
            center_x: 20,
            center_y: 8,
            radius: 15
        }
    );
    assert_eq!(
        *region,
        Region {
            x0: 0,
            y0: 0,
            x1: 40,
            y1: 16
        }
    );
    assert!(black.get(20, 8));
    assert!(black.get(35, 8));
    assert!(!black.get(36, 8));
    assert!(!black.get(2, 8));
    // The canvas itself holds the whole line.
    assert!(sched.canvas().black().get(2, 8));

    sched.dispatch(&decision, &mut t).unwrap();
    assert_eq!(t.write_count(), 1);
}

#[test]
fn failed_write_keeps_overlay_and_still_resets() {
    let s = size(8, 4);
    let policy = SchedulerPolicy {
        layer_threshold: 2,
        ..SchedulerPolicy::default()
    };
    let (mut sched, mut t) = started(s, Strategy::CanvasFull, policy);
    let f = frame_with(s, &[(1, 1, PixelClass::Black)]);

    t.fail_next_writes(1);
    let r = sched.process_frame(&f, &mut t).unwrap();
    let err = r.dispatch_error.as_ref().unwrap();
    assert!(matches!(err, GhostError::Transport(_)));
    assert!(!r.shown());
    assert_eq!(r.maintenance, None);
    assert_eq!(sched.canvas().layer_count(), 1);
    assert!(sched.canvas().black().get(1, 1));

    t.fail_next_writes(1);
    let r = sched.process_frame(&f, &mut t).unwrap();
    assert!(r.dispatch_error.is_some());
    assert_eq!(r.maintenance, Some(Maintenance::CanvasReset));
    assert!(r.maintenance_error.is_none());
    assert_eq!(r.layer_count, 0);
    assert_eq!(t.calls().last(), Some(&TransportCall::Clear));
}

#[test]
fn failed_maintenance_clear_still_reports_the_write() {
    let s = size(8, 4);
    let policy = SchedulerPolicy {
        layer_threshold: 1,
        ..SchedulerPolicy::default()
    };
    let (mut sched, mut t) = started(s, Strategy::CanvasFull, policy);

    t.fail_next_clears(1);
    let r = sched
        .process_frame(&frame_with(s, &[(2, 2, PixelClass::Red)]), &mut t)
        .unwrap();

    assert!(r.shown());
    assert_eq!(r.maintenance, Some(Maintenance::CanvasReset));
    assert!(matches!(r.maintenance_error, Some(GhostError::Transport(_))));
    assert_eq!(r.errors().count(), 1);
    assert!(sched.canvas().is_blank());
    assert_eq!(sched.mode(), DisplayMode::Uninitialized);
}

#[test]
fn fatal_reinit_failure_is_returned() {
    let s = size(8, 4);
    let (mut sched, mut t) = started(s, Strategy::CanvasPartialRegion, SchedulerPolicy::default());
    sched.shutdown(&mut t);

    let mut t = InMemoryTransport::new().failing_init();
    let err = sched
        .process_frame(&frame_with(s, &[(0, 0, PixelClass::Black)]), &mut t)
        .unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn partial_reset_returns_to_partial_mode() {
    let s = size(16, 8);
    let policy = SchedulerPolicy {
        layer_threshold: 1,
        region_margin: 0,
        ..SchedulerPolicy::default()
    };
    let (mut sched, mut t) = started(s, Strategy::CanvasPartialRegion, policy);

    let r = sched
        .process_frame(&frame_with(s, &[(9, 2, PixelClass::Black)]), &mut t)
        .unwrap();
    assert_eq!(r.maintenance, Some(Maintenance::CanvasReset));
    assert_eq!(sched.mode(), DisplayMode::Partial);
    assert!(matches!(t.calls()[0], TransportCall::DisplayPartial { .. }));
    assert_eq!(
        &t.calls()[1..],
        &[
            TransportCall::Init,
            TransportCall::Clear,
            TransportCall::InitPartialMode
        ]
    );
}

#[test]
fn dispatch_reinitialises_after_shutdown() {
    let s = size(8, 4);
    let (mut sched, mut t) = started(s, Strategy::CanvasPartialRegion, SchedulerPolicy::default());
    sched.shutdown(&mut t);
    assert_eq!(sched.mode(), DisplayMode::Uninitialized);
    t.clear_calls();

    sched
        .process_frame(&frame_with(s, &[(0, 0, PixelClass::Black)]), &mut t)
        .unwrap();
    assert_eq!(t.calls()[0], TransportCall::Init);
    assert_eq!(t.calls()[1], TransportCall::InitPartialMode);
    assert!(t.calls()[2].is_write());
}

#[test]
fn shutdown_swallows_sleep_failure() {
    let mut sched =
        RefreshScheduler::new(size(8, 4), Strategy::FullGhost, SchedulerPolicy::default())
            .unwrap();
    let mut t = InMemoryTransport::new().failing_sleep();
    sched.start(&mut t).unwrap();
    sched.shutdown(&mut t);
    assert_eq!(sched.mode(), DisplayMode::Uninitialized);
}

#[test]
fn mismatched_frame_is_rejected_before_dispatch() {
    let (mut sched, mut t) = started(
        size(8, 4),
        Strategy::CanvasFull,
        SchedulerPolicy::default(),
    );
    let err = sched
        .process_frame(&ClassifiedFrame::blank(size(16, 4)), &mut t)
        .unwrap_err();
    assert!(matches!(err, GhostError::Validation(_)));
    assert!(t.calls().is_empty());
    assert_eq!(sched.canvas().layer_count(), 0);
}
