use std::sync::{Arc, Mutex};

use gaze_core::mocks::FixedLocator;
use gaze_core::{GazeDispatcher, GazeSample, ReadStatus, ReadingSession, SpanId};

#[test]
fn listener_drives_session_until_cancelled() {
    let session = ReadingSession::builder()
        .with_locator(FixedLocator::new("page-1-span-0", 4))
        .build()
        .unwrap();
    let session = Arc::new(Mutex::new(session));
    session.lock().unwrap().start(0.0);

    let dispatcher = GazeDispatcher::new();
    let sink = Arc::clone(&session);
    let handle = dispatcher.set_listener(move |s| {
        sink.lock().unwrap().push_sample(s);
    });

    for i in 0..10 {
        assert!(dispatcher.dispatch(GazeSample::new(50.0, 50.0, f64::from(i) * 30.0)));
    }
    handle.cancel();
    handle.cancel();
    // after cancellation the estimator keeps emitting but nothing reaches the session
    assert!(!dispatcher.dispatch(GazeSample::new(50.0, 50.0, 300.0)));

    let mut s = session.lock().unwrap();
    assert_eq!(s.stats().samples, 10);
    s.stop(300.0);
    assert_eq!(s.region_status(&SpanId::new("page-1-span-0")), ReadStatus::Read);
    assert_eq!(s.coverage_percent(), 25.0);
}

#[test]
fn replacing_listener_redirects_samples() {
    let dispatcher = GazeDispatcher::new();
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));

    let f = Arc::clone(&first);
    let old = dispatcher.set_listener(move |s| f.lock().unwrap().push(s));
    dispatcher.dispatch(GazeSample::new(1.0, 1.0, 0.0));

    let g = Arc::clone(&second);
    let _new = dispatcher.set_listener(move |s| g.lock().unwrap().push(s));
    old.cancel();
    dispatcher.dispatch(GazeSample::new(2.0, 2.0, 1.0));

    assert_eq!(first.lock().unwrap().len(), 1);
    assert_eq!(second.lock().unwrap().len(), 1);
}

#[test]
fn stopping_session_cancels_its_listener() {
    let session = ReadingSession::builder()
        .with_locator(FixedLocator::new("w", 1))
        .build()
        .unwrap();
    let session = Arc::new(Mutex::new(session));
    session.lock().unwrap().start(0.0);

    let dispatcher = GazeDispatcher::new();
    let sink = Arc::clone(&session);
    let handle = dispatcher.set_listener(move |s| {
        sink.lock().unwrap().push_sample(s);
    });
    session.lock().unwrap().attach_listener(handle);

    assert!(dispatcher.dispatch(GazeSample::new(5.0, 5.0, 0.0)));
    session.lock().unwrap().stop(10.0);
    assert!(!dispatcher.has_listener());
    assert!(!dispatcher.dispatch(GazeSample::new(5.0, 5.0, 20.0)));
    assert_eq!(session.lock().unwrap().stats().samples, 1);
}
