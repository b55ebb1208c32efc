use memtrack::{tracker, AllocSite, LeakReport, TrackedVec};

#[cfg(feature = "track-off")]
fn assert_inert() {
    let global = tracker::global();

    // Every tracker operation is a successful no-op, including ones that
    // would be errors with tracking enabled.
    global
        .register(0x1000 as *mut u8, AllocSite::new("a.c", 1))
        .unwrap();
    assert_eq!(global.tracked_count().unwrap(), 0);
    global.unregister(0x1000 as *mut u8).unwrap();
    global.unregister(0xdead as *mut u8).unwrap();
    global
        .change_register(0x1000 as *mut u8, 0x2000 as *mut u8)
        .unwrap();

    let mut visited = 0;
    global.trace(|_, _| visited += 1).unwrap();
    assert_eq!(visited, 0);

    // Containers stay fully functional without any bookkeeping.
    let mut values = TrackedVec::new();
    for n in 0..1000u32 {
        values.push(n);
    }
    assert_eq!(values.len(), 1000);
    assert!(values.capacity() >= 1000);
    assert_eq!(values.find(&999), Some(999));
    drop(values);

    let report = LeakReport::capture().unwrap();
    assert!(report.is_empty());

    println!("track-off: tracker is inert, containers fully functional");
}

fn main() {
    #[cfg(feature = "track-off")]
    assert_inert();

    #[cfg(not(feature = "track-off"))]
    {
        let _ = (tracker::global(), AllocSite::new("a.c", 1));
        let _ = LeakReport::capture();
        let _ = TrackedVec::<u32>::new();
        println!("run with --features track-off to exercise the inert tracker");
    }
}
