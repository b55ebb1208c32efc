use memtrack::{LeakReport, TrackError, TrackedVec};

fn build_config() -> TrackedVec<u64> {
    let mut config = TrackedVec::new();
    for n in 0..100 {
        config.push(n);
    }
    config
}

fn main() -> Result<(), TrackError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let kept = build_config();

    // This buffer is forgotten on purpose: it must show up in the report,
    // attributed to the line below even after the pushes reallocated it.
    let mut leaked = TrackedVec::new();
    for n in 0..50i32 {
        leaked.push(n);
    }
    let leaked_addr = leaked.as_ptr() as usize;
    std::mem::forget(leaked);

    drop(kept);

    let report = LeakReport::capture()?;
    assert_eq!(report.len(), 1);
    assert_eq!(report.entries()[0].address, leaked_addr);
    report.emit();
    print!("{report}");

    Ok(())
}
