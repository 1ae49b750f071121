//! Repro variant B: every frame, half of a committed default-heap buffer
//! is copied into a buffer placed inside an explicitly created read-back
//! heap, with the source half alternating by frame parity. The copy is
//! deliberately recorded without any barrier on the source buffer; see
//! `readback.rs`.

#[cfg_attr(not(windows), allow(dead_code))]
mod parity;
#[cfg(windows)]
mod readback;

repro_harness::agility_sdk_exports!(618);

#[cfg(windows)]
fn main() -> eyre::Result<()> {
    use repro_harness::config::HarnessConfig;
    use repro_harness::harness::Harness;

    color_eyre::install()?;
    tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_target(false)
        .init();

    let config = HarnessConfig::new("Placed Read-back Repro").apply_args(std::env::args());
    let mut harness = Harness::new(config)?;
    let mut body = readback::ReadbackCopy::new(harness.device())?;
    harness.run(&mut body)
}

#[cfg(not(windows))]
fn main() {
    eprintln!("placed-readback-repro exercises Direct3D 12 and only runs on Windows");
}
