//! Repro variant A: a compute dispatch writes into an off-screen UAV
//! texture every frame while the back buffer clears to red. The sequence
//! under investigation is the committed-texture creation with an
//! undefined initial layout plus the per-frame UNDEFINED →
//! UNORDERED_ACCESS transition in `compute.rs`.

#[cfg(windows)]
mod compute;

repro_harness::agility_sdk_exports!(610);

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

    let config = HarnessConfig::new("UAV Dispatch Repro").apply_args(std::env::args());
    let mut harness = Harness::new(config)?;
    let mut body = compute::ComputePass::new(harness.device())?;
    harness.run(&mut body)
}

#[cfg(not(windows))]
fn main() {
    eprintln!("uav-dispatch-repro exercises Direct3D 12 and only runs on Windows");
}
