/// How the frame loop paces CPU/GPU work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FramePacing {
    /// Drain the whole queue at the top of every frame with a throwaway
    /// fence. Strictly synchronous; this is the behavior the repros are
    /// built around, so it is the default.
    #[default]
    IdleWaitEachFrame,
    /// One command allocator and tracked fence value per back buffer.
    /// The production-style alternative, selectable to compare timing.
    Buffered,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackBufferFormat {
    #[default]
    Rgba8Unorm,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeatureLevel {
    Level11_0,
    #[default]
    Level12_1,
}

/// Everything the shared bootstrap needs to know; the variant binaries
/// only override the title and, via flags, the adapter and pacing.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    pub title: String,
    pub window_size: (u32, u32),
    pub min_track_size: (i32, i32),
    pub buffer_count: u32,
    pub format: BackBufferFormat,
    pub feature_level: FeatureLevel,
    pub pacing: FramePacing,
    pub clear_color: [f32; 4],
    pub use_warp_device: bool,
}

impl HarnessConfig {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_owned(),
            window_size: (1280, 720),
            min_track_size: (256, 144),
            buffer_count: 2,
            format: BackBufferFormat::default(),
            feature_level: FeatureLevel::default(),
            pacing: FramePacing::default(),
            clear_color: [1.0, 0.0, 0.0, 0.0],
            use_warp_device: false,
        }
    }

    /// Scans the command line for the two supported flags; everything else
    /// is ignored.
    pub fn apply_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        for arg in args {
            if arg.eq_ignore_ascii_case("-warp") || arg.eq_ignore_ascii_case("/warp") {
                self.use_warp_device = true;
            }
            if arg.eq_ignore_ascii_case("--buffered") {
                self.pacing = FramePacing::Buffered;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_repro_setup() {
        let config = HarnessConfig::new("repro");
        assert_eq!(config.window_size, (1280, 720));
        assert_eq!(config.min_track_size, (256, 144));
        assert_eq!(config.buffer_count, 2);
        assert_eq!(config.format, BackBufferFormat::Rgba8Unorm);
        assert_eq!(config.feature_level, FeatureLevel::Level12_1);
        assert_eq!(config.pacing, FramePacing::IdleWaitEachFrame);
        assert_eq!(config.clear_color, [1.0, 0.0, 0.0, 0.0]);
        assert!(!config.use_warp_device);
    }

    #[test]
    fn warp_and_buffered_flags_are_recognized() {
        let args = ["repro.exe", "-WARP", "--buffered"]
            .map(String::from)
            .into_iter();
        let config = HarnessConfig::new("repro").apply_args(args);
        assert!(config.use_warp_device);
        assert_eq!(config.pacing, FramePacing::Buffered);
    }

    #[test]
    fn unknown_args_are_ignored() {
        let args = ["repro.exe", "--frobnicate"].map(String::from).into_iter();
        let config = HarnessConfig::new("repro").apply_args(args);
        assert!(!config.use_warp_device);
        assert_eq!(config.pacing, FramePacing::IdleWaitEachFrame);
    }
}
