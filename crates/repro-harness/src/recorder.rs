use eyre::Result;
use windows::Win32::Graphics::Direct3D12::ID3D12GraphicsCommandList7;

/// Handed to the frame body each iteration, after the command list has
/// been reset and before the back-buffer clear is recorded.
pub struct FrameContext<'a> {
    pub list: &'a ID3D12GraphicsCommandList7,
    /// Monotonically increasing, starting at 0 for the first frame.
    pub frame_number: u64,
}

/// The variant-specific part of each frame: the command sequence under
/// investigation. Everything around it (back-buffer transitions, clear,
/// submit, present) is recorded by the harness.
pub trait FrameBody {
    fn record(&mut self, ctx: &FrameContext<'_>) -> Result<()>;
}
