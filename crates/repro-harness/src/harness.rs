use crate::barriers;
use crate::config::HarnessConfig;
use crate::device::create_gpu;
use crate::device::report_device_removal;
use crate::device::Gpu;
use crate::recorder::FrameBody;
use crate::recorder::FrameContext;
use crate::swapchain::PresentTargets;
use crate::sync::FrameSync;
use crate::window;
use crate::window::Window;
use eyre::Result;
use tracing::info;
use windows::core::Interface;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::DXGI_PRESENT;

/// Owns the window, the GPU objects, and the frame loop. Built once per
/// process; everything it creates lives until process exit.
pub struct Harness {
    config: HarnessConfig,
    window: Window,
    gpu: Gpu,
    targets: PresentTargets,
    list: ID3D12GraphicsCommandList7,
    sync: FrameSync,
    frame_index: u32,
    frame_number: u64,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        let window = Window::new(&config)?;
        let gpu = create_gpu(&config)?;
        let targets = PresentTargets::new(&gpu, window.hwnd(), &config)?;
        let frame_index = unsafe { targets.swapchain.GetCurrentBackBufferIndex() };
        let sync = FrameSync::new(&gpu.device, config.pacing, config.buffer_count, frame_index)?;
        // Created closed; the loop resets it against an allocator each frame.
        let list: ID3D12GraphicsCommandList7 = unsafe {
            gpu.device.CreateCommandList1(
                0,
                D3D12_COMMAND_LIST_TYPE_DIRECT,
                D3D12_COMMAND_LIST_FLAG_NONE,
            )?
        };

        window.show();
        info!(
            "Harness ready: {}x{} client area, {} back buffers",
            window.client_size().0,
            window.client_size().1,
            config.buffer_count
        );

        Ok(Self {
            config,
            window,
            gpu,
            targets,
            list,
            sync,
            frame_index,
            frame_number: 0,
        })
    }

    pub fn device(&self) -> &ID3D12Device10 {
        &self.gpu.device
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Runs until the window is closed. On a failed native call the
    /// device-removal reason is logged before the error propagates to the
    /// caller, which is expected to terminate the process.
    pub fn run(&mut self, body: &mut dyn FrameBody) -> Result<()> {
        let outcome = self.run_loop(body);
        if outcome.is_err() {
            report_device_removal(&self.gpu.device);
            return outcome;
        }
        // Let in-flight work retire before any GPU object is dropped.
        self.sync.drain(&self.gpu.device, &self.gpu.queue)?;
        Ok(())
    }

    fn run_loop(&mut self, body: &mut dyn FrameBody) -> Result<()> {
        while window::pump_messages() {
            self.render_frame(body)?;
        }
        Ok(())
    }

    fn render_frame(&mut self, body: &mut dyn FrameBody) -> Result<()> {
        self.sync.begin_frame(&self.gpu.device, &self.gpu.queue)?;
        let allocator = self.sync.allocator(self.frame_index);
        unsafe { allocator.Reset()? };
        unsafe { self.list.Reset(allocator, None)? };

        body.record(&FrameContext {
            list: &self.list,
            frame_number: self.frame_number,
        })?;

        // One index query per frame drives the barrier, the clear, and the
        // buffer being presented.
        let back_index = unsafe { self.targets.swapchain.GetCurrentBackBufferIndex() };
        let back_buffer = &self.targets.render_targets[back_index as usize];

        let to_render_target =
            barriers::texture_transition(back_buffer, barriers::UNDEFINED, barriers::RENDER_TARGET);
        unsafe {
            self.list
                .Barrier(&[barriers::texture_barrier_group(&to_render_target)])
        };
        unsafe {
            self.list.ClearRenderTargetView(
                self.targets.rtv_handle(back_index),
                &self.config.clear_color,
                None,
            )
        };
        let to_present =
            barriers::texture_transition(back_buffer, barriers::RENDER_TARGET, barriers::PRESENT);
        unsafe {
            self.list
                .Barrier(&[barriers::texture_barrier_group(&to_present)])
        };
        unsafe { self.list.Close()? };

        let lists = [Some(self.list.cast::<ID3D12CommandList>()?)];
        unsafe { self.gpu.queue.ExecuteCommandLists(&lists) };
        // Immediate present: no vsync, no flags.
        unsafe { self.targets.swapchain.Present(0, DXGI_PRESENT::default()) }.ok()?;

        self.frame_index =
            self.sync
                .end_frame(&self.gpu.queue, &self.targets.swapchain, self.frame_index)?;
        self.frame_number += 1;
        Ok(())
    }
}
