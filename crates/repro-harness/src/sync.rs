use crate::config::FramePacing;
use windows::core::Result;
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::IDXGISwapChain4;
use windows::Win32::System::Threading::CreateEventA;
use windows::Win32::System::Threading::WaitForSingleObject;
use windows::Win32::System::Threading::INFINITE;

/// Blocks until every command previously submitted to `queue` has finished
/// on the GPU. Creates a throwaway fence, signals it to 1, and waits on a
/// one-shot event with no timeout. Whole-queue granularity; fine for a
/// repro harness, unusable for real frame pacing.
pub fn wait_for_queue_idle(device: &ID3D12Device10, queue: &ID3D12CommandQueue) -> Result<()> {
    let fence: ID3D12Fence = unsafe { device.CreateFence(0, D3D12_FENCE_FLAG_NONE)? };
    unsafe { queue.Signal(&fence, 1)? };
    if unsafe { fence.GetCompletedValue() } < 1 {
        let event = unsafe { CreateEventA(None, false, false, None)? };
        unsafe {
            fence.SetEventOnCompletion(1, event)?;
            _ = WaitForSingleObject(event, INFINITE);
            CloseHandle(event)?;
        }
    }
    Ok(())
}

/// Per-frame pacing state. `IdleWait` is the repro behavior: a single
/// allocator kept safe by draining the queue before every reset.
/// `Buffered` tracks one fence value per back buffer instead.
pub enum FrameSync {
    IdleWait {
        allocator: ID3D12CommandAllocator,
    },
    Buffered {
        allocators: Vec<ID3D12CommandAllocator>,
        fence: ID3D12Fence,
        fence_values: Vec<u64>,
        fence_event: HANDLE,
    },
}

impl FrameSync {
    pub fn new(
        device: &ID3D12Device10,
        pacing: FramePacing,
        buffer_count: u32,
        initial_frame_index: u32,
    ) -> Result<Self> {
        match pacing {
            FramePacing::IdleWaitEachFrame => Ok(Self::IdleWait {
                allocator: unsafe {
                    device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)?
                },
            }),
            FramePacing::Buffered => {
                let mut allocators = Vec::with_capacity(buffer_count as usize);
                for _ in 0..buffer_count {
                    allocators
                        .push(unsafe { device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)? });
                }
                let fence: ID3D12Fence = unsafe { device.CreateFence(0, D3D12_FENCE_FLAG_NONE)? };
                let mut fence_values = vec![0u64; buffer_count as usize];
                // The first frame recorded against the initial index will
                // signal 1 when it completes.
                fence_values[initial_frame_index as usize] = 1;
                let fence_event = unsafe { CreateEventA(None, false, false, None)? };
                Ok(Self::Buffered {
                    allocators,
                    fence,
                    fence_values,
                    fence_event,
                })
            }
        }
    }

    /// The allocator to record the current frame against. In buffered mode
    /// `end_frame` has already waited for this slot's previous submission.
    pub fn allocator(&self, frame_index: u32) -> &ID3D12CommandAllocator {
        match self {
            Self::IdleWait { allocator } => allocator,
            Self::Buffered { allocators, .. } => &allocators[frame_index as usize],
        }
    }

    /// Called at the top of each frame, before the allocator reset.
    pub fn begin_frame(&self, device: &ID3D12Device10, queue: &ID3D12CommandQueue) -> Result<()> {
        match self {
            Self::IdleWait { .. } => wait_for_queue_idle(device, queue),
            Self::Buffered { .. } => Ok(()),
        }
    }

    /// Called after present. Returns the frame index to record against next.
    pub fn end_frame(
        &mut self,
        queue: &ID3D12CommandQueue,
        swapchain: &IDXGISwapChain4,
        frame_index: u32,
    ) -> Result<u32> {
        match self {
            Self::IdleWait { .. } => Ok(unsafe { swapchain.GetCurrentBackBufferIndex() }),
            Self::Buffered {
                fence,
                fence_values,
                fence_event,
                ..
            } => {
                let current_value = fence_values[frame_index as usize];
                unsafe { queue.Signal(&*fence, current_value)? };

                let next = unsafe { swapchain.GetCurrentBackBufferIndex() };
                if unsafe { fence.GetCompletedValue() } < fence_values[next as usize] {
                    unsafe {
                        fence.SetEventOnCompletion(fence_values[next as usize], *fence_event)?;
                        _ = WaitForSingleObject(*fence_event, INFINITE);
                    }
                }
                fence_values[next as usize] = current_value + 1;
                Ok(next)
            }
        }
    }

    /// Final drain before teardown so no GPU object is destroyed while a
    /// submission still references it.
    pub fn drain(&self, device: &ID3D12Device10, queue: &ID3D12CommandQueue) -> Result<()> {
        match self {
            Self::IdleWait { .. } => wait_for_queue_idle(device, queue),
            Self::Buffered {
                fence,
                fence_values,
                fence_event,
                ..
            } => {
                let idle_value = fence_values.iter().copied().max().unwrap_or(0);
                unsafe { queue.Signal(fence, idle_value)? };
                if unsafe { fence.GetCompletedValue() } < idle_value {
                    unsafe {
                        fence.SetEventOnCompletion(idle_value, *fence_event)?;
                        _ = WaitForSingleObject(*fence_event, INFINITE);
                    }
                }
                Ok(())
            }
        }
    }
}

impl Drop for FrameSync {
    fn drop(&mut self) {
        if let Self::Buffered { fence_event, .. } = self {
            unsafe { _ = CloseHandle(*fence_event) };
        }
    }
}
