use crate::config::BackBufferFormat;
use crate::config::HarnessConfig;
use crate::device::Gpu;
use windows::core::Interface;
use windows::core::Result;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;

/// The swapchain, its back buffers, and their render-target descriptors.
pub struct PresentTargets {
    pub swapchain: IDXGISwapChain4,
    pub render_targets: Vec<ID3D12Resource>,
    rtv_heap: ID3D12DescriptorHeap,
    rtv_descriptor_size: u32,
}

impl PresentTargets {
    pub fn new(gpu: &Gpu, hwnd: HWND, config: &HarnessConfig) -> Result<Self> {
        let (width, height) = config.window_size;
        let swapchain_desc = DXGI_SWAP_CHAIN_DESC1 {
            BufferCount: config.buffer_count,
            Width: width,
            Height: height,
            Format: back_buffer_format(config.format),
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let swapchain: IDXGISwapChain1 = unsafe {
            gpu.factory
                .CreateSwapChainForHwnd(&gpu.queue, hwnd, &swapchain_desc, None, None)?
        };
        let swapchain: IDXGISwapChain4 = swapchain.cast()?;

        unsafe { gpu.factory.MakeWindowAssociation(hwnd, DXGI_MWA_NO_ALT_ENTER)? };

        let rtv_heap: ID3D12DescriptorHeap = unsafe {
            gpu.device.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
                NumDescriptors: config.buffer_count,
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
                ..Default::default()
            })?
        };
        let rtv_descriptor_size = unsafe {
            gpu.device
                .GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_RTV)
        };
        let heap_start = unsafe { rtv_heap.GetCPUDescriptorHandleForHeapStart() };

        let mut render_targets = Vec::with_capacity(config.buffer_count as usize);
        for i in 0..config.buffer_count {
            let buffer: ID3D12Resource = unsafe { swapchain.GetBuffer(i)? };
            unsafe {
                gpu.device.CreateRenderTargetView(
                    &buffer,
                    None,
                    D3D12_CPU_DESCRIPTOR_HANDLE {
                        ptr: heap_start.ptr + (i * rtv_descriptor_size) as usize,
                    },
                );
            }
            render_targets.push(buffer);
        }

        Ok(Self {
            swapchain,
            render_targets,
            rtv_heap,
            rtv_descriptor_size,
        })
    }

    pub fn rtv_handle(&self, index: u32) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        let heap_start = unsafe { self.rtv_heap.GetCPUDescriptorHandleForHeapStart() };
        D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: heap_start.ptr + (index * self.rtv_descriptor_size) as usize,
        }
    }
}

fn back_buffer_format(format: BackBufferFormat) -> DXGI_FORMAT {
    match format {
        BackBufferFormat::Rgba8Unorm => DXGI_FORMAT_R8G8B8A8_UNORM,
    }
}
