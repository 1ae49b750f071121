use crate::parity;
use eyre::eyre;
use eyre::Result;
use repro_harness::recorder::FrameBody;
use repro_harness::recorder::FrameContext;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

/// Size of the explicitly created heap backing the placed buffer.
const READBACK_HEAP_SIZE: u64 = 4096;

/// The copy pair under investigation: a committed default-heap buffer and
/// a buffer placed at offset 0 of a buffers-only read-back heap.
pub struct ReadbackCopy {
    device_local: ID3D12Resource,
    readback: ID3D12Resource,
    // Backing memory for the placed resource above; must outlive it.
    _readback_heap: ID3D12Heap1,
}

impl ReadbackCopy {
    pub fn new(device: &ID3D12Device10) -> Result<Self> {
        let buffer_desc = D3D12_RESOURCE_DESC1 {
            Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
            Alignment: 0,
            Width: parity::BUFFER_SIZE,
            Height: 1,
            DepthOrArraySize: 1,
            MipLevels: 1,
            Format: DXGI_FORMAT_UNKNOWN,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
            Flags: D3D12_RESOURCE_FLAG_NONE,
            SamplerFeedbackMipRegion: D3D12_MIP_REGION::default(),
        };

        let default_heap_props = D3D12_HEAP_PROPERTIES {
            Type: D3D12_HEAP_TYPE_DEFAULT,
            ..Default::default()
        };
        let mut device_local: Option<ID3D12Resource> = None;
        unsafe {
            device.CreateCommittedResource3(
                &default_heap_props,
                D3D12_HEAP_FLAG_NONE,
                &buffer_desc,
                D3D12_BARRIER_LAYOUT_UNDEFINED,
                None,
                None,
                None,
                &mut device_local,
            )?
        };
        let device_local =
            device_local.ok_or_else(|| eyre!("CreateCommittedResource3 returned no resource"))?;

        let heap_desc = D3D12_HEAP_DESC {
            SizeInBytes: READBACK_HEAP_SIZE,
            Properties: D3D12_HEAP_PROPERTIES {
                Type: D3D12_HEAP_TYPE_READBACK,
                ..Default::default()
            },
            Alignment: 0,
            Flags: D3D12_HEAP_FLAG_ALLOW_ONLY_BUFFERS,
        };
        let mut readback_heap: Option<ID3D12Heap1> = None;
        unsafe { device.CreateHeap1(&heap_desc, None, &mut readback_heap)? };
        let readback_heap =
            readback_heap.ok_or_else(|| eyre!("CreateHeap1 returned no heap"))?;

        let mut readback: Option<ID3D12Resource> = None;
        unsafe {
            device.CreatePlacedResource2(
                &readback_heap,
                0,
                &buffer_desc,
                D3D12_BARRIER_LAYOUT_UNDEFINED,
                None,
                None,
                &mut readback,
            )?
        };
        let readback =
            readback.ok_or_else(|| eyre!("CreatePlacedResource2 returned no resource"))?;

        Ok(Self {
            device_local,
            readback,
            _readback_heap: readback_heap,
        })
    }
}

impl FrameBody for ReadbackCopy {
    fn record(&mut self, ctx: &FrameContext<'_>) -> Result<()> {
        // Intentionally no barrier on the source buffer before this copy,
        // unlike the swapchain image's explicit transitions. The asymmetry
        // is part of the behavior under investigation; do not "fix" it.
        unsafe {
            ctx.list.CopyBufferRegion(
                &self.readback,
                0,
                &self.device_local,
                parity::copy_source_offset(ctx.frame_number),
                parity::COPY_LENGTH,
            )
        };
        Ok(())
    }
}
