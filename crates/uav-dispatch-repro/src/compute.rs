use eyre::eyre;
use eyre::Result;
use eyre::WrapErr;
use repro_harness::barriers;
use repro_harness::recorder::FrameBody;
use repro_harness::recorder::FrameContext;
use tracing::error;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

/// Precompiled compute-shader bytecode, read as-is with no validation; a
/// missing or malformed blob fails pipeline creation and aborts startup.
const SHADER_PATH: &str = "shader.bin";

const TARGET_EXTENT: u32 = 256;
const DISPATCH_GROUPS: (u32, u32, u32) = (8, 8, 1);
const ROOT_CONSTANTS: [u32; 4] = [0, 1, 2, 3];

/// The compute pass under investigation: a 256x256 RGBA32-uint UAV target
/// in a shader-visible heap, written by an 8x8x1 dispatch each frame.
pub struct ComputePass {
    descriptor_heap: ID3D12DescriptorHeap,
    target: ID3D12Resource,
    root_signature: ID3D12RootSignature,
    pipeline: ID3D12PipelineState,
}

impl ComputePass {
    pub fn new(device: &ID3D12Device10) -> Result<Self> {
        let descriptor_heap: ID3D12DescriptorHeap = unsafe {
            device.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
                NumDescriptors: D3D12_MAX_SHADER_VISIBLE_DESCRIPTOR_HEAP_SIZE_TIER_2,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE,
                ..Default::default()
            })?
        };

        let target = create_target(device)?;
        let uav_desc = D3D12_UNORDERED_ACCESS_VIEW_DESC {
            Format: DXGI_FORMAT_R32G32B32A32_UINT,
            ViewDimension: D3D12_UAV_DIMENSION_TEXTURE2D,
            Anonymous: D3D12_UNORDERED_ACCESS_VIEW_DESC_0 {
                Texture2D: D3D12_TEX2D_UAV {
                    MipSlice: 0,
                    PlaneSlice: 0,
                },
            },
        };
        unsafe {
            device.CreateUnorderedAccessView(
                &target,
                None::<&ID3D12Resource>,
                Some(&uav_desc),
                descriptor_heap.GetCPUDescriptorHandleForHeapStart(),
            )
        };

        let root_signature = create_root_signature(device)?;
        let pipeline = create_pipeline(device, &root_signature)?;

        Ok(Self {
            descriptor_heap,
            target,
            root_signature,
            pipeline,
        })
    }
}

impl FrameBody for ComputePass {
    fn record(&mut self, ctx: &FrameContext<'_>) -> Result<()> {
        let list = ctx.list;
        unsafe { list.SetDescriptorHeaps(&[Some(self.descriptor_heap.clone())]) };

        let to_unordered_access = barriers::texture_transition(
            &self.target,
            barriers::UNDEFINED,
            barriers::COMPUTE_UNORDERED_ACCESS,
        );
        unsafe { list.Barrier(&[barriers::texture_barrier_group(&to_unordered_access)]) };

        unsafe {
            // The graphics binding is never dispatched against; setting it
            // anyway is part of the sequence being reproduced.
            list.SetComputeRootSignature(&self.root_signature);
            list.SetGraphicsRootSignature(&self.root_signature);
            list.SetPipelineState(&self.pipeline);
            list.SetComputeRoot32BitConstants(
                0,
                ROOT_CONSTANTS.len() as u32,
                ROOT_CONSTANTS.as_ptr().cast(),
                0,
            );
            list.Dispatch(DISPATCH_GROUPS.0, DISPATCH_GROUPS.1, DISPATCH_GROUPS.2);
        }
        Ok(())
    }
}

fn create_target(device: &ID3D12Device10) -> Result<ID3D12Resource> {
    let desc = D3D12_RESOURCE_DESC1 {
        Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
        Alignment: 0,
        Width: TARGET_EXTENT as u64,
        Height: TARGET_EXTENT,
        DepthOrArraySize: 1,
        MipLevels: 1,
        Format: DXGI_FORMAT_R32G32B32A32_UINT,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Layout: D3D12_TEXTURE_LAYOUT_UNKNOWN,
        Flags: D3D12_RESOURCE_FLAG_ALLOW_UNORDERED_ACCESS,
        SamplerFeedbackMipRegion: D3D12_MIP_REGION::default(),
    };
    let heap_props = D3D12_HEAP_PROPERTIES {
        Type: D3D12_HEAP_TYPE_DEFAULT,
        ..Default::default()
    };
    let mut target: Option<ID3D12Resource> = None;
    unsafe {
        device.CreateCommittedResource3(
            &heap_props,
            D3D12_HEAP_FLAG_NONE,
            &desc,
            D3D12_BARRIER_LAYOUT_UNDEFINED,
            None,
            None,
            None,
            &mut target,
        )?
    };
    target.ok_or_else(|| eyre!("CreateCommittedResource3 returned no resource"))
}

fn create_root_signature(device: &ID3D12Device10) -> Result<ID3D12RootSignature> {
    let parameter = D3D12_ROOT_PARAMETER1 {
        ParameterType: D3D12_ROOT_PARAMETER_TYPE_32BIT_CONSTANTS,
        Anonymous: D3D12_ROOT_PARAMETER1_0 {
            Constants: D3D12_ROOT_CONSTANTS {
                ShaderRegister: 0,
                RegisterSpace: 0,
                Num32BitValues: ROOT_CONSTANTS.len() as u32,
            },
        },
        ShaderVisibility: D3D12_SHADER_VISIBILITY_ALL,
    };
    let desc = D3D12_VERSIONED_ROOT_SIGNATURE_DESC {
        Version: D3D_ROOT_SIGNATURE_VERSION_1_1,
        Anonymous: D3D12_VERSIONED_ROOT_SIGNATURE_DESC_0 {
            Desc_1_1: D3D12_ROOT_SIGNATURE_DESC1 {
                NumParameters: 1,
                pParameters: &parameter,
                NumStaticSamplers: 0,
                pStaticSamplers: std::ptr::null(),
                Flags: D3D12_ROOT_SIGNATURE_FLAG_CBV_SRV_UAV_HEAP_DIRECTLY_INDEXED
                    | D3D12_ROOT_SIGNATURE_FLAG_SAMPLER_HEAP_DIRECTLY_INDEXED,
            },
        },
    };

    let mut signature_blob = None;
    let mut error_blob = None;
    let serialized = unsafe {
        D3D12SerializeVersionedRootSignature(&desc, &mut signature_blob, Some(&mut error_blob))
    };
    if let Err(e) = serialized {
        if let Some(error) = error_blob {
            let message = unsafe {
                String::from_utf8_lossy(std::slice::from_raw_parts(
                    error.GetBufferPointer() as *const u8,
                    error.GetBufferSize(),
                ))
                .into_owned()
            };
            error!("Root signature serialization failed: {message}");
        }
        return Err(e.into());
    }
    let signature_blob =
        signature_blob.ok_or_else(|| eyre!("root signature serialization returned no blob"))?;

    let root_signature = unsafe {
        device.CreateRootSignature(
            0,
            std::slice::from_raw_parts(
                signature_blob.GetBufferPointer() as *const u8,
                signature_blob.GetBufferSize(),
            ),
        )?
    };
    Ok(root_signature)
}

fn create_pipeline(
    device: &ID3D12Device10,
    root_signature: &ID3D12RootSignature,
) -> Result<ID3D12PipelineState> {
    let shader = std::fs::read(SHADER_PATH)
        .wrap_err_with(|| format!("reading compute shader bytecode from {SHADER_PATH}"))?;

    let desc = D3D12_COMPUTE_PIPELINE_STATE_DESC {
        pRootSignature: unsafe { std::mem::transmute_copy(root_signature) },
        CS: D3D12_SHADER_BYTECODE {
            pShaderBytecode: shader.as_ptr().cast(),
            BytecodeLength: shader.len(),
        },
        NodeMask: 0,
        CachedPSO: D3D12_CACHED_PIPELINE_STATE::default(),
        Flags: D3D12_PIPELINE_STATE_FLAG_NONE,
    };
    let pipeline = unsafe { device.CreateComputePipelineState(&desc)? };
    Ok(pipeline)
}
