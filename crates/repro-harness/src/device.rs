use crate::config::FeatureLevel;
use crate::config::HarnessConfig;
use tracing::error;
use tracing::info;
use tracing::warn;
use windows::core::Result;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::*;

/// The device-side objects every repro shares: factory, logical device,
/// and the single direct submission queue.
pub struct Gpu {
    pub factory: IDXGIFactory7,
    pub device: ID3D12Device10,
    pub queue: ID3D12CommandQueue,
}

pub fn create_gpu(config: &HarnessConfig) -> Result<Gpu> {
    // The validation layer is a diagnostic aid, never a requirement.
    unsafe {
        let mut debug: Option<ID3D12Debug6> = None;
        if let Some(debug) = D3D12GetDebugInterface(&mut debug).ok().and(debug) {
            debug.EnableDebugLayer();
            info!("D3D12 debug layer enabled");
        } else {
            warn!("D3D12 debug layer unavailable");
        }
    }

    let factory: IDXGIFactory7 = unsafe { CreateDXGIFactory2(DXGI_CREATE_FACTORY_FLAGS(0))? };

    let adapter: IDXGIAdapter4 = if config.use_warp_device {
        info!("Using WARP adapter");
        unsafe { factory.EnumWarpAdapter()? }
    } else {
        unsafe { factory.EnumAdapterByGpuPreference(0, DXGI_GPU_PREFERENCE_HIGH_PERFORMANCE)? }
    };
    let adapter_desc = unsafe { adapter.GetDesc3()? };
    info!(
        "Using adapter: {}",
        String::from_utf16_lossy(&adapter_desc.Description).trim_end_matches('\0')
    );

    let mut device: Option<ID3D12Device10> = None;
    unsafe { D3D12CreateDevice(&adapter, feature_level(config.feature_level), &mut device)? };
    let device = device.expect("D3D12CreateDevice succeeded without returning a device");

    let queue: ID3D12CommandQueue = unsafe {
        device.CreateCommandQueue(&D3D12_COMMAND_QUEUE_DESC {
            Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
            ..Default::default()
        })?
    };

    Ok(Gpu {
        factory,
        device,
        queue,
    })
}

fn feature_level(level: FeatureLevel) -> D3D_FEATURE_LEVEL {
    match level {
        FeatureLevel::Level11_0 => D3D_FEATURE_LEVEL_11_0,
        FeatureLevel::Level12_1 => D3D_FEATURE_LEVEL_12_1,
    }
}

/// Logs the device-removal reason if the device has one. Called on the
/// fatal path so a GPU-side crash leaves its code in the output.
pub fn report_device_removal(device: &ID3D12Device10) {
    if let Err(reason) = unsafe { device.GetDeviceRemovedReason() } {
        error!("Device removal HRESULT: {:#010x}", reason.code().0);
    }
}
