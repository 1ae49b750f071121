//! Builders for enhanced-barrier texture transitions. The repros express
//! all intra-frame ordering with these; nothing relies on legacy resource
//! states or automatic hazard tracking.

use windows::Win32::Graphics::Direct3D12::*;

/// One endpoint of a texture transition: the pipeline sync scope, the
/// access kind, and the image layout.
#[derive(Clone, Copy)]
pub struct TransitionPoint {
    pub sync: D3D12_BARRIER_SYNC,
    pub access: D3D12_BARRIER_ACCESS,
    pub layout: D3D12_BARRIER_LAYOUT,
}

/// No prior access; contents undefined.
pub const UNDEFINED: TransitionPoint = TransitionPoint {
    sync: D3D12_BARRIER_SYNC_NONE,
    access: D3D12_BARRIER_ACCESS_NO_ACCESS,
    layout: D3D12_BARRIER_LAYOUT_UNDEFINED,
};

pub const RENDER_TARGET: TransitionPoint = TransitionPoint {
    sync: D3D12_BARRIER_SYNC_RENDER_TARGET,
    access: D3D12_BARRIER_ACCESS_RENDER_TARGET,
    layout: D3D12_BARRIER_LAYOUT_RENDER_TARGET,
};

pub const PRESENT: TransitionPoint = TransitionPoint {
    sync: D3D12_BARRIER_SYNC_NONE,
    access: D3D12_BARRIER_ACCESS_NO_ACCESS,
    layout: D3D12_BARRIER_LAYOUT_PRESENT,
};

pub const COMPUTE_UNORDERED_ACCESS: TransitionPoint = TransitionPoint {
    sync: D3D12_BARRIER_SYNC_COMPUTE_SHADING,
    access: D3D12_BARRIER_ACCESS_UNORDERED_ACCESS,
    layout: D3D12_BARRIER_LAYOUT_UNORDERED_ACCESS,
};

/// Builds a single-subresource texture barrier. The returned value borrows
/// `resource` without adding a reference, so it must not outlive it.
pub fn texture_transition(
    resource: &ID3D12Resource,
    before: TransitionPoint,
    after: TransitionPoint,
) -> D3D12_TEXTURE_BARRIER {
    D3D12_TEXTURE_BARRIER {
        SyncBefore: before.sync,
        SyncAfter: after.sync,
        AccessBefore: before.access,
        AccessAfter: after.access,
        LayoutBefore: before.layout,
        LayoutAfter: after.layout,
        // Borrowed COM pointer; ManuallyDrop keeps it from being released.
        pResource: unsafe { std::mem::transmute_copy(resource) },
        Subresources: D3D12_BARRIER_SUBRESOURCE_RANGE {
            IndexOrFirstMipLevel: 0,
            NumMipLevels: 1,
            FirstArraySlice: 0,
            NumArraySlices: 1,
            FirstPlane: 0,
            NumPlanes: 1,
        },
        Flags: D3D12_TEXTURE_BARRIER_FLAG_NONE,
    }
}

/// Wraps one texture barrier in a group for `ID3D12GraphicsCommandList7::Barrier`.
/// The barrier must stay alive until the call returns.
pub fn texture_barrier_group(barrier: &D3D12_TEXTURE_BARRIER) -> D3D12_BARRIER_GROUP {
    D3D12_BARRIER_GROUP {
        Type: D3D12_BARRIER_TYPE_TEXTURE,
        NumBarriers: 1,
        Anonymous: D3D12_BARRIER_GROUP_0 {
            pTextureBarriers: barrier,
        },
    }
}
