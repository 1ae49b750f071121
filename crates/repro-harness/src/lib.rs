//! Shared bootstrap for the D3D12 crash-repro binaries: window host,
//! device/queue setup, presentation surface, and the per-frame recording
//! loop. The variant-specific command sequence is supplied as a
//! [`recorder::FrameBody`] implementation.

pub mod config;

#[cfg(windows)]
pub mod barriers;
#[cfg(windows)]
pub mod device;
#[cfg(windows)]
pub mod harness;
#[cfg(windows)]
pub mod recorder;
#[cfg(windows)]
pub mod swapchain;
#[cfg(windows)]
pub mod sync;
#[cfg(windows)]
pub mod window;

/// Relative path to the Agility SDK runtime components, NUL-terminated for
/// the loader. Exported from each binary via [`agility_sdk_exports!`].
pub const AGILITY_SDK_PATH: &[u8; 9] = b".\\D3D12\\\0";

/// Expands to the two symbols the D3D12 loader reads at process load time
/// to locate the Agility SDK runtime. Invoke once at the root of each
/// repro binary.
#[macro_export]
macro_rules! agility_sdk_exports {
    ($version:expr) => {
        #[allow(non_upper_case_globals)]
        #[no_mangle]
        pub static D3D12SDKVersion: u32 = $version;
        #[allow(non_upper_case_globals)]
        #[no_mangle]
        pub static D3D12SDKPath: &[u8; 9] = $crate::AGILITY_SDK_PATH;
    };
}

#[cfg(test)]
mod tests {
    use super::AGILITY_SDK_PATH;

    #[test]
    fn agility_sdk_path_is_nul_terminated() {
        assert_eq!(AGILITY_SDK_PATH.last(), Some(&0));
        assert_eq!(&AGILITY_SDK_PATH[..8], b".\\D3D12\\");
    }
}
