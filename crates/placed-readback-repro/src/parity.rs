//! Source-offset arithmetic for the per-frame copy. Kept free of any
//! Windows types so it stays unit-testable everywhere.

/// Size of both buffers involved in the copy.
pub(crate) const BUFFER_SIZE: u64 = 256;
/// Bytes copied per frame; one half of the source buffer.
pub(crate) const COPY_LENGTH: u64 = 128;

/// Which half of the device-local buffer feeds this frame's copy: offset 0
/// on even frames, 128 on odd frames.
pub(crate) fn copy_source_offset(frame_number: u64) -> u64 {
    COPY_LENGTH * (frame_number % 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_alternates_strictly_by_frame_parity() {
        assert_eq!(copy_source_offset(0), 0);
        assert_eq!(copy_source_offset(1), 128);
        assert_eq!(copy_source_offset(2), 0);
        assert_eq!(copy_source_offset(3), 128);
        assert_eq!(copy_source_offset(u64::MAX), 128);
    }

    #[test]
    fn copied_region_stays_inside_source_buffer() {
        for frame in 0..8 {
            let offset = copy_source_offset(frame);
            assert!(offset + COPY_LENGTH <= BUFFER_SIZE);
        }
    }
}
