// Draco bitstream version constants.

/// Magic prefix of every encoded buffer.
pub const DRACO_MAGIC: &[u8; 5] = b"DRACO";

/// Major version written by the encoder.
pub const DRACO_BITSTREAM_VERSION_MAJOR: u8 = 2;

/// Minor version written by the encoder.
pub const DRACO_BITSTREAM_VERSION_MINOR: u8 = 2;

/// Bytes taken by magic, version, geometry type, method and flags.
pub const DRACO_HEADER_SIZE: usize = 11;

/// Header flag marking a bitstream that carries metadata (never set here).
pub const METADATA_FLAG_MASK: u16 = 0x8000;

/// Checks if the given version is at least the target version.
#[inline]
pub fn version_at_least(major: u8, minor: u8, target: (u8, u8)) -> bool {
    major > target.0 || (major == target.0 && minor >= target.1)
}

/// Whether this decoder understands the body layout for `(major, minor)`.
#[inline]
pub fn is_version_supported(major: u8, minor: u8) -> bool {
    major == DRACO_BITSTREAM_VERSION_MAJOR && minor <= DRACO_BITSTREAM_VERSION_MINOR
}
