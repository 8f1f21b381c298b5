/// Failure reasons for one crown-write attempt. The numeric blink code is
/// the only diagnostic channel the device has, so the mapping is fixed and
/// part of the operator-facing contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrownError {
    /// A CID/CSD/SSR command returned a non-zero status or the transport
    /// failed mid-read.
    RegisterRead,
    /// The card carries a GPT; only MBR layouts are written to.
    IsGpt,
    /// The first MBR partition entry is empty.
    NoFirstPartition,
    /// Less than [`crate::RESERVED_SECTORS`] free sectors after partition 1.
    NoSpace,
    /// Card bring-up or block I/O failed, or an otherwise unclassified
    /// fault during the attempt.
    Io,
    /// CSD structure version is not 1.0; the Xros Loader only parses the
    /// v1 layout.
    UnsupportedCsdVersion,
}

impl CrownError {
    /// Number of error-LED blinks shown per cycle for this failure.
    pub fn blink_count(self) -> u8 {
        match self {
            Self::RegisterRead => 1,
            Self::IsGpt => 2,
            Self::NoFirstPartition => 3,
            Self::NoSpace => 4,
            Self::Io => 5,
            Self::UnsupportedCsdVersion => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::RegisterRead => "register_read",
            Self::IsGpt => "is_gpt",
            Self::NoFirstPartition => "no_first_partition",
            Self::NoSpace => "no_space",
            Self::Io => "io",
            Self::UnsupportedCsdVersion => "unsupported_csd_version",
        }
    }
}
