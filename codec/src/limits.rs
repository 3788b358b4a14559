//! Limits for message encoding and decoding.

/// Size limits enforced by the encoder and decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecLimits {
    /// Maximum number of bytes in one encoded message, nested messages included.
    ///
    /// Encoding fails with [`CodecError::LimitsExceeded`](crate::CodecError::LimitsExceeded)
    /// past this size; decoding reads at most this many bytes from the cursor.
    pub max_message_bytes: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_message_bytes: u32::MAX as usize,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_message_bytes: 4096,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_message_bytes: usize::MAX,
        }
    }

    pub(crate) fn check(&self, actual: usize) -> crate::CodecResult<()> {
        if actual > self.max_message_bytes {
            return Err(crate::CodecError::LimitsExceeded {
                limit: self.max_message_bytes,
                actual,
            });
        }
        Ok(())
    }
}
