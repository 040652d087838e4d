//! Byte accounting for one streaming transfer.

/// Counters for one extraction call.
///
/// `total_bytes` is fixed when the call starts; `bytes_forwarded` only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferState {
    total_bytes: u64,
    bytes_forwarded: u64,
}

impl TransferState {
    /// Starts accounting for a source of `total_bytes` bytes.
    #[must_use]
    pub const fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            bytes_forwarded: 0,
        }
    }

    /// Records `bytes` more bytes read from the source.
    pub fn advance(&mut self, bytes: usize) {
        self.bytes_forwarded = self.bytes_forwarded.saturating_add(bytes as u64);
    }

    /// Size of the source when the call started.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Bytes read from the source and handed to the pipe so far.
    #[must_use]
    pub const fn bytes_forwarded(&self) -> u64 {
        self.bytes_forwarded
    }

    /// `bytes_forwarded / total_bytes`.
    ///
    /// Exceeds 1.0 only if the source grew during the transfer. A zero
    /// `total_bytes` never reaches the streaming loop; it reports 1.0.
    ///
    /// # Examples
    ///
    /// ```
    /// use tarpipe_core::TransferState;
    ///
    /// let mut state = TransferState::new(2048);
    /// state.advance(1024);
    /// assert!((state.fraction() - 0.5).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 1.0;
        }
        self.bytes_forwarded as f64 / self.total_bytes as f64
    }

    /// Returns `true` once every byte counted at start has been forwarded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.bytes_forwarded >= self.total_bytes
    }
}
