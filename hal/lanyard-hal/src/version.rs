//! Remote firmware version descriptor

/// Errors while fetching the version descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// Name resolution or connection failed
    Connect,
    /// Request or response transfer failed
    Transfer,
    /// Server answered with a non-success status
    Status(u16),
    /// Response body does not fit the buffer
    TooLarge,
}

/// Source of the remote version descriptor
///
/// A single GET returning a JSON object with at least a `build` field.
pub trait VersionSource {
    /// Fetch the raw descriptor body into `buffer`
    ///
    /// # Returns
    /// Number of body bytes written to `buffer`.
    fn fetch(
        &mut self,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FetchError>>;
}
