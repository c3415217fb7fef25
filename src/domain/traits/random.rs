use crate::application::errors::RandomError;

/// Source of uniformly distributed 32-bit words.
///
/// Implementations used for dice must be cryptographically secure. A draw may
/// fail when the underlying entropy source is unavailable.
pub trait RandomSource: Send + Sync {
    fn next_u32(&self) -> Result<u32, RandomError>;
}
