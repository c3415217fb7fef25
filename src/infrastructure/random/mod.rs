//! Operating system random source

use rand::rngs::OsRng;
use rand::RngCore;
use crate::application::errors::RandomError;
use crate::domain::traits::RandomSource;

/// Draws words from the OS CSPRNG, surfacing failures instead of panicking
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl OsRandom {
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for OsRandom {
    fn next_u32(&self) -> Result<u32, RandomError> {
        let mut buf = [0u8; 4];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| RandomError(e.to_string()))?;
        Ok(u32::from_le_bytes(buf))
    }
}
