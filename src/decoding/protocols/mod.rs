pub mod votium;

use std::sync::Arc;

use crate::decoding::registry::DecoderRegistry;
use crate::models::errors::RegistryError;

/// Add new protocol decoders here as they are implemented.
pub fn register_decoders(registry: &mut DecoderRegistry) -> Result<(), RegistryError> {
    registry.register(Arc::new(votium::VotiumDecoder))?;
    Ok(())
}
