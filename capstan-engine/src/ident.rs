//! Service identifier policy
//!
//! Service ids are interpolated directly into host filesystem paths and into
//! the container runtime's name field. An id that can traverse directories or
//! collide with reserved names must be rejected outright, never sanitized.

use crate::error::{Result, TaskerError};

/// Characters that would let an id escape its working-directory root
const FORBIDDEN: [char; 3] = ['.', '/', '~'];

/// Validates that a service id is safe to use as a path segment
pub fn validate_id(id: &str) -> Result<()> {
    if id.contains(FORBIDDEN) {
        return Err(TaskerError::MalformedId(id.to_string()));
    }
    Ok(())
}
