//! Text encodings and slice helpers shared by the components.

use crate::error::CryptoError;

/// Encodes bytes as lowercase hexadecimal.
pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Returns true if `s` consists only of lowercase hexadecimal digits.
#[cfg(test)]
pub(crate) fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Copies `src` to the front of `dest`, returning the number of bytes written.
pub(crate) fn copy_into(src: &[u8], dest: &mut [u8]) -> Result<usize, CryptoError> {
    ensure_capacity(src.len(), dest.len())?;
    dest[..src.len()].copy_from_slice(src);
    Ok(src.len())
}

pub(crate) fn ensure_capacity(needed: usize, available: usize) -> Result<(), CryptoError> {
    if available < needed {
        return Err(CryptoError::BufferTooSmall { needed, available });
    }
    Ok(())
}
