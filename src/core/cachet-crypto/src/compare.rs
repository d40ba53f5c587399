//! Constant-time comparison.
//!
//! Every comparison of a secret-derived value (password digests, token
//! signatures) goes through [`ct_eq`].

use subtle::ConstantTimeEq;

/// Compares two byte strings in time independent of their contents.
///
/// Slices of different length compare unequal immediately; lengths of
/// digests and signatures are public.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
