use rand::{rngs::OsRng, Rng};

use crate::{constants::OTP_CHARSET, utils::AppError};

/// Generate an otp code of the given length. Every character is drawn
/// independently and uniformly from the 62 symbol alphabet using the
/// operating system randomness source, so codes are suitable as secrets.
/// The config invariant guarantees a positive length upstream, a zero
/// length is still rejected here.
pub fn generate_code(length: u32) -> Result<String, AppError> {
    if length == 0 {
        return Err(AppError::BadRequestErr(
            "Otp code length must be positive".into(),
        ));
    }
    let charset = OTP_CHARSET.as_bytes();
    let mut rng = OsRng;
    let code = (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..charset.len());
            charset[idx] as char
        })
        .collect();
    Ok(code)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_code_zero_len() {
        assert!(generate_code(0).is_err());
    }

    #[test]
    fn test_generate_code_len_and_charset() {
        for len in [1u32, 4, 6, 8, 32] {
            let code = generate_code(len).unwrap();
            assert_eq!(code.len(), len as usize);
            assert!(code.chars().all(|ch| OTP_CHARSET.contains(ch)));
        }
    }

    #[test]
    fn test_generate_code_no_duplicates() {
        // 10_000 codes of length 8 over a 62 symbol alphabet should never
        // collide in practice
        let codes = (0..10_000)
            .map(|_| generate_code(8).unwrap())
            .collect::<HashSet<_>>();
        assert_eq!(codes.len(), 10_000);
    }
}
