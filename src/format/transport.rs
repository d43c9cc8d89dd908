//! Reversible transport wrapping of asset bytes.

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::LoadError;

/// How asset bytes are wrapped on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Bytes are the asset itself.
    #[default]
    Raw,
    /// Standard-alphabet base64 with padding.
    Base64,
}

impl Transport {
    /// Upper bound of the unwrapped size of `len` transport bytes.
    pub fn decoded_len_estimate(self, len: usize) -> usize {
        match self {
            Transport::Raw => len,
            Transport::Base64 => base64::decoded_len_estimate(len),
        }
    }

    /// Exact unwrapped size of well-formed `data`, computed without decoding.
    pub fn decoded_len(self, data: &[u8]) -> usize {
        match self {
            Transport::Raw => data.len(),
            Transport::Base64 => {
                let trimmed = data.trim_ascii();
                let padding = trimmed.iter().rev().take(2).filter(|&&b| b == b'=').count();
                base64::decoded_len_estimate(trimmed.len()).saturating_sub(padding)
            }
        }
    }

    /// Remove the transport wrapping.
    pub fn decode(self, data: &[u8]) -> Result<Cow<'_, [u8]>, LoadError> {
        match self {
            Transport::Raw => Ok(Cow::Borrowed(data)),
            Transport::Base64 => {
                // Surrounding whitespace, e.g. a trailing newline, is ignored.
                let trimmed = data.trim_ascii();
                Ok(Cow::Owned(STANDARD.decode(trimmed)?))
            }
        }
    }

    /// Apply the transport wrapping.
    pub fn encode(self, data: &[u8]) -> Vec<u8> {
        match self {
            Transport::Raw => data.to_vec(),
            Transport::Base64 => STANDARD.encode(data).into_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_wrap_unwrap() {
        let asset = [2u8, 2, 2, 2, 2, 255, 0, 0];
        let wrapped = Transport::Base64.encode(&asset);
        assert_eq!(wrapped, b"AgICAgL/AAA=");
        let unwrapped = Transport::Base64.decode(&wrapped).unwrap();
        assert_eq!(&*unwrapped, &asset);
    }

    #[test]
    fn test_base64_trailing_newline() {
        let unwrapped = Transport::Base64.decode(b"AgICAgL/AAA=\n").unwrap();
        assert_eq!(unwrapped.len(), 8);
    }

    #[test]
    fn test_base64_invalid() {
        assert!(matches!(
            Transport::Base64.decode(b"not base64!"),
            Err(LoadError::Transport(_))
        ));
    }

    #[test]
    fn test_raw_is_borrowed() {
        let data = [1u8, 2, 3];
        assert!(matches!(Transport::Raw.decode(&data), Ok(Cow::Borrowed(_))));
    }

    #[test]
    fn test_decoded_len_is_exact() {
        for len in 0..10 {
            let wrapped = Transport::Base64.encode(&vec![7u8; len]);
            assert_eq!(Transport::Base64.decoded_len(&wrapped), len);
        }
        assert_eq!(Transport::Raw.decoded_len(&[0; 3]), 3);
    }

    #[test]
    fn test_estimate_bounds_decoded_len() {
        let wrapped = Transport::Base64.encode(&[0u8; 100]);
        assert!(Transport::Base64.decoded_len_estimate(wrapped.len()) >= 100);
    }
}
