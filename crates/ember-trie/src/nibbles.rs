//! Nibble paths and hex-prefix (compact) encoding

use crate::error::{TrieError, TrieResult};

/// Split bytes into nibbles, high half first
pub fn to_nibbles(key: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(key.len() * 2);
    for byte in key {
        nibbles.push(byte >> 4);
        nibbles.push(byte & 0x0f);
    }
    nibbles
}

/// Length of the shared prefix of two nibble paths
pub fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Hex-prefix encode a nibble path. The flag nibble is `2 * leaf + odd`.
pub fn encode_compact(nibbles: &[u8], leaf: bool) -> Vec<u8> {
    let odd = nibbles.len() % 2 == 1;
    let flag = (u8::from(leaf) << 1) | u8::from(odd);

    let mut out = Vec::with_capacity(nibbles.len() / 2 + 1);
    let rest = if odd {
        out.push((flag << 4) | nibbles[0]);
        &nibbles[1..]
    } else {
        out.push(flag << 4);
        nibbles
    };
    for pair in rest.chunks(2) {
        out.push((pair[0] << 4) | pair[1]);
    }
    out
}

/// Inverse of [`encode_compact`], returning the path and the leaf flag
pub fn decode_compact(compact: &[u8]) -> TrieResult<(Vec<u8>, bool)> {
    let (&first, rest) = compact
        .split_first()
        .ok_or_else(|| TrieError::InvalidNode("empty compact path".into()))?;
    let flag = first >> 4;
    if flag > 3 {
        return Err(TrieError::InvalidNode(format!("bad path flag {flag}")));
    }

    let mut nibbles = Vec::with_capacity(rest.len() * 2 + 1);
    if flag & 1 == 1 {
        nibbles.push(first & 0x0f);
    }
    nibbles.extend(to_nibbles(rest));
    Ok((nibbles, flag & 2 == 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_encoding() {
        assert_eq!(encode_compact(&[1, 2, 3, 4, 5], false), vec![0x11, 0x23, 0x45]);
        assert_eq!(encode_compact(&[0, 1, 2, 3, 4, 5], false), vec![0x00, 0x01, 0x23, 0x45]);
        assert_eq!(encode_compact(&[0, 15, 1, 12, 11, 8], true), vec![0x20, 0x0f, 0x1c, 0xb8]);
        assert_eq!(encode_compact(&[15, 1, 12, 11, 8], true), vec![0x3f, 0x1c, 0xb8]);
        assert_eq!(encode_compact(&[], true), vec![0x20]);
    }

    #[test]
    fn test_compact_decoding() {
        assert_eq!(decode_compact(&[0x3f, 0x1c, 0xb8]).unwrap(), (vec![15, 1, 12, 11, 8], true));
        assert_eq!(decode_compact(&[0x00, 0x01, 0x23]).unwrap(), (vec![0, 1, 2, 3], false));
        assert!(decode_compact(&[]).is_err());
        assert!(decode_compact(&[0x40]).is_err());
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(&[1, 2, 3], &[1, 2, 4]), 2);
        assert_eq!(common_prefix(&[1, 2], &[1, 2, 4]), 2);
        assert_eq!(common_prefix(&[], &[1]), 0);
    }
}
