//! 0x09: BLAKE2b compression function F (EIP-152)

use super::Precompile;
use crate::error::PrecompileError;

/// rounds(4) ‖ h(64) ‖ m(128) ‖ t(16) ‖ f(1)
const INPUT_LEN: usize = 213;

const IV: [u64; 8] = [
    0x6a09e667f3bcc908,
    0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b,
    0xa54ff53a5f1d36f1,
    0x510e527fade682d1,
    0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b,
    0x5be0cd19137e2179,
];

const SIGMA: [[usize; 16]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
];

/// BLAKE2b F with a caller-chosen round count
pub struct Blake2F;

#[inline]
fn mix(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

fn compress(h: &mut [u64; 8], m: &[u64; 16], t: [u64; 2], last: bool, rounds: u32) {
    let mut v = [0u64; 16];
    v[..8].copy_from_slice(h);
    v[8..].copy_from_slice(&IV);
    v[12] ^= t[0];
    v[13] ^= t[1];
    if last {
        v[14] = !v[14];
    }

    for i in 0..rounds as usize {
        let s = &SIGMA[i % 10];
        mix(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        mix(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        mix(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        mix(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
        mix(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        mix(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        mix(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        mix(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

fn le_words<const N: usize>(bytes: &[u8]) -> [u64; N] {
    let mut words = [0u64; N];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(chunk);
        *word = u64::from_le_bytes(buf);
    }
    words
}

fn rounds(input: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&input[..4]);
    u32::from_be_bytes(buf)
}

impl Precompile for Blake2F {
    fn name(&self) -> &'static str {
        "blake2f"
    }

    /// One gas per round. Malformed input costs nothing and fails in `run`.
    fn required_gas(&self, input: &[u8]) -> u64 {
        if input.len() != INPUT_LEN {
            return 0;
        }
        rounds(input) as u64
    }

    fn run(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        if input.len() != INPUT_LEN {
            return Err(PrecompileError::InvalidInput("blake2f input length"));
        }
        let last = match input[212] {
            0 => false,
            1 => true,
            _ => return Err(PrecompileError::InvalidInput("blake2f final block flag")),
        };

        let mut h = le_words::<8>(&input[4..68]);
        let m = le_words::<16>(&input[68..196]);
        let t = le_words::<2>(&input[196..212]);
        compress(&mut h, &m, t, last, rounds(input));

        let mut out = Vec::with_capacity(64);
        for word in h {
            out.extend_from_slice(&word.to_le_bytes());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(rounds_hex: &str, flag: &str) -> Vec<u8> {
        hex::decode(format!(
            "{rounds_hex}48c9bdf267e6096a3ba7ca8485ae67bb2bf894fe72f36e3cf1361d5f3af54fa5d182e6ad7f520e511f6c3e2b8c68059b6bbd41fbabd9831f79217e1319cde05b\
             6162630000000000000000000000000000000000000000000000000000000000\
             0000000000000000000000000000000000000000000000000000000000000000\
             0000000000000000000000000000000000000000000000000000000000000000\
             0000000000000000000000000000000000000000000000000000000000000000\
             03000000000000000000000000000000{flag}"
        ))
        .unwrap()
    }

    #[test]
    fn test_blake2f_twelve_rounds() {
        let input = vector("0000000c", "01");
        assert_eq!(input.len(), INPUT_LEN);
        assert_eq!(Blake2F.required_gas(&input), 12);
        assert_eq!(
            hex::encode(Blake2F.run(&input).unwrap()),
            "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d1\
             7d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923"
        );
    }

    #[test]
    fn test_blake2f_not_final() {
        let input = vector("0000000c", "00");
        assert_eq!(
            hex::encode(Blake2F.run(&input).unwrap()),
            "75ab69d3190a562c51aef8d88f1c2775876944407270c42c9844252c26d28752\
             98743e7f6d5ea2f2d3e8d226039cd31b4e426ac4f2d3d666a610c2116fde4735"
        );
    }

    #[test]
    fn test_blake2f_zero_rounds() {
        let input = vector("00000000", "01");
        assert_eq!(Blake2F.required_gas(&input), 0);
        assert_eq!(
            hex::encode(Blake2F.run(&input).unwrap()),
            "08c9bcf367e6096a3ba7ca8485ae67bb2bf894fe72f36e3cf1361d5f3af54fa5\
             d282e6ad7f520e511f6c3e2b8c68059b9442be0454267ce079217e1319cde05b"
        );
    }

    #[test]
    fn test_blake2f_bad_flag() {
        let input = vector("0000000c", "02");
        assert!(Blake2F.run(&input).is_err());
    }

    #[test]
    fn test_blake2f_bad_length() {
        assert_eq!(Blake2F.required_gas(&[0u8; 212]), 0);
        assert!(Blake2F.run(&[0u8; 212]).is_err());
    }
}
