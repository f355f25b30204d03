//! Bit-level encoding shared by the document channel: MSB-first byte
//! expansion, repetition coding, and majority-vote decoding.

/// Expands each byte of `data` into 8 MSB-first bits.
pub fn bytes_to_bits(data: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(data.len() * 8);
    for &byte in data {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1);
        }
    }
    bits
}

/// Packs MSB-first bits back into bytes. Trailing bits that don't fill a
/// full byte are dropped.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .filter(|chunk| chunk.len() == 8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1)))
        .collect()
}

/// Repeats every bit in `bits` `repeat` times, consecutively.
pub fn repeat_bits(bits: &[u8], repeat: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(bits.len() * repeat);
    for &b in bits {
        for _ in 0..repeat {
            out.push(b);
        }
    }
    out
}

/// Decodes a repetition-coded bit stream by majority vote within each
/// group of `repeat` bits. Trailing partial groups are ignored.
pub fn majority_vote(coded_bits: &[u8], repeat: usize) -> Vec<u8> {
    coded_bits
        .chunks(repeat)
        .filter(|chunk| chunk.len() == repeat)
        .map(|chunk| {
            let ones: usize = chunk.iter().map(|&b| b as usize).sum();
            if ones * 2 >= repeat { 1 } else { 0 }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_to_bits_and_back_roundtrips() {
        let data = b"WM1|5|hello";
        let bits = bytes_to_bits(data);
        assert_eq!(bits.len(), data.len() * 8);
        let back = bits_to_bytes(&bits);
        assert_eq!(back, data);
    }

    #[test]
    fn majority_vote_recovers_original_bits_with_noise() {
        let bits = vec![1u8, 0, 1, 1, 0];
        let coded = repeat_bits(&bits, 6);
        // Flip a minority of each group; majority vote should still win.
        let mut noisy = coded.clone();
        for chunk_start in (0..noisy.len()).step_by(6) {
            noisy[chunk_start] ^= 1;
        }
        let decoded = majority_vote(&noisy, 6);
        assert_eq!(decoded, bits);
    }

    #[test]
    fn majority_vote_ignores_trailing_partial_group() {
        let coded = vec![1u8, 1, 1, 0, 0];
        let decoded = majority_vote(&coded, 6);
        assert!(decoded.is_empty());
    }
}
