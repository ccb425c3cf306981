//! Advisory strength check for HMAC signing keys
//!
//! Nothing here rejects a key. `ResetTokenConfig::from_env` logs a warning for
//! weak keys so operators notice before a key leaks into production.

const MIN_KEY_LENGTH: usize = 32; // 256 bits, the HS256 output size
const STRONG_KEY_LENGTH: usize = 64;
const MIN_ENTROPY_BITS: f64 = 4.0;
const STRONG_ENTROPY_BITS: f64 = 5.0;
const MAX_RUN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrength {
    Weak,
    Acceptable,
    Strong,
}

impl KeyStrength {
    pub fn is_weak(self) -> bool {
        self == KeyStrength::Weak
    }
}

/// Classify a signing key by length, byte entropy and obvious runs.
///
/// **Criteria**:
/// - shorter than 32 bytes, entropy under 4 bits/byte, or four repeated or
///   ascending bytes in a row: `Weak`
/// - 64 bytes or more with entropy of at least 5 bits/byte: `Strong`
/// - anything else: `Acceptable`
pub fn classify_key(key: &[u8]) -> KeyStrength {
    if key.len() < MIN_KEY_LENGTH {
        return KeyStrength::Weak;
    }

    let entropy = shannon_entropy(key);
    if entropy < MIN_ENTROPY_BITS || has_runs(key) {
        return KeyStrength::Weak;
    }

    if key.len() >= STRONG_KEY_LENGTH && entropy >= STRONG_ENTROPY_BITS {
        KeyStrength::Strong
    } else {
        KeyStrength::Acceptable
    }
}

/// Bits per byte, 0.0 to 8.0
fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut freq = [0u32; 256];
    for &byte in data {
        freq[byte as usize] += 1;
    }

    let len = data.len() as f64;
    freq.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn has_runs(data: &[u8]) -> bool {
    let mut repeated = 1;
    let mut ascending = 1;

    for pair in data.windows(2) {
        repeated = if pair[0] == pair[1] { repeated + 1 } else { 1 };
        ascending = if pair[1] as i16 - pair[0] as i16 == 1 {
            ascending + 1
        } else {
            1
        };

        if repeated >= MAX_RUN || ascending >= MAX_RUN {
            return true;
        }
    }

    false
}
