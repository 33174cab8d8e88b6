use sha2::{Digest, Sha256};

/// Deterministic bag-of-words vectorizer. Each lowercased whitespace token
/// is hashed with SHA-256 and counted into one of `dimension` buckets, so
/// identical text always maps to an identical vector on every platform.
/// Empty text maps to the zero vector; similarity scoring tolerates that
/// via its epsilon term.
#[derive(Debug, Clone)]
pub struct HashingVectorizer {
    dimension: usize,
}

impl HashingVectorizer {
    #[inline]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn vectorize(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.dimension];
        for token in text.split_whitespace() {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let bucket = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize
                % self.dimension;
            vector[bucket] += 1.0;
        }
        vector
    }
}
