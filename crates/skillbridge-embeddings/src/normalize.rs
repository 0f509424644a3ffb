//! Vector normalization and similarity utilities.

/// L2 normalize a vector (unit length). Zero vectors are left untouched.
pub fn normalize_l2(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Cosine similarity in [-1, 1]. Returns 0.0 when either vector is zero or
/// the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Map a raw cosine similarity onto [0, 1] (1 = identical).
///
/// Opposed vectors are as unrelated as orthogonal ones for retrieval purposes,
/// so negatives clamp to 0 rather than being rescaled.
pub fn unit_similarity(cosine: f32) -> f64 {
    if cosine.is_nan() {
        return 0.0;
    }
    f64::from(cosine).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_l2() {
        let mut v = vec![3.0, 4.0];
        normalize_l2(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn unit_similarity_clamps_negatives() {
        assert_eq!(unit_similarity(-0.4), 0.0);
        assert!((unit_similarity(0.4) - 0.4).abs() < 1e-6);
        assert_eq!(unit_similarity(1.0000001), 1.0);
        assert_eq!(unit_similarity(f32::NAN), 0.0);
    }
}
