use ndarray::ArrayView1;

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    ArrayView1::from(a).dot(&ArrayView1::from(b))
}

pub fn l2_norm(vector: &[f32]) -> f32 {
    let view = ArrayView1::from(vector);
    view.dot(&view).sqrt()
}

/// Scales `vector` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = l2_norm(vector);
    if norm <= f32::EPSILON {
        return;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let denom = l2_norm(a) * l2_norm(b);
    if denom <= f32::EPSILON {
        0.0
    } else {
        (dot(a, b) / denom).clamp(-1.0, 1.0)
    }
}
