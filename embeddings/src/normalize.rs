/// Rescale a vector to unit length using the Euclidean (L2) norm.
///
/// A vector whose norm is exactly zero is returned unchanged; dividing by it
/// would produce NaN components and poison every downstream similarity.
pub fn normalize_vector(vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return vector;
    }
    vector.into_iter().map(|v| v / norm).collect()
}
