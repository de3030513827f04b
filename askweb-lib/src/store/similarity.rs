use std::fmt;
use std::str::FromStr;

use crate::Error;

/// How query and stored vectors are compared. Every policy yields a score
/// where higher means more similar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Similarity {
    /// Cosine of the angle between the vectors, in [-1, 1]
    #[default]
    Cosine,
    /// Raw dot product
    DotProduct,
    /// Negated euclidean distance
    Euclidean,
}

impl Similarity {
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Similarity::Cosine => cosine_similarity(a, b),
            Similarity::DotProduct => dot(a, b),
            Similarity::Euclidean => -euclidean_distance(a, b),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Similarity::Cosine => "cosine",
            Similarity::DotProduct => "dot",
            Similarity::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Similarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Similarity::Cosine),
            "dot" | "dot_product" => Ok(Similarity::DotProduct),
            "euclidean" | "l2" => Ok(Similarity::Euclidean),
            other => Err(Error::Config(format!(
                "unknown similarity '{other}'; use cosine, dot or euclidean"
            ))),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 means identical direction. A zero
/// vector is treated as unrelated to everything (0.0).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let norm_a = magnitude(a);
    let norm_b = magnitude(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
