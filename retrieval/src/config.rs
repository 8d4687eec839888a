use serde::{Deserialize, Serialize};

/// Configuration for retrieval scoring and fusion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Weight applied to the raw vector similarity in hybrid scoring
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f32,

    /// Weight applied to the raw lexical metric in hybrid scoring
    #[serde(default = "default_text_weight")]
    pub text_weight: f32,

    /// Absolute floor on the blended hybrid score; lower candidates are dropped
    #[serde(default = "default_hybrid_floor")]
    pub hybrid_floor: f32,

    /// Hard similarity floor for the vector-only retriever
    #[serde(default = "default_vector_similarity_floor")]
    pub vector_similarity_floor: f32,

    /// Divisor bringing the store's lexical metric into a comparable range
    #[serde(default = "default_text_score_divisor")]
    pub text_score_divisor: f32,

    /// Weight of the retrieval score in the fusion blend
    #[serde(default = "default_retrieval_weight")]
    pub retrieval_weight: f32,

    /// Weight of the overlap score in the fusion blend
    #[serde(default = "default_overlap_weight")]
    pub overlap_weight: f32,
}

fn default_vector_weight() -> f32 {
    0.1
}

fn default_text_weight() -> f32 {
    0.9
}

fn default_hybrid_floor() -> f32 {
    0.70
}

fn default_vector_similarity_floor() -> f32 {
    0.90
}

fn default_text_score_divisor() -> f32 {
    2.0
}

fn default_retrieval_weight() -> f32 {
    0.7
}

fn default_overlap_weight() -> f32 {
    0.3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_weight: default_vector_weight(),
            text_weight: default_text_weight(),
            hybrid_floor: default_hybrid_floor(),
            vector_similarity_floor: default_vector_similarity_floor(),
            text_score_divisor: default_text_score_divisor(),
            retrieval_weight: default_retrieval_weight(),
            overlap_weight: default_overlap_weight(),
        }
    }
}

impl RetrievalConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("vector_weight", self.vector_weight),
            ("text_weight", self.text_weight),
            ("retrieval_weight", self.retrieval_weight),
            ("overlap_weight", self.overlap_weight),
            ("hybrid_floor", self.hybrid_floor),
            ("vector_similarity_floor", self.vector_similarity_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be in [0.0, 1.0], got {value}"));
            }
        }

        let blend = self.retrieval_weight + self.overlap_weight;
        if (blend - 1.0).abs() > 0.01 {
            return Err(format!(
                "retrieval_weight + overlap_weight must sum to 1.0, got {blend}"
            ));
        }

        if self.text_score_divisor <= 0.0 {
            return Err(format!(
                "text_score_divisor must be > 0, got {}",
                self.text_score_divisor
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_valid() {
        let config = RetrievalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vector_weight, 0.1);
        assert_eq!(config.text_weight, 0.9);
        assert_eq!(config.hybrid_floor, 0.70);
        assert_eq!(config.vector_similarity_floor, 0.90);
    }

    #[test]
    fn test_weight_validation() {
        let config = RetrievalConfig {
            retrieval_weight: 0.6,
            overlap_weight: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RetrievalConfig {
            vector_weight: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_divisor_validation() {
        let config = RetrievalConfig {
            text_score_divisor: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
