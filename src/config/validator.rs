use crate::config::Config;
use crate::error::{LawbotError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_storage(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_reranker(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);
        Self::validate_generation(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(LawbotError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_storage(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.storage.data_dir.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.data_dir",
                "Data directory cannot be empty",
            ));
        }
        if config.storage.passages_file.is_empty() {
            errors.push(ValidationError::new(
                "storage.passages_file",
                "Passages file name cannot be empty",
            ));
        }
        if config.storage.embeddings_file.is_empty() {
            errors.push(ValidationError::new(
                "storage.embeddings_file",
                "Embeddings file name cannot be empty",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }
        if config.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }
    }

    fn validate_reranker(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.reranker.model.is_empty() {
            errors.push(ValidationError::new(
                "reranker.model",
                "Model name cannot be empty",
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        // one of the two recall stages must be able to produce candidates
        if config.retrieval.top_n_vector == 0 && config.retrieval.top_n_keyword == 0 {
            errors.push(ValidationError::new(
                "retrieval.top_n_vector",
                "top_n_vector and top_n_keyword cannot both be 0",
            ));
        }
        if config.retrieval.top_k_final == 0 {
            errors.push(ValidationError::new(
                "retrieval.top_k_final",
                "top_k_final must be greater than 0",
            ));
        }
        if config.retrieval.hnsw_ef_construction == 0 {
            errors.push(ValidationError::new(
                "retrieval.hnsw_ef_construction",
                "HNSW ef_construction must be greater than 0",
            ));
        }
        if config.retrieval.hnsw_m == 0 {
            errors.push(ValidationError::new(
                "retrieval.hnsw_m",
                "HNSW M must be greater than 0",
            ));
        }
        if config.retrieval.hnsw_ef_search == 0 {
            errors.push(ValidationError::new(
                "retrieval.hnsw_ef_search",
                "HNSW ef_search must be greater than 0",
            ));
        }
    }

    fn validate_generation(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.generation.base_url.is_empty() {
            errors.push(ValidationError::new(
                "generation.base_url",
                "Base URL cannot be empty",
            ));
        }
        if config.generation.model.is_empty() {
            errors.push(ValidationError::new(
                "generation.model",
                "Model name cannot be empty",
            ));
        }
        if config.generation.api_key_env.is_empty() {
            errors.push(ValidationError::new(
                "generation.api_key_env",
                "API key environment variable name cannot be empty",
            ));
        }

        let temp = config.generation.temperature;
        if !(0.0..=2.0).contains(&temp) {
            errors.push(ValidationError::new(
                "generation.temperature",
                format!("Temperature must be between 0.0 and 2.0, got {}", temp),
            ));
        }

        if config.generation.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "generation.timeout_secs",
                "Timeout must be greater than 0",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn zero_top_k_final_is_rejected() {
        let mut config = Config::default();
        config.retrieval.top_k_final = 0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn both_recall_stages_disabled_is_rejected() {
        let mut config = Config::default();
        config.retrieval.top_n_vector = 0;
        config.retrieval.top_n_keyword = 0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let mut config = Config::default();
        config.generation.temperature = 3.5;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn empty_model_name_is_rejected() {
        let mut config = Config::default();
        config.embedding.model = String::new();
        assert!(ConfigValidator::validate(&config).is_err());
    }
}
