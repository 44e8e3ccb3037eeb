use super::error::ConfigError;
use super::settings::AppConfig;

pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_range(
        "server.max_upload_bytes",
        config.server.max_upload_bytes as u64,
        1,
        1_000_000_000,
    )?;
    validate_non_empty("server.host", &config.server.host)?;

    validate_non_empty("llm.base_url", &config.llm.base_url)?;
    validate_non_empty("llm.chat_model", &config.llm.chat_model)?;
    validate_non_empty("llm.embedding_model", &config.llm.embedding_model)?;
    validate_range("llm.timeout_secs", config.llm.timeout_secs, 1, 3_600)?;
    if !(0.0..=2.0).contains(&config.llm.temperature) {
        return Err(invalid(
            "llm.temperature",
            format!("must be within 0.0..=2.0, got {}", config.llm.temperature),
        ));
    }

    validate_non_empty("search.endpoint", &config.search.endpoint)?;
    validate_range("search.max_results", config.search.max_results as u64, 1, 10)?;
    validate_range("search.timeout_secs", config.search.timeout_secs, 1, 600)?;

    validate_range("rag.chunk_size", config.rag.chunk_size as u64, 1, 100_000)?;
    if config.rag.chunk_overlap >= config.rag.chunk_size {
        return Err(invalid(
            "rag.chunk_overlap",
            format!(
                "must be smaller than rag.chunk_size ({} >= {})",
                config.rag.chunk_overlap, config.rag.chunk_size
            ),
        ));
    }
    validate_range(
        "rag.grounded_chunk_size",
        config.rag.grounded_chunk_size as u64,
        1,
        100_000,
    )?;
    if config.rag.grounded_chunk_overlap >= config.rag.grounded_chunk_size {
        return Err(invalid(
            "rag.grounded_chunk_overlap",
            format!(
                "must be smaller than rag.grounded_chunk_size ({} >= {})",
                config.rag.grounded_chunk_overlap, config.rag.grounded_chunk_size
            ),
        ));
    }
    validate_range("rag.max_chunks", config.rag.max_chunks as u64, 1, 1_000_000)?;
    validate_range("rag.top_k", config.rag.top_k as u64, 1, 100)?;
    validate_range(
        "rag.embed_batch_size",
        config.rag.embed_batch_size as u64,
        1,
        2_048,
    )?;

    if config
        .fallback
        .markers
        .iter()
        .any(|marker| marker.trim().is_empty())
    {
        return Err(invalid(
            "fallback.markers",
            "markers must not be blank".to_string(),
        ));
    }

    Ok(())
}

fn validate_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(invalid(
            field,
            format!("must be within {}..={}, got {}", min, max, value),
        ));
    }
    Ok(())
}

fn validate_non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty".to_string()));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
