use super::*;
use tempfile::TempDir;

#[test]
fn defaults_when_no_file_exists() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    let config = Config::load(temp_dir.path()).expect("load should succeed");

    assert_eq!(config.chunking.chunk_size, 200);
    assert_eq!(config.chunking.overlap, 40);
    assert_eq!(config.embedding.batch_size, 32);
    assert_eq!(config.embedding.fallback_dimension, 1024);
    assert_eq!(config.retriever.top_k, 5);
    assert_eq!(config.vector_store.path, PathBuf::from("casegen.db"));
    assert_eq!(config.base_dir, temp_dir.path());
}

#[test]
fn save_and_reload_round_trip() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    let config = Config {
        chunking: ChunkingConfig {
            chunk_size: 100,
            overlap: 10,
        },
        retriever: RetrieverConfig { top_k: 8 },
        base_dir: temp_dir.path().to_path_buf(),
        ..Config::default()
    };
    config.save().expect("save should succeed");

    let reloaded = Config::load(temp_dir.path()).expect("load should succeed");
    assert_eq!(reloaded.chunking.chunk_size, 100);
    assert_eq!(reloaded.chunking.overlap, 10);
    assert_eq!(reloaded.retriever.top_k, 8);
}

#[test]
fn partial_file_fills_in_defaults() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&config_path, "[chunking]\nchunk_size = 64\n").expect("can write config");

    let config = Config::load(temp_dir.path()).expect("load should succeed");
    assert_eq!(config.chunking.chunk_size, 64);
    assert_eq!(config.chunking.overlap, 40);
    assert_eq!(config.retriever.top_k, 5);
}

#[test]
fn zero_chunk_size_is_rejected() {
    let config = Config {
        chunking: ChunkingConfig {
            chunk_size: 0,
            overlap: 0,
        },
        ..Config::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidChunkSize(0))
    ));
}

#[test]
fn overlap_larger_than_chunk_size_is_allowed() {
    let config = Config {
        chunking: ChunkingConfig {
            chunk_size: 10,
            overlap: 50,
        },
        ..Config::default()
    };

    assert!(config.validate().is_ok());
}

#[test]
fn embedding_validation_bounds() {
    let mut embedding = EmbeddingConfig::default();
    assert!(embedding.validate().is_ok());

    embedding.batch_size = 0;
    assert!(matches!(
        embedding.validate(),
        Err(ConfigError::InvalidBatchSize(0))
    ));

    embedding.batch_size = 32;
    embedding.model = "  ".to_string();
    assert!(matches!(
        embedding.validate(),
        Err(ConfigError::InvalidModel(_))
    ));

    embedding.model = "nomic-embed-text:latest".to_string();
    embedding.protocol = "ftp".to_string();
    assert!(matches!(
        embedding.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));

    embedding.protocol = "http".to_string();
    embedding.fallback_dimension = 32;
    assert!(matches!(
        embedding.validate(),
        Err(ConfigError::InvalidFallbackDimension(32))
    ));
}

#[test]
fn store_path_resolves_relative_to_base_dir() {
    let config = Config {
        base_dir: PathBuf::from("/tmp/example"),
        ..Config::default()
    };
    assert_eq!(config.store_path(), PathBuf::from("/tmp/example/casegen.db"));

    let absolute = Config {
        vector_store: VectorStoreConfig {
            path: PathBuf::from("/data/store.db"),
        },
        base_dir: PathBuf::from("/tmp/example"),
        ..Config::default()
    };
    assert_eq!(absolute.store_path(), PathBuf::from("/data/store.db"));
}
