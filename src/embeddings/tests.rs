use super::*;
use std::time::Duration;

fn hashing_client(dimension: usize) -> EmbeddingClient {
    EmbeddingClient::with_backend(Backend::Hashing(HashingVectorizer::new(dimension)))
}

#[test]
fn ollama_client_configuration() {
    let config = EmbeddingConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        model: "test-model".to_string(),
        batch_size: 128,
        fallback_dimension: 1024,
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.model(), "test-model");
    assert_eq!(client.batch_size(), 128);
    assert_eq!(client.base_url().host_str(), Some("test-host"));
    assert_eq!(client.base_url().port(), Some(1234));
}

#[test]
fn ollama_client_builder_methods() {
    let config = EmbeddingConfig::default();
    let client = OllamaClient::new(&config)
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(5);

    assert_eq!(client.retry_attempts(), 5);
}

#[test]
fn hashing_vectors_are_deterministic() {
    let vectorizer = HashingVectorizer::new(1024);

    let a = vectorizer.vectorize("the login page rejects valid users");
    let b = vectorizer.vectorize("the login page rejects valid users");
    assert_eq!(a, b);
    assert_eq!(a.len(), 1024);
}

#[test]
fn hashing_is_case_insensitive_bag_of_words() {
    let vectorizer = HashingVectorizer::new(256);

    let lower = vectorizer.vectorize("alpha beta");
    let mixed = vectorizer.vectorize("Alpha BETA");
    assert_eq!(lower, mixed);

    // Token multiplicity is counted.
    let repeated = vectorizer.vectorize("alpha alpha");
    let single = vectorizer.vectorize("alpha");
    let sum_repeated: f64 = repeated.iter().sum();
    let sum_single: f64 = single.iter().sum();
    assert_eq!(sum_repeated, 2.0);
    assert_eq!(sum_single, 1.0);
}

#[test]
fn empty_text_yields_well_formed_zero_vector() {
    let vectorizer = HashingVectorizer::new(64);
    let vector = vectorizer.vectorize("   ");
    assert_eq!(vector.len(), 64);
    assert!(vector.iter().all(|&v| v == 0.0));
}

#[test]
fn embed_empty_batch_returns_empty() {
    let client = hashing_client(128);
    let vectors = client.embed(&[]).expect("embed should succeed");
    assert!(vectors.is_empty());
}

#[test]
fn embed_query_matches_batch_embedding() {
    let client = hashing_client(128);

    let query = client
        .embed_query("checkout flow times out")
        .expect("embed_query should succeed");
    let batch = client
        .embed(&["checkout flow times out".to_string()])
        .expect("embed should succeed");

    assert_eq!(query, batch[0]);
}

#[test]
fn fallback_backend_is_observable() {
    let client = hashing_client(128);
    assert!(client.is_fallback());
}

#[test]
fn similar_texts_share_more_buckets_than_unrelated_ones() {
    let client = hashing_client(1024);
    let vectors = client
        .embed(&[
            "user login fails with invalid password".to_string(),
            "login fails when the password is invalid".to_string(),
            "quarterly revenue spreadsheet totals".to_string(),
        ])
        .expect("embed should succeed");

    let dot = |a: &[f64], b: &[f64]| -> f64 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
    let related = dot(&vectors[0], &vectors[1]);
    let unrelated = dot(&vectors[0], &vectors[2]);
    assert!(related > unrelated);
}
