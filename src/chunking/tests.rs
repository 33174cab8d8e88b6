use super::*;

fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

#[test]
fn empty_text_yields_no_chunks() {
    assert!(chunk_text("", 200, 40).expect("should succeed").is_empty());
    assert!(
        chunk_text("   \n\t  ", 200, 40)
            .expect("should succeed")
            .is_empty()
    );
}

#[test]
fn zero_chunk_size_is_a_validation_error() {
    assert!(matches!(
        chunk_text("some text", 0, 0),
        Err(crate::CasegenError::Validation(_))
    ));
}

#[test]
fn short_text_is_a_single_window() {
    let windows = chunk_text("alpha beta gamma", 200, 40).expect("should succeed");
    assert_eq!(windows, vec!["alpha beta gamma".to_string()]);
}

#[test]
fn window_count_matches_the_stride_formula() {
    // 650 words at size 200 / overlap 40 advance by 160:
    // ceil((650 - 200) / 160) + 1 = 4 windows.
    let text = words(650);
    let windows = chunk_text(&text, 200, 40).expect("should succeed");
    assert_eq!(windows.len(), 4);
}

#[test]
fn windows_cover_every_token_without_gaps() {
    let text = words(650);
    let windows = chunk_text(&text, 200, 40).expect("should succeed");

    // Window i starts at token i * 160; the previous window ends at
    // i * 160 + 40 tokens later, so consecutive windows overlap.
    let mut covered = vec![false; 650];
    for (i, window) in windows.iter().enumerate() {
        let start = i * 160;
        let len = window.split_whitespace().count();
        for slot in covered.iter_mut().skip(start).take(len) {
            *slot = true;
        }
        assert!(len <= 200);
    }
    assert!(covered.iter().all(|&c| c));

    // The final window may be shorter than chunk_size.
    let last_len = windows
        .last()
        .expect("at least one window")
        .split_whitespace()
        .count();
    assert_eq!(last_len, 650 - 3 * 160);
}

#[test]
fn degenerate_overlap_still_advances() {
    // overlap >= chunk_size clamps the step to 1 token. The walk stops at
    // "d e"; a lone "e" window would add nothing.
    let windows = chunk_text("a b c d e", 2, 5).expect("should succeed");
    assert_eq!(
        windows,
        vec![
            "a b".to_string(),
            "b c".to_string(),
            "c d".to_string(),
            "d e".to_string(),
        ]
    );
}

#[test]
fn no_window_is_emitted_past_the_final_token() {
    // 10 words at size 5 / step 3: windows start at 0, 3, and 6. The window
    // at 6 reaches the last token, so no shorter suffix window follows it.
    let text = words(10);
    let windows = chunk_text(&text, 5, 2).expect("should succeed");

    assert_eq!(windows.len(), 3);
    let last = windows.last().expect("at least one window");
    assert_eq!(last, "w6 w7 w8 w9");

    // Every window except the last must be exactly chunk_size tokens.
    for window in &windows[..windows.len() - 1] {
        assert_eq!(window.split_whitespace().count(), 5);
    }
}

#[test]
fn windows_rejoin_with_single_spaces() {
    let windows = chunk_text("alpha\n\nbeta\t gamma", 10, 0).expect("should succeed");
    assert_eq!(windows, vec!["alpha beta gamma".to_string()]);
}

#[test]
fn chunk_ids_are_deterministic_across_runs() {
    let record = ArtifactRecord::new(words(500))
        .with_metadata([("source", "docs/spec.pdf"), ("doc_type", "pdf")]);

    let first = chunk_records(std::slice::from_ref(&record), 200, 40, Some("spec"))
        .expect("should succeed");
    let second = chunk_records(std::slice::from_ref(&record), 200, 40, Some("spec"))
        .expect("should succeed");

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.id, b.id);
    }
}

#[test]
fn distinct_prefixes_namespace_ids_per_artifact() {
    let record = ArtifactRecord::new("identical text in two artifacts")
        .with_metadata([("source", "shared")]);

    let a = chunk_records(std::slice::from_ref(&record), 200, 40, Some("artifact_a"))
        .expect("should succeed");
    let b = chunk_records(std::slice::from_ref(&record), 200, 40, Some("artifact_b"))
        .expect("should succeed");

    assert_ne!(a[0].id, b[0].id);
}

#[test]
fn chunks_never_span_records() {
    let records = vec![
        ArtifactRecord::new("first record text").with_metadata([("source", "a")]),
        ArtifactRecord::new("second record text").with_metadata([("source", "a")]),
    ];

    let chunks = chunk_records(&records, 200, 40, None).expect("should succeed");

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "first record text");
    assert_eq!(chunks[1].text, "second record text");
    // chunk_index restarts per record.
    assert_eq!(
        chunks[0].metadata.get("chunk_index").map(String::as_str),
        Some("0")
    );
    assert_eq!(
        chunks[1].metadata.get("chunk_index").map(String::as_str),
        Some("0")
    );
}

#[test]
fn chunk_metadata_inherits_record_provenance() {
    let record = ArtifactRecord::new(words(10))
        .with_metadata([("source", "export.json"), ("doc_type", "jira"), ("issue_key", "P-1")]);

    let chunks = chunk_records(std::slice::from_ref(&record), 5, 0, None).expect("should succeed");

    assert_eq!(chunks.len(), 2);
    for (index, chunk) in chunks.iter().enumerate() {
        assert_eq!(
            chunk.metadata.get("doc_type").map(String::as_str),
            Some("jira")
        );
        assert_eq!(
            chunk.metadata.get("issue_key").map(String::as_str),
            Some("P-1")
        );
        assert_eq!(
            chunk.metadata.get("chunk_index").map(String::as_str),
            Some(index.to_string().as_str())
        );
        assert!(chunk.embedding.is_none());
    }
}
