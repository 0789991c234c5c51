//! End-to-end pipeline behavior with in-process test doubles

mod common;

use common::{
    CountingRetriever, FailingEmbedder, FailingGenerator, KeywordEmbedder, ScriptedGenerator,
    test_config,
};
use realestate_rag::api::{AnalysisMode, AnalysisPipeline, AnalysisRequest, AnalysisResult};
use realestate_rag::ml::EmbeddingProvider;
use realestate_rag::{AnswerGenerator, Config, RagError};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

fn write_report(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[tokio::test]
async fn test_gangnam_end_to_end() {
    let retriever = Arc::new(CountingRetriever::new(&[
        "강남 재건축 기대감이 커지고 있다.",
        "GTX-A 개통으로 강남 접근성이 개선된다.",
    ]));
    let generator = Arc::new(ScriptedGenerator::new(
        "[SCORE:7]\n강남 지역은 호재가 뚜렷합니다.",
    ));

    let pipeline = AnalysisPipeline::with_retriever(
        retriever.clone(),
        generator.clone(),
        &test_config(Vec::new()),
    )
    .unwrap();

    let request = AnalysisRequest::new("Gangnam", "", AnalysisMode::Summary);
    let result = pipeline.analyze(&request).await.unwrap();

    assert_eq!(
        result,
        AnalysisResult {
            score: 7,
            result: "강남 지역은 호재가 뚜렷합니다.".to_string(),
        }
    );
    assert_eq!(retriever.calls(), 1);
    assert_eq!(generator.calls(), 1);

    let queries = retriever.queries.lock().unwrap();
    assert!(queries[0].starts_with("Gangnam 지역의 2026년 부동산 시장 전망."));

    let prompts = generator.prompts.lock().unwrap();
    assert!(prompts[0].system.contains("강남 재건축 기대감이 커지고 있다."));
    assert!(prompts[0].system.contains("두 개의 문단"));
    assert_eq!(prompts[0].user, queries[0]);
    assert_eq!(prompts[0].context_chunks, 2);
}

#[tokio::test]
async fn test_untagged_answer_defaults_to_neutral() {
    let retriever = Arc::new(CountingRetriever::new(&["서울 전반 보합세."]));
    let generator = Arc::new(ScriptedGenerator::new("방향성이 불분명합니다."));
    let pipeline =
        AnalysisPipeline::with_retriever(retriever, generator, &test_config(Vec::new())).unwrap();

    let result = pipeline
        .analyze(&AnalysisRequest::new("마포구", "", AnalysisMode::Detailed))
        .await
        .unwrap();

    assert_eq!(result.score, 4);
    assert_eq!(result.result, "방향성이 불분명합니다.");
}

#[tokio::test]
async fn test_unavailable_pipeline_short_circuits() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let generator = Arc::new(ScriptedGenerator::new("[SCORE:6] unused"));

    let config = test_config(vec![PathBuf::from("/nonexistent/report.pdf")]);
    let pipeline = AnalysisPipeline::initialize(&config, embedder.clone(), generator.clone())
        .await
        .unwrap();

    assert!(!pipeline.is_ready());
    assert_eq!(pipeline.chunk_count(), 0);
    assert!(pipeline.unavailable_reason().is_some());

    let err = pipeline
        .analyze(&AnalysisRequest::new("강남구", "", AnalysisMode::Summary))
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::IndexUnavailable(_)));
    assert!(err.is_unavailable());

    // An invalid request still reports degraded mode first
    let err = pipeline
        .analyze(&AnalysisRequest::new("", "", AnalysisMode::Summary))
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::IndexUnavailable(_)));

    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(generator.calls(), 0);
    assert!(matches!(
        pipeline.retrieve("강남", 3).await,
        Err(RagError::IndexUnavailable(_))
    ));
}

#[tokio::test]
async fn test_explicitly_unavailable_pipeline() {
    let generator = Arc::new(ScriptedGenerator::new("[SCORE:6] unused"));
    let pipeline =
        AnalysisPipeline::unavailable("maintenance", generator.clone(), &Config::default())
            .unwrap();

    let err = pipeline
        .analyze(&AnalysisRequest::new("송파구", "", AnalysisMode::Detailed))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "RAG index unavailable: maintenance");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_initialize_from_text_reports() {
    let dir = tempfile::tempdir().unwrap();
    let gangnam = write_report(
        &dir,
        "gangnam.txt",
        "강남 재건축 단지의 기대감이 이어지고 있다.\n\n강남 학군 수요는 견조하다.",
    );
    let mapo = write_report(
        &dir,
        "mapo.txt",
        "마포 지역은 GTX 노선 기대감이 있다.\u{c}금리 인하가 변수로 꼽힌다.",
    );

    let config = test_config(vec![gangnam, dir.path().join("missing.pdf"), mapo]);
    let embedder = Arc::new(KeywordEmbedder::default());
    let generator = Arc::new(ScriptedGenerator::new("[SCORE:6]\n상승 추세가 예상됩니다."));

    let pipeline = AnalysisPipeline::initialize(&config, embedder.clone(), generator.clone())
        .await
        .unwrap();

    assert!(pipeline.is_ready());
    assert_eq!(pipeline.chunk_count(), 3);
    // Three chunks fit one batch of ten
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);

    let hits = pipeline.retrieve("마포 GTX", 1).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits.hits[0].chunk.text.starts_with("마포 지역은"));
    assert_eq!(hits.hits[0].chunk.page, 0);

    let result = pipeline
        .analyze(&AnalysisRequest::new("강남구", "재건축 전망은?", AnalysisMode::Detailed))
        .await
        .unwrap();
    assert_eq!(result.score, 6);
    assert_eq!(result.result, "상승 추세가 예상됩니다.");

    let prompts = generator.prompts.lock().unwrap();
    assert!(prompts[0].user.ends_with("재건축 전망은?"));
    assert_eq!(prompts[0].context_chunks, 3);
}

#[tokio::test]
async fn test_embedding_failure_leaves_pipeline_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let report = write_report(&dir, "report.txt", "강남 재건축 기대감.");

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(FailingEmbedder);
    let generator = Arc::new(ScriptedGenerator::new("[SCORE:5] unused"));
    let pipeline =
        AnalysisPipeline::initialize(&test_config(vec![report]), embedder, generator.clone())
            .await
            .unwrap();

    assert!(!pipeline.is_ready());
    assert!(
        pipeline
            .unavailable_reason()
            .unwrap()
            .contains("Embedding batch 0 failed")
    );
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_invalid_config_is_returned() {
    let mut config = test_config(Vec::new());
    config.chunking.overlap = config.chunking.chunk_size;

    let result = AnalysisPipeline::initialize(
        &config,
        Arc::new(KeywordEmbedder::default()),
        Arc::new(ScriptedGenerator::new("")),
    )
    .await;

    assert!(matches!(result, Err(RagError::Config(_))));
}

#[tokio::test]
async fn test_empty_region_rejected() {
    let retriever = Arc::new(CountingRetriever::new(&["서울 전반 보합세."]));
    let generator = Arc::new(ScriptedGenerator::new("[SCORE:4] unused"));
    let pipeline = AnalysisPipeline::with_retriever(
        retriever.clone(),
        generator.clone(),
        &test_config(Vec::new()),
    )
    .unwrap();

    let err = pipeline
        .analyze(&AnalysisRequest::new("   ", "", AnalysisMode::Summary))
        .await
        .unwrap_err();

    assert!(matches!(err, RagError::InvalidRequest(_)));
    assert_eq!(retriever.calls(), 0);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_generation_error_surfaces() {
    let retriever = Arc::new(CountingRetriever::new(&["서울 전반 보합세."]));
    let generator: Arc<dyn AnswerGenerator> = Arc::new(FailingGenerator);
    let pipeline =
        AnalysisPipeline::with_retriever(retriever.clone(), generator, &test_config(Vec::new()))
            .unwrap();

    let err = pipeline
        .analyze(&AnalysisRequest::new("송파구", "", AnalysisMode::Detailed))
        .await
        .unwrap_err();

    assert!(matches!(err, RagError::Generation(_)));
    assert!(!err.is_unavailable());
    assert_eq!(retriever.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_requests_share_pipeline() {
    let retriever = Arc::new(CountingRetriever::new(&["강남 재건축", "마포 GTX", "금리 변수"]));
    let generator = Arc::new(ScriptedGenerator::new("[SCORE:5]\n바닥 다지기 구간입니다."));
    let pipeline = Arc::new(
        AnalysisPipeline::with_retriever(
            retriever.clone(),
            generator.clone(),
            &test_config(Vec::new()),
        )
        .unwrap(),
    );

    let regions = ["강남구", "마포구", "송파구", "노원구"];
    let handles: Vec<_> = regions
        .iter()
        .map(|region| {
            let pipeline = Arc::clone(&pipeline);
            let request = AnalysisRequest::new(*region, "", AnalysisMode::Summary);
            tokio::spawn(async move { pipeline.analyze(&request).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.score, 5);
        assert_eq!(result.result, "바닥 다지기 구간입니다.");
    }

    assert_eq!(retriever.calls(), regions.len());
    assert_eq!(generator.calls(), regions.len());
}
