//! The analysis pipeline context
//!
//! [`AnalysisPipeline`] is built once at startup: documents are ingested,
//! chunked and embedded before the value exists, so no request can observe a
//! half-built index. After construction it is immutable and is shared across
//! request handlers behind an `Arc`.
//!
//! When ingestion yields nothing or the index build fails, the pipeline is
//! still constructed but is unavailable: every request fails fast with
//! [`RagError::IndexUnavailable`] without touching retrieval or generation.

use crate::api::generator::{AnswerGenerator, OpenAiGenerator};
use crate::api::parser::ScoreParser;
use crate::api::prompt::PromptComposer;
use crate::api::types::{AnalysisRequest, AnalysisResult};
use crate::config::Config;
use crate::error::{RagError, Result};
use crate::ml::{EmbeddingProvider, OpenAiEmbedder, RetrievalResult, Retriever, VectorIndex};
use crate::text::{Ingestor, TextChunker};
use std::sync::Arc;
use std::time::Instant;

/// Whether retrieval can be served
enum IndexState {
    Ready(Arc<dyn Retriever>),
    Unavailable(String),
}

/// Immutable per-process pipeline context
pub struct AnalysisPipeline {
    index: IndexState,
    generator: Arc<dyn AnswerGenerator>,
    composer: PromptComposer,
    parser: ScoreParser,
    top_k: usize,
}

impl AnalysisPipeline {
    /// Build the pipeline with OpenAI-compatible embedding and generation clients
    pub async fn from_config(config: &Config) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbedder::new(&config.embedding));
        let generator: Arc<dyn AnswerGenerator> = Arc::new(OpenAiGenerator::new(&config.generation));
        Self::initialize(config, embedder, generator).await
    }

    /// Ingest, chunk and index the configured documents
    pub async fn initialize(
        config: &Config,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Result<Self> {
        Self::initialize_with_progress(config, embedder, generator, |_, _| {}).await
    }

    /// Like [`initialize`](Self::initialize), reporting embedding progress as `(done, total)`.
    ///
    /// Only configuration errors are returned; ingestion and index failures
    /// produce an unavailable pipeline.
    pub async fn initialize_with_progress<F>(
        config: &Config,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn AnswerGenerator>,
        progress: F,
    ) -> Result<Self>
    where
        F: Fn(usize, usize),
    {
        config.validate()?;
        let start_time = Instant::now();

        let report = Ingestor::new().ingest(&config.documents);
        let chunker = TextChunker::new(config.chunking.clone())?;
        let chunks = chunker.chunk_documents(&report.documents);

        let index = if chunks.is_empty() {
            log::error!("❌ No chunks were produced; RAG analysis is unavailable");
            IndexState::Unavailable("no source documents could be loaded".to_string())
        } else {
            match VectorIndex::build_with_progress(
                chunks,
                embedder,
                config.embedding.batch_size,
                progress,
            )
            .await
            {
                Ok(index) => IndexState::Ready(Arc::new(index)),
                Err(e) => {
                    log::error!("❌ Vector index build failed: {}", e);
                    IndexState::Unavailable(format!("index build failed: {}", e))
                }
            }
        };

        let pipeline = Self::with_state(index, generator, config)?;
        if pipeline.is_ready() {
            log::info!(
                "✅ RAG pipeline ready in {:.2}s ({} chunks)",
                start_time.elapsed().as_secs_f64(),
                pipeline.chunk_count()
            );
        }
        Ok(pipeline)
    }

    /// Assemble a pipeline around an existing retriever
    pub fn with_retriever(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn AnswerGenerator>,
        config: &Config,
    ) -> Result<Self> {
        Self::with_state(IndexState::Ready(retriever), generator, config)
    }

    /// Assemble a pipeline that rejects every request
    pub fn unavailable(
        reason: impl Into<String>,
        generator: Arc<dyn AnswerGenerator>,
        config: &Config,
    ) -> Result<Self> {
        Self::with_state(IndexState::Unavailable(reason.into()), generator, config)
    }

    fn with_state(
        index: IndexState,
        generator: Arc<dyn AnswerGenerator>,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            index,
            generator,
            composer: PromptComposer::new(&config.prompt),
            parser: ScoreParser::new(config.scoring.default_score)?,
            top_k: config.retrieval.top_k,
        })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.index, IndexState::Ready(_))
    }

    /// Why the pipeline is unavailable, if it is
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.index {
            IndexState::Ready(_) => None,
            IndexState::Unavailable(reason) => Some(reason),
        }
    }

    /// Number of indexed chunks (0 when unavailable)
    pub fn chunk_count(&self) -> usize {
        match &self.index {
            IndexState::Ready(retriever) => retriever.len(),
            IndexState::Unavailable(_) => 0,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn generator_model(&self) -> &str {
        self.generator.model()
    }

    fn retriever(&self) -> Result<&Arc<dyn Retriever>> {
        match &self.index {
            IndexState::Ready(retriever) => Ok(retriever),
            IndexState::Unavailable(reason) => Err(RagError::IndexUnavailable(reason.clone())),
        }
    }

    /// Raw top-k retrieval for a free-text query
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievalResult> {
        self.retriever()?.retrieve(query, k).await
    }

    /// Answer one analysis request
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let retriever = self.retriever()?;
        request.validate()?;

        let start_time = Instant::now();
        log::info!(
            "Analyzing '{}' ({}, query: '{}')",
            request.region.trim(),
            request.analysis_type,
            request.query.trim()
        );

        let question = self.composer.human_message(request);
        let retrieval = retriever.retrieve(&question, self.top_k).await?;
        let prompt = self.composer.compose(request, &retrieval)?;

        let raw_answer = self.generator.generate(&prompt).await.map_err(|e| {
            log::error!("Generation failed for '{}': {}", request.region.trim(), e);
            e
        })?;

        let parsed = self.parser.parse(&raw_answer);
        log::info!(
            "Analysis for '{}' scored {}/7 ({} context chunks, {:.2}s)",
            request.region.trim(),
            parsed.score,
            prompt.context_chunks,
            start_time.elapsed().as_secs_f64()
        );

        Ok(AnalysisResult {
            score: parsed.score,
            result: parsed.text,
        })
    }
}
