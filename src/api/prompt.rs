//! Prompt templates for outlook analysis
//!
//! The system message carries the role, the scoring rubric, the writing rules
//! and the retrieved context. The rubric and rules are never shortened; when
//! the context budget is exceeded, retrieved text is cut instead.

use crate::api::types::{AnalysisMode, AnalysisRequest};
use crate::config::PromptConfig;
use crate::error::{RagError, Result};
use crate::ml::RetrievalResult;
use chrono::Datelike;

/// Marker in the system template replaced by the retrieved context
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Rubric levels: (score, label, when to use it)
pub const SCORE_LEVELS: [(u8, &str, &str); 7] = [
    (1, "적극 매도 추천", "시장 붕괴, 심각한 악재."),
    (2, "매도 추천", "하락 추세."),
    (3, "비중 축소 추천", "호재보다 악재가 우위."),
    (4, "관망", "가급적 사용 금지. 방향성이 정말로 불분명할 때만."),
    (5, "소극적 매수 추천", "바닥 다지기, 긍정 신호."),
    (6, "매수 추천", "상승 추세, 호재 명확."),
    (7, "적극적 매수 추천", "저평가와 대형 호재가 겹침."),
];

const ANALYSIS_RULES: &str = "\
[분석 및 작성 원칙]
1. 문서 인용: [Context]에 해당 지역 내용이 있다면 적극 인용하여 구체적으로 분석하세요.
2. 적극적 추론: 문서에 특정 동/구 단위 정보가 없더라도 절대로 '정보가 없다'고 끝내지 마세요. \
[Context]의 서울/수도권 전체 흐름과 거시 경제 내용을 바탕으로 논리적으로 추론하고, \
입지, 학군, 교통 같은 일반적인 부동산 지식을 결합하여 분석을 완성하세요.";

const STYLE_RULES: &str = "\
3. 서술 방식: 첫 줄의 [SCORE] 태그를 제외한 모든 본문은 자연스러운 줄글로 작성하세요. \
'#', '**', '-', '1.' 같은 마크다운 기호와 목록 형식 사용을 금지합니다. \
전문가가 옆에서 말해주는 것처럼 편안하고 전문적인 문체로 작성하세요.";

/// Model request: a system message and a human message
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
    /// Retrieved chunks that made it into the context (fully or partially)
    pub context_chunks: usize,
    /// Whether retrieved text was cut to fit the context budget
    pub truncated: bool,
}

/// Builds model requests from an analysis request and retrieved chunks
#[derive(Debug, Clone)]
pub struct PromptComposer {
    max_context_chars: usize,
    outlook_year: i32,
}

impl PromptComposer {
    pub fn new(config: &PromptConfig) -> Self {
        Self {
            max_context_chars: config.max_context_chars,
            outlook_year: config
                .outlook_year
                .unwrap_or_else(|| chrono::Local::now().year()),
        }
    }

    /// Render the scoring rubric
    pub fn score_rules() -> String {
        let mut rules = String::from(
            "[점수 책정 규칙 (1~7점 척도)]\n\
             당신은 적극적인 투자 전략가입니다. '보류'나 '판단 불가'는 최대한 피하세요.\n\
             작은 힌트라도 찾아서 반드시 매수/매도 방향성을 제시하세요.\n",
        );

        for (score, label, description) in SCORE_LEVELS {
            rules.push_str(&format!("[SCORE:{}] {}: {}\n", score, label, description));
        }

        rules.push_str(
            "답변의 맨 첫 줄은 반드시 [SCORE:점수] 태그로 시작하세요. \
             점수는 1부터 7 사이의 숫자 하나입니다.",
        );
        rules
    }

    /// System template for a mode, holding the context placeholder once
    pub fn system_template(mode: AnalysisMode) -> String {
        let (role, length) = match mode {
            AnalysisMode::Summary => (
                "당신은 부동산 요약 전문가입니다. Context를 바탕으로 분석하세요.",
                "분량: 전체 내용을 5~6줄 내외의 두 개의 문단으로 작성하세요.",
            ),
            AnalysisMode::Detailed => (
                "당신은 대한민국 최고의 부동산 애널리스트입니다. Context를 바탕으로 심층 분석하세요.",
                "분량 및 구성: 시장 현황, 입지 분석, 리스크, 투자 전략 순으로 흐름을 잡아 \
                 6~7 문단으로 충분히 상세하게, 지역의 입지를 중점으로 서술하세요.",
            ),
        };

        format!(
            "{}\n{}\n{}\n{}\n{}\n\n[Context]:\n{}",
            role,
            Self::score_rules(),
            ANALYSIS_RULES,
            STYLE_RULES,
            length,
            CONTEXT_PLACEHOLDER
        )
    }

    /// The human turn: region, outlook year, mode framing and the free-text query
    pub fn human_message(&self, request: &AnalysisRequest) -> String {
        let framing = match request.analysis_type {
            AnalysisMode::Summary => "핵심만 간결하게 요약해 주세요.",
            AnalysisMode::Detailed => "보고서를 바탕으로 자세히 분석해 주세요.",
        };

        let mut message = format!(
            "{} 지역의 {}년 부동산 시장 전망. {}",
            request.region.trim(),
            self.outlook_year,
            framing
        );

        let query = request.query.trim();
        if !query.is_empty() {
            message.push(' ');
            message.push_str(query);
        }
        message
    }

    /// Join retrieved chunk texts within the character budget.
    ///
    /// Returns the context, the number of chunks used and whether anything was cut.
    pub fn build_context(&self, retrieval: &RetrievalResult) -> (String, usize, bool) {
        const SEPARATOR: &str = "\n\n";

        let mut context = String::new();
        let mut used = 0usize;
        let mut included = 0usize;
        let mut truncated = false;

        for text in retrieval.texts() {
            let separator = if included == 0 { 0 } else { SEPARATOR.len() };
            let length = text.chars().count();

            if used + separator + length <= self.max_context_chars {
                if included > 0 {
                    context.push_str(SEPARATOR);
                }
                context.push_str(text);
                used += separator + length;
                included += 1;
                continue;
            }

            let room = self.max_context_chars.saturating_sub(used + separator);
            if room > 0 {
                if included > 0 {
                    context.push_str(SEPARATOR);
                }
                context.extend(text.chars().take(room));
                included += 1;
            }
            truncated = true;
            break;
        }

        if truncated {
            log::warn!(
                "Context exceeds {} chars; kept {} of {} retrieved chunks",
                self.max_context_chars,
                included,
                retrieval.len()
            );
        }

        (context, included, truncated)
    }

    /// Compose the full model request
    pub fn compose(
        &self,
        request: &AnalysisRequest,
        retrieval: &RetrievalResult,
    ) -> Result<ComposedPrompt> {
        let (context, context_chunks, truncated) = self.build_context(retrieval);
        let system = fill_context(&Self::system_template(request.analysis_type), &context)?;

        Ok(ComposedPrompt {
            system,
            user: self.human_message(request),
            context_chunks,
            truncated,
        })
    }
}

/// Substitute the single context placeholder.
///
/// The template is split once, so placeholder text inside the context itself
/// is left alone.
fn fill_context(template: &str, context: &str) -> Result<String> {
    let (head, tail) = template.split_once(CONTEXT_PLACEHOLDER).ok_or_else(|| {
        RagError::TextProcessing("system template has no context placeholder".to_string())
    })?;

    if tail.contains(CONTEXT_PLACEHOLDER) {
        return Err(RagError::TextProcessing(
            "system template has more than one context placeholder".to_string(),
        ));
    }

    Ok(format!("{}{}{}", head, context, tail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Chunk;

    fn composer(max_context_chars: usize) -> PromptComposer {
        PromptComposer::new(&PromptConfig {
            max_context_chars,
            outlook_year: Some(2025),
        })
    }

    fn retrieval(texts: &[&str]) -> RetrievalResult {
        RetrievalResult::from_ranked_chunks(
            texts
                .iter()
                .enumerate()
                .map(|(index, text)| Chunk {
                    source: "report.pdf".to_string(),
                    page: 0,
                    index,
                    offset: 0,
                    length: text.chars().count(),
                    text: text.to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_rubric_lists_every_level() {
        let rules = PromptComposer::score_rules();
        for score in 1..=7 {
            assert!(rules.contains(&format!("[SCORE:{}]", score)));
        }
        assert!(rules.contains("반드시 [SCORE:점수] 태그로 시작"));
    }

    #[test]
    fn test_templates_differ_by_mode() {
        let summary = PromptComposer::system_template(AnalysisMode::Summary);
        let detailed = PromptComposer::system_template(AnalysisMode::Detailed);

        assert!(summary.contains("두 개의 문단"));
        assert!(detailed.contains("시장 현황, 입지 분석, 리스크, 투자 전략"));
        assert_eq!(summary.matches(CONTEXT_PLACEHOLDER).count(), 1);
        assert_eq!(detailed.matches(CONTEXT_PLACEHOLDER).count(), 1);
        assert!(summary.contains("마크다운"));
    }

    #[test]
    fn test_compose_fills_context_once() {
        let request = AnalysisRequest::new("Gangnam", "", AnalysisMode::Summary);
        let prompt = composer(10_000)
            .compose(&request, &retrieval(&["첫 번째 근거 {context}", "두 번째 근거"]))
            .unwrap();

        assert!(!prompt.system.contains("[Context]:\n{context}"));
        assert!(prompt.system.ends_with("[Context]:\n첫 번째 근거 {context}\n\n두 번째 근거"));
        assert_eq!(prompt.context_chunks, 2);
        assert!(!prompt.truncated);
    }

    #[test]
    fn test_human_message() {
        let composer = composer(100);
        let summary = AnalysisRequest::new(" Gangnam ", "", AnalysisMode::Summary);
        assert_eq!(
            composer.human_message(&summary),
            "Gangnam 지역의 2025년 부동산 시장 전망. 핵심만 간결하게 요약해 주세요."
        );

        let detailed = AnalysisRequest::new("송파구", "재건축 단지 위주로", AnalysisMode::Detailed);
        assert_eq!(
            composer.human_message(&detailed),
            "송파구 지역의 2025년 부동산 시장 전망. 보고서를 바탕으로 자세히 분석해 주세요. 재건축 단지 위주로"
        );
    }

    #[test]
    fn test_truncates_chunks_not_rubric() {
        let long = "가".repeat(30);
        let request = AnalysisRequest::new("마포구", "", AnalysisMode::Detailed);
        let prompt = composer(45)
            .compose(&request, &retrieval(&[&long, &long, &long]))
            .unwrap();

        assert!(prompt.truncated);
        assert_eq!(prompt.context_chunks, 2);
        assert!(prompt.system.contains(&PromptComposer::score_rules()));
        assert!(prompt.system.contains(STYLE_RULES));

        let (context, _, _) = composer(45).build_context(&retrieval(&[&long, &long, &long]));
        assert_eq!(context.chars().count(), 45);
    }

    #[test]
    fn test_empty_retrieval_leaves_empty_context() {
        let request = AnalysisRequest::new("마포구", "", AnalysisMode::Detailed);
        let prompt = composer(100).compose(&request, &RetrievalResult::default()).unwrap();
        assert!(prompt.system.ends_with("[Context]:\n"));
        assert_eq!(prompt.context_chunks, 0);
    }

    #[test]
    fn test_fill_context_requires_single_placeholder() {
        assert!(fill_context("no marker", "x").is_err());
        assert!(fill_context("{context} and {context}", "x").is_err());
        assert_eq!(fill_context("a {context} b", "x").unwrap(), "a x b");
    }
}
