//! Stub upstream for engine unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use gua_providers::{
    ApiConfig, GenerateFut, GenerationOutput, GenerationRequest, TextGenerator, UpstreamError,
};
use gua_types::{Cast, DivinationResult, ModelName, NonEmptyString};

use crate::parse_analysis;

enum Reply {
    Text(Option<String>),
    Fail(String),
}

/// Counts calls and remembers the last request.
pub struct StubGenerator {
    reply: Reply,
    calls: AtomicUsize,
    last: Mutex<Option<GenerationRequest>>,
}

impl StubGenerator {
    pub fn answering(text: Option<String>) -> Self {
        Self::with_reply(Reply::Text(text))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_reply(Reply::Fail(message.to_string()))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last.lock().unwrap().clone()
    }
}

impl TextGenerator for StubGenerator {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn generate<'a>(
        &'a self,
        _config: &'a ApiConfig,
        request: GenerationRequest,
    ) -> GenerateFut<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request);
        let result = match &self.reply {
            Reply::Text(text) => Ok(GenerationOutput {
                text: text.clone(),
                usage: None,
            }),
            Reply::Fail(message) => Err(UpstreamError::Blocked(message.clone())),
        };
        Box::pin(async move { result })
    }
}

pub fn test_config() -> ApiConfig {
    ApiConfig::new(None, ModelName::analysis_default()).with_base_url("http://127.0.0.1:9")
}

pub fn analysis_json() -> String {
    serde_json::json!({
        "upperTrigramDetail": "乾在外，其势刚健。",
        "lowerTrigramDetail": "坤在内，其心柔顺。",
        "imagery": "天地不交，万物不通。",
        "judgement": "否之匪人，不利君子贞。",
        "lineInterpretation": "初爻动，拔茅茹以其汇，转为无妄。",
        "overallAdvice": "守正不动，静待其时。",
        "followUps": ["何时转机？", "宜守宜进？", "贵人何在？"]
    })
    .to_string()
}

pub fn sample_result() -> DivinationResult {
    DivinationResult::new(
        NonEmptyString::new("此行能否顺利？").unwrap(),
        Cast::new(1, 8, 1).unwrap(),
        parse_analysis(&analysis_json()).unwrap(),
    )
}
