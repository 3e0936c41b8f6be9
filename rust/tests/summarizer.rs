use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use repo_lens::config::SummarizerConfig;
use repo_lens::summarizer::{
    build_prompt, build_summarizer, summarize_code_snippet, ChatSummarizer, ExtractiveSummarizer,
    Snippet, MAX_INPUT_CHARS,
};
use repo_lens::{Language, Symbol, SymbolKind};
use serde_json::{json, Value};
use tokio::net::TcpListener;

fn symbol(doc: Option<&str>) -> Symbol {
    Symbol {
        name: "check_palindrome".to_string(),
        qualified_name: "check_palindrome".to_string(),
        kind: SymbolKind::Function,
        start_line: 1,
        end_line: 3,
        signature: "def check_palindrome(word)".to_string(),
        doc: doc.map(str::to_string),
        is_async: false,
    }
}

const CODE: &str = "def check_palindrome(word):\n    return word == word[::-1]";

/// Serve `app` on an ephemeral port and return its base URL.
async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn config(base_url: String) -> SummarizerConfig {
    SummarizerConfig {
        base_url: Some(base_url),
        api_key: Some("secret".to_string()),
        timeout_secs: 5,
        ..SummarizerConfig::default()
    }
}

#[test]
fn prompt_names_the_language_and_is_truncated() {
    let sym = symbol(None);
    let long = "x".repeat(MAX_INPUT_CHARS * 2);
    let snippet = Snippet {
        language: Language::Python,
        code: &long,
        symbol: &sym,
    };
    let prompt = build_prompt(&snippet);
    assert!(prompt.starts_with("summarize this python function: "));
    assert_eq!(
        prompt.len(),
        "summarize this python function: ".len() + MAX_INPUT_CHARS
    );
}

#[tokio::test]
async fn extractive_uses_docstring_then_signature() {
    let documented = symbol(Some("Check if a word is a palindrome.\n\nLonger notes."));
    let snippet = Snippet {
        language: Language::Python,
        code: CODE,
        symbol: &documented,
    };
    assert_eq!(
        summarize_code_snippet(&ExtractiveSummarizer, &snippet).await,
        "Check if a word is a palindrome."
    );

    let bare = symbol(None);
    let snippet = Snippet {
        language: Language::Python,
        code: CODE,
        symbol: &bare,
    };
    let summary = summarize_code_snippet(&ExtractiveSummarizer, &snippet).await;
    assert!(summary.contains("def check_palindrome(word)"));
}

#[tokio::test]
async fn chat_summarizer_posts_prompt_and_reads_first_choice() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(
                headers.get("authorization").and_then(|v| v.to_str().ok()),
                Some("Bearer secret")
            );
            assert_eq!(body["max_tokens"], 50);
            let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
            assert!(prompt.starts_with("summarize this python function: def check_palindrome"));
            Json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "  Checks for palindromes.\n" } }]
            }))
        }),
    );
    let base_url = spawn(app).await;
    let summarizer = ChatSummarizer::new(&config(base_url)).unwrap();

    let sym = symbol(None);
    let snippet = Snippet {
        language: Language::Python,
        code: CODE,
        symbol: &sym,
    };
    assert_eq!(
        summarize_code_snippet(&summarizer, &snippet).await,
        "Checks for palindromes."
    );
}

#[tokio::test]
async fn chat_errors_become_error_strings() {
    let app = Router::new()
        .route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model loading") }),
        )
        .route(
            "/v2/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
    let base_url = spawn(app).await;
    let sym = symbol(None);
    let snippet = Snippet {
        language: Language::Python,
        code: CODE,
        symbol: &sym,
    };

    let unavailable = build_summarizer(&config(base_url.clone())).unwrap();
    let summary = summarize_code_snippet(unavailable.as_ref(), &snippet).await;
    assert!(summary.starts_with("Error: "), "{summary}");
    assert!(summary.contains("503"));
    assert!(summary.contains("model loading"));

    let empty = ChatSummarizer::new(&config(base_url.replace("/v1", "/v2"))).unwrap();
    assert_eq!(
        summarize_code_snippet(&empty, &snippet).await,
        "Error: No choices in API response"
    );
}

#[test]
fn backend_follows_configuration() {
    let offline = build_summarizer(&SummarizerConfig::default()).unwrap();
    assert_eq!(offline.name(), "extractive");

    let online = build_summarizer(&config("http://127.0.0.1:1/v1".to_string())).unwrap();
    assert_eq!(online.name(), "chat");
}
