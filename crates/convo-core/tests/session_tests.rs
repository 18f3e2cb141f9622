use convo_core::document::PlainTextExtractor;
use convo_core::llm::{GeminiClient, LlmResponse, OpenAIClient};
use convo_core::*;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Replays canned replies and records every message list it was sent.
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    seen: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<&str, &str>>) -> (Self, Arc<Mutex<Vec<Vec<Message>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let client = Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            seen: seen.clone(),
        };
        (client, seen)
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse, ConvoError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_string()));
        match next {
            Ok(text) => Ok(LlmResponse {
                message: Message::assistant(text),
                usage: None,
            }),
            Err(e) => Err(ConvoError::Llm(e)),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

fn session_with(replies: Vec<Result<&str, &str>>) -> (ChatSession, Arc<Mutex<Vec<Vec<Message>>>>) {
    let (client, seen) = ScriptedClient::new(replies);
    (ChatSession::new(ModelGateway::new(Box::new(client))), seen)
}

/// Poster lookup that knows a fixed set of titles and fails on one.
struct FakePosters;

#[async_trait::async_trait]
impl PosterLookup for FakePosters {
    async fn lookup(&self, title: &str) -> Result<Option<Poster>, ConvoError> {
        match title {
            "Inception" => Ok(Some(Poster {
                url: Some("https://img/inception.jpg".into()),
                rating: Some(8.4),
            })),
            "Her" => Ok(Some(Poster {
                url: None,
                rating: Some(7.9),
            })),
            "Up" => Err(ConvoError::Lookup("rate limited".into())),
            _ => Ok(None),
        }
    }
}

// ========================================================================
// ChatSession: message-list mode
// ========================================================================

#[tokio::test]
async fn test_send_records_user_then_assistant() {
    let (mut session, seen) = session_with(vec![Ok("Hi!"), Ok("Fine, thanks.")]);

    assert_eq!(session.send("Hello").await.unwrap(), "Hi!");
    assert_eq!(session.send("How are you?").await.unwrap(), "Fine, thanks.");

    let turns = session.history().all();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[0], Message::user("Hello"));
    assert_eq!(turns[1], Message::assistant("Hi!"));
    assert_eq!(turns[3], Message::assistant("Fine, thanks."));

    // Second request replays the first exchange before the new question
    let requests = seen.lock().unwrap();
    assert_eq!(requests[1].len(), 3);
    assert_eq!(requests[1][2].content(), "How are you?");
}

#[tokio::test]
async fn test_send_failure_leaves_history_unchanged() {
    let (mut session, _) = session_with(vec![Ok("first"), Err("503 upstream")]);

    session.send("one").await.unwrap();
    let before = session.history().len();

    let err = session.send("two").await.unwrap_err();
    assert!(err.is_gateway_failure());
    assert!(err.to_string().contains("503 upstream"));
    assert_eq!(session.history().len(), before);
    assert_eq!(session.history().latest_user().unwrap().content(), "one");
}

#[tokio::test]
async fn test_send_respects_context_window() {
    let (mut session, seen) = session_with(vec![Ok("a1"), Ok("a2"), Ok("a3")]);
    session = session.with_assembler(
        PromptAssembler::new().with_window(ContextWindow::last_turns(2)),
    );

    session.send("q1").await.unwrap();
    session.send("q2").await.unwrap();
    session.send("q3").await.unwrap();

    let requests = seen.lock().unwrap();
    let last = &requests[2];
    assert_eq!(last.len(), 3);
    assert_eq!(last[0].content(), "q2");
    assert_eq!(last[2].content(), "q3");
    // Display still has everything
    assert_eq!(session.history().len(), 6);
}

// ========================================================================
// ChatSession: flattened document mode
// ========================================================================

#[tokio::test]
async fn test_ask_document_sends_single_flattened_prompt() {
    let (mut session, seen) = session_with(vec![Ok("It is a lease."), Ok("Two years.")]);
    session.set_document_text("LEASE AGREEMENT between A and B for two years");

    session.ask_document("What is this?").await.unwrap();
    session.ask_document("How long?").await.unwrap();

    let requests = seen.lock().unwrap();
    assert_eq!(requests[1].len(), 1);
    assert_eq!(requests[1][0].role(), Role::User);
    assert_eq!(
        requests[1][0].content(),
        "You are helping analyze a PDF document. PDF CONTENT: LEASE AGREEMENT between A and B for two years\nUser question: How long?"
    );
    // History shows both questions even though only the last was sent
    assert_eq!(session.history().len(), 4);
}

#[tokio::test]
async fn test_document_is_truncated_to_assembler_limit() {
    let (mut session, seen) = session_with(vec![Ok("ok")]);
    session = session.with_assembler(PromptAssembler::new().with_max_document_chars(5));

    let block = session.set_document_text("abcdefghij");
    assert_eq!(block.text(), "abcde");

    session.ask_document("q").await.unwrap();
    let requests = seen.lock().unwrap();
    assert!(requests[0][0].content().contains("PDF CONTENT: abcde\n"));
    assert!(!requests[0][0].content().contains("abcdef"));
}

#[tokio::test]
async fn test_unreadable_document_becomes_empty_context() {
    let (mut session, seen) = session_with(vec![Ok("no document available")]);

    let block = session.load_document(b"not a pdf", &PdfTextExtractor);
    assert!(block.is_empty());

    session.ask_document("summarize").await.unwrap();
    let requests = seen.lock().unwrap();
    assert_eq!(requests[0][0].content(), "\nUser question: summarize");
}

#[tokio::test]
async fn test_new_document_replaces_old() {
    let (mut session, _) = session_with(vec![]);
    session.load_document(b"first file", &PlainTextExtractor);
    session.load_document(b"second file", &PlainTextExtractor);
    assert_eq!(session.document().unwrap().text(), "second file");

    session.clear_document();
    assert!(session.document().is_none());
}

#[tokio::test]
async fn test_ask_document_failure_leaves_history_unchanged() {
    let (mut session, _) = session_with(vec![Err("timeout")]);
    session.set_document_text("text");

    assert!(session.ask_document("q").await.is_err());
    assert!(session.history().is_empty());
}

// ========================================================================
// ChatSession: template flows
// ========================================================================

#[tokio::test]
async fn test_plan_trip_parses_sections() {
    let (mut session, seen) = session_with(vec![Ok(
        "THINKING:\nKyoto is compact.\nFINAL ITINERARY:\nDay 1: Fushimi Inari",
    )]);
    let request = TripRequest {
        destination: "Kyoto".into(),
        days: 1,
        budget: BudgetTier::Low,
        interests: vec!["shrines".into()],
    };

    let parsed = session.plan_trip(&request).await.unwrap();
    assert_eq!(parsed.reasoning, "Kyoto is compact.");
    assert_eq!(parsed.final_answer, "Day 1: Fushimi Inari");

    let requests = seen.lock().unwrap();
    assert!(requests[0][0].content().contains("Destination: Kyoto"));
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn test_plan_trip_without_marker_falls_back() {
    let (mut session, _) = session_with(vec![Ok("Just go and enjoy.")]);
    let request = TripRequest {
        destination: "Oslo".into(),
        days: 2,
        budget: BudgetTier::Medium,
        interests: vec![],
    };

    let parsed = session.plan_trip(&request).await.unwrap();
    assert_eq!(parsed.reasoning, "");
    assert_eq!(parsed.final_answer, "Just go and enjoy.");
}

#[tokio::test]
async fn test_recommend_movies_tolerates_lookup_misses() {
    let (mut session, _) = session_with(vec![Ok(
        "Inception, Up, NonexistentMovieXYZ123, Her, Arrival, Coco",
    )]);
    session = session.with_poster_lookup(Box::new(FakePosters));
    let request = MovieRequest {
        genre: "Sci-Fi".into(),
        mood: "curious".into(),
        language: "English".into(),
        min_rating: 7.0,
    };

    let picks = session.recommend_movies(&request).await.unwrap();
    assert_eq!(picks.len(), 5);
    assert_eq!(picks[0].poster.as_ref().unwrap().rating, Some(8.4));
    // Lookup error and lookup miss both end up without a poster
    assert!(picks[1].poster.is_none());
    assert!(picks[2].poster.is_none());
    // Rating without artwork is kept
    let her = picks[3].poster.as_ref().unwrap();
    assert_eq!(her.url, None);
    assert_eq!(her.rating, Some(7.9));
    assert_eq!(picks[4].title, "Arrival");
}

#[tokio::test]
async fn test_recommend_movies_without_lookup_has_no_posters() {
    let (mut session, _) = session_with(vec![Ok("A, B")]);
    let request = MovieRequest {
        genre: "Drama".into(),
        mood: "sad".into(),
        language: "French".into(),
        min_rating: 6.0,
    };

    let picks = session.recommend_movies(&request).await.unwrap();
    assert_eq!(picks.len(), 2);
    assert!(picks.iter().all(|p| p.poster.is_none()));
}

#[tokio::test]
async fn test_reset_starts_a_fresh_session() {
    let (mut session, _) = session_with(vec![Ok("hi")]);
    let first_id = session.id();
    session.send("hello").await.unwrap();
    session.set_document_text("doc");

    session.reset();
    assert_ne!(session.id(), first_id);
    assert!(session.history().is_empty());
    assert!(session.document().is_none());
    assert_eq!(session.usage().request_count, 1);
}

// ========================================================================
// HTTP boundaries (wiremock)
// ========================================================================

#[tokio::test]
async fn test_gemini_client_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "Hello"}]},
                {"role": "model", "parts": [{"text": "Hi"}]},
                {"role": "user", "parts": [{"text": "Bye"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Good"}, {"text": "bye!"}]}}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key").with_base_url(server.uri());
    let mut gateway = ModelGateway::new(Box::new(client));
    let reply = gateway
        .generate(ModelInput::Conversation(vec![
            Message::user("Hello"),
            Message::assistant("Hi"),
            Message::user("Bye"),
        ]))
        .await
        .unwrap();

    assert_eq!(reply, "Goodbye!");
    assert_eq!(gateway.usage().total_input_tokens, 12);
    assert_eq!(gateway.usage().total_output_tokens, 3);
}

#[tokio::test]
async fn test_gemini_api_error_is_surfaced_and_history_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key").with_base_url(server.uri());
    let mut session = ChatSession::new(ModelGateway::new(Box::new(client)));

    let err = session.send("Hello").await.unwrap_err();
    assert!(matches!(err, ConvoError::Llm(ref msg) if msg.contains("quota exceeded")));
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_gemini_empty_candidates_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key").with_base_url(server.uri());
    let mut gateway = ModelGateway::new(Box::new(client));
    let result = gateway.generate(ModelInput::Prompt("hi".into())).await;
    assert!(matches!(result, Err(ConvoError::Llm(_))));
}

#[tokio::test]
async fn test_openai_client_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "llama-3.3-70b-versatile",
            "temperature": 0.5,
            "max_tokens": 256,
            "messages": [
                {"role": "user", "content": "Hello"},
                {"role": "assistant", "content": "Hi"},
                {"role": "user", "content": "Bye"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Goodbye!"}}],
            "usage": {"prompt_tokens": 9, "completion_tokens": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAIClient::new("sk-test")
        .with_base_url(server.uri())
        .with_model("llama-3.3-70b-versatile")
        .with_temperature(Some(0.5))
        .with_max_tokens(Some(256));
    let mut gateway = ModelGateway::new(Box::new(client));
    let reply = gateway
        .generate(ModelInput::Conversation(vec![
            Message::user("Hello"),
            Message::assistant("Hi"),
            Message::user("Bye"),
        ]))
        .await
        .unwrap();

    assert_eq!(reply, "Goodbye!");
    assert_eq!(gateway.model(), "llama-3.3-70b-versatile");
    assert_eq!(gateway.usage().total_input_tokens, 9);
    assert_eq!(gateway.usage().total_output_tokens, 2);
}

#[tokio::test]
async fn test_openai_client_without_key_omits_auth_and_unset_options() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("")
        .with_base_url(server.uri())
        .with_model("mistral");
    let mut gateway = ModelGateway::new(Box::new(client));
    let reply = gateway
        .generate(ModelInput::Prompt("ping".into()))
        .await
        .unwrap();
    assert_eq!(reply, "ok");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));

    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["model"], "mistral");
    assert_eq!(body["messages"], json!([{"role": "user", "content": "ping"}]));
    assert!(body.get("temperature").is_none());
    assert!(body.get("max_tokens").is_none());
}

#[tokio::test]
async fn test_openai_api_error_is_surfaced_and_history_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
    let mut session = ChatSession::new(ModelGateway::new(Box::new(client)));

    let err = session.send("Hello").await.unwrap_err();
    assert!(matches!(err, ConvoError::Llm(ref msg) if msg.contains("upstream down")));
    assert!(err.is_gateway_failure());
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_openai_empty_choices_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
    let mut gateway = ModelGateway::new(Box::new(client));
    let result = gateway.generate(ModelInput::Prompt("hi".into())).await;
    assert!(matches!(result, Err(ConvoError::Llm(_))));
    assert_eq!(gateway.usage().request_count, 0);
}

#[tokio::test]
async fn test_tmdb_lookup_hit_and_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "Inception"))
        .and(query_param("api_key", "tmdb-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "Inception", "poster_path": "/abc.jpg", "vote_average": 8.4}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "NonexistentMovieXYZ123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(query_param("query", "Obscure Short"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "Obscure Short", "poster_path": null, "vote_average": 6.1}]
        })))
        .mount(&server)
        .await;

    let lookup = TmdbPosterLookup::new("tmdb-key")
        .with_base_url(server.uri())
        .with_image_base_url("https://img.test/w500");

    let hit = lookup.lookup("Inception").await.unwrap().unwrap();
    assert_eq!(hit.url.as_deref(), Some("https://img.test/w500/abc.jpg"));
    assert_eq!(hit.rating, Some(8.4));

    assert!(lookup.lookup("NonexistentMovieXYZ123").await.unwrap().is_none());

    let rating_only = lookup.lookup("Obscure Short").await.unwrap().unwrap();
    assert_eq!(rating_only.url, None);
    assert_eq!(rating_only.rating, Some(6.1));
}

#[tokio::test]
async fn test_tmdb_lookup_hit_without_image_or_rating_is_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "Lost Reel", "poster_path": null}]
        })))
        .mount(&server)
        .await;

    let lookup = TmdbPosterLookup::new("tmdb-key").with_base_url(server.uri());
    assert!(lookup.lookup("Lost Reel").await.unwrap().is_none());
}

#[tokio::test]
async fn test_tmdb_lookup_server_error_is_lookup_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let lookup = TmdbPosterLookup::new("bad").with_base_url(server.uri());
    let err = lookup.lookup("Heat").await.unwrap_err();
    assert!(matches!(err, ConvoError::Lookup(_)));
}
