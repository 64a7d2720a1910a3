//! Behavioural tests for the scripted assistant through the public API.

use std::sync::Arc;
use std::time::Duration;

use blissful::assistant::{structured_data, Assistant, MockAssistant};
use blissful::cancel::{run_cancellable, CancelToken};
use blissful::catalog::{Catalog, InMemoryCatalog};
use blissful::config::LatencyConfig;
use blissful::models::{AnswerValue, ChatMessage, DiagnosisAnswers, Sender, UserProfile};
use blissful::picker::SeededPicker;
use blissful::rules::{ANXIETY_REPLY, REMINDER_REPLY, SLEEP_REPLY};
use blissful::script::{join_fragments, DEMO_STREAM_TEXT};
use blissful::AssistantError;
use futures::StreamExt;
use tokio::time::Instant;

fn catalog() -> Arc<InMemoryCatalog> {
    Arc::new(InMemoryCatalog::with_defaults())
}

fn assistant() -> MockAssistant {
    MockAssistant::new(catalog(), LatencyConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_sleep_inputs_always_get_sleep_reply() {
    let a = assistant();
    for text in ["sleep", "I can't SLEEP", "Sleepy reminder please", "feeling anxious, no sleep"] {
        let reply = a.chat(&[], text).await.unwrap();
        assert_eq!(reply.reply.text, SLEEP_REPLY, "input: {}", text);
        assert!(reply.grounding_metadata.is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn test_olympics_grounding_is_fixed() {
    let a = assistant();
    for text in ["Who won the Olympics?", "olympics: who won gold"] {
        let reply = a.chat(&[], text).await.unwrap();
        let grounding = reply.grounding_metadata.expect("grounding present");
        let uris: Vec<&str> = grounding
            .chunks()
            .iter()
            .map(|c| c.source_uri.as_str())
            .collect();
        assert_eq!(
            uris,
            vec![
                "https://olympics.com/paris-2024/en/results",
                "https://en.wikipedia.org/wiki/2024_Summer_Olympics_medal_table",
            ]
        );
    }
    // Only one of the two keywords: no grounding.
    let reply = a.chat(&[], "tell me about the olympics").await.unwrap();
    assert!(reply.grounding_metadata.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_unmatched_input_is_echoed_verbatim() {
    let a = assistant();
    for text in ["Good morning!", "What's new in \"Focus\"?", "ÜNÏCÖDE text"] {
        let reply = a.chat(&[], text).await.unwrap();
        assert!(reply.reply.text.contains(text));
        assert!(reply.grounding_metadata.is_none());
    }
}

#[tokio::test(start_paused = true)]
async fn test_recommendations_never_exceed_catalog() {
    let recs = assistant().recommendations("user123").await.unwrap();
    assert_eq!(recs.len(), 3);

    let small = InMemoryCatalog::new(blissful::catalog::default_catalog()[..2].to_vec());
    let recs = MockAssistant::new(Arc::new(small), LatencyConfig::default())
        .recommendations("user123")
        .await
        .unwrap();
    assert_eq!(recs.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_recommendations_do_not_touch_catalog() {
    let store = catalog();
    let before = store.snapshot().await.unwrap().to_vec();
    let a = MockAssistant::new(store.clone(), LatencyConfig::default());
    a.recommendations("u").await.unwrap();
    a.prescription(&DiagnosisAnswers::new()).await.unwrap();
    assert_eq!(store.snapshot().await.unwrap().to_vec(), before);
}

#[tokio::test(start_paused = true)]
async fn test_stream_reconstructs_demo_sentence() {
    let stream = assistant().stream_chat(&[], "hi").await.unwrap();
    let fragments: Vec<String> = stream.map(|f| f.unwrap()).collect().await;
    assert_eq!(join_fragments(&fragments), DEMO_STREAM_TEXT);
}

#[tokio::test(start_paused = true)]
async fn test_stream_is_rerun_per_call() {
    let a = assistant();
    let first: Vec<String> = a
        .stream_chat(&[], "x")
        .await
        .unwrap()
        .map(|f| f.unwrap())
        .collect()
        .await;
    let second: Vec<String> = a
        .stream_chat(&[], "x")
        .await
        .unwrap()
        .map(|f| f.unwrap())
        .collect()
        .await;
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn test_stream_early_drop() {
    let start = Instant::now();
    let mut stream = assistant().stream_chat(&[], "x").await.unwrap();
    assert!(stream.next().await.is_some());
    drop(stream);
    // Nothing left running: advancing time does not panic or produce output.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(start.elapsed() >= Duration::from_millis(1100));
}

#[tokio::test(start_paused = true)]
async fn test_structured_data_is_idempotent() {
    let a = assistant();
    let none1: Option<UserProfile> = structured_data(&a, "random prompt").await;
    let none2: Option<UserProfile> = structured_data(&a, "random prompt").await;
    assert!(none1.is_none() && none2.is_none());

    let p1: Option<UserProfile> = structured_data(&a, "load user profile details").await;
    let p2: Option<UserProfile> = structured_data(&a, "load user profile details").await;
    assert_eq!(p1, p2);
    let profile = p1.unwrap();
    assert_eq!(profile.name, "John Doe");
    assert_eq!(profile.preferences, vec!["meditation", "sleep stories"]);
    assert_eq!(profile.last_session, "Morning Dew Meditation");
}

#[tokio::test(start_paused = true)]
async fn test_reminder_scenario() {
    let reply = assistant()
        .chat(&[], "I need help with reminder")
        .await
        .unwrap();
    assert_eq!(
        reply.reply.text,
        "Okay, I can help set a reminder. Which audio and for what time?"
    );
    assert_eq!(reply.reply.text, REMINDER_REPLY);
    assert!(reply.grounding_metadata.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_anxiety_scenario() {
    let reply = assistant().chat(&[], "feeling anxious today").await.unwrap();
    assert_eq!(reply.reply.text, ANXIETY_REPLY);
    assert!(reply.reply.text.contains("Anxiety Release Ambient"));
}

#[tokio::test(start_paused = true)]
async fn test_history_does_not_change_routing() {
    let history = vec![
        ChatMessage::user("I feel anxious"),
        ChatMessage::assistant("Sorry to hear that."),
    ];
    let reply = assistant().chat(&history, "set a reminder").await.unwrap();
    assert_eq!(reply.reply.text, REMINDER_REPLY);
    assert_eq!(reply.reply.sender, Sender::Assistant);
    assert!(history.iter().all(|m| m.id != reply.reply.id));
}

#[tokio::test(start_paused = true)]
async fn test_seeded_prescriptions_repeat() {
    let mut answers = DiagnosisAnswers::new();
    answers.insert("q1".into(), AnswerValue::List(vec!["Stress".into()]));
    answers.insert("q2".into(), AnswerValue::Number(3.0));

    let pick = |seed| {
        MockAssistant::new(catalog(), LatencyConfig::default())
            .with_picker(Arc::new(SeededPicker::new(seed)))
    };
    let (a, b) = (pick(11), pick(11));
    for _ in 0..5 {
        let x = a.prescription(&answers).await.unwrap();
        let y = b.prescription(&answers).await.unwrap();
        assert_eq!(x.id, y.id);
        assert_eq!(x.title, "Personalized Relaxation Mix");
    }
}

#[tokio::test(start_paused = true)]
async fn test_prescription_accepts_any_answers() {
    let mut answers = DiagnosisAnswers::new();
    answers.insert("unknown".into(), AnswerValue::Text("whatever".into()));
    let item = assistant().prescription(&answers).await.unwrap();
    assert!(item.id.starts_with("audio"));
}

#[tokio::test(start_paused = true)]
async fn test_empty_catalog_is_not_fatal() {
    let empty = MockAssistant::new(
        Arc::new(InMemoryCatalog::new(vec![])),
        LatencyConfig::default(),
    );
    assert!(empty.recommendations("u").await.unwrap().is_empty());
    assert!(matches!(
        empty.prescription(&DiagnosisAnswers::new()).await,
        Err(AssistantError::EmptyCatalog)
    ));
    // Chat still works.
    assert!(empty.chat(&[], "hi").await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_are_independent() {
    let a = Arc::new(assistant());
    let start = Instant::now();

    let chat = {
        let a = Arc::clone(&a);
        tokio::spawn(async move { a.chat(&[], "sleep").await })
    };
    let recs = {
        let a = Arc::clone(&a);
        tokio::spawn(async move { a.recommendations("u").await })
    };
    let prescription = {
        let a = Arc::clone(&a);
        tokio::spawn(async move { a.prescription(&DiagnosisAnswers::new()).await })
    };

    assert_eq!(chat.await.unwrap().unwrap().reply.text, SLEEP_REPLY);
    assert_eq!(recs.await.unwrap().unwrap().len(), 3);
    prescription.await.unwrap().unwrap();

    // Delays overlap rather than add up.
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1200) && elapsed < Duration::from_millis(1300));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_chat_never_completes() {
    let a = assistant();
    let token = CancelToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let result = run_cancellable(&token, a.chat(&[], "sleep")).await;
    assert!(matches!(result, Err(AssistantError::Cancelled)));
    assert!(start.elapsed() < Duration::from_millis(700));
}

#[tokio::test(start_paused = true)]
async fn test_favorites_are_external_to_assistant() {
    let store = catalog();
    let a = MockAssistant::new(store.clone(), LatencyConfig::default());
    let before = a.recommendations("u").await.unwrap();
    assert!(!before[1].is_favorite);

    store.set_favorite("audio002", true).await.unwrap();
    let after = a.recommendations("u").await.unwrap();
    assert!(after[1].is_favorite);
}
