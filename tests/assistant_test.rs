//! The assistant session running against a real recipe store.

mod helpers;

use helpers::{KeywordEmbedder, RecordingModel};
use larder::assistant::prompt::{PromptTemplate, NO_CONTEXT};
use larder::assistant::{AssistantSession, Retriever, FALLBACK_NOTICE};
use larder::embedding::EmbeddingProvider;
use larder::recipes::retriever::RecipeRetriever;
use larder::recipes::search::SearchParams;
use std::sync::{Arc, Mutex};

const KEYWORDS: &[(&str, u16)] = &[("egg", 1), ("potato", 2), ("leek", 3), ("basil", 4)];

fn retriever(recipes: &[(&str, &str)]) -> RecipeRetriever {
    let embedder = KeywordEmbedder::new(KEYWORDS);
    let mut conn = helpers::test_db();
    for (title, content) in recipes {
        let text = format!("Recipe: {title}\n{content}");
        let embedding = embedder.embed(&text).unwrap();
        helpers::insert_recipe(&mut conn, title, content, &embedding);
    }

    RecipeRetriever::new(
        Arc::new(Mutex::new(conn)),
        Arc::new(embedder),
        SearchParams {
            max_results: 3,
            min_similarity: 0.3,
        },
    )
}

fn pantry() -> RecipeRetriever {
    retriever(&[
        ("Omelette", "Beat two eggs, cook in butter."),
        ("Potato Leek Soup", "Sweat leeks, add potatoes and broth, blend."),
        ("Pesto", "Pound basil, garlic, pine nuts and olive oil."),
    ])
}

#[tokio::test]
async fn retriever_returns_matching_documents() {
    let documents = pantry().retrieve("What can I cook with eggs?").await.unwrap();
    assert_eq!(documents, vec!["Recipe: Omelette\nBeat two eggs, cook in butter.".to_string()]);
}

#[tokio::test]
async fn retriever_returns_nothing_for_unknown_ingredients() {
    let documents = pantry().retrieve("chocolate cake").await.unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn retriever_on_empty_store_returns_nothing() {
    let documents = retriever(&[]).retrieve("eggs").await.unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn grounded_answer_has_no_fallback() {
    let model = Arc::new(RecordingModel::new("Make an omelette."));
    let mut session = AssistantSession::new(Arc::new(pantry()), model.clone(), PromptTemplate::default());

    let response = session.query("I have eggs").await.unwrap();

    assert_eq!(response, "Make an omelette.");
    assert_eq!(session.documents().len(), 1);
    let prompts = model.prompts.lock().unwrap();
    assert!(prompts[0].contains("New Context: Recipe: Omelette\nBeat two eggs"));
    assert!(!prompts[0].contains(NO_CONTEXT));
}

#[tokio::test]
async fn ungrounded_answer_gets_fallback_notice() {
    let model = Arc::new(RecordingModel::new("Maybe try baking?"));
    let mut session = AssistantSession::new(Arc::new(pantry()), model.clone(), PromptTemplate::default());

    let response = session.query("chocolate cake").await.unwrap();

    assert_eq!(response, format!("Maybe try baking?{FALLBACK_NOTICE}"));
    assert!(session.documents().is_empty());
    assert_eq!(session.history()[0].response, "Maybe try baking?");
    assert!(model.prompts.lock().unwrap()[0].contains(&format!("New Context: {NO_CONTEXT}")));
}

#[tokio::test]
async fn conversation_carries_over_between_turns() {
    let model = Arc::new(RecordingModel::new("Here you go."));
    let mut session = AssistantSession::new(Arc::new(pantry()), model.clone(), PromptTemplate::default());

    session.query("something with potatoes").await.unwrap();
    session.query("and with basil?").await.unwrap();

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Interaction 1\nUser: something with potatoes\nAssistant: Here you go.\n"));
    assert!(prompts[1].contains("Interaction 2 \nNew Context: Recipe: Pesto"));
    // documents are per-query: the soup is not carried into the second prompt's context
    assert!(!prompts[1].contains("New Context: Recipe: Potato Leek Soup"));
    assert_eq!(session.history().len(), 2);
}
