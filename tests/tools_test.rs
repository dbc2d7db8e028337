mod helpers;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use edutor::error::Error;
use edutor::index::types::ContentClass;
use edutor::mailbox::Mailbox;
use edutor::tools::get_content::ContentFormat;
use edutor::tools::{ToolCall, ToolOutput, NO_CONTENT_FALLBACK};
use helpers::{as_index, fast_exchange, tools_over, FixedIndex, IMAGE_URL};

#[tokio::test]
async fn get_content_wraps_a_strong_match_in_a_directive() {
    let text = FixedIndex::new(
        ContentClass::Text,
        &[("A tag <p> define um parágrafo de texto.", 0.9)],
    );
    let tools = tools_over(vec![as_index(&text)], fast_exchange());

    let out = tools
        .get_content("o que é uma tag <p>?", ContentFormat::Text)
        .await
        .unwrap();

    assert!(out.starts_with("Adapte o seguinte conteúdo ao nível do usuário"));
    assert!(out.contains("A tag <p> define um parágrafo de texto."));
    assert_eq!(text.queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn get_content_falls_back_when_every_score_is_low() {
    let video = FixedIndex::new(
        ContentClass::Video,
        &[("Tabelas organizam dados.", 0.6), ("Listas ordenadas.", 0.74)],
    );
    let tools = tools_over(vec![as_index(&video)], fast_exchange());

    let out = tools
        .get_content("como faço uma tabela?", ContentFormat::Video)
        .await
        .unwrap();
    assert_eq!(out, NO_CONTENT_FALLBACK);
}

#[tokio::test]
async fn image_content_carries_the_image_link() {
    let image = FixedIndex::new(ContentClass::Image, &[("Infográfico sobre listas.", 0.82)]);
    let tools = tools_over(vec![as_index(&image)], fast_exchange());

    let out = tools
        .get_content("listas", ContentFormat::Image)
        .await
        .unwrap();
    assert!(out.contains(IMAGE_URL));
    assert!(out.contains("Você é proibido de responder sem enviar o link."));
}

#[tokio::test]
async fn get_content_only_queries_the_requested_format() {
    let text = FixedIndex::new(ContentClass::Text, &[("texto", 0.95)]);
    let video = FixedIndex::new(ContentClass::Video, &[("vídeo", 0.95)]);
    let tools = tools_over(vec![as_index(&text), as_index(&video)], fast_exchange());

    let out = tools.get_content("q", ContentFormat::Video).await.unwrap();
    assert!(out.contains("vídeo"));
    assert_eq!(text.queries.load(Ordering::SeqCst), 0);
    assert_eq!(video.queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_index_is_an_error_not_a_fallback() {
    let tools = tools_over(Vec::new(), fast_exchange());

    let err = tools
        .get_content("q", ContentFormat::Image)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingIndex { class: ContentClass::Image, .. }));
}

#[tokio::test]
async fn php_exercises_are_returned_as_is() {
    let exercises = FixedIndex::new(
        ContentClass::Exercises,
        &[
            ("Exercício 1\nEnunciado: echo", 0.88),
            ("Exercício 2\nEnunciado: arrays", 0.8),
            ("Exercício 3\nEnunciado: classes", 0.5),
        ],
    );
    let tools = tools_over(vec![as_index(&exercises)], fast_exchange());

    let out = tools.get_php_exercises("php echo").await.unwrap();
    assert_eq!(
        out,
        ToolOutput::List(vec![
            "Exercício 1\nEnunciado: echo".into(),
            "Exercício 2\nEnunciado: arrays".into(),
        ])
    );

    let empty = FixedIndex::new(ContentClass::Exercises, &[("nada", 0.1)]);
    let tools = tools_over(vec![as_index(&empty)], fast_exchange());
    let out = tools.get_php_exercises("php").await.unwrap();
    assert_eq!(out, ToolOutput::Text(NO_CONTENT_FALLBACK.into()));
}

#[tokio::test]
async fn send_message_waits_for_the_user_and_adds_reminders() {
    let exchange = fast_exchange();
    let tools = tools_over(Vec::new(), Arc::clone(&exchange));

    let ui = Arc::clone(&exchange);
    let user = tokio::spawn(async move {
        while ui.assistant().len().unwrap() == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        ui.user().append("sou iniciante, prefiro vídeo").unwrap();
    });

    let call = ToolCall::parse("send_message", r#"{"message": "Qual é o seu nível?"}"#).unwrap();
    let out = tools.call(call).await.unwrap().to_string();
    user.await.unwrap();

    assert_eq!(
        exchange.assistant().read().unwrap(),
        vec!["Qual é o seu nível?".to_string()]
    );
    assert!(out.starts_with("sou iniciante, prefiro vídeo\n(Aviso 1 do Sistema"));
    assert!(out.contains("(Aviso 2 do Sistema"));
    // the answer is consumed and will not start a new turn
    assert_eq!(exchange.take_latest_user().unwrap(), None);
}
