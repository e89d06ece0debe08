//! End-to-end tests of the extraction service with an in-process tagger.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use entmark::patterns::PatternSet;
use entmark::{EntityService, Highlighter, MarkerStyle, NerError, RawSpan, Result, Tagger};

/// Returns fixed spans for known texts and counts calls.
#[derive(Default)]
struct Scripted {
    answers: Vec<(&'static str, Vec<RawSpan>)>,
    calls: Arc<AtomicUsize>,
    fail_batch: bool,
    fail_on: Option<&'static str>,
}

#[async_trait]
impl Tagger for Scripted {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn tag(&self, text: &str) -> Result<Vec<RawSpan>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(text) {
            return Err(NerError::Processing("model choked".into()));
        }
        Ok(self
            .answers
            .iter()
            .find(|(t, _)| *t == text)
            .map(|(_, spans)| spans.clone())
            .unwrap_or_default())
    }

    async fn tag_batch(&self, texts: &[String]) -> Result<Vec<Vec<RawSpan>>> {
        if self.fail_batch {
            return Err(NerError::Processing("batch endpoint down".into()));
        }
        let mut out = Vec::new();
        for text in texts {
            out.push(self.tag(text).await?);
        }
        Ok(out)
    }
}

const CONTACT: &str = "Contact John Smith at john.smith@company.com or call (555) 123-4567.";
const APPLE: &str = "Apple makes phones. Apple also makes laptops.";

fn scripted() -> Scripted {
    Scripted {
        answers: vec![
            (CONTACT, vec![RawSpan::new(8, 18, "PERSON")]),
            (APPLE, vec![RawSpan::new(0, 5, "ORG"), RawSpan::new(20, 25, "ORG")]),
        ],
        ..Scripted::default()
    }
}

fn service_with_patterns(tagger: Scripted) -> EntityService {
    EntityService::new(Box::new(tagger)).with_patterns(Some(PatternSet::builtin()))
}

#[tokio::test]
async fn contact_example_end_to_end() {
    let service = service_with_patterns(scripted());
    let out = service.extract(Some(CONTACT)).await.unwrap();

    assert_eq!(out.total_entities, 1);
    assert_eq!(out.entities_by_type.len(), 1);
    assert_eq!(out.entities_by_type["PERSON"], vec!["John Smith"]);
    assert_eq!(out.people, vec!["John Smith"]);

    let custom = out.custom_entities.as_ref().unwrap();
    assert_eq!(custom.get("EMAIL").unwrap(), ["john.smith@company.com"]);
    assert!(custom.get("PHONE").unwrap().is_empty());

    assert!(out.highlighted_html.starts_with(
        "Contact <span class=\"entity-mark entity-PERSON\">John Smith <small>[PERSON]</small></span> at"
    ));

    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["entities"][0]["start"], 8);
    assert_eq!(json["entities"][0]["end"], 18);
    assert!(json["custom_entities"]["SSN"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn grouped_lists_are_deduplicated_raw_list_is_not() {
    let service = EntityService::new(Box::new(scripted()));
    let out = service.extract(Some(APPLE)).await.unwrap();

    assert_eq!(out.entities_by_type["ORG"], vec!["Apple"]);
    assert_eq!(out.organizations, vec!["Apple"]);
    assert_eq!(out.entities.len(), 2);
    assert_eq!(out.total_entities, 2);
}

#[tokio::test]
async fn custom_entities_absent_without_patterns() {
    let service = EntityService::new(Box::new(scripted()));
    let out = service.extract(Some(CONTACT)).await.unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert!(json.get("custom_entities").is_none());
}

#[tokio::test]
async fn empty_input_never_reaches_the_tagger() {
    let tagger = scripted();
    let calls = Arc::clone(&tagger.calls);
    let service = EntityService::new(Box::new(tagger));

    for text in [None, Some("")] {
        let err = service.extract(text).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    let err = service.batch(Some(Vec::<String>::new().as_slice())).await.unwrap_err();
    assert_eq!(err.to_string(), "No texts provided");
    assert!(service.batch(None).await.is_err());

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batch_preserves_order_and_previews() {
    let service = EntityService::new(Box::new(scripted())).with_preview_chars(7);
    let texts = vec![APPLE.to_string(), CONTACT.to_string()];
    let out = service.batch(Some(texts.as_slice())).await.unwrap();

    assert_eq!(out.results.len(), 2);
    assert_eq!(out.results[0].text, "Apple m...");
    assert_eq!(out.results[0].entities.len(), 2);
    assert_eq!(out.results[1].text, "Contact...");
    assert_eq!(out.results[1].entities[0].text, "John Smith");
    assert_eq!(out.results[1].entities[0].label, "PERSON");
    assert!(out.results.iter().all(|r| r.error.is_none()));
}

#[tokio::test]
async fn batch_isolates_failing_items() {
    let tagger = Scripted {
        fail_batch: true,
        fail_on: Some("poison"),
        ..scripted()
    };
    let service = EntityService::new(Box::new(tagger));
    let texts = vec![APPLE.to_string(), "poison".to_string(), CONTACT.to_string()];
    let out = service.batch(Some(texts.as_slice())).await.unwrap();

    assert_eq!(out.results.len(), 3);
    assert_eq!(out.results[0].entities.len(), 2);
    assert!(out.results[0].error.is_none());

    assert_eq!(out.results[1].text, "poison...");
    assert!(out.results[1].entities.is_empty());
    assert!(out.results[1].error.as_deref().unwrap().contains("model choked"));

    assert_eq!(out.results[2].entities.len(), 1);
}

#[tokio::test]
async fn invalid_tagger_spans_are_processing_errors() {
    let tagger = Scripted {
        answers: vec![("tiny", vec![RawSpan::new(2, 40, "ORG")])],
        ..Scripted::default()
    };
    let service = EntityService::new(Box::new(tagger));
    let err = service.extract(Some("tiny")).await.unwrap_err();
    assert!(matches!(err, NerError::Processing(_)));
    assert_eq!(err.status_code(), 500);
}

#[tokio::test]
async fn health_reports_model() {
    let service = EntityService::new(Box::new(scripted()));
    service.start().await.unwrap();
    let health = serde_json::to_value(service.health()).unwrap();
    assert_eq!(health, serde_json::json!({"status": "healthy", "model": "scripted"}));
}

#[tokio::test]
async fn inline_markers_use_legend_colours() {
    let service = EntityService::new(Box::new(scripted()))
        .with_highlighter(Highlighter::new(MarkerStyle::Inline, Default::default()));
    let out = service.extract(Some(APPLE)).await.unwrap();
    assert!(out.highlighted_html.starts_with("<mark style=\"background-color: #7aecec;"));
}

#[tokio::test]
async fn extract_all_combines_entities_and_patterns() {
    let service = EntityService::new(Box::new(scripted()));
    let out = service.extract_all(CONTACT).await.unwrap();
    assert_eq!(out.standard_entities.len(), 1);
    assert_eq!(out.standard_entities[0].description, "People, including fictional");
    assert_eq!(out.custom_entities.get("EMAIL").unwrap().len(), 1);
}

#[tokio::test]
async fn analysis_helpers_through_the_service() {
    let service = EntityService::new(Box::new(scripted()));

    let summary = service.analyze(APPLE).await.unwrap();
    assert_eq!(summary.entity_counts["ORG"], 2);
    assert_eq!(summary.entities_by_type["ORG"], vec!["Apple", "Apple"]);
    assert_eq!(summary.most_common_entities[0], ("Apple".to_string(), 2));

    let anon = service.anonymize(CONTACT, &[]).await.unwrap();
    assert!(anon.starts_with("Contact [PERSON] at john.smith@company.com"));

    let contexts = service.contexts(APPLE, "Apple", 3).await.unwrap();
    assert_eq!(contexts, vec!["Apple ma", "s. Apple al"]);

    let linked = service.link(CONTACT).await.unwrap();
    assert_eq!(
        linked[0].wiki_url.as_deref(),
        Some("https://en.wikipedia.org/wiki/John_Smith")
    );
}
