use anyhow::{Context, Result};
use page_i18n::animation::TracingAnimation;
use page_i18n::app::{PageApp, UiEvent};
use page_i18n::config::Config;
use page_i18n::dom::{Document, Element, NodeId, I18N_ATTR};
use page_i18n::i18n::{FileStorage, HttpDictionaryFetcher};
use page_i18n::ui::{HEADER_ID, LANG_SHORT_ID, LANG_TOGGLE_ID, SPINNER_ID};
use std::sync::Arc;
use tracing::info;

/// Headless preview: boots a small page against a live dictionary server
/// and prints the painted strings.
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("page_i18n=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!("Loading dictionaries from {}", config.base_url);

    let (doc, toggle) = preview_document();
    let source = HttpDictionaryFetcher::new(&config.base_url, config.fetch_timeout)
        .context("Failed to build HTTP client")?;

    let app = PageApp::new(
        doc.into(),
        Arc::new(source),
        Box::new(FileStorage::new(&config.preference_file)),
        Arc::new(TracingAnimation::new()),
        &config,
    );

    app.handle(UiEvent::DomContentLoaded { scroll_y: 0.0 }).await;
    app.handle(UiEvent::WindowLoad).await;
    print_strings(&app);

    if std::env::args().any(|arg| arg == "--toggle") {
        let outcome = app.handle(UiEvent::Click { target: toggle }).await;
        info!("Toggle finished: {:?}", outcome);
        print_strings(&app);
    }

    Ok(())
}

fn preview_document() -> (Document, NodeId) {
    let mut doc = Document::new();
    let header = doc.append(Element::new("header").with_id(HEADER_ID));
    doc.append_child(
        header,
        Element::new("a").with_attr(I18N_ATTR, "nav.home").with_text("Home"),
    );
    let toggle = doc.append_child(header, Element::new("button").with_id(LANG_TOGGLE_ID));
    doc.append_child(toggle, Element::new("span").with_id(LANG_SHORT_ID).with_text("AR"));
    doc.append_child(toggle, Element::new("span").with_id(SPINNER_ID));
    doc.append(
        Element::new("h1")
            .with_attr(I18N_ATTR, "hero.title")
            .with_attr("data-aso", "fade-up")
            .with_text("Welcome"),
    );
    doc.append(
        Element::new("p")
            .with_attr(I18N_ATTR, "hero.subtitle")
            .with_text("We build things."),
    );
    (doc, toggle)
}

fn print_strings(app: &PageApp) {
    let doc = app.document().lock();
    println!("lang={} dir={}", doc.lang, doc.dir);
    for el in doc.translatable() {
        println!(
            "  [{}] {}",
            el.i18n_key().unwrap_or_default(),
            el.text
        );
    }
}
