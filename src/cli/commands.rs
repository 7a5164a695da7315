use std::fmt::Write as _;

use chrono::{Local, Utc};
use tracing::{info, warn};

use crate::app::{AppContext, Result};
use crate::domain::{Article, FeedKey, FeedSnapshot};
use crate::fetcher::{FeedOutcome, FetchCoordinator, TitleCheck, TitleChecker};
use crate::filter::FilterSelection;
use crate::scheduler::interval::format_interval;
use crate::view::{DisplayState, FeedSession, FeedViewModel, ViewInputs};

pub async fn live(ctx: &AppContext, selection: FilterSelection) -> Result<()> {
    let report = ctx.coordinator.refresh_cycle().await;
    if let FeedOutcome::Failed(e) = &report.live {
        eprintln!("Live feed unavailable: {}", e);
    }

    let mut session = ctx.session().with_selection(selection);
    let model = build_home(&ctx.coordinator, &mut session, false);
    print!("{}", format_home(&model));
    Ok(())
}

pub async fn all(ctx: &AppContext, pages: usize) -> Result<()> {
    let outcome = ctx.coordinator.load_archive().await;
    let archive = ctx.coordinator.snapshot(&FeedKey::Archive);

    if let FeedOutcome::Failed(e) = &outcome {
        if archive.is_empty() {
            eprintln!("All news unavailable: {}", e);
            return Ok(());
        }
        eprintln!("Could not reach the news service, showing cached news: {}", e);
    }

    let mut session = ctx.session();
    let mut model = build_archive(&mut session, &archive);
    for _ in 1..pages.max(1) {
        if !model.archive.has_more {
            break;
        }
        let _ = session.load_more_archive();
        model = build_archive(&mut session, &archive);
    }

    print!("{}", format_archive(&model));
    Ok(())
}

/// Run the refresh scheduler headless and print the live feed whenever its
/// contents change. Stops on SIGINT or SIGTERM.
pub async fn watch(ctx: &AppContext, selection: FilterSelection) -> Result<()> {
    let interval = ctx.config.refresh_interval()?;
    let scheduler = ctx.scheduler()?;
    let mut live = ctx.coordinator.subscribe(&FeedKey::Live);
    let mut session = ctx.session().with_selection(selection);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    println!(
        "Refreshing every {}. Press Ctrl-C to stop.",
        format_interval(interval)
    );
    scheduler.open();

    let mut last_generation = None;
    loop {
        tokio::select! {
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    warn!("Signal handler failed: {}", e);
                }
                break;
            }
            changed = live.changed() => {
                if changed.is_err() {
                    break;
                }
                let generation = live.borrow_and_update().generation;
                if last_generation == Some(generation) {
                    continue;
                }
                last_generation = Some(generation);

                let model = build_home(&ctx.coordinator, &mut session, scheduler.is_busy());
                println!("--- {} ---", Local::now().format("%H:%M:%S"));
                print!("{}", format_home(&model));
            }
        }
    }

    info!("Stopping watch");
    scheduler.close();
    scheduler.shutdown().await;
    Ok(())
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Ask the news service whether `title` reads as real news.
pub async fn check(
    checker: &impl TitleChecker,
    title: &str,
    use_meta_model: bool,
) -> Result<()> {
    let model = if use_meta_model { "search-backed" } else { "default" };
    info!("Checking title with the {} model", model);
    let check = checker.check_title(title, use_meta_model).await?;
    print!("{}", format_title_check(&check));
    Ok(())
}

pub fn cache_status(ctx: &AppContext) -> Result<()> {
    match &ctx.cache_path {
        Some(path) => println!("Cache: {}", path.display()),
        None => println!("Cache: disabled"),
    }

    let entries = ctx.cache.status(Utc::now());
    if entries.is_empty() {
        println!("No cached feeds");
        return Ok(());
    }

    for entry in entries {
        let articles = entry
            .articles
            .map(|n| n.to_string())
            .unwrap_or_else(|| "corrupt".to_string());
        let state = if entry.valid { "valid" } else { "expired" };
        println!(
            "{:<28} {:>8} articles  {:<7}  expires {}",
            entry.key,
            articles,
            state,
            entry.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

pub fn cache_clear(ctx: &AppContext) -> Result<()> {
    let removed = ctx.cache.clear();
    println!("Removed {} cached feeds", removed);
    Ok(())
}

fn build_home(
    coordinator: &FetchCoordinator,
    session: &mut FeedSession,
    busy: bool,
) -> FeedViewModel {
    let live = coordinator.snapshot(&FeedKey::Live);
    let secondary = coordinator.snapshot(&coordinator.secondary_feed());
    let spotlight = coordinator.spotlight();
    let archive = FeedSnapshot::default();

    session.build(ViewInputs {
        live: &live,
        secondary: &secondary,
        spotlight: &spotlight,
        archive: &archive,
        busy,
    })
}

fn build_archive(session: &mut FeedSession, archive: &FeedSnapshot) -> FeedViewModel {
    let empty = FeedSnapshot::default();
    session.build(ViewInputs {
        live: &empty,
        secondary: &empty,
        spotlight: &empty,
        archive,
        busy: false,
    })
}

fn format_article(article: &Article) -> String {
    let date = article.display_date();
    let date = if date.is_empty() {
        " ".repeat(10)
    } else {
        date
    };
    format!(
        "{:<10} {} [{}] {}",
        article.verdict().label(),
        date,
        article.section_label(),
        article.title
    )
}

fn format_home(model: &FeedViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Region: {}  Topic: {}  Verification: {}",
        model.selection.region, model.selection.topic, model.selection.verification
    );
    if model.using_fallback {
        let _ = writeln!(out, "(offline: showing cached news)");
    }

    if model.state == DisplayState::NoData {
        let message = if model.live_total > 0 {
            "No articles match the current filters"
        } else {
            "No news available"
        };
        let _ = writeln!(out, "{}", message);
        return out;
    }

    if let Some(featured) = &model.featured {
        let _ = writeln!(out, "\nFeatured");
        let _ = writeln!(out, "  {}", format_article(featured));
        if let Some(url) = &featured.web_url {
            let _ = writeln!(out, "  {}", url);
        }
    }

    let sections: [(&str, &[Article]); 3] = [
        ("Top Stories", &model.top_stories),
        ("Trendy", &model.trendy),
        ("Must See", &model.must_see),
    ];
    for (title, articles) in sections {
        if articles.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{}", title);
        for article in articles {
            let _ = writeln!(out, "  {}", format_article(article));
        }
    }

    if !model.category_picks.is_empty() {
        let _ = writeln!(out, "\nSpotlight");
        for article in &model.category_picks {
            let _ = writeln!(out, "  {}", format_article(article));
        }
    }
    out
}

fn format_title_check(check: &TitleCheck) -> String {
    let mut out = String::new();
    let mut details = Vec::new();
    if let Some(verdict) = &check.verdict {
        details.push(format!("verdict {}", verdict));
    }
    if let Some(confidence) = check.confidence {
        details.push(format!("confidence {}%", confidence));
    }
    if details.is_empty() {
        let _ = writeln!(out, "{}!", check.label());
    } else {
        let _ = writeln!(out, "{}! ({})", check.label(), details.join(", "));
    }

    if let Some(analysis) = check.detailed_analysis.as_deref().map(str::trim) {
        if !analysis.is_empty() {
            let _ = writeln!(out, "\n{}", analysis);
        }
    }

    if !check.search_results.is_empty() {
        let _ = writeln!(out, "\nSources");
        for hit in &check.search_results {
            let _ = writeln!(out, "  {} ({})", hit.title, hit.source);
            if !hit.link.is_empty() {
                let _ = writeln!(out, "  {}", hit.link);
            }
        }
    }
    out
}

fn format_archive(model: &FeedViewModel) -> String {
    let archive = &model.archive;
    if archive.total == 0 {
        return "No news available\n".to_string();
    }

    let mut out = String::new();
    for (i, article) in archive.articles.iter().enumerate() {
        let _ = writeln!(out, "{:>4}. {}", i + 1, format_article(article));
    }
    let _ = writeln!(out, "\nShowing {} of {} articles", archive.shown, archive.total);
    if archive.has_more {
        let _ = writeln!(out, "Use --pages to show more");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::app::{FetchError, NewsError};
    use crate::domain::SnapshotOrigin;
    use crate::fetcher::title_check::SearchHit;
    use crate::filter::Verification;

    /// Answers every title check with a fixed result and records requests.
    struct ScriptedChecker {
        answer: std::result::Result<TitleCheck, FetchError>,
        requests: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl TitleChecker for ScriptedChecker {
        async fn check_title(
            &self,
            title: &str,
            use_meta_model: bool,
        ) -> std::result::Result<TitleCheck, FetchError> {
            self.requests
                .lock()
                .unwrap()
                .push((title.to_string(), use_meta_model));
            self.answer.clone()
        }
    }

    fn plain_check(prediction: bool) -> TitleCheck {
        TitleCheck {
            prediction,
            verdict: None,
            confidence: None,
            detailed_analysis: None,
            search_results: Vec::new(),
        }
    }

    fn snapshot(ids: std::ops::RangeInclusive<i64>) -> FeedSnapshot {
        let articles = ids
            .map(|id| {
                let mut article = Article::new(id, format!("Story {}", id));
                article.prediction = id % 2 == 0;
                article
            })
            .collect();
        FeedSnapshot::default().replaced(articles, SnapshotOrigin::Network)
    }

    fn home(session: &mut FeedSession, live: &FeedSnapshot) -> FeedViewModel {
        let empty = FeedSnapshot::default();
        session.build(ViewInputs {
            live,
            secondary: &empty,
            spotlight: &empty,
            archive: &empty,
            busy: false,
        })
    }

    #[test]
    fn test_format_article_shows_verdict() {
        let mut article = Article::new(1, "Storm hits coast");
        article.prediction = false;
        article.section_name = Some("World".to_string());
        let line = format_article(&article);
        assert!(line.starts_with("Flagged"));
        assert!(line.contains("[World] Storm hits coast"));
    }

    #[test]
    fn test_format_home_sections() {
        let mut session = FeedSession::default();
        let out = format_home(&home(&mut session, &snapshot(1..=10)));
        assert!(out.contains("Featured\n  "));
        assert!(out.contains("Top Stories"));
        assert!(out.contains("Trendy"));
        assert!(!out.contains("Must See"));
    }

    #[test]
    fn test_format_home_distinguishes_empty_states() {
        let mut session = FeedSession::default();
        let out = format_home(&home(&mut session, &FeedSnapshot::default()));
        assert!(out.contains("No news available"));

        let mut session = FeedSession::default()
            .with_selection(FilterSelection::verification(Verification::Fake));
        let out = format_home(&home(&mut session, &snapshot(2..=2)));
        assert!(out.contains("No articles match the current filters"));
    }

    #[tokio::test]
    async fn test_check_sends_title_and_model_choice() {
        let checker = ScriptedChecker {
            answer: Ok(plain_check(true)),
            requests: Mutex::new(Vec::new()),
        };
        check(&checker, "Storm hits coast", true).await.unwrap();
        assert_eq!(
            *checker.requests.lock().unwrap(),
            vec![("Storm hits coast".to_string(), true)]
        );

        let failing = ScriptedChecker {
            answer: Err(FetchError::Network("connection refused".into())),
            requests: Mutex::new(Vec::new()),
        };
        let err = check(&failing, "Storm hits coast", false).await.unwrap_err();
        assert!(matches!(err, NewsError::Fetch(FetchError::Network(_))));
    }

    #[test]
    fn test_format_title_check() {
        assert_eq!(format_title_check(&plain_check(false)), "Fake news!\n");

        let check = TitleCheck {
            prediction: true,
            verdict: Some("TRUE".to_string()),
            confidence: Some(85.0),
            detailed_analysis: Some("VERDICT: TRUE\n".to_string()),
            search_results: vec![SearchHit {
                title: "Rain in Kochi".to_string(),
                source: "Onmanorama".to_string(),
                snippet: String::new(),
                link: "https://example.com/1".to_string(),
            }],
        };
        let out = format_title_check(&check);
        assert!(out.starts_with("Real news! (verdict TRUE, confidence 85%)\n"));
        assert!(out.contains("\nVERDICT: TRUE\n"));
        assert!(out.contains("Sources\n  Rain in Kochi (Onmanorama)\n  https://example.com/1\n"));
    }

    #[test]
    fn test_archive_pages() {
        let archive = snapshot(1..=30);
        let mut session = FeedSession::default();
        let model = build_archive(&mut session, &archive);
        let out = format_archive(&model);
        assert!(out.contains("Showing 12 of 30 articles"));
        assert!(out.contains("--pages"));

        let _ = session.load_more_archive();
        let _ = session.load_more_archive();
        let out = format_archive(&build_archive(&mut session, &archive));
        assert!(out.contains("Showing 30 of 30 articles"));
        assert!(!out.contains("--pages"));
    }
}
