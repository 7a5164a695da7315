use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::Article;
use crate::tui::app::{ActivePane, TuiApp, View};
use crate::view::{DisplayState, FeedViewModel};

pub fn render(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    match app.view {
        View::Home => render_home(frame, app, colors),
        View::Archive => render_archive(frame, app, colors),
    }
}

fn render_home(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Filters / freshness
            Constraint::Min(10),   // Body
            Constraint::Length(3), // Spotlight
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let Some(model) = app.model.clone() else {
        render_status_bar(frame, app, chunks[3], colors);
        return;
    };

    render_header(frame, &model, chunks[0], colors);

    if model.state == DisplayState::NoData {
        let message = if model.live_total > 0 {
            "No articles match the current filters"
        } else {
            "No news available. Waiting for the news service..."
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.inactive_border));
        frame.render_widget(Paragraph::new(message).block(block), chunks[1]);
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(7)])
            .split(columns[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        render_featured(frame, app, &model, left[0], colors);
        render_top_stories(frame, &model, left[1], colors);

        let trendy_title = if model.expanded {
            format!(" Trendy (all {}) ", model.trendy.len())
        } else {
            let start = model.windows.trendy_start;
            format!(
                " Trendy [{}-{}] ",
                start,
                start + model.trendy.len().saturating_sub(1)
            )
        };
        render_article_list(
            frame,
            &model.trendy,
            &mut app.trendy_list_state,
            trendy_title,
            app.active_pane == ActivePane::Trendy,
            right[0],
            colors,
        );
        render_article_list(
            frame,
            &model.must_see,
            &mut app.must_see_list_state,
            format!(" Must See [{}] ", model.windows.more_news_start + 1),
            app.active_pane == ActivePane::MustSee,
            right[1],
            colors,
        );
    }

    render_spotlight(frame, &model, chunks[2], colors);
    render_status_bar(frame, app, chunks[3], colors);
}

fn render_header(frame: &mut Frame, model: &FeedViewModel, area: Rect, colors: &ColorConfig) {
    let mut spans = vec![Span::raw(format!(
        " Region: {}  Topic: {}  Verification: {}",
        model.selection.region, model.selection.topic, model.selection.verification
    ))];

    if let Some(updated) = model.updated_at {
        spans.push(Span::styled(
            format!("  Updated {}", updated.with_timezone(&chrono::Local).format("%H:%M:%S")),
            Style::default().fg(colors.metadata_date),
        ));
    }
    if model.using_fallback {
        spans.push(Span::styled(
            "  [offline: showing cached news]",
            Style::default()
                .fg(colors.fallback)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn border_style(active: bool, colors: &ColorConfig) -> Style {
    if active {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    }
}

fn render_featured(
    frame: &mut Frame,
    app: &TuiApp,
    model: &FeedViewModel,
    area: Rect,
    colors: &ColorConfig,
) {
    let is_active = app.active_pane == ActivePane::Featured;
    let position = model
        .featured
        .as_ref()
        .map(|_| format!(" {}/{}", model.windows.featured_index + 1, model.live_count))
        .unwrap_or_default();

    let content = match &model.featured {
        Some(article) => article_details(article, colors),
        None => Text::from("Nothing featured"),
    };

    let block = Block::default()
        .title(format!(" Featured{} ", position))
        .borders(Borders::ALL)
        .border_style(border_style(is_active, colors));

    frame.render_widget(
        Paragraph::new(content).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn article_details<'a>(article: &'a Article, colors: &ColorConfig) -> Text<'a> {
    let verdict = article.verdict();
    let mut lines = vec![
        Line::from(Span::styled(
            article.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("[{}] ", verdict.label()),
                Style::default().fg(colors.verdict(verdict)),
            ),
            Span::styled(
                article.section_label(),
                Style::default().fg(colors.metadata_section),
            ),
            Span::styled(
                format!("  {}", article.display_date()),
                Style::default().fg(colors.metadata_date),
            ),
        ]),
    ];

    if let Some(badge) = article.credibility().badge() {
        lines.push(Line::from(format!("Source: {}", badge)));
    }
    if let Some(url) = &article.web_url {
        lines.push(Line::from(Span::styled(
            url.as_str(),
            Style::default().fg(colors.metadata_link),
        )));
    }
    if let Some(image) = article.image_url() {
        lines.push(Line::from(Span::styled(
            format!("Image: {}", image),
            Style::default().fg(colors.metadata_link),
        )));
    }
    Text::from(lines)
}

fn article_item<'a>(article: &'a Article, colors: &ColorConfig) -> ListItem<'a> {
    let verdict = article.verdict();
    ListItem::new(Line::from(vec![
        Span::styled("● ", Style::default().fg(colors.verdict(verdict))),
        Span::styled(
            format!("{:<10} ", article.section_label()),
            Style::default().fg(colors.metadata_section),
        ),
        Span::raw(article.title.as_str()),
    ]))
}

fn render_article_list(
    frame: &mut Frame,
    articles: &[Article],
    state: &mut ListState,
    title: String,
    is_active: bool,
    area: Rect,
    colors: &ColorConfig,
) {
    let items: Vec<ListItem> = articles.iter().map(|a| article_item(a, colors)).collect();

    let highlight_style = if is_active {
        Style::default()
            .bg(colors.selection_bg)
            .fg(colors.selection_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style(is_active, colors)),
        )
        .highlight_style(highlight_style)
        .highlight_symbol(if is_active { "> " } else { "  " });

    frame.render_stateful_widget(list, area, state);
}

fn render_top_stories(frame: &mut Frame, model: &FeedViewModel, area: Rect, colors: &ColorConfig) {
    let items: Vec<ListItem> = model
        .top_stories
        .iter()
        .map(|a| article_item(a, colors))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Top Stories ")
            .borders(Borders::ALL)
            .border_style(border_style(false, colors)),
    );
    frame.render_widget(list, area);
}

fn render_spotlight(frame: &mut Frame, model: &FeedViewModel, area: Rect, colors: &ColorConfig) {
    let spans: Vec<Span> = model
        .category_picks
        .iter()
        .flat_map(|a| {
            [
                Span::styled(
                    format!(" {}: ", a.section_label()),
                    Style::default().fg(colors.metadata_section),
                ),
                Span::raw(a.title.as_str()),
                Span::raw("  "),
            ]
        })
        .collect();

    let block = Block::default()
        .title(" Spotlight ")
        .borders(Borders::ALL)
        .border_style(border_style(false, colors));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_archive(frame: &mut Frame, app: &mut TuiApp, colors: &ColorConfig) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Archive list
            Constraint::Length(6), // Details of the selection
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let archive = app
        .model
        .as_ref()
        .map(|m| m.archive.clone())
        .unwrap_or_default();

    let title = if archive.has_more {
        format!(" All News ({}/{}) ", archive.shown, archive.total)
    } else {
        format!(" All News ({}) ", archive.total)
    };
    render_article_list(
        frame,
        &archive.articles,
        &mut app.archive_list_state,
        title,
        true,
        chunks[0],
        colors,
    );

    let details = match app.selected_article() {
        Some(article) => article_details(article, colors),
        None if archive.total == 0 => Text::from("Loading all news..."),
        None => Text::from(""),
    };
    frame.render_widget(
        Paragraph::new(details)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style(false, colors)),
            )
            .wrap(Wrap { trim: true }),
        chunks[1],
    );

    render_status_bar(frame, app, chunks[2], colors);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let busy = app.model.as_ref().is_some_and(|m| m.busy);
    let status = if busy {
        "Refreshing news...".to_string()
    } else if let Some(ref msg) = app.status_message {
        msg.clone()
    } else {
        match app.view {
            View::Home => {
                "h/l:Step  j/k:Nav  Tab:Pane  e:Expand  g/t/v:Filters  o:Open  R:Refresh  a:All news  q:Quit"
                    .to_string()
            }
            View::Archive => "j/k:Nav  n:Load more  o:Open  R:Reload  a:Home  q:Quit".to_string(),
        }
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(colors.status_fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}
