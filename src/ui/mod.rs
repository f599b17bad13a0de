//! Terminal rendering for research bundles.
//!
//! Colored section output, a paper table, status lines and a spinner shown
//! while a bundle is being built.

use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use is_terminal::IsTerminal;
use std::time::Duration;

use crate::models::{AnalysisTask, CitationInfo, Count, Paper, ResearchBundle};

/// Get the current terminal width.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(100)
}

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Search,
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Search => "🔍",
    }
}

/// Print a styled status message to stderr.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    match status {
        Status::Success => eprintln!("{} {}", icon.green().bold(), msg),
        Status::Error => eprintln!("{} {}", icon.red().bold(), msg),
        Status::Warning => eprintln!("{} {}", icon.yellow().bold(), msg),
        Status::Info => eprintln!("{} {}", icon.cyan().bold(), msg),
        Status::Search => eprintln!("{} {}", icon.yellow(), msg),
    }
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
}

/// Print search results header.
pub fn print_search_header(query: &str, count: usize, duration: Duration) {
    println!();
    println!(
        "{} Research digest for: \"{}\"",
        status_icon(Status::Search).yellow().bold(),
        query.cyan().bold()
    );
    println!(
        "{} {} papers analyzed in {:.2}s",
        "─".repeat(30).dimmed(),
        count.to_string().green().bold(),
        duration.as_secs_f64()
    );
}

/// Print a divider line as wide as the terminal (at most 80 columns).
pub fn print_divider() {
    println!("{}", "─".repeat(terminal_width().min(80)).dimmed());
}

/// Format a number with commas.
pub fn format_number(n: u64) -> String {
    n.to_string()
        .chars()
        .rev()
        .collect::<Vec<_>>()
        .chunks(3)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
        .chars()
        .rev()
        .collect()
}

fn format_count(count: Count) -> String {
    match count {
        Count::Known(n) => format_number(n),
        Count::Unknown => "unknown".to_string(),
    }
}

/// One-line citation summary; unavailable data never reads as zero.
pub fn citation_summary(info: &CitationInfo) -> String {
    if info.available {
        format!(
            "{} citations, {} references",
            format_count(info.citation_count),
            format_count(info.reference_count)
        )
    } else {
        "Citation data unavailable".to_string()
    }
}

/// Truncate text to fit within the specified width using unicode-aware truncation.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width <= 3 {
        return "...".to_string();
    }

    let char_widths: Vec<(char, usize)> = text
        .chars()
        .map(|c| (c, unicode_width::UnicodeWidthChar::width(c).unwrap_or(1)))
        .collect();

    let total_width: usize = char_widths.iter().map(|(_, w)| *w).sum();
    if total_width <= max_width {
        return text.to_string();
    }

    let mut current_width = 0;
    let mut end_idx = 0;
    for (i, (_, w)) in char_widths.iter().enumerate() {
        if current_width + w > max_width - 3 {
            break;
        }
        current_width += w;
        end_idx = i + 1;
    }

    if end_idx == 0 {
        return "...".to_string();
    }

    let truncated: String = char_widths[..end_idx].iter().map(|(c, _)| *c).collect();
    format!("{}...", truncated)
}

/// Table of papers sized to `width` columns.
pub fn paper_table(papers: &[Paper], width: usize) -> Table {
    let title_width = (width / 2).max(20);
    let author_width = (width / 4).max(15);

    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width.min(u16::MAX as usize) as u16)
        .set_header(vec!["#", "Title", "Authors", "Published"]);

    for (i, paper) in papers.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(truncate_with_ellipsis(&paper.title, title_width)).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&paper.author_line(), author_width)),
            Cell::new(paper.published_iso()),
        ]);
    }
    table
}

/// Render a bundle as uncolored text.
pub fn render_plain(bundle: &ResearchBundle) -> String {
    let analysis = bundle.analysis();
    let mut out = format!("Research digest: {}\n\n", bundle.query());

    for (i, paper) in bundle.papers().iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({})\n   {}\n   {}\n",
            i + 1,
            paper.title,
            paper.published_iso(),
            paper.author_line(),
            paper.url
        ));
    }

    let sections = [
        ("Summary", analysis.summary.clone()),
        ("Explain Like I'm 15", analysis.simplified_explanation.clone()),
        ("Keywords", analysis.keywords.join(", ")),
        ("Trends & Insights", analysis.trends.clone()),
        ("Open Challenges", analysis.open_challenges.clone()),
        ("Citations", citation_summary(bundle.citation_info())),
    ];
    for (title, body) in sections {
        out.push_str(&format!("\n{}:\n{}\n", title, body));
    }

    if !bundle.related_works().is_empty() {
        out.push_str("\nRelated Works:\n");
        for work in bundle.related_works() {
            out.push_str(&format!("- {}\n", work.title));
        }
    }
    out
}

/// Print a bundle with colors and a paper table.
pub fn print_bundle(bundle: &ResearchBundle) {
    let analysis = bundle.analysis();

    print_section("Papers");
    println!("{}", paper_table(bundle.papers(), terminal_width()));

    let text_sections = [
        (AnalysisTask::Summary, "AI Summary", &analysis.summary),
        (
            AnalysisTask::SimplifiedExplanation,
            "Explain Like I'm 15",
            &analysis.simplified_explanation,
        ),
        (AnalysisTask::Trends, "Trends & Insights", &analysis.trends),
        (AnalysisTask::OpenChallenges, "Open Challenges", &analysis.open_challenges),
    ];
    for (task, title, body) in text_sections {
        print_section(title);
        if analysis.is_ok(task) {
            println!("{}", body);
        } else {
            println!("{} {}", status_icon(Status::Warning).yellow(), body.yellow());
        }
    }

    print_section("Keywords");
    if analysis.keywords.is_empty() {
        println!("{}", "No keywords extracted".dimmed());
    } else {
        let tags: Vec<String> = analysis
            .keywords
            .iter()
            .map(|k| k.magenta().to_string())
            .collect();
        println!("{}", tags.join(", "));
    }

    print_section("Citations");
    let summary = citation_summary(bundle.citation_info());
    if bundle.citation_info().available {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.dimmed());
    }

    if !bundle.related_works().is_empty() {
        print_section("Related Works");
        for work in bundle.related_works() {
            println!("  • {}", truncate_with_ellipsis(&work.title, terminal_width().saturating_sub(4)));
        }
    }
    println!();
    print_divider();
}

/// Loading spinner shown while a bundle is built; hidden when stderr is not a terminal.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = if std::io::stderr().is_terminal() {
            indicatif::ProgressBar::new_spinner()
        } else {
            indicatif::ProgressBar::hidden()
        };
        pb.set_style(Self::style("{spinner:.cyan} {msg}", "⠁⠂⠄⡀⢀⠠⠐⠈ "));
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    fn style(template: &str, ticks: &str) -> indicatif::ProgressStyle {
        indicatif::ProgressStyle::with_template(template)
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
            .tick_chars(ticks)
    }

    /// Set the message.
    pub fn set_message(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }

    /// Finish with success message.
    pub fn finish_with_success(&self, msg: &str) {
        self.pb.set_style(Self::style("{spinner:.green} {msg}", "✓✓"));
        self.pb.finish_with_message(msg.to_string());
    }

    /// Finish with error message.
    pub fn finish_with_error(&self, msg: &str) {
        self.pb.set_style(Self::style("{spinner:.red} {msg}", "✗✗"));
        self.pb.finish_with_message(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use crate::analysis::{AnalysisEngine, MockBackend};
    use crate::sources::mock::make_paper;
    use crate::sources::{MockEnrichmentSource, MockPaperSource};
    use std::sync::Arc;

    #[test]
    fn test_status_icon() {
        assert_eq!(status_icon(Status::Success), "✓");
        assert_eq!(status_icon(Status::Error), "✗");
        assert_eq!(status_icon(Status::Search), "🔍");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Hello", 10), "Hello");
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
        assert_eq!(truncate_with_ellipsis("", 10), "");
        assert_eq!(truncate_with_ellipsis("Hello", 3), "...");
        assert_eq!(truncate_with_ellipsis("日本語の論文", 7), "日本...");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1000000), "1,000,000");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(0), "0");
    }

    #[test]
    fn test_citation_summary() {
        assert_eq!(
            citation_summary(&CitationInfo::reported(12345u64, 40u64)),
            "12,345 citations, 40 references"
        );
        assert_eq!(
            citation_summary(&CitationInfo::reported(0u64, None::<u64>)),
            "0 citations, unknown references"
        );
        assert_eq!(
            citation_summary(&CitationInfo::unavailable()),
            "Citation data unavailable"
        );
    }

    #[test]
    fn test_paper_table_lists_every_paper() {
        let papers = vec![
            make_paper("2401.00001v1", "A Study of Graphs", "a"),
            make_paper("2401.00002v1", "Transformers Everywhere", "b"),
        ];
        let rendered = paper_table(&papers, 100).to_string();

        assert!(rendered.contains("A Study of Graphs"));
        assert!(rendered.contains("Transformers Everywhere"));
        assert!(rendered.contains("2024-03-01"));
    }

    #[tokio::test]
    async fn test_render_plain() {
        let aggregator = Aggregator::new(
            Arc::new(MockPaperSource::with_papers(vec![make_paper(
                "2401.00001v1",
                "A Study of Graphs",
                "a",
            )])),
            Arc::new(MockEnrichmentSource::new()),
            AnalysisEngine::new(Arc::new(MockBackend::new())),
        );
        let bundle = aggregator.build_bundle("graphs").await.unwrap();

        let text = render_plain(&bundle);

        assert!(text.starts_with("Research digest: graphs\n"));
        assert!(text.contains("1. A Study of Graphs (2024-03-01)"));
        assert!(text.contains("\nSummary:\nmock summary\n"));
        assert!(text.contains("\nKeywords:\nmock keywords\n"));
        assert!(text.contains("\nCitations:\nCitation data unavailable\n"));
        assert!(!text.contains("Related Works"));
    }
}
