//! Markdown export of a research bundle.

use std::path::{Path, PathBuf};

use crate::models::{CitationInfo, Paper, ResearchBundle};

/// Longest query slug kept in a suggested filename
pub const MAX_SLUG_LEN: usize = 100;

/// A rendered markdown document and the filename it should be saved under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub content: String,
    pub suggested_filename: String,
}

impl ExportDocument {
    /// Write the document into `dir` under its suggested filename, creating `dir` if needed.
    ///
    /// Returns the path written.
    pub fn write_to_dir(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.suggested_filename);
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }
}

/// Render a bundle as markdown.
///
/// Pure: the same bundle always renders to the same bytes.
pub fn export_document(bundle: &ResearchBundle) -> ExportDocument {
    let analysis = bundle.analysis();
    let mut content = format!(
        "# Research Summary: {}\n\n## Papers Found ({})\n\n",
        bundle.query(),
        bundle.papers().len()
    );

    for (i, paper) in bundle.papers().iter().enumerate() {
        content.push_str(&paper_section(i + 1, paper));
    }

    content.push_str(&format!(
        "\n## AI Summary\n\n{}\n\n\
         ## Explain Like I'm 15\n\n{}\n\n\
         ## Keywords\n\n{}\n\n\
         ## Trends & Insights\n\n{}\n\n\
         ## Open Challenges\n\n{}\n\n\
         ## Citation Information\n\n{}\n\n\
         ## Related Works\n\n",
        analysis.summary,
        analysis.simplified_explanation,
        analysis.keywords.join(", "),
        analysis.trends,
        analysis.open_challenges,
        citation_lines(bundle.citation_info()),
    ));

    for work in bundle.related_works() {
        content.push_str(&format!("- {}\n", work.title));
    }

    ExportDocument {
        content,
        suggested_filename: suggested_filename(bundle.query()),
    }
}

fn paper_section(index: usize, paper: &Paper) -> String {
    format!(
        "### {}. {}\n\n\
         **Authors:** {}\n\
         **Published:** {}\n\
         **URL:** {}\n\n\
         **Abstract:**\n{}\n\n---\n\n",
        index,
        paper.title,
        paper.author_line(),
        paper.published_iso(),
        paper.url,
        paper.r#abstract
    )
}

fn citation_lines(info: &CitationInfo) -> String {
    if info.available {
        format!(
            "**Citations:** {}\n**References:** {}",
            info.citation_count, info.reference_count
        )
    } else {
        "Citation data unavailable.".to_string()
    }
}

/// Filename for an exported query: `research_summary_{slug}.md`.
///
/// Whitespace becomes `_`; only ASCII letters, digits, `-` and `_` survive,
/// so the name never contains a path separator.
pub fn suggested_filename(query: &str) -> String {
    let slug: String = query
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .take(MAX_SLUG_LEN)
        .collect();

    if slug.is_empty() {
        "research_summary_query.md".to_string()
    } else {
        format!("research_summary_{}.md", slug)
    }
}
