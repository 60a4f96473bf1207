//! Static HTML rendering of a [`TestReport`].
//!
//! Output layout:
//! - `index.html` - run summary, per-class test results, coverage tables
//! - `coverage.css` - stylesheet shared by every page
//! - `classes/<name>.html`, `triggers/<name>.html` - annotated source pages
//!
//! Pages are handlebars templates embedded in the binary. Every interpolated
//! value goes through [`escape_html`]; view structs carry display-ready strings
//! so the templates contain no logic beyond `if` and `each`.

use crate::error::{ReportError, Result};
use crate::format::format_seconds;
use crate::model::EntityKind;
use crate::report::{CoverageResult, Percentage, TestClassResult, TestReport};
use crate::source::SourceIndex;
use handlebars::Handlebars;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CSS_FILENAME: &str = "coverage.css";
pub const INDEX_FILENAME: &str = "index.html";

const STYLESHEET: &str = include_str!("assets/coverage.css");

const INDEX_TEMPLATE: &str = "index";
const COVERAGE_TEMPLATE: &str = "coverage";
const COVERAGE_TABLE_PARTIAL: &str = "coverage_table";

const START_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Escape text for HTML element content and quoted attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const fn status_class(ok: bool) -> &'static str {
    if ok { "success" } else { "failure" }
}

/// Link target for `path` relative to `out_dir`, with `/` separators.
fn relative_href(out_dir: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(out_dir).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Serialize)]
struct IndexView<'a> {
    start_time: String,
    total_time: String,
    tests_run: u32,
    failures: u32,
    failures_class: &'static str,
    total_coverage: String,
    total_coverage_class: &'static str,
    coverage_warning: Option<&'a str>,
    test_classes: Vec<TestClassView<'a>>,
    classes: Vec<CoverageRowView<'a>>,
    triggers: Vec<CoverageRowView<'a>>,
}

#[derive(Serialize)]
struct TestClassView<'a> {
    name: &'a str,
    rows: Vec<TestRowView<'a>>,
}

#[derive(Serialize)]
struct TestRowView<'a> {
    row_class: &'static str,
    method_name: &'a str,
    result: &'static str,
    time: String,
    message: &'a str,
    stack_trace: &'a str,
    debug_log: Option<String>,
}

#[derive(Serialize)]
struct CoverageRowView<'a> {
    row_class: &'static str,
    name: &'a str,
    href: String,
    percentage: String,
    covered: u32,
    total: u32,
    warning: &'a str,
}

#[derive(Serialize)]
struct CoveragePageView<'a> {
    name: &'a str,
    percentage: String,
    covered: u32,
    total: u32,
    lines: Vec<SourceLineView<'a>>,
}

#[derive(Serialize)]
struct SourceLineView<'a> {
    number: u32,
    css_class: &'static str,
    text: &'a str,
}

/// Files written by [`Renderer::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub index: PathBuf,
    pub stylesheet: PathBuf,
    pub coverage_pages: Vec<PathBuf>,
}

/// HTML report renderer.
pub struct Renderer {
    registry: Handlebars<'static>,
    coverage_target: u32,
}

impl Renderer {
    /// Build a renderer judging coverage against `coverage_target` percent.
    ///
    /// # Errors
    ///
    /// Returns an error if an embedded template fails to parse.
    pub fn new(coverage_target: u32) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(escape_html);
        registry.register_template_string(
            INDEX_TEMPLATE,
            include_str!("templates/index.html.hbs"),
        )?;
        registry.register_template_string(
            COVERAGE_TEMPLATE,
            include_str!("templates/coverage.html.hbs"),
        )?;
        registry.register_partial(
            COVERAGE_TABLE_PARTIAL,
            include_str!("templates/coverage_table.html.hbs"),
        )?;

        Ok(Self {
            registry,
            coverage_target,
        })
    }

    /// Write the full report tree under `out_dir`.
    ///
    /// # Errors
    ///
    /// - `CreateDir` / `OpenFile` / `Io` on filesystem failures
    /// - `SourceNotFound` if a covered entity has no source file
    /// - `Template` if a page fails to render
    pub fn render(
        &self,
        report: &TestReport,
        sources: &SourceIndex,
        out_dir: &Path,
    ) -> Result<RenderOutput> {
        create_dir(out_dir)?;
        let stylesheet = deploy_stylesheet(out_dir)?;

        let mut coverage_pages = Vec::new();
        for kind in [EntityKind::Class, EntityKind::Trigger] {
            let dir = out_dir.join(kind.dir_name());
            create_dir(&dir)?;
            for (name, coverage) in report.coverage(kind) {
                let src = sources.resolve(coverage)?;
                let source = fs::read_to_string(src).map_err(|e| ReportError::open_file(src, e))?;
                let page = dir.join(format!("{name}.html"));
                write_file(&page, &self.render_coverage_page(coverage, &source)?)?;
                coverage_pages.push(page);
            }
        }

        let index = out_dir.join(INDEX_FILENAME);
        write_file(&index, &self.render_index(report, out_dir)?)?;

        info!(
            out_dir = %out_dir.display(),
            pages = coverage_pages.len(),
            "Rendered test report"
        );

        Ok(RenderOutput {
            index,
            stylesheet,
            coverage_pages,
        })
    }

    /// Render `index.html`. Debug log links are made relative to `out_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_index(&self, report: &TestReport, out_dir: &Path) -> Result<String> {
        let summary = report.summary();
        let total = report.total_coverage();

        let view = IndexView {
            start_time: summary.start_time.format(START_TIME_FORMAT).to_string(),
            total_time: format_seconds(summary.total_time),
            tests_run: summary.tests_run,
            failures: summary.tests_failed,
            failures_class: status_class(summary.tests_failed == 0),
            total_coverage: total.to_string(),
            total_coverage_class: status_class(total.meets(self.coverage_target)),
            coverage_warning: summary.coverage_warning.as_deref(),
            test_classes: report
                .test_classes()
                .values()
                .map(|tcr| test_class_view(tcr, out_dir))
                .collect(),
            classes: self.coverage_rows(report, EntityKind::Class),
            triggers: self.coverage_rows(report, EntityKind::Trigger),
        };

        Ok(self.registry.render(INDEX_TEMPLATE, &view)?)
    }

    /// Render one annotated source page.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_coverage_page(&self, coverage: &CoverageResult, source: &str) -> Result<String> {
        let lines = source
            .lines()
            .zip(1u32..)
            .map(|(text, number)| SourceLineView {
                number,
                css_class: coverage.line_status(number).css_class(),
                text,
            })
            .collect();

        let view = CoveragePageView {
            name: coverage.name(),
            percentage: coverage
                .percentage()
                .map_or_else(|| "-".to_string(), |pct| pct.to_string()),
            covered: coverage.num_locations_covered(),
            total: coverage.num_locations(),
            lines,
        };

        debug!(entity = coverage.name(), "Rendering coverage page");
        Ok(self.registry.render(COVERAGE_TEMPLATE, &view)?)
    }

    fn coverage_rows<'a>(&self, report: &'a TestReport, kind: EntityKind) -> Vec<CoverageRowView<'a>> {
        report
            .coverage(kind)
            .values()
            .map(|ccr| {
                let pct = ccr.percentage();
                CoverageRowView {
                    row_class: self.row_class(pct, ccr.warning().is_some()),
                    name: ccr.name(),
                    href: format!("{}/{}.html", kind.dir_name(), ccr.name()),
                    percentage: pct.map_or_else(|| " - ".to_string(), |p| p.to_string()),
                    covered: ccr.num_locations_covered(),
                    total: ccr.num_locations(),
                    warning: ccr.warning().unwrap_or(""),
                }
            })
            .collect()
    }

    /// Meeting the target wins; otherwise a warning marks the row as failing.
    fn row_class(&self, pct: Option<Percentage>, has_warning: bool) -> &'static str {
        if pct.is_some_and(|p| p.meets(self.coverage_target)) {
            "dataRow success"
        } else if has_warning {
            "dataRow failure"
        } else {
            "dataRow"
        }
    }
}

fn test_class_view<'a>(tcr: &'a TestClassResult, out_dir: &Path) -> TestClassView<'a> {
    let log_href = |method: &str| tcr.debug_log(method).map(|p| relative_href(out_dir, p));

    let successes = tcr.successes().iter().map(|s| TestRowView {
        row_class: "dataRow success",
        method_name: &s.method_name,
        result: "SUCCESS",
        time: format_seconds(s.time),
        message: "",
        stack_trace: "",
        debug_log: log_href(&s.method_name),
    });
    let failures = tcr.failures().iter().map(|f| TestRowView {
        row_class: "dataRow failure",
        method_name: &f.method_name,
        result: "FAILURE",
        time: format_seconds(f.time),
        message: &f.message,
        stack_trace: &f.stack_trace,
        debug_log: log_href(&f.method_name),
    });

    TestClassView {
        name: tcr.name(),
        rows: successes.chain(failures).collect(),
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| ReportError::create_dir(dir, e))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| ReportError::open_file(path, e))
}

fn deploy_stylesheet(out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(CSS_FILENAME);
    write_file(&path, STYLESHEET)?;
    Ok(path)
}
