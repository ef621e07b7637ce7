/// Activity report generation
///
/// Builds the productivity verdict and renders the PDF activity report.
/// The module is pure: ledger rows go in, bytes come out, so every part
/// of the pipeline is testable without a database.
///
/// # Classification
///
/// A user is **ACTIVE** when the interval contains at least
/// [`ACTIVITY_EVENT_THRESHOLD`] interaction events and at most
/// [`AI_DETECTION_LIMIT`] AI-tool window detections. Both comparisons are
/// inclusive. The thresholds are fixed policy constants, not per-call
/// parameters.
///
/// # Document layout
///
/// Page 1 carries the title, the query scope, the colored verdict line,
/// the thresholds, and the two observed counts. Subsequent pages list
/// every ledger row in chronological order in a fixed-column table.

use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rgb};

use crate::models::activity::{ActivityKind, ActivityLog, ActivityPayload};

/// Minimum `user-activity` events for an ACTIVE verdict (inclusive)
pub const ACTIVITY_EVENT_THRESHOLD: u64 = 20;

/// Maximum AI-tool detections tolerated for an ACTIVE verdict (inclusive)
pub const AI_DETECTION_LIMIT: u64 = 5;

/// Table rows rendered per PDF page
const ROWS_PER_PAGE: usize = 40;

/// Maximum URL characters shown in the table before truncation
const URL_DISPLAY_LIMIT: usize = 38;

/// Error type for report rendering
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// PDF construction failed
    #[error("Failed to render report: {0}")]
    RenderError(String),
}

impl From<printpdf::Error> for ReportError {
    fn from(err: printpdf::Error) -> Self {
        ReportError::RenderError(err.to_string())
    }
}

/// The activity classification produced by the fixed thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Active,
    Inactive,
}

impl Verdict {
    /// Display label used on the report
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Active => "ACTIVE",
            Verdict::Inactive => "INACTIVE/LOW-ACTIVITY",
        }
    }
}

/// Classifies an interval from its observed counts
///
/// Both thresholds are inclusive: exactly 20 activity events with exactly
/// 5 AI detections is still ACTIVE.
pub fn classify(activity_events: u64, ai_detections: u64) -> Verdict {
    if activity_events >= ACTIVITY_EVENT_THRESHOLD && ai_detections <= AI_DETECTION_LIMIT {
        Verdict::Active
    } else {
        Verdict::Inactive
    }
}

/// Event counts summarized from the fetched ledger rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// All rows in the interval, both kinds
    pub total_events: u64,

    /// Rows of kind `user-activity`
    pub activity_events: u64,

    /// Rows of kind `window-switch`
    pub window_switches: u64,

    /// Window switches flagged as AI tools
    pub ai_detections: u64,
}

impl ReportSummary {
    /// Summarizes a chronological slice of ledger rows
    pub fn from_rows(rows: &[ActivityLog]) -> Self {
        let mut summary = ReportSummary {
            total_events: rows.len() as u64,
            ..Default::default()
        };

        for row in rows {
            match row.kind {
                ActivityKind::UserActivity => summary.activity_events += 1,
                ActivityKind::WindowSwitch => {
                    summary.window_switches += 1;
                    if row.payload.is_ai_detection() {
                        summary.ai_detections += 1;
                    }
                }
            }
        }

        summary
    }

    /// The verdict for these counts
    pub fn verdict(&self) -> Verdict {
        classify(self.activity_events, self.ai_detections)
    }
}

/// Query scope echoed on the report's first page
#[derive(Debug, Clone)]
pub struct ReportScope {
    /// User email when scoped to one user, None for all users
    pub user_label: Option<String>,

    /// Interval start (inclusive)
    pub start: DateTime<Utc>,

    /// Interval end (inclusive)
    pub end: DateTime<Utc>,
}

/// The table cells for one ledger row
///
/// Columns: time, type, clicks, keys, moves, url, AI. Counter cells are
/// blank for window switches; URL/AI cells are blank for user activity.
pub fn table_cells(row: &ActivityLog) -> [String; 7] {
    let time = row.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let kind = row.kind.as_str().to_string();

    match &*row.payload {
        ActivityPayload::UserActivity {
            mouse_clicks,
            key_presses,
            mouse_movements,
        } => [
            time,
            kind,
            mouse_clicks.to_string(),
            key_presses.to_string(),
            mouse_movements.to_string(),
            String::new(),
            String::new(),
        ],
        ActivityPayload::WindowSwitch { url, is_ai_tool, .. } => [
            time,
            kind,
            String::new(),
            String::new(),
            String::new(),
            truncate_url(url),
            if *is_ai_tool { "yes" } else { "no" }.to_string(),
        ],
    }
}

fn truncate_url(url: &str) -> String {
    if url.chars().count() <= URL_DISPLAY_LIMIT {
        url.to_string()
    } else {
        let cut: String = url.chars().take(URL_DISPLAY_LIMIT - 3).collect();
        format!("{}...", cut)
    }
}

/// Column x-positions in millimeters, one per cell of [`table_cells`]
const COLUMN_X: [f32; 7] = [15.0, 58.0, 92.0, 108.0, 124.0, 142.0, 196.0];

const COLUMN_HEADERS: [&str; 7] = ["Time", "Type", "Clicks", "Keys", "Moves", "URL", "AI"];

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const TABLE_TOP_MM: f32 = 275.0;
const ROW_HEIGHT_MM: f32 = 6.0;

/// Renders the full activity report as PDF bytes
///
/// # Errors
///
/// Returns `ReportError::RenderError` if PDF construction fails.
pub fn render_pdf(
    scope: &ReportScope,
    summary: &ReportSummary,
    rows: &[ActivityLog],
) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) = PdfDocument::new(
        "Activity Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );

    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    render_summary_page(&doc.get_page(page1).get_layer(layer1), scope, summary, &font, &font_bold);

    // One table page per ROWS_PER_PAGE chunk, chronological order preserved
    for chunk in rows.chunks(ROWS_PER_PAGE) {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        render_table_page(&doc.get_page(page).get_layer(layer), chunk, &font, &font_bold);
    }

    let bytes = doc.save_to_bytes()?;
    Ok(bytes)
}

fn render_summary_page(
    layer: &PdfLayerReference,
    scope: &ReportScope,
    summary: &ReportSummary,
    font: &IndirectFontRef,
    font_bold: &IndirectFontRef,
) {
    let black = Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None));
    let green = Color::Rgb(Rgb::new(0.0, 0.55, 0.2, None));
    let red = Color::Rgb(Rgb::new(0.8, 0.1, 0.1, None));

    layer.set_fill_color(black.clone());
    layer.use_text("Activity Report", 22.0, Mm(15.0), Mm(272.0), font_bold);

    let user_line = match &scope.user_label {
        Some(email) => format!("User: {}", email),
        None => "User: all users".to_string(),
    };
    layer.use_text(user_line, 11.0, Mm(15.0), Mm(258.0), font);
    layer.use_text(
        format!(
            "Period: {} - {}",
            scope.start.format("%Y-%m-%d %H:%M:%S"),
            scope.end.format("%Y-%m-%d %H:%M:%S"),
        ),
        11.0,
        Mm(15.0),
        Mm(251.0),
        font,
    );

    let verdict = summary.verdict();
    let verdict_color = match verdict {
        Verdict::Active => green,
        Verdict::Inactive => red,
    };
    layer.set_fill_color(verdict_color);
    layer.use_text(
        format!("Verdict: {}", verdict.label()),
        16.0,
        Mm(15.0),
        Mm(235.0),
        font_bold,
    );
    layer.set_fill_color(black);

    layer.use_text(
        format!(
            "Thresholds: at least {} activity events, at most {} AI-tool detections",
            ACTIVITY_EVENT_THRESHOLD, AI_DETECTION_LIMIT,
        ),
        11.0,
        Mm(15.0),
        Mm(221.0),
        font,
    );
    layer.use_text(
        format!(
            "Observed: {} activity events, {} AI-tool detections",
            summary.activity_events, summary.ai_detections,
        ),
        11.0,
        Mm(15.0),
        Mm(214.0),
        font,
    );
    layer.use_text(
        format!(
            "Totals: {} events ({} user-activity, {} window-switch)",
            summary.total_events, summary.activity_events, summary.window_switches,
        ),
        11.0,
        Mm(15.0),
        Mm(207.0),
        font,
    );

    let explanation = match verdict {
        Verdict::Active => {
            "The user met the interaction threshold without excessive AI-tool usage in this period."
        }
        Verdict::Inactive => {
            "The user fell below the interaction threshold or exceeded the AI-tool detection limit."
        }
    };
    layer.use_text(explanation, 10.0, Mm(15.0), Mm(195.0), font);
}

fn render_table_page(
    layer: &PdfLayerReference,
    rows: &[ActivityLog],
    font: &IndirectFontRef,
    font_bold: &IndirectFontRef,
) {
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));

    for (header, x) in COLUMN_HEADERS.iter().zip(COLUMN_X.iter()) {
        layer.use_text(*header, 9.0, Mm(*x), Mm(TABLE_TOP_MM), font_bold);
    }

    for (i, row) in rows.iter().enumerate() {
        let y = TABLE_TOP_MM - ROW_HEIGHT_MM * (i + 1) as f32;
        let cells = table_cells(row);
        for (cell, x) in cells.iter().zip(COLUMN_X.iter()) {
            if !cell.is_empty() {
                layer.use_text(cell, 8.0, Mm(*x), Mm(y), font);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn activity_row(at: DateTime<Utc>) -> ActivityLog {
        ActivityLog {
            id: 0,
            user_id: Uuid::new_v4(),
            kind: ActivityKind::UserActivity,
            recorded_at: at,
            payload: Json(ActivityPayload::UserActivity {
                mouse_clicks: 5,
                key_presses: 12,
                mouse_movements: 40,
            }),
            client_event_id: None,
        }
    }

    fn switch_row(at: DateTime<Utc>, is_ai_tool: bool) -> ActivityLog {
        ActivityLog {
            id: 0,
            user_id: Uuid::new_v4(),
            kind: ActivityKind::WindowSwitch,
            recorded_at: at,
            payload: Json(ActivityPayload::WindowSwitch {
                title: "Some window".to_string(),
                url: "https://example.com/page".to_string(),
                is_ai_tool,
            }),
            client_event_id: None,
        }
    }

    fn rows(activity: usize, ai_switches: usize, plain_switches: usize) -> Vec<ActivityLog> {
        let start = Utc::now();
        let mut out = Vec::new();
        for i in 0..activity {
            out.push(activity_row(start + Duration::seconds(i as i64)));
        }
        for i in 0..ai_switches {
            out.push(switch_row(start + Duration::seconds((activity + i) as i64), true));
        }
        for i in 0..plain_switches {
            out.push(switch_row(
                start + Duration::seconds((activity + ai_switches + i) as i64),
                false,
            ));
        }
        out
    }

    #[test]
    fn test_classify_both_thresholds_inclusive() {
        assert_eq!(classify(20, 5), Verdict::Active);
    }

    #[test]
    fn test_classify_below_activity_threshold() {
        assert_eq!(classify(19, 0), Verdict::Inactive);
    }

    #[test]
    fn test_classify_above_ai_limit() {
        assert_eq!(classify(20, 6), Verdict::Inactive);
        assert_eq!(classify(100, 6), Verdict::Inactive);
    }

    #[test]
    fn test_classify_comfortably_active() {
        assert_eq!(classify(25, 2), Verdict::Active);
        assert_eq!(classify(1000, 0), Verdict::Active);
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(Verdict::Active.label(), "ACTIVE");
        assert_eq!(Verdict::Inactive.label(), "INACTIVE/LOW-ACTIVITY");
    }

    #[test]
    fn test_summary_from_rows() {
        let rows = rows(25, 2, 3);
        let summary = ReportSummary::from_rows(&rows);

        assert_eq!(summary.total_events, 30);
        assert_eq!(summary.activity_events, 25);
        assert_eq!(summary.window_switches, 5);
        assert_eq!(summary.ai_detections, 2);
        assert_eq!(summary.verdict(), Verdict::Active);
    }

    #[test]
    fn test_summary_of_empty_interval() {
        let summary = ReportSummary::from_rows(&[]);
        assert_eq!(summary, ReportSummary::default());
        assert_eq!(summary.verdict(), Verdict::Inactive);
    }

    #[test]
    fn test_table_cells_for_activity_row() {
        let row = activity_row(Utc::now());
        let cells = table_cells(&row);

        assert_eq!(cells[1], "user-activity");
        assert_eq!(cells[2], "5");
        assert_eq!(cells[3], "12");
        assert_eq!(cells[4], "40");
        assert!(cells[5].is_empty());
        assert!(cells[6].is_empty());
    }

    #[test]
    fn test_table_cells_for_switch_row() {
        let row = switch_row(Utc::now(), true);
        let cells = table_cells(&row);

        assert_eq!(cells[1], "window-switch");
        assert!(cells[2].is_empty());
        assert!(cells[3].is_empty());
        assert!(cells[4].is_empty());
        assert_eq!(cells[5], "https://example.com/page");
        assert_eq!(cells[6], "yes");
    }

    #[test]
    fn test_long_urls_are_truncated() {
        let long = format!("https://example.com/{}", "a".repeat(100));
        let shown = truncate_url(&long);
        assert_eq!(shown.chars().count(), URL_DISPLAY_LIMIT);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_render_pdf_produces_a_document() {
        let rows = rows(25, 2, 0);
        let summary = ReportSummary::from_rows(&rows);
        let scope = ReportScope {
            user_label: Some("worker@example.com".to_string()),
            start: Utc::now() - Duration::days(7),
            end: Utc::now(),
        };

        let bytes = render_pdf(&scope, &summary, &rows).expect("render should succeed");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_render_pdf_with_no_rows() {
        let scope = ReportScope {
            user_label: None,
            start: Utc::now() - Duration::days(1),
            end: Utc::now(),
        };
        let summary = ReportSummary::default();

        let bytes = render_pdf(&scope, &summary, &[]).expect("render should succeed");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_pdf_many_rows_paginates() {
        let scope = ReportScope {
            user_label: None,
            start: Utc::now() - Duration::days(1),
            end: Utc::now(),
        };

        // 100 rows span 3 table pages; the document must grow accordingly
        let small = rows(5, 0, 0);
        let large = rows(100, 0, 0);

        let small_pdf = render_pdf(&scope, &ReportSummary::from_rows(&small), &small)
            .expect("render should succeed");
        let large_pdf = render_pdf(&scope, &ReportSummary::from_rows(&large), &large)
            .expect("render should succeed");

        assert!(large_pdf.starts_with(b"%PDF"));
        assert!(large_pdf.len() > small_pdf.len());
    }
}
