use crate::error::Result;
use crate::report::{ReportBody, ReportKind, ReportResult};

/// Detail rows listed in a document; larger breakdowns stay in the
/// spreadsheet export.
pub const MAX_WORKERS_LISTED: usize = 10;
pub const MAX_DAYS_LISTED: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub enum Flowable {
    Title(String),
    Heading(String),
    Paragraph(String),
    Spacer(f32),
    Table(Vec<Vec<String>>),
}

impl Flowable {
    /// Vertical space taken on the page, in millimetres.
    fn height(&self) -> f32 {
        match self {
            Flowable::Title(_) => 14.0,
            Flowable::Heading(_) => 9.0,
            Flowable::Paragraph(_) => 6.0,
            Flowable::Spacer(height) => *height,
            Flowable::Table(rows) => rows.len() as f32 * 7.0 + 2.0,
        }
    }
}

/// Lays out the document as a sequence of flowables.
pub fn layout(result: &ReportResult) -> Vec<Flowable> {
    let mut story = vec![
        Flowable::Title(format!("REPORT: {}", result.name)),
        Flowable::Paragraph(format!("Museum: {}", result.museum_name)),
        Flowable::Paragraph(format!("Report Kind: {}", result.kind.label())),
        Flowable::Paragraph(format!("Period: {}", result.period)),
        Flowable::Paragraph(format!(
            "Generated on: {}",
            result.generated_at.format("%d/%m/%Y %H:%M")
        )),
        Flowable::Spacer(7.0),
        Flowable::Heading("GENERAL STATISTICS".to_string()),
    ];

    let mut stats = vec![
        vec![
            "Total Activities".to_string(),
            result.total_activities().to_string(),
        ],
        vec![
            "Total Attendees".to_string(),
            result.total_attendees().to_string(),
        ],
        vec!["Total Hours".to_string(), format!("{:.2}", result.total_hours())],
    ];

    match &result.body {
        ReportBody::ByWorker(breakdown) => {
            stats.push(vec![
                "Total Workers".to_string(),
                breakdown.summary.total_workers.to_string(),
            ]);
            story.push(Flowable::Table(stats));
            story.push(Flowable::Spacer(7.0));
            story.push(Flowable::Heading("DETAIL BY WORKER".to_string()));

            for worker in breakdown.workers.iter().take(MAX_WORKERS_LISTED) {
                story.push(Flowable::Paragraph(format!("{} - {}", worker.name, worker.role)));
                story.push(Flowable::Paragraph(format!(
                    "Activities: {} | Hours: {:.2} | Attendees: {}",
                    worker.total_activities, worker.total_hours, worker.total_attendees
                )));
                story.push(Flowable::Spacer(3.5));
            }
        }
        ReportBody::ByDate(breakdown) => {
            stats.push(vec![
                "Total Days".to_string(),
                breakdown.summary.total_days.to_string(),
            ]);
            story.push(Flowable::Table(stats));
            story.push(Flowable::Spacer(7.0));
            story.push(Flowable::Heading("ACTIVITIES BY DAY".to_string()));

            for day in breakdown.days.iter().take(MAX_DAYS_LISTED) {
                story.push(Flowable::Paragraph(format!(
                    "{} - {}",
                    day.date.format("%d/%m/%Y"),
                    day.weekday
                )));
                story.push(Flowable::Paragraph(format!(
                    "Activities: {} | Attendees: {}",
                    day.total_activities, day.total_attendees
                )));
                story.push(Flowable::Spacer(3.5));
            }
        }
    }

    story
}

/// Renders the report as a PDF. By-worker reports use a landscape page.
pub fn render_document(result: &ReportResult) -> Result<Vec<u8>> {
    let story = layout(result);
    let landscape = result.kind == ReportKind::ByWorker;
    pdf::paint(&result.name, &story, landscape)
}

#[cfg(feature = "pdf")]
mod pdf {
    use printpdf::{BuiltinFont, Mm, PdfDocument};
    use tracing::debug;

    use super::Flowable;
    use crate::error::{ReportError, Result};

    const MARGIN: f32 = 18.0;
    const COLUMN_WIDTH: f32 = 75.0;

    fn pdf_error<E: std::fmt::Debug>(err: E) -> ReportError {
        ReportError::Render(format!("{err:?}"))
    }

    pub fn paint(title: &str, story: &[Flowable], landscape: bool) -> Result<Vec<u8>> {
        let (width, height) = if landscape {
            (Mm(279.4), Mm(215.9))
        } else {
            (Mm(215.9), Mm(279.4))
        };

        let (doc, page, layer) = PdfDocument::new(title, width, height, "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;

        let mut canvas = doc.get_page(page).get_layer(layer);
        let mut cursor = height.0 - MARGIN;
        let mut pages = 1;

        for flowable in story {
            let needed = flowable.height();
            if cursor - needed < MARGIN {
                let (page, layer) = doc.add_page(width, height, "Layer 1");
                canvas = doc.get_page(page).get_layer(layer);
                cursor = height.0 - MARGIN;
                pages += 1;
            }

            match flowable {
                Flowable::Title(text) => {
                    let x = (width.0 - text.len() as f32 * 3.2).max(MARGIN * 2.0) / 2.0;
                    canvas.use_text(text.as_str(), 16.0, Mm(x), Mm(cursor - 8.0), &bold);
                }
                Flowable::Heading(text) => {
                    canvas.use_text(text.as_str(), 12.0, Mm(MARGIN), Mm(cursor - 6.0), &bold);
                }
                Flowable::Paragraph(text) => {
                    canvas.use_text(text.as_str(), 10.0, Mm(MARGIN), Mm(cursor - 4.5), &regular);
                }
                Flowable::Spacer(_) => {}
                Flowable::Table(rows) => {
                    for (row_index, row) in rows.iter().enumerate() {
                        let y = cursor - 5.5 - row_index as f32 * 7.0;
                        let font = if row_index == 0 { &bold } else { &regular };
                        for (column, cell) in row.iter().enumerate() {
                            let x = MARGIN + column as f32 * COLUMN_WIDTH;
                            canvas.use_text(cell.as_str(), 11.0, Mm(x), Mm(y), font);
                        }
                    }
                }
            }

            cursor -= needed;
        }

        debug!(pages, flowables = story.len(), "painted report document");
        doc.save_to_bytes().map_err(pdf_error)
    }
}

#[cfg(not(feature = "pdf"))]
mod pdf {
    use super::Flowable;
    use crate::error::{ReportError, Result};

    pub fn paint(_title: &str, _story: &[Flowable], _landscape: bool) -> Result<Vec<u8>> {
        Err(ReportError::DependencyMissing(
            "PDF export needs the `pdf` feature; rebuild with `--features pdf`",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkerRef;
    use crate::report::fixtures::{activity, at, january_request, worker};
    use crate::report::generate;
    use uuid::Uuid;

    fn detail_paragraphs(story: &[Flowable], heading: &str) -> usize {
        let start = story
            .iter()
            .position(|f| *f == Flowable::Heading(heading.to_string()))
            .unwrap();
        story[start + 1..]
            .iter()
            .filter(|f| matches!(f, Flowable::Spacer(_)))
            .count()
    }

    #[test]
    fn worker_detail_is_capped() {
        let museum = Uuid::new_v4();
        let workers: Vec<WorkerRef> = (0..14).map(|i| worker(&format!("W{i}"), "Guide")).collect();
        let activities: Vec<_> = workers
            .iter()
            .map(|w| activity(museum, "Tour", at(1, 8, 10), 1, 3, vec![w.clone()]))
            .collect();
        let result = generate(&january_request(museum, ReportKind::ByWorker), &activities).unwrap();
        let story = layout(&result);

        assert_eq!(detail_paragraphs(&story, "DETAIL BY WORKER"), MAX_WORKERS_LISTED);
        assert!(story.contains(&Flowable::Table(vec![
            vec!["Total Activities".to_string(), "14".to_string()],
            vec!["Total Attendees".to_string(), "42".to_string()],
            vec!["Total Hours".to_string(), "14.00".to_string()],
            vec!["Total Workers".to_string(), "14".to_string()],
        ])));
    }

    #[test]
    fn day_detail_is_capped() {
        let museum = Uuid::new_v4();
        let activities: Vec<_> = (1..=20)
            .map(|day| activity(museum, "Talk", at(1, day, 10), 1, 2, vec![]))
            .collect();
        let result = generate(&january_request(museum, ReportKind::ByDate), &activities).unwrap();
        let story = layout(&result);

        assert_eq!(detail_paragraphs(&story, "ACTIVITIES BY DAY"), MAX_DAYS_LISTED);
        assert!(story.contains(&Flowable::Paragraph("01/01/2026 - Thursday".to_string())));
        assert!(!story.contains(&Flowable::Paragraph("16/01/2026 - Friday".to_string())));
    }

    #[test]
    fn header_paragraphs_describe_the_report() {
        let result = generate(&january_request(Uuid::new_v4(), ReportKind::ByDate), &[]).unwrap();
        let story = layout(&result);
        assert_eq!(story[0], Flowable::Title("REPORT: January".to_string()));
        assert_eq!(story[1], Flowable::Paragraph("Museum: City Museum".to_string()));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn renders_pdf_bytes() {
        let museum = Uuid::new_v4();
        let result = generate(&january_request(museum, ReportKind::ByDate), &[]).unwrap();
        let bytes = render_document(&result).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn missing_pdf_backend_is_reported() {
        let result = generate(&january_request(Uuid::new_v4(), ReportKind::ByDate), &[]).unwrap();
        let err = render_document(&result).unwrap_err();
        assert!(matches!(err, crate::error::ReportError::DependencyMissing(_)));
    }
}
