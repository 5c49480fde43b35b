use csv::WriterBuilder;

use crate::error::{ReportError, Result};
use crate::report::{DateBreakdown, ReportBody, ReportResult, WorkerBreakdown};

const BLANK: [&str; 1] = [""];

type Sheet = csv::Writer<Vec<u8>>;

/// Writes the report as spreadsheet rows: header block, statistics, then the
/// breakdown table.
pub fn render_spreadsheet(result: &ReportResult) -> Result<Vec<u8>> {
    let mut sheet = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    sheet.write_record(["Report", result.name.as_str()])?;
    sheet.write_record(["Museum", result.museum_name.as_str()])?;
    sheet.write_record(["Report Kind", result.kind.label()])?;
    sheet.write_record(["Period", result.period.label().as_str()])?;
    sheet.write_record(BLANK)?;

    match &result.body {
        ReportBody::ByWorker(breakdown) => write_workers(&mut sheet, breakdown)?,
        ReportBody::ByDate(breakdown) => write_days(&mut sheet, breakdown)?,
    }

    sheet
        .into_inner()
        .map_err(|err| ReportError::Io(err.into_error()))
}

fn write_workers(sheet: &mut Sheet, breakdown: &WorkerBreakdown) -> Result<()> {
    let summary = &breakdown.summary;
    sheet.write_record(["Statistics"])?;
    sheet.write_record(["Total Workers", summary.total_workers.to_string().as_str()])?;
    sheet.write_record(["Total Activities", summary.total_activities.to_string().as_str()])?;
    sheet.write_record(["Total Hours", format!("{:.2}", summary.total_hours).as_str()])?;
    sheet.write_record(["Total Attendees", summary.total_attendees.to_string().as_str()])?;
    sheet.write_record(BLANK)?;

    sheet.write_record(["Workers"])?;
    sheet.write_record(["Name", "Role", "Activities", "Hours", "Attendees"])?;
    for worker in &breakdown.workers {
        sheet.write_record([
            worker.name.as_str(),
            worker.role.as_str(),
            worker.total_activities.to_string().as_str(),
            format!("{:.2}", worker.total_hours).as_str(),
            worker.total_attendees.to_string().as_str(),
        ])?;
    }
    Ok(())
}

fn write_days(sheet: &mut Sheet, breakdown: &DateBreakdown) -> Result<()> {
    let summary = &breakdown.summary;
    sheet.write_record(["Statistics"])?;
    sheet.write_record(["Total Days", summary.total_days.to_string().as_str()])?;
    sheet.write_record(["Total Activities", summary.total_activities.to_string().as_str()])?;
    sheet.write_record(["Total Attendees", summary.total_attendees.to_string().as_str()])?;
    sheet.write_record(["Total Hours", format!("{:.2}", summary.total_hours).as_str()])?;
    sheet.write_record([
        "Average Activities Per Day",
        format!("{:.2}", summary.average_activities_per_day).as_str(),
    ])?;
    if !summary.per_kind.is_empty() {
        sheet.write_record(["Activities by Kind", "Activities", "Attendees", "Hours"])?;
        for totals in &summary.per_kind {
            sheet.write_record([
                totals.kind.label(),
                totals.activities.to_string().as_str(),
                totals.attendees.to_string().as_str(),
                format!("{:.2}", totals.hours).as_str(),
            ])?;
        }
    }
    sheet.write_record(BLANK)?;

    sheet.write_record(["Activities by Day"])?;
    sheet.write_record(["Date", "Day", "Activities", "Attendees", "Hours"])?;
    for day in &breakdown.days {
        sheet.write_record([
            day.date.format("%d/%m/%Y").to_string().as_str(),
            day.weekday.as_str(),
            day.total_activities.to_string().as_str(),
            day.total_attendees.to_string().as_str(),
            format!("{:.2}", day.total_hours).as_str(),
        ])?;
        for activity in &day.activities {
            sheet.write_record([
                "",
                format!("  • {}", activity.name).as_str(),
                activity.kind.label(),
                activity.attendees.to_string().as_str(),
            ])?;
        }
        sheet.write_record(BLANK)?;
    }
    Ok(())
}
