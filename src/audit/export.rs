//! CSV and XES renderings of the event log.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::entities::event_log;

pub const CSV_FILENAME: &str = "event_logs.csv";
pub const XES_FILENAME: &str = "event_logs.xes";

const CSV_HEADERS: [&str; 6] = [
    "Case ID",
    "Activity",
    "Start Time",
    "End Time",
    "User",
    "User Name",
];
const CSV_TIME_FORMAT: &str = "%-d.%-m.%y %H:%M";
const LIFECYCLE_COMPLETE: &str = "complete";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No event logs to export")]
    Empty,
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write XES: {0}")]
    Xml(String),
}

fn csv_time(time: &DateTime<FixedOffset>) -> String {
    time.format(CSV_TIME_FORMAT).to_string()
}

pub fn to_csv(rows: &[event_log::Model]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for row in rows {
        writer.write_record([
            row.case_id.clone(),
            row.activity.clone(),
            csv_time(&row.start_time),
            row.end_time.as_ref().map(csv_time).unwrap_or_default(),
            row.user_id.map(|id| id.to_string()).unwrap_or_default(),
            row.user_name.clone(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}

/// Rows ordered the way a process-mining tool replays them.
pub fn sorted_for_mining(rows: &[event_log::Model]) -> Vec<&event_log::Model> {
    let mut sorted: Vec<&event_log::Model> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        a.case_id
            .cmp(&b.case_id)
            .then(a.start_time.cmp(&b.start_time))
            .then(a.id.cmp(&b.id))
    });
    sorted
}

fn xml_error(err: impl Display) -> ExportError {
    ExportError::Xml(err.to_string())
}

fn attribute<'a>(tag: &'a str, key: &'a str, value: &'a str) -> Event<'a> {
    Event::Empty(BytesStart::new(tag).with_attributes([("key", key), ("value", value)]))
}

/// Serializes the log as an XES document: one `<trace>` per case, events
/// ordered by start time, each marked `lifecycle:transition = complete`.
pub fn to_xes(rows: &[event_log::Model]) -> Result<Vec<u8>, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;

    let log = BytesStart::new("log").with_attributes([
        ("xes.version", "1.0"),
        ("xes.features", "nested-attributes"),
        ("xmlns", "http://www.xes-standard.org/"),
    ]);
    writer.write_event(Event::Start(log)).map_err(xml_error)?;

    for (name, prefix) in [
        ("Concept", "concept"),
        ("Time", "time"),
        ("Organizational", "org"),
        ("Lifecycle", "lifecycle"),
    ] {
        let uri = format!("http://www.xes-standard.org/{}.xesext", prefix);
        let extension = BytesStart::new("extension").with_attributes([
            ("name", name),
            ("prefix", prefix),
            ("uri", uri.as_str()),
        ]);
        writer.write_event(Event::Empty(extension)).map_err(xml_error)?;
    }

    let sorted = sorted_for_mining(rows);
    let mut current_case: Option<&str> = None;

    for row in sorted {
        if current_case != Some(row.case_id.as_str()) {
            if current_case.is_some() {
                writer
                    .write_event(Event::End(BytesEnd::new("trace")))
                    .map_err(xml_error)?;
            }
            writer
                .write_event(Event::Start(BytesStart::new("trace")))
                .map_err(xml_error)?;
            writer
                .write_event(attribute("string", "concept:name", &row.case_id))
                .map_err(xml_error)?;
            current_case = Some(row.case_id.as_str());
        }

        write_event_row(&mut writer, row)?;
    }

    if current_case.is_some() {
        writer
            .write_event(Event::End(BytesEnd::new("trace")))
            .map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("log")))
        .map_err(xml_error)?;

    Ok(writer.into_inner())
}

fn write_event_row(
    writer: &mut Writer<Vec<u8>>,
    row: &event_log::Model,
) -> Result<(), ExportError> {
    let start = row.start_time.to_rfc3339();
    let end = row.end_time.map(|t| t.to_rfc3339());
    let status = row.status_code.map(|code| code.to_string());

    let mut attributes = vec![
        attribute("string", "concept:name", &row.activity),
        attribute("date", "time:timestamp", &start),
    ];
    if let Some(end) = &end {
        attributes.push(attribute("date", "time:endTimestamp", end));
    }
    attributes.push(attribute("string", "org:resource", &row.user_name));
    if let Some(status) = &status {
        attributes.push(attribute("int", "status", status));
    }
    attributes.push(attribute("string", "lifecycle:transition", LIFECYCLE_COMPLETE));

    writer
        .write_event(Event::Start(BytesStart::new("event")))
        .map_err(xml_error)?;
    for attr in attributes {
        writer.write_event(attr).map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("event")))
        .map_err(xml_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quick_xml::Reader;
    use uuid::Uuid;

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 5, hour, minute, 0)
            .unwrap()
    }

    fn row(
        id: i32,
        case_id: &str,
        activity: &str,
        start: DateTime<FixedOffset>,
    ) -> event_log::Model {
        event_log::Model {
            id,
            case_id: case_id.to_string(),
            activity: activity.to_string(),
            start_time: start,
            end_time: Some(start + chrono::Duration::seconds(1)),
            user_id: None,
            user_name: "Anonymous".to_string(),
            status_code: Some(200),
        }
    }

    #[test]
    fn test_csv_layout() {
        let user_id = Uuid::from_u128(7);
        let mut logged_in = row(1, "user_7", "Room Booking Create", at(9, 5));
        logged_in.user_id = Some(user_id);
        logged_in.user_name = "ana@example.com".to_string();
        let mut open = row(2, "session_abc", "Event List", at(14, 30));
        open.end_time = None;

        let csv = String::from_utf8(to_csv(&[logged_in, open]).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Case ID,Activity,Start Time,End Time,User,User Name");
        assert_eq!(
            lines[1],
            format!(
                "user_7,Room Booking Create,5.3.24 09:05,5.3.24 09:05,{},ana@example.com",
                user_id
            )
        );
        assert_eq!(lines[2], "session_abc,Event List,5.3.24 14:30,,,Anonymous");
    }

    #[test]
    fn test_csv_of_empty_log_has_headers_only() {
        let csv = String::from_utf8(to_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv.trim_end(), "Case ID,Activity,Start Time,End Time,User,User Name");
    }

    #[test]
    fn test_xes_rejects_empty_log() {
        assert!(matches!(to_xes(&[]), Err(ExportError::Empty)));
    }

    /// (case, [(activity, timestamp, lifecycle)]) in document order.
    fn parse_xes(xml: &str) -> Vec<(String, Vec<(String, String, String)>)> {
        let mut reader = Reader::from_str(xml);
        let mut traces: Vec<(String, Vec<(String, String, String)>)> = Vec::new();
        let mut in_event = false;
        let mut current = (String::new(), String::new(), String::new());

        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.name().as_ref() == b"trace" => {
                    traces.push((String::new(), Vec::new()));
                }
                Event::Start(e) if e.name().as_ref() == b"event" => {
                    in_event = true;
                    current = (String::new(), String::new(), String::new());
                }
                Event::End(e) if e.name().as_ref() == b"event" => {
                    in_event = false;
                    if let Some(trace) = traces.last_mut() {
                        trace.1.push(current.clone());
                    }
                }
                Event::Empty(e) => {
                    let mut key = String::new();
                    let mut value = String::new();
                    for attr in e.attributes() {
                        let attr = attr.unwrap();
                        let text = String::from_utf8(attr.value.to_vec()).unwrap();
                        match attr.key.as_ref() {
                            b"key" => key = text,
                            b"value" => value = text,
                            _ => {}
                        }
                    }
                    match (in_event, key.as_str()) {
                        (false, "concept:name") => {
                            if let Some(trace) = traces.last_mut() {
                                trace.0 = value;
                            }
                        }
                        (true, "concept:name") => current.0 = value,
                        (true, "time:timestamp") => current.1 = value,
                        (true, "lifecycle:transition") => current.2 = value,
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        traces
    }

    #[test]
    fn test_xes_is_sorted_and_complete() {
        let rows = vec![
            row(1, "user_b", "Event List", at(10, 0)),
            row(2, "session_z", "Room Booking List", at(9, 0)),
            row(3, "user_b", "Event Retrieve", at(8, 0)),
            row(4, "session_z", "Room Booking Create", at(11, 0)),
            row(5, "user_a", "Tour List", at(12, 0)),
        ];

        let xml = String::from_utf8(to_xes(&rows).unwrap()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));

        let traces = parse_xes(&xml);
        let cases: Vec<&str> = traces.iter().map(|(case, _)| case.as_str()).collect();
        assert_eq!(cases, ["session_z", "user_a", "user_b"]);

        let user_b: Vec<&str> = traces[2]
            .1
            .iter()
            .map(|(activity, _, _)| activity.as_str())
            .collect();
        assert_eq!(user_b, ["Event Retrieve", "Event List"]);

        for (_, events) in &traces {
            let timestamps: Vec<DateTime<FixedOffset>> = events
                .iter()
                .map(|(_, ts, _)| DateTime::parse_from_rfc3339(ts).unwrap())
                .collect();
            assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
            assert!(events.iter().all(|(_, _, lifecycle)| lifecycle == "complete"));
        }
        assert_eq!(traces.iter().map(|(_, e)| e.len()).sum::<usize>(), rows.len());
    }

    #[test]
    fn test_xes_escapes_values() {
        let rows = vec![row(1, "user_<1>", "A & B", at(10, 0))];
        let xml = String::from_utf8(to_xes(&rows).unwrap()).unwrap();
        assert!(xml.contains("user_&lt;1&gt;"));
        assert!(xml.contains("A &amp; B"));
    }
}
