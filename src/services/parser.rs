// src/services/parser.rs

//! XML parser for stundenplan24 class plans.
//!
//! A day plan (`PlanKlYYYYMMDD.xml`) looks like:
//!
//! ```text
//! VpMobil
//! ├── Kopf/zeitstempel        freshness marker
//! ├── Klassen/Kl              one per class
//! │   ├── Kurz                class short name
//! │   └── Pl/Std              one per period
//! │       ├── St Beginn Ende  period and times
//! │       ├── Fa Le Ra        subject, teacher, room (with FaAe/LeAe/RaAe markers)
//! │       └── Ku2 If          course and info text
//! └── ZusatzInfo/ZiZeile      day-level notices
//! ```

use chrono::NaiveDate;
use roxmltree::{Document, Node};

use crate::error::Result;
use crate::models::{AdditionalInfoRecord, LessonRecord, ScheduleSnapshot, display_time};
use crate::pipeline::aggregate::sort_lessons;

/// Attribute markers that flag a changed subject, teacher or room.
const CHANGE_MARKERS: [(&str, &str, &str); 3] = [
    ("Fa", "FaAe", "FaGeaendert"),
    ("Le", "LeAe", "LeGeaendert"),
    ("Ra", "RaAe", "RaGeaendert"),
];

/// Parse one day's class plan into a single-day snapshot.
///
/// With `class_name` set, only that class is processed; an unknown class
/// yields an empty snapshot.
pub fn parse_day(
    xml: &str,
    date: NaiveDate,
    class_name: Option<&str>,
) -> Result<ScheduleSnapshot> {
    let doc = parse_document(xml)?;
    let root = doc.root_element();

    let mut snapshot = ScheduleSnapshot::empty(Some(date));

    if let Some(timestamp) = root
        .descendants()
        .find(|n| n.has_tag_name("zeitstempel"))
        .and_then(|n| node_text(&n))
    {
        snapshot.timestamp = timestamp;
    }

    for kl in root.descendants().filter(|n| n.has_tag_name("Kl")) {
        let Some(short) = child_text(&kl, "Kurz") else {
            continue;
        };
        if class_name.is_some_and(|wanted| wanted != short) {
            continue;
        }
        snapshot.add_class(&short);

        let Some(plan) = child(&kl, "Pl") else {
            continue;
        };
        for slot in plan.children().filter(|n| n.has_tag_name("Std")) {
            match parse_lesson(&slot, &short) {
                Some(lesson) if lesson.is_change => snapshot.changes.push(lesson),
                Some(lesson) => snapshot.lessons.push(lesson),
                None => log::debug!("Skipping empty period slot for class {short} on {date}"),
            }
        }
    }

    snapshot.additional_info = root
        .descendants()
        .filter(|n| n.has_tag_name("ZusatzInfo"))
        .flat_map(|zi| zi.children().filter(|n| n.has_tag_name("ZiZeile")))
        .filter_map(|line| node_text(&line))
        .map(|text| AdditionalInfoRecord {
            date: Some(date),
            text,
        })
        .collect();

    snapshot.lessons = sort_lessons(snapshot.lessons);
    snapshot.changes = sort_lessons(snapshot.changes);

    log::debug!(
        "Parsed plan for {}: {} lessons, {} changes, {} notices",
        date,
        snapshot.lessons.len(),
        snapshot.changes.len(),
        snapshot.additional_info.len()
    );

    Ok(snapshot)
}

/// Parse the class list document (`Klassen.xml`) into class short names.
pub fn parse_class_list(xml: &str) -> Result<Vec<String>> {
    let doc = parse_document(xml)?;
    Ok(doc
        .descendants()
        .filter(|n| n.has_tag_name("Kl"))
        .filter_map(|kl| child_text(&kl, "Kurz"))
        .collect())
}

/// Parse a single `Std` element.
///
/// Returns `None` for slots that carry neither a period nor a subject.
fn parse_lesson(slot: &Node, class_name: &str) -> Option<LessonRecord> {
    let period = child_text(slot, "St");
    let subject = child_text(slot, "Fa");
    if period.is_none() && subject.is_none() {
        return None;
    }

    let time_start = child_text(slot, "Beginn");
    let time_end = child_text(slot, "Ende");
    let info = child_text(slot, "If");

    // A marker only counts on an element that has text.
    let marked = CHANGE_MARKERS.iter().any(|(element, attr, value)| {
        child(slot, element)
            .filter(|n| node_text(n).is_some())
            .and_then(|n| n.attribute(*attr))
            == Some(*value)
    });

    let time = display_time(time_start.as_deref(), time_end.as_deref(), period.as_deref());

    Some(LessonRecord {
        date: None,
        weekday: None,
        class_name: class_name.to_string(),
        is_change: marked || info.is_some(),
        period,
        time_start,
        time_end,
        subject,
        teacher: child_text(slot, "Le"),
        room: child_text(slot, "Ra"),
        course: child_text(slot, "Ku2"),
        info,
        time,
        is_double_lesson_inferred: false,
    })
}

fn parse_document(xml: &str) -> Result<Document<'_>> {
    Ok(Document::parse(xml.trim_start_matches('\u{feff}'))?)
}

fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text(node: &Node, name: &str) -> Option<String> {
    child(node, name).and_then(|n| node_text(&n))
}

/// Trimmed text content; empty text counts as absent.
fn node_text(node: &Node) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
