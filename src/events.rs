use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{CalendarPayload, RawSessionEvent, ViewData};

static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2})\s*-\s*(\d{2}):(\d{2})").expect("regex compiles")
});
static TIME_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2}):(\d{2})").expect("regex compiles"));

/// Primary/secondary color pair for rendering an event chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventColor {
    pub primary: &'static str,
    pub secondary: &'static str,
}

const fn color(primary: &'static str, secondary: &'static str) -> EventColor {
    EventColor { primary, secondary }
}

pub const PALETTE: [EventColor; 8] = [
    color("#6366f1", "#eef2ff"), // indigo
    color("#8b5cf6", "#f3e8ff"), // violet
    color("#ec4899", "#fce7f3"), // pink
    color("#14b8a6", "#ccfbf1"), // teal
    color("#f59e0b", "#fef3c7"), // amber
    color("#06b6d4", "#cffafe"), // cyan
    color("#a855f7", "#f3e8ff"), // light violet
    color("#10b981", "#d1fae5"), // green
];

/// Stable bucket mapping: `index mod 8`, with anything negative or
/// non-numeric landing on the first entry.
pub fn color_for(index: Option<i64>) -> EventColor {
    match index {
        Some(i) if i >= 0 => PALETTE[(i % PALETTE.len() as i64) as usize],
        _ => PALETTE[0],
    }
}

/// Fields carried through to the renderer unchanged, keyed off the raw
/// session event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMeta {
    pub id: i64,
    pub color_index: Option<i64>,
    pub coach: String,
    pub user_id: String,
    pub time: String,
}

/// A renderer-ready calendar event. Timestamps are naive: session times are
/// wall-clock local to the gym, never a global timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEvent {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub title: String,
    pub color: EventColor,
    pub meta: EventMeta,
}

#[derive(Debug, Clone, Default)]
pub struct AdaptedEvents {
    pub events: Vec<DisplayEvent>,
    /// Events dropped because their time string matched neither pattern.
    /// The drop is silent towards the user; this counter exists so a data
    /// regression upstream is still detectable.
    pub skipped: usize,
}

/// Converts a calendar payload into display events. Dispatches on the
/// payload's own view tag, so a payload can never be adapted with the wrong
/// shape. Output order is day-major, then source order within a day; the
/// pipeline never fails, it only drops.
pub fn adapt_events(payload: &CalendarPayload) -> AdaptedEvents {
    let mut out = AdaptedEvents::default();
    match &payload.data {
        ViewData::Day { events, .. } => {
            for event in events {
                push_event(&mut out, payload.current_date, event, true);
            }
        }
        ViewData::Week { week_days_data, .. } => {
            for day in week_days_data {
                for event in &day.events {
                    push_event(&mut out, day.date, event, true);
                }
            }
        }
        // Month cells render start-time markers only; no end timestamp.
        ViewData::Month { calendar_days } => {
            for day in calendar_days {
                for event in &day.events {
                    push_event(&mut out, day.date, event, false);
                }
            }
        }
        // The agenda shape is rendered as a list, not as calendar events.
        ViewData::Schedule { .. } => {}
    }
    out
}

fn push_event(out: &mut AdaptedEvents, anchor: NaiveDate, raw: &RawSessionEvent, with_end: bool) {
    let Some((start, end)) = parse_event_time(&raw.time) else {
        out.skipped += 1;
        debug!(id = raw.id, time = %raw.time, "skipping session with unparsable time");
        return;
    };
    out.events.push(DisplayEvent {
        start: anchor.and_time(start),
        end: end.filter(|_| with_end).map(|t| anchor.and_time(t)),
        title: raw.title.clone(),
        color: color_for(raw.color_index),
        meta: EventMeta {
            id: raw.id,
            color_index: raw.color_index,
            coach: raw.coach.clone(),
            user_id: raw.user_id.clone(),
            time: raw.time.clone(),
        },
    });
}

/// Parses "HH:MM - HH:MM" into a start/end pair, falling back to a lone
/// leading "HH:MM" for start-only events. Returns `None` when neither
/// pattern matches or the clock values are out of range.
pub fn parse_event_time(time: &str) -> Option<(NaiveTime, Option<NaiveTime>)> {
    if let Some(caps) = TIME_RANGE.captures(time)
        && let (Some(start), Some(end)) = (clock(&caps, 1, 2), clock(&caps, 3, 4))
    {
        return Some((start, Some(end)));
    }
    let caps = TIME_START.captures(time)?;
    clock(&caps, 1, 2).map(|start| (start, None))
}

fn clock(caps: &regex::Captures<'_>, hour: usize, minute: usize) -> Option<NaiveTime> {
    let h: u32 = caps[hour].parse().ok()?;
    let m: u32 = caps[minute].parse().ok()?;
    NaiveTime::from_hms_opt(h, m, 0)
}
