//! Text formatting for one poll cycle.

use chrono::{DateTime, Local};

use crate::{
    constants::DEFAULT_WRAP_WIDTH,
    error::Result,
    snapshot::{AlertEntry, ForecastPeriod, WeatherSnapshot},
};

/// Local timestamps as `2024-Jan-05 08:20:31`.
pub fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.format("%Y-%b-%d %H:%M:%S").to_string()
}

/// A timestamp field, or the reason it could not be read.
fn timestamp_line(label: &str, value: Result<DateTime<Local>>) -> String {
    match value {
        Ok(ts) => format!("{label}: \t{}\n", format_timestamp(&ts)),
        Err(err) => format!("{label}: \t{err}\n"),
    }
}

/// Greedy word wrap. Each input line is wrapped on its own and every output
/// line ends with `\n`; blank input lines are dropped.
pub fn wrap_text(input: &str, width: usize) -> String {
    let mut out = String::new();

    for input_line in input.lines() {
        let mut line = String::new();
        let mut line_len = 0;

        for word in input_line.split_whitespace() {
            let word_len = word.chars().count();
            if !line.is_empty() && line_len + 1 + word_len >= width {
                out.push_str(&line);
                out.push('\n');
                line.clear();
                line_len = 0;
            }
            if !line.is_empty() {
                line.push(' ');
                line_len += 1;
            }
            line.push_str(word);
            line_len += word_len;
        }

        if !line.is_empty() {
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renderer {
    word_wrap: bool,
    width: usize,
}

impl Renderer {
    pub fn new(word_wrap: bool) -> Self {
        Self {
            word_wrap,
            width: DEFAULT_WRAP_WIDTH,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    fn paragraph(&self, text: &str) -> String {
        if text.trim().is_empty() {
            String::new()
        } else if self.word_wrap {
            wrap_text(text, self.width)
        } else {
            format!("{text}\n")
        }
    }

    /// One block per alert, in order, followed by a single blank line.
    /// Nothing at all when there are no alerts.
    pub fn alerts(&self, alerts: &[AlertEntry]) -> String {
        let mut out = String::new();
        for alert in alerts {
            out.push_str(&format!("*** {} ***\n", alert.event));
            out.push_str(&self.paragraph(&alert.headline));
            out.push('\n');
            out.push_str(&self.paragraph(&alert.description));
            out.push('\n');
        }
        if !alerts.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn period(&self, period: &ForecastPeriod) -> String {
        let text = format!("{}: {}", period.name, period.detailed_forecast);
        self.paragraph(&text)
    }

    /// Timestamps, alerts and the first `periods` forecast periods.
    ///
    /// An unreadable timestamp is printed in place of its value. A missing
    /// period fails the whole render so the caller can retry the cycle.
    pub fn snapshot(&self, snapshot: &WeatherSnapshot, periods: usize) -> Result<String> {
        let mut out = timestamp_line("Generated", snapshot.generated_at());
        out.push_str(&timestamp_line("Updated", snapshot.updated_at()));
        out.push('\n');

        out.push_str(&self.alerts(snapshot.alerts()));

        for index in 0..periods {
            out.push_str(&self.period(snapshot.forecast_period(index)?));
            out.push('\n');
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::snapshot::fixtures::*;
    use chrono::{TimeZone, Utc};

    fn alert(event: &str) -> AlertEntry {
        AlertEntry {
            event: event.into(),
            headline: format!("{event} headline"),
            description: format!("{event} description"),
        }
    }

    #[test]
    fn wrap_breaks_before_reaching_width() {
        let text =
            "Snow likely after 1am. Cloudy, with a low around 27. Northwest wind around 5 mph.";
        let wrapped = wrap_text(text, 30);

        for line in wrapped.lines() {
            assert!(line.chars().count() < 30, "{line:?}");
        }
        let rejoined: Vec<&str> = wrapped.split_whitespace().collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn wrap_keeps_input_line_breaks_and_overlong_words() {
        assert_eq!(wrap_text("one\ntwo", 80), "one\ntwo\n");
        assert_eq!(wrap_text("abcdefghij xy", 5), "abcdefghij\nxy\n");
        assert_eq!(wrap_text("", 80), "");
    }

    #[test]
    fn no_alerts_renders_nothing() {
        assert_eq!(Renderer::new(true).alerts(&[]), "");
        assert_eq!(Renderer::new(false).alerts(&[]), "");
    }

    #[test]
    fn alerts_render_one_block_each_in_order() {
        let alerts = [
            alert("Flood Watch"),
            alert("Wind Advisory"),
            alert("Frost Advisory"),
        ];
        let out = Renderer::new(false).alerts(&alerts);

        let headers: Vec<&str> = out.lines().filter(|l| l.starts_with("*** ")).collect();
        assert_eq!(
            headers,
            vec![
                "*** Flood Watch ***",
                "*** Wind Advisory ***",
                "*** Frost Advisory ***",
            ]
        );
        assert!(out.starts_with(
            "*** Flood Watch ***\nFlood Watch headline\n\nFlood Watch description\n\n"
        ));
        assert!(out.ends_with("Frost Advisory description\n\n\n"));
    }

    #[test]
    fn word_wrap_flag_controls_period_output() {
        let period = ForecastPeriod {
            name: "Tonight".into(),
            detailed_forecast: "word ".repeat(40).trim_end().to_string(),
        };

        let wrapped = Renderer::new(true).with_width(40).period(&period);
        assert!(wrapped.lines().count() > 1);

        let flat = Renderer::new(false).with_width(40).period(&period);
        assert_eq!(flat.lines().count(), 1);
        assert!(flat.starts_with("Tonight: word word"));
    }

    #[test]
    fn snapshot_renders_requested_periods() {
        let snap = parsed(FORECAST_JSON, ALERTS_JSON);
        let out = Renderer::new(true).snapshot(&snap, 2).unwrap();

        let generated = Utc
            .with_ymd_and_hms(2024, 1, 5, 13, 20, 31)
            .unwrap()
            .with_timezone(&Local);
        let expected = format!("Generated: \t{}\n", format_timestamp(&generated));
        assert!(out.starts_with(&expected));
        assert!(out.contains("*** Winter Storm Warning ***"));
        assert!(out.contains("This Afternoon: Mostly cloudy"));
        assert!(out.contains("Tonight: Snow likely"));
        assert!(!out.contains("Saturday"));
    }

    #[test]
    fn bad_timestamp_is_printed_in_its_own_line_only() {
        let forecast = FORECAST_JSON.replace(GENERATED_AT, "yesterday");
        let snap = parsed(&forecast, ALERTS_JSON);
        let out = Renderer::new(true).snapshot(&snap, 3).unwrap();

        let first = out.lines().next().unwrap();
        let (label, value) = first.split_once('\t').unwrap();
        assert_eq!(label, "Generated: ");
        assert!(value.starts_with("Malformed forecast document"));
        assert!(value.contains("yesterday"));
        let second = out.lines().nth(1).unwrap();
        assert!(second.starts_with("Updated: \t2024-Jan-0"));
        assert!(out.contains("*** Winter Storm Warning ***"));
        assert!(out.contains("Saturday: Snow."));
    }

    #[test]
    fn snapshot_fails_when_too_many_periods_requested() {
        let snap = parsed(FORECAST_JSON, NO_ALERTS_JSON);
        let err = Renderer::new(true).snapshot(&snap, 7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn timestamp_format_matches_console_style() {
        let ts = Local.with_ymd_and_hms(2024, 1, 5, 8, 20, 31).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-Jan-05 08:20:31");
    }
}
