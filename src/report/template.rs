// src/report/template.rs
//! Report templates and metric snapshots
//!
//! A template is literal text with `[name]` placeholders. Rendering is a
//! pure function of the template, a [`MetricSnapshot`] and the
//! [`Unresolved`] policy for placeholders the snapshot has no value for.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\[([a-z0-9_]+)\]").unwrap();
}

/// Pool status report sent for `!info`
pub const INFO_TEMPLATE: &str = "```Block Height: [block_height]
Difficulty: [difficulty]
Network Hashrate: [network_hashrate] GH/s

Pool Hashrate: [pool_hashrate] GH/s | [percentage]%
Pool Workers: [workers]
Pool Average Luck: [avg_luck]%

Time Since Last Block: [time_since]```";

/// Market report used as the embed description for `!cmc`
pub const MARKET_TEMPLATE: &str = "**Rank:** [rank]
**Price:** $[price_usd] / [price_btc] BTC
**Market Cap:** $[market_cap_usd]
**Circulating Supply:** [available_supply] [symbol]
";

/// Per-user worker report sent for `!myinfo`
pub const WORKER_TEMPLATE: &str = "```Address: [address]
Estimated Hashrate: [hashrate] MH/s
Expected Payout: [payout] GRLC
Share of Pool: [percentage]%```";

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied to the output unchanged
    Literal(String),
    /// A named value substituted at render time
    Placeholder(String),
}

/// What to print for a placeholder with no snapshot value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved<'a> {
    /// Leave the raw `[name]` token in the output
    Keep,
    /// Print the given text instead
    Marker(&'a str),
}

/// Marker printed for missing values unless a caller asks otherwise
pub const UNAVAILABLE: Unresolved<'static> = Unresolved::Marker("unavailable");

/// A parsed report template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Splits `source` into literal and placeholder segments
    ///
    /// Bracketed text that is not a valid placeholder name (for example
    /// `[Not A Name]`) stays literal.
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(source) {
            let whole = caps.get(0).expect("group 0 always matches");
            if whole.start() > last {
                segments.push(Segment::Literal(source[last..whole.start()].to_string()));
            }
            segments.push(Segment::Placeholder(caps[1].to_string()));
            last = whole.end();
        }
        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }

        Template { segments }
    }

    /// Parsed segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Distinct placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Renders with missing values shown as `unavailable`
    pub fn render(&self, snapshot: &MetricSnapshot) -> String {
        self.render_with(snapshot, UNAVAILABLE)
    }

    /// Renders every placeholder from `snapshot`, applying `missing` to the rest
    pub fn render_with(&self, snapshot: &MetricSnapshot, missing: Unresolved<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => match (snapshot.get(name), missing) {
                    (Some(value), _) => out.push_str(value),
                    (None, Unresolved::Keep) => {
                        out.push('[');
                        out.push_str(name);
                        out.push(']');
                    }
                    (None, Unresolved::Marker(marker)) => out.push_str(marker),
                },
            }
        }
        out
    }
}

/// Placeholder name to rendered value, assembled once per report
///
/// Every entry is optional; a failed fetch simply leaves its keys out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricSnapshot {
    values: BTreeMap<String, String>,
}

impl MetricSnapshot {
    /// Creates an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to the display form of `value`
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        self.values.insert(name.into(), value.to_string());
    }

    /// Sets `name` only when a value is present
    pub fn insert_opt<V: ToString>(&mut self, name: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    /// Looks up the value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// True when `name` has a value
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

#[cfg(test)]
impl MetricSnapshot {
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, &str)]) -> MetricSnapshot {
        let mut snap = MetricSnapshot::new();
        for (k, v) in pairs {
            snap.insert(*k, *v);
        }
        snap
    }

    #[test]
    fn test_parse_splits_literals_and_placeholders() {
        let t = Template::parse("Height: [block_height] ([Not A Name])");
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal("Height: ".into()),
                Segment::Placeholder("block_height".into()),
                Segment::Literal(" ([Not A Name])".into()),
            ]
        );
    }

    #[test]
    fn test_info_template_placeholders() {
        let t = Template::parse(INFO_TEMPLATE);
        assert_eq!(
            t.placeholders(),
            vec![
                "block_height",
                "difficulty",
                "network_hashrate",
                "pool_hashrate",
                "percentage",
                "workers",
                "avg_luck",
                "time_since"
            ]
        );
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        let t = Template::parse("[a]-[b]-[a]");
        let out = t.render(&snapshot(&[("a", "1"), ("b", "2")]));
        assert_eq!(out, "1-2-1");
    }

    #[test]
    fn test_render_missing_uses_marker() {
        let t = Template::parse("Luck: [avg_luck]% Workers: [workers]");
        let out = t.render(&snapshot(&[("workers", "12")]));
        assert_eq!(out, "Luck: unavailable% Workers: 12");
    }

    #[test]
    fn test_render_keep_leaves_token() {
        let t = Template::parse("Luck: [avg_luck]%");
        let out = t.render_with(&MetricSnapshot::new(), Unresolved::Keep);
        assert_eq!(out, "Luck: [avg_luck]%");
    }

    #[test]
    fn test_render_is_deterministic_with_empty_snapshot() {
        let t = Template::parse(INFO_TEMPLATE);
        let first = t.render(&MetricSnapshot::new());
        let second = t.render(&MetricSnapshot::new());
        assert_eq!(first, second);
        assert!(!first.contains('['), "no raw placeholders should survive: {first}");
    }

    #[test]
    fn test_market_template_dollar_prefix() {
        let t = Template::parse(MARKET_TEMPLATE);
        let out = t.render(&snapshot(&[("price_usd", "0.05")]));
        assert!(out.contains("**Price:** $0.05 / unavailable BTC"), "{out}");
    }

    #[test]
    fn test_insert_opt_skips_none() {
        let mut snap = MetricSnapshot::new();
        snap.insert_opt("percentage", None::<f64>);
        snap.insert_opt("workers", Some(3));
        assert!(!snap.contains("percentage"));
        assert_eq!(snap.get("workers"), Some("3"));
        assert_eq!(snap.len(), 1);
    }
}
