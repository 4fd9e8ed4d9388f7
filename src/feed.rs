//! Google News RSS fetcher: one query per configured entity, parsed into
//! [`NewsRecord`]s ready for classification.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use anyhow::Result;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use reqwest::Client;

use crate::config::EntityConfig;
use crate::models::NewsRecord;

const BATCH_SIZE: usize = 8;

/// Fetch recent headlines for every configured entity.
///
/// Per-entity failures are reported and skipped; only client construction
/// fails the whole run. Records are deduplicated by id across entities.
pub async fn fetch_all(
    config: &EntityConfig,
    max_per_entity: usize,
    quiet: bool,
) -> Result<Vec<NewsRecord>> {
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let pb = if !quiet {
        let pb = ProgressBar::new(config.canonical.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut records = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for batch in config.canonical.chunks(BATCH_SIZE) {
        let futures: Vec<_> = batch
            .iter()
            .map(|entity| {
                let client = client.clone();
                let entity = entity.clone();
                async move {
                    let result = fetch_entity(&client, &entity, max_per_entity).await;
                    (entity, result)
                }
            })
            .collect();

        for (entity, result) in join_all(futures).await {
            match result {
                Ok(items) => {
                    for record in items {
                        if seen.insert(record.id.clone()) {
                            records.push(record);
                        }
                    }
                }
                Err(e) => {
                    if !quiet {
                        eprintln!("  ! {}: {}", entity, e);
                    }
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok(records)
}

/// Fetch and parse one entity's RSS search feed.
async fn fetch_entity(client: &Client, entity: &str, max_items: usize) -> Result<Vec<NewsRecord>> {
    let url = format!(
        "https://news.google.com/rss/search?q=%22{}%22&hl=en-US&gl=US&ceid=US:en",
        encode_query(entity)
    );

    let response = client
        .get(&url)
        .header("User-Agent", "vendor-watchr/0.1.0")
        .send()
        .await?
        .error_for_status()?;

    let xml = response.text().await?;
    parse_rss(&xml, entity, max_items)
}

/// Parse the `<item>` elements of an RSS document into news records.
fn parse_rss(xml: &str, entity: &str, max_items: usize) -> Result<Vec<NewsRecord>> {
    let tags = Regex::new(r"<[^>]+>")?;
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut in_item = false;
    let mut current_tag = String::new();
    let mut item = RssItem::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                if tag == "item" {
                    in_item = true;
                    item = RssItem::default();
                } else if in_item {
                    current_tag = tag;
                }
            }
            Ok(Event::Text(ref e)) if in_item => {
                if let Ok(text) = e.unescape() {
                    item.set(&current_tag, &text);
                }
            }
            Ok(Event::CData(ref e)) if in_item => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                item.set(&current_tag, &text);
            }
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                if tag == "item" {
                    in_item = false;
                    if let Some(record) = item.to_record(entity, &tags) {
                        records.push(record);
                        if records.len() >= max_items {
                            break;
                        }
                    }
                    item = RssItem::default();
                } else {
                    current_tag.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}

#[derive(Default, Clone)]
struct RssItem {
    title: String,
    link: String,
    pub_date: String,
    description: String,
}

impl RssItem {
    fn set(&mut self, tag: &str, text: &str) {
        let slot = match tag {
            "title" => &mut self.title,
            "link" => &mut self.link,
            "pubDate" => &mut self.pub_date,
            "description" => &mut self.description,
            _ => return,
        };
        if slot.is_empty() {
            *slot = text.to_string();
        }
    }

    fn to_record(&self, entity: &str, tags: &Regex) -> Option<NewsRecord> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        Some(NewsRecord {
            id: record_id(entity, title, &self.link),
            title: title.to_string(),
            summary: strip_html(&self.description, tags),
            published_at: opt(&self.pub_date),
            source: Some(entity.to_string()),
            link: opt(&self.link),
        })
    }
}

fn opt(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Stable record id from the identifying fields.
fn record_id(entity: &str, title: &str, link: &str) -> String {
    let mut hasher = DefaultHasher::new();
    (entity, title, link).hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Remove markup tags and collapse runs of whitespace.
fn strip_html(text: &str, tags: &Regex) -> String {
    let stripped = tags.replace_all(text, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn encode_query(s: &str) -> String {
    let mut out = String::new();
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>"ASML" - Google News</title>
    <item>
      <title>ASML faces new export controls</title>
      <link>https://example.com/a</link>
      <pubDate>Mon, 23 Jun 2025 08:00:00 GMT</pubDate>
      <description>&lt;a href="https://example.com/a"&gt;ASML faces new export controls&lt;/a&gt;&amp;nbsp;Wire</description>
    </item>
    <item>
      <title>Chip tool shipments rebound</title>
      <link>https://example.com/b</link>
      <pubDate>Sun, 22 Jun 2025 10:00:00 GMT</pubDate>
      <description><![CDATA[<p>Orders recovered in <b>Q2</b>.</p>]]></description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss_items() {
        let records = parse_rss(FEED, "ASML", 10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "ASML faces new export controls");
        assert_eq!(records[0].link.as_deref(), Some("https://example.com/a"));
        assert_eq!(records[0].source.as_deref(), Some("ASML"));
        assert!(records[0].published_at.as_deref().unwrap().contains("2025"));
        assert_eq!(records[1].summary, "Orders recovered in Q2 .");
    }

    #[test]
    fn test_max_items_caps_the_feed() {
        let records = parse_rss(FEED, "ASML", 1).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_record_ids_are_stable_and_distinct() {
        let records = parse_rss(FEED, "ASML", 10).unwrap();
        assert_ne!(records[0].id, records[1].id);
        let again = parse_rss(FEED, "ASML", 10).unwrap();
        assert_eq!(records[0].id, again[0].id);
    }

    #[test]
    fn test_strip_html() {
        let tags = Regex::new(r"<[^>]+>").unwrap();
        assert_eq!(strip_html("<p>Hello <b>world</b></p>", &tags), "Hello world");
        assert_eq!(strip_html("plain text", &tags), "plain text");
    }

    #[test]
    fn test_encode_query() {
        assert_eq!(encode_query("ASML Holding"), "ASML+Holding");
        assert_eq!(encode_query("L'Oréal"), "L%27Or%C3%A9al");
    }
}
