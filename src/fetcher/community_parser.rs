//! Steam Community response parser
//!
//! Stateless parsing functions for the three documents the collector reads:
//! - vanity lookup XML (`/id/{handle}?xml=1`)
//! - friends listing HTML (`/profiles/{id}/friends`)
//! - game library XML (`/profiles/{id}/games?tab=all&xml=1`)
//!
//! Individual fields are parsed leniently (missing or malformed values fall
//! back to defaults); only a document that is not well-formed at all is an
//! error.

use crate::fetcher::{FetcherError, FetcherResult};
use crate::identifier::SteamId;
use crate::{GameEntry, RelationCandidate};
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;

static HOURS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+(?:[.,][0-9]+)?)").expect("static regex"));

static PROFILE_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/profiles/([0-9]{17})(?:[^0-9]|$)").expect("static regex"));

static STEAMID_ATTR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-steamid]").expect("static selector"));

static FRIEND_BLOCK_CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".friend_block_content").expect("static selector"));

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// One step of a depth-first walk over an XML document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XmlEvent<'a> {
    Open(&'a str),
    Text(&'a str),
    Close(&'a str),
}

/// Walk a document, handing every event to `visit` with the open element path
///
/// Fails when the document is not well-formed: syntax errors, mismatched or
/// unclosed tags, no root element, several roots, or text outside the root.
fn walk_xml<F>(xml: &[u8], mut visit: F) -> FetcherResult<()>
where
    F: FnMut(&[String], XmlEvent<'_>),
{
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            FetcherError::ParseError(format!(
                "XML parse error at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                open_element(&mut stack, &mut saw_root, &name)?;
                visit(&stack, XmlEvent::Open(&name));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                open_element(&mut stack, &mut saw_root, &name)?;
                visit(&stack, XmlEvent::Open(&name));
                visit(&stack, XmlEvent::Close(&name));
                stack.pop();
            }
            Event::End(_) => {
                if let Some(name) = stack.last().cloned() {
                    visit(&stack, XmlEvent::Close(&name));
                    stack.pop();
                }
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                visit_text(&stack, &text, &mut visit)?;
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                visit_text(&stack, &text, &mut visit)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(FetcherError::ParseError(format!(
            "unexpected end of document inside <{open}>"
        )));
    }
    if !saw_root {
        return Err(FetcherError::ParseError(
            "document has no root element".to_string(),
        ));
    }
    Ok(())
}

fn open_element(stack: &mut Vec<String>, saw_root: &mut bool, name: &str) -> FetcherResult<()> {
    if stack.is_empty() {
        if *saw_root {
            return Err(FetcherError::ParseError(format!(
                "second root element <{name}>"
            )));
        }
        *saw_root = true;
    }
    stack.push(name.to_string());
    Ok(())
}

fn visit_text<F>(stack: &[String], text: &str, visit: &mut F) -> FetcherResult<()>
where
    F: FnMut(&[String], XmlEvent<'_>),
{
    if text.trim().is_empty() {
        return Ok(());
    }
    if stack.is_empty() {
        return Err(FetcherError::ParseError(
            "text outside the root element".to_string(),
        ));
    }
    visit(stack, XmlEvent::Text(text));
    Ok(())
}

/// Fields collected for one `<game>` element
#[derive(Debug, Default)]
struct GameFields {
    app_id: String,
    name: String,
    hours_forever: Option<String>,
    hours_recent: Option<String>,
}

impl GameFields {
    fn finish(self) -> Option<GameEntry> {
        let app_id = self.app_id.trim();
        if app_id.is_empty() {
            return None;
        }
        GameEntry::new(
            app_id,
            self.name.trim(),
            CommunityParser::parse_hours(self.hours_forever.as_deref()),
            CommunityParser::parse_hours(self.hours_recent.as_deref()),
        )
        .ok()
    }
}

/// Stateless parser for Steam Community responses
pub struct CommunityParser;

impl CommunityParser {
    /// Extract the SteamID64 from a vanity lookup document
    ///
    /// # Errors
    /// `ParseError` when the document is malformed, has no `steamID64`
    /// element, or the value is not canonical. The source's own `<error>`
    /// text is included when present.
    pub fn parse_vanity_xml(xml: &[u8]) -> FetcherResult<SteamId> {
        let mut steam_id: Option<String> = None;
        let mut source_error: Option<String> = None;

        walk_xml(xml, |stack, event| {
            if let XmlEvent::Text(text) = event {
                match stack.last().map(String::as_str) {
                    Some("steamID64") if steam_id.is_none() => {
                        steam_id = Some(text.trim().to_string());
                    }
                    Some("error") if source_error.is_none() => {
                        source_error = Some(text.trim().to_string());
                    }
                    _ => {}
                }
            }
        })?;

        match (steam_id, source_error) {
            (Some(id), _) => SteamId::parse(&id)
                .map_err(|e| FetcherError::ParseError(format!("steamID64 is not canonical: {e}"))),
            (None, Some(message)) => Err(FetcherError::ParseError(format!(
                "steamID64 not found: {message}"
            ))),
            (None, None) => Err(FetcherError::ParseError("steamID64 not found".to_string())),
        }
    }

    /// Parse every `<game>` element found anywhere in a library document
    ///
    /// Games without an `appID` are skipped. An empty but well-formed document
    /// yields an empty list.
    ///
    /// # Errors
    /// `ParseError` when the document is not well-formed XML
    pub fn parse_library_xml(xml: &[u8]) -> FetcherResult<Vec<GameEntry>> {
        let mut games = Vec::new();
        let mut open_games: Vec<GameFields> = Vec::new();

        walk_xml(xml, |stack, event| match event {
            XmlEvent::Open("game") => open_games.push(GameFields::default()),
            XmlEvent::Close("game") => {
                if let Some(entry) = open_games.pop().and_then(GameFields::finish) {
                    games.push(entry);
                }
            }
            XmlEvent::Text(text) => {
                let depth = stack.len();
                if depth < 2 || stack[depth - 2] != "game" {
                    return;
                }
                let Some(fields) = open_games.last_mut() else {
                    return;
                };
                match stack[depth - 1].as_str() {
                    "appID" => fields.app_id.push_str(text),
                    "name" => fields.name.push_str(text),
                    "hoursOnRecord" => fields.hours_forever.get_or_insert_with(String::new).push_str(text),
                    "hoursLast2Weeks" => fields.hours_recent.get_or_insert_with(String::new).push_str(text),
                    _ => {}
                }
            }
            _ => {}
        })?;

        Ok(games)
    }

    /// Check that a library document is well-formed without keeping its games
    pub fn is_well_formed_xml(xml: &[u8]) -> bool {
        walk_xml(xml, |_, _| {}).is_ok()
    }

    /// Parse the friends from one page of the friends listing
    ///
    /// Primary shape: any element carrying `data-steamid`. Fallback shape,
    /// used only when the primary finds nothing: anchors linking to
    /// `/profiles/<17 digits>`. Values that are not canonical ids are
    /// skipped. Duplicates within the page are kept; callers deduplicate.
    pub fn parse_friends_html(html: &str) -> Vec<RelationCandidate> {
        let document = Html::parse_document(html);

        let mut friends: Vec<RelationCandidate> = document
            .select(&STEAMID_ATTR)
            .filter_map(|el| {
                let raw = el.value().attr("data-steamid")?.trim();
                let steam_id = SteamId::parse(raw).ok()?;
                let name = friend_display_name(&el).unwrap_or_else(|| steam_id.to_string());
                Some(RelationCandidate::friend(steam_id, name))
            })
            .collect();

        if friends.is_empty() {
            friends = document
                .select(&ANCHOR)
                .filter_map(|a| {
                    let href = a.value().attr("href")?;
                    let digits = PROFILE_HREF_RE.captures(href)?.get(1)?.as_str();
                    let steam_id = SteamId::parse(digits).ok()?;
                    let text = collapse_whitespace(&a.text().collect::<String>());
                    let name = if text.is_empty() {
                        steam_id.to_string()
                    } else {
                        text
                    };
                    Some(RelationCandidate::friend(steam_id, name))
                })
                .collect();
        }

        friends
    }

    /// First number in a playtime string, e.g. "1,5 hrs on record" -> 1.5
    ///
    /// Both `.` and `,` are accepted as decimal separators. Anything missing
    /// or unparseable yields zero.
    pub fn parse_hours(text: Option<&str>) -> Decimal {
        let Some(text) = text else {
            return Decimal::ZERO;
        };
        HOURS_RE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| Decimal::from_str(&m.as_str().replace(',', ".")).ok())
            .unwrap_or(Decimal::ZERO)
    }
}

/// Persona name inside a friend block: the first text of
/// `.friend_block_content`, else the first text anywhere in the element
fn friend_display_name(el: &ElementRef<'_>) -> Option<String> {
    el.select(&FRIEND_BLOCK_CONTENT)
        .next()
        .and_then(first_text)
        .or_else(|| first_text(*el))
}

fn first_text(element: ElementRef<'_>) -> Option<String> {
    element
        .text()
        .map(collapse_whitespace)
        .find(|t| !t.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
