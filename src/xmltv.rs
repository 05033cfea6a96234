//! XMLTV document model and parser.
//!
//! The guide transform consumes a parsed schedule-markup document; this
//! module supplies both the document types and a tolerant event-based
//! parser built on `quick-xml`. Unknown elements and attributes are
//! skipped, missing optional fields default to empty, and any malformed
//! XML stream is reported as an error so the caller can treat the source
//! as absent. File and network I/O stay out of this module — callers hand
//! in a string.

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A parsed guide document: channel definitions plus programme listings.
#[derive(Debug, Clone, Default)]
pub struct XmltvDocument {
    pub channels: Vec<XmltvChannel>,
    pub programmes: Vec<XmltvProgramme>,
}

/// One `<channel>` element.
#[derive(Debug, Clone, Default)]
pub struct XmltvChannel {
    pub id: String,
    pub display_names: Vec<XmltvText>,
    pub icons: Vec<XmltvIcon>,
    pub lcn: Vec<String>,
}

/// Text content with an optional language attribute.
#[derive(Debug, Clone, Default)]
pub struct XmltvText {
    pub text: String,
    pub language: Option<String>,
}

/// An `<icon>` reference with optional pixel dimensions.
#[derive(Debug, Clone, Default)]
pub struct XmltvIcon {
    pub src: String,
    pub width: i32,
    pub height: i32,
}

/// An `<episode-num>` entry tagged with its coding system.
#[derive(Debug, Clone, Default)]
pub struct XmltvEpisodeNum {
    pub system: Option<String>,
    pub text: String,
}

/// A `<rating>` or `<star-rating>` entry: coding system plus value text.
#[derive(Debug, Clone, Default)]
pub struct XmltvRating {
    pub system: Option<String>,
    pub value: String,
}

/// An `<actor>` credit, optionally with the character played.
#[derive(Debug, Clone, Default)]
pub struct XmltvActor {
    pub name: String,
    pub role: Option<String>,
}

/// The `<credits>` block. Role lists preserve document order.
#[derive(Debug, Clone, Default)]
pub struct XmltvCredits {
    pub directors: Vec<String>,
    pub actors: Vec<XmltvActor>,
    pub writers: Vec<String>,
    pub adapters: Vec<String>,
    pub producers: Vec<String>,
    pub composers: Vec<String>,
    pub editors: Vec<String>,
    pub presenters: Vec<String>,
    pub commentators: Vec<String>,
    pub guests: Vec<String>,
}

impl XmltvCredits {
    pub fn is_empty(&self) -> bool {
        self.directors.is_empty()
            && self.actors.is_empty()
            && self.writers.is_empty()
            && self.adapters.is_empty()
            && self.producers.is_empty()
            && self.composers.is_empty()
            && self.editors.is_empty()
            && self.presenters.is_empty()
            && self.commentators.is_empty()
            && self.guests.is_empty()
    }
}

/// One `<programme>` element.
///
/// `start`/`stop` keep the raw `yyyyMMddHHmmss ±hhmm` strings; the schedule
/// builder rewrites them to UTC-normalized form after conversion.
#[derive(Debug, Clone, Default)]
pub struct XmltvProgramme {
    pub channel: String,
    pub start: String,
    pub stop: String,
    pub titles: Vec<XmltvText>,
    pub sub_titles: Vec<XmltvText>,
    pub descriptions: Vec<XmltvText>,
    pub categories: Vec<XmltvText>,
    pub episode_nums: Vec<XmltvEpisodeNum>,
    pub ratings: Vec<XmltvRating>,
    pub star_ratings: Vec<XmltvRating>,
    pub credits: XmltvCredits,
    pub icons: Vec<XmltvIcon>,
    /// `<subtitles>` caption/teletext tracks; presence feeds the series rule.
    pub subtitle_tracks: Vec<String>,
    pub premiere: Option<String>,
    pub language: Option<String>,
    pub date: Option<String>,
    pub new: bool,
    pub previously_shown: bool,
}

/// Parse an XMLTV document from a string.
///
/// Tolerant of unknown elements; returns an error only when the stream
/// itself is malformed (unbalanced tags, bad encoding).
pub fn parse_document(xml: &str) -> Result<XmltvDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut doc = XmltvDocument::default();

    loop {
        match reader.read_event().context("malformed guide document")? {
            Event::Start(e) => match e.name().as_ref() {
                b"channel" => {
                    let channel = parse_channel(&mut reader, &e)?;
                    doc.channels.push(channel);
                }
                b"programme" => {
                    let programme = parse_programme(&mut reader, &e)?;
                    doc.programmes.push(programme);
                }
                b"tv" => {}
                _ => skip_element(&mut reader, &e)?,
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(doc)
}

fn parse_channel(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<XmltvChannel> {
    let mut channel = XmltvChannel {
        id: attr(start, "id").unwrap_or_default(),
        ..Default::default()
    };

    loop {
        match reader.read_event().context("malformed channel element")? {
            Event::Start(e) => match e.name().as_ref() {
                b"display-name" => {
                    let language = attr(&e, "lang");
                    let text = element_text(reader, &e)?;
                    channel.display_names.push(XmltvText { text, language });
                }
                b"lcn" => {
                    channel.lcn.push(element_text(reader, &e)?);
                }
                b"icon" => {
                    channel.icons.push(parse_icon(&e));
                    skip_element(reader, &e)?;
                }
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) => {
                if e.name().as_ref() == b"icon" {
                    channel.icons.push(parse_icon(&e));
                }
            }
            Event::End(e) if e.name().as_ref() == b"channel" => break,
            Event::Eof => anyhow::bail!("unexpected end of document inside <channel>"),
            _ => {}
        }
    }

    Ok(channel)
}

fn parse_programme(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<XmltvProgramme> {
    let mut p = XmltvProgramme {
        channel: attr(start, "channel").unwrap_or_default(),
        start: attr(start, "start").unwrap_or_default(),
        stop: attr(start, "stop").unwrap_or_default(),
        ..Default::default()
    };

    loop {
        match reader.read_event().context("malformed programme element")? {
            Event::Start(e) => match e.name().as_ref() {
                b"title" => {
                    let language = attr(&e, "lang");
                    let text = element_text(reader, &e)?;
                    p.titles.push(XmltvText { text, language });
                }
                b"sub-title" => {
                    let language = attr(&e, "lang");
                    let text = element_text(reader, &e)?;
                    p.sub_titles.push(XmltvText { text, language });
                }
                b"desc" => {
                    let language = attr(&e, "lang");
                    let text = element_text(reader, &e)?;
                    p.descriptions.push(XmltvText { text, language });
                }
                b"category" => {
                    let language = attr(&e, "lang");
                    let text = element_text(reader, &e)?;
                    p.categories.push(XmltvText { text, language });
                }
                b"episode-num" => {
                    let system = attr(&e, "system");
                    let text = element_text(reader, &e)?;
                    p.episode_nums.push(XmltvEpisodeNum { system, text });
                }
                b"rating" => {
                    let rating = parse_rating(reader, &e, b"rating")?;
                    p.ratings.push(rating);
                }
                b"star-rating" => {
                    let rating = parse_rating(reader, &e, b"star-rating")?;
                    p.star_ratings.push(rating);
                }
                b"credits" => parse_credits(reader, &mut p.credits)?,
                b"icon" => {
                    p.icons.push(parse_icon(&e));
                    skip_element(reader, &e)?;
                }
                b"subtitles" => {
                    p.subtitle_tracks.push(attr(&e, "type").unwrap_or_default());
                    skip_element(reader, &e)?;
                }
                b"premiere" => {
                    p.premiere = Some(element_text(reader, &e)?);
                }
                b"language" => {
                    p.language = Some(element_text(reader, &e)?);
                }
                b"date" => {
                    p.date = Some(element_text(reader, &e)?);
                }
                b"new" => {
                    p.new = true;
                    skip_element(reader, &e)?;
                }
                b"previously-shown" => {
                    p.previously_shown = true;
                    skip_element(reader, &e)?;
                }
                _ => skip_element(reader, &e)?,
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"icon" => p.icons.push(parse_icon(&e)),
                b"subtitles" => p.subtitle_tracks.push(attr(&e, "type").unwrap_or_default()),
                b"premiere" => p.premiere = Some(String::new()),
                b"new" => p.new = true,
                b"previously-shown" => p.previously_shown = true,
                _ => {}
            },
            Event::End(e) if e.name().as_ref() == b"programme" => break,
            Event::Eof => anyhow::bail!("unexpected end of document inside <programme>"),
            _ => {}
        }
    }

    Ok(p)
}

/// Read a `<rating>`/`<star-rating>` block: system attribute on the outer
/// element, value from the nested `<value>` child.
fn parse_rating(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    end: &[u8],
) -> Result<XmltvRating> {
    let mut rating = XmltvRating {
        system: attr(start, "system"),
        ..Default::default()
    };

    loop {
        match reader.read_event().context("malformed rating element")? {
            Event::Start(e) => {
                if e.name().as_ref() == b"value" {
                    rating.value = element_text(reader, &e)?;
                } else {
                    skip_element(reader, &e)?;
                }
            }
            Event::End(e) if e.name().as_ref() == end => break,
            Event::Eof => anyhow::bail!("unexpected end of document inside rating"),
            _ => {}
        }
    }

    Ok(rating)
}

fn parse_credits(reader: &mut Reader<&[u8]>, credits: &mut XmltvCredits) -> Result<()> {
    loop {
        match reader.read_event().context("malformed credits element")? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"actor" => {
                        let role = attr(&e, "role");
                        let text = element_text(reader, &e)?;
                        credits.actors.push(XmltvActor { name: text, role });
                    }
                    b"director" => credits.directors.push(element_text(reader, &e)?),
                    b"writer" => credits.writers.push(element_text(reader, &e)?),
                    b"adapter" => credits.adapters.push(element_text(reader, &e)?),
                    b"producer" => credits.producers.push(element_text(reader, &e)?),
                    b"composer" => credits.composers.push(element_text(reader, &e)?),
                    b"editor" => credits.editors.push(element_text(reader, &e)?),
                    b"presenter" => credits.presenters.push(element_text(reader, &e)?),
                    b"commentator" => credits.commentators.push(element_text(reader, &e)?),
                    b"guest" => credits.guests.push(element_text(reader, &e)?),
                    _ => skip_element(reader, &e)?,
                }
            }
            Event::End(e) if e.name().as_ref() == b"credits" => break,
            Event::Eof => anyhow::bail!("unexpected end of document inside <credits>"),
            _ => {}
        }
    }
    Ok(())
}

fn parse_icon(e: &BytesStart) -> XmltvIcon {
    XmltvIcon {
        src: attr(e, "src").unwrap_or_default(),
        width: attr(e, "width").and_then(|v| v.parse().ok()).unwrap_or(0),
        height: attr(e, "height").and_then(|v| v.parse().ok()).unwrap_or(0),
    }
}

/// Collect the text content of the element opened by `start`, skipping any
/// nested children, and consume its end tag.
fn element_text(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<String> {
    let end = start.name().as_ref().to_vec();
    let mut out = String::new();

    loop {
        match reader.read_event().context("malformed element content")? {
            Event::Text(t) => out.push_str(&t.unescape().context("bad text escape")?),
            Event::CData(c) => out.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::Start(e) => skip_element(reader, &e)?,
            Event::End(e) if e.name().as_ref() == end.as_slice() => break,
            Event::Eof => anyhow::bail!("unexpected end of document inside element"),
            _ => {}
        }
    }

    Ok(out)
}

/// Consume everything up to and including the end tag matching `start`.
fn skip_element(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<()> {
    let end = start.name().as_ref().to_vec();
    let mut depth = 0u32;

    loop {
        match reader.read_event().context("malformed element")? {
            Event::Start(e) => {
                if e.name().as_ref() == end.as_slice() {
                    depth += 1;
                }
            }
            Event::End(e) if e.name().as_ref() == end.as_slice() => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Event::Eof => anyhow::bail!("unexpected end of document"),
            _ => {}
        }
    }
}

fn attr(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}
