//! Conversion driver: one guide-source run from parsed document to
//! published store.
//!
//! The three build phases run strictly in order — channels populate the
//! service registry, programmes reuse it, and keyword paging runs over the
//! finished groups. Publishing is all-or-nothing: a fatal error anywhere
//! means nothing reaches the store registry.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::keywords;
use crate::lineup;
use crate::schedule;
use crate::store::{GuideStore, StoreRegistry};
use crate::xmltv::{self, XmltvDocument};

/// Fatal conversion failures. Tolerable field-level problems never reach
/// this type; they are absorbed where they are parsed.
#[derive(Debug)]
pub enum ConvertError {
    /// A programme start/stop timestamp did not parse; the whole document
    /// is rejected.
    Timestamp {
        field: &'static str,
        value: String,
    },
    /// A channel-number token that matched the numeric pattern failed to
    /// parse — a contract violation that fails the channel build.
    ChannelNumber {
        channel: String,
        token: String,
    },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Timestamp { field, value } => {
                write!(f, "unparsable programme {} timestamp: {:?}", field, value)
            }
            ConvertError::ChannelNumber { channel, token } => {
                write!(
                    f,
                    "channel {:?}: numeric token {:?} failed integer parse",
                    channel, token
                )
            }
        }
    }
}

impl std::error::Error for ConvertError {}

/// Transform a parsed guide document into the normalized store for one
/// guide-source run. The input document's programme timestamps are
/// rewritten in UTC-normalized form as a side effect.
pub fn convert_document(
    doc: &mut XmltvDocument,
    source_id: i32,
    config: &Config,
) -> Result<GuideStore, ConvertError> {
    let mut store = GuideStore::new(source_id);

    lineup::build_lineup_and_services(doc, &config.lineup.name, &mut store)?;
    schedule::build_programs_and_schedule(doc, config, &mut store)?;

    info!(groups = store.keyword_groups.group_count(), "building keyword categories");
    keywords::build_taxonomy(&mut store.keyword_groups);

    Ok(store)
}

/// Full ingest of one guide source: parse, convert, publish.
///
/// An unreadable document is "no result" — `Ok(None)`, nothing published,
/// the caller skips this source. A fatal conversion error aborts without
/// publishing. On success the finished store is published to `registry`
/// under `source_id` and returned.
pub fn ingest(
    raw: &str,
    source_id: i32,
    config: &Config,
    registry: &StoreRegistry,
) -> Result<Option<Arc<GuideStore>>, ConvertError> {
    let mut doc = match xmltv::parse_document(raw) {
        Ok(doc) => doc,
        Err(err) => {
            warn!(source_id, error = %err, "guide document unreadable, skipping source");
            return Ok(None);
        }
    };

    let store = convert_document(&mut doc, source_id, config)?;
    Ok(Some(registry.set(store)))
}
