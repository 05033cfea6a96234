//! Lineup and channel-service construction.
//!
//! First phase of a run: one lineup is created for the configured label,
//! and every channel record becomes a Service plus one or more Channel
//! bindings carrying resolved channel numbers.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::convert::ConvertError;
use crate::model::Channel;
use crate::store::GuideStore;
use crate::xmltv::XmltvDocument;

/// A display name that is itself a channel number: digits with an optional
/// decimal part, e.g. `5` or `5.1`.
static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d*\.?\d+$").expect("numeric pattern"));

/// Build the lineup and channel services for one run.
///
/// Service call signs and names obey the first-creation rule: the call
/// sign is set once from the first display name (channel id as fallback)
/// and never overwritten; a second display name replaces only the
/// descriptive name.
pub fn build_lineup_and_services(
    doc: &XmltvDocument,
    lineup_label: &str,
    store: &mut GuideStore,
) -> Result<(), ConvertError> {
    info!(channels = doc.channels.len(), "building lineup and channel services");

    let slug = lineup_label.to_uppercase().replace(' ', "-");
    let lineup_slot = store.find_or_create_lineup(&slug, lineup_label);

    for channel in &doc.channels {
        let key = format!("{}-{}", store.source_id, channel.id);
        let service_id = store.find_or_create_service(&key);

        let service = store.service_mut(service_id);
        if service.call_sign.is_empty() {
            match channel.display_names.first() {
                Some(dn) if !dn.text.is_empty() => {
                    service.call_sign = dn.text.clone();
                    service.name = dn.text.clone();
                }
                _ => service.call_sign = channel.id.clone(),
            }
        }
        if channel.display_names.len() > 1 {
            let second = &channel.display_names[1].text;
            if !second.is_empty() {
                service.name = second.clone();
            }
        }

        if store.service(service_id).logo.is_none() {
            if let Some(icon) = channel.icons.first() {
                let image = store.find_or_create_guide_image(&icon.src);
                let service = store.service_mut(service_id);
                service.logo = Some(image);
                service.logo_url = Some(icon.src.clone());
            }
        }

        // Gather candidate channel numbers: explicit LCN entries first,
        // then any display name that is purely numeric. Set semantics,
        // insertion order preserved.
        let mut candidates: Vec<&str> = Vec::new();
        for lcn in &channel.lcn {
            let token = lcn.trim();
            if !token.is_empty() && !candidates.contains(&token) {
                candidates.push(token);
            }
        }
        for dn in &channel.display_names {
            let token = dn.text.trim();
            if NUMERIC.is_match(token) && !candidates.contains(&token) {
                candidates.push(token);
            }
        }

        let mut bindings = Vec::new();
        if candidates.is_empty() {
            bindings.push(Channel {
                service: service_id,
                number: 0,
                sub_number: 0,
            });
        } else {
            for token in candidates {
                let mut parts = token.split('.');
                let number_part = parts.next().unwrap_or_default();
                let number: i32 =
                    number_part
                        .parse()
                        .map_err(|_| ConvertError::ChannelNumber {
                            channel: channel.id.clone(),
                            token: token.to_string(),
                        })?;
                let sub_number: i32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
                bindings.push(Channel {
                    service: service_id,
                    number,
                    sub_number,
                });
            }
        }

        store.lineup_mut(lineup_slot).channels.extend(bindings);
    }

    Ok(())
}
