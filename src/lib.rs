//! # EPG Harness
//!
//! A guide-feed ingestion and normalization engine for IPTV lineups and
//! electronic program guides.
//!
//! EPG Harness takes a third-party guide feed (channels plus programmes in
//! XMLTV schedule markup) and produces a normalized, de-duplicated guide
//! data store — lineups, services, programs, schedule entries, persons,
//! guide images, and a bounded keyword taxonomy — keyed by a numeric
//! guide-source identifier. The transform is pure, deterministic, and
//! CPU-bound: file I/O lives in the CLI, and the store registry is the
//! only cross-run coordination point.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────────────────────┐   ┌─────────────┐
//! │  XMLTV   │──▶│  Convert                       │──▶│ StoreRegistry│
//! │ document │   │ channels → programmes → paging │   │ (by source) │
//! └──────────┘   └───────────────────────────────┘   └─────────────┘
//! ```
//!
//! One run owns one [`store::GuideStore`]; the three build phases run
//! strictly in order and publishing is all-or-nothing per source.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`xmltv`] | XMLTV document model and parser |
//! | [`config`] | TOML configuration parsing |
//! | [`model`] | Normalized guide entities |
//! | [`store`] | Per-run registries, guide store, publish registry |
//! | [`episode`] | Episode/series identity extraction |
//! | [`classify`] | Category-driven classification rule table |
//! | [`lineup`] | Lineup and channel-service builder |
//! | [`schedule`] | Programme classification and schedule builder |
//! | [`keywords`] | Keyword taxonomy and overflow paging |
//! | [`convert`] | Conversion driver and error taxonomy |

pub mod classify;
pub mod config;
pub mod convert;
pub mod episode;
pub mod keywords;
pub mod lineup;
pub mod model;
pub mod schedule;
pub mod store;
pub mod xmltv;

pub use convert::{convert_document, ingest, ConvertError};
pub use store::{GuideStore, StoreRegistry};
