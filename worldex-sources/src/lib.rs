//! worldex-sources
//!
//! Adapters that implement `IndicatorSource` for the public statistics publishers the
//! reconciler knows about. Every adapter splits into an async `fetch` that performs
//! HTTP or file I/O and decodes the payload into JSON or table parts, and a pure
//! `extract` that runs the shared extraction pipeline over those parts.
//!
//! HTTP goes through the injectable [`HttpFetch`] trait, so tests can serve canned
//! bodies without a network.
#![warn(missing_docs)]

/// Payload decoding: workbooks, CSV text, and ZIP archives.
pub mod decode;
/// HTTP abstraction and the `reqwest` implementation.
pub mod http;

mod imf;
mod oecd;
mod owid;
mod sipri;
mod un;
mod unesco;
mod worldbank;

pub use crate::http::{HttpFetch, HttpResponse, ReqwestFetcher};
pub use crate::imf::ImfSource;
pub use crate::oecd::{OecdIndicator, OecdSource};
pub use crate::owid::{OwidChart, OwidSource};
pub use crate::sipri::{SipriSheet, SipriSource};
pub use crate::un::{UnPopulationSource, UnWorkbook};
pub use crate::unesco::{UnescoApiSource, UnescoBulkSource};
pub use crate::worldbank::WorldBankSource;

/// User agent sent with every request; some publishers reject anonymous clients.
pub const USER_AGENT: &str = "Mozilla/5.0 WorldExplorer/1.0";
