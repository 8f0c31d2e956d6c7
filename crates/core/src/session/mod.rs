//! Sites, forms and the calculator session.
//!
//! A [`Session`] owns every site and the current selection, and saves
//! itself through an injected [`KeyValueStore`](crate::storage::KeyValueStore)
//! after each change.

pub mod error;
pub mod form;
pub mod service;
pub mod site;

pub use error::SessionError;
pub use form::{Form, HistorySnapshot};
pub use service::{CalculationReport, Session};
pub use site::{Site, SiteColor, SiteStatistics};
