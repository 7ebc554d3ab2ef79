//! Core domain types for the gatekeeper bot.

pub mod ids;
pub mod label;
pub mod pr;

pub use ids::{DeliveryId, InstallationId, PrNumber, RepoId, Sha};
pub use label::{Label, LabelCategory, LabelSet};
pub use pr::{AuthorAssociation, PrSnapshot};
