//! snapsort-core: content-hash deduplication and canonical organization
//! for photo and image trees.
//!
//! Two workflows share the same building blocks: [`dedup::DuplicateFinder`]
//! finds and prunes byte-identical files in place, and
//! [`organize::Organizer`] moves a messy input tree into a dated,
//! device-tagged output layout. Neither persists any state; every run
//! re-derives everything from the tree itself.

pub mod camera;
pub mod classify;
pub mod cleanup;
pub mod collision;
pub mod config;
pub mod dates;
pub mod dedup;
pub mod domain;
pub mod error;
pub mod formats;
pub mod hasher;
pub mod metadata;
pub mod naming;
pub mod organize;
pub mod retention;

pub use config::OrganizerConfig;
pub use dedup::{DedupProgress, DuplicateFinder};
pub use domain::{
    CameraInfo, DateSource, DuplicateGroup, FileRecord, ImageKind, NamingPlan, ResolvedDate,
    RetentionPolicy,
};
pub use error::{Error, Result};
pub use metadata::{ExifTool, MetadataSource};
pub use organize::{OrganizeProgress, OrganizeSummary, Organizer};
pub use retention::{remove_duplicates, RemovalSummary};
