//! revbrowse - Revision-aware repository browsing
//!
//! This crate lists the contents of a versioned submission repository at any
//! path and revision. Each entry carries its provenance (when it last
//! changed, in which revision, by whom) and a navigation target, ready for a
//! repository browser to render.
//!
//! # Example
//!
//! ```no_run
//! use revbrowse::browser::{BrowserConfig, RepoBrowser};
//!
//! let config = BrowserConfig::new("./group_0001").root_folder("A1");
//! let browser = RepoBrowser::open_with_config(config).unwrap();
//! let listing = browser.latest_listing(&browser.request("src")).unwrap();
//! for row in listing.rows() {
//!     println!("{} r{} {}", row.name, row.last_modified_revision, row.revision_by);
//! }
//! ```

pub mod browse;
pub mod browser;
pub mod storage;
