// SPDX-License-Identifier: MIT OR Apache-2.0
//! XML codec and BW parsers: normalizes SAP ADT/BW response shapes into
//! typed records.
//!
//! The codec is namespace-agnostic throughout — elements and attributes
//! are matched by local name only, since ADT and BW responses are
//! inconsistent about which prefixes they bind to which URIs (and some
//! fragments carry no root element at all). [`tree::parse_xml_tree`] is
//! the single parsing entry point every other module builds on.

pub mod activation;
pub mod bw;
pub mod discovery;
pub mod generic;
pub mod inactive;
pub mod lock;
pub mod package;
pub mod poll;
pub mod repo;
pub mod tree;

pub use activation::{build_activation_xml, parse_activation_result, parse_object_references, ActivationResult, ObjectReference};
pub use discovery::{parse_discovery, Collection, Discovery};
pub use generic::{harvest_fields, DetailRecord};
pub use inactive::parse_inactive_objects;
pub use lock::{parse_lock_response, LockResult};
pub use package::build_package_create_xml;
pub use poll::{parse_poll_status, PollBodyStatus};
pub use repo::{build_clone_xml, parse_repo_list, RepoInfo, RepoStatus};
pub use tree::{parse_xml_tree, parse_xml_tree_wrapped, XmlElement, XmlParseError};
