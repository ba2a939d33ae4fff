//! Cisco ASA access-list flattening.
//!
//! This crate turns ASA configuration text into a table of access-control rule
//! rows in which every object and object-group reference is replaced by the
//! concrete addresses and services it stands for.
//!
//! # Pipeline
//!
//! 1. [`line`] classifies each line by its leading keyword.
//! 2. [`registry`] builds the named objects and groups in one pass.
//! 3. [`acl`] parses `access-list ... extended` statements.
//! 4. [`resolver`] flattens nested group references, tolerating cycles and
//!    dangling names.
//! 5. [`expand`] emits the Cartesian product of the resolved fields.
//!
//! [`flatten`] runs the whole pipeline and collects failures and counters.
//!
//! ```
//! use asa_acl_core::{flatten, FlattenOptions};
//!
//! let config = "object-group network WEB\n network-object host 10.0.0.1\n\
//!               access-list IN extended permit tcp any object-group WEB eq 443\n";
//! let report = flatten(config, &FlattenOptions::default());
//! assert_eq!(report.rows[0].destination, "10.0.0.1");
//! assert_eq!(report.rows[0].service, "443");
//! ```

pub mod acl;
pub mod expand;
pub mod flatten;
pub mod format;
pub mod line;
pub mod netmask;
pub mod registry;
pub mod resolver;

pub use acl::{parse, parse_line, AclField, AclOptions, AclStatement, Action, FailureReason, ParseFailure};
pub use expand::{expand, expand_detailed, ExpandedRow, Expansion};
pub use flatten::{flatten, flatten_file, flatten_with_registry, FlattenOptions, FlattenReport, FlattenStats, LoadError};
pub use format::{format_inventory, format_json, format_summary, format_text};
pub use line::{classify, LineKind};
pub use registry::{EntityKind, Member, NetworkDefinition, ObjectGroup, ObjectKind, Registry};
pub use resolver::{resolve, resolve_detailed, Resolution};
