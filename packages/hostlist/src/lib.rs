#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Parsing, storing and rendering compressed lists of cluster node names in the `hostlist`
//! format used by HPC workload managers.
//!
//! Example host list string: `node[0-15,20],gpu[001-008],login`
//!
//! # Format
//!
//! A host list is a sequence of tokens separated by commas, spaces or tabs. Separators inside
//! brackets do not separate tokens. Each token is either:
//!
//! * a plain host name (e.g. `login` or `node7`)
//! * a prefix followed by a bracketed, comma-separated list of numbers and inclusive number
//!   ranges (e.g. `node[1-4,7]`)
//! * either of the above with a second bracket group, where every combination is expanded
//!   (e.g. `rack[1-2]_node[0-9]`) or with text after the brackets (e.g. `node[1-3].ib`)
//!
//! Numbers keep the width they were written with: `gpu[001-008]` renders as `gpu001` to
//! `gpu008`, while `node[8-12]` renders as `node8` to `node12`.
//!
//! On clusters arranged as a multi-dimensional torus, each node name ends in one base-36 digit
//! (`0-9`, `A-Z`) per axis. Configure the dimensionality with
//! [`HostListConfig::builder()`] to enable box items such as `bg[000x133]`, which name every
//! node in the box between two corners, and to render lists as boxes.
//!
//! # Collections
//!
//! * [`HostList`] keeps hosts in the order they were added and permits duplicates.
//! * [`HostSet`] keeps hosts sorted and unique.
//!
//! Both are thread-safe: every operation takes `&self` and locks the collection internally.
//!
//! # Example
//!
//! ```
//! use hostlist::HostList;
//!
//! let hosts = HostList::parse("node[1-3],login,node[4-5]").unwrap();
//! assert_eq!(hosts.count(), 6);
//!
//! hosts.sort();
//! assert_eq!(hosts.ranged_string(), "login,node[1-5]");
//! assert_eq!(
//!     hosts.deranged_string(),
//!     "login,node1,node2,node3,node4,node5"
//! );
//!
//! for host in &hosts {
//!     println!("{host}");
//! }
//! ```
//!
//! Torus coordinates:
//!
//! ```
//! use hostlist::{HostList, HostListConfig};
//!
//! let config = HostListConfig::builder().dimensions(3).build();
//! let hosts = HostList::parse_with_config("bg[012x123]", config).unwrap();
//!
//! assert_eq!(hosts.count(), 8);
//! assert_eq!(hosts.nth(1).as_deref(), Some("bg013"));
//! assert_eq!(hosts.ranged_string(), "bg[012x123]");
//! ```

mod config;
mod coords;
mod error;
mod grid;
mod hostname;
mod iter;
mod list;
mod natural;
mod parse;
mod range;
mod render;
mod set;

pub use config::*;
pub use error::*;
pub use hostname::*;
pub use iter::*;
pub use list::HostList;
pub use range::HostRange;
pub use set::*;
