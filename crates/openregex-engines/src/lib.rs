//! Regex engine adapters for OpenRegex.
//!
//! Each adapter implements [`openregex_core::RegexEngine`] over a different
//! implementation:
//!
//! - [`RustRegexEngine`] and [`FancyRegexEngine`] run in process.
//! - [`CxxEngine`] compiles an embedded `std::regex` shim into a shared
//!   library and calls it through a C ABI.
//! - [`JavaEngine`] and [`NodeEngine`] run helper programs on the JVM and
//!   Node.js and read one JSON report from stdout.
//!
//! Each adapter's one-time setup (version queries, compiling, downloading)
//! runs once in [`PreparedEngines::prepare`]. The resulting
//! [`PreparedEngine`] states serialise, so a worker process rebuilds an engine
//! with no setup of its own. A failed setup does not prevent construction; the
//! engine instead reports itself unavailable on every match.

mod assets;
mod capture;
pub mod catalog;
pub mod error;
mod helper;
pub mod jvm;
mod native;
mod node;
mod prepared;
mod reference;
mod rust_regex;
pub mod settings;
mod toolchain;

pub use self::catalog::{EngineKind, build_registry};
pub use self::error::{FetchError, SetupError};
pub use self::jvm::{JavaEngine, JavaState};
pub use self::native::{CxxEngine, CxxState};
pub use self::node::{NodeEngine, NodeState};
pub use self::prepared::{PreparedEngine, PreparedEngines};
pub use self::rust_regex::{FancyRegexEngine, RustRegexEngine};
pub use self::settings::EngineSettings;
