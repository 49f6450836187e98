//! `java.util.regex` through a helper class run on the JVM.
//!
//! Setup checks for the JVM, downloads the Gson jar the helper uses for JSON
//! output, writes the embedded helper source to the assets directory, and
//! compiles it with `javac` unless the class file already exists. It then
//! asks the helper for `Pattern`'s flag constants once. Each match runs the
//! helper once more.

pub mod fetch;

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use openregex_core::flags::{FlagBits, FlagSpec};
use openregex_core::{CheatSheetSection, EngineError, Example, Match, RegexEngine};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use self::fetch::{ArtifactFetcher, GSON, HttpFetcher, ensure_artifact};
use crate::assets;
use crate::error::SetupError;
use crate::helper;
use crate::prepared;
use crate::reference;
use crate::settings::EngineSettings;
use crate::toolchain;

/// Tracing target for the Java engine.
const JVM_TARGET: &str = "openregex_engines::jvm";

const HELPER_SOURCE: &str = include_str!("OpenRegexCli.java");
const HELPER_CLASS: &str = "OpenRegexCli";
const HELPER_SOURCE_FILE: &str = "OpenRegexCli.java";
const HELPER_CLASS_FILE: &str = "OpenRegexCli.class";
/// Helper argument that prints `NAME=value` for every `Pattern` flag.
const FLAG_TABLE_COMMAND: &str = "flagTable";

/// Lets the helper read named-group tables on JDKs without a public API.
const ADD_OPENS: &str = "--add-opens=java.base/java.util.regex=ALL-UNNAMED";

/// Java's own `Pattern` flag constants.
pub(crate) const JAVA_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("CASE_INSENSITIVE", 2),
    FlagSpec::new("MULTILINE", 8),
    FlagSpec::new("DOTALL", 32),
    FlagSpec::new("UNICODE_CASE", 64),
    FlagSpec::new("COMMENTS", 4),
    FlagSpec::new("LITERAL", 16),
];

/// Where the compiled helper and the jar it depends on live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaHelperPaths {
    class_dir: PathBuf,
    gson: PathBuf,
}

/// Outcome of the Java engine's one-time setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaState {
    version: String,
    java: String,
    helper: Result<JavaHelperPaths, String>,
    flag_values: BTreeMap<String, FlagBits>,
}

/// Compiled helper and the classpath that runs it.
#[derive(Debug, Clone)]
struct JavaHelper {
    classpath: OsString,
}

impl JavaHelper {
    fn from_paths(paths: &JavaHelperPaths, java: &str) -> Result<Self, SetupError> {
        let classpath = std::env::join_paths([paths.class_dir.as_os_str(), paths.gson.as_os_str()])
            .map_err(|err| SetupError::Toolchain {
                program: java.to_owned(),
                message: format!("cannot build classpath: {err}"),
            })?;
        Ok(Self { classpath })
    }
}

/// Java's `java.util.regex.Pattern`.
#[derive(Debug)]
pub struct JavaEngine {
    version: String,
    java: String,
    helper: Result<JavaHelper, SetupError>,
    flag_values: BTreeMap<String, FlagBits>,
}

impl JavaEngine {
    /// Display name of this engine.
    pub const NAME: &'static str = "Java";

    /// Prepares the helper, downloading dependencies over HTTP if needed.
    #[must_use]
    pub fn new(settings: &EngineSettings) -> Self {
        Self::from_prepared(Self::prepare(settings))
    }

    /// Prepares the helper using `fetcher` for missing downloads.
    #[must_use]
    pub fn with_fetcher(settings: &EngineSettings, fetcher: &dyn ArtifactFetcher) -> Self {
        Self::from_prepared(Self::prepare_with_fetcher(settings, fetcher))
    }

    /// Runs the one-time setup, downloading over HTTP if needed.
    #[must_use]
    pub fn prepare(settings: &EngineSettings) -> JavaState {
        Self::prepare_with_fetcher(settings, &HttpFetcher::default())
    }

    /// Runs the one-time setup using `fetcher` for missing downloads.
    ///
    /// Nothing is downloaded when the JVM itself cannot be run.
    #[must_use]
    pub fn prepare_with_fetcher(
        settings: &EngineSettings,
        fetcher: &dyn ArtifactFetcher,
    ) -> JavaState {
        let java = settings.java_binary().to_owned();
        let check = toolchain::check_version(
            &java,
            &["-version"],
            "JDK",
            toolchain::parse_java_version,
            "JDK version unknown",
        );
        let helper = check
            .available
            .and_then(|()| prepare_helper(settings, fetcher));
        let flag_values = match &helper {
            Ok(paths) => query_flag_table(&java, paths),
            Err(err) => {
                warn!(
                    target: JVM_TARGET,
                    error = %err,
                    "Java engine setup failed"
                );
                BTreeMap::new()
            }
        };
        JavaState {
            version: check.version,
            java,
            helper: prepared::export(helper),
            flag_values,
        }
    }

    /// Adopts prepared state without running the JVM.
    #[must_use]
    pub fn from_prepared(state: JavaState) -> Self {
        let helper = prepared::adopt(state.helper)
            .and_then(|paths| JavaHelper::from_paths(&paths, &state.java));
        Self {
            version: state.version,
            java: state.java,
            helper,
            flag_values: state.flag_values,
        }
    }

    fn helper(&self) -> Result<&JavaHelper, EngineError> {
        self.helper
            .as_ref()
            .map_err(|err| err.unavailable(Self::NAME))
    }

    /// Translates advertised flag bits into the values resolved at setup.
    fn java_flags(&self, flags: FlagBits) -> Result<FlagBits, EngineError> {
        JAVA_FLAGS
            .iter()
            .filter(|spec| spec.is_set_in(flags))
            .try_fold(0, |bits, spec| {
                self.flag_values
                    .get(spec.name())
                    .map(|value| bits | value)
                    .ok_or_else(|| {
                        EngineError::protocol(format!(
                            "Java flag {} was not resolved during setup",
                            spec.name()
                        ))
                    })
            })
    }
}

/// Asks the helper for `Pattern`'s flag constants.
///
/// A failed lookup leaves the table empty; matches that set a flag then fail.
fn query_flag_table(java: &str, paths: &JavaHelperPaths) -> BTreeMap<String, FlagBits> {
    let output = JavaHelper::from_paths(paths, java).and_then(|helper| {
        let args = [
            OsStr::new("-cp"),
            helper.classpath.as_os_str(),
            OsStr::new(HELPER_CLASS),
            OsStr::new(FLAG_TABLE_COMMAND),
        ];
        toolchain::capture(java, args).map_err(|err| SetupError::Toolchain {
            program: java.to_owned(),
            message: err.to_string(),
        })
    });
    let output = match output {
        Ok(output) => output,
        Err(err) => {
            warn!(target: JVM_TARGET, error = %err, "Java flag table unavailable");
            return BTreeMap::new();
        }
    };
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        error!(
            target: JVM_TARGET,
            stderr = %stderr.trim(),
            "helper reported an error for the flag table"
        );
    }
    let table = parse_flag_table(&String::from_utf8_lossy(&output.stdout));
    info!(target: JVM_TARGET, resolved = table.len(), "Java flag table resolved");
    table
}

/// Keeps the advertised flags from `NAME=value` lines.
fn parse_flag_table(stdout: &str) -> BTreeMap<String, FlagBits> {
    stdout
        .lines()
        .filter_map(|line| {
            let (name, value) = line.trim().split_once('=')?;
            let bits = value.trim().parse::<FlagBits>().ok()?;
            JAVA_FLAGS
                .iter()
                .any(|spec| spec.name() == name)
                .then(|| (name.to_owned(), bits))
        })
        .collect()
}

/// Downloads Gson, writes the helper source, and compiles it if needed.
fn prepare_helper(
    settings: &EngineSettings,
    fetcher: &dyn ArtifactFetcher,
) -> Result<JavaHelperPaths, SetupError> {
    let dir = settings.engine_dir("java");
    let gson = ensure_artifact(&dir, &GSON, fetcher)?;
    let class_file = dir.join(HELPER_CLASS_FILE);
    if !class_file.exists() {
        let source = assets::materialise(&dir, HELPER_SOURCE_FILE, HELPER_SOURCE)?;
        compile_helper(settings.javac_binary(), &dir, &gson, &source)?;
    }
    Ok(JavaHelperPaths {
        class_dir: dir,
        gson,
    })
}

fn compile_helper(javac: &str, dir: &Path, gson: &Path, source: &Path) -> Result<(), SetupError> {
    warn!(
        target: JVM_TARGET,
        source = %source.display(),
        "Java helper class not found, compiling"
    );
    let args = [
        OsStr::new("-cp"),
        gson.as_os_str(),
        OsStr::new("-d"),
        dir.as_os_str(),
        source.as_os_str(),
    ];
    let output = toolchain::capture(javac, args).map_err(|err| SetupError::Toolchain {
        program: javac.to_owned(),
        message: err.to_string(),
    })?;
    if !output.status.success() {
        return Err(SetupError::CompileFailed {
            source_path: source.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    info!(target: JVM_TARGET, "Java helper compiled");
    Ok(())
}

impl RegexEngine for JavaEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn available_flags(&self) -> &[FlagSpec] {
        JAVA_FLAGS
    }

    fn cheat_sheet(&self) -> &'static [CheatSheetSection] {
        reference::JAVA.sheet
    }

    fn example(&self) -> Option<Example> {
        Some(reference::JAVA.example)
    }

    fn raw_match(
        &self,
        pattern: &str,
        text: &str,
        flags: FlagBits,
    ) -> Result<Vec<Match>, EngineError> {
        let helper = self.helper()?;
        let java_flags = self.java_flags(flags)?.to_string();
        let args = [
            OsStr::new(ADD_OPENS),
            OsStr::new("-cp"),
            helper.classpath.as_os_str(),
            OsStr::new(HELPER_CLASS),
            OsStr::new(pattern),
            OsStr::new(text),
            OsStr::new(&java_flags),
        ];
        let output =
            toolchain::capture(&self.java, args).map_err(|err| EngineError::io(&self.java, err))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            return Err(EngineError::Process {
                stderr: stderr.into_owned(),
            });
        }
        let report = helper::parse_report(&String::from_utf8_lossy(&output.stdout), text)?;
        match report.error {
            Some(message) => Err(EngineError::pattern(message)),
            None => Ok(report.matches),
        }
    }

    fn describe_error(&self, error: &EngineError) -> String {
        match error {
            EngineError::Process { stderr } => format!("Error from java CLI {stderr}"),
            other => other.to_string(),
        }
    }
}
