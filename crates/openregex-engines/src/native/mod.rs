//! `std::regex` through a compiled shared library.
//!
//! The shim source is embedded in this crate and written to the assets
//! directory on first use, then compiled with the configured C++ compiler.
//! Compilation is skipped whenever the library file already exists; two
//! processes racing on a cold cache may both compile.
//!
//! `std::regex` matches bytes, not characters. A range that cuts through a
//! multi-byte character is widened to the enclosing character boundaries, and
//! consecutive matches that widen to the same span are reported once.

mod ffi;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use libloading::Library;
use openregex_core::flags::{self, FlagBits, FlagSpec};
use openregex_core::{CheatSheetSection, EngineError, Example, Match, RegexEngine, TextIndex};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use self::ffi::{FindMatchesFn, FreeResultFn, NativeResult, RawMatch};
use crate::assets;
use crate::capture::{ByteCapture, build_match};
use crate::error::SetupError;
use crate::prepared;
use crate::reference;
use crate::settings::EngineSettings;
use crate::toolchain;

/// Tracing target for the native engine.
const NATIVE_TARGET: &str = "openregex_engines::native";

const SHIM_SOURCE: &str = include_str!("openregex_shim.cpp");
const SHIM_FILE_NAME: &str = "openregex_shim.cpp";

pub(crate) const CXX_FLAGS: &[FlagSpec] = &[
    FlagSpec::new("IGNORECASE", flags::IGNORECASE),
    FlagSpec::new("MULTILINE", flags::MULTILINE),
];

/// Message shown when the shim returns no result at all.
const GIVE_UP_MESSAGE: &str = "Regex timeout";

/// File name of the compiled shim for the host platform.
fn library_file_name() -> String {
    format!(
        "{}openregex_shim{}",
        std::env::consts::DLL_PREFIX,
        std::env::consts::DLL_SUFFIX
    )
}

/// Outcome of the C++ engine's one-time setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CxxState {
    version: String,
    library: Result<PathBuf, String>,
}

/// The C++ standard library's ECMAScript regex.
#[derive(Debug)]
pub struct CxxEngine {
    version: String,
    library: Result<PathBuf, SetupError>,
}

impl CxxEngine {
    /// Display name of this engine.
    pub const NAME: &'static str = "C++";

    /// Prepares the shim library and resolves the compiler version.
    ///
    /// Setup failures are logged and reported by every later match.
    #[must_use]
    pub fn new(settings: &EngineSettings) -> Self {
        Self::from_prepared(Self::prepare(settings))
    }

    /// Resolves the compiler version and builds the shim if it is missing.
    #[must_use]
    pub fn prepare(settings: &EngineSettings) -> CxxState {
        let compiler = settings.cxx_compiler();
        let check = toolchain::check_version(
            compiler,
            &["--version"],
            "g++",
            toolchain::parse_gxx_version,
            "g++ version not found",
        );
        let library = prepare_library(compiler, &settings.engine_dir("cpp"), check.available);
        if let Err(err) = &library {
            warn!(
                target: NATIVE_TARGET,
                error = %err,
                "C++ engine setup failed"
            );
        }
        CxxState {
            version: check.version,
            library: prepared::export(library),
        }
    }

    /// Adopts prepared state without running the compiler.
    #[must_use]
    pub fn from_prepared(state: CxxState) -> Self {
        Self {
            version: state.version,
            library: prepared::adopt(state.library),
        }
    }

    fn load(&self) -> Result<Library, EngineError> {
        let path = self
            .library
            .as_ref()
            .map_err(|err| err.unavailable(Self::NAME))?;
        // SAFETY: the library is the shim built by this engine; its
        // initialisers have no side effects.
        unsafe { Library::new(path) }.map_err(|err| {
            SetupError::LibraryLoad {
                path: path.clone(),
                message: err.to_string(),
            }
            .unavailable(Self::NAME)
        })
    }
}

/// Materialises the shim source and compiles it if the library is missing.
///
/// `compiler_available` is only consulted when a build is needed.
fn prepare_library(
    compiler: &str,
    dir: &Path,
    compiler_available: Result<(), SetupError>,
) -> Result<PathBuf, SetupError> {
    let library = dir.join(library_file_name());
    if library.exists() {
        return Ok(library);
    }
    compiler_available?;
    let source = assets::materialise(dir, SHIM_FILE_NAME, SHIM_SOURCE)?;
    info!(
        target: NATIVE_TARGET,
        source = %source.display(),
        compiler,
        "compiling C++ shim"
    );
    let staged = dir.join(format!("{}.{}.partial", library_file_name(), std::process::id()));
    let args = [
        OsStr::new("-std=c++17"),
        OsStr::new("-O2"),
        OsStr::new("-shared"),
        OsStr::new("-fPIC"),
        OsStr::new("-o"),
        staged.as_os_str(),
        source.as_os_str(),
    ];
    let output = toolchain::capture(compiler, args).map_err(|err| SetupError::Toolchain {
        program: compiler.to_owned(),
        message: err.to_string(),
    })?;
    if !output.status.success() {
        drop(std::fs::remove_file(&staged));
        return Err(SetupError::CompileFailed {
            source_path: source,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    std::fs::rename(&staged, &library).map_err(|err| SetupError::io(&library, err))?;
    info!(
        target: NATIVE_TARGET,
        library = %library.display(),
        "compiled C++ shim"
    );
    Ok(library)
}

impl RegexEngine for CxxEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn available_flags(&self) -> &[FlagSpec] {
        CXX_FLAGS
    }

    fn cheat_sheet(&self) -> &'static [CheatSheetSection] {
        reference::CXX.sheet
    }

    fn example(&self) -> Option<Example> {
        Some(reference::CXX.example)
    }

    fn raw_match(
        &self,
        pattern: &str,
        text: &str,
        flags: FlagBits,
    ) -> Result<Vec<Match>, EngineError> {
        let library = self.load()?;
        let native_flags = CXX_FLAGS
            .iter()
            .filter(|spec| spec.is_set_in(flags))
            .fold(0, |bits, spec| bits | spec.bits());
        // SAFETY: the symbol types match the declarations in the shim source.
        let (find, free) = unsafe {
            let find = library
                .get::<FindMatchesFn>(ffi::FIND_MATCHES_SYMBOL)
                .map_err(|err| missing_symbol(&err))?;
            let free = library
                .get::<FreeResultFn>(ffi::FREE_RESULT_SYMBOL)
                .map_err(|err| missing_symbol(&err))?;
            (*find, *free)
        };
        // SAFETY: both buffers are valid for the given lengths during the
        // call, and the result is handed to its paired release function.
        let result = unsafe {
            let raw = find(
                text.as_ptr().cast(),
                text.len(),
                pattern.as_ptr().cast(),
                pattern.len(),
                native_flags,
            );
            NativeResult::adopt(&library, raw, free)
        }
        .ok_or(EngineError::NativeGiveUp)?;
        if let Some(message) = result.error() {
            return Err(EngineError::pattern(message));
        }
        let index = TextIndex::new(text);
        let mut matches = result
            .matches()
            .iter()
            .map(|raw| convert_match(&index, text, raw))
            .collect::<Result<Vec<_>, EngineError>>()?;
        matches.dedup_by(|later, earlier| later.span() == earlier.span());
        Ok(matches)
    }

    fn describe_error(&self, error: &EngineError) -> String {
        match error {
            EngineError::NativeGiveUp => GIVE_UP_MESSAGE.to_owned(),
            other => other.to_string(),
        }
    }
}

fn missing_symbol(err: &libloading::Error) -> EngineError {
    EngineError::protocol(format!("C++ shim is missing a symbol: {err}"))
}

/// Widens a byte range to the character boundaries that enclose it.
fn widen_to_chars(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    if start > end || end > text.len() {
        return None;
    }
    let first = (0..=start).rev().find(|&index| text.is_char_boundary(index))?;
    let last = (end..=text.len()).find(|&index| text.is_char_boundary(index))?;
    Some((first, last))
}

/// Slices `text` by a byte range reported by the shim.
fn byte_capture(text: &str, start: usize, end: usize) -> Result<ByteCapture<'_>, EngineError> {
    let invalid =
        || EngineError::protocol(format!("C++ shim reported invalid range {start}..{end}"));
    let (first, last) = widen_to_chars(text, start, end).ok_or_else(invalid)?;
    let slice = text.get(first..last).ok_or_else(invalid)?;
    Ok(ByteCapture {
        start: first,
        end: last,
        text: slice,
    })
}

fn convert_match(index: &TextIndex, text: &str, raw: &RawMatch) -> Result<Match, EngineError> {
    let whole = byte_capture(text, raw.start, raw.end)?;
    let groups = raw
        .groups()
        .iter()
        .map(|group| {
            if group.matched == 0 {
                Ok(None)
            } else {
                byte_capture(text, group.start, group.end).map(Some)
            }
        })
        .collect::<Result<Vec<_>, EngineError>>()?;
    build_match(index, whole, groups, &[])
}

#[cfg(test)]
mod tests;
