//! C ABI of the native shim and an owning guard for its results.

use std::ffi::{CStr, c_char, c_int};
use std::marker::PhantomData;
use std::ptr::NonNull;

use libloading::Library;

/// Symbol name of the match entry point.
pub(super) const FIND_MATCHES_SYMBOL: &[u8] = b"openregex_find_matches\0";
/// Symbol name of the release function.
pub(super) const FREE_RESULT_SYMBOL: &[u8] = b"openregex_free_result\0";

/// `openregex_find_matches(text, text_len, pattern, pattern_len, flags)`.
pub(super) type FindMatchesFn =
    unsafe extern "C" fn(*const c_char, usize, *const c_char, usize, u32) -> *mut RawResult;
/// `openregex_free_result(result)`.
pub(super) type FreeResultFn = unsafe extern "C" fn(*mut RawResult);

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub(super) struct RawGroup {
    pub(super) start: usize,
    pub(super) end: usize,
    pub(super) matched: c_int,
}

#[repr(C)]
#[derive(Debug)]
pub(super) struct RawMatch {
    pub(super) start: usize,
    pub(super) end: usize,
    group_count: usize,
    groups: *const RawGroup,
}

impl RawMatch {
    /// Groups of this match in declaration order.
    pub(super) fn groups(&self) -> &[RawGroup] {
        // SAFETY: the shim allocates `group_count` groups, or none with a null
        // pointer, and they live as long as the owning result.
        unsafe { borrow_array(self.groups, self.group_count) }
    }
}

#[repr(C)]
#[derive(Debug)]
pub(super) struct RawResult {
    matches: *const RawMatch,
    match_count: usize,
    error: *const c_char,
}

/// Borrows a C array, treating a null pointer as empty.
///
/// # Safety
///
/// A non-null `ptr` must point to `len` initialised values that stay valid
/// for `'a`.
unsafe fn borrow_array<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        return &[];
    }
    // SAFETY: upheld by the caller.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

/// Owns a result allocated by the shim and releases it on drop.
///
/// Bound to the library it came from, so the release function cannot outlive
/// the loaded code.
pub(super) struct NativeResult<'lib> {
    raw: NonNull<RawResult>,
    free: FreeResultFn,
    _library: PhantomData<&'lib Library>,
}

impl<'lib> NativeResult<'lib> {
    /// Takes ownership of `raw`, returning `None` for a null result.
    ///
    /// # Safety
    ///
    /// `raw` must come from `openregex_find_matches` of `library` and `free`
    /// must be that library's `openregex_free_result`.
    pub(super) unsafe fn adopt(
        _library: &'lib Library,
        raw: *mut RawResult,
        free: FreeResultFn,
    ) -> Option<Self> {
        NonNull::new(raw).map(|raw_result| Self {
            raw: raw_result,
            free,
            _library: PhantomData,
        })
    }

    fn result(&self) -> &RawResult {
        // SAFETY: the pointer is non-null and owned by this guard until drop.
        unsafe { self.raw.as_ref() }
    }

    /// Error message reported by the shim, if any.
    pub(super) fn error(&self) -> Option<String> {
        let message = self.result().error;
        if message.is_null() {
            return None;
        }
        // SAFETY: the shim writes a NUL-terminated copy of the message.
        let text = unsafe { CStr::from_ptr(message) };
        Some(text.to_string_lossy().into_owned())
    }

    /// Matches in the order the shim found them.
    pub(super) fn matches(&self) -> &[RawMatch] {
        let result = self.result();
        // SAFETY: the shim allocates `match_count` matches owned by the result.
        unsafe { borrow_array(result.matches, result.match_count) }
    }
}

impl Drop for NativeResult<'_> {
    fn drop(&mut self) {
        // SAFETY: the pointer came from the paired allocation function and is
        // released exactly once.
        unsafe { (self.free)(self.raw.as_ptr()) };
    }
}
