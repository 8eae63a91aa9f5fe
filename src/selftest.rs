//! Built-in self-test
//!
//! Runs a fixed set of canned cases through [`Replacer`] with in-memory
//! adapters and reports each one through the caller's logger.

use log::{info, warn};
use serde::Serialize;

use crate::cancel::AbortFlag;
use crate::config::ReplaceOptions;
use crate::engine::Replacer;
use crate::io::{SliceSource, VecSink};
use crate::streaming::Needle;
use crate::telemetry::Logger;

/// One canned case
#[derive(Debug, Clone, Copy)]
pub struct SelfTestCase {
    pub dry_run: bool,
    pub case_insensitive: bool,
    pub needle: &'static [u8],
    pub replacement: &'static [u8],
    pub haystack: &'static [u8],
    pub expected: &'static [u8],
}

impl SelfTestCase {
    /// Run this case; true if the flushed output equals `expected`
    pub fn check(&self, abort: &AbortFlag) -> bool {
        let options = ReplaceOptions {
            dry_run: self.dry_run,
            case_insensitive: self.case_insensitive,
            ..Default::default()
        };
        let replacer = match Needle::new(self.needle)
            .map_err(Into::into)
            .and_then(|needle| Replacer::new(needle, self.replacement, options))
        {
            Ok(replacer) => replacer,
            Err(e) => {
                warn!("self-test case rejected: {}", e);
                return false;
            }
        };

        let mut source = SliceSource::new(self.haystack);
        let mut sink = VecSink::with_limit(self.expected.len() + 2);
        match replacer.run(&mut source, &mut sink, abort, None) {
            Ok(_) => {
                sink.flushed() == Some(self.expected.len()) && sink.as_bytes() == self.expected
            }
            Err(e) => {
                warn!("self-test case failed: {}", e);
                false
            }
        }
    }
}

/// Outcome of [`run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelfTestReport {
    pub passed: usize,
    pub failed: usize,
    /// Stopped early through the abort flag
    pub aborted: bool,
}

impl SelfTestReport {
    pub fn success(&self) -> bool {
        self.failed == 0 && !self.aborted
    }
}

/// Run every case in [`CASES`], stopping early on abort
pub fn run(abort: &AbortFlag, mut logger: Option<&mut dyn Logger>) -> SelfTestReport {
    let mut report = SelfTestReport::default();

    for (index, case) in CASES.iter().enumerate() {
        let line = if case.check(abort) {
            report.passed += 1;
            format!("[Self-Test] Test case #{:02} succeeded.", index + 1)
        } else {
            report.failed += 1;
            format!("[Self-Test] Test case #{:02} failed !!!", index + 1)
        };
        info!("{}", line);
        if let Some(logger) = logger.as_deref_mut() {
            logger.log(&line);
        }

        if abort.is_aborted() {
            report.aborted = true;
            break;
        }
    }

    report
}

/// Canned cases: literal, deletion, expansion, overlapping prefixes,
/// trailing and leading near-misses, dry run and case folding
pub const CASES: &[SelfTestCase] = &[
    SelfTestCase {
        dry_run: false,
        case_insensitive: false,
        needle: b"LTs3kx",
        replacement: b"XJbf3A",
        haystack: b"KJnsbsniWReHocwWghHKmtwue7zLXvT9Ai3twkgmHRahFxTV3EggbHptv7toJhdKWCyJ93vPmUqXVtwCuJvpvY9Avu4cojuRwknv7HCYpyNvzJWtdwvEEpsNNyq9JAay",
        expected: b"KJnsbsniWReHocwWghHKmtwue7zLXvT9Ai3twkgmHRahFxTV3EggbHptv7toJhdKWCyJ93vPmUqXVtwCuJvpvY9Avu4cojuRwknv7HCYpyNvzJWtdwvEEpsNNyq9JAay",
    },
    SelfTestCase {
        dry_run: false,
        case_insensitive: false,
        needle: b"LTs3kx",
        replacement: b"XJbf3B",
        haystack: b"KJnsbsniWReHocwWghHKmtwue7zLXvT9Ai3twkgmHRahFxTV3EggbHpLTs3kxhdKWCyJ93vPmUqXVtwCuJvpvY9Avu4cojuRwknv7HCYpyNvzJWtdwvEEpsNNyq9JAay",
        expected: b"KJnsbsniWReHocwWghHKmtwue7zLXvT9Ai3twkgmHRahFxTV3EggbHpXJbf3BhdKWCyJ93vPmUqXVtwCuJvpvY9Avu4cojuRwknv7HCYpyNvzJWtdwvEEpsNNyq9JAay",
    },
    SelfTestCase {
        dry_run: false,
        case_insensitive: false,
        needle: b"LTs3kx",
        replacement: b"",
        haystack: b"KJnsbsniWReHocwWghHKmtwue7zLXvT9Ai3twkgmHRahFxTV3EggbHpLTs3kxhdKWCyJ93vPmUqXVtwCuJvpvY9Avu4cojuRwknv7HCYpyNvzJWtdwvEEpsNNyq9JAay",
        expected: b"KJnsbsniWReHocwWghHKmtwue7zLXvT9Ai3twkgmHRahFxTV3EggbHphdKWCyJ93vPmUqXVtwCuJvpvY9Avu4cojuRwknv7HCYpyNvzJWtdwvEEpsNNyq9JAay",
    },
    SelfTestCase {
        dry_run: false,
        case_insensitive: false,
        needle: b"LTs3kx",
        replacement: b"H4n3zWoHKfbX",
        haystack: b"KJnsbsniWReHocwWghHKmtwue7zLXvT9Ai3twkgmHRahFxTV3EggbHpLTs3kxhdKWCyJ93vPmUqXVtwCuJvpvY9Avu4cojuRwknv7HCYpyNvzJWtdwvEEpsNNyq9JAay",
        expected: b"KJnsbsniWReHocwWghHKmtwue7zLXvT9Ai3twkgmHRahFxTV3EggbHpH4n3zWoHKfbXhdKWCyJ93vPmUqXVtwCuJvpvY9Avu4cojuRwknv7HCYpyNvzJWtdwvEEpsNNyq9JAay",
    },
    SelfTestCase {
        dry_run: false,
        case_insensitive: false,
        needle: b"ababaa",
        replacement: b"YJbg3A",
        haystack: b"aaabaaaabbbaaabbaaaabaaaaabbabbaaaa3aabbbabbaabbbbabbabbbbbbbaabaaaabbaaabbbaaabbbaaaaababaaaaabaaabababaabbabbbabaabaAabaaabbaa",
        expected: b"aaabaaaabbbaaabbaaaabaaaaabbabbaaaa3aabbbabbaabbbbabbabbbbbbbaabaaaabbaaabbbaaabbbaaaaYJbg3AaaabaaabYJbg3AbbabbbabaabaAabaaabbaa",
    },
    SelfTestCase {
        dry_run: false,
        case_insensitive: false,
        needle: b"abcabd",
        replacement: b"XJcf3A",
        haystack: b"abbaccddbcccacbddabcabcdacdbcabcdcccbcdcadbdddcabbcadcdccbabaabacccccabcababcabddbcbbcaadccab4dbaddbdccbdcdbcXccbbbcabbaabdcadccd",
        expected: b"abbaccddbcccacbddabcabcdacdbcabcdcccbcdcadbdddcabbcadcdccbabaabacccccabcabXJcf3Adbcbbcaadccab4dbaddbdccbdcdbcXccbbbcabbaabdcadccd",
    },
    SelfTestCase {
        dry_run: false,
        case_insensitive: false,
        needle: b"bcbbab",
        replacement: b"XIbf3A",
        haystack: b"cbcaccbcaaaacccbaacaaccc3cbccbbbcaacbbcbabEaabaacccccbccbcbabacabbbcbbcbacccbabcabaccaabaaabbabcaababaabacbccbbccbaccccaccbcbbab",
        expected: b"cbcaccbcaaaacccbaacaaccc3cbccbbbcaacbbcbabEaabaacccccbccbcbabacabbbcbbcbacccbabcabaccaabaaabbabcaababaabacbccbbccbaccccaccXIbf3A",
    },
    SelfTestCase {
        dry_run: false,
        case_insensitive: false,
        needle: b"bcbbab",
        replacement: b"WJbf3A",
        haystack: b"cbcaccbcaaaacccbaacaaccc3cbccbbbcaacbbcbabEaabaacccccbccbcbabacabbbcbbcbacccbabcabaccaabaaabbabcaababaabacbccbbccbaccccaccbbcbba",
        expected: b"cbcaccbcaaaacccbaacaaccc3cbccbbbcaacbbcbabEaabaacccccbccbcbabacabbbcbbcbacccbabcabaccaabaaabbabcaababaabacbccbbccbaccccaccbbcbba",
    },
    SelfTestCase {
        dry_run: false,
        case_insensitive: false,
        needle: b"bcbbab",
        replacement: b"XJbf2A",
        haystack: b"bcbbacbcaccbcaaaacccbaacaaccc3cbccbbbcaacbbcbabEaabaacccccbccbcbabacabbbcbbcbacccbabcabaccaabaaabbabcaababaabacbccbbccbaccccaccb",
        expected: b"bcbbacbcaccbcaaaacccbaacaaccc3cbccbbbcaacbbcbabEaabaacccccbccbcbabacabbbcbbcbacccbabcabaccaabaaabbabcaababaabacbccbbccbaccccaccb",
    },
    SelfTestCase {
        dry_run: false,
        case_insensitive: false,
        needle: b"kokos",
        replacement: b"XJbf4",
        haystack: b"xxxkokofxxxkokosnussxxxkokokoxxxxxxkokofxxxkokosnussxxxkokokoxxxxxxkokofxxxkokosnussxxxkokokoxxxxxxkokofxxxkokosnussxxxkokokoxxx",
        expected: b"xxxkokofxxxXJbf4nussxxxkokokoxxxxxxkokofxxxXJbf4nussxxxkokokoxxxxxxkokofxxxXJbf4nussxxxkokokoxxxxxxkokofxxxXJbf4nussxxxkokokoxxx",
    },
    SelfTestCase {
        dry_run: true,
        case_insensitive: true,
        needle: b"caa",
        replacement: b"XjQ",
        haystack: b"7ccCAbbCACcAbAcbcbAbCbaCAbbbcAAbcWCibcCaACabCabCcCAbacAcAAcaCCbCbCcCCccbaaAaCAaaAcbCCCcAbaAcccAaAAbCcCCCAabbCACccCCCAcCacAAcCccC",
        expected: b"7ccCAbbCACcAbAcbcbAbCbaCAbbbcAAbcWCibcCaACabCabCcCAbacAcAAcaCCbCbCcCCccbaaAaCAaaAcbCCCcAbaAcccAaAAbCcCCCAabbCACccCCCAcCacAAcCccC",
    },
    SelfTestCase {
        dry_run: false,
        case_insensitive: true,
        needle: b"caa",
        replacement: b"XjQ",
        haystack: b"7ccCAbbCACcAbAcbcbAbCbaCAbbbcAAbcWCibcCaACabCabCcCAbacAcAAcaCCbCbCcCCccbaaAaCAaaAcbCCCcAbaAcccAaAAbCcCCCAabbCACccCCCAcCacAAcCccC",
        expected: b"7ccCAbbCACcAbAcbcbAbCbaCAbbbXjQbcWCibcXjQCabCabCcCAbacAXjQcaCCbCbCcCCccbaaAaXjQaAcbCCCcAbaAccXjQAAbCcCCXjQbbCACccCCCAcCaXjQcCccC",
    },
];
