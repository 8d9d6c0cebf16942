//! Release-asset auto-detection.
//!
//! Picks the one correct downloadable artifact for the local OS and
//! architecture from a release's asset list, without per-release
//! configuration. The default pipeline is an ordered sequence of filters,
//! each removing candidates that fail it:
//!
//! 1. drop checksum/signature files
//! 2. drop Linux distribution packages (`.deb`/`.rpm`/`.apk`)
//! 3. keep only names matching the OS
//! 4. keep only names matching the architecture
//!
//! After each stage: zero survivors fail immediately (no backtracking to a
//! looser stage); exactly one survivor is returned immediately, skipping
//! later stages; more than one proceeds. If every stage completes with
//! several survivors the detection is ambiguous — the engine never guesses.
//!
//! A user-supplied override pattern replaces the pipeline entirely and
//! must match exactly one asset.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DetectError;
use crate::net::Asset;
use crate::platform::{Arch, Os, Platform};

const CHECKSUM_SUFFIXES: &[&str] = &[
    ".sha256", ".sha512", ".sha1", ".md5", ".checksum", ".sum", ".sig", ".asc", ".pem", ".sbom",
];

const DISTRO_PACKAGE_SUFFIXES: &[&str] = &[".deb", ".rpm", ".apk"];

fn static_regex(pattern: &'static str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

static LINUX: LazyLock<Regex> = LazyLock::new(|| static_regex(r"(?i)linux"));
static DARWIN: LazyLock<Regex> = LazyLock::new(|| static_regex(r"(?i)(darwin|mac(os)?|apple|osx)"));
// "win" only at a token boundary, so "darwin" never reads as Windows.
static WINDOWS: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"(?i)(windows|(^|[^a-z])win(32|64)?([^a-z]|$))"));

static X86_64: LazyLock<Regex> = LazyLock::new(|| static_regex(r"(?i)(x86[_-]?64|amd64|x64)"));
static AARCH64: LazyLock<Regex> = LazyLock::new(|| static_regex(r"(?i)(arm64|aarch64)"));
static X86: LazyLock<Regex> = LazyLock::new(|| static_regex(r"(?i)(i?386|x86[_-]?32|i686)"));

fn os_regex(os: Os) -> &'static Regex {
    match os {
        Os::Linux => &LINUX,
        Os::Macos => &DARWIN,
        Os::Windows => &WINDOWS,
    }
}

fn arch_regex(arch: Arch) -> &'static Regex {
    match arch {
        Arch::X86_64 => &X86_64,
        Arch::Aarch64 => &AARCH64,
        Arch::X86 => &X86,
    }
}

fn is_checksum(name: &str) -> bool {
    let lower = name.to_lowercase();
    CHECKSUM_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

fn is_distro_package(name: &str) -> bool {
    let lower = name.to_lowercase();
    DISTRO_PACKAGE_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}

/// Select the asset for `platform`, or apply the user's override pattern.
///
/// # Errors
///
/// Returns a [`DetectError`] when a stage eliminates every candidate, when
/// several candidates survive all stages, or when an override pattern does
/// not match exactly one asset.
pub fn auto_detect<'a>(
    assets: &'a [Asset],
    platform: Platform,
    override_pattern: Option<&str>,
) -> Result<&'a Asset, DetectError> {
    if let Some(pattern) = override_pattern {
        return detect_by_pattern(assets, pattern);
    }

    let os = os_regex(platform.os);
    let arch = arch_regex(platform.arch);

    let not_checksum = |name: &str| !is_checksum(name);
    let not_package = |name: &str| !is_distro_package(name);
    let matches_os = |name: &str| os.is_match(name);
    let matches_arch = |name: &str| arch.is_match(name);

    let stages: [(&'static str, &dyn Fn(&str) -> bool); 4] = [
        ("checksum", &not_checksum),
        ("distro-package", &not_package),
        ("os", &matches_os),
        ("arch", &matches_arch),
    ];

    let mut candidates: Vec<&Asset> = assets.iter().collect();
    for (stage, keep) in stages {
        let survivors: Vec<&Asset> = candidates
            .iter()
            .copied()
            .filter(|asset| keep(&asset.name))
            .collect();

        if survivors.is_empty() {
            return Err(DetectError::DetectionFailed { stage });
        }
        if let [only] = survivors.as_slice() {
            return Ok(*only);
        }
        candidates = survivors;
    }

    Err(DetectError::AmbiguousAsset {
        candidates: candidates
            .iter()
            .map(|asset| asset.name.clone())
            .collect(),
    })
}

fn detect_by_pattern<'a>(assets: &'a [Asset], pattern: &str) -> Result<&'a Asset, DetectError> {
    let re = Regex::new(pattern).map_err(|source| DetectError::BadPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut matches = assets.iter().filter(|asset| re.is_match(&asset.name));
    match (matches.next(), matches.next()) {
        (None, _) => Err(DetectError::NoPatternMatch(pattern.to_string())),
        (Some(only), None) => Ok(only),
        (Some(_), Some(_)) => Err(DetectError::AmbiguousPatternMatch {
            pattern: pattern.to_string(),
            count: 2 + matches.count(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets(names: &[&str]) -> Vec<Asset> {
        names
            .iter()
            .map(|name| Asset {
                name: (*name).to_string(),
                download_url: format!("https://example.com/{name}"),
            })
            .collect()
    }

    const LINUX_AMD64: Platform = Platform::new(Os::Linux, Arch::X86_64);

    #[test]
    fn selects_matching_os_and_arch() {
        let list = assets(&[
            "tool_linux_amd64",
            "tool_darwin_amd64",
            "tool_windows_amd64.exe",
        ]);
        let asset = auto_detect(&list, LINUX_AMD64, None).unwrap();
        assert_eq!(asset.name, "tool_linux_amd64");
    }

    #[test]
    fn distro_packages_removed_before_os_matching() {
        let list = assets(&[
            "pkg_1.0_amd64.deb",
            "pkg-1.0-x86_64-unknown-linux-musl.tar.gz",
        ]);
        let asset = auto_detect(&list, LINUX_AMD64, None).unwrap();
        assert_eq!(asset.name, "pkg-1.0-x86_64-unknown-linux-musl.tar.gz");
    }

    #[test]
    fn ambiguous_when_all_stages_leave_several() {
        let list = assets(&["pkg-linux-amd64-a", "pkg-linux-amd64-b"]);
        let err = auto_detect(&list, LINUX_AMD64, None).unwrap_err();
        assert!(matches!(err, DetectError::AmbiguousAsset { ref candidates } if candidates.len() == 2));
    }

    #[test]
    fn checksum_files_dropped_first() {
        let list = assets(&["tool_linux_amd64", "tool_linux_amd64.sha256"]);
        let asset = auto_detect(&list, LINUX_AMD64, None).unwrap();
        assert_eq!(asset.name, "tool_linux_amd64");
    }

    #[test]
    fn single_survivor_returned_without_later_stages() {
        // The only non-checksum asset wins even though it names no OS.
        let list = assets(&["tool.tar.gz", "tool.tar.gz.sha256"]);
        let asset = auto_detect(&list, LINUX_AMD64, None).unwrap();
        assert_eq!(asset.name, "tool.tar.gz");
    }

    #[test]
    fn failing_stage_is_named_without_backtracking() {
        let list = assets(&["tool_darwin_amd64", "tool_windows_amd64.exe"]);
        let err = auto_detect(&list, LINUX_AMD64, None).unwrap_err();
        assert!(matches!(err, DetectError::DetectionFailed { stage: "os" }));
    }

    #[test]
    fn arch_stage_failure_named() {
        let list = assets(&["tool_linux_arm64", "tool_linux_armv7"]);
        let err = auto_detect(&list, LINUX_AMD64, None).unwrap_err();
        assert!(matches!(err, DetectError::DetectionFailed { stage: "arch" }));
    }

    #[test]
    fn empty_asset_list_fails_at_first_stage() {
        let err = auto_detect(&[], LINUX_AMD64, None).unwrap_err();
        assert!(matches!(err, DetectError::DetectionFailed { stage: "checksum" }));
    }

    #[test]
    fn darwin_is_not_mistaken_for_windows() {
        let list = assets(&["tool_darwin_arm64", "tool_windows_arm64.zip"]);
        let platform = Platform::new(Os::Windows, Arch::Aarch64);
        let asset = auto_detect(&list, platform, None).unwrap();
        assert_eq!(asset.name, "tool_windows_arm64.zip");
    }

    #[test]
    fn macos_aliases_match() {
        for name in ["t-macos-arm64", "t-darwin-arm64", "t-apple-arm64", "t-osx-arm64"] {
            let list = assets(&[name, "t-linux-arm64"]);
            let platform = Platform::new(Os::Macos, Arch::Aarch64);
            let asset = auto_detect(&list, platform, None).unwrap();
            assert_eq!(asset.name, name);
        }
    }

    #[test]
    fn arch_aliases_match() {
        let list = assets(&["t-linux-x64", "t-linux-arm64"]);
        let asset = auto_detect(&list, LINUX_AMD64, None).unwrap();
        assert_eq!(asset.name, "t-linux-x64");
    }

    #[test]
    fn override_pattern_replaces_pipeline() {
        let list = assets(&["tool-musl.tar.gz", "tool-gnu.tar.gz"]);
        let asset = auto_detect(&list, LINUX_AMD64, Some("musl")).unwrap();
        assert_eq!(asset.name, "tool-musl.tar.gz");
    }

    #[test]
    fn override_pattern_must_match_exactly_one() {
        let list = assets(&["tool-a.tar.gz", "tool-b.tar.gz"]);
        let err = auto_detect(&list, LINUX_AMD64, Some("tool")).unwrap_err();
        assert!(matches!(
            err,
            DetectError::AmbiguousPatternMatch { count: 2, .. }
        ));

        let err = auto_detect(&list, LINUX_AMD64, Some("zzz")).unwrap_err();
        assert!(matches!(err, DetectError::NoPatternMatch(_)));
    }

    #[test]
    fn invalid_override_pattern_is_reported() {
        let list = assets(&["tool.tar.gz"]);
        let err = auto_detect(&list, LINUX_AMD64, Some("(unclosed")).unwrap_err();
        assert!(matches!(err, DetectError::BadPattern { .. }));
    }
}
