use std::fmt;

/// Semantic version with optional pre-release identifiers
///
/// Covers exactly the shapes that show up as release tags: `1.2.3` and
/// `1.2.3-beta.4`. Anything else fails to parse and callers fall back to
/// `Version::ZERO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Vec<String>,
}

impl Version {
    pub const ZERO: Version = Version {
        major: 0,
        minor: 0,
        patch: 0,
        prerelease: Vec::new(),
    };

    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: Vec::new(),
        }
    }

    /// Parse `major.minor.patch` with an optional `-pre.release` suffix
    pub fn parse(raw: &str) -> Option<Version> {
        let raw = raw.trim();
        let (core, suffix) = match raw.split_once('-') {
            Some((core, suffix)) => (core, Some(suffix)),
            None => (raw, None),
        };

        let mut numbers = core.split('.');
        let major = numbers.next()?.parse().ok()?;
        let minor = numbers.next()?.parse().ok()?;
        let patch = numbers.next()?.parse().ok()?;
        if numbers.next().is_some() {
            return None;
        }

        let prerelease = match suffix {
            Some(suffix) => {
                let identifiers: Vec<String> =
                    suffix.split('.').map(str::to_string).collect();
                if identifiers.iter().any(|id| id.is_empty()) {
                    return None;
                }
                identifiers
            }
            None => Vec::new(),
        };

        Some(Version {
            major,
            minor,
            patch,
            prerelease,
        })
    }

    /// Suggest the version that follows this one
    ///
    /// The last numeric pre-release identifier is bumped when there is one
    /// (`1.0.0-beta.3` -> `1.0.0-beta.4`). Otherwise the patch component is
    /// bumped, rolling over into minor and then major once a component hits
    /// `ceiling`.
    pub fn next(&self, ceiling: u64) -> Version {
        let mut next = self.clone();
        for identifier in next.prerelease.iter_mut().rev() {
            if let Ok(number) = identifier.parse::<u64>() {
                *identifier = (number + 1).to_string();
                return next;
            }
        }

        next.prerelease.clear();
        if self.patch < ceiling {
            next.patch += 1;
        } else if self.minor < ceiling {
            next.minor += 1;
            next.patch = 0;
        } else {
            next.major += 1;
            next.minor = 0;
            next.patch = 0;
        }
        next
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.prerelease.is_empty() {
            write!(f, "-{}", self.prerelease.join("."))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CEILING: u64 = 99;

    fn next_of(raw: &str) -> String {
        Version::parse(raw)
            .unwrap_or(Version::ZERO)
            .next(CEILING)
            .to_string()
    }

    #[test]
    fn test_parses_plain_and_prerelease_versions() {
        assert_eq!(Version::parse("1.2.3"), Some(Version::new(1, 2, 3)));
        let beta = Version::parse("1.0.0-beta.3").unwrap();
        assert_eq!((beta.major, beta.minor, beta.patch), (1, 0, 0));
        assert_eq!(beta.prerelease, vec!["beta", "3"]);
    }

    #[test]
    fn test_rejects_malformed_versions() {
        assert_eq!(Version::parse("-"), None);
        assert_eq!(Version::parse(""), None);
        assert_eq!(Version::parse("1.2"), None);
        assert_eq!(Version::parse("1.2.3.4"), None);
        assert_eq!(Version::parse("v1.2.3"), None);
        assert_eq!(Version::parse("1.2.x"), None);
        assert_eq!(Version::parse("1.0.0-"), None);
        assert_eq!(Version::parse("1.0.0-beta..3"), None);
    }

    #[test]
    fn test_bumps_patch_by_default() {
        assert_eq!(next_of("1.2.3"), "1.2.4");
        assert_eq!(next_of("0.0.0"), "0.0.1");
    }

    #[test]
    fn test_rolls_over_components_at_the_ceiling() {
        assert_eq!(next_of("1.2.99"), "1.3.0");
        assert_eq!(next_of("1.99.99"), "2.0.0");
    }

    #[test]
    fn test_bumps_trailing_numeric_prerelease_identifier() {
        assert_eq!(next_of("1.0.0-beta.3"), "1.0.0-beta.4");
        assert_eq!(next_of("2.1.0-rc.9"), "2.1.0-rc.10");
    }

    #[test]
    fn test_non_numeric_prerelease_falls_back_to_patch_bump() {
        assert_eq!(next_of("1.0.0-beta"), "1.0.1");
    }

    #[test]
    fn test_missing_tag_sentinel_suggests_first_patch() {
        assert_eq!(next_of("-"), "0.0.1");
    }

    #[test]
    fn test_displays_prerelease_suffix() {
        let version = Version::parse("1.0.0-beta.3").unwrap();
        assert_eq!(version.to_string(), "1.0.0-beta.3");
        assert_eq!(Version::new(4, 5, 6).to_string(), "4.5.6");
    }
}
