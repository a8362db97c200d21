//! Repository locator parsing.
//!
//! A locator is either the `owner/repo` shorthand or a full
//! `https://github.com/owner/repo` URL (an optional `.git` suffix and
//! trailing slash are tolerated in both forms).

use regex::Regex;

use reportforge_shared::{ReportForgeError, Result};

/// A parsed `owner/repo` reference to the remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocator {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoLocator {
    /// Parse a locator string, failing with `InvalidLocator` on any other shape.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        let url_re = Regex::new(r"github\.com/([^/\s]+?)/([^/\s]+?)(?:\.git)?/?$").unwrap();
        if let Some(caps) = url_re.captures(trimmed) {
            return Ok(Self {
                owner: caps[1].to_string(),
                repo: caps[2].to_string(),
            });
        }

        if !trimmed.contains("://") {
            let short_re = Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$").unwrap();
            if let Some(caps) = short_re.captures(trimmed) {
                return Ok(Self {
                    owner: caps[1].to_string(),
                    repo: caps[2].to_string(),
                });
            }
        }

        Err(ReportForgeError::InvalidLocator {
            input: input.to_string(),
        })
    }

    /// Canonical directory-listing endpoint for the repository root.
    pub fn contents_url(&self, api_base: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents",
            api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }
}

impl std::fmt::Display for RepoLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl std::str::FromStr for RepoLocator {
    type Err = ReportForgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
