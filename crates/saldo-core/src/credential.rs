use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Session cookies scoped to the target platform's domain.
///
/// Resolved once per run and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Credential {
    pairs: Vec<CookiePair>,
    domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePair {
    pub name: String,
    pub value: String,
}

impl Credential {
    pub fn pairs(&self) -> &[CookiePair] {
        &self.pairs
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

/// Expected shape of the cookie file.
#[derive(Deserialize)]
struct CookieFile {
    cookie: String,
}

/// Resolves the session cookie from configured sources.
///
/// Precedence: cookie file first, then the named environment variable.
/// Resolution happens before any browser resource is allocated; an empty
/// result is fatal for the whole run.
pub struct CredentialResolver {
    cookie_file: PathBuf,
    env_var: String,
}

impl CredentialResolver {
    pub fn new(cookie_file: impl Into<PathBuf>, env_var: impl Into<String>) -> Self {
        Self {
            cookie_file: cookie_file.into(),
            env_var: env_var.into(),
        }
    }

    /// Resolve a credential scoped to `domain`.
    pub fn resolve(&self, domain: &str) -> Result<Credential> {
        if let Some(raw) = self.from_file() {
            let pairs = parse_cookie_string(&raw);
            if !pairs.is_empty() {
                tracing::debug!(
                    "resolved {} cookie pair(s) from {}",
                    pairs.len(),
                    self.cookie_file.display()
                );
                return Ok(Credential {
                    pairs,
                    domain: domain.to_string(),
                });
            }
        }

        if let Ok(raw) = std::env::var(&self.env_var) {
            let pairs = parse_cookie_string(&raw);
            if !pairs.is_empty() {
                tracing::debug!(
                    "resolved {} cookie pair(s) from ${}",
                    pairs.len(),
                    self.env_var
                );
                return Ok(Credential {
                    pairs,
                    domain: domain.to_string(),
                });
            }
        }

        Err(Error::MissingCredential(format!(
            "checked {} and ${}",
            self.cookie_file.display(),
            self.env_var
        )))
    }

    /// Read the raw cookie string from the cookie file, if usable.
    ///
    /// A present-but-broken file is not fatal on its own; the environment
    /// variable still gets its turn.
    fn from_file(&self) -> Option<String> {
        let path: &Path = &self.cookie_file;
        if !path.exists() {
            return None;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("could not read {}: {}", path.display(), err);
                return None;
            }
        };

        match serde_json::from_str::<CookieFile>(&content) {
            Ok(file) => Some(file.cookie),
            Err(err) => {
                tracing::warn!("could not parse {}: {}", path.display(), err);
                None
            }
        }
    }
}

/// Split a raw `name=value; name=value` cookie string into pairs.
///
/// Fragments without an `=` are skipped.
pub fn parse_cookie_string(raw: &str) -> Vec<CookiePair> {
    raw.split(';')
        .filter_map(|fragment| {
            let fragment = fragment.trim();
            let (name, value) = fragment.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(CookiePair {
                name: name.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_cookie_file(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("cookie.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_cookie_string_splits_pairs() {
        let pairs = parse_cookie_string("sid=abc; uid=42");

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].name, "sid");
        assert_eq!(pairs[0].value, "abc");
        assert_eq!(pairs[1].name, "uid");
        assert_eq!(pairs[1].value, "42");
    }

    #[test]
    fn test_parse_cookie_string_skips_broken_fragments() {
        let pairs = parse_cookie_string("sid=abc; garbage; =orphan; token=x=y");

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].name, "token");
        assert_eq!(pairs[1].value, "x=y");
    }

    #[test]
    fn test_resolve_prefers_file_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_cookie_file(&dir, r#"{"cookie":"sid=from-file"}"#);

        let var = "SALDO_TEST_PREFERS_FILE";
        unsafe { std::env::set_var(var, "sid=from-env") };

        let resolver = CredentialResolver::new(path, var);
        let credential = resolver.resolve("example.com").unwrap();

        unsafe { std::env::remove_var(var) };

        assert_eq!(credential.pairs().len(), 1);
        assert_eq!(credential.pairs()[0].value, "from-file");
        assert_eq!(credential.domain(), "example.com");
    }

    #[test]
    fn test_resolve_falls_back_to_env() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");

        let var = "SALDO_TEST_ENV_FALLBACK";
        unsafe { std::env::set_var(var, "sid=abc; uid=42") };

        let resolver = CredentialResolver::new(missing, var);
        let credential = resolver.resolve("example.com").unwrap();

        unsafe { std::env::remove_var(var) };

        assert_eq!(credential.pairs().len(), 2);
        assert_eq!(credential.pairs()[0].name, "sid");
    }

    #[test]
    fn test_resolve_fails_when_no_source_yields() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");

        let resolver = CredentialResolver::new(missing, "SALDO_TEST_UNSET_VAR");
        let result = resolver.resolve("example.com");

        assert!(matches!(result, Err(Error::MissingCredential(_))));
    }

    #[test]
    fn test_resolve_unparseable_file_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_cookie_file(&dir, "not json at all");

        let var = "SALDO_TEST_BROKEN_FILE";
        unsafe { std::env::set_var(var, "sid=rescued") };

        let resolver = CredentialResolver::new(path, var);
        let credential = resolver.resolve("example.com").unwrap();

        unsafe { std::env::remove_var(var) };

        assert_eq!(credential.pairs()[0].value, "rescued");
    }

    #[test]
    fn test_resolve_empty_cookie_in_file_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_cookie_file(&dir, r#"{"cookie":""}"#);

        let resolver = CredentialResolver::new(path, "SALDO_TEST_EMPTY_COOKIE_UNSET");
        let result = resolver.resolve("example.com");

        assert!(matches!(result, Err(Error::MissingCredential(_))));
    }
}
