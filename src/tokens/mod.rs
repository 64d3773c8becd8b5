//! Marker tokens: extraction from descriptions and the session registry.
//!
//! The registry is an ordered set. Built-in tokens come first and can never
//! be removed; custom tokens follow in the order they were added. All
//! membership checks ignore case.

mod extract;

pub use extract::{extract_token, is_token_shaped};

use crate::error::{Result, TaskScopeError};

/// Sentinel token meaning "no token filter".
pub const ALL_TOKEN: &str = "ALL";

/// Tokens present at startup, in display order.
pub const BUILTIN_TOKENS: &[&str] = &[ALL_TOKEN, "TODO", "HACK", "UNDONE", "UNRESOLVEDMERGECONFLICT"];

/// Check whether a token is a protected built-in (case-insensitive).
#[must_use]
pub fn is_builtin(token: &str) -> bool {
    BUILTIN_TOKENS.iter().any(|b| b.eq_ignore_ascii_case(token))
}

/// Ordered set of known marker tokens.
///
/// # Example
///
/// ```
/// use taskscope::tokens::TokenRegistry;
///
/// let mut registry = TokenRegistry::new();
/// registry.add("REVIEW").unwrap();
/// assert!(registry.contains("review"));
/// assert!(registry.remove("TODO").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRegistry {
    tokens: Vec<String>,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self {
            tokens: BUILTIN_TOKENS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

impl TokenRegistry {
    /// Create a registry holding only the built-in tokens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with built-ins followed by the given custom tokens.
    ///
    /// # Errors
    ///
    /// Returns the first rejection from [`TokenRegistry::add`].
    pub fn with_custom<I, S>(custom: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for token in custom {
            registry.add(token.as_ref())?;
        }
        Ok(registry)
    }

    /// All tokens in display order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of registered tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: built-ins are permanent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check membership, ignoring case.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.canonical(token).is_some()
    }

    /// Registered spelling of a token, looked up ignoring case.
    #[must_use]
    pub fn canonical(&self, token: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|t| t.eq_ignore_ascii_case(token))
            .map(String::as_str)
    }

    /// Register a custom token.
    ///
    /// # Errors
    ///
    /// - [`TaskScopeError::InvalidToken`] if the text is not token-shaped
    /// - [`TaskScopeError::ProtectedToken`] if it names a built-in
    /// - [`TaskScopeError::DuplicateToken`] if it is already registered
    pub fn add(&mut self, token: &str) -> Result<()> {
        if !is_token_shaped(token) {
            return Err(TaskScopeError::invalid_token(
                token,
                "must be an ASCII letter followed by one or more letters, digits or '_'",
            ));
        }
        if is_builtin(token) {
            return Err(TaskScopeError::ProtectedToken {
                token: token.to_string(),
            });
        }
        if self.contains(token) {
            return Err(TaskScopeError::DuplicateToken {
                token: token.to_string(),
            });
        }
        self.tokens.push(token.to_string());
        Ok(())
    }

    /// Unregister a custom token.
    ///
    /// # Errors
    ///
    /// - [`TaskScopeError::ProtectedToken`] for any built-in, including `ALL`
    /// - [`TaskScopeError::MissingToken`] if it was never registered
    pub fn remove(&mut self, token: &str) -> Result<()> {
        if is_builtin(token) {
            return Err(TaskScopeError::ProtectedToken {
                token: token.to_uppercase(),
            });
        }
        let Some(index) = self
            .tokens
            .iter()
            .position(|t| t.eq_ignore_ascii_case(token))
        else {
            return Err(TaskScopeError::MissingToken {
                token: token.to_string(),
            });
        };
        self.tokens.remove(index);
        Ok(())
    }
}
