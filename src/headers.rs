//! Engine header namespaces.
//!
//! The protocol is spoken by two engine families that differ only in the
//! header prefix they expect (`X-Trino-*` vs. the legacy `X-Presto-*`).
//! The flavor is connection-scoped configuration: two clients in the same
//! process can target different engine flavors.

/// Which header-namespace convention the client emits.
///
/// Affects header names only, never protocol semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderFlavor {
    /// `X-Trino-*` headers (current engine namespace).
    #[default]
    Trino,
    /// `X-Presto-*` headers (legacy compatible namespace).
    Presto,
}

impl HeaderFlavor {
    /// Header carrying the acting user identity.
    pub fn user(self) -> &'static str {
        match self {
            HeaderFlavor::Trino => "X-Trino-User",
            HeaderFlavor::Presto => "X-Presto-User",
        }
    }

    /// Header identifying the submitting application.
    pub fn source(self) -> &'static str {
        match self {
            HeaderFlavor::Trino => "X-Trino-Source",
            HeaderFlavor::Presto => "X-Presto-Source",
        }
    }

    /// Header selecting the default catalog.
    pub fn catalog(self) -> &'static str {
        match self {
            HeaderFlavor::Trino => "X-Trino-Catalog",
            HeaderFlavor::Presto => "X-Presto-Catalog",
        }
    }

    /// Header selecting the default schema.
    pub fn schema(self) -> &'static str {
        match self {
            HeaderFlavor::Trino => "X-Trino-Schema",
            HeaderFlavor::Presto => "X-Presto-Schema",
        }
    }

    /// Header carrying `key=value` session properties.
    pub fn session(self) -> &'static str {
        match self {
            HeaderFlavor::Trino => "X-Trino-Session",
            HeaderFlavor::Presto => "X-Presto-Session",
        }
    }

    /// Header carrying the `name=urlencoded-sql` prepared-statement binding.
    pub fn prepared_statement(self) -> &'static str {
        match self {
            HeaderFlavor::Trino => "X-Trino-Prepared-Statement",
            HeaderFlavor::Presto => "X-Presto-Prepared-Statement",
        }
    }
}

/// Name under which parameterized statements are prepared on the engine.
pub(crate) const PREPARED_STATEMENT_NAME: &str = "_trino_link";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_header_names() {
        assert_eq!(HeaderFlavor::Trino.user(), "X-Trino-User");
        assert_eq!(HeaderFlavor::Presto.user(), "X-Presto-User");
        assert_eq!(
            HeaderFlavor::Presto.prepared_statement(),
            "X-Presto-Prepared-Statement"
        );
        assert_eq!(HeaderFlavor::default(), HeaderFlavor::Trino);
    }
}
