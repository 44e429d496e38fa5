//! Helper utilities shared by the scan source implementations.

/// Quotes an identifier for SQL Server (`[name]`, with `]` doubled).
///
/// # Example
/// ```rust
/// use pdnscan_core::adapters::helpers::quote_mssql_identifier;
///
/// assert_eq!(quote_mssql_identifier("Order Details"), "[Order Details]");
/// assert_eq!(quote_mssql_identifier("a]b"), "[a]]b]");
/// ```
pub fn quote_mssql_identifier(identifier: &str) -> String {
    format!("[{}]", identifier.replace(']', "]]"))
}

/// Quotes an identifier for PostgreSQL and SQLite (`"name"`, with `"` doubled).
///
/// # Example
/// ```rust
/// use pdnscan_core::adapters::helpers::quote_ansi_identifier;
///
/// assert_eq!(quote_ansi_identifier("email"), "\"email\"");
/// assert_eq!(quote_ansi_identifier("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_ansi_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Drops NULL and empty values and caps the result at `limit`.
///
/// Queries already filter in SQL; drivers that decode a column to NULL
/// text after the cast are covered here.
pub fn retain_sample_values<I>(values: I, limit: u32) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|value| !value.is_empty())
        .take(limit as usize)
        .collect()
}
