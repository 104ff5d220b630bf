//! `figment::Jail` sandboxes for file and environment fixtures.

use anyhow::{Result, anyhow};

/// Run `f` inside a fresh [`figment::Jail`] and return its output.
///
/// The jail switches into a temporary working directory and restores the
/// environment afterwards. Errors from `f` or from the jail are reported as
/// `anyhow::Error`.
///
/// # Errors
///
/// Returns the closure's error, or an error when the jail cannot be set up.
///
/// # Examples
///
/// ```
/// use layered_config_test_helpers::with_jail;
///
/// let text = with_jail(|j| {
///     j.create_file("app.json", r#"{"port": 80}"#)?;
///     Ok(std::fs::read_to_string("app.json")?)
/// })?;
/// assert_eq!(text, r#"{"port": 80}"#);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|j| {
        output = Some(f(j).map_err(|err| figment::Error::from(format!("{err:#}")))?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure produced no value"))
}
