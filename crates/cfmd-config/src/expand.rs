//! `${VAR}` and `${VAR:-default}` expansion of credential fields.

use crate::ConfigError;

/// Expand variable references in an optional field, in place.
///
/// Only the braced form is recognised; values without `${` are left alone so
/// tokens containing a literal `$` survive.
pub(crate) fn expand_field(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    let Some(raw) = value.as_deref().filter(|raw| raw.contains("${")) else {
        return Ok(());
    };
    let expanded = shellexpand::env(raw).map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.var_name),
    })?;
    *value = Some(expanded.into_owned());
    Ok(())
}
