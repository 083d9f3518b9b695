//! Profile-polymorphic harness emitters.
//!
//! Each profile supplies its own type map and statement templates; case
//! parsing stays in [`crate::parser`] and is shared through
//! `create_test_code`. Emitters are stateless: every call is a pure
//! function of its inputs plus diagnostic logging.

pub mod cpp;
pub mod python;

use crate::error::Error;
use crate::meta::MethodMeta;
use crate::parser::ParsedCase;

/// One target code profile.
///
/// `create_test_code` is the orchestrating entry point; the other
/// operations are exposed so callers can substitute a solution class into
/// a larger template or inspect the method name on their own.
pub trait Emitter {
    /// Stable profile identifier, as accepted by [`for_profile`].
    fn profile(&self) -> &'static str;

    /// Scan the solution snippet for the solving method's identifier.
    /// Falls back to `"solution"` when nothing matches; never fails.
    fn extract_method_name(&self, snippet: &str) -> String;

    /// Substitute the placeholder solution class inside `template` with
    /// `snippet`. Returns the template unchanged when either side lacks
    /// the expected marker.
    fn replace_solution_class(&self, template: &str, snippet: &str) -> String;

    /// Per-case harness statements, in parse order, including the closing
    /// summary statement.
    fn generate_test_statements(
        &self,
        cases: &[ParsedCase],
        meta: &MethodMeta,
        method_name: &str,
    ) -> Vec<String>;

    /// Assemble the full harness: parse cases from `raw` (and `narrative`
    /// when given), then emit helpers, includes, per-case statements, and
    /// the entry point.
    ///
    /// A descriptor without parameters yields the empty string (cannot
    /// generate); zero parsed cases yield a runnable skeleton harness.
    /// `Err` is reserved for structural faults inside emission itself.
    fn create_test_code(
        &self,
        raw: &str,
        meta: &MethodMeta,
        snippet: &str,
        narrative: Option<&str>,
    ) -> Result<String, Error>;
}

// ------------------------------- Factory ----------------------------------- //

/// Select an emitter by profile identifier.
pub fn for_profile(id: &str) -> Result<Box<dyn Emitter>, Error> {
    match id {
        "cpp" => Ok(Box::new(cpp::CppEmitter)),
        "py" | "python" => Ok(Box::new(python::PyEmitter)),
        other => Err(Error::UnsupportedProfile(other.to_string())),
    }
}

// ------------------------------- Shared ------------------------------------ //

/// Case-scoped variable name: the declared parameter name suffixed with the
/// 1-based case number, so cases sharing one scope never collide.
pub(crate) fn case_var(name: &str, case_idx: usize) -> String {
    format!("{name}_{}", case_idx + 1)
}

/// Inverse of [`case_var`]: the declared parameter name, with any trailing
/// `_<digits>` suffix removed.
pub(crate) fn base_name(var: &str) -> &str {
    match var.rsplit_once('_') {
        Some((base, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => base,
        _ => var,
    }
}

/// Expected literal prepared for a string-rendering comparison: surrounding
/// quotes dropped, array spacing tightened to the canonical no-space form.
pub(crate) fn comparable_expected(expected: &str) -> String {
    let trimmed = expected.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    if unquoted.starts_with('[') {
        unquoted.replace(", ", ",")
    } else {
        unquoted.to_string()
    }
}

// -------------------------------- Tests ----------------------------------- //

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn factory_resolves_registered_profiles() {
        assert_eq!(for_profile("cpp").unwrap().profile(), "cpp");
        assert_eq!(for_profile("py").unwrap().profile(), "py");
        assert_eq!(for_profile("python").unwrap().profile(), "py");
    }

    #[test]
    fn factory_rejects_unknown_profile() {
        let err = match for_profile("rust") {
            Ok(_) => panic!("expected unsupported profile error"),
            Err(e) => e,
        };
        assert!(matches!(err, Error::UnsupportedProfile(ref id) if id == "rust"));
        assert_eq!(err.to_string(), "unsupported profile: 'rust'");
    }

    #[test]
    fn case_var_round_trips_through_base_name() {
        let var = case_var("nums", 2);
        assert_eq!(var, "nums_3");
        assert_eq!(base_name(&var), "nums");
        assert_eq!(base_name("snake_case_name"), "snake_case_name");
        assert_eq!(base_name("plain"), "plain");
    }

    #[test]
    fn comparable_expected_tightens_and_unquotes() {
        assert_eq!(comparable_expected("[1, 2, 3]"), "[1,2,3]");
        assert_eq!(comparable_expected("\"abc\""), "abc");
        assert_eq!(comparable_expected("42"), "42");
    }
}
