use lasso::{Spur, ThreadedRodeo};
use std::sync::OnceLock;

/// Interned string key - 4 bytes instead of 24 for String.
///
/// Targeter names are seen again on every poll tick, so history entries and
/// targeter sets hold keys rather than owned strings.
pub type IStr = Spur;

/// Global string interner for object names.
static INTERNER: OnceLock<ThreadedRodeo> = OnceLock::new();

/// Get the global interner (initializes on first call).
pub fn interner() -> &'static ThreadedRodeo {
    INTERNER.get_or_init(ThreadedRodeo::default)
}

/// Intern a string, returning a key.
pub fn intern(s: &str) -> IStr {
    interner().get_or_intern(s)
}

/// Resolve an interned key back to a string.
pub fn resolve(key: IStr) -> &'static str {
    interner().resolve(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let a = intern("Night Stalker");
        let b = intern("Night Stalker");
        assert_eq!(a, b);
        assert_eq!(resolve(a), "Night Stalker");
        assert_ne!(intern("Hero"), a);
    }
}
