//! Active curve pointer.
//!
//! Holds the name only. Existence checks are the store's job, since only the
//! store sees both this tracker and the curve collection.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveCurveTracker {
    current: Option<String>,
}

impl ActiveCurveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is(&self, name: &str) -> bool {
        self.current.as_deref() == Some(name)
    }

    /// Returns true if the value changed.
    pub fn set(&mut self, name: Option<String>) -> bool {
        if self.current == name {
            return false;
        }
        self.current = name;
        true
    }

    /// Reset to `None` if `name` is active. Returns true if it was.
    pub fn clear_if(&mut self, name: &str) -> bool {
        if self.is(name) {
            self.current = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear_if() {
        let mut a = ActiveCurveTracker::new();
        assert!(a.set(Some("Track1".into())));
        assert!(!a.set(Some("Track1".into())));
        assert!(!a.clear_if("Track2"));
        assert_eq!(a.get(), Some("Track1"));
        assert!(a.clear_if("Track1"));
        assert_eq!(a.get(), None);
    }
}
