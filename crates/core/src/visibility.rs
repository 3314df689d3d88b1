//! Optimistic public/private toggle with sequenced confirmation.
//!
//! The shown value flips immediately; each network patch is handed a
//! sequence number and only the outcome of the newest request may confirm
//! or roll back. A stale response resolving late can therefore never
//! overwrite a newer toggle, and repeating the current value issues no
//! request at all.

/// Sequence number handed out for one visibility patch request.
pub type ToggleSeq = u64;

/// Two-value optimistic state: the last server-confirmed visibility and
/// the optimistic value currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityToggle {
    confirmed: bool,
    current: bool,
    next_seq: ToggleSeq,
    newest: Option<ToggleSeq>,
}

impl VisibilityToggle {
    /// Start from a known value (the draft default, or the server copy).
    pub fn new(initial: bool) -> Self {
        Self {
            confirmed: initial,
            current: initial,
            next_seq: 0,
            newest: None,
        }
    }

    /// The value to show right now.
    pub fn current(&self) -> bool {
        self.current
    }

    /// The last server-confirmed value.
    pub fn confirmed(&self) -> bool {
        self.confirmed
    }

    /// Whether a patch request is outstanding.
    pub fn in_flight(&self) -> bool {
        self.newest.is_some()
    }

    /// Optimistically flip to `next`.
    ///
    /// Returns the sequence number to attach to the patch request, or
    /// `None` when `next` already matches the shown value and no request
    /// should be issued.
    pub fn begin(&mut self, next: bool) -> Option<ToggleSeq> {
        if next == self.current {
            return None;
        }
        self.current = next;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.newest = Some(seq);
        Some(seq)
    }

    /// Record a successful patch response.
    ///
    /// Returns `true` when `seq` is the newest request, in which case the
    /// shown value becomes confirmed. Stale responses return `false` and
    /// change nothing.
    pub fn confirm(&mut self, seq: ToggleSeq) -> bool {
        if self.newest == Some(seq) {
            self.confirmed = self.current;
            self.newest = None;
            true
        } else {
            false
        }
    }

    /// Record a failed patch response.
    ///
    /// When `seq` is the newest request the shown value rolls back to the
    /// last confirmed one and `Some(restored)` is returned. Stale failures
    /// are ignored.
    pub fn fail(&mut self, seq: ToggleSeq) -> Option<bool> {
        if self.newest == Some(seq) {
            self.current = self.confirmed;
            self.newest = None;
            Some(self.current)
        } else {
            None
        }
    }

    /// Adopt a server-reported value from outside the toggle flow (poll
    /// reconciliation). Ignored while a patch is outstanding so the poll
    /// cannot clobber an optimistic flip.
    pub fn reconcile(&mut self, server_value: bool) {
        if self.newest.is_none() {
            self.confirmed = server_value;
            self.current = server_value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_flips_immediately() {
        let mut toggle = VisibilityToggle::new(true);
        let seq = toggle.begin(false);
        assert!(seq.is_some());
        assert!(!toggle.current());
        assert!(toggle.confirmed());
    }

    #[test]
    fn repeating_the_current_value_issues_no_request() {
        let mut toggle = VisibilityToggle::new(true);
        assert_eq!(toggle.begin(true), None);
        assert!(!toggle.in_flight());
    }

    #[test]
    fn confirm_settles_the_optimistic_value() {
        let mut toggle = VisibilityToggle::new(true);
        let seq = toggle.begin(false).unwrap();
        assert!(toggle.confirm(seq));
        assert!(!toggle.current());
        assert!(!toggle.confirmed());
        assert!(!toggle.in_flight());
    }

    #[test]
    fn failure_rolls_back_to_last_confirmed() {
        let mut toggle = VisibilityToggle::new(true);
        let seq = toggle.begin(false).unwrap();
        assert_eq!(toggle.fail(seq), Some(true));
        assert!(toggle.current());
        assert!(toggle.confirmed());
    }

    #[test]
    fn stale_success_is_ignored() {
        let mut toggle = VisibilityToggle::new(true);
        let first = toggle.begin(false).unwrap();
        let second = toggle.begin(true).unwrap();

        // The older request resolves after the newer one was issued.
        assert!(!toggle.confirm(first));
        assert!(toggle.current());

        assert!(toggle.confirm(second));
        assert!(toggle.confirmed());
    }

    #[test]
    fn stale_failure_does_not_roll_back_a_newer_toggle() {
        let mut toggle = VisibilityToggle::new(true);
        let first = toggle.begin(false).unwrap();
        let second = toggle.begin(true).unwrap();

        assert_eq!(toggle.fail(first), None);
        assert!(toggle.current());

        assert!(toggle.confirm(second));
        assert!(toggle.current());
    }

    #[test]
    fn reconcile_adopts_server_value_when_idle() {
        let mut toggle = VisibilityToggle::new(true);
        toggle.reconcile(false);
        assert!(!toggle.current());
        assert!(!toggle.confirmed());
    }

    #[test]
    fn reconcile_is_ignored_while_a_patch_is_outstanding() {
        let mut toggle = VisibilityToggle::new(true);
        let seq = toggle.begin(false).unwrap();
        toggle.reconcile(true);
        assert!(!toggle.current());
        assert!(toggle.confirm(seq));
    }

    #[test]
    fn toggle_twice_to_the_same_value_converges() {
        let mut toggle = VisibilityToggle::new(true);
        let seq = toggle.begin(false).unwrap();
        assert!(toggle.confirm(seq));

        // The second identical toggle is a pure no-op.
        assert_eq!(toggle.begin(false), None);
        assert!(!toggle.current());
        assert!(!toggle.confirmed());
    }
}
