//! Write bookkeeping for emitted artifacts.

/// Tracks our own writes to one artifact.
///
/// Every write bumps `written` and remembers the fingerprint of the content.
/// A change notification is an echo of our write only if a write is still
/// unacknowledged and the file on disk has exactly the written content.
/// Acknowledging consumes the echo, so a second notification for the same
/// revision is treated as a real change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteRevision {
    written: u64,
    acknowledged: u64,
    fingerprint: String,
}

impl WriteRevision {
    /// Record a write of content with `fingerprint`; returns the new revision.
    pub fn record_write(&mut self, fingerprint: String) -> u64 {
        self.written += 1;
        self.fingerprint = fingerprint;
        self.written
    }

    /// `true` if a notification for content `observed` is the echo of our
    /// latest write.
    #[must_use]
    pub fn is_echo(&self, observed: Option<&str>) -> bool {
        self.acknowledged < self.written && observed == Some(self.fingerprint.as_str())
    }

    /// Mark every write so far as seen.
    pub fn acknowledge(&mut self) {
        self.acknowledged = self.written;
    }

    /// Latest revision written.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

}
