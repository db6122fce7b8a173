//! Secret Visibility Cache — per-entry reveal/hide state for the
//! credential vault, with lazy fetch-and-decrypt on reveal.
//!
//! A decrypted value is only ever requested when the user explicitly
//! reveals an entry, and `copy` refuses to touch the clipboard while
//! the entry is hidden — even if a plaintext from an earlier reveal is
//! still cached. Reveals use the same begin/complete ticket shape as
//! the login flow: a fetch that lands after the user hid or deleted
//! the entry is discarded instead of flipping it back to visible.
//!
//! Plaintext retention is a policy knob ([`RevealPolicy`]): the
//! default drops the plaintext on hide and re-fetches on the next
//! reveal, keeping the exposure window minimal and picking up
//! server-side rotations; the `cache` policy keeps it for instant
//! toggling.

use std::collections::{HashMap, HashSet};

use zeroize::Zeroizing;

use crate::config::RevealPolicy;
use crate::errors::{ConsoleError, Result};

/// Seam to the collaborator's single-secret fetch (which returns the
/// decrypted payload).
pub trait SecretFetch {
    fn fetch_value(&self, id: &str) -> Result<String>;
}

/// Seam to the clipboard collaborator.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The real clipboard, backed by the OS.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| ConsoleError::Clipboard(format!("clipboard unavailable: {e}")))?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text)
            .map_err(|e| ConsoleError::Clipboard(e.to_string()))
    }
}

/// Permission to complete one specific reveal. Stale once the entry
/// was hidden, deleted, or re-revealed in the meantime.
pub struct RevealTicket {
    id: String,
    seq: u64,
}

impl RevealTicket {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// What `begin_reveal` decided.
pub enum RevealStart {
    /// Already visible — nothing to do.
    AlreadyVisible,
    /// Became visible from the in-memory plaintext (cache policy only).
    FromCache,
    /// A fetch is needed; complete with the ticket.
    Fetch(RevealTicket),
}

/// Tracks, per secret id, whether its decrypted value is currently on
/// display, plus the plaintext itself while it is held.
pub struct VisibilityCache {
    policy: RevealPolicy,
    visible: HashSet<String>,
    plaintext: HashMap<String, Zeroizing<String>>,
    /// Outstanding reveal per id: the sequence number that makes a
    /// ticket current.
    pending: HashMap<String, u64>,
    seq: u64,
}

impl VisibilityCache {
    pub fn new(policy: RevealPolicy) -> Self {
        Self {
            policy,
            visible: HashSet::new(),
            plaintext: HashMap::new(),
            pending: HashMap::new(),
            seq: 0,
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    /// The decrypted value — only while the entry is visible.
    pub fn value(&self, id: &str) -> Option<&str> {
        if !self.is_visible(id) {
            return None;
        }
        self.plaintext.get(id).map(|v| v.as_str())
    }

    /// Start revealing an entry.
    ///
    /// No-op when already visible. Under the `cache` policy a retained
    /// plaintext flips straight to visible without a fetch; otherwise
    /// the caller gets a ticket and must fetch the value.
    pub fn begin_reveal(&mut self, id: &str) -> RevealStart {
        if self.is_visible(id) {
            return RevealStart::AlreadyVisible;
        }

        if self.policy == RevealPolicy::Cache && self.plaintext.contains_key(id) {
            self.visible.insert(id.to_string());
            return RevealStart::FromCache;
        }

        self.seq += 1;
        self.pending.insert(id.to_string(), self.seq);
        RevealStart::Fetch(RevealTicket {
            id: id.to_string(),
            seq: self.seq,
        })
    }

    /// Apply a fetched value. Returns `false` — and stores nothing —
    /// when the ticket is stale because the user hid, deleted, or
    /// re-requested the entry while the fetch was outstanding.
    pub fn complete_reveal(&mut self, ticket: RevealTicket, value: String) -> bool {
        if self.pending.get(&ticket.id) != Some(&ticket.seq) {
            return false;
        }

        self.pending.remove(&ticket.id);
        self.plaintext.insert(ticket.id.clone(), Zeroizing::new(value));
        self.visible.insert(ticket.id);
        true
    }

    /// Abandon an outstanding reveal (fetch failed); the entry stays
    /// hidden.
    pub fn abort_reveal(&mut self, ticket: RevealTicket) {
        if self.pending.get(&ticket.id) == Some(&ticket.seq) {
            self.pending.remove(&ticket.id);
        }
    }

    /// Synchronous driver: reveal via the collaborator in one step.
    ///
    /// Returns `true` when a fetch was performed, `false` when the
    /// value was already on hand. On fetch failure the entry stays
    /// hidden and the error is surfaced.
    pub fn reveal_with(&mut self, id: &str, source: &impl SecretFetch) -> Result<bool> {
        let ticket = match self.begin_reveal(id) {
            RevealStart::AlreadyVisible | RevealStart::FromCache => return Ok(false),
            RevealStart::Fetch(ticket) => ticket,
        };

        match source.fetch_value(id) {
            Ok(value) => {
                self.complete_reveal(ticket, value);
                Ok(true)
            }
            Err(e) => {
                self.abort_reveal(ticket);
                Err(e)
            }
        }
    }

    /// Remove the entry from the visible set and invalidate any
    /// outstanding reveal. Under the default policy the plaintext is
    /// dropped too; the `cache` policy keeps it (but it is no longer
    /// displayable or copyable).
    pub fn hide(&mut self, id: &str) {
        self.visible.remove(id);
        self.pending.remove(id);

        if self.policy == RevealPolicy::Refetch {
            self.plaintext.remove(id);
        }
    }

    /// Copy the revealed value to the clipboard.
    ///
    /// Fails with `NotVisible` while the entry is hidden, so a stale
    /// plaintext from a prior reveal can never leave the process.
    pub fn copy(&self, id: &str, clipboard: &mut dyn Clipboard) -> Result<()> {
        let value = self
            .value(id)
            .ok_or_else(|| ConsoleError::NotVisible(id.to_string()))?;
        clipboard.set_text(value)
    }

    /// Purge every trace of an entry — visibility, plaintext, pending
    /// reveals. Called when the secret is deleted server-side.
    pub fn forget(&mut self, id: &str) {
        self.visible.remove(id);
        self.pending.remove(id);
        self.plaintext.remove(id);
    }

    /// Whether any plaintext for this id is held in memory (visible or
    /// not). Exposed for tests and diagnostics.
    pub fn holds_plaintext(&self, id: &str) -> bool {
        self.plaintext.contains_key(id)
    }
}
