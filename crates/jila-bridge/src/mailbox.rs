// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-slot-per-kind mailbox for results the host delivers later.
//
// The render loop is the only reader (`Mailbox::poll`, once per frame).
// Writers are host callback threads holding a `CompletionSink`. Each slot is
// guarded by its own mutex and values are replaced whole, so a reader sees
// either the old delivery or the new one, never a mix.
//
// Semantics are latest-only: a completion overwrites any unread one of the
// same kind, and a new request supersedes an outstanding one. There is no
// timeout and no cancellation; a request the host never answers leaves its
// slot pending forever.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use jila_core::types::{CallbackKind, Completion, RequestId};
use tracing::debug;

/// A completion as seen by the reader.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub completion: Completion,
    /// The request outstanding when the completion arrived, if any.
    pub request: Option<RequestId>,
    pub delivered_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Slot {
    outstanding: Option<RequestId>,
    unread: Option<Delivery>,
}

#[derive(Debug, Default)]
struct Slots {
    slots: [Mutex<Slot>; CallbackKind::ALL.len()],
}

impl Slots {
    fn lock(&self, kind: CallbackKind) -> MutexGuard<'_, Slot> {
        // A slot is always replaced whole, so a poisoned lock still holds a
        // consistent value.
        self.slots[kind.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read side of the mailbox, owned by the application loop.
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    inner: Arc<Slots>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write handle for host callbacks.
    pub fn sink(&self) -> CompletionSink {
        CompletionSink {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Record a new outstanding request for `kind` and return its id.
    pub fn begin(&self, kind: CallbackKind) -> RequestId {
        let id = RequestId::new();
        let mut slot = self.inner.lock(kind);
        if let Some(previous) = slot.outstanding.replace(id) {
            debug!(?kind, %previous, superseded_by = %id, "async request superseded");
        }
        id
    }

    /// Drop the outstanding mark for `id` if it is still the latest request.
    /// Used when the host call starting the request failed.
    pub fn withdraw(&self, kind: CallbackKind, id: RequestId) {
        let mut slot = self.inner.lock(kind);
        if slot.outstanding == Some(id) {
            slot.outstanding = None;
        }
    }

    /// Take the most recent unread completion for `kind`, leaving the slot
    /// empty.
    pub fn poll(&self, kind: CallbackKind) -> Option<Delivery> {
        self.inner.lock(kind).unread.take()
    }

    /// Whether a request for `kind` has been issued and not yet answered.
    pub fn is_pending(&self, kind: CallbackKind) -> bool {
        self.inner.lock(kind).outstanding.is_some()
    }
}

/// Write side of the mailbox. Cheap to clone and safe to use from any
/// thread.
#[derive(Debug, Clone)]
pub struct CompletionSink {
    inner: Arc<Slots>,
}

impl CompletionSink {
    /// Store `completion` in its kind's slot, replacing any unread value.
    pub fn deliver(&self, completion: Completion) {
        let kind = completion.kind();
        let delivered_at = Utc::now();
        let mut slot = self.inner.lock(kind);
        let request = slot.outstanding.take();
        if slot.unread.is_some() {
            debug!(?kind, "unread completion overwritten");
        }
        slot.unread = Some(Delivery {
            completion,
            request,
            delivered_at,
        });
    }
}
