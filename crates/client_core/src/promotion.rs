//! Pawn promotion prompt: the presentation capability and the single-instance slot
//! guarding it.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use shared::{
    domain::{PieceVariant, Team},
    square::SquareId,
};
use tokio::sync::watch;
use tracing::debug;

use crate::error::PromptError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionRequest {
    /// Destination square; front ends anchor the prompt there.
    pub square: SquareId,
    pub team: Team,
    /// Promotion targets the engine offered, in the engine's order.
    pub options: Vec<PieceVariant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptResolution {
    Chosen(PieceVariant),
    Cancelled,
}

/// Collects a promotion target from the user. Returning `Cancelled` covers both an
/// explicit cancel action and the cancel key.
#[async_trait]
pub trait PromotionPrompt: Send + Sync {
    async fn choose(&self, request: &PromotionRequest) -> anyhow::Result<PromptResolution>;
}

type CancelSender = Arc<watch::Sender<bool>>;

/// Admits at most one open prompt at a time.
#[derive(Clone, Default)]
pub struct PromptSlot {
    active: Arc<Mutex<Option<CancelSender>>>,
}

impl PromptSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    pub fn acquire(&self) -> Result<PromptHandle, PromptError> {
        let mut active = self.lock();
        if active.is_some() {
            return Err(PromptError::Conflict);
        }
        let (tx, _) = watch::channel(false);
        let cancel = Arc::new(tx);
        *active = Some(Arc::clone(&cancel));
        debug!("promotion: prompt opened");
        Ok(PromptHandle {
            slot: self.clone(),
            cancel,
            released: false,
        })
    }

    /// Cancels the open prompt, if any. Returns whether one was open.
    pub fn cancel_active(&self) -> bool {
        match self.lock().as_ref() {
            Some(cancel) => {
                cancel.send_replace(true);
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<CancelSender>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of the prompt slot. Released by [`PromptHandle::close`] or on drop,
/// whichever comes first.
pub struct PromptHandle {
    slot: PromptSlot,
    cancel: CancelSender,
    released: bool,
}

impl PromptHandle {
    /// Resolves once [`PromptSlot::cancel_active`] fires for this prompt.
    pub async fn cancelled(&self) {
        let mut rx = self.cancel.subscribe();
        // The sender lives in `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut active = self.slot.lock();
        if active
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &self.cancel))
        {
            *active = None;
            debug!("promotion: prompt closed");
        }
    }
}

impl Drop for PromptHandle {
    fn drop(&mut self) {
        self.release();
    }
}
