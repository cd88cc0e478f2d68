//! Product share links with a single-flight guard.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ascend_core::catalog::Product;

/// Admits one share at a time.
///
/// A second attempt while a [`ShareTicket`] is alive is rejected; dropping
/// the ticket re-opens the guard.
#[derive(Clone, Default)]
pub struct ShareGuard {
    busy: Arc<AtomicBool>,
}

/// Proof that the holder owns the current share slot.
pub struct ShareTicket {
    busy: Arc<AtomicBool>,
    url: String,
}

impl ShareGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot and builds the link for `product`, or `None` when a
    /// share is already in progress.
    pub fn begin(&self, origin: &str, product: &Product) -> Option<ShareTicket> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("[ShareGuard] Share already in progress");
            return None;
        }

        Some(ShareTicket {
            busy: self.busy.clone(),
            url: share_url(origin, product),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl ShareTicket {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for ShareTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// `<origin>/#/product/<slug or id>`.
pub fn share_url(origin: &str, product: &Product) -> String {
    format!(
        "{}/#/product/{}",
        origin.trim_end_matches('/'),
        product.share_key()
    )
}
