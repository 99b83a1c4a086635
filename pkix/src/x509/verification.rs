use crate::key::PublicKey;
use crate::signature::{SignatureError, SignatureProvider};
use pkix_asn1_x509::AlgorithmId;
use std::sync::{Mutex, MutexGuard};

/// Outcome of the last signature verification of a certificate or CRL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VerificationState {
    #[default]
    Unverified,
    Verified {
        key: PublicKey,
        provider: String,
        outcome: bool,
    },
}

/// Per-object verification cache.
///
/// The lock is only taken by `verify`; it is held for the whole verification
/// so concurrent callers with the same key compute the signature once.
#[derive(Debug, Default)]
pub(crate) struct VerificationCache {
    enabled: bool,
    state: Mutex<VerificationState>,
}

impl VerificationCache {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            state: Mutex::new(VerificationState::Unverified),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VerificationState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn state(&self) -> VerificationState {
        self.lock().clone()
    }

    pub(crate) fn reset(&self) {
        *self.lock() = VerificationState::Unverified;
    }

    /// Checks `signature` over `tbs`, returning `Ok(false)` on a mismatch.
    pub(crate) fn verify(
        &self,
        key: &PublicKey,
        provider: &dyn SignatureProvider,
        algorithm: &AlgorithmId,
        tbs: &[u8],
        signature: &[u8],
    ) -> Result<bool, SignatureError> {
        let mut state = self.lock();

        if let VerificationState::Verified {
            key: verified_key,
            provider: verified_provider,
            outcome,
        } = &*state
        {
            if self.enabled && verified_key == key && verified_provider == provider.name() {
                log::trace!("verification cache hit ({})", if *outcome { "valid" } else { "mismatch" });
                return Ok(*outcome);
            }
        }

        let algorithm_name = algorithm.name();
        log::trace!("verifying {algorithm_name} signature with provider {}", provider.name());

        let mut signer = provider.get_instance(&algorithm_name)?;
        signer.init_verify(key, algorithm.encoded_params().as_deref())?;
        signer.update(tbs)?;
        let outcome = signer.verify(signature)?;

        if self.enabled {
            *state = VerificationState::Verified {
                key: key.clone(),
                provider: provider.name().to_owned(),
                outcome,
            };
        }

        Ok(outcome)
    }
}

impl Clone for VerificationCache {
    fn clone(&self) -> Self {
        Self {
            enabled: self.enabled,
            state: Mutex::new(self.state()),
        }
    }
}
