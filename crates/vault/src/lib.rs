//! TrustGate-Vault: Smart POA registry, encrypted token vault, and
//! credential-presentation tracking.

mod error;
mod poa;
mod presentation;
mod registry;
mod token;
mod vault;

pub use error::VaultError;
pub use poa::Poa;
pub use presentation::{CredentialPresentation, CredentialPresenter, PresentationMethod};
pub use registry::PoaRegistry;
pub use token::{EncryptedToken, TokenKind, TokenVault};
pub use vault::Vault;
