//! Records persisted by the adapter, with the collection layout each is stored under

pub mod account;
pub use self::account::{Account, AccountType, ProviderAccount};
pub mod session;
pub use self::session::{Session, SessionAndUser, SessionUpdate};
pub mod user;
pub use self::user::{User, UserUpdate};
pub mod verification_token;
pub use self::verification_token::VerificationToken;
