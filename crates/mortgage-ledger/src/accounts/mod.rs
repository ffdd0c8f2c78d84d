//! Account registration, login and session resolution.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;


pub use domain::{
    AccessToken, Credentials, MessageResponse, NewUser, SessionView, User, UserId,
};
pub use repository::UserRepository;
pub use router::account_router;
pub use service::{AccountError, AccountService};
