mod account;
mod session;

pub use self::{
    account::{Account, Profile},
    session::Session,
};
