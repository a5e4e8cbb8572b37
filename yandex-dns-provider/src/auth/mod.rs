//! Service account authentication: authorized key -> JWT -> IAM token.

mod key;
mod token;

pub(crate) use token::TokenSource;
