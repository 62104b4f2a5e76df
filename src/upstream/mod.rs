//! Acesso ao serviço de score.
//!
//! [`ScoreSource`] é a única capacidade que o motor consome;
//! [`HttpScoreSource`] a implementa sobre HTTPS.

mod http;
mod source;

pub use http::{HttpScoreSource, CLIENT_ID_HEADER};
pub use source::ScoreSource;
