//! Route handlers, one module per concern.
//!
//! | Method | Path | Gate | Module |
//! |--------|------|------|--------|
//! | `GET`  | `/` | — | [`view`] |
//! | `GET`  | `/admin` | token | [`view`] |
//! | `POST` | `/log`, `/api/log` | — | [`log`] |
//! | `POST` | `/blacklist` | token | [`blacklist`] |
//! | `GET`  | `/download` | — | [`transfer`] |
//! | `POST` | `/upload` | token | [`transfer`] |

pub mod blacklist;
pub mod log;
pub mod transfer;
pub mod view;
