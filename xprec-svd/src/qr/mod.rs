//! QR decomposition with column pivoting (RRQR)

pub mod householder;
pub mod rrqr;
pub mod truncate;

pub use householder::{reflector, reflector_apply};
pub use rrqr::{rrqr, QRPivoted};
pub use truncate::truncate_qr_result;
