#[macro_use]
mod check_macro;

pub mod ber_indefinite;
pub mod x509_v3_certificate;

use base64::engine::general_purpose;
use base64::Engine as _;

/// Body of a single-block PEM document
pub fn pem_body(pem: &str) -> Vec<u8> {
    let body: String = pem
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect();
    general_purpose::STANDARD.decode(body).expect("pem body")
}
