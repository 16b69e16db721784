//! Webhook signature verification.
//!
//! GitHub signs each delivery with HMAC-SHA1 over the raw body and sends the
//! digest in the `X-Hub-Signature` header as `sha1=<hex>`. Verification must
//! run on the raw bytes; re-serializing the parsed payload would change them.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use thiserror::Error;

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SignatureError {
    #[error("invalid signature header")]
    MalformedHeader,
    #[error("invalid signature")]
    Mismatch,
}

/// Checks `header` against the HMAC-SHA1 of `body` under `secret`.
///
/// The header must contain exactly one `=` and name the `sha1` algorithm.
/// The digest comparison is constant-time.
pub(crate) fn validate(header: &str, body: &[u8], secret: &[u8]) -> Result<(), SignatureError> {
    let mut parts = header.split('=');
    let (Some(algorithm), Some(digest), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(SignatureError::MalformedHeader);
    };
    if algorithm != "sha1" {
        return Err(SignatureError::MalformedHeader);
    }

    let digest = hex::decode(digest).map_err(|_| SignatureError::Mismatch)?;
    let mut mac =
        HmacSha1::new_from_slice(secret).expect("HMAC accepts keys of any size");
    mac.update(body);
    mac.verify_slice(&digest).map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use hmac::Mac;
    use rstest::rstest;
    use sha2::Sha256;

    use super::*;

    const SECRET: &[u8] = b"It's a Secret to Everybody";

    fn sign(body: &[u8], secret: &[u8]) -> String {
        let mut mac = HmacSha1::new_from_slice(secret).unwrap();
        mac.update(body);
        format!("sha1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_matching_signature() {
        let body = b"Hello, World!";
        assert_eq!(validate(&sign(body, SECRET), body, SECRET), Ok(()));
    }

    #[test]
    fn rejects_wrong_secret() {
        let body = b"Hello, World!";
        let header = sign(body, b"some other secret");
        assert_eq!(validate(&header, body, SECRET), Err(SignatureError::Mismatch));
    }

    #[test]
    fn rejects_mutated_body() {
        let body = b"Hello, World!".to_vec();
        let header = sign(&body, SECRET);
        for index in 0..body.len() {
            let mut mutated = body.clone();
            mutated[index] ^= 0x01;
            assert_eq!(
                validate(&header, &mutated, SECRET),
                Err(SignatureError::Mismatch),
                "flipped byte {index} must invalidate the signature"
            );
        }
    }

    #[test]
    fn rejects_mutated_header() {
        let body = b"Hello, World!";
        let header = sign(body, SECRET);
        let (prefix, digest) = header.split_once('=').unwrap();
        // change one hex digit
        let flipped = if digest.starts_with('0') { "1" } else { "0" };
        let mutated = format!("{prefix}={flipped}{}", &digest[1..]);
        assert_eq!(validate(&mutated, body, SECRET), Err(SignatureError::Mismatch));
    }

    /// A correct digest under a different algorithm is still rejected.
    #[test]
    fn rejects_foreign_algorithm_with_correct_digest() {
        let body = b"Hello, World!";
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET).unwrap();
        mac.update(body);
        let header = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));
        assert_eq!(
            validate(&header, body, SECRET),
            Err(SignatureError::MalformedHeader)
        );
    }

    #[rstest]
    #[case::no_separator("deadbeef")]
    #[case::empty("")]
    #[case::extra_separator("sha1=dead=beef")]
    #[case::wrong_algorithm("md5=deadbeef")]
    fn rejects_malformed_header(#[case] header: &str) {
        assert_eq!(
            validate(header, b"body", SECRET),
            Err(SignatureError::MalformedHeader)
        );
    }

    #[rstest]
    #[case::not_hex("sha1=zzzz")]
    #[case::odd_length("sha1=abc")]
    #[case::empty_digest("sha1=")]
    fn rejects_undecodable_digest(#[case] header: &str) {
        assert_eq!(validate(header, b"body", SECRET), Err(SignatureError::Mismatch));
    }
}
