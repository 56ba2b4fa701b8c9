use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::trace;

pub const X_GITHUB_SIGNATURE: &str = "X-Hub-Signature-256";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    Valid,
    MissingSignature,
    InvalidSignature,
}

/// Checks a GitHub `X-Hub-Signature-256` value against the raw request body.
///
/// Without a secret, any provided signature is accepted: enforcement is disabled. A missing
/// signature is still reported as such.
pub fn verify(
    secret: Option<&[u8]>,
    body: &[u8],
    signature: Option<&str>,
) -> VerificationResult {
    let signature = match signature {
        Some(signature) => signature,
        None => {
            trace!("no {} header provided", X_GITHUB_SIGNATURE);
            return VerificationResult::MissingSignature;
        }
    };

    let secret = match secret {
        Some(secret) => secret,
        None => {
            trace!("no webhook secret configured, skipping signature validation");
            return VerificationResult::Valid;
        }
    };

    if validate_signature(secret, signature, body) {
        VerificationResult::Valid
    } else {
        VerificationResult::InvalidSignature
    }
}

fn validate_signature(secret: &[u8], signature: &str, data: &[u8]) -> bool {
    trace!("validating signature...");

    // GitHub puts a prefix in front of its hex SHA256
    let signature = match signature.strip_prefix("sha256=") {
        Some(s) => s,
        None => {
            trace!("couldn't strip prefix from signature `{}`", signature);
            return false;
        }
    };

    // GitHub only ever sends lower-case digests
    if !signature
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        trace!("signature `{}` isn't lower-case hex", signature);
        return false;
    }

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(data);

    // verify_slice compares in constant time
    match hex::decode(signature) {
        Ok(bytes) => mac.verify_slice(&bytes).is_ok(),
        Err(_) => {
            trace!("couldn't decode hex-encoded signature {}", signature);
            false
        }
    }
}

#[cfg(test)]
pub(crate) fn sign(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODIES: &[&[u8]] = &[
        b"",
        b"{}",
        br#"{"repository":{"name":"repo1"},"pusher":{"name":"alice"},"commits":[]}"#,
        b"not-json",
        &[0, 159, 146, 150, 255],
    ];
    const SECRETS: &[&[u8]] = &[b"s", b"It's a Secret to Everybody", &[0xff; 100]];

    #[test]
    fn correct_signature_is_valid() {
        for secret in SECRETS {
            for body in BODIES {
                let signature = sign(secret, body);
                assert_eq!(
                    verify(Some(&secret[..]), body, Some(&signature)),
                    VerificationResult::Valid
                );
            }
        }
    }

    #[test]
    fn github_documented_example() {
        // https://docs.github.com/en/webhooks/using-webhooks/validating-webhook-deliveries
        let signature = "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17";

        assert_eq!(
            verify(
                Some(&b"It's a Secret to Everybody"[..]),
                b"Hello, World!",
                Some(signature)
            ),
            VerificationResult::Valid
        );
    }

    #[test]
    fn single_bit_flip_is_invalid() {
        let secret = b"hunter2";
        let body = b"{\"commits\":[]}";
        let signature = sign(secret, body);

        for i in 0..signature.len() {
            for bit in 0..8 {
                let mut flipped = signature.clone().into_bytes();
                flipped[i] ^= 1 << bit;
                // signatures arrive as header strings, skip flips that aren't valid utf-8
                let flipped = match String::from_utf8(flipped) {
                    Ok(s) => s,
                    Err(_) => continue,
                };

                assert_eq!(
                    verify(Some(&secret[..]), body, Some(&flipped)),
                    VerificationResult::InvalidSignature,
                    "flipping bit {} of byte {} was accepted",
                    bit,
                    i
                );
            }
        }
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let body = b"payload";
        let signature = sign(b"secret1", body);

        assert_eq!(
            verify(Some(&b"secret2"[..]), body, Some(&signature)),
            VerificationResult::InvalidSignature
        );
    }

    #[test]
    fn missing_prefix_or_garbage_is_invalid() {
        let secret = b"hunter2";
        let body = b"payload";
        let signature = sign(secret, body);
        let bare = signature.strip_prefix("sha256=").unwrap();

        for candidate in [bare, "sha256=", "sha256=zz", "sha1=abcdef", ""] {
            assert_eq!(
                verify(Some(&secret[..]), body, Some(candidate)),
                VerificationResult::InvalidSignature
            );
        }
    }

    #[test]
    fn upper_case_digest_is_invalid() {
        let secret = b"hunter2";
        let body = b"payload";
        let signature = format!("sha256={}", sign(secret, body)[7..].to_uppercase());

        assert_eq!(
            verify(Some(&secret[..]), body, Some(&signature)),
            VerificationResult::InvalidSignature
        );
    }

    #[test]
    fn missing_signature() {
        assert_eq!(
            verify(Some(&b"hunter2"[..]), b"payload", None),
            VerificationResult::MissingSignature
        );
        assert_eq!(
            verify(None, b"payload", None),
            VerificationResult::MissingSignature
        );
    }

    #[test]
    fn absent_secret_disables_enforcement() {
        for signature in ["sha256=deadbeef", "garbage", ""] {
            assert_eq!(
                verify(None, b"payload", Some(signature)),
                VerificationResult::Valid
            );
        }
    }
}
