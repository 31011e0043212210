//! General-purpose utilities: currency conversion, password generation,
//! markdown rendering, base64, hashing, UUIDs

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use colored::Colorize;
use md5::Md5;
use rand::rngs::OsRng;
use rand::Rng;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use tracing::debug;
use uuid::Uuid;

use super::{network, HandlerError, HandlerResult};
use crate::cli::args::HashAlgorithm;
use crate::cli::report::Report;
use crate::config::Settings;

const SPECIAL_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Convert `amount` between currencies via the configured rate API.
pub fn currency(amount: f64, from: &str, to: &str, settings: &Settings) -> HandlerResult {
    let from = from.to_uppercase();
    let to = to.to_uppercase();
    let url = format!("{}{}", settings.api.currency_api, from);
    debug!(%url, "fetching exchange rates");

    let client = network::http_client(settings)?;
    let body: serde_json::Value = client
        .get(&url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.json())
        .map_err(|e| HandlerError::Network(format!("could not fetch exchange rates: {e}")))?;

    let rate = body
        .get("rates")
        .and_then(|rates| rates.get(to.as_str()))
        .and_then(|v| v.as_f64())
        .ok_or_else(|| HandlerError::InvalidInput(format!("currency code not found: {to}")))?;

    let converted = amount * rate;
    let mut pairs = vec![
        ("From", format!("{amount:.2} {from}")),
        ("To", format!("{converted:.2} {to}")),
        ("Rate", format!("1 {from} = {rate:.4} {to}")),
    ];
    if let Some(date) = body.get("date").and_then(|v| v.as_str()) {
        pairs.push(("As of", date.to_string()));
    }

    Ok(Report::key_value("Currency conversion", pairs))
}

/// Generate `count` passwords from an OS CSPRNG.
pub fn password(
    length: Option<u16>,
    count: u32,
    no_special: bool,
    no_numbers: bool,
    no_uppercase: bool,
    settings: &Settings,
) -> HandlerResult {
    let length = length.unwrap_or(settings.security.password_length) as usize;
    if length < 4 {
        return Err(HandlerError::InvalidInput(
            "password length must be at least 4 characters".into(),
        ));
    }

    let with_special = settings.security.include_special_chars && !no_special;
    let charset = build_charset(!no_uppercase, !no_numbers, with_special);

    let rows = (1..=count)
        .map(|i| {
            let pwd = generate_password(&charset, length);
            vec![
                i.to_string(),
                pwd,
                strength_label(length, with_special, !no_numbers),
            ]
        })
        .collect();

    let mut enabled = vec!["lowercase"];
    if !no_uppercase {
        enabled.push("uppercase");
    }
    if !no_numbers {
        enabled.push("numbers");
    }
    if with_special {
        enabled.push("special chars");
    }

    Ok(Report::Multi(vec![
        Report::table(
            format!("Generated password(s) ({length} chars)"),
            vec!["#", "Password", "Strength"],
            rows,
        ),
        Report::text(format!("Character set: {}", enabled.join(", "))),
    ]))
}

/// Render a markdown file or inline text to the terminal.
pub fn markdown(file: Option<&Path>, text: Option<&str>) -> HandlerResult {
    let content = match (file, text) {
        (Some(path), _) => {
            if !path.exists() {
                return Err(HandlerError::NotFound(format!(
                    "file not found: {}",
                    path.display()
                )));
            }
            std::fs::read_to_string(path)
                .map_err(|e| HandlerError::io(format!("read {}", path.display()), e))?
        }
        (None, Some(text)) => text.to_string(),
        (None, None) => {
            return Err(HandlerError::InvalidInput(
                "provide a markdown file or --text".into(),
            ))
        }
    };

    if content.trim().is_empty() {
        return Ok(Report::text("No content to render"));
    }

    Ok(Report::Markdown(content))
}

/// Encode text as base64, or decode it with `--decode`.
pub fn base64(text: &str, decode: bool) -> HandlerResult {
    if decode {
        let bytes = BASE64
            .decode(text)
            .map_err(|e| HandlerError::InvalidInput(format!("invalid base64 string: {e}")))?;
        let decoded = String::from_utf8(bytes).map_err(|_| {
            HandlerError::InvalidInput("decoded bytes are not valid UTF-8".into())
        })?;
        Ok(Report::text(decoded))
    } else {
        Ok(Report::text(BASE64.encode(text.as_bytes())))
    }
}

/// Hex digest of `text` with the chosen algorithm.
pub fn hash(text: &str, algorithm: HashAlgorithm) -> HandlerResult {
    let digest = match algorithm {
        HashAlgorithm::Md5 => hex_digest::<Md5>(text.as_bytes()),
        HashAlgorithm::Sha1 => hex_digest::<Sha1>(text.as_bytes()),
        HashAlgorithm::Sha256 => hex_digest::<Sha256>(text.as_bytes()),
        HashAlgorithm::Sha512 => hex_digest::<Sha512>(text.as_bytes()),
    };

    let table = Report::table(
        "Hash result",
        vec!["Algorithm", "Hash"],
        vec![vec![algorithm.as_str().to_string(), digest]],
    );

    if algorithm.is_weak() {
        Ok(Report::Multi(vec![
            table,
            Report::text(format!(
                "{} This algorithm is not recommended for security purposes",
                "⚠".yellow()
            )),
        ]))
    } else {
        Ok(table)
    }
}

/// Generate `count` random (v4) UUIDs.
pub fn uuid(count: u32) -> HandlerResult {
    let rows = (1..=count)
        .map(|i| vec![i.to_string(), Uuid::new_v4().to_string()])
        .collect();

    Ok(Report::table(
        "Generated UUID v4",
        vec!["#", "UUID"],
        rows,
    ))
}

fn hex_digest<D: Digest>(data: &[u8]) -> String {
    hex::encode(D::digest(data))
}

fn build_charset(uppercase: bool, numbers: bool, special: bool) -> String {
    let mut charset = String::from("abcdefghijklmnopqrstuvwxyz");
    if uppercase {
        charset.push_str("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    }
    if numbers {
        charset.push_str("0123456789");
    }
    if special {
        charset.push_str(SPECIAL_CHARS);
    }
    charset
}

fn generate_password(charset: &str, length: usize) -> String {
    let chars: Vec<char> = charset.chars().collect();
    let mut rng = OsRng;
    (0..length)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect()
}

/// `special`/`numbers` are the effective classes in the charset, after both
/// flags and settings are applied.
fn strength_label(length: usize, special: bool, numbers: bool) -> String {
    if length >= 16 && special && numbers {
        "strong".green().to_string()
    } else if length >= 12 {
        "medium".yellow().to_string()
    } else {
        "weak".red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn given_secret_when_hashed_sha256_then_known_digest() {
        assert_eq!(
            hex_digest::<Sha256>(b"secret"),
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
    }

    #[test]
    fn given_secret_when_hashed_md5_then_known_digest() {
        assert_eq!(hex_digest::<Md5>(b"secret"), "5ebe2294ecd0e0f08eab7690d2a6ee69");
    }

    #[rstest]
    #[case(HashAlgorithm::Md5, 32)]
    #[case(HashAlgorithm::Sha1, 40)]
    #[case(HashAlgorithm::Sha256, 64)]
    #[case(HashAlgorithm::Sha512, 128)]
    fn given_algorithm_when_hashing_then_digest_length_matches(
        #[case] algorithm: HashAlgorithm,
        #[case] hex_len: usize,
    ) {
        let digest = match algorithm {
            HashAlgorithm::Md5 => hex_digest::<Md5>(b"x"),
            HashAlgorithm::Sha1 => hex_digest::<Sha1>(b"x"),
            HashAlgorithm::Sha256 => hex_digest::<Sha256>(b"x"),
            HashAlgorithm::Sha512 => hex_digest::<Sha512>(b"x"),
        };
        assert_eq!(digest.len(), hex_len);
    }

    #[test]
    fn given_text_when_base64_round_trips_then_original_returned() {
        let encoded = BASE64.encode(b"hello world");
        assert_eq!(encoded, "aGVsbG8gd29ybGQ=");
        let decoded = BASE64.decode(encoded.as_bytes()).expect("decode");
        assert_eq!(decoded, b"hello world");
    }

    #[test]
    fn given_invalid_base64_when_decoding_then_invalid_input() {
        let err = base64("not@@base64!!", true).unwrap_err();
        assert!(matches!(err, HandlerError::InvalidInput(_)));
    }

    #[test]
    fn given_all_classes_when_building_charset_then_all_present() {
        let charset = build_charset(true, true, true);
        assert!(charset.contains('a'));
        assert!(charset.contains('Z'));
        assert!(charset.contains('5'));
        assert!(charset.contains('!'));
    }

    #[test]
    fn given_restricted_charset_when_building_then_classes_excluded() {
        let charset = build_charset(false, false, false);
        assert_eq!(charset, "abcdefghijklmnopqrstuvwxyz");
    }

    #[test]
    fn given_charset_when_generating_then_length_and_membership_hold() {
        let charset = build_charset(true, true, false);
        let password = generate_password(&charset, 24);
        assert_eq!(password.chars().count(), 24);
        assert!(password.chars().all(|c| charset.contains(c)));
    }

    #[test]
    fn given_no_special_chars_when_labeling_strength_then_not_strong() {
        assert!(strength_label(20, true, true).contains("strong"));
        // settings may disable specials even without --no-special
        assert!(!strength_label(20, false, true).contains("strong"));
        assert!(strength_label(20, false, true).contains("medium"));
    }

    #[test]
    fn given_short_length_when_generating_password_then_invalid_input() {
        let settings = Settings::default();
        let err = password(Some(3), 1, false, false, false, &settings).unwrap_err();
        assert!(matches!(err, HandlerError::InvalidInput(_)));
    }

    #[test]
    fn given_uuid_v4_when_generated_then_hyphenated_format() {
        let id = Uuid::new_v4().to_string();
        assert_eq!(id.len(), 36);
        assert_eq!(id.matches('-').count(), 4);
    }

    #[test]
    fn given_no_source_when_rendering_markdown_then_invalid_input() {
        let err = markdown(None, None).unwrap_err();
        assert!(matches!(err, HandlerError::InvalidInput(_)));
    }
}
