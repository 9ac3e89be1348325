//! AWS Signature Version 4 request signing
//!
//! Only what a single JSON POST needs: header-based signing with a hashed
//! payload. No chunked uploads and no presigned URLs.

use super::credentials::Credentials;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Everything about the request that goes into the signature
#[derive(Debug)]
pub struct SignableRequest<'a> {
    pub method: &'a str,
    /// Host header value, including a non-default port
    pub host: &'a str,
    /// Canonical (already encoded) URI path
    pub canonical_uri: &'a str,
    /// Canonical query string, empty when there is none
    pub canonical_query: &'a str,
    /// Extra headers to sign besides host, x-amz-date and the session token
    pub headers: &'a [(&'a str, &'a str)],
    pub payload: &'a [u8],
}

/// Where and when the request is signed
#[derive(Debug, Clone, Copy)]
pub struct SigningScope<'a> {
    pub region: &'a str,
    pub service: &'a str,
    pub time: DateTime<Utc>,
}

/// Headers to attach to the outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct SignedHeaders {
    pub authorization: String,
    pub amz_date: String,
    pub security_token: Option<String>,
}

/// Sign a request and return the headers that carry the signature.
pub fn sign(
    request: &SignableRequest<'_>,
    scope: &SigningScope<'_>,
    credentials: &Credentials,
) -> Result<SignedHeaders, hmac::digest::InvalidLength> {
    let amz_date = scope.time.format("%Y%m%dT%H%M%SZ").to_string();
    let date = scope.time.format("%Y%m%d").to_string();

    let mut headers: Vec<(String, String)> = vec![
        ("host".to_string(), request.host.trim().to_string()),
        ("x-amz-date".to_string(), amz_date.clone()),
    ];
    if let Some(token) = &credentials.session_token {
        headers.push(("x-amz-security-token".to_string(), token.trim().to_string()));
    }
    for (name, value) in request.headers {
        headers.push((name.to_ascii_lowercase(), collapse_whitespace(value)));
    }
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method,
        request.canonical_uri,
        request.canonical_query,
        canonical_headers,
        signed_headers,
        sha256_hex(request.payload)
    );

    let credential_scope = format!(
        "{}/{}/{}/aws4_request",
        date, scope.region, scope.service
    );
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        credential_scope,
        sha256_hex(canonical_request.as_bytes())
    );

    let signing_key = signing_key(
        &credentials.secret_access_key,
        &date,
        scope.region,
        scope.service,
    )?;
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

    Ok(SignedHeaders {
        authorization: format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, credentials.access_key_id, credential_scope, signed_headers, signature
        ),
        amz_date,
        security_token: credentials.session_token.clone(),
    })
}

/// kSigning = HMAC(HMAC(HMAC(HMAC("AWS4" + secret, date), region), service), "aws4_request")
pub fn signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, hmac::digest::InvalidLength> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Percent-encode everything except the RFC 3986 unreserved set.
pub fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, hmac::digest::InvalidLength> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EXAMPLE_SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    fn example_credentials(token: Option<&str>) -> Credentials {
        Credentials::new("AKIDEXAMPLE", EXAMPLE_SECRET, token.map(str::to_string))
    }

    #[test]
    fn test_signing_key_matches_aws_docs() {
        let key = signing_key(EXAMPLE_SECRET, "20120215", "us-east-1", "iam").unwrap();
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_get_vanilla() {
        let request = SignableRequest {
            method: "GET",
            host: "example.amazonaws.com",
            canonical_uri: "/",
            canonical_query: "",
            headers: &[],
            payload: b"",
        };
        let scope = SigningScope {
            region: "us-east-1",
            service: "service",
            time: Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap(),
        };

        let signed = sign(&request, &scope, &example_credentials(None)).unwrap();
        assert_eq!(signed.amz_date, "20150830T123600Z");
        assert_eq!(
            signed.authorization,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        );
        assert!(signed.security_token.is_none());
    }

    #[test]
    fn test_session_token_is_signed() {
        let request = SignableRequest {
            method: "POST",
            host: "bedrock-runtime.us-east-1.amazonaws.com",
            canonical_uri: "/model/amazon.titan-text-express-v1/invoke",
            canonical_query: "",
            headers: &[("Content-Type", "application/json")],
            payload: b"{}",
        };
        let scope = SigningScope {
            region: "us-east-1",
            service: "bedrock",
            time: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        };

        let signed = sign(&request, &scope, &example_credentials(Some("TOKEN"))).unwrap();
        assert!(signed
            .authorization
            .contains("SignedHeaders=content-type;host;x-amz-date;x-amz-security-token,"));
        assert!(signed
            .authorization
            .contains("Credential=AKIDEXAMPLE/20240301/us-east-1/bedrock/aws4_request"));
        assert_eq!(signed.security_token.as_deref(), Some("TOKEN"));
    }

    #[test]
    fn test_signature_depends_on_payload() {
        let scope = SigningScope {
            region: "us-east-1",
            service: "bedrock",
            time: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        };
        let make = |payload: &'static [u8]| SignableRequest {
            method: "POST",
            host: "h",
            canonical_uri: "/",
            canonical_query: "",
            headers: &[],
            payload,
        };
        let creds = example_credentials(None);
        let a = sign(&make(b"a"), &scope, &creds).unwrap();
        let b = sign(&make(b"b"), &scope, &creds).unwrap();
        assert_ne!(a.authorization, b.authorization);
    }

    #[test]
    fn test_uri_encode() {
        assert_eq!(uri_encode("amazon.titan-text_v1~x", true), "amazon.titan-text_v1~x");
        assert_eq!(uri_encode("anthropic.claude-v2:1", true), "anthropic.claude-v2%3A1");
        assert_eq!(uri_encode("a/b c", true), "a%2Fb%20c");
        assert_eq!(uri_encode("a/b", false), "a/b");
    }
}
