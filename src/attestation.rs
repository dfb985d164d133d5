//! Attestation inspection (diagnostics only)
//!
//! Parses provenance attestations far enough to report what they claim: the
//! in-toto statement inside the DSSE envelope, its subjects and digests, and
//! the builder identity. No signature is checked here; that stays with
//! `slsa-verifier`.
//!
//! Two on-disk shapes are accepted, both JSONL (first line wins):
//! - a bare DSSE envelope (`{"payload": ..., "payloadType": ..., "signatures": [...]}`),
//!   as produced by the SLSA generator workflows;
//! - a Sigstore bundle (`{"dsseEnvelope": {...}, "verificationMaterial": {...}}`),
//!   as produced by GitHub attestations. Bundles can be converted back to the
//!   bare envelope form that `slsa-verifier` consumes, and the embedded Fulcio
//!   certificate extracted as PEM.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// SLSA v1 predicate type URI
pub const PREDICATE_SLSA_V1: &str = "https://slsa.dev/provenance/v1";

/// SLSA v0.2 predicate type URI
pub const PREDICATE_SLSA_V02: &str = "https://slsa.dev/provenance/v0.2";

/// Errors parsing or converting an attestation
#[derive(Debug, Error)]
pub enum AttestationError {
    /// The attestation file could not be read
    #[error("could not read {path}: {source}")]
    Read {
        /// The file that failed
        path: PathBuf,
        /// The underlying I/O error
        source: io::Error,
    },

    /// The attestation file had no content
    #[error("attestation file is empty: {0}")]
    Empty(PathBuf),

    /// The JSON did not match any accepted shape
    #[error("malformed attestation: {0}")]
    Json(#[from] serde_json::Error),

    /// The envelope carried no payload
    #[error("no DSSE payload present")]
    NoPayload,

    /// The payload was not valid base64
    #[error("DSSE payload is not valid base64: {0}")]
    Payload(#[from] base64::DecodeError),

    /// The decoded payload was not UTF-8
    #[error("DSSE payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The statement's predicate is not SLSA provenance
    #[error("not a SLSA provenance statement: {0}")]
    NotSlsa(String),

    /// An output file could not be written
    #[error("could not write {path}: {source}")]
    Write {
        /// The file that failed
        path: PathBuf,
        /// The underlying I/O error
        source: io::Error,
    },
}

/// A DSSE envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Base64-encoded in-toto statement
    pub payload: String,
    /// Payload media type (`application/vnd.in-toto+json`)
    pub payload_type: String,
    /// Signatures, kept opaque
    #[serde(default)]
    pub signatures: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Bundle {
    dsse_envelope: Envelope,
    #[serde(default)]
    verification_material: Value,
}

/// A loaded attestation: the envelope plus optional bundle material
#[derive(Debug, Clone)]
pub struct Attestation {
    /// The DSSE envelope
    pub envelope: Envelope,
    /// Sigstore verification material, when the input was a bundle
    pub verification_material: Option<Value>,
}

/// An in-toto statement (payload of the envelope)
#[derive(Debug, Clone, Deserialize)]
pub struct Statement {
    /// Statement type URI
    #[serde(rename = "_type", default)]
    pub statement_type: String,
    /// Predicate type URI
    #[serde(rename = "predicateType")]
    pub predicate_type: String,
    /// Artifacts the statement binds to
    #[serde(default)]
    pub subject: Vec<Subject>,
    /// The predicate, kept opaque except for the builder id
    #[serde(default)]
    pub predicate: Value,
}

/// An attested artifact: name plus digests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Artifact file name
    pub name: String,
    /// Digests by algorithm (`sha256` expected)
    #[serde(default)]
    pub digest: BTreeMap<String, String>,
}

/// Which SLSA provenance version the statement carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlsaVersion {
    /// `https://slsa.dev/provenance/v1`
    V1,
    /// `https://slsa.dev/provenance/v0.2`
    V02,
}

impl fmt::Display for SlsaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V02 => write!(f, "v0.2"),
        }
    }
}

/// Load an attestation from a JSONL file; the first non-empty line counts.
pub fn load(path: &Path) -> Result<Attestation, AttestationError> {
    let content = fs::read_to_string(path)
        .map_err(|source| AttestationError::Read { path: path.to_path_buf(), source })?;
    let line = content
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| AttestationError::Empty(path.to_path_buf()))?;

    let value: Value = serde_json::from_str(line)?;
    if value.get("dsseEnvelope").is_some() {
        let bundle: Bundle = serde_json::from_value(value)?;
        Ok(Attestation {
            envelope: bundle.dsse_envelope,
            verification_material: Some(bundle.verification_material),
        })
    } else {
        let envelope: Envelope = serde_json::from_value(value)?;
        Ok(Attestation { envelope, verification_material: None })
    }
}

impl Envelope {
    /// Decode the base64 payload into its in-toto statement.
    pub fn decode_statement(&self) -> Result<Statement, AttestationError> {
        if self.payload.is_empty() {
            return Err(AttestationError::NoPayload);
        }
        let bytes = BASE64_STANDARD.decode(&self.payload)?;
        let text = String::from_utf8(bytes)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Statement {
    /// Check the predicate type and report the SLSA version.
    pub fn slsa_version(&self) -> Result<SlsaVersion, AttestationError> {
        match self.predicate_type.as_str() {
            PREDICATE_SLSA_V1 => Ok(SlsaVersion::V1),
            PREDICATE_SLSA_V02 => Ok(SlsaVersion::V02),
            other => Err(AttestationError::NotSlsa(other.to_string())),
        }
    }

    /// The builder identity, wherever the provenance version put it.
    #[must_use]
    pub fn builder_id(&self) -> Option<String> {
        // v1: predicate.runDetails.builder.id; v0.2: predicate.builder.id
        self.predicate
            .pointer("/runDetails/builder/id")
            .or_else(|| self.predicate.pointer("/builder/id"))
            .and_then(Value::as_str)
            .map(ToString::to_string)
    }

    /// Find the subject whose sha256 matches `digest`, if any.
    #[must_use]
    pub fn subject_with_sha256(&self, digest: &str) -> Option<&Subject> {
        self.subject
            .iter()
            .find(|s| s.digest.get("sha256").is_some_and(|d| d.eq_ignore_ascii_case(digest)))
    }
}

/// Write the bare envelope as compact JSONL, the form `slsa-verifier` takes.
pub fn write_envelope(envelope: &Envelope, out: &Path) -> Result<(), AttestationError> {
    let mut json = serde_json::to_string(envelope)?;
    json.push('\n');
    fs::write(out, json).map_err(|source| AttestationError::Write { path: out.to_path_buf(), source })
}

/// Extract the embedded certificate as PEM, when the bundle carries one.
#[must_use]
pub fn certificate_pem(material: &Value) -> Option<String> {
    let raw = material.pointer("/certificate/rawBytes").and_then(Value::as_str)?;
    let der = BASE64_STANDARD.decode(raw).ok()?;
    let body = BASE64_STANDARD.encode(der);

    let mut pem = String::from("-----BEGIN CERTIFICATE-----\n");
    let bytes = body.as_bytes();
    for chunk in bytes.chunks(64) {
        pem.push_str(&String::from_utf8_lossy(chunk));
        pem.push('\n');
    }
    pem.push_str("-----END CERTIFICATE-----\n");
    Some(pem)
}
