//! Affiliate data models and API request/response types.
//!
//! This module defines:
//! - `Affiliate`: The affiliate record persisted in the document store
//! - `RegisterAffiliateRequest`: Request body for registering affiliates
//! - `AffiliateResponse`: Response body returned to clients
//!
//! # Document Layout
//!
//! Records live in the `afiliados` collection, one document per affiliate,
//! keyed by the derived promotional code. Field names on the wire are the
//! Portuguese ones the store has always used (`nome`, `telefone`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::firestore::{Document, Fields, Value};
use crate::format;

/// Firestore collection holding every affiliate record.
pub const COLLECTION: &str = "afiliados";

/// Status assigned to every record at creation.
pub const STATUS_ATIVO: &str = "ativo";

/// An affiliate record.
///
/// # Identity
///
/// `codigo` doubles as the document id, which is what makes it unique
/// across all records. `link` is written once together with the record and
/// never updated independently, so the two stay consistent by construction.
///
/// # Timestamps
///
/// `created_at` is optional on the read path: the stored value sits behind
/// a store-specific envelope, and a missing or undecodable timestamp must
/// not take the whole record down with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Affiliate {
    /// Affiliate name, upper-cased at capture
    pub nome: String,

    /// Phone in national display mask, e.g. `(34) 99999-8888`
    pub telefone: String,

    /// City, free text
    pub cidade: String,

    /// Promo description, free text
    pub descricao: String,

    /// Derived promotional code; unique, doubles as document id
    pub codigo: String,

    /// Tracking link carrying `codigo` as `utm_medium`
    pub link: String,

    /// Record status, `"ativo"` at creation
    pub status: String,

    /// Creation instant, when the stored value decoded
    pub created_at: Option<DateTime<Utc>>,
}

impl Affiliate {
    /// Encode the record as Firestore document fields.
    ///
    /// `data_cadastro` duplicates `created_at` and `qr_url` is reserved
    /// (always null); both are part of the persisted layout.
    pub fn to_fields(&self) -> Fields {
        let registered = match self.created_at {
            Some(t) => Value::timestamp(t),
            None => Value::null(),
        };

        Fields::from([
            ("nome".to_string(), Value::string(&self.nome)),
            ("telefone".to_string(), Value::string(&self.telefone)),
            ("cidade".to_string(), Value::string(&self.cidade)),
            ("descricao".to_string(), Value::string(&self.descricao)),
            ("codigo".to_string(), Value::string(&self.codigo)),
            ("link".to_string(), Value::string(&self.link)),
            ("status".to_string(), Value::string(&self.status)),
            ("created_at".to_string(), registered.clone()),
            ("data_cadastro".to_string(), registered),
            ("qr_url".to_string(), Value::null()),
        ])
    }

    /// Decode a store document into a record.
    ///
    /// Tolerant by design: missing string fields decode to empty strings,
    /// and a missing or malformed timestamp decodes to `None`. The code
    /// falls back to the document id when the `codigo` field is absent,
    /// since the id is authoritative.
    pub fn from_document(doc: &Document) -> Self {
        let text = |field: &str| -> String {
            doc.fields
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let codigo = match text("codigo") {
            c if c.is_empty() => doc.doc_id().to_string(),
            c => c,
        };

        Self {
            nome: text("nome"),
            telefone: text("telefone"),
            cidade: text("cidade"),
            descricao: text("descricao"),
            codigo,
            link: text("link"),
            status: text("status"),
            created_at: doc.fields.get("created_at").and_then(Value::as_timestamp),
        }
    }
}

/// Request body for registering a new affiliate.
///
/// # JSON Example
///
/// ```json
/// {
///   "nome": "Marcos Silva",
///   "telefone": "34999998888",
///   "cidade": "Ituiutaba - MG",
///   "descricao": "VIP"
/// }
/// ```
///
/// # Validation
///
/// All four fields are required and must be non-empty after trimming.
/// Name case and phone formatting are normalized server-side, so callers
/// may send raw input.
#[derive(Debug, Deserialize)]
pub struct RegisterAffiliateRequest {
    pub nome: String,
    pub telefone: String,
    pub cidade: String,
    pub descricao: String,
}

/// Response body for affiliate endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "nome": "MARCOS SILVA",
///   "telefone": "(34) 99999-8888",
///   "cidade": "Ituiutaba - MG",
///   "descricao": "VIP",
///   "codigo": "marcossilvavip",
///   "link": "https://www.sympla.com.br/evento/habity-fight/3089949?utm_source=afiliado&utm_medium=marcossilvavip&utm_campaign=habity-fight",
///   "status": "ativo",
///   "created_at": "2025-08-07T14:30:00Z",
///   "data_cadastro": "07/08/2025 14:30"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AffiliateResponse {
    pub nome: String,
    pub telefone: String,
    pub cidade: String,
    pub descricao: String,
    pub codigo: String,
    pub link: String,
    pub status: String,

    /// Raw creation instant; null when the stored value did not decode
    pub created_at: Option<DateTime<Utc>>,

    /// Display-formatted registration date, with a fallback string when
    /// the instant is unavailable
    pub data_cadastro: String,
}

/// Convert a stored Affiliate to the API response shape.
///
/// This is where the display date gets rendered; the conversion is total,
/// an undecodable timestamp becomes the fallback string.
impl From<Affiliate> for AffiliateResponse {
    fn from(affiliate: Affiliate) -> Self {
        let data_cadastro = format::format_registration_date(affiliate.created_at);

        Self {
            nome: affiliate.nome,
            telefone: affiliate.telefone,
            cidade: affiliate.cidade,
            descricao: affiliate.descricao,
            codigo: affiliate.codigo,
            link: affiliate.link,
            status: affiliate.status,
            created_at: affiliate.created_at,
            data_cadastro,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_affiliate() -> Affiliate {
        Affiliate {
            nome: "MARCOS SILVA".to_string(),
            telefone: "(34) 99999-8888".to_string(),
            cidade: "Ituiutaba - MG".to_string(),
            descricao: "VIP".to_string(),
            codigo: "marcossilvavip".to_string(),
            link: format::sales_link("marcossilvavip"),
            status: STATUS_ATIVO.to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2025, 8, 7, 14, 30, 0).unwrap()),
        }
    }

    #[test]
    fn should_encode_portuguese_field_names() {
        let fields = sample_affiliate().to_fields();
        for name in [
            "nome",
            "telefone",
            "cidade",
            "descricao",
            "codigo",
            "link",
            "status",
            "created_at",
            "data_cadastro",
            "qr_url",
        ] {
            assert!(fields.contains_key(name), "missing field {name}");
        }
        assert_eq!(fields.len(), 10);
    }

    #[test]
    fn should_encode_status_ativo_and_null_qr_url() {
        let fields = sample_affiliate().to_fields();
        assert_eq!(fields["status"], Value::string("ativo"));
        assert_eq!(fields["qr_url"], Value::null());
    }

    #[test]
    fn should_duplicate_creation_instant_into_data_cadastro() {
        let fields = sample_affiliate().to_fields();
        assert_eq!(fields["created_at"], fields["data_cadastro"]);
        assert!(fields["created_at"].as_timestamp().is_some());
    }

    #[test]
    fn should_round_trip_through_document_fields() {
        let affiliate = sample_affiliate();
        let doc = Document {
            name: format!(
                "projects/p/databases/(default)/documents/afiliados/{}",
                affiliate.codigo
            ),
            fields: affiliate.to_fields(),
        };
        assert_eq!(Affiliate::from_document(&doc), affiliate);
    }

    #[test]
    fn should_fall_back_to_doc_id_when_codigo_field_is_missing() {
        let doc = Document {
            name: "projects/p/databases/(default)/documents/afiliados/anavip".to_string(),
            fields: Fields::from([("nome".to_string(), Value::string("ANA"))]),
        };
        let affiliate = Affiliate::from_document(&doc);
        assert_eq!(affiliate.codigo, "anavip");
        assert_eq!(affiliate.nome, "ANA");
        assert_eq!(affiliate.telefone, "");
    }

    #[test]
    fn should_decode_malformed_timestamp_as_none() {
        let mut fields = sample_affiliate().to_fields();
        fields.insert(
            "created_at".to_string(),
            Value::TimestampValue("yesterday".to_string()),
        );
        let doc = Document {
            name: "projects/p/databases/(default)/documents/afiliados/marcossilvavip".to_string(),
            fields,
        };
        assert_eq!(Affiliate::from_document(&doc).created_at, None);
    }

    #[test]
    fn should_render_fallback_date_in_response() {
        let mut affiliate = sample_affiliate();
        affiliate.created_at = None;
        let response = AffiliateResponse::from(affiliate);
        assert_eq!(response.data_cadastro, format::DATE_UNAVAILABLE);
        assert!(response.created_at.is_none());
    }

    #[test]
    fn should_render_display_date_in_response() {
        let response = AffiliateResponse::from(sample_affiliate());
        assert_eq!(response.data_cadastro, "07/08/2025 14:30");
    }
}
