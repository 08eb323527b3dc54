//! Certificate Manager facade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{ApiResponse, ScpClient, push_opt};
use super::types::{ListResponse, PageRequest, TagRequest};
use crate::error::Result;

const BASE: &str = "/certificate-manager/v2/certificates";

/// A certificate notification recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    /// E-mail address.
    #[serde(default)]
    pub email: String,
    /// User identifier.
    #[serde(default)]
    pub user_id: String,
    /// Display name.
    #[serde(default)]
    pub user_name: String,
}

/// Import request for a CA-issued certificate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCertificateRequest {
    /// Certificate name.
    pub certificate_name: String,
    /// PEM private key.
    pub private_key: String,
    /// PEM public certificate (body).
    pub public_certificate: String,
    /// PEM chain.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub certificate_chain: String,
    /// Expiry notification recipients.
    pub recipients: Vec<Recipient>,
    /// Creation tags.
    pub tags: Vec<TagRequest>,
}

/// Request for a self-signed development certificate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSelfSignedRequest {
    /// Certificate name.
    pub certificate_name: String,
    /// Subject common name.
    pub common_name: String,
    /// Subject organization.
    pub organization_name: String,
    /// Validity start date.
    pub certificate_start_date: String,
    /// Validity end date.
    pub certificate_expiration_date: String,
    /// Expiry notification recipients.
    pub recipients: Vec<Recipient>,
    /// Creation tags.
    pub tags: Vec<TagRequest>,
}

/// Certificate detail.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct CertificateDetail {
    pub certificate_id: String,
    pub certificate_name: String,
    pub common_name: String,
    pub purpose_type: String,
    pub certificate_start_date: Option<DateTime<Utc>>,
    pub certificate_expiration_date: Option<DateTime<Utc>>,
    pub created_dt: Option<DateTime<Utc>>,
    pub created_by: String,
    pub modified_dt: Option<DateTime<Utc>>,
    pub modified_by: String,
    pub certificate_state: String,
    pub private_key: String,
    pub public_certificate: String,
    pub certificate_chain: String,
    pub certificate_type: String,
    pub certificate_version: String,
    pub created_by_name: String,
    pub created_by_email: String,
    pub organization_name: String,
    pub project_id: String,
    pub key_bit_size: i64,
    pub used_resource_count: i64,
}

/// Certificate list item.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct CertificateSummary {
    pub certificate_id: String,
    pub certificate_name: String,
    pub common_name: String,
    pub purpose_type: String,
    pub certificate_start_date: Option<DateTime<Utc>>,
    pub certificate_expiration_date: Option<DateTime<Utc>>,
    pub created_dt: Option<DateTime<Utc>>,
    pub created_by: String,
    pub modified_dt: Option<DateTime<Utc>>,
    pub modified_by: String,
    pub certificate_state: String,
}

/// List filters.
#[derive(Debug, Clone, Default)]
pub struct CertificateFilter {
    /// Exact certificate name.
    pub certificate_name: Option<String>,
    /// Subject common name.
    pub common_name: Option<String>,
}

impl ScpClient {
    /// Lists certificates.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_certificates(
        &self,
        filter: &CertificateFilter,
        page: &PageRequest,
    ) -> Result<ApiResponse<ListResponse<CertificateSummary>>> {
        let mut query = Vec::new();
        push_opt(&mut query, "certificateName", filter.certificate_name.as_deref());
        push_opt(&mut query, "commonName", filter.common_name.as_deref());
        page.append_to(&mut query);
        self.get(BASE, &query).await
    }

    /// Gets a certificate by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate is not found or the API call fails.
    pub async fn get_certificate(&self, certificate_id: &str) -> Result<ApiResponse<CertificateDetail>> {
        self.get(&format!("{BASE}/{certificate_id}"), &[]).await
    }

    /// Imports a certificate.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn create_certificate(
        &self,
        request: &CreateCertificateRequest,
    ) -> Result<ApiResponse<CertificateDetail>> {
        self.post(BASE, Some(request)).await
    }

    /// Issues a self-signed certificate.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn create_self_signed_certificate(
        &self,
        request: &CreateSelfSignedRequest,
    ) -> Result<ApiResponse<CertificateDetail>> {
        self.post(&format!("{BASE}/self-sign"), Some(request)).await
    }

    /// Deletes a certificate.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn delete_certificate(&self, certificate_id: &str) -> Result<ApiResponse<()>> {
        self.delete(&format!("{BASE}/{certificate_id}")).await
    }
}
