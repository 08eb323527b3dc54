//! Config Inspection facade.
//!
//! Covers the diagnosis objects (the managed resource), diagnosis result
//! reporting, and on-demand diagnosis requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{ApiResponse, ScpClient, push_opt};
use super::types::{ListResponse, PageRequest, TagRequest};
use crate::error::Result;

const OBJECTS: &str = "/config-inspection/v1/diagnosis-objects";
const RESULTS: &str = "/config-inspection/v1/diagnosis-results";
const REQUESTS: &str = "/config-inspection/v1/diagnosis-requests";

/// One account to register for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisObjectRequest {
    /// Account inspected by the diagnosis.
    pub diagnosis_account_id: String,
    /// Existing diagnosis to attach to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub diagnosis_id: String,
    /// Diagnosis display name.
    pub diagnosis_name: String,
}

/// Recurring diagnosis schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisScheduleRequest {
    /// Start time, five minute granularity (`HH:mm`).
    pub diagnosis_start_time_pattern: String,
    /// Monthly, Weekly or Daily.
    pub frequency_type: String,
    /// Day selector matching the frequency type.
    pub frequency_value: String,
    /// Whether the best practice checklist runs.
    #[serde(rename = "useDiagnosisCheckTypeBP")]
    pub use_diagnosis_check_type_bp: String,
    /// Whether the SSI checklist runs.
    #[serde(rename = "useDiagnosisCheckTypeSSI")]
    pub use_diagnosis_check_type_ssi: String,
}

/// Authentication key binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthKeyRequest {
    /// Auth key identifier.
    pub auth_key_id: String,
}

/// Registration request for diagnosis objects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiagnosisObjectRequest {
    /// SCP, AWS or Azure.
    pub csp_type: String,
    /// BP or SSI.
    pub diagnosis_check_type: String,
    /// Console or SSI.
    pub diagnosis_type: String,
    /// STANDARD or MONTHLY.
    pub plan_type: String,
    /// Accounts to register.
    pub diagnosis_object_request_list: Vec<DiagnosisObjectRequest>,
    /// Optional schedule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_request: Option<DiagnosisScheduleRequest>,
    /// Optional auth key binding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_key_request: Option<AuthKeyRequest>,
    /// Creation tags.
    pub tags: Vec<TagRequest>,
}

/// Answer of a registration request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosisCreateResponse {
    /// Identifier of the registered diagnosis.
    pub diagnosis_id: String,
}

/// Auth key section of a diagnosis object.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct AuthKeyResponse {
    pub auth_key_create_dt: Option<DateTime<Utc>>,
    pub auth_key_expire_dt: Option<DateTime<Utc>>,
    pub auth_key_id: String,
    pub auth_key_state: String,
    pub user_id: String,
}

/// Schedule section of a diagnosis object.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct ScheduleResponse {
    pub diagnosis_id: String,
    pub diagnosis_start_time_pattern: String,
    pub frequency_type: String,
    pub frequency_value: String,
    #[serde(rename(deserialize = "useDiagnosisCheckTypeBP"))]
    pub use_diagnosis_check_type_bp: String,
    #[serde(rename(deserialize = "useDiagnosisCheckTypeSSI"))]
    pub use_diagnosis_check_type_ssi: String,
}

/// Summary of a diagnosis object, also used as list item.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct DiagnosisSummary {
    pub csp_type: String,
    pub diagnosis_account: String,
    pub diagnosis_check_type: String,
    pub diagnosis_id: String,
    pub diagnosis_name: String,
    pub diagnosis_type: String,
    pub error_state: String,
    pub plan_type: String,
    pub recent_diagnosis_dt: Option<DateTime<Utc>>,
    pub recent_diagnosis_state: String,
    pub created_dt: Option<DateTime<Utc>>,
}

/// Diagnosis object detail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct DiagnosisObjectDetail {
    /// Auth key binding.
    pub auth_key_response: Option<AuthKeyResponse>,
    /// Schedule.
    pub schedule_response: Option<ScheduleResponse>,
    /// Summary.
    pub summary_response: Option<DiagnosisSummary>,
}

/// Filters for the diagnosis object list.
#[derive(Debug, Clone, Default)]
pub struct DiagnosisObjectFilter {
    /// CSP types to include.
    pub csp_types: Vec<String>,
    /// Diagnosed account.
    pub diagnosis_account_id: Option<String>,
    /// Diagnosis name.
    pub diagnosis_name: Option<String>,
    /// Lower date bound.
    pub start_date: Option<String>,
    /// Upper date bound.
    pub end_date: Option<String>,
    /// Recent diagnosis states to include.
    pub recent_diagnosis_states: Vec<String>,
}

/// One diagnosis run.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct DiagnosisResult {
    pub check: i64,
    pub csp_type: String,
    pub diagnosis_account_id: String,
    pub diagnosis_check_type: String,
    pub diagnosis_id: String,
    pub diagnosis_name: String,
    pub diagnosis_request_sequence: String,
    pub diagnosis_result: String,
    pub diagnosis_total_cnt: i64,
    pub error: i64,
    pub fail: i64,
    pub na: i64,
    pub pass: i64,
    pub proceed_date: String,
    pub total: i64,
}

/// Filters for the diagnosis result list.
#[derive(Debug, Clone, Default)]
pub struct DiagnosisResultFilter {
    /// Diagnosis name.
    pub diagnosis_name: Option<String>,
    /// Diagnosis run state.
    pub diagnosis_state: Option<String>,
    /// Lower date bound.
    pub start_date: Option<String>,
    /// Upper date bound.
    pub end_date: Option<String>,
}

/// One checklist line of a diagnosis report.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct DiagnosisResultItem {
    pub action_guide: String,
    pub changed: bool,
    pub diagnosis_check_type: String,
    pub diagnosis_criteria: String,
    pub diagnosis_item: String,
    pub diagnosis_layer: String,
    pub diagnosis_method: String,
    pub diagnosis_result: String,
    pub result_contents: String,
    pub sub_category: String,
}

/// Full report of one diagnosis run.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct DiagnosisResultDetail {
    pub checklist_name: String,
    pub diagnosis_account: String,
    pub diagnosis_check_type: String,
    pub diagnosis_name: String,
    pub proceed_date: String,
    pub result_detail_list: Vec<DiagnosisResultItem>,
    pub total_count: i64,
}

/// On-demand diagnosis request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    /// Project holding the diagnosis.
    pub project_id: String,
    /// Access key of the inspected account.
    pub access_key: String,
    /// Secret key of the inspected account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Azure tenant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// BP or SSI.
    pub diagnosis_check_type: String,
    /// Diagnosis to run.
    pub diagnosis_id: String,
}

/// Answer of an on-demand diagnosis request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckResponse {
    /// Whether the request was accepted.
    pub result: bool,
}

impl ScpClient {
    /// Lists diagnosis objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_diagnosis_objects(
        &self,
        filter: &DiagnosisObjectFilter,
        page: &PageRequest,
    ) -> Result<ApiResponse<ListResponse<DiagnosisSummary>>> {
        let mut query = Vec::new();
        for csp in &filter.csp_types {
            query.push(("cspType", csp.clone()));
        }
        push_opt(&mut query, "diagnosisAccountId", filter.diagnosis_account_id.as_deref());
        push_opt(&mut query, "diagnosisName", filter.diagnosis_name.as_deref());
        push_opt(&mut query, "startDate", filter.start_date.as_deref());
        push_opt(&mut query, "endDate", filter.end_date.as_deref());
        for state in &filter.recent_diagnosis_states {
            query.push(("recentDiagnosisState", state.clone()));
        }
        page.append_to(&mut query);
        self.get(OBJECTS, &query).await
    }

    /// Gets a diagnosis object.
    ///
    /// # Errors
    ///
    /// Returns an error if the diagnosis is not found or the API call fails.
    pub async fn get_diagnosis_object(
        &self,
        diagnosis_id: &str,
    ) -> Result<ApiResponse<DiagnosisObjectDetail>> {
        self.get(&format!("{OBJECTS}/{diagnosis_id}"), &[]).await
    }

    /// Registers diagnosis objects.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn create_diagnosis_object(
        &self,
        request: &CreateDiagnosisObjectRequest,
    ) -> Result<ApiResponse<DiagnosisCreateResponse>> {
        self.post(OBJECTS, Some(request)).await
    }

    /// Terminates a diagnosis object.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn terminate_diagnosis_object(
        &self,
        diagnosis_id: &str,
    ) -> Result<ApiResponse<serde_json::Value>> {
        self.delete(&format!("{OBJECTS}/{diagnosis_id}")).await
    }

    /// Lists diagnosis runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_diagnosis_results(
        &self,
        filter: &DiagnosisResultFilter,
        page: &PageRequest,
    ) -> Result<ApiResponse<ListResponse<DiagnosisResult>>> {
        let mut query = Vec::new();
        push_opt(&mut query, "diagnosisName", filter.diagnosis_name.as_deref());
        push_opt(&mut query, "diagnosisState", filter.diagnosis_state.as_deref());
        push_opt(&mut query, "startDate", filter.start_date.as_deref());
        push_opt(&mut query, "endDate", filter.end_date.as_deref());
        page.append_to(&mut query);
        self.get(RESULTS, &query).await
    }

    /// Gets the report of one diagnosis run.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn get_diagnosis_result(
        &self,
        diagnosis_id: &str,
        request_sequence: &str,
    ) -> Result<ApiResponse<DiagnosisResultDetail>> {
        self.get(&format!("{RESULTS}/{diagnosis_id}/{request_sequence}"), &[])
            .await
    }

    /// Requests an immediate diagnosis run.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn request_diagnosis(
        &self,
        request: &DiagnosisRequest,
    ) -> Result<ApiResponse<CheckResponse>> {
        self.post(REQUESTS, Some(request)).await
    }
}
