//! Config Inspection resource and datasources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use validator::Validate;

use super::context::ProviderContext;
use super::data::ResourceData;
use super::handler::{DataSourceHandler, ResourceHandler};
use super::states::CONFIG_INSPECTION_SETTLE;
use super::validation;
use crate::api::config_inspection::{
    AuthKeyRequest, CreateDiagnosisObjectRequest, DiagnosisObjectFilter, DiagnosisObjectRequest,
    DiagnosisRequest, DiagnosisResultFilter, DiagnosisScheduleRequest,
};
use crate::api::types::tag_requests;
use crate::api::PageRequest;
use crate::error::{ResourceError, Result};

#[derive(Debug, Serialize, Deserialize, Validate)]
struct DiagnosisObjectConfig {
    #[validate(length(min = 1, message = "diagnosis_account_id is required"))]
    diagnosis_account_id: String,
    #[serde(default)]
    diagnosis_id: String,
    #[validate(length(min = 1, message = "diagnosis_name is required"))]
    diagnosis_name: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
struct ScheduleConfig {
    diagnosis_start_time_pattern: String,
    frequency_type: String,
    frequency_value: String,
    use_diagnosis_check_type_bp: String,
    use_diagnosis_check_type_ssi: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
struct AuthKeyConfig {
    auth_key_id: String,
}

#[derive(Debug, Deserialize, Validate)]
struct ConfigInspectionConfig {
    #[serde(default)]
    #[validate(custom(function = "validation::csp_type"))]
    csp_type: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validation::diagnosis_check_type"))]
    diagnosis_check_type: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validation::diagnosis_type"))]
    diagnosis_type: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validation::plan_type"))]
    plan_type: Option<String>,
    #[validate(
        length(min = 1, message = "diagnosis_object_request_list is required"),
        nested
    )]
    diagnosis_object_request_list: Vec<DiagnosisObjectConfig>,
    #[serde(default)]
    #[validate(nested)]
    schedule_request: Option<ScheduleConfig>,
    #[serde(default)]
    #[validate(nested)]
    auth_key_request: Option<AuthKeyConfig>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

impl ConfigInspectionConfig {
    fn into_request(self) -> CreateDiagnosisObjectRequest {
        CreateDiagnosisObjectRequest {
            csp_type: self.csp_type.unwrap_or_default(),
            diagnosis_check_type: self.diagnosis_check_type.unwrap_or_default(),
            diagnosis_type: self.diagnosis_type.unwrap_or_default(),
            plan_type: self.plan_type.unwrap_or_default(),
            diagnosis_object_request_list: self
                .diagnosis_object_request_list
                .into_iter()
                .map(|o| DiagnosisObjectRequest {
                    diagnosis_account_id: o.diagnosis_account_id,
                    diagnosis_id: o.diagnosis_id,
                    diagnosis_name: o.diagnosis_name,
                })
                .collect(),
            schedule_request: self.schedule_request.map(|s| DiagnosisScheduleRequest {
                diagnosis_start_time_pattern: s.diagnosis_start_time_pattern,
                frequency_type: s.frequency_type,
                frequency_value: s.frequency_value,
                use_diagnosis_check_type_bp: s.use_diagnosis_check_type_bp,
                use_diagnosis_check_type_ssi: s.use_diagnosis_check_type_ssi,
            }),
            auth_key_request: self.auth_key_request.map(|a| AuthKeyRequest {
                auth_key_id: a.auth_key_id,
            }),
            tags: tag_requests(&self.tags),
        }
    }
}

/// `scp_config_inspection`: registers accounts for configuration diagnosis.
#[derive(Debug, Default)]
pub struct ConfigInspectionResource;

#[async_trait]
impl ResourceHandler for ConfigInspectionResource {
    fn type_name(&self) -> &'static str {
        "scp_config_inspection"
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: ConfigInspectionConfig = data.decode(self.type_name())?;

        info!(
            "Registering {} diagnosis object(s)",
            config.diagnosis_object_request_list.len()
        );
        let created = ctx
            .client()
            .create_diagnosis_object(&config.into_request())
            .await?
            .into_body();

        ctx.settle(CONFIG_INSPECTION_SETTLE).await;

        if created.diagnosis_id.is_empty() {
            return Err(ResourceError::not_found("diagnosis id not returned").into());
        }
        data.set_id(created.diagnosis_id);
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let Some(id) = data.id().map(str::to_string) else {
            return Ok(());
        };

        match ctx.client().get_diagnosis_object(&id).await {
            Ok(response) => {
                if let Some(summary) = response.into_body().summary_response {
                    data.set("recent_diagnosis_state", summary.recent_diagnosis_state)?;
                    data.set("error_state", summary.error_state)?;
                }
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!("Diagnosis object {id} is gone");
                data.clear_id();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn update(&self, _ctx: &ProviderContext, _data: &mut ResourceData) -> Result<()> {
        Err(ResourceError::unsupported(self.type_name(), "Update function is not implemented").into())
    }

    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id(self.type_name())?;

        info!("Terminating diagnosis object {id}");
        match ctx.client().terminate_diagnosis_object(&id).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => debug!("Diagnosis object {id} already terminated"),
            Err(e) => return Err(e),
        }
        ctx.settle(CONFIG_INSPECTION_SETTLE).await;

        self.read(ctx, data).await?;
        if data.id().is_some() {
            warn!("Diagnosis object {id} still listed after termination");
            data.clear_id();
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
struct DiagnosisLookup {
    #[validate(length(min = 1, message = "diagnosis_id is required"))]
    diagnosis_id: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
struct DiagnosisObjectListConfig {
    csp_type: Vec<String>,
    diagnosis_account_id: Option<String>,
    diagnosis_name: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    recent_diagnosis_state: Vec<String>,
    #[serde(flatten)]
    page: PageRequest,
}

#[derive(Debug, Deserialize, Validate)]
struct DiagnosisRequestConfig {
    #[validate(length(min = 1, message = "project_id is required"))]
    project_id: String,
    #[validate(length(min = 1, message = "access_key is required"))]
    access_key: String,
    #[serde(default)]
    secret_key: Option<String>,
    #[serde(default)]
    tenant_id: Option<String>,
    #[validate(custom(function = "validation::diagnosis_check_type"))]
    diagnosis_check_type: String,
    #[validate(length(min = 1, message = "diagnosis_id is required"))]
    diagnosis_id: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
struct DiagnosisResultListConfig {
    diagnosis_name: Option<String>,
    diagnosis_state: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    #[serde(flatten)]
    page: PageRequest,
}

#[derive(Debug, Deserialize, Validate)]
struct DiagnosisResultLookup {
    #[validate(length(min = 1, message = "diagnosis_id is required"))]
    diagnosis_id: String,
    #[validate(length(min = 1, message = "diagnosis_request_sequence is required"))]
    diagnosis_request_sequence: String,
}

/// `scp_config_inspection` datasource: one diagnosis object.
#[derive(Debug, Default)]
pub struct ConfigInspectionDataSource;

/// `scp_config_inspections` datasource: diagnosis objects of the project.
#[derive(Debug, Default)]
pub struct ConfigInspectionsDataSource;

/// `scp_config_inspection_diagnosis_request` datasource: triggers a run.
#[derive(Debug, Default)]
pub struct DiagnosisRequestDataSource;

/// `scp_config_inspection_diagnoses` datasource: diagnosis runs.
#[derive(Debug, Default)]
pub struct DiagnosesDataSource;

/// `scp_config_inspection_diagnosis` datasource: report of one run.
#[derive(Debug, Default)]
pub struct DiagnosisDataSource;

#[async_trait]
impl DataSourceHandler for ConfigInspectionDataSource {
    fn type_name(&self) -> &'static str {
        "scp_config_inspection"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let lookup: DiagnosisLookup = data.decode(self.type_name())?;
        let detail = ctx
            .client()
            .get_diagnosis_object(&lookup.diagnosis_id)
            .await?
            .into_body();

        data.set_all(&detail)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}

#[async_trait]
impl DataSourceHandler for ConfigInspectionsDataSource {
    fn type_name(&self) -> &'static str {
        "scp_config_inspections"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: DiagnosisObjectListConfig = data.decode(self.type_name())?;
        let filter = DiagnosisObjectFilter {
            csp_types: config.csp_type,
            diagnosis_account_id: config.diagnosis_account_id,
            diagnosis_name: config.diagnosis_name,
            start_date: config.start_date,
            end_date: config.end_date,
            recent_diagnosis_states: config.recent_diagnosis_state,
        };
        let list = ctx
            .client()
            .list_diagnosis_objects(&filter, &config.page)
            .await?
            .into_body();

        data.set("contents", &list.contents)?;
        data.set("total_count", list.total_count)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}

#[async_trait]
impl DataSourceHandler for DiagnosisRequestDataSource {
    fn type_name(&self) -> &'static str {
        "scp_config_inspection_diagnosis_request"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: DiagnosisRequestConfig = data.decode(self.type_name())?;

        info!("Requesting diagnosis run for {}", config.diagnosis_id);
        let answer = ctx
            .client()
            .request_diagnosis(&DiagnosisRequest {
                project_id: config.project_id,
                access_key: config.access_key,
                secret_key: config.secret_key,
                tenant_id: config.tenant_id,
                diagnosis_check_type: config.diagnosis_check_type,
                diagnosis_id: config.diagnosis_id,
            })
            .await?
            .into_body();

        data.set("result", answer.result)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}

#[async_trait]
impl DataSourceHandler for DiagnosesDataSource {
    fn type_name(&self) -> &'static str {
        "scp_config_inspection_diagnoses"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: DiagnosisResultListConfig = data.decode(self.type_name())?;
        let filter = DiagnosisResultFilter {
            diagnosis_name: config.diagnosis_name,
            diagnosis_state: config.diagnosis_state,
            start_date: config.start_date,
            end_date: config.end_date,
        };
        let list = ctx
            .client()
            .list_diagnosis_results(&filter, &config.page)
            .await?
            .into_body();

        data.set("contents", &list.contents)?;
        data.set("total_count", list.total_count)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}

#[async_trait]
impl DataSourceHandler for DiagnosisDataSource {
    fn type_name(&self) -> &'static str {
        "scp_config_inspection_diagnosis"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let lookup: DiagnosisResultLookup = data.decode(self.type_name())?;
        let report = ctx
            .client()
            .get_diagnosis_result(&lookup.diagnosis_id, &lookup.diagnosis_request_sequence)
            .await?
            .into_body();

        data.set_all(&report)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::context::test_support::context_for;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OBJECTS: &str = "/config-inspection/v1/diagnosis-objects";

    fn inspection_config() -> serde_json::Value {
        json!({
            "csp_type": "AWS",
            "diagnosis_check_type": "BP",
            "diagnosis_type": "Console",
            "plan_type": "STANDARD",
            "diagnosis_object_request_list": [
                {"diagnosis_account_id": "123456789012", "diagnosis_name": "prod-account"}
            ],
            "schedule_request": {
                "diagnosis_start_time_pattern": "02:00",
                "frequency_type": "Daily",
                "frequency_value": "everyDay",
                "use_diagnosis_check_type_bp": "Y"
            }
        })
    }

    #[tokio::test]
    async fn test_create_registers_and_reads() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(OBJECTS))
            .and(body_partial_json(json!({
                "cspType": "AWS",
                "diagnosisObjectRequestList": [
                    {"diagnosisAccountId": "123456789012", "diagnosisName": "prod-account"}
                ],
                "scheduleRequest": {"useDiagnosisCheckTypeBP": "Y", "frequencyType": "Daily"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"diagnosisId": "DIAG-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{OBJECTS}/DIAG-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summaryResponse": {"diagnosisId": "DIAG-1", "recentDiagnosisState": "READY"}
            })))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&inspection_config());
        ConfigInspectionResource.create(&ctx, &mut data).await.expect("create");

        assert_eq!(data.id(), Some("DIAG-1"));
        assert_eq!(data.get_str("recent_diagnosis_state"), Some("READY"));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_csp() {
        let server = MockServer::start().await;
        let ctx = context_for(&server.uri());
        let mut config = inspection_config();
        config["csp_type"] = json!("GCP");

        let mut data = ResourceData::new(&config);
        let err = ConfigInspectionResource
            .create(&ctx, &mut data)
            .await
            .expect_err("invalid csp");
        assert!(err.to_string().contains("csp_type"));
    }

    #[tokio::test]
    async fn test_create_requires_object_list() {
        let server = MockServer::start().await;
        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({"diagnosis_object_request_list": []}));

        assert!(ConfigInspectionResource.create(&ctx, &mut data).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_terminates_and_clears_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{OBJECTS}/DIAG-1")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{OBJECTS}/DIAG-1")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&inspection_config());
        data.set_id("DIAG-1");
        ConfigInspectionResource.delete(&ctx, &mut data).await.expect("delete");
        assert_eq!(data.id(), None);
    }

    #[tokio::test]
    async fn test_delete_twice_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{OBJECTS}/DIAG-1")))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{OBJECTS}/DIAG-1")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        for _ in 0..2 {
            let mut data = ResourceData::new(&inspection_config());
            data.set_id("DIAG-1");
            ConfigInspectionResource.delete(&ctx, &mut data).await.expect("delete");
            assert_eq!(data.id(), None);
        }
    }

    #[tokio::test]
    async fn test_delete_surfaces_other_errors() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{OBJECTS}/DIAG-1")))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&inspection_config());
        data.set_id("DIAG-1");
        let err = ConfigInspectionResource
            .delete(&ctx, &mut data)
            .await
            .expect_err("bad request");
        assert_eq!(err.api_status(), Some(400));
        assert_eq!(data.id(), Some("DIAG-1"));
    }

    #[tokio::test]
    async fn test_detail_datasource_keeps_sections() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{OBJECTS}/DIAG-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "authKeyResponse": {
                    "authKeyId": "AK-1",
                    "authKeyCreateDt": "2024-01-02T03:04:05Z"
                },
                "summaryResponse": {"cspType": "SCP", "diagnosisName": "main"}
            })))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({"diagnosis_id": "DIAG-1"}));
        ConfigInspectionDataSource.read(&ctx, &mut data).await.expect("read");

        let auth = data.get("auth_key_response").expect("auth key");
        assert_eq!(auth["auth_key_id"], "AK-1");
        assert_eq!(auth["auth_key_create_dt"], "2024-01-02T03:04:05Z");
        assert_eq!(data.get("schedule_response"), Some(&serde_json::Value::Null));
        assert_eq!(data.get("summary_response").expect("summary")["csp_type"], "SCP");
    }

    #[tokio::test]
    async fn test_list_datasource_passes_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(OBJECTS))
            .and(query_param("cspType", "AWS"))
            .and(query_param("size", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "contents": [{"diagnosisId": "DIAG-1"}],
                "totalCount": 1
            })))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({"csp_type": ["AWS"], "size": 50}));
        ConfigInspectionsDataSource.read(&ctx, &mut data).await.expect("read");

        assert_eq!(data.get("total_count"), Some(&json!(1)));
        assert_eq!(data.get("contents").expect("contents")[0]["diagnosis_id"], "DIAG-1");
    }

    #[tokio::test]
    async fn test_diagnosis_request_sets_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/config-inspection/v1/diagnosis-requests"))
            .and(body_partial_json(json!({"diagnosisId": "DIAG-1", "diagnosisCheckType": "SSI"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({
            "project_id": "PROJECT-test",
            "access_key": "ak",
            "diagnosis_check_type": "SSI",
            "diagnosis_id": "DIAG-1"
        }));
        DiagnosisRequestDataSource.read(&ctx, &mut data).await.expect("read");
        assert_eq!(data.get("result"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_diagnosis_report_datasource() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/config-inspection/v1/diagnosis-results/DIAG-1/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "checklistName": "BP checklist",
                "resultDetailList": [{"diagnosisItem": "MFA enabled", "diagnosisResult": "PASS"}],
                "totalCount": 1
            })))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({
            "diagnosis_id": "DIAG-1",
            "diagnosis_request_sequence": "7"
        }));
        DiagnosisDataSource.read(&ctx, &mut data).await.expect("read");

        assert_eq!(data.get_str("checklist_name"), Some("BP checklist"));
        assert_eq!(
            data.get("result_detail_list").expect("items")[0]["diagnosis_result"],
            "PASS"
        );
    }
}
