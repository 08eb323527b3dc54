//! Kubernetes Engine facade. Only kubeconfig retrieval is covered.

use super::client::{ApiResponse, ScpClient};
use crate::error::Result;

const ENGINES: &str = "/kubernetes-engine/v2/engines";

impl ScpClient {
    /// Fetches the administrator kubeconfig of an engine as YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not found or the API call fails.
    pub async fn get_admin_kubeconfig(
        &self,
        engine_id: &str,
        kubeconfig_type: &str,
    ) -> Result<ApiResponse<String>> {
        self.get_text(
            &format!("{ENGINES}/{engine_id}/kubeconfig"),
            &[("kubeconfigType", kubeconfig_type.to_string())],
        )
        .await
    }

    /// Fetches the calling user's kubeconfig of an engine as YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not found or the API call fails.
    pub async fn get_user_kubeconfig(
        &self,
        engine_id: &str,
        kubeconfig_type: &str,
    ) -> Result<ApiResponse<String>> {
        self.get_text(
            &format!("{ENGINES}/{engine_id}/kubeconfig/user"),
            &[("kubeconfigType", kubeconfig_type.to_string())],
        )
        .await
    }
}
