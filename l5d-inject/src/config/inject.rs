use l5d_inject_base::consts;
use serde::{Deserialize, Serialize};

/// Settings handed to the `init-linkerd` container.
///
/// Fixed for the whole pass and shared by every document.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionConfig {
    /// Port of the node-local linkerd's incoming router. Passed on as is.
    #[serde(rename = "linkerdPort", default = "InjectionConfig::default_proxy_port")]
    pub proxy_port: String,

    /// Name of the linkerd daemonset service, upper-cased in the init
    /// container arguments.
    #[serde(rename = "linkerdSvcName", default = "InjectionConfig::default_proxy_service_name")]
    pub proxy_service_name: String,

    /// Route through the service VIP instead of the node name, for clusters
    /// without downward API access.
    #[serde(default = "InjectionConfig::default_use_service_vip")]
    pub use_service_vip: bool,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            proxy_port: Self::default_proxy_port(),
            proxy_service_name: Self::default_proxy_service_name(),
            use_service_vip: Self::default_use_service_vip(),
        }
    }
}

impl InjectionConfig {
    #[inline]
    pub fn default_proxy_port() -> String { consts::DEFAULT_LINKERD_PORT.to_string() }

    #[inline]
    pub fn default_proxy_service_name() -> String {
        consts::DEFAULT_LINKERD_SERVICE_NAME.to_string()
    }

    #[inline]
    pub const fn default_use_service_vip() -> bool { consts::DEFAULT_USE_SERVICE_VIP }

    /// Arguments of the `init-linkerd` container.
    pub fn init_args(&self) -> Vec<String> {
        let Self { proxy_port, proxy_service_name, use_service_vip } = self;
        vec![
            "-p".to_string(),
            proxy_port.clone(),
            "-m".to_string(),
            use_service_vip.to_string(),
            "-s".to_string(),
            proxy_service_name.to_uppercase(),
        ]
    }
}
